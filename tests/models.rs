//! Integration tests for model helpers: ids, stage labels, colours, player names.

use game_night::{format_player_name, MatchId, MatchStage, TeamColor};

#[test]
fn match_ids_parse_from_uuid_or_stage_key() {
    let uuid = uuid::Uuid::new_v4();
    assert_eq!(uuid.to_string().parse::<MatchId>(), Ok(MatchId::Fixture(uuid)));
    assert_eq!("semiFinal2".parse::<MatchId>(), Ok(MatchId::Bracket(MatchStage::SemiFinal2)));
    assert!("roundRobin".parse::<MatchId>().is_err());
    assert!("semifinal".parse::<MatchId>().is_err());

    for stage in MatchStage::BRACKET {
        let id = MatchId::Bracket(stage);
        assert_eq!(id.to_string().parse::<MatchId>(), Ok(id));
    }
}

#[test]
fn match_id_json_is_a_bare_string() {
    let id: MatchId = serde_json::from_str("\"consolation\"").unwrap();
    assert_eq!(id, MatchId::Bracket(MatchStage::Consolation));
    assert_eq!(serde_json::to_string(&id).unwrap(), "\"consolation\"");
}

#[test]
fn stages_have_labels() {
    assert_eq!(MatchStage::RoundRobin.label(), "Round Robin");
    assert_eq!(MatchStage::SemiFinal1.label(), "Semi-final 1");
    assert_eq!(MatchStage::Final.label(), "Final");
    assert!(!MatchStage::RoundRobin.is_knockout());
    assert!(MatchStage::BRACKET.iter().all(|s| s.is_knockout()));
}

#[test]
fn first_free_colour_skips_used_ones() {
    assert_eq!(TeamColor::first_free([]), Some(TeamColor::Blue));
    assert_eq!(
        TeamColor::first_free([TeamColor::Blue, TeamColor::Yellow]),
        Some(TeamColor::Green)
    );
    assert_eq!(TeamColor::first_free(TeamColor::PALETTE), None);
    assert_eq!(TeamColor::Pink.to_string(), "#EC4899");
    assert_eq!(serde_json::to_string(&TeamColor::Orange).unwrap(), "\"#F97316\"");
}

#[test]
fn player_names_are_normalised() {
    assert_eq!(format_player_name("  Ada Lovelace "), Some("Ada Lovelace".to_string()));
    assert_eq!(format_player_name("Hopper, Grace"), Some("Grace Hopper".to_string()));
    assert_eq!(format_player_name("Hopper,"), Some("Hopper".to_string()));
    assert_eq!(format_player_name(" , "), None);
    assert_eq!(format_player_name(""), None);
}
