//! Integration tests for bracket derivation: qualification, semi-finals, consolation, final.

use game_night::{
    generate_round_robin, is_complete, match_winner_id, sync_knockouts, Match, MatchId, MatchStage,
    MatchStatus, Team, TeamColor, TeamId, TieBreak,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;

fn teams(n: usize) -> Vec<Team> {
    (0..n)
        .map(|i| Team::new(format!("T{i}"), TeamColor::PALETTE[i]))
        .collect()
}

fn bracket_id(stage: MatchStage) -> MatchId {
    MatchId::Bracket(stage)
}

fn find(matches: &[Match], stage: MatchStage) -> Option<&Match> {
    matches.iter().find(|m| m.id == bracket_id(stage))
}

fn status_of(m: &Match) -> MatchStatus {
    if is_complete(m) {
        MatchStatus::Completed
    } else {
        MatchStatus::Scheduled
    }
}

/// Set the regular-time score of a match by id.
fn set_score(matches: &mut [Match], id: MatchId, home: u32, away: u32) {
    let m = matches.iter_mut().find(|m| m.id == id).unwrap();
    m.home_score = Some(home);
    m.away_score = Some(away);
    m.status = status_of(m);
}

/// Set the round-robin result between two teams, in either orientation.
fn set_result(matches: &mut [Match], winner: TeamId, loser: TeamId, w: u32, l: u32) {
    let m = matches
        .iter_mut()
        .find(|m| m.stage == MatchStage::RoundRobin && m.involves(winner) && m.involves(loser))
        .unwrap();
    if m.home_id == winner {
        m.home_score = Some(w);
        m.away_score = Some(l);
    } else {
        m.home_score = Some(l);
        m.away_score = Some(w);
    }
    m.status = status_of(m);
}

/// Round-robin where a lower index always wins 1-0, so the table follows team order.
fn ranked_round_robin(teams: &[Team]) -> Vec<Match> {
    let mut matches = generate_round_robin(teams);
    for (i, a) in teams.iter().enumerate() {
        for b in &teams[i + 1..] {
            set_result(&mut matches, a.id, b.id, 1, 0);
        }
    }
    matches
}

fn last_rr_slot(matches: &[Match]) -> u32 {
    matches
        .iter()
        .filter(|m| m.stage == MatchStage::RoundRobin)
        .map(|m| m.slot)
        .max()
        .unwrap()
}

#[test]
fn nothing_is_seeded_before_round_robin_is_complete() {
    let t = teams(4);
    let mut matches = ranked_round_robin(&t);
    let first = matches[0].id;
    let m = matches.iter_mut().find(|m| m.id == first).unwrap();
    m.home_score = None;
    m.status = MatchStatus::Scheduled;

    let synced = sync_knockouts(&t, &matches);
    assert_eq!(synced.len(), 6);
    assert!(synced.iter().all(|m| m.stage == MatchStage::RoundRobin));
}

#[test]
fn round_robin_matches_pass_through_unchanged() {
    let t = teams(4);
    let matches = ranked_round_robin(&t);
    let synced = sync_knockouts(&t, &matches);
    let rr: Vec<&Match> = synced.iter().filter(|m| m.stage == MatchStage::RoundRobin).collect();
    assert_eq!(rr.len(), matches.len());
    for m in &matches {
        assert!(rr.contains(&m));
    }
}

#[test]
fn four_teams_seed_one_v_four_and_two_v_three() {
    let t = teams(4);
    let synced = sync_knockouts(&t, &ranked_round_robin(&t));

    let semi1 = find(&synced, MatchStage::SemiFinal1).unwrap();
    let semi2 = find(&synced, MatchStage::SemiFinal2).unwrap();
    assert_eq!((semi1.home_id, semi1.away_id), (t[0].id, t[3].id));
    assert_eq!((semi2.home_id, semi2.away_id), (t[1].id, t[2].id));
    assert_eq!((semi1.slot, semi2.slot), (7, 8));
    assert_eq!(semi1.status, MatchStatus::Scheduled);
    assert!(find(&synced, MatchStage::Qualification).is_none());
    assert!(find(&synced, MatchStage::Final).is_none());
}

#[test]
fn six_teams_take_the_top_four_without_qualification() {
    let t = teams(6);
    let synced = sync_knockouts(&t, &ranked_round_robin(&t));
    assert!(find(&synced, MatchStage::Qualification).is_none());
    let semi1 = find(&synced, MatchStage::SemiFinal1).unwrap();
    let semi2 = find(&synced, MatchStage::SemiFinal2).unwrap();
    assert_eq!((semi1.home_id, semi1.away_id), (t[0].id, t[3].id));
    assert_eq!((semi2.home_id, semi2.away_id), (t[1].id, t[2].id));
    assert_eq!(semi1.slot, last_rr_slot(&synced) + 1);
}

#[test]
fn semi_final_results_seed_final_and_consolation() {
    let t = teams(4);
    let mut matches = sync_knockouts(&t, &ranked_round_robin(&t));
    set_score(&mut matches, bracket_id(MatchStage::SemiFinal1), 0, 2); // T3 beats T0
    let matches = sync_knockouts(&t, &matches);
    assert!(find(&matches, MatchStage::Final).is_none());

    let mut matches = matches;
    set_score(&mut matches, bracket_id(MatchStage::SemiFinal2), 3, 1); // T1 beats T2
    let synced = sync_knockouts(&t, &matches);

    let final_match = find(&synced, MatchStage::Final).unwrap();
    let consolation = find(&synced, MatchStage::Consolation).unwrap();
    assert_eq!((final_match.home_id, final_match.away_id), (t[3].id, t[1].id));
    assert_eq!((consolation.home_id, consolation.away_id), (t[0].id, t[2].id));
    assert_eq!((final_match.slot, consolation.slot), (9, 10));
    assert_eq!(synced.last().unwrap().id, bracket_id(MatchStage::Consolation));
}

#[test]
fn level_semi_final_waits_for_its_tie_break() {
    let t = teams(4);
    let mut matches = sync_knockouts(&t, &ranked_round_robin(&t));
    set_score(&mut matches, bracket_id(MatchStage::SemiFinal1), 1, 1);
    set_score(&mut matches, bracket_id(MatchStage::SemiFinal2), 2, 0);
    let mut matches = sync_knockouts(&t, &matches);
    let semi1 = find(&matches, MatchStage::SemiFinal1).unwrap();
    assert_eq!(semi1.status, MatchStatus::Scheduled);
    assert!(find(&matches, MatchStage::Final).is_none());

    let semi1 = matches.iter_mut().find(|m| m.id == bracket_id(MatchStage::SemiFinal1)).unwrap();
    semi1.pen_home = Some(3);
    semi1.pen_away = Some(4);
    semi1.resolved_by = Some(TieBreak::Penalties);
    let synced = sync_knockouts(&t, &matches);

    let semi1 = find(&synced, MatchStage::SemiFinal1).unwrap();
    assert_eq!(semi1.status, MatchStatus::Completed);
    assert_eq!(match_winner_id(semi1), Some(t[3].id));
    let final_match = find(&synced, MatchStage::Final).unwrap();
    assert_eq!((final_match.home_id, final_match.away_id), (t[3].id, t[1].id));
}

#[test]
fn three_teams_play_qualification_then_final() {
    let t = teams(3);
    let synced = sync_knockouts(&t, &ranked_round_robin(&t));

    let qualification = find(&synced, MatchStage::Qualification).unwrap();
    assert_eq!((qualification.home_id, qualification.away_id), (t[1].id, t[2].id));
    assert_eq!(qualification.slot, last_rr_slot(&synced) + 1);
    let qual_slot = qualification.slot;
    assert!(find(&synced, MatchStage::Final).is_none());

    let mut matches = synced;
    set_score(&mut matches, bracket_id(MatchStage::Qualification), 2, 1);
    let synced = sync_knockouts(&t, &matches);

    let final_match = find(&synced, MatchStage::Final).unwrap();
    assert_eq!((final_match.home_id, final_match.away_id), (t[0].id, t[1].id));
    assert_eq!(final_match.slot, qual_slot + 1);
    assert!(find(&synced, MatchStage::SemiFinal1).is_none());
}

#[test]
fn five_teams_seed_top_three_and_the_qualification_winner() {
    let t = teams(5);
    let mut matches = sync_knockouts(&t, &ranked_round_robin(&t));
    let qualification = find(&matches, MatchStage::Qualification).unwrap();
    assert_eq!((qualification.home_id, qualification.away_id), (t[3].id, t[4].id));
    assert!(find(&matches, MatchStage::SemiFinal1).is_none());

    set_score(&mut matches, bracket_id(MatchStage::Qualification), 0, 4); // T4 goes through
    let synced = sync_knockouts(&t, &matches);
    let qual_slot = find(&synced, MatchStage::Qualification).unwrap().slot;

    let semi1 = find(&synced, MatchStage::SemiFinal1).unwrap();
    let semi2 = find(&synced, MatchStage::SemiFinal2).unwrap();
    assert_eq!((semi1.home_id, semi1.away_id), (t[0].id, t[4].id));
    assert_eq!((semi2.home_id, semi2.away_id), (t[1].id, t[2].id));
    assert_eq!((semi1.slot, semi2.slot), (qual_slot + 1, qual_slot + 2));
}

#[test]
fn completed_qualification_is_frozen() {
    let t = teams(5);
    let mut matches = sync_knockouts(&t, &ranked_round_robin(&t));
    set_score(&mut matches, bracket_id(MatchStage::Qualification), 1, 0);
    let mut matches = sync_knockouts(&t, &matches);

    // T4 now beats T0 and T1 6-0: T3 and T2 become the bottom two.
    set_result(&mut matches, t[4].id, t[0].id, 6, 0);
    set_result(&mut matches, t[4].id, t[1].id, 6, 0);
    let synced = sync_knockouts(&t, &matches);

    let qualification = find(&synced, MatchStage::Qualification).unwrap();
    assert_eq!((qualification.home_id, qualification.away_id), (t[3].id, t[4].id));
    assert_eq!((qualification.home_score, qualification.away_score), (Some(1), Some(0)));
    assert_eq!(qualification.status, MatchStatus::Completed);
}

#[test]
fn unfinished_qualification_follows_the_live_bottom_two() {
    let t = teams(5);
    let mut matches = sync_knockouts(&t, &ranked_round_robin(&t));
    set_score(&mut matches, bracket_id(MatchStage::Qualification), 1, 1);
    let mut matches = sync_knockouts(&t, &matches);

    set_result(&mut matches, t[4].id, t[0].id, 6, 0);
    set_result(&mut matches, t[4].id, t[1].id, 6, 0);
    let synced = sync_knockouts(&t, &matches);

    let qualification = find(&synced, MatchStage::Qualification).unwrap();
    assert_ne!(
        (qualification.home_id, qualification.away_id),
        (t[3].id, t[4].id)
    );
    assert!(!qualification.involves(t[4].id));
    assert_eq!((qualification.home_score, qualification.away_score), (Some(1), Some(1)));
    assert_eq!(synced.iter().filter(|m| m.stage == MatchStage::Qualification).count(), 1);
}

#[test]
fn changed_round_robin_result_reseeds_semis_in_place() {
    let t = teams(4);
    let mut matches = sync_knockouts(&t, &ranked_round_robin(&t));
    set_score(&mut matches, bracket_id(MatchStage::SemiFinal1), 2, 0);
    let mut matches = sync_knockouts(&t, &matches);

    // T3 turns everything around and tops the table.
    for i in 0..3 {
        set_result(&mut matches, t[3].id, t[i].id, 5, 0);
    }
    let synced = sync_knockouts(&t, &matches);

    let ids: HashSet<MatchId> = synced.iter().map(|m| m.id).collect();
    assert_eq!(ids.len(), synced.len());
    assert_eq!(synced.len(), 8);

    let semi1 = find(&synced, MatchStage::SemiFinal1).unwrap();
    assert_eq!(semi1.home_id, t[3].id);
    assert_eq!((semi1.home_score, semi1.away_score), (Some(2), Some(0)));
    assert_eq!(semi1.status, MatchStatus::Completed);
}

#[test]
fn bracket_drops_out_when_round_robin_reopens() {
    let t = teams(4);
    let mut matches = sync_knockouts(&t, &ranked_round_robin(&t));
    assert_eq!(matches.len(), 8);
    let rr_id = matches[0].id;
    let m = matches.iter_mut().find(|m| m.id == rr_id).unwrap();
    m.home_score = None;
    m.away_score = None;
    m.status = MatchStatus::Scheduled;

    let synced = sync_knockouts(&t, &matches);
    assert_eq!(synced.len(), 6);
}

#[test]
fn two_teams_get_a_final_from_the_round_robin() {
    let t = teams(2);
    let mut matches = generate_round_robin(&t);
    assert!(sync_knockouts(&t, &matches).iter().all(|m| m.stage == MatchStage::RoundRobin));

    set_result(&mut matches, t[1].id, t[0].id, 3, 2);
    let synced = sync_knockouts(&t, &matches);
    let final_match = find(&synced, MatchStage::Final).unwrap();
    assert_eq!((final_match.home_id, final_match.away_id), (t[1].id, t[0].id));
    assert_eq!(final_match.slot, 2);
    assert_eq!(final_match.status, MatchStatus::Scheduled);
}

#[test]
fn too_few_teams_produce_nothing() {
    assert!(sync_knockouts(&[], &[]).is_empty());
    let t = teams(1);
    assert!(sync_knockouts(&t, &generate_round_robin(&t)).is_empty());
}

#[test]
fn output_is_sorted_by_slot() {
    let t = teams(5);
    let mut matches = sync_knockouts(&t, &ranked_round_robin(&t));
    set_score(&mut matches, bracket_id(MatchStage::Qualification), 3, 0);
    matches.reverse();
    let synced = sync_knockouts(&t, &matches);
    assert!(synced.windows(2).all(|w| w[0].slot <= w[1].slot));
}

/// Give every open match a random result; knockouts are sometimes left level,
/// sometimes settled by extra time or penalties.
fn play_open_matches(rng: &mut StdRng, matches: &mut [Match]) {
    for m in matches.iter_mut() {
        if m.status == MatchStatus::Completed || !rng.gen_bool(0.8) {
            continue;
        }
        let home = rng.gen_range(0..=3);
        let away = if rng.gen_bool(0.3) { home } else { rng.gen_range(0..=3) };
        m.home_score = Some(home);
        m.away_score = Some(away);
        if m.stage.is_knockout() && home == away {
            match rng.gen_range(0..3) {
                0 => {
                    m.extra_time_home = Some(1);
                    m.extra_time_away = Some(0);
                    m.resolved_by = Some(TieBreak::ExtraTime);
                }
                1 => {
                    m.pen_home = Some(3);
                    m.pen_away = Some(5);
                    m.resolved_by = Some(TieBreak::Penalties);
                }
                _ => {}
            }
        }
        m.status = status_of(m);
    }
}

#[test]
fn sync_is_idempotent() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..200 {
        let t = teams(rng.gen_range(2..=6));
        let mut matches = generate_round_robin(&t);
        for _ in 0..6 {
            play_open_matches(&mut rng, &mut matches);
            let once = sync_knockouts(&t, &matches);
            let twice = sync_knockouts(&t, &once);
            assert_eq!(once, twice);
            for m in &once {
                assert_eq!(m.status, status_of(m));
            }
            matches = once;
        }
    }
}
