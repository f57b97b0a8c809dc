//! Knockout bracket: re-derives qualification, semi-finals, consolation and final
//! from the round-robin results on every call.
//!
//! Bracket matches are keyed by their stage. Seeding a stage overwrites the teams and
//! slot and carries over whatever results the previous match under that key had, so an
//! edit upstream re-pairs a match instead of duplicating or discarding it.

use crate::logic::results::{is_complete, match_loser_id, match_winner_id};
use crate::logic::standings::calculate_table;
use crate::models::{Match, MatchId, MatchStage, MatchStatus, TableRow, Team, TeamId};
use std::collections::{BTreeMap, HashMap};

/// Return the night's match list with the bracket brought up to date, sorted by slot.
///
/// Round-robin matches are kept as they are. Stages that cannot be seeded yet (or no
/// longer can) are left out, except a completed qualification, which is never re-seeded.
/// Calling this on its own output changes nothing.
pub fn sync_knockouts(teams: &[Team], matches: &[Match]) -> Vec<Match> {
    let round_robin: Vec<Match> = matches
        .iter()
        .filter(|m| m.stage == MatchStage::RoundRobin)
        .cloned()
        .collect();
    let mut bracket = Bracket::new(matches);

    let team_count = teams.len();
    let rr_complete = !round_robin.is_empty() && round_robin.iter().all(is_complete);
    let rr_table = calculate_table(teams, &round_robin);
    let last_rr_slot = round_robin.iter().map(|m| m.slot).max().unwrap_or(0);
    let odd = team_count % 2 == 1;
    let need_qualification = rr_complete && team_count >= 3 && odd;

    match bracket.prior(MatchStage::Qualification) {
        Some(done) if is_complete(done) => bracket.keep(done),
        _ if need_qualification && rr_table.len() >= 2 => {
            let bottom = &rr_table[rr_table.len() - 2..];
            bracket.seed(
                MatchStage::Qualification,
                last_rr_slot + 1,
                bottom[0].team_id,
                bottom[1].team_id,
            );
        }
        _ => {}
    }

    let qualification = bracket.get(MatchStage::Qualification).cloned();
    let qualification_winner = qualification.as_ref().and_then(match_winner_id);
    let last_slot = qualification
        .as_ref()
        .map_or(last_rr_slot, |q| q.slot.max(last_rr_slot));
    // Teams that did not play the qualification, best first.
    let byes: Vec<&TableRow> = rr_table
        .iter()
        .filter(|row| qualification.as_ref().map_or(true, |q| !q.involves(row.team_id)))
        .collect();

    if rr_complete {
        match team_count {
            2 => {
                bracket.seed(
                    MatchStage::Final,
                    last_rr_slot + 1,
                    rr_table[0].team_id,
                    rr_table[1].team_id,
                );
            }
            3 => {
                if let (Some(top), Some(winner)) = (byes.first(), qualification_winner) {
                    bracket.seed(MatchStage::Final, last_slot + 1, top.team_id, winner);
                }
            }
            n if n >= 4 => {
                let seeds: Option<[TeamId; 4]> = if !odd {
                    Some([
                        rr_table[0].team_id,
                        rr_table[1].team_id,
                        rr_table[2].team_id,
                        rr_table[3].team_id,
                    ])
                } else {
                    match (byes.as_slice(), qualification_winner) {
                        ([first, second, third, ..], Some(winner)) => {
                            Some([first.team_id, second.team_id, third.team_id, winner])
                        }
                        _ => None,
                    }
                };
                if let Some(seeds) = seeds {
                    let slot = last_slot + 1;
                    bracket.seed(MatchStage::SemiFinal1, slot, seeds[0], seeds[3]);
                    bracket.seed(MatchStage::SemiFinal2, slot + 1, seeds[1], seeds[2]);
                }
            }
            _ => {}
        }
    }

    if team_count >= 4 {
        seed_medal_matches(&mut bracket);
    }

    let mut next = round_robin;
    next.extend(bracket.into_matches());
    next.sort_by_key(|m| m.slot);
    next
}

/// Final between the semi-final winners and consolation between the losers,
/// once both semi-finals are complete.
fn seed_medal_matches(bracket: &mut Bracket<'_>) {
    let (Some(semi1), Some(semi2)) = (
        bracket.get(MatchStage::SemiFinal1),
        bracket.get(MatchStage::SemiFinal2),
    ) else {
        return;
    };
    if !is_complete(semi1) || !is_complete(semi2) {
        return;
    }
    let slot = semi1.slot.max(semi2.slot);
    let winners = (match_winner_id(semi1), match_winner_id(semi2));
    let losers = (match_loser_id(semi1), match_loser_id(semi2));

    if let (Some(home), Some(away)) = winners {
        bracket.seed(MatchStage::Final, slot + 1, home, away);
    }
    if let (Some(home), Some(away)) = losers {
        bracket.seed(MatchStage::Consolation, slot + 2, home, away);
    }
}

/// Bracket under construction: previous matches by stage, and the freshly derived ones.
struct Bracket<'a> {
    prior: HashMap<MatchStage, &'a Match>,
    next: BTreeMap<MatchStage, Match>,
}

impl<'a> Bracket<'a> {
    fn new(matches: &'a [Match]) -> Self {
        let prior = matches
            .iter()
            .filter(|m| m.stage.is_knockout() && m.id == MatchId::Bracket(m.stage))
            .map(|m| (m.stage, m))
            .collect();
        Self {
            prior,
            next: BTreeMap::new(),
        }
    }

    fn prior(&self, stage: MatchStage) -> Option<&'a Match> {
        self.prior.get(&stage).copied()
    }

    fn get(&self, stage: MatchStage) -> Option<&Match> {
        self.next.get(&stage)
    }

    /// Carry a completed match over unchanged.
    fn keep(&mut self, m: &Match) {
        let mut m = m.clone();
        m.status = MatchStatus::Completed;
        self.next.insert(m.stage, m);
    }

    /// Upsert: teams and slot from the derivation, results and timer from the previous match.
    fn seed(&mut self, stage: MatchStage, slot: u32, home_id: TeamId, away_id: TeamId) {
        let mut m = Match::bracket(stage, slot, home_id, away_id);
        if let Some(prev) = self.prior(stage) {
            m.home_score = prev.home_score;
            m.away_score = prev.away_score;
            m.extra_time_home = prev.extra_time_home;
            m.extra_time_away = prev.extra_time_away;
            m.pen_home = prev.pen_home;
            m.pen_away = prev.pen_away;
            m.resolved_by = prev.resolved_by;
            m.duration_seconds = prev.duration_seconds;
        }
        m.status = if is_complete(&m) {
            MatchStatus::Completed
        } else {
            MatchStatus::Scheduled
        };
        self.next.insert(stage, m);
    }

    fn into_matches(self) -> impl Iterator<Item = Match> {
        self.next.into_values()
    }
}
