//! Round-robin fixture generation (circle method).

use crate::models::{Match, Team, TeamId};

/// Generate the full round-robin for `teams`: every pair meets exactly once.
///
/// 1. With an odd count, add a bye so the roster is even.
/// 2. Each round pairs position `i` with position `len - 1 - i`; a pairing with the bye is skipped.
/// 3. Between rounds every position except the first rotates one step.
///
/// Slots are `round * half + index + 1`, so skipped bye pairings leave gaps.
/// Fewer than two teams give an empty schedule.
pub fn generate_round_robin(teams: &[Team]) -> Vec<Match> {
    if teams.len() < 2 {
        return Vec::new();
    }
    let mut rotating: Vec<Option<TeamId>> = teams.iter().map(|t| Some(t.id)).collect();
    if rotating.len() % 2 == 1 {
        rotating.push(None);
    }
    let rounds = rotating.len() - 1;
    let half = rotating.len() / 2;
    let mut matches = Vec::with_capacity(teams.len() * (teams.len() - 1) / 2);

    for round in 0..rounds {
        for i in 0..half {
            let pairing = (rotating[i], rotating[rotating.len() - 1 - i]);
            if let (Some(home), Some(away)) = pairing {
                let slot = (round * half + i + 1) as u32;
                matches.push(Match::fixture(slot, home, away));
            }
        }
        rotating[1..].rotate_right(1);
    }
    matches
}
