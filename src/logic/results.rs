//! Completeness and winner rules for a single match.

use crate::models::{Match, TeamId, TieBreak};

/// Whether a match has a usable result.
///
/// Round-robin: both scores entered, a draw included.
/// Knockout: both scores entered and a winner decided, in regular time or by the
/// recorded extra-time / penalty result. A knockout level after regular time with no
/// tie-break yet is not complete.
pub fn is_complete(m: &Match) -> bool {
    let (Some(home), Some(away)) = (m.home_score, m.away_score) else {
        return false;
    };
    if !m.stage.is_knockout() || home != away {
        return true;
    }
    tie_break_score(m).is_some_and(|(h, a)| h != a)
}

/// Extra-time or penalty score for the recorded tie-break method, if both sides are set.
fn tie_break_score(m: &Match) -> Option<(u32, u32)> {
    match m.resolved_by? {
        TieBreak::ExtraTime => Some((m.extra_time_home?, m.extra_time_away?)),
        TieBreak::Penalties => Some((m.pen_home?, m.pen_away?)),
    }
}

/// The scoreline that decided the match, home first.
///
/// Regular time unless a level knockout was settled: then regular plus extra-time goals,
/// or the shoot-out score. `None` until the match is complete. Widened to `u64` so the
/// sum of two stored scores cannot overflow.
pub fn decisive_score(m: &Match) -> Option<(u64, u64)> {
    if !is_complete(m) {
        return None;
    }
    let home = u64::from(m.home_score?);
    let away = u64::from(m.away_score?);
    if !m.stage.is_knockout() || home != away {
        return Some((home, away));
    }
    match (m.resolved_by?, tie_break_score(m)?) {
        (TieBreak::ExtraTime, (h, a)) => Some((home + u64::from(h), away + u64::from(a))),
        (TieBreak::Penalties, (h, a)) => Some((u64::from(h), u64::from(a))),
    }
}

/// Goals counted in the table: regular time, plus extra time when it settled the match.
/// Shoot-out goals never count.
pub fn goal_tally(m: &Match) -> Option<(u64, u64)> {
    if !is_complete(m) {
        return None;
    }
    let home = u64::from(m.home_score?);
    let away = u64::from(m.away_score?);
    match (m.resolved_by, m.extra_time_home, m.extra_time_away) {
        (Some(TieBreak::ExtraTime), Some(h), Some(a)) if m.stage.is_knockout() && home == away => {
            Some((home + u64::from(h), away + u64::from(a)))
        }
        _ => Some((home, away)),
    }
}

/// Winner of a complete match; `None` for a draw or an unfinished match.
pub fn match_winner_id(m: &Match) -> Option<TeamId> {
    let (home, away) = decisive_score(m)?;
    if home > away {
        Some(m.home_id)
    } else if away > home {
        Some(m.away_id)
    } else {
        None
    }
}

/// Loser of a complete match; `None` for a draw or an unfinished match.
pub fn match_loser_id(m: &Match) -> Option<TeamId> {
    let winner = match_winner_id(m)?;
    Some(if winner == m.home_id { m.away_id } else { m.home_id })
}
