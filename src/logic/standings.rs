//! Standings table: accumulation and ranking.

use crate::logic::results::{decisive_score, goal_tally};
use crate::models::{signed_goals, Match, TableRow, Team, TeamId, POINTS_DRAW, POINTS_WIN};
use std::cmp::Ordering;
use std::collections::HashMap;

/// One row per team, sorted best first.
///
/// Only complete matches count. Goals are regular time plus extra time when it settled
/// the match; a knockout decided on penalties counts as a draw in the points column.
/// Matches involving a team not in `teams` are ignored.
///
/// Order: points, goal difference, goals for (all descending); then, among teams level
/// on all three, a head-to-head mini-league of their meetings on the decisive scoreline
/// (points, then goal difference); then name ascending.
pub fn calculate_table(teams: &[Team], matches: &[Match]) -> Vec<TableRow> {
    let mut rows: Vec<TableRow> = teams.iter().map(TableRow::for_team).collect();
    let index: HashMap<TeamId, usize> = rows.iter().enumerate().map(|(i, r)| (r.team_id, i)).collect();

    for m in matches {
        let (Some(&home), Some(&away)) = (index.get(&m.home_id), index.get(&m.away_id)) else {
            continue;
        };
        let Some((home_goals, away_goals)) = goal_tally(m) else {
            continue;
        };
        rows[home].record(home_goals, away_goals);
        rows[away].record(away_goals, home_goals);
    }

    let mut ranked: Vec<Ranked> = rows
        .iter()
        .map(|row| {
            let tied: Vec<TeamId> = rows
                .iter()
                .filter(|other| level(row, other))
                .map(|other| other.team_id)
                .collect();
            let (h2h_points, h2h_goal_difference) = mini_league(row.team_id, &tied, matches);
            Ranked {
                row: row.clone(),
                h2h_points,
                h2h_goal_difference,
            }
        })
        .collect();

    ranked.sort_by(compare_ranked);
    ranked.into_iter().map(|r| r.row).collect()
}

struct Ranked {
    row: TableRow,
    h2h_points: u32,
    h2h_goal_difference: i64,
}

/// `Less` means `a` ranks above `b`. Every key is fixed per row, so this is a total order.
fn compare_ranked(a: &Ranked, b: &Ranked) -> Ordering {
    b.row
        .points
        .cmp(&a.row.points)
        .then_with(|| b.row.goal_difference.cmp(&a.row.goal_difference))
        .then_with(|| b.row.goals_for.cmp(&a.row.goals_for))
        .then_with(|| b.h2h_points.cmp(&a.h2h_points))
        .then_with(|| b.h2h_goal_difference.cmp(&a.h2h_goal_difference))
        .then_with(|| a.row.name.cmp(&b.row.name))
}

/// Level on points, goal difference and goals for.
fn level(a: &TableRow, b: &TableRow) -> bool {
    a.points == b.points && a.goal_difference == b.goal_difference && a.goals_for == b.goals_for
}

/// Points and goal difference for `team` over complete matches against the other teams
/// in `group`, using the decisive scoreline.
fn mini_league(team: TeamId, group: &[TeamId], matches: &[Match]) -> (u32, i64) {
    let mut points = 0;
    let mut goal_difference = 0;
    for m in matches {
        let opponent = if m.home_id == team {
            m.away_id
        } else if m.away_id == team {
            m.home_id
        } else {
            continue;
        };
        if opponent == team || !group.contains(&opponent) {
            continue;
        }
        let Some((home, away)) = decisive_score(m) else {
            continue;
        };
        let (scored, conceded) = if m.home_id == team { (home, away) } else { (away, home) };
        goal_difference += signed_goals(scored) - signed_goals(conceded);
        points += match scored.cmp(&conceded) {
            Ordering::Greater => POINTS_WIN,
            Ordering::Equal => POINTS_DRAW,
            Ordering::Less => 0,
        };
    }
    (points, goal_difference)
}
