//! Derived standings row. Never stored, recomputed from matches on every read.

use crate::models::team::{Team, TeamColor, TeamId};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub team_id: TeamId,
    pub name: String,
    pub color: TeamColor,
    pub played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_for: u64,
    pub goals_against: u64,
    pub goal_difference: i64,
    pub points: u32,
}

impl TableRow {
    /// Empty row for a team that has not played yet.
    pub fn for_team(team: &Team) -> Self {
        Self {
            team_id: team.id,
            name: team.name.clone(),
            color: team.color,
            played: 0,
            wins: 0,
            draws: 0,
            losses: 0,
            goals_for: 0,
            goals_against: 0,
            goal_difference: 0,
            points: 0,
        }
    }

    /// Add one completed match from this team's point of view.
    pub(crate) fn record(&mut self, scored: u64, conceded: u64) {
        self.played += 1;
        self.goals_for = self.goals_for.saturating_add(scored);
        self.goals_against = self.goals_against.saturating_add(conceded);
        self.goal_difference = signed_goals(self.goals_for) - signed_goals(self.goals_against);
        if scored > conceded {
            self.wins += 1;
            self.points += POINTS_WIN;
        } else if scored < conceded {
            self.losses += 1;
            self.points += POINTS_LOSS;
        } else {
            self.draws += 1;
            self.points += POINTS_DRAW;
        }
    }
}

/// Goal totals are far below `i64::MAX` for any real night; clamp rather than wrap.
pub(crate) fn signed_goals(goals: u64) -> i64 {
    i64::try_from(goals).unwrap_or(i64::MAX)
}

pub const POINTS_WIN: u32 = 3;
pub const POINTS_DRAW: u32 = 1;
pub const POINTS_LOSS: u32 = 0;
