//! Match, MatchStage and tie-break data for one fixture of a game night.

use crate::models::team::TeamId;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Phase of the night this match belongs to.
///
/// Bracket stages double as the fixed id of their (single) match, hence camelCase.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchStage {
    RoundRobin,
    Qualification,
    SemiFinal1,
    SemiFinal2,
    Consolation,
    Final,
}

impl MatchStage {
    pub const BRACKET: [MatchStage; 5] = [
        MatchStage::Qualification,
        MatchStage::SemiFinal1,
        MatchStage::SemiFinal2,
        MatchStage::Consolation,
        MatchStage::Final,
    ];

    pub fn is_knockout(self) -> bool {
        self != MatchStage::RoundRobin
    }

    /// Display label for the stage.
    pub fn label(self) -> &'static str {
        match self {
            MatchStage::RoundRobin => "Round Robin",
            MatchStage::Qualification => "Qualification",
            MatchStage::SemiFinal1 => "Semi-final 1",
            MatchStage::SemiFinal2 => "Semi-final 2",
            MatchStage::Consolation => "Consolation",
            MatchStage::Final => "Final",
        }
    }

    fn key(self) -> &'static str {
        match self {
            MatchStage::RoundRobin => "roundRobin",
            MatchStage::Qualification => "qualification",
            MatchStage::SemiFinal1 => "semiFinal1",
            MatchStage::SemiFinal2 => "semiFinal2",
            MatchStage::Consolation => "consolation",
            MatchStage::Final => "final",
        }
    }
}

/// Identifier of a match: generated for round-robin fixtures, fixed per stage for the bracket.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MatchId {
    Fixture(Uuid),
    Bracket(MatchStage),
}

impl std::fmt::Display for MatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchId::Fixture(id) => write!(f, "{}", id),
            MatchId::Bracket(stage) => f.write_str(stage.key()),
        }
    }
}

/// Error returned when a string is neither a uuid nor a bracket stage key.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParseMatchIdError(pub String);

impl std::fmt::Display for ParseMatchIdError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid match id: {}", self.0)
    }
}

impl FromStr for MatchId {
    type Err = ParseMatchIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(id) = Uuid::parse_str(s) {
            return Ok(MatchId::Fixture(id));
        }
        MatchStage::BRACKET
            .into_iter()
            .find(|stage| stage.key() == s)
            .map(MatchId::Bracket)
            .ok_or_else(|| ParseMatchIdError(s.to_string()))
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Scheduled,
    Completed,
}

/// How a knockout match level after regular time was settled.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TieBreak {
    ExtraTime,
    Penalties,
}

impl std::fmt::Display for TieBreak {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TieBreak::ExtraTime => f.write_str("extraTime"),
            TieBreak::Penalties => f.write_str("penalties"),
        }
    }
}

/// A single fixture between a home and an away team.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub stage: MatchStage,
    /// Chronological ordering key across the whole night.
    pub slot: u32,
    pub home_id: TeamId,
    pub away_id: TeamId,
    /// Regular-time score. None if not entered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub away_score: Option<u32>,
    /// Goals scored in extra time only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_time_home: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_time_away: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pen_home: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pen_away: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_by: Option<TieBreak>,
    #[serde(default)]
    pub status: MatchStatus,
    /// Timer length for this match; opaque to scheduling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u32>,
}

impl Match {
    /// A scheduled match with no scores.
    pub fn new(id: MatchId, stage: MatchStage, slot: u32, home_id: TeamId, away_id: TeamId) -> Self {
        Self {
            id,
            stage,
            slot,
            home_id,
            away_id,
            home_score: None,
            away_score: None,
            extra_time_home: None,
            extra_time_away: None,
            pen_home: None,
            pen_away: None,
            resolved_by: None,
            status: MatchStatus::Scheduled,
            duration_seconds: None,
        }
    }

    /// A round-robin fixture with a freshly generated id.
    pub fn fixture(slot: u32, home_id: TeamId, away_id: TeamId) -> Self {
        Self::new(
            MatchId::Fixture(Uuid::new_v4()),
            MatchStage::RoundRobin,
            slot,
            home_id,
            away_id,
        )
    }

    /// A bracket match, identified by its stage.
    pub fn bracket(stage: MatchStage, slot: u32, home_id: TeamId, away_id: TeamId) -> Self {
        Self::new(MatchId::Bracket(stage), stage, slot, home_id, away_id)
    }

    pub fn involves(&self, team_id: TeamId) -> bool {
        self.home_id == team_id || self.away_id == team_id
    }

    /// Drop extra-time and penalty data.
    pub fn clear_tie_break(&mut self) {
        self.extra_time_home = None;
        self.extra_time_away = None;
        self.pen_home = None;
        self.pen_away = None;
        self.resolved_by = None;
    }
}
