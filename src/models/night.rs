//! GameNight: one tournament instance, with the per-night mutations the store exposes.
//!
//! Every mutation either applies fully or returns an error and leaves the night untouched.
//! Score-affecting mutations pipe the match list through [`sync_knockouts`].

use crate::logic::{calculate_table, generate_round_robin, is_complete, match_winner_id, sync_knockouts};
use crate::models::game::{Match, MatchId, MatchStage, MatchStatus, TieBreak};
use crate::models::table::TableRow;
use crate::models::team::{Player, PlayerId, Team, TeamColor, TeamId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Most teams a single night can hold.
pub const MAX_TEAMS: usize = 6;

/// Highest score accepted for regular time, extra time or a shoot-out.
pub const MAX_SCORE: u32 = 999;

/// Title used when a night is started without one.
pub const DEFAULT_NIGHT_TITLE: &str = "Game Night";

/// Unique identifier for a game night.
pub type NightId = Uuid;

/// Errors from night and store mutations. The state is unchanged when one is returned.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum NightError {
    /// Team, player or night name is empty after trimming.
    EmptyName,
    /// The night already has the maximum number of teams.
    TeamLimitReached,
    /// Another team in the night already uses this colour.
    ColorTaken(TeamColor),
    TeamNotFound(TeamId),
    PlayerNotFound(PlayerId),
    /// The player is already on the target team.
    PlayerAlreadyOnTeam(PlayerId),
    /// The player plays for another team of this night; use a transfer instead.
    PlayerOnAnotherTeam(PlayerId),
    MatchNotFound(MatchId),
    /// Tie-breaks only apply to bracket matches.
    NotAKnockoutMatch(MatchId),
    /// Tie-break scores are level, so they would not settle anything.
    TieNotResolved,
    /// A score above [`MAX_SCORE`].
    ScoreOutOfRange(u32),
    NightNotFound(NightId),
    /// The store has no current night.
    NoCurrentNight,
}

impl std::fmt::Display for NightError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NightError::EmptyName => write!(f, "Name must not be empty"),
            NightError::TeamLimitReached => write!(f, "A night can have at most {} teams", MAX_TEAMS),
            NightError::ColorTaken(color) => write!(f, "Colour {} is already used by another team", color),
            NightError::TeamNotFound(_) => write!(f, "Team not found"),
            NightError::PlayerNotFound(_) => write!(f, "Player not found"),
            NightError::PlayerAlreadyOnTeam(_) => write!(f, "Player is already on this team"),
            NightError::PlayerOnAnotherTeam(_) => {
                write!(f, "Player is already on another team; transfer them instead")
            }
            NightError::MatchNotFound(_) => write!(f, "Match not found"),
            NightError::NotAKnockoutMatch(_) => write!(f, "Only knockout matches can be settled by extra time or penalties"),
            NightError::TieNotResolved => write!(f, "Tie-break scores must not be level"),
            NightError::ScoreOutOfRange(score) => {
                write!(f, "Score {} is out of range (at most {})", score, MAX_SCORE)
            }
            NightError::NightNotFound(_) => write!(f, "Game night not found"),
            NightError::NoCurrentNight => write!(f, "No current game night"),
        }
    }
}

impl std::error::Error for NightError {}

/// Short view of a night for history lists.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct NightSummary {
    pub id: NightId,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub winner_id: Option<TeamId>,
    pub team_count: usize,
}

/// One game night: teams, derived fixtures and the match attached to the timer.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameNight {
    pub id: NightId,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub teams: Vec<Team>,
    pub matches: Vec<Match>,
    /// Match attached to the countdown timer, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_match_id: Option<MatchId>,
}

impl GameNight {
    /// Create a night with the round-robin for `teams` already generated.
    pub fn new(title: impl Into<String>, teams: Vec<Team>) -> Self {
        let matches = generate_round_robin(&teams);
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            created_at: Utc::now(),
            teams,
            matches,
            current_match_id: None,
        }
    }

    /// Live standings over every match of the night.
    pub fn table(&self) -> Vec<TableRow> {
        calculate_table(&self.teams, &self.matches)
    }

    /// The `final` match, once seeded.
    pub fn final_match(&self) -> Option<&Match> {
        self.match_by_id(MatchId::Bracket(MatchStage::Final))
    }

    /// Winner of the final, once it is decided.
    pub fn champion_id(&self) -> Option<TeamId> {
        self.final_match().and_then(match_winner_id)
    }

    pub fn summary(&self) -> NightSummary {
        NightSummary {
            id: self.id,
            title: self.title.clone(),
            created_at: self.created_at,
            winner_id: self.champion_id(),
            team_count: self.teams.len(),
        }
    }

    pub fn team(&self, id: TeamId) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }

    pub fn match_by_id(&self, id: MatchId) -> Option<&Match> {
        self.matches.iter().find(|m| m.id == id)
    }

    /// Look up a player on any team of this night.
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.teams.iter().flat_map(|t| t.players.iter()).find(|p| p.id == id)
    }

    fn team_mut(&mut self, id: TeamId) -> Result<&mut Team, NightError> {
        self.teams
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(NightError::TeamNotFound(id))
    }

    fn match_index(&self, id: MatchId) -> Result<usize, NightError> {
        self.matches
            .iter()
            .position(|m| m.id == id)
            .ok_or(NightError::MatchNotFound(id))
    }

    /// Check `color` is free for `team_id` (or for a new team when `None`).
    fn check_color(&self, color: TeamColor, team_id: Option<TeamId>) -> Result<(), NightError> {
        let taken = self
            .teams
            .iter()
            .any(|t| Some(t.id) != team_id && t.color == color);
        if taken {
            return Err(NightError::ColorTaken(color));
        }
        Ok(())
    }

    /// Add a team and regenerate the round-robin (clears all results).
    /// Without a colour, the first free palette colour is used.
    pub fn add_team(&mut self, name: &str, color: Option<TeamColor>) -> Result<TeamId, NightError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(NightError::EmptyName);
        }
        if self.teams.len() >= MAX_TEAMS {
            return Err(NightError::TeamLimitReached);
        }
        let color = match color {
            Some(c) => {
                self.check_color(c, None)?;
                c
            }
            // MAX_TEAMS equals the palette size, so a colour is always free here.
            None => TeamColor::first_free(self.teams.iter().map(|t| t.color))
                .ok_or(NightError::TeamLimitReached)?,
        };
        let team = Team::new(name, color);
        let id = team.id;
        self.teams.push(team);
        self.regenerate_fixtures();
        Ok(id)
    }

    pub fn rename_team(&mut self, team_id: TeamId, name: &str) -> Result<(), NightError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(NightError::EmptyName);
        }
        self.team_mut(team_id)?.name = name.to_string();
        // Name is the last ranking key, so it can change bracket seeds.
        self.resync();
        Ok(())
    }

    pub fn recolor_team(&mut self, team_id: TeamId, color: TeamColor) -> Result<(), NightError> {
        self.team_mut(team_id)?;
        self.check_color(color, Some(team_id))?;
        self.team_mut(team_id)?.color = color;
        Ok(())
    }

    /// Remove a team and regenerate the round-robin for the rest.
    pub fn remove_team(&mut self, team_id: TeamId) -> Result<(), NightError> {
        let idx = self
            .teams
            .iter()
            .position(|t| t.id == team_id)
            .ok_or(NightError::TeamNotFound(team_id))?;
        self.teams.remove(idx);
        self.regenerate_fixtures();
        Ok(())
    }

    /// Put `player` on a team. A player belongs to at most one team per night, so this is
    /// rejected if they are already on any team; moving them is [`Self::transfer_player`].
    pub fn add_player(&mut self, team_id: TeamId, player: Player) -> Result<(), NightError> {
        let owner = self.teams.iter().find(|t| t.has_player(player.id)).map(|t| t.id);
        let team = self.team_mut(team_id)?;
        match owner {
            Some(id) if id == team_id => Err(NightError::PlayerAlreadyOnTeam(player.id)),
            Some(_) => Err(NightError::PlayerOnAnotherTeam(player.id)),
            None => {
                team.players.push(player);
                Ok(())
            }
        }
    }

    pub fn remove_player(&mut self, team_id: TeamId, player_id: PlayerId) -> Result<(), NightError> {
        let team = self.team_mut(team_id)?;
        let idx = team
            .players
            .iter()
            .position(|p| p.id == player_id)
            .ok_or(NightError::PlayerNotFound(player_id))?;
        team.players.remove(idx);
        Ok(())
    }

    /// Move a player from one team to another. Same source and target is a no-op.
    pub fn transfer_player(
        &mut self,
        player_id: PlayerId,
        from_team_id: TeamId,
        to_team_id: TeamId,
    ) -> Result<(), NightError> {
        if from_team_id == to_team_id {
            return Ok(());
        }
        let player = self
            .team(from_team_id)
            .ok_or(NightError::TeamNotFound(from_team_id))?
            .players
            .iter()
            .find(|p| p.id == player_id)
            .cloned()
            .ok_or(NightError::PlayerNotFound(player_id))?;
        let target = self.team_mut(to_team_id)?;
        if target.has_player(player_id) {
            return Err(NightError::PlayerAlreadyOnTeam(player_id));
        }
        target.players.push(player);
        self.team_mut(from_team_id)?.players.retain(|p| p.id != player_id);
        Ok(())
    }

    /// Drop a player from every team (used when they are removed from the library).
    pub(crate) fn purge_player(&mut self, player_id: PlayerId) {
        for team in &mut self.teams {
            team.players.retain(|p| p.id != player_id);
        }
    }

    /// Enter or clear the regular-time score of a match.
    ///
    /// Tie-break data is kept only while the new score is still level in a knockout match
    /// that it could settle; otherwise it is cleared as stale.
    pub fn record_score(
        &mut self,
        match_id: MatchId,
        home: Option<u32>,
        away: Option<u32>,
    ) -> Result<(), NightError> {
        check_score(home.unwrap_or(0))?;
        check_score(away.unwrap_or(0))?;
        let idx = self.match_index(match_id)?;
        let m = &mut self.matches[idx];
        m.home_score = home;
        m.away_score = away;
        let still_level = matches!((home, away), (Some(h), Some(a)) if h == a);
        if !(m.stage.is_knockout() && still_level) {
            m.clear_tie_break();
        }
        m.status = status_of(m);
        self.resync();
        Ok(())
    }

    /// Settle a level knockout match by extra time or penalties.
    ///
    /// Level tie-break scores are rejected. Extra time replaces any earlier penalty result;
    /// penalties keep the extra-time goals that were level before the shoot-out.
    pub fn resolve_tie(
        &mut self,
        match_id: MatchId,
        method: TieBreak,
        home: u32,
        away: u32,
    ) -> Result<(), NightError> {
        check_score(home)?;
        check_score(away)?;
        if home == away {
            return Err(NightError::TieNotResolved);
        }
        let idx = self.match_index(match_id)?;
        let m = &mut self.matches[idx];
        if !m.stage.is_knockout() {
            return Err(NightError::NotAKnockoutMatch(match_id));
        }
        match method {
            TieBreak::ExtraTime => {
                m.extra_time_home = Some(home);
                m.extra_time_away = Some(away);
                m.pen_home = None;
                m.pen_away = None;
            }
            TieBreak::Penalties => {
                m.pen_home = Some(home);
                m.pen_away = Some(away);
            }
        }
        m.resolved_by = Some(method);
        m.status = status_of(m);
        self.resync();
        Ok(())
    }

    pub fn set_match_duration(&mut self, match_id: MatchId, seconds: u32) -> Result<(), NightError> {
        let idx = self.match_index(match_id)?;
        self.matches[idx].duration_seconds = Some(seconds);
        Ok(())
    }

    /// Attach a match to the timer, or detach with `None`.
    pub fn attach_timer(&mut self, match_id: Option<MatchId>) -> Result<(), NightError> {
        if let Some(id) = match_id {
            self.match_index(id)?;
        }
        self.current_match_id = match_id;
        Ok(())
    }

    pub fn rename(&mut self, title: &str) -> Result<(), NightError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(NightError::EmptyName);
        }
        self.title = title.to_string();
        Ok(())
    }

    /// Regenerate fixtures from the current teams. Rosters stay, every result is cleared.
    pub fn reset(&mut self) {
        self.regenerate_fixtures();
    }

    fn regenerate_fixtures(&mut self) {
        self.matches = generate_round_robin(&self.teams);
        self.current_match_id = None;
    }

    /// Re-derive the bracket from the current results.
    pub fn resync(&mut self) {
        self.matches = sync_knockouts(&self.teams, &self.matches);
        if let Some(id) = self.current_match_id {
            if self.match_by_id(id).is_none() {
                self.current_match_id = None;
            }
        }
    }
}

fn check_score(score: u32) -> Result<(), NightError> {
    if score > MAX_SCORE {
        return Err(NightError::ScoreOutOfRange(score));
    }
    Ok(())
}

fn status_of(m: &Match) -> MatchStatus {
    if is_complete(m) {
        MatchStatus::Completed
    } else {
        MatchStatus::Scheduled
    }
}
