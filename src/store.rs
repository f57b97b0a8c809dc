//! Tournament state store: every game night, the current-night pointer and the
//! reusable player library. All mutations act on the current night unless stated.

use crate::models::{
    format_player_name, GameNight, MatchId, NightError, NightId, Player, PlayerId, TeamColor, TeamId,
    TieBreak, DEFAULT_NIGHT_TITLE,
};
use crate::storage::{SavedState, Storage};

#[derive(Clone, Debug)]
pub struct TournamentStore {
    /// Most recent night first.
    nights: Vec<GameNight>,
    current_night_id: Option<NightId>,
    library: Vec<Player>,
}

impl Default for TournamentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TournamentStore {
    /// A store holding one empty night.
    pub fn new() -> Self {
        let night = GameNight::new(DEFAULT_NIGHT_TITLE, Vec::new());
        Self {
            current_night_id: Some(night.id),
            nights: vec![night],
            library: Vec::new(),
        }
    }

    /// Rebuild from saved state. Every bracket is re-derived; the first night becomes current.
    pub fn from_saved(saved: SavedState) -> Self {
        if saved.nights.is_empty() {
            return Self {
                library: saved.library,
                ..Self::new()
            };
        }
        let nights: Vec<GameNight> = saved
            .nights
            .into_iter()
            .map(|mut night| {
                night.resync();
                night
            })
            .collect();
        Self {
            current_night_id: nights.first().map(|n| n.id),
            nights,
            library: saved.library,
        }
    }

    /// Load from disk. Nothing saved, or a read failure, starts fresh.
    pub fn load(storage: &Storage) -> Self {
        match storage.load() {
            Ok(Some(saved)) => {
                log::info!("Loaded {} game night(s) from {}", saved.nights.len(), storage.path().display());
                Self::from_saved(saved)
            }
            Ok(None) => Self::new(),
            Err(e) => {
                log::warn!("Failed to load stored game nights, starting fresh: {}", e);
                Self::new()
            }
        }
    }

    /// Snapshot for persistence.
    pub fn to_saved(&self) -> SavedState {
        SavedState {
            nights: self.nights.clone(),
            library: self.library.clone(),
        }
    }

    pub fn nights(&self) -> &[GameNight] {
        &self.nights
    }

    pub fn night(&self, id: NightId) -> Option<&GameNight> {
        self.nights.iter().find(|n| n.id == id)
    }

    pub fn current_night_id(&self) -> Option<NightId> {
        self.current_night_id
    }

    pub fn current_night(&self) -> Option<&GameNight> {
        self.current_night_id.and_then(|id| self.night(id))
    }

    pub fn library(&self) -> &[Player] {
        &self.library
    }

    fn current_mut(&mut self) -> Result<&mut GameNight, NightError> {
        let id = self.current_night_id.ok_or(NightError::NoCurrentNight)?;
        self.nights
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or(NightError::NoCurrentNight)
    }

    pub fn add_team(&mut self, name: &str, color: Option<TeamColor>) -> Result<TeamId, NightError> {
        let id = self.current_mut()?.add_team(name, color)?;
        log::debug!("Added team {} ({})", name.trim(), id);
        Ok(id)
    }

    pub fn rename_team(&mut self, team_id: TeamId, name: &str) -> Result<(), NightError> {
        self.current_mut()?.rename_team(team_id, name)
    }

    pub fn recolor_team(&mut self, team_id: TeamId, color: TeamColor) -> Result<(), NightError> {
        self.current_mut()?.recolor_team(team_id, color)
    }

    pub fn remove_team(&mut self, team_id: TeamId) -> Result<(), NightError> {
        self.current_mut()?.remove_team(team_id)?;
        log::debug!("Removed team {}", team_id);
        Ok(())
    }

    /// Create a player on a team. The name is also remembered in the library.
    pub fn add_player(&mut self, team_id: TeamId, name: &str) -> Result<Player, NightError> {
        let name = format_player_name(name).ok_or(NightError::EmptyName)?;
        let player = Player::new(name);
        self.current_mut()?.add_player(team_id, player.clone())?;
        if !self.library.iter().any(|p| p.name.eq_ignore_ascii_case(&player.name)) {
            self.library.push(player.clone());
        }
        Ok(player)
    }

    /// Put a player already known to the night or the library on a team.
    pub fn add_existing_player(&mut self, team_id: TeamId, player_id: PlayerId) -> Result<(), NightError> {
        let player = self
            .current_night()
            .ok_or(NightError::NoCurrentNight)?
            .player(player_id)
            .cloned()
            .or_else(|| self.library.iter().find(|p| p.id == player_id).cloned())
            .ok_or(NightError::PlayerNotFound(player_id))?;
        self.current_mut()?.add_player(team_id, player)
    }

    pub fn remove_player(&mut self, team_id: TeamId, player_id: PlayerId) -> Result<(), NightError> {
        self.current_mut()?.remove_player(team_id, player_id)
    }

    pub fn transfer_player(
        &mut self,
        player_id: PlayerId,
        from_team_id: TeamId,
        to_team_id: TeamId,
    ) -> Result<(), NightError> {
        self.current_mut()?.transfer_player(player_id, from_team_id, to_team_id)
    }

    pub fn record_score(
        &mut self,
        match_id: MatchId,
        home: Option<u32>,
        away: Option<u32>,
    ) -> Result<(), NightError> {
        self.current_mut()?.record_score(match_id, home, away)?;
        log::debug!("Recorded score {:?}-{:?} for match {}", home, away, match_id);
        Ok(())
    }

    pub fn resolve_tie(
        &mut self,
        match_id: MatchId,
        method: TieBreak,
        home: u32,
        away: u32,
    ) -> Result<(), NightError> {
        self.current_mut()?.resolve_tie(match_id, method, home, away)?;
        log::debug!("Resolved match {} by {} {}-{}", match_id, method, home, away);
        Ok(())
    }

    pub fn set_match_duration(&mut self, match_id: MatchId, seconds: u32) -> Result<(), NightError> {
        self.current_mut()?.set_match_duration(match_id, seconds)
    }

    /// Attach a match to the timer, or detach with `None`.
    pub fn attach_timer(&mut self, match_id: Option<MatchId>) -> Result<(), NightError> {
        self.current_mut()?.attach_timer(match_id)
    }

    /// Regenerate the current night's fixtures; rosters stay, results go.
    pub fn reset_night(&mut self) -> Result<(), NightError> {
        self.current_mut()?.reset();
        Ok(())
    }

    pub fn rename_night(&mut self, title: &str) -> Result<(), NightError> {
        self.current_mut()?.rename(title)
    }

    /// Start a new night and make it current. With `carry_over_teams`, the current
    /// night's teams (and copies of their rosters) are taken along.
    pub fn start_night(&mut self, title: Option<&str>, carry_over_teams: bool) -> NightId {
        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_NIGHT_TITLE);
        let teams = match (carry_over_teams, self.current_night()) {
            (true, Some(current)) => current.teams.clone(),
            _ => Vec::new(),
        };
        let night = GameNight::new(title, teams);
        let id = night.id;
        log::info!("Started game night {} ({})", night.title, id);
        self.nights.insert(0, night);
        self.current_night_id = Some(id);
        id
    }

    pub fn set_current_night(&mut self, id: NightId) -> Result<(), NightError> {
        if self.night(id).is_none() {
            return Err(NightError::NightNotFound(id));
        }
        self.current_night_id = Some(id);
        Ok(())
    }

    /// Drop every night and the library, leaving one fresh night.
    pub fn reset_all(&mut self) {
        log::info!("Wiping {} game night(s)", self.nights.len());
        *self = Self::new();
    }

    /// Add a name to the library. A name already present (ignoring case) returns that entry.
    pub fn add_library_player(&mut self, name: &str) -> Result<Player, NightError> {
        let name = format_player_name(name).ok_or(NightError::EmptyName)?;
        if let Some(existing) = self.library.iter().find(|p| p.name.eq_ignore_ascii_case(&name)) {
            return Ok(existing.clone());
        }
        let player = Player::new(name);
        self.library.push(player.clone());
        Ok(player)
    }

    /// Add many names at once; returns only the newly created entries.
    pub fn add_library_players<S: AsRef<str>>(&mut self, names: &[S]) -> Vec<Player> {
        let mut added = Vec::new();
        for name in names.iter().filter_map(|n| format_player_name(n.as_ref())) {
            if self.library.iter().any(|p| p.name.eq_ignore_ascii_case(&name)) {
                continue;
            }
            let player = Player::new(name);
            self.library.push(player.clone());
            added.push(player);
        }
        added
    }

    /// Remove a player from the library and from every team of every night.
    pub fn remove_library_player(&mut self, player_id: PlayerId) -> Result<(), NightError> {
        let idx = self
            .library
            .iter()
            .position(|p| p.id == player_id)
            .ok_or(NightError::PlayerNotFound(player_id))?;
        self.library.remove(idx);
        for night in &mut self.nights {
            night.purge_player(player_id);
        }
        Ok(())
    }
}
