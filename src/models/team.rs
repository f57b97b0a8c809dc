//! Team, Player and the fixed team colour palette.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a team (used in matches and table rows).
pub type TeamId = Uuid;

/// Unique identifier for a player, shared between a night roster and the library.
pub type PlayerId = Uuid;

/// Team colours. A colour may be used by at most one team per night.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum TeamColor {
    #[serde(rename = "#2563EB")]
    Blue,
    #[serde(rename = "#22C55E")]
    Green,
    #[serde(rename = "#FACC15")]
    Yellow,
    #[serde(rename = "#EC4899")]
    Pink,
    #[serde(rename = "#F97316")]
    Orange,
    #[serde(rename = "#EF4444")]
    Red,
}

impl TeamColor {
    /// Palette order; the first free entry is handed to a team added without a colour.
    pub const PALETTE: [TeamColor; 6] = [
        TeamColor::Blue,
        TeamColor::Green,
        TeamColor::Yellow,
        TeamColor::Pink,
        TeamColor::Orange,
        TeamColor::Red,
    ];

    pub fn hex(self) -> &'static str {
        match self {
            TeamColor::Blue => "#2563EB",
            TeamColor::Green => "#22C55E",
            TeamColor::Yellow => "#FACC15",
            TeamColor::Pink => "#EC4899",
            TeamColor::Orange => "#F97316",
            TeamColor::Red => "#EF4444",
        }
    }

    /// First palette colour not in `used`.
    pub fn first_free(used: impl IntoIterator<Item = TeamColor>) -> Option<TeamColor> {
        let used: Vec<TeamColor> = used.into_iter().collect();
        Self::PALETTE.into_iter().find(|c| !used.contains(c))
    }
}

impl std::fmt::Display for TeamColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.hex())
    }
}

/// A player on a team roster or in the reusable library.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
}

impl Player {
    /// Create a player with a fresh id. The name is taken as-is; see [`format_player_name`].
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

/// Normalise a typed player name: trim, and turn "Last, First" into "First Last".
/// Returns `None` when nothing is left.
pub fn format_player_name(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let formatted = match trimmed.split_once(',') {
        Some((last, first)) => {
            // Anything after a second comma is dropped.
            let first = first.split(',').next().unwrap_or("").trim();
            format!("{} {}", first, last.trim()).trim().to_string()
        }
        None => trimmed.to_string(),
    };
    if formatted.is_empty() {
        None
    } else {
        Some(formatted)
    }
}

/// A team taking part in one game night.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub color: TeamColor,
    pub players: Vec<Player>,
}

impl Team {
    pub fn new(name: impl Into<String>, color: TeamColor) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            color,
            players: Vec::new(),
        }
    }

    pub fn has_player(&self, player_id: PlayerId) -> bool {
        self.players.iter().any(|p| p.id == player_id)
    }
}
