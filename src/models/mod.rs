//! Data structures for a game night: teams, players, matches, table rows, nights.

mod game;
mod night;
mod table;
mod team;

pub use game::{Match, MatchId, MatchStage, MatchStatus, ParseMatchIdError, TieBreak};
pub use night::{GameNight, NightError, NightId, NightSummary, DEFAULT_NIGHT_TITLE, MAX_SCORE, MAX_TEAMS};
pub use table::{TableRow, POINTS_DRAW, POINTS_LOSS, POINTS_WIN};
pub(crate) use table::signed_goals;
pub use team::{format_player_name, Player, PlayerId, Team, TeamColor, TeamId};
