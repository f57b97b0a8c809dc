//! Game night organizer: round-robin fixtures, knockout bracket and live standings
//! for 2 to 6 teams, with a store, JSON persistence and CSV export around the engine.

pub mod export;
pub mod logic;
pub mod models;
pub mod storage;
pub mod store;

pub use export::nights_to_csv;
pub use logic::{
    calculate_table, decisive_score, generate_round_robin, goal_tally, is_complete,
    match_loser_id, match_winner_id, sync_knockouts,
};
pub use models::{
    format_player_name, GameNight, Match, MatchId, MatchStage, MatchStatus, NightError, NightId,
    NightSummary, ParseMatchIdError, Player, PlayerId, TableRow, Team, TeamColor, TeamId, TieBreak, MAX_SCORE,
    MAX_TEAMS,
};
pub use storage::{SavedState, Storage, StorageError};
pub use store::TournamentStore;
