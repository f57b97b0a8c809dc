//! Scheduling and standings engine: pure functions over a snapshot of teams and matches.

mod fixtures;
mod knockouts;
mod results;
mod standings;

pub use fixtures::generate_round_robin;
pub use knockouts::sync_knockouts;
pub use results::{decisive_score, goal_tally, is_complete, match_loser_id, match_winner_id};
pub use standings::calculate_table;
