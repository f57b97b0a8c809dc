//! CSV export of game nights: one line per night with its champion and final score.

use crate::logic::match_winner_id;
use crate::models::GameNight;

pub const CSV_HEADER: [&str; 5] = ["Title", "Date", "Teams", "Winner", "Final Score"];

/// Render nights as CSV, every field quoted.
pub fn nights_to_csv(nights: &[GameNight]) -> Result<String, csv::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(Vec::new());
    wtr.write_record(CSV_HEADER)?;

    for night in nights {
        let final_match = night.final_match();
        let winner = final_match
            .and_then(match_winner_id)
            .and_then(|id| night.team(id))
            .map(|t| t.name.as_str())
            .unwrap_or("");
        let score = match final_match {
            Some(m) => match (m.home_score, m.away_score) {
                (Some(home), Some(away)) => match m.resolved_by {
                    Some(method) => format!("{}-{} ({})", home, away, method),
                    None => format!("{}-{}", home, away),
                },
                _ => String::new(),
            },
            None => String::new(),
        };
        let date = night.created_at.format("%Y-%m-%d %H:%M").to_string();
        let team_count = night.teams.len().to_string();
        wtr.write_record([
            night.title.as_str(),
            date.as_str(),
            team_count.as_str(),
            winner,
            score.as_str(),
        ])?;
    }

    let bytes = wtr.into_inner().map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
