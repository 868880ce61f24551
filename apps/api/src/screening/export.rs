//! CSV export of the leaderboard.

use thiserror::Error;

use crate::screening::leaderboard::Leaderboard;

pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";
pub const CSV_DISPOSITION: &str = "attachment; filename=\"recruitment_report.csv\"";
pub const CSV_HEADERS: [&str; 5] = [
    "candidate_name",
    "match_score",
    "years_experience",
    "red_flags",
    "filename",
];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV buffer flush failed: {0}")]
    Flush(String),
}

/// UTF-8, comma-separated, header row first, rows in leaderboard order.
/// The header is written even when the board is empty.
pub fn leaderboard_csv(board: &Leaderboard) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADERS)?;
    for row in &board.rows {
        writer.write_record([
            row.candidate_name.as_str(),
            row.match_score.to_string().as_str(),
            row.years_experience.as_str(),
            row.red_flags.as_str(),
            row.filename.as_str(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| ExportError::Flush(e.to_string()))
}
