//! Ranked view over a batch's assessments.

use serde::Serialize;

use crate::screening::models::CandidateAssessment;

/// One table row. Column order matches the CSV export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardRow {
    pub candidate_name: String,
    /// Always within 0–100.
    pub match_score: u8,
    pub years_experience: String,
    pub red_flags: String,
    pub filename: String,
}

/// The expandable per-candidate panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateDetail {
    pub heading: String,
    pub filename: String,
    pub years_experience: String,
    pub skills: String,
    pub summary: String,
    pub red_flags: String,
    pub email_draft: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Leaderboard {
    /// Descending score; ties keep upload order.
    pub rows: Vec<LeaderboardRow>,
    /// Upload order.
    pub details: Vec<CandidateDetail>,
}

impl Leaderboard {
    pub fn from_assessments(assessments: &[CandidateAssessment]) -> Self {
        let mut ranked: Vec<&CandidateAssessment> = assessments.iter().collect();
        // stable sort: ties keep upload order
        ranked.sort_by(|a, b| {
            b.match_score
                .sort_key()
                .total_cmp(&a.match_score.sort_key())
        });

        let rows = ranked
            .into_iter()
            .map(|a| LeaderboardRow {
                candidate_name: a.candidate_name.clone(),
                match_score: a.match_score.percent(),
                years_experience: a.years_experience.clone(),
                red_flags: a.red_flags.clone(),
                filename: a.filename.clone(),
            })
            .collect();

        let details = assessments
            .iter()
            .map(|a| CandidateDetail {
                heading: format!("{}% - {}", a.match_score.percent(), a.candidate_name),
                filename: a.filename.clone(),
                years_experience: a.years_experience.clone(),
                skills: a.key_skills.join(", "),
                summary: a.summary.clone(),
                red_flags: a.red_flags.clone(),
                email_draft: a.email_draft.clone(),
            })
            .collect();

        Self { rows, details }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn assessment(name: &str, score: Value) -> CandidateAssessment {
        CandidateAssessment::from_model_value(
            format!("{}.pdf", name.to_lowercase()),
            &json!({
                "candidate_name": name,
                "match_score": score,
                "key_skills": ["Rust", "Postgres"],
                "years_experience": "4"
            }),
        )
        .unwrap()
    }

    fn names(board: &Leaderboard) -> Vec<&str> {
        board.rows.iter().map(|r| r.candidate_name.as_str()).collect()
    }

    #[test]
    fn test_rows_sorted_by_descending_score() {
        let board = Leaderboard::from_assessments(&[
            assessment("Low", json!(20)),
            assessment("High", json!(95)),
            assessment("Mid", json!(60)),
        ]);
        assert_eq!(names(&board), vec!["High", "Mid", "Low"]);
    }

    #[test]
    fn test_ties_preserve_upload_order() {
        let board = Leaderboard::from_assessments(&[
            assessment("First", json!(70)),
            assessment("Top", json!(90)),
            assessment("Second", json!("70")),
            assessment("Third", json!(70.0)),
        ]);
        assert_eq!(names(&board), vec!["Top", "First", "Second", "Third"]);
    }

    #[test]
    fn test_malformed_scores_rank_last_and_render_in_range() {
        let board = Leaderboard::from_assessments(&[
            assessment("Garbled", json!("excellent")),
            assessment("Overflow", json!(250)),
            assessment("Zero", json!(0)),
        ]);
        assert_eq!(names(&board), vec!["Overflow", "Zero", "Garbled"]);
        assert!(board.rows.iter().all(|r| r.match_score <= 100));
        assert_eq!(board.rows[0].match_score, 100);
        assert_eq!(board.rows[2].match_score, 0);
    }

    #[test]
    fn test_details_follow_upload_order_with_heading() {
        let board = Leaderboard::from_assessments(&[
            assessment("Bob", json!(10)),
            assessment("Amy", json!(90)),
        ]);
        assert_eq!(board.details[0].heading, "10% - Bob");
        assert_eq!(board.details[1].heading, "90% - Amy");
        assert_eq!(board.details[0].skills, "Rust, Postgres");
    }

    #[test]
    fn test_empty_input_gives_empty_board() {
        let board = Leaderboard::from_assessments(&[]);
        assert!(board.rows.is_empty());
        assert!(board.details.is_empty());
    }
}
