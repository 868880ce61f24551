//! LLM-backed assessment of one résumé against one job description.
//!
//! Résumé text is sent untruncated. Identical inputs may score differently
//! across calls; nothing here tries to make the model deterministic.

use serde_json::Value;
use thiserror::Error;

use crate::llm_client::prompts::{fill_template, JSON_ONLY_SYSTEM};
use crate::llm_client::{complete_json, CompletionProvider, CompletionRequest, LlmError, ResponseMode};
use crate::screening::models::CandidateAssessment;
use crate::screening::prompts::{
    LEADERBOARD_PROMPT_TEMPLATE, LEADERBOARD_SYSTEM, REPORT_PROMPT_TEMPLATE, REPORT_SYSTEM,
};

#[derive(Debug, Error)]
pub enum AssessError {
    #[error("model call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("model response is not a JSON object")]
    NotAnObject,

    #[error("model returned an empty report")]
    EmptyReport,
}

/// Asks for a JSON assessment and reads it into a `CandidateAssessment`.
pub async fn assess_structured(
    llm: &dyn CompletionProvider,
    filename: &str,
    resume_text: &str,
    job_description: &str,
    api_key: Option<&str>,
) -> Result<CandidateAssessment, AssessError> {
    let prompt = fill_template(
        LEADERBOARD_PROMPT_TEMPLATE,
        &[
            ("resume_text", resume_text),
            ("job_description", job_description),
        ],
    );
    let system = format!("{LEADERBOARD_SYSTEM} {JSON_ONLY_SYSTEM}");

    let value: Value = complete_json(
        llm,
        &CompletionRequest {
            prompt: &prompt,
            system: &system,
            mode: ResponseMode::Json,
            api_key,
        },
    )
    .await?;

    CandidateAssessment::from_model_value(filename, &value).ok_or(AssessError::NotAnObject)
}

/// Asks for a free-text markdown report.
pub async fn assess_narrative(
    llm: &dyn CompletionProvider,
    resume_text: &str,
    job_description: &str,
    api_key: Option<&str>,
) -> Result<String, AssessError> {
    let prompt = fill_template(
        REPORT_PROMPT_TEMPLATE,
        &[
            ("resume_text", resume_text),
            ("job_description", job_description),
        ],
    );

    let markdown = llm
        .complete(&CompletionRequest {
            prompt: &prompt,
            system: REPORT_SYSTEM,
            mode: ResponseMode::Text,
            api_key,
        })
        .await?;

    let markdown = markdown.trim();
    if markdown.is_empty() {
        return Err(AssessError::EmptyReport);
    }
    Ok(markdown.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Scripted, ScriptedProvider};

    #[tokio::test]
    async fn test_structured_prompt_carries_resume_and_jd() {
        let llm = ScriptedProvider::new(vec![Scripted::reply(
            r#"{"candidate_name": "Grace Hopper", "match_score": 88}"#,
        )]);

        let assessment = assess_structured(
            &llm,
            "grace.pdf",
            "COBOL pioneer, compiler author",
            "Compiler engineer",
            None,
        )
        .await
        .unwrap();

        assert_eq!(assessment.candidate_name, "Grace Hopper");
        assert_eq!(assessment.match_score.percent(), 88);
        let calls = llm.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].prompt.contains("COBOL pioneer, compiler author"));
        assert!(calls[0].prompt.contains("Compiler engineer"));
        assert!(calls[0].system.contains("valid JSON only"));
        assert_eq!(calls[0].mode, ResponseMode::Json);
    }

    #[tokio::test]
    async fn test_structured_rejects_malformed_json() {
        let llm = ScriptedProvider::new(vec![Scripted::reply("Sure! Here is the analysis...")]);
        let err = assess_structured(&llm, "a.pdf", "text", "jd", None)
            .await
            .unwrap_err();
        assert!(matches!(err, AssessError::Llm(LlmError::Parse(_))));
    }

    #[tokio::test]
    async fn test_structured_rejects_non_object_json() {
        let llm = ScriptedProvider::new(vec![Scripted::reply("[1, 2, 3]")]);
        let err = assess_structured(&llm, "a.pdf", "text", "jd", None)
            .await
            .unwrap_err();
        assert!(matches!(err, AssessError::NotAnObject));
    }

    #[tokio::test]
    async fn test_narrative_passes_api_key_and_text_mode() {
        let llm = ScriptedProvider::new(vec![Scripted::reply("  ### Match Score\n6/10\n  ")]);
        let report = assess_narrative(&llm, "resume", "jd", Some("user-key"))
            .await
            .unwrap();

        assert_eq!(report, "### Match Score\n6/10");
        let calls = llm.calls();
        assert_eq!(calls[0].mode, ResponseMode::Text);
        assert_eq!(calls[0].api_key.as_deref(), Some("user-key"));
    }

    #[tokio::test]
    async fn test_narrative_blank_reply_is_an_error() {
        let llm = ScriptedProvider::new(vec![Scripted::reply("   ")]);
        let err = assess_narrative(&llm, "resume", "jd", None).await.unwrap_err();
        assert!(matches!(err, AssessError::EmptyReport));
    }
}
