//! Test doubles for the PDF library and the model.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::time::Instant;

use crate::extraction::{ExtractionError, TextExtractor};
use crate::llm_client::{CompletionProvider, CompletionRequest, LlmError, ResponseMode};

/// Treats any upload starting with `%PDF` as a document whose text is the rest of the bytes.
pub struct StubExtractor;

#[async_trait]
impl TextExtractor for StubExtractor {
    async fn extract(&self, bytes: Bytes) -> Result<String, ExtractionError> {
        if bytes.is_empty() {
            return Err(ExtractionError::Empty);
        }
        let body = bytes
            .strip_prefix(b"%PDF")
            .ok_or_else(|| ExtractionError::Parse("missing %PDF header".to_string()))?;
        let text = String::from_utf8_lossy(body).trim().to_string();
        if text.is_empty() {
            return Err(ExtractionError::NoText);
        }
        Ok(text)
    }
}

pub fn pdf(text: &str) -> Bytes {
    Bytes::from(format!("%PDF {text}"))
}

#[derive(Debug, Clone)]
pub enum Scripted {
    Reply(String),
    Fail { status: u16, message: String },
}

impl Scripted {
    pub fn reply(text: impl Into<String>) -> Self {
        Scripted::Reply(text.into())
    }

    pub fn fail(status: u16) -> Self {
        Scripted::Fail {
            status,
            message: format!("scripted failure {status}"),
        }
    }

    pub fn assessment(name: &str, score: i64) -> Self {
        Scripted::Reply(
            serde_json::json!({
                "candidate_name": name,
                "match_score": score,
                "years_experience": "5 years",
                "key_skills": ["Rust", "SQL"],
                "summary": format!("{name} summary."),
                "red_flags": "None",
                "email_draft": format!("Hi {name}, let's talk.")
            })
            .to_string(),
        )
    }
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub prompt: String,
    pub system: String,
    pub mode: ResponseMode,
    pub api_key: Option<String>,
    pub at: Instant,
}

/// Replies from a fixed script, in order, and records every request.
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<RecordedCall>>,
    default_key: bool,
}

impl ScriptedProvider {
    pub fn new(script: Vec<Scripted>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
            default_key: true,
        }
    }

    pub fn without_default_key(mut self) -> Self {
        self.default_key = false;
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push(RecordedCall {
            prompt: request.prompt.to_string(),
            system: request.system.to_string(),
            mode: request.mode,
            api_key: request.api_key.map(String::from),
            at: Instant::now(),
        });

        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Scripted::Reply(text)) => Ok(text),
            Some(Scripted::Fail { status, message }) => Err(LlmError::Api { status, message }),
            None => Err(LlmError::Api {
                status: 500,
                message: "script exhausted".to_string(),
            }),
        }
    }

    fn has_default_key(&self) -> bool {
        self.default_key
    }
}
