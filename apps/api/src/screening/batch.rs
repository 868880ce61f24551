//! Batch pipeline: extract → assess → collect, one file at a time.
//!
//! Files are processed strictly in upload order. A server-wide `Throttle` keeps
//! a minimum interval between the starts of any two model requests, so
//! concurrent batches sharing one API key are spaced as well. Retries with
//! backoff live in the LLM client. A started batch always runs to completion.

use std::str::FromStr;
use std::time::Duration;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

use crate::extraction::TextExtractor;
use crate::llm_client::CompletionProvider;
use crate::screening::assessor::{assess_narrative, assess_structured};
use crate::screening::models::{
    CandidateAssessment, NarrativeReport, ReportOutcome, SkippedFile,
};

/// Which response shape the user asked for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    #[default]
    Leaderboard,
    Report,
}

impl FromStr for AnalysisMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "leaderboard" | "structured" => Ok(AnalysisMode::Leaderboard),
            "report" | "narrative" => Ok(AnalysisMode::Report),
            other => Err(format!(
                "unknown mode '{other}', expected 'leaderboard' or 'report'"
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadedResume {
    pub filename: String,
    pub bytes: Bytes,
}

#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub job_description: String,
    pub mode: AnalysisMode,
    pub api_key: Option<String>,
    pub files: Vec<UploadedResume>,
}

/// Everything one analysis run produced. Replaces the session's previous results wholesale.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum BatchOutcome {
    Leaderboard {
        /// Upload order.
        assessments: Vec<CandidateAssessment>,
        skipped: Vec<SkippedFile>,
    },
    Report {
        reports: Vec<NarrativeReport>,
    },
}

/// Minimum spacing between consecutive model requests. Shared by all batches.
pub struct Throttle {
    interval: Duration,
    last_start: Mutex<Option<Instant>>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_start: Mutex::new(None),
        }
    }

    /// Reserves the next free start slot and sleeps until it arrives.
    /// Concurrent callers get consecutive slots; the lock is not held while sleeping.
    pub async fn wait(&self) {
        let slot = {
            let mut last_start = self.last_start.lock().await;
            let now = Instant::now();
            let slot = match *last_start {
                Some(last) => (last + self.interval).max(now),
                None => now,
            };
            *last_start = Some(slot);
            slot
        };

        let now = Instant::now();
        if slot > now {
            debug!("Throttling next model request for {}ms", (slot - now).as_millis());
            sleep_until(slot).await;
        }
    }
}

/// Runs one analysis batch. Per-file failures never abort the batch.
pub async fn run_batch(
    extractor: &dyn TextExtractor,
    llm: &dyn CompletionProvider,
    throttle: &Throttle,
    request: BatchRequest,
) -> BatchOutcome {
    let total = request.files.len();
    let api_key = request.api_key.as_deref();
    let jd = request.job_description.as_str();

    info!("Starting {:?} batch of {} files", request.mode, total);

    match request.mode {
        AnalysisMode::Leaderboard => {
            let mut assessments = Vec::new();
            let mut skipped = Vec::new();

            for (i, file) in request.files.into_iter().enumerate() {
                info!("Analyzing {} ({}/{})", file.filename, i + 1, total);

                let text = match extractor.extract(file.bytes).await {
                    Ok(text) => text,
                    Err(e) => {
                        warn!("Skipping {}: {e}", file.filename);
                        skipped.push(SkippedFile {
                            filename: file.filename,
                            reason: e.to_string(),
                        });
                        continue;
                    }
                };

                throttle.wait().await;
                match assess_structured(llm, &file.filename, &text, jd, api_key).await {
                    Ok(assessment) => assessments.push(assessment),
                    Err(e) => {
                        warn!("Dropping {} from leaderboard: {e}", file.filename);
                        skipped.push(SkippedFile {
                            filename: file.filename,
                            reason: e.to_string(),
                        });
                    }
                }
            }

            info!(
                "Batch complete: {} assessed, {} skipped",
                assessments.len(),
                skipped.len()
            );
            BatchOutcome::Leaderboard {
                assessments,
                skipped,
            }
        }
        AnalysisMode::Report => {
            let mut reports = Vec::with_capacity(total);

            for (i, file) in request.files.into_iter().enumerate() {
                info!("Analyzing {} ({}/{})", file.filename, i + 1, total);

                let text = match extractor.extract(file.bytes).await {
                    Ok(text) => text,
                    Err(e) => {
                        warn!("Could not read {}: {e}", file.filename);
                        reports.push(NarrativeReport {
                            filename: file.filename,
                            outcome: ReportOutcome::ReadError {
                                message: e.to_string(),
                            },
                        });
                        continue;
                    }
                };

                throttle.wait().await;
                let report = match assess_narrative(llm, &text, jd, api_key).await {
                    Ok(markdown) => NarrativeReport::report(file.filename, markdown),
                    Err(e) => {
                        warn!("Report for {} failed: {e}", file.filename);
                        NarrativeReport {
                            filename: file.filename,
                            outcome: ReportOutcome::ModelError {
                                message: e.to_string(),
                            },
                        }
                    }
                };
                reports.push(report);
            }

            info!("Batch complete: {} reports", reports.len());
            BatchOutcome::Report { reports }
        }
    }
}
