// crates/types/src/job.rs
//! Job identity and the `/job-status/{id}` response shape.

use serde::{Deserialize, Serialize};

/// Which pipeline step a job belongs to.
///
/// The two step kinds drive disjoint progress indicators and disjoint
/// result buffers; nothing routed by one kind may touch the other's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Masking,
    Ocr,
}

impl StepKind {
    /// Human label used in notices and progress bar prefixes.
    pub fn label(self) -> &'static str {
        match self {
            StepKind::Masking => "masking",
            StepKind::Ocr => "ocr",
        }
    }
}

impl std::fmt::Display for StepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Server-reported lifecycle state of an async job.
///
/// `Pending` is emitted between job creation and worker start; the client
/// treats it the same as `Running` (keep polling, no terminal action).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobState {
    /// Completed or failed — the two states that stop polling.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }
}

/// Identifies one asynchronous server-side job.
///
/// Created only from a successful start-job response; the id is an opaque
/// server-assigned token and is never interpreted client-side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    pub job_id: String,
    pub step: StepKind,
}

impl JobHandle {
    pub fn new(job_id: impl Into<String>, step: StepKind) -> Self {
        Self {
            job_id: job_id.into(),
            step,
        }
    }
}

/// One `/job-status/{id}` poll snapshot. Read-only on the client side.
///
/// `log_output` is cumulative and append-only across polls: each poll's
/// value is a prefix-extended superset of the previous one. `error` is
/// present iff the job failed, `result` iff it completed.
#[derive(Debug, Clone, Deserialize)]
pub struct JobStatusResponse {
    pub status: JobState,
    /// 0–100. The server computes this as a float (`(i+1)/n * 100`);
    /// it is rounded to a whole percent here and applied without smoothing.
    #[serde(default, deserialize_with = "progress_percent")]
    pub progress: u8,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub log_output: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    /// Step-specific payload; shape depends on the step kind.
    #[serde(default)]
    pub result: Option<serde_json::Value>,
}

/// Accept integer or fractional progress and round into 0–100.
fn progress_percent<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    Ok(raw.clamp(0.0, 100.0).round() as u8)
}

/// Response to `POST /mask-pdfs` and `POST /run-gemini-ocr-async`.
#[derive(Debug, Clone, Deserialize)]
pub struct StartJobResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub job_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}
