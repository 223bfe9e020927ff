// crates/core/src/session.rs
//! Per-session mutable state shared between the steps.
//!
//! One context instance owns everything a pipeline run accumulates:
//! scan results, masking artifacts, extracted personal info, and the
//! at-most-one-active-job-per-step-kind bookkeeping. Pollers receive it
//! as `SharedSession` and are the sole writers for their own step's
//! buffers.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use maskdeck_types::{
    FileMappingEntry, MaskedFile, MaskingResult, PersonalInfoEntry, ScannedFile, StepKind,
};

/// Accumulated state for one pipeline session.
#[derive(Debug, Default)]
pub struct SessionContext {
    scanned_files: Vec<ScannedFile>,
    masked_files: Vec<MaskedFile>,
    file_mapping: Vec<FileMappingEntry>,
    personal_info: Vec<PersonalInfoEntry>,
    /// Active job per step kind. Starting a new job for a kind replaces
    /// any abandoned predecessor — there is never more than one.
    active_jobs: HashMap<StepKind, String>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed scan, replacing any previous one.
    pub fn record_scan(&mut self, files: Vec<ScannedFile>) {
        self.scanned_files = files;
    }

    pub fn scanned_files(&self) -> &[ScannedFile] {
        &self.scanned_files
    }

    pub fn has_scanned(&self) -> bool {
        !self.scanned_files.is_empty()
    }

    /// Store the artifacts of a completed masking job.
    pub fn record_masking_result(&mut self, result: MaskingResult) {
        self.masked_files = result.processed_files;
        self.file_mapping = result.file_mapping;
    }

    pub fn masked_files(&self) -> &[MaskedFile] {
        &self.masked_files
    }

    pub fn file_mapping(&self) -> &[FileMappingEntry] {
        &self.file_mapping
    }

    pub fn record_personal_info(&mut self, entries: Vec<PersonalInfoEntry>) {
        self.personal_info = entries;
    }

    pub fn personal_info(&self) -> &[PersonalInfoEntry] {
        &self.personal_info
    }

    /// Mark `job_id` as the active job for `step`. Returns the id of a
    /// replaced (abandoned) job, if one was still recorded.
    pub fn begin_job(&mut self, step: StepKind, job_id: impl Into<String>) -> Option<String> {
        self.active_jobs.insert(step, job_id.into())
    }

    /// Clear the active job for `step` once it reached a terminal state.
    pub fn finish_job(&mut self, step: StepKind) {
        self.active_jobs.remove(&step);
    }

    pub fn active_job(&self, step: StepKind) -> Option<&str> {
        self.active_jobs.get(&step).map(String::as_str)
    }
}

/// Session context shared across pollers and the console.
pub type SharedSession = Arc<RwLock<SessionContext>>;

/// Create a fresh shared session.
pub fn shared_session() -> SharedSession {
    Arc::new(RwLock::new(SessionContext::new()))
}

/// Run `f` with write access to the session, logging instead of
/// panicking if the lock was poisoned by a dead writer.
pub fn with_session_mut<R>(session: &SharedSession, f: impl FnOnce(&mut SessionContext) -> R) -> Option<R> {
    match session.write() {
        Ok(mut guard) => Some(f(&mut guard)),
        Err(e) => {
            tracing::error!("session lock poisoned on write: {e}");
            None
        }
    }
}

/// Run `f` with read access to the session, logging on poison.
pub fn with_session<R>(session: &SharedSession, f: impl FnOnce(&SessionContext) -> R) -> Option<R> {
    match session.read() {
        Ok(guard) => Some(f(&guard)),
        Err(e) => {
            tracing::error!("session lock poisoned on read: {e}");
            None
        }
    }
}
