// crates/core/src/events.rs
//! UI-observable signals emitted by the poller.
//!
//! The poller mutates no UI directly; it emits `StepEvent`s on an
//! unbounded channel and the frontend (the console renderer) decides how
//! to draw them. Every event is scoped to a `StepKind` — the masking and
//! OCR steps own disjoint indicators, and events for one must never move
//! the other's.

use maskdeck_types::StepKind;
use tokio::sync::mpsc;

/// Severity of a step-scoped notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// One UI-facing signal from a running job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepEvent {
    /// Progress percentage as reported by the server, unsmoothed.
    Progress { step: StepKind, percent: u8 },

    /// Human-readable notice scoped to one step.
    Notice {
        step: StepKind,
        level: NoticeLevel,
        text: String,
    },

    /// The step began watching its log for file names (OCR only); the
    /// indicator shows a waiting state until the first extraction.
    Waiting { step: StepKind },

    /// Current-file indicator change (OCR only). `Some(name)` means
    /// "processing name", `None` hides the indicator.
    CurrentFile {
        step: StepKind,
        name: Option<String>,
    },

    /// The job reached `completed`; the step's artifacts are in the
    /// session context. Emitted at most once per job.
    Completed { step: StepKind },

    /// The job reached `failed`; the step's primary action should be
    /// unlocked for retry. Emitted at most once per job.
    RetryUnlocked { step: StepKind },
}

impl StepEvent {
    /// The step this event is scoped to.
    pub fn step(&self) -> StepKind {
        match self {
            StepEvent::Progress { step, .. }
            | StepEvent::Notice { step, .. }
            | StepEvent::Waiting { step }
            | StepEvent::CurrentFile { step, .. }
            | StepEvent::Completed { step }
            | StepEvent::RetryUnlocked { step } => *step,
        }
    }
}

/// Sending half handed to pollers.
pub type EventSink = mpsc::UnboundedSender<StepEvent>;

/// Receiving half consumed by the renderer.
pub type EventStream = mpsc::UnboundedReceiver<StepEvent>;

/// Create a step-event channel.
pub fn channel() -> (EventSink, EventStream) {
    mpsc::unbounded_channel()
}
