// crates/core/src/poller.rs
//! Fixed-cadence job polling.
//!
//! One `PollerTask` drives one server-side job from submission to a
//! terminal state. Transient fetch failures are inconclusive — they are
//! logged at debug level and the next poll is scheduled on the same
//! cadence. Only an explicit `completed` or `failed` from the server
//! stops the loop; a job that never terminates polls forever.

use std::time::Duration;

use maskdeck_types::{JobHandle, JobState, MaskingResult, StepKind};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::api::ApiClient;
use crate::events::{EventSink, NoticeLevel, StepEvent};
use crate::logscan::{extract_current_file, FileIndicator};
use crate::session::{with_session_mut, SharedSession};

/// Baseline polling cadence, matching the server's update rhythm.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// How a polling task ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// Server reported `completed`; step artifacts are in the session.
    Completed,
    /// Server reported `failed` with this error text.
    Failed { error: String },
    /// The task was cancelled or torn down before a terminal status.
    Cancelled,
}

/// Factory for polling tasks: one API client, one event sink, one fixed
/// interval applied to every job it starts.
#[derive(Debug, Clone)]
pub struct JobPoller {
    client: ApiClient,
    events: EventSink,
    interval: Duration,
}

impl JobPoller {
    pub fn new(client: ApiClient, events: EventSink) -> Self {
        Self {
            client,
            events,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Override the polling cadence. The interval is fixed for the life
    /// of each job this poller starts — never adaptive.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Begin polling `handle`'s job. The first status fetch fires
    /// immediately; subsequent fetches follow at the fixed interval.
    ///
    /// Records the job as the active one for its step kind; a leftover
    /// entry from an abandoned earlier job is replaced.
    pub fn start(&self, handle: JobHandle, session: SharedSession) -> PollerTask {
        let (cancel_tx, cancel_rx) = oneshot::channel();

        if let Some(replaced) =
            with_session_mut(&session, |ctx| ctx.begin_job(handle.step, &handle.job_id)).flatten()
        {
            tracing::debug!(
                step = %handle.step,
                replaced_job = %replaced,
                "abandoned job replaced by new poller"
            );
        }

        let step = handle.step;
        let job_id = handle.job_id.clone();
        let worker = PollWorker {
            client: self.client.clone(),
            events: self.events.clone(),
            session,
            handle,
            interval: self.interval,
        };
        let task = tokio::spawn(worker.run(cancel_rx));

        PollerTask {
            step,
            job_id,
            cancel_tx: Some(cancel_tx),
            task: Some(task),
        }
    }
}

/// Handle to a running polling task.
///
/// Dropping the handle cancels the task — no further status fetches are
/// scheduled. Awaiting `outcome` yields the terminal result exactly
/// once; there is no path to a duplicate completion.
pub struct PollerTask {
    step: StepKind,
    job_id: String,
    cancel_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<JobOutcome>>,
}

impl PollerTask {
    pub fn step(&self) -> StepKind {
        self.step
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Stop polling without waiting for a terminal status. Returns true
    /// if the cancellation signal was delivered.
    pub fn cancel(&mut self) -> bool {
        match self.cancel_tx.take() {
            Some(tx) => tx.send(()).is_ok(),
            None => false,
        }
    }

    /// Wait for the job to reach a terminal state.
    pub async fn outcome(mut self) -> JobOutcome {
        match self.task.take() {
            Some(task) => match task.await {
                Ok(outcome) => outcome,
                // Task panicked or was aborted; treat as teardown.
                Err(_) => JobOutcome::Cancelled,
            },
            None => JobOutcome::Cancelled,
        }
    }
}

impl Drop for PollerTask {
    fn drop(&mut self) {
        // Best-effort client-only cleanup: stop future scheduling, leave
        // any in-flight fetch to be abandoned.
        if let Some(tx) = self.cancel_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// The owned state of one polling loop.
struct PollWorker {
    client: ApiClient,
    events: EventSink,
    session: SharedSession,
    handle: JobHandle,
    interval: Duration,
}

impl PollWorker {
    async fn run(self, mut cancel_rx: oneshot::Receiver<()>) -> JobOutcome {
        let step = self.handle.step;
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut indicator = FileIndicator::default();
        if step == StepKind::Ocr {
            indicator.start();
            self.emit(StepEvent::Waiting { step });
        }

        loop {
            tokio::select! {
                _ = &mut cancel_rx => {
                    tracing::debug!(step = %step, job_id = %self.handle.job_id, "poller cancelled");
                    return JobOutcome::Cancelled;
                }
                // The first tick completes immediately, so the first
                // status fetch fires without an initial delay.
                _ = ticker.tick() => {}
            }

            let status = match self.client.job_status(&self.handle.job_id).await {
                Ok(status) => status,
                Err(e) if e.is_inconclusive() => {
                    // Inconclusive cycle: transient failures never stop
                    // polling and never surface as job failure.
                    tracing::debug!(
                        step = %step,
                        job_id = %self.handle.job_id,
                        error = %e,
                        "status poll inconclusive, will retry"
                    );
                    continue;
                }
                Err(e) => {
                    // Not a fetch-level failure; still retried, but loud
                    // enough to notice.
                    tracing::warn!(
                        step = %step,
                        job_id = %self.handle.job_id,
                        error = %e,
                        "unexpected status poll error, will retry"
                    );
                    continue;
                }
            };

            self.emit(StepEvent::Progress {
                step,
                percent: status.progress,
            });

            if step == StepKind::Ocr {
                if let Some(log) = status.log_output.as_deref() {
                    if let Some(name) = indicator.observe(extract_current_file(log)) {
                        self.emit(StepEvent::CurrentFile {
                            step,
                            name: Some(name),
                        });
                    }
                }
            }

            match status.status {
                JobState::Completed => {
                    self.emit(StepEvent::Progress { step, percent: 100 });
                    self.store_result(status.result);
                    let text = match status.message {
                        Some(m) if !m.is_empty() => m,
                        _ => format!("{step} complete"),
                    };
                    self.emit(StepEvent::Notice {
                        step,
                        level: NoticeLevel::Success,
                        text,
                    });
                    self.finish(step, &mut indicator);
                    self.emit(StepEvent::Completed { step });
                    return JobOutcome::Completed;
                }
                JobState::Failed => {
                    let error = status
                        .error
                        .unwrap_or_else(|| "job failed without error detail".to_string());
                    self.emit(StepEvent::Notice {
                        step,
                        level: NoticeLevel::Error,
                        text: format!("job failed: {error}"),
                    });
                    self.finish(step, &mut indicator);
                    self.emit(StepEvent::RetryUnlocked { step });
                    return JobOutcome::Failed { error };
                }
                JobState::Pending | JobState::Running => {
                    if let Some(message) = status.message.as_deref() {
                        if !message.is_empty() {
                            self.emit(StepEvent::Notice {
                                step,
                                level: NoticeLevel::Info,
                                text: message.to_string(),
                            });
                        }
                    }
                }
            }
        }
    }

    /// Extract step-specific artifacts from a completed job's `result`.
    fn store_result(&self, result: Option<serde_json::Value>) {
        if self.handle.step != StepKind::Masking {
            // The OCR result payload (raw script output) carries nothing
            // the client renders; the log already told the story.
            return;
        }
        let Some(value) = result else { return };
        match serde_json::from_value::<MaskingResult>(value) {
            Ok(parsed) => {
                with_session_mut(&self.session, |ctx| ctx.record_masking_result(parsed));
            }
            Err(e) => {
                tracing::warn!(
                    job_id = %self.handle.job_id,
                    error = %e,
                    "completed masking job carried an unreadable result payload"
                );
            }
        }
    }

    /// Common terminal-state bookkeeping: clear the active-job slot and
    /// hide the file indicator if it was showing.
    fn finish(&self, step: StepKind, indicator: &mut FileIndicator) {
        with_session_mut(&self.session, |ctx| ctx.finish_job(step));
        if indicator.clear() {
            self.emit(StepEvent::CurrentFile { step, name: None });
        }
    }

    fn emit(&self, event: StepEvent) {
        // A dropped renderer is fine; the poller's job is the polling.
        let _ = self.events.send(event);
    }
}
