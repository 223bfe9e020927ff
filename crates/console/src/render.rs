// crates/console/src/render.rs
//! Terminal rendering of the step-event stream.
//!
//! One progress bar per step kind, created on first use; notices print
//! above the bars. The renderer holds no job state — it draws whatever
//! the event stream says, which keeps the poller testable without any
//! terminal involved.

use std::collections::HashMap;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use maskdeck_core::{EventStream, NoticeLevel, StepEvent};
use maskdeck_types::StepKind;

pub struct StepRenderer {
    multi: MultiProgress,
    bars: HashMap<StepKind, ProgressBar>,
}

impl StepRenderer {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            bars: HashMap::new(),
        }
    }

    /// Consume the stream until every sender is gone.
    pub async fn run(mut self, mut rx: EventStream) {
        while let Some(event) = rx.recv().await {
            self.handle(event);
        }
    }

    fn bar(&mut self, step: StepKind) -> &ProgressBar {
        self.bars.entry(step).or_insert_with(|| {
            let pb = self.multi.add(ProgressBar::new(100));
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("  {prefix:>7} [{bar:40}] {pos:>3}% {msg}")
                    .expect("valid progress template")
                    .progress_chars("=>-"),
            );
            pb.set_prefix(step.label());
            pb
        })
    }

    fn handle(&mut self, event: StepEvent) {
        match event {
            StepEvent::Progress { step, percent } => {
                self.bar(step).set_position(u64::from(percent));
            }
            StepEvent::Notice { step, level, text } => {
                let line = match level {
                    NoticeLevel::Info => format!("  \u{00b7} [{step}] {text}"),
                    NoticeLevel::Success => format!("  \u{2713} [{step}] {text}"),
                    NoticeLevel::Error => format!("  \u{2717} [{step}] {text}"),
                };
                let _ = self.multi.println(line);
            }
            StepEvent::Waiting { step } => {
                self.bar(step).set_message("waiting for the first file");
            }
            StepEvent::CurrentFile { step, name } => {
                let bar = self.bar(step);
                match name {
                    Some(name) => bar.set_message(format!("processing {name}")),
                    None => bar.set_message(""),
                }
            }
            StepEvent::Completed { step } => {
                let bar = self.bar(step);
                bar.set_position(100);
                bar.finish_with_message("done");
            }
            StepEvent::RetryUnlocked { step } => {
                let command = match step {
                    StepKind::Masking => "mask",
                    StepKind::Ocr => "ocr",
                };
                let _ = self
                    .multi
                    .println(format!("  \u{21bb} retry with `maskdeck {command}`"));
            }
        }
    }
}

impl Default for StepRenderer {
    fn default() -> Self {
        Self::new()
    }
}
