// crates/core/src/logscan.rs
//! Log-derived file tracking for the OCR step.
//!
//! The OCR worker exposes no structured per-file events, only a
//! cumulative text log in each status snapshot. This module scrapes that
//! log for the name of the file currently being processed. It is a
//! best-effort heuristic: a missed file name is acceptable, a panic on
//! arbitrary log text is not.

use std::sync::OnceLock;

use regex_lite::Regex;

/// Recognition patterns in priority order. Per line, the first pattern
/// that matches wins; within a line, the last (rightmost) match wins.
///
/// 1. bare numbered token:   `3.pdf`
/// 2. quoted name:           `'scan_003.pdf'`
/// 3. section header:        `===== 12.pdf processing begins`
/// 4. progress counter:      `[2/5] 7.pdf`
fn patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        vec![
            Regex::new(r"(\d+\.pdf)").expect("valid bare-token pattern"),
            Regex::new(r"'(.+\.pdf)'").expect("valid quoted pattern"),
            Regex::new(r"===== (.+?) ").expect("valid header pattern"),
            Regex::new(r"\[.+?\] (.+\.pdf)").expect("valid counter pattern"),
        ]
    })
}

/// Extract a file name from a single log line, or `None`.
pub fn extract_from_line(line: &str) -> Option<String> {
    for pattern in patterns() {
        // Last match in the line wins for this pattern.
        if let Some(caps) = pattern.captures_iter(line).last() {
            if let Some(m) = caps.get(1) {
                return Some(m.as_str().to_string());
            }
        }
    }
    None
}

/// Extract the most recently mentioned file name from a cumulative log.
///
/// Lines are scanned from the end toward the start; blank lines are
/// skipped; the first line that yields a match decides the result, so the
/// mention closest to the end of the log wins overall. `None` means the
/// caller should keep whatever it was showing — an absent extraction
/// never clears the indicator mid-job.
pub fn extract_current_file(log_text: &str) -> Option<String> {
    log_text
        .lines()
        .rev()
        .filter(|line| !line.trim().is_empty())
        .find_map(extract_from_line)
}

/// UI state of the current-file indicator.
///
/// Transitions: `Hidden → Idle` when OCR polling starts, `Idle →
/// Processing` on the first extraction, `Processing(x) → Processing(y)`
/// on a changed extraction, anything → `Hidden` on job completion or
/// failure. A failed extraction mid-job is a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FileIndicator {
    #[default]
    Hidden,
    Idle,
    Processing(String),
}

impl FileIndicator {
    /// OCR polling started: show the indicator in its waiting state.
    pub fn start(&mut self) {
        *self = FileIndicator::Idle;
    }

    /// Feed the latest extraction. Returns the newly shown file name if
    /// this observation changed the displayed file, `None` otherwise.
    pub fn observe(&mut self, extraction: Option<String>) -> Option<String> {
        let name = extraction?;
        match self {
            FileIndicator::Processing(current) if *current == name => None,
            _ => {
                *self = FileIndicator::Processing(name.clone());
                Some(name)
            }
        }
    }

    /// Job reached a terminal state: hide the indicator. Returns true if
    /// it was visible.
    pub fn clear(&mut self) -> bool {
        let was_visible = *self != FileIndicator::Hidden;
        *self = FileIndicator::Hidden;
        was_visible
    }

    /// The file name currently displayed, if any.
    pub fn current(&self) -> Option<&str> {
        match self {
            FileIndicator::Processing(name) => Some(name),
            _ => None,
        }
    }
}
