// crates/cli/src/render.rs
//! One-line terminal renderings of job and batch snapshots.

use quizforge_batch::{BatchOutcome, BatchResult};
use quizforge_jobs::{JobHandle, JobState};

pub fn handle_line(handle: &JobHandle, label: &str) -> String {
    match handle.state {
        JobState::Idle => format!("{label}: idle"),
        JobState::Submitting => format!("{label}: starting build"),
        JobState::Polling if handle.attempt == 0 => format!("{label}: building"),
        JobState::Polling => format!("{label}: building (check {})", handle.attempt),
        JobState::Completed => {
            let package = handle
                .artifact
                .as_ref()
                .and_then(|a| a.package_url.as_deref())
                .map(|url| format!(", package {url}"))
                .unwrap_or_default();
            format!("\u{2713} {label}: built after {} checks{package}", handle.attempt)
        }
        JobState::Failed => format!(
            "\u{2717} {label}: {}",
            handle.last_error.as_deref().unwrap_or("build failed")
        ),
    }
}

pub fn batch_summary(outcome: &BatchOutcome) -> String {
    match outcome.result() {
        BatchResult::Success => format!("\u{2713} Created {} activities", outcome.succeeded),
        BatchResult::PartialFailure { failed_names } => format!(
            "\u{2717} Created {} of {} activities; failed: {}",
            outcome.succeeded,
            outcome.total,
            failed_names.join(", ")
        ),
    }
}
