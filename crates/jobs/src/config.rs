// crates/jobs/src/config.rs
//! Polling configuration.

use std::time::Duration;

use serde::Deserialize;

/// Default delay between two status checks of one job.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;

/// How often pollers re-check the build service.
///
/// One value for every view: a list row and a detail page that show the same
/// activity read the same job, so they cannot disagree about its cadence.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Seconds between the end of one status check and the start of the next.
    pub interval_secs: u64,
}

impl PollConfig {
    pub fn with_interval_secs(interval_secs: u64) -> Self {
        Self { interval_secs }
    }

    /// The inter-check delay; never shorter than one second.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_POLL_INTERVAL_SECS,
        }
    }
}
