// crates/jobs/src/lib.rs
//! Build-job tracking for activities.
//!
//! Provides:
//! - `JobRegistry`: process-wide owner of every build job, one active poller per activity
//! - `JobPoller`: the polling loop of one job, cancellable
//! - `JobHandle`: read-only snapshot rendered by views
//! - `StatusReconciler`: re-attaches to builds the server reports as in progress
//! - `BuildService`: the external build system's two endpoints

pub mod config;
pub mod poller;
pub mod reconciler;
pub mod registry;
pub mod service;
pub mod types;

pub use config::{PollConfig, DEFAULT_POLL_INTERVAL_SECS};
pub use poller::JobPoller;
pub use reconciler::{ReconcileReport, ServerBuildStatus, StatusReconciler};
pub use registry::{Attach, JobRegistry};
pub use service::BuildService;
pub use types::{JobHandle, JobState};
