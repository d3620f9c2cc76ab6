// crates/jobs/src/types.rs
//! Types for the build-job tracking system.

use serde::{Deserialize, Serialize};

use quizforge_types::{ActivityId, BuildArtifact, BuildStatus, BuildStatusResponse, GameId, ServiceError};

/// State of one activity's build job.
///
/// `Idle -> Submitting -> Polling -> {Completed, Failed}`, with
/// `Submitting -> Failed` when the build could not be started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "codegen", derive(ts_rs::TS), ts(export, export_to = "../../../web/src/types/generated/"))]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Idle,
    Submitting,
    Polling,
    Completed,
    Failed,
}

impl JobState {
    /// A job that still has work outstanding against the build service.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Submitting | Self::Polling)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Submitting => "submitting",
            Self::Polling => "polling",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

/// Read-only snapshot of one activity's build job.
///
/// Snapshots are what views render; only the job's poller produces new ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "codegen", derive(ts_rs::TS), ts(export, export_to = "../../../web/src/types/generated/"))]
#[serde(rename_all = "camelCase")]
pub struct JobHandle {
    pub activity_id: ActivityId,
    /// Unknown for jobs re-attached from server status.
    pub game_id: Option<GameId>,
    /// Id echoed by the build service when the job was started.
    pub job_id: Option<String>,
    pub state: JobState,
    /// Number of status checks performed.
    pub attempt: u32,
    /// Present only when `state == Completed`.
    pub artifact: Option<BuildArtifact>,
    /// Present only when `state == Failed`.
    pub last_error: Option<String>,
    pub updated_at: String,
}

impl JobHandle {
    pub(crate) fn idle(activity_id: ActivityId, game_id: Option<GameId>) -> Self {
        Self {
            activity_id,
            game_id,
            job_id: None,
            state: JobState::Idle,
            attempt: 0,
            artifact: None,
            last_error: None,
            updated_at: now(),
        }
    }

    /// A job started by an earlier session; polling resumes without a start call.
    pub(crate) fn reattached(activity_id: ActivityId) -> Self {
        Self {
            state: JobState::Polling,
            ..Self::idle(activity_id, None)
        }
    }

    pub(crate) fn completed_from_server(activity_id: ActivityId, artifact: BuildArtifact) -> Self {
        Self {
            state: JobState::Completed,
            artifact: Some(artifact),
            ..Self::idle(activity_id, None)
        }
    }

    pub(crate) fn failed_from_server(activity_id: ActivityId) -> Self {
        Self {
            state: JobState::Failed,
            last_error: Some("Build failed".into()),
            ..Self::idle(activity_id, None)
        }
    }

    pub(crate) fn begin_submit(&mut self) {
        self.state = JobState::Submitting;
        self.touch();
    }

    pub(crate) fn start_polling(&mut self, job_id: Option<String>) {
        self.state = JobState::Polling;
        self.job_id = job_id;
        self.touch();
    }

    pub(crate) fn complete(&mut self, artifact: BuildArtifact) {
        self.state = JobState::Completed;
        self.artifact = Some(artifact);
        self.last_error = None;
        self.touch();
    }

    pub(crate) fn fail(&mut self, error: impl Into<String>) {
        self.state = JobState::Failed;
        self.artifact = None;
        self.last_error = Some(error.into());
        self.touch();
    }

    /// Apply the result of one status check.
    ///
    /// Every check counts towards `attempt`, including the one that ends the job.
    /// A transport error is as final as a `failed` status.
    pub(crate) fn record_check(&mut self, result: Result<BuildStatusResponse, ServiceError>) {
        self.attempt += 1;
        match result {
            Ok(resp) => match resp.status {
                BuildStatus::Completed => match resp.artifact() {
                    Some(artifact) => self.complete(artifact),
                    None => self.fail("Build completed without an embed code"),
                },
                BuildStatus::Failed => self.fail("Build failed"),
                BuildStatus::Pending | BuildStatus::Processing | BuildStatus::Unknown => {
                    self.touch()
                }
            },
            Err(e) => self.fail(format!("Status check failed: {e}")),
        }
    }

    fn touch(&mut self) {
        self.updated_at = now();
    }
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}
