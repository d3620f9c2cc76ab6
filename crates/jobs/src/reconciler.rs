// crates/jobs/src/reconciler.rs
//! Merges server-reported build status into the registry when a view mounts.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use quizforge_types::{ActivityId, ActivitySummary, BuildArtifact, BuildStatus};

use super::registry::{Attach, JobRegistry};
use super::types::JobHandle;

/// What the server last said about one activity's build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerBuildStatus {
    pub activity_id: ActivityId,
    pub status: BuildStatus,
    pub embed_code: Option<String>,
    pub package_url: Option<String>,
}

impl ServerBuildStatus {
    pub fn new(activity_id: ActivityId, status: BuildStatus) -> Self {
        Self {
            activity_id,
            status,
            embed_code: None,
            package_url: None,
        }
    }

    /// The build status carried by an activity list row, if any.
    pub fn from_summary(row: &ActivitySummary) -> Option<Self> {
        row.build_status.map(|status| Self {
            activity_id: row.id,
            status,
            embed_code: row.embed_code.clone(),
            package_url: row.package_url.clone(),
        })
    }
}

/// Result of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    /// In-progress builds that got a new poller.
    pub attached: Vec<ActivityId>,
    /// In-progress builds an active poller already followed.
    pub already_tracked: Vec<ActivityId>,
    /// Finished builds recorded without polling.
    pub seeded: Vec<ActivityId>,
}

/// Re-attaches a freshly mounted view to builds the server still reports as
/// in progress, so navigating away and back never loses a build or starts a
/// second one.
#[derive(Clone)]
pub struct StatusReconciler {
    registry: Arc<JobRegistry>,
}

impl StatusReconciler {
    pub fn new(registry: Arc<JobRegistry>) -> Self {
        Self { registry }
    }

    /// Reconcile the registry with server-reported statuses.
    ///
    /// - `processing`: attach a poller in `Polling` unless one is active.
    /// - `completed` with an embed code, or `failed`: record a terminal job if
    ///   the id is untracked. Tracked jobs are never overwritten.
    /// - anything else: ignored.
    ///
    /// Must be called from within a tokio runtime.
    pub fn reconcile<I>(&self, statuses: I) -> ReconcileReport
    where
        I: IntoIterator<Item = ServerBuildStatus>,
    {
        let mut report = ReconcileReport::default();

        for server in statuses {
            match server.status {
                BuildStatus::Processing => match self.registry.attach(server.activity_id) {
                    Attach::Attached(_) => report.attached.push(server.activity_id),
                    Attach::AlreadyTracked(_) => report.already_tracked.push(server.activity_id),
                },
                BuildStatus::Completed => {
                    let Some(embed_code) = server.embed_code else {
                        continue;
                    };
                    let artifact = BuildArtifact {
                        embed_code,
                        package_url: server.package_url,
                    };
                    if self
                        .registry
                        .seed(JobHandle::completed_from_server(server.activity_id, artifact))
                    {
                        report.seeded.push(server.activity_id);
                    }
                }
                BuildStatus::Failed => {
                    if self
                        .registry
                        .seed(JobHandle::failed_from_server(server.activity_id))
                    {
                        report.seeded.push(server.activity_id);
                    }
                }
                BuildStatus::Pending | BuildStatus::Unknown => {}
            }
        }

        if !report.attached.is_empty() || !report.seeded.is_empty() {
            info!(
                attached = report.attached.len(),
                already_tracked = report.already_tracked.len(),
                seeded = report.seeded.len(),
                "Reconciled build status"
            );
        }
        report
    }

    /// Reconcile from activity list rows; rows without a build status are skipped.
    pub fn reconcile_activities<'a, I>(&self, rows: I) -> ReconcileReport
    where
        I: IntoIterator<Item = &'a ActivitySummary>,
    {
        self.reconcile(rows.into_iter().filter_map(ServerBuildStatus::from_summary))
    }
}
