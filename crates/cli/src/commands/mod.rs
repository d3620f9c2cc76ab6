// crates/cli/src/commands/mod.rs
//! Subcommand handlers. Each returns `Ok(true)` when everything it started
//! finished successfully.

pub mod batch;
pub mod build;
pub mod watch;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use serde::Serialize;
use tokio::task::JoinSet;
use tracing::warn;

use quizforge_client::ApiClient;
use quizforge_jobs::{JobHandle, JobRegistry, PollConfig};
use quizforge_types::ActivityId;

use crate::render;

/// Shared collaborators for one CLI invocation.
pub struct Context {
    pub client: Arc<ApiClient>,
    pub registry: Arc<JobRegistry>,
    pub json: bool,
}

impl Context {
    pub fn new(client: ApiClient, poll: PollConfig, json: bool) -> Self {
        let client = Arc::new(client);
        let registry = Arc::new(JobRegistry::new(client.clone(), poll));
        Self {
            client,
            registry,
            json,
        }
    }

    /// Print `value` as pretty JSON when `--json` was given.
    pub fn emit_json<T: Serialize>(&self, value: &T) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        }
        Ok(())
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("  {spinner} {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// Follow a tracked job until it reaches a terminal state, mirroring each
/// snapshot onto `pb`.
async fn follow(registry: &JobRegistry, activity_id: ActivityId, label: &str, pb: &ProgressBar) -> Option<JobHandle> {
    let mut rx = registry.subscribe(activity_id)?;
    loop {
        let handle = rx.borrow_and_update().clone();
        pb.set_message(render::handle_line(&handle, label));
        if handle.state.is_terminal() {
            return Some(handle);
        }
        if rx.changed().await.is_err() {
            return registry.get(activity_id);
        }
    }
}

/// Follow several tracked jobs concurrently, one spinner each.
///
/// Returns the final snapshots sorted by activity id.
pub async fn follow_all(
    registry: &Arc<JobRegistry>,
    activity_ids: &[ActivityId],
    labels: &HashMap<ActivityId, String>,
) -> Vec<JobHandle> {
    let multi = MultiProgress::new();
    let mut tasks = JoinSet::new();

    for &activity_id in activity_ids {
        let pb = multi.add(ProgressBar::new_spinner());
        pb.set_style(spinner_style());
        pb.enable_steady_tick(Duration::from_millis(100));

        let registry = Arc::clone(registry);
        let label = labels
            .get(&activity_id)
            .cloned()
            .unwrap_or_else(|| format!("Activity {activity_id}"));
        tasks.spawn(async move {
            let handle = follow(&registry, activity_id, &label, &pb).await;
            match &handle {
                Some(h) => pb.finish_with_message(render::handle_line(h, &label)),
                None => pb.finish_and_clear(),
            }
            handle
        });
    }

    let mut finished = Vec::with_capacity(activity_ids.len());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Some(handle)) => finished.push(handle),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Follow task failed"),
        }
    }
    finished.sort_by_key(|h| h.activity_id);
    finished
}
