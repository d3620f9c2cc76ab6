// crates/jobs/src/poller.rs
//! Polling loop for a single build job.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use quizforge_types::{ActivityId, GameId};

use super::service::BuildService;
use super::types::JobHandle;

/// Write side of one job's snapshot, scoped to one poller generation.
///
/// The watch channel outlives resubmissions so observers stay subscribed;
/// the cancellation token belongs to the generation and gates every write.
pub(crate) struct JobCell {
    activity_id: ActivityId,
    tx: Arc<watch::Sender<JobHandle>>,
    cancel: CancellationToken,
    events: broadcast::Sender<JobHandle>,
}

impl JobCell {
    pub(crate) fn new(
        activity_id: ActivityId,
        tx: Arc<watch::Sender<JobHandle>>,
        events: broadcast::Sender<JobHandle>,
    ) -> Self {
        Self {
            activity_id,
            tx,
            cancel: CancellationToken::new(),
            events,
        }
    }

    pub(crate) fn snapshot(&self) -> JobHandle {
        self.tx.borrow().clone()
    }

    /// Apply `f` to the handle unless this generation has been cancelled.
    /// Returns whether the transition happened.
    fn transition(&self, f: impl FnOnce(&mut JobHandle)) -> bool {
        let applied = self.tx.send_if_modified(|handle| {
            if self.cancel.is_cancelled() {
                return false;
            }
            f(handle);
            true
        });
        if applied {
            // No subscribers is fine.
            let _ = self.events.send(self.snapshot());
        }
        applied
    }
}

/// Owns the polling task of one job.
///
/// Dropping the poller cancels it, so removing a job from the registry always
/// releases its timer.
pub struct JobPoller {
    cell: Arc<JobCell>,
    task: JoinHandle<()>,
}

impl JobPoller {
    /// Start a fresh job: `Idle -> Submitting` happens before this returns,
    /// the start call and the polling run on a spawned task.
    ///
    /// Must be called from within a tokio runtime.
    pub(crate) fn submit(
        cell: JobCell,
        service: Arc<dyn BuildService>,
        game_id: GameId,
        interval: Duration,
    ) -> Self {
        cell.tx
            .send_replace(JobHandle::idle(cell.activity_id, Some(game_id)));
        cell.transition(JobHandle::begin_submit);
        Self::spawn(cell, service, Some(game_id), interval)
    }

    /// Resume polling a job started elsewhere, directly in `Polling`.
    pub(crate) fn reattach(
        cell: JobCell,
        service: Arc<dyn BuildService>,
        interval: Duration,
    ) -> Self {
        cell.tx.send_replace(JobHandle::reattached(cell.activity_id));
        Self::spawn(cell, service, None, interval)
    }

    fn spawn(
        cell: JobCell,
        service: Arc<dyn BuildService>,
        start: Option<GameId>,
        interval: Duration,
    ) -> Self {
        let cell = Arc::new(cell);
        let task = tokio::spawn(drive(Arc::clone(&cell), service, start, interval));
        Self { cell, task }
    }

    pub fn activity_id(&self) -> ActivityId {
        self.cell.activity_id
    }

    /// Stop polling. Idempotent; returns true only for the call that stopped
    /// a job still submitting or polling. A job that already finished on its
    /// own has nothing left to stop. The handle keeps its last state.
    pub fn cancel(&self) -> bool {
        // Trip the token first: from here on no write lands.
        let first = !self.cell.cancel.is_cancelled();
        self.cell.cancel.cancel();
        self.task.abort();
        let stopped = first && !self.cell.snapshot().state.is_terminal();
        if stopped {
            debug!(activity_id = self.cell.activity_id, "Build poller cancelled");
        }
        stopped
    }

    pub fn is_cancelled(&self) -> bool {
        self.cell.cancel.is_cancelled()
    }

    /// Not cancelled and still submitting or polling.
    pub fn is_active(&self) -> bool {
        !self.is_cancelled() && self.cell.snapshot().state.is_active()
    }

    pub(crate) fn cancel_token(&self) -> CancellationToken {
        self.cell.cancel.clone()
    }
}

impl Drop for JobPoller {
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn drive(
    cell: Arc<JobCell>,
    service: Arc<dyn BuildService>,
    start: Option<GameId>,
    interval: Duration,
) {
    let token = cell.cancel.clone();
    tokio::select! {
        biased;
        _ = token.cancelled() => {}
        _ = run(&cell, service.as_ref(), start, interval) => {}
    }
}

async fn run(cell: &JobCell, service: &dyn BuildService, start: Option<GameId>, interval: Duration) {
    let activity_id = cell.activity_id;

    if let Some(game_id) = start {
        match service.start_build(activity_id, game_id).await {
            Ok(resp) => {
                info!(activity_id, game_id, job_id = ?resp.job_id, "Build started");
                if !cell.transition(|h| h.start_polling(resp.job_id)) {
                    return;
                }
            }
            Err(e) => {
                warn!(activity_id, game_id, error = %e, "Failed to start build");
                cell.transition(|h| h.fail(format!("Failed to start build: {e}")));
                return;
            }
        }
    }

    // The next check is scheduled only after the previous one resolved, so a
    // slow build service never sees overlapping checks for one activity.
    loop {
        tokio::time::sleep(interval).await;

        let result = service.check_build_status(activity_id).await;
        match &result {
            Ok(resp) => debug!(activity_id, status = resp.status.as_str(), "Build status checked"),
            Err(e) => warn!(activity_id, error = %e, "Build status check failed"),
        }

        if !cell.transition(|h| h.record_check(result)) {
            return;
        }

        let handle = cell.snapshot();
        if handle.state.is_terminal() {
            info!(
                activity_id,
                attempt = handle.attempt,
                state = handle.state.as_str(),
                "Build finished"
            );
            return;
        }
    }
}
