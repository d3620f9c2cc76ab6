// crates/jobs/src/registry.rs
//! Process-wide owner of every build job.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::{broadcast, watch};
use tracing::{debug, info};

use quizforge_types::{ActivityId, GameId};

use super::config::PollConfig;
use super::poller::{JobCell, JobPoller};
use super::service::BuildService;
use super::types::JobHandle;

/// One tracked activity: its snapshot channel and, while it has one, its poller.
struct JobEntry {
    tx: Arc<watch::Sender<JobHandle>>,
    poller: Option<JobPoller>,
}

impl JobEntry {
    fn new(handle: JobHandle) -> Self {
        let (tx, _) = watch::channel(handle);
        Self {
            tx: Arc::new(tx),
            poller: None,
        }
    }

    fn snapshot(&self) -> JobHandle {
        self.tx.borrow().clone()
    }

    fn is_active(&self) -> bool {
        self.poller.as_ref().is_some_and(JobPoller::is_active)
    }
}

/// Outcome of [`JobRegistry::attach`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attach {
    /// A new poller now follows the job, starting in `Polling`.
    Attached(JobHandle),
    /// An active poller already owned the job; nothing changed.
    AlreadyTracked(JobHandle),
}

impl Attach {
    pub fn handle(&self) -> &JobHandle {
        match self {
            Self::Attached(h) | Self::AlreadyTracked(h) => h,
        }
    }
}

/// Single owner of all build jobs and their pollers.
///
/// Share it behind an `Arc`: a list view and a detail view showing the same
/// activity read one job instead of each starting their own. At most one
/// active poller exists per activity id at any time.
pub struct JobRegistry {
    service: Arc<dyn BuildService>,
    config: PollConfig,
    jobs: RwLock<HashMap<ActivityId, JobEntry>>,
    events: broadcast::Sender<JobHandle>,
}

impl JobRegistry {
    /// Create a registry polling `service` at the configured interval.
    pub fn new(service: Arc<dyn BuildService>, config: PollConfig) -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            service,
            config,
            jobs: RwLock::new(HashMap::new()),
            events,
        }
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    /// Start a build for `activity_id`.
    ///
    /// A job that is already submitting or polling is returned untouched, so a
    /// double click launches one build. A terminal or cancelled job is
    /// replaced by a fresh one. Start failures land in the returned job's
    /// state, never in the caller.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&self, activity_id: ActivityId, game_id: GameId) -> JobHandle {
        let mut jobs = self.write_jobs();

        let entry = jobs
            .entry(activity_id)
            .or_insert_with(|| JobEntry::new(JobHandle::idle(activity_id, Some(game_id))));

        if entry.is_active() {
            debug!(activity_id, "Build already in flight, submit ignored");
            return entry.snapshot();
        }

        // Release the previous generation before the new one writes.
        if let Some(previous) = entry.poller.take() {
            previous.cancel();
        }

        info!(activity_id, game_id, "Submitting build");
        let cell = JobCell::new(activity_id, Arc::clone(&entry.tx), self.events.clone());
        entry.poller = Some(JobPoller::submit(
            cell,
            Arc::clone(&self.service),
            game_id,
            self.config.interval(),
        ));
        entry.snapshot()
    }

    /// Follow a job that was started elsewhere, without issuing a start call.
    ///
    /// An active poller for the id is left alone; otherwise a new one begins
    /// directly in `Polling`.
    pub fn attach(&self, activity_id: ActivityId) -> Attach {
        let mut jobs = self.write_jobs();

        let entry = jobs
            .entry(activity_id)
            .or_insert_with(|| JobEntry::new(JobHandle::reattached(activity_id)));

        if entry.is_active() {
            return Attach::AlreadyTracked(entry.snapshot());
        }

        if let Some(previous) = entry.poller.take() {
            previous.cancel();
        }

        info!(activity_id, "Re-attaching to in-progress build");
        let cell = JobCell::new(activity_id, Arc::clone(&entry.tx), self.events.clone());
        entry.poller = Some(JobPoller::reattach(
            cell,
            Arc::clone(&self.service),
            self.config.interval(),
        ));
        Attach::Attached(entry.snapshot())
    }

    /// Record a terminal job reported by the server, if nothing tracks the id
    /// yet. Returns whether the handle was stored.
    pub(crate) fn seed(&self, handle: JobHandle) -> bool {
        debug_assert!(handle.state.is_terminal());
        let mut jobs = self.write_jobs();
        if jobs.contains_key(&handle.activity_id) {
            return false;
        }
        let _ = self.events.send(handle.clone());
        jobs.insert(handle.activity_id, JobEntry::new(handle));
        true
    }

    /// Stop the job's poller, keeping its last state for display.
    /// Returns false when there was nothing left to stop: untracked id, poller
    /// already cancelled, or job already completed or failed.
    pub fn cancel(&self, activity_id: ActivityId) -> bool {
        self.read_jobs()
            .get(&activity_id)
            .and_then(|entry| entry.poller.as_ref())
            .is_some_and(JobPoller::cancel)
    }

    /// Stop and forget one job (its view went away).
    pub fn remove(&self, activity_id: ActivityId) -> Option<JobHandle> {
        let entry = self.write_jobs().remove(&activity_id)?;
        // Dropping the entry drops the poller, which cancels it.
        Some(entry.snapshot())
    }

    /// Stop and forget every job.
    pub fn clear(&self) {
        let drained: Vec<JobEntry> = self.write_jobs().drain().map(|(_, e)| e).collect();
        if !drained.is_empty() {
            debug!(count = drained.len(), "Cleared build jobs");
        }
    }

    /// Current snapshot of one job.
    pub fn get(&self, activity_id: ActivityId) -> Option<JobHandle> {
        self.read_jobs().get(&activity_id).map(JobEntry::snapshot)
    }

    /// Snapshots of every tracked job, ordered by activity id.
    pub fn snapshot(&self) -> Vec<JobHandle> {
        let mut all: Vec<JobHandle> = self.read_jobs().values().map(JobEntry::snapshot).collect();
        all.sort_by_key(|h| h.activity_id);
        all
    }

    /// Snapshots of jobs with a live poller that is still submitting or polling.
    pub fn active_jobs(&self) -> Vec<JobHandle> {
        let mut active: Vec<JobHandle> = self
            .read_jobs()
            .values()
            .filter(|e| e.is_active())
            .map(JobEntry::snapshot)
            .collect();
        active.sort_by_key(|h| h.activity_id);
        active
    }

    pub fn is_active(&self, activity_id: ActivityId) -> bool {
        self.read_jobs()
            .get(&activity_id)
            .is_some_and(JobEntry::is_active)
    }

    pub fn len(&self) -> usize {
        self.read_jobs().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_jobs().is_empty()
    }

    /// Observe one job's latest snapshot. The subscription survives
    /// resubmissions of the same activity.
    pub fn subscribe(&self, activity_id: ActivityId) -> Option<watch::Receiver<JobHandle>> {
        self.read_jobs().get(&activity_id).map(|e| e.tx.subscribe())
    }

    /// Every transition of every job, for list views.
    pub fn subscribe_all(&self) -> broadcast::Receiver<JobHandle> {
        self.events.subscribe()
    }

    /// Wait until the job reaches a terminal state.
    ///
    /// Keeps waiting across resubmissions of the same activity. Returns `None`
    /// when the id is not tracked, or when the job is cancelled or removed
    /// before it finishes and no newer poller took it over.
    pub async fn wait_terminal(&self, activity_id: ActivityId) -> Option<JobHandle> {
        let mut rx = self.subscribe(activity_id)?;
        loop {
            let token = {
                let jobs = self.read_jobs();
                jobs.get(&activity_id)?
                    .poller
                    .as_ref()
                    .map(JobPoller::cancel_token)
            };
            let Some(token) = token else {
                return self.get(activity_id).filter(|h| h.state.is_terminal());
            };

            let finished = async {
                rx.wait_for(|h| h.state.is_terminal())
                    .await
                    .ok()
                    .map(|h| JobHandle::clone(&h))
            };
            tokio::select! {
                biased;
                handle = finished => return handle,
                _ = token.cancelled() => {}
            }

            // The poller we were following is gone; a resubmission replaces
            // it under the same lock, so a live poller here is its successor.
            let superseded = self
                .read_jobs()
                .get(&activity_id)
                .and_then(|entry| entry.poller.as_ref())
                .is_some_and(|poller| !poller.is_cancelled());
            if !superseded {
                return self.get(activity_id).filter(|h| h.state.is_terminal());
            }
        }
    }

    fn read_jobs(&self) -> RwLockReadGuard<'_, HashMap<ActivityId, JobEntry>> {
        self.jobs.read().unwrap_or_else(|e| {
            tracing::error!("RwLock poisoned reading jobs map: {e}");
            e.into_inner()
        })
    }

    fn write_jobs(&self) -> RwLockWriteGuard<'_, HashMap<ActivityId, JobEntry>> {
        self.jobs.write().unwrap_or_else(|e| {
            tracing::error!("RwLock poisoned writing jobs map: {e}");
            e.into_inner()
        })
    }
}

impl Drop for JobRegistry {
    fn drop(&mut self) {
        self.clear();
    }
}
