//! Scripted in-memory build service shared by the integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use quizforge_jobs::{BuildService, JobRegistry, PollConfig};
use quizforge_types::{
    ActivityId, BuildStatus, BuildStatusResponse, GameId, ServiceError, StartBuildResponse,
};

pub const INTERVAL: Duration = Duration::from_secs(30);

/// Build service whose answers are scripted per activity.
///
/// Unscripted start calls succeed; unscripted status checks report `processing`.
#[derive(Default)]
pub struct FakeBuildService {
    starts: Mutex<HashMap<ActivityId, VecDeque<Result<StartBuildResponse, ServiceError>>>>,
    statuses: Mutex<HashMap<ActivityId, VecDeque<Result<BuildStatusResponse, ServiceError>>>>,
    check_delay: Mutex<Duration>,
    pub start_calls: AtomicUsize,
    pub check_calls: AtomicUsize,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    check_log: Mutex<Vec<ActivityId>>,
}

impl FakeBuildService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn script_start(&self, activity_id: ActivityId, result: Result<StartBuildResponse, ServiceError>) {
        self.starts
            .lock()
            .unwrap()
            .entry(activity_id)
            .or_default()
            .push_back(result);
    }

    pub fn script_statuses(
        &self,
        activity_id: ActivityId,
        results: Vec<Result<BuildStatusResponse, ServiceError>>,
    ) {
        self.statuses
            .lock()
            .unwrap()
            .entry(activity_id)
            .or_default()
            .extend(results);
    }

    /// Make every status check take `delay` of (simulated) time.
    pub fn set_check_delay(&self, delay: Duration) {
        *self.check_delay.lock().unwrap() = delay;
    }

    pub fn starts(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    pub fn checks(&self) -> usize {
        self.check_calls.load(Ordering::SeqCst)
    }

    pub fn checks_for(&self, activity_id: ActivityId) -> usize {
        self.check_log
            .lock()
            .unwrap()
            .iter()
            .filter(|id| **id == activity_id)
            .count()
    }
}

#[async_trait]
impl BuildService for FakeBuildService {
    async fn start_build(
        &self,
        activity_id: ActivityId,
        _game_id: GameId,
    ) -> Result<StartBuildResponse, ServiceError> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self
            .starts
            .lock()
            .unwrap()
            .get_mut(&activity_id)
            .and_then(VecDeque::pop_front);
        scripted.unwrap_or_else(|| {
            Ok(StartBuildResponse {
                job_id: Some(format!("job-{activity_id}")),
            })
        })
    }

    async fn check_build_status(
        &self,
        activity_id: ActivityId,
    ) -> Result<BuildStatusResponse, ServiceError> {
        self.check_calls.fetch_add(1, Ordering::SeqCst);
        self.check_log.lock().unwrap().push(activity_id);

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = *self.check_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        let scripted = self
            .statuses
            .lock()
            .unwrap()
            .get_mut(&activity_id)
            .and_then(VecDeque::pop_front);
        scripted.unwrap_or_else(|| Ok(BuildStatusResponse::new(BuildStatus::Processing)))
    }
}

pub fn registry(service: &Arc<FakeBuildService>) -> Arc<JobRegistry> {
    Arc::new(JobRegistry::new(
        Arc::clone(service) as Arc<dyn BuildService>,
        PollConfig::with_interval_secs(INTERVAL.as_secs()),
    ))
}

pub fn processing() -> Result<BuildStatusResponse, ServiceError> {
    Ok(BuildStatusResponse::new(BuildStatus::Processing))
}

pub fn completed(embed_code: &str) -> Result<BuildStatusResponse, ServiceError> {
    Ok(BuildStatusResponse::completed(embed_code, None))
}
