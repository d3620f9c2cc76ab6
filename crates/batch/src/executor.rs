// crates/batch/src/executor.rs
//! Sequential execution of planned creation requests.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

use quizforge_types::{ActivityId, CombinationRequest, CreatedRecord, GameId, ServiceError};

/// The record-creation endpoint of the console API.
#[async_trait]
pub trait RecordService: Send + Sync {
    /// Create one activity for a planned combination.
    async fn create_record(&self, request: &CombinationRequest) -> Result<CreatedRecord, ServiceError>;
}

/// An activity the batch created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedActivity {
    pub display_name: String,
    pub activity_id: ActivityId,
    pub game_id: GameId,
}

/// Running totals of a batch; final once every request has resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    pub total: usize,
    pub succeeded: usize,
    pub failed_names: Vec<String>,
    pub created: Vec<CreatedActivity>,
}

impl BatchOutcome {
    /// Requests resolved so far, successful or not.
    pub fn processed(&self) -> usize {
        self.succeeded + self.failed_names.len()
    }

    pub fn is_finished(&self) -> bool {
        self.processed() == self.total
    }

    pub fn result(&self) -> BatchResult {
        if self.failed_names.is_empty() {
            BatchResult::Success
        } else {
            BatchResult::PartialFailure {
                failed_names: self.failed_names.clone(),
            }
        }
    }
}

/// Overall verdict of a finished batch. Whether a partial failure is shown as
/// an error is up to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum BatchResult {
    Success,
    #[serde(rename_all = "camelCase")]
    PartialFailure { failed_names: Vec<String> },
}

/// Snapshot published after each request resolves, for a progress bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchProgress {
    /// 1-based position of the request that just resolved.
    pub current: usize,
    pub total: usize,
    pub current_label: String,
    /// Error of the request that just resolved, if it failed.
    pub error: Option<String>,
    pub outcome: BatchOutcome,
}

/// Runs creation requests one at a time.
///
/// Request *i + 1* starts only after request *i* resolved, so a partial
/// failure reports exactly how far the batch got. A failed request is
/// recorded and the batch moves on.
#[derive(Clone)]
pub struct BatchExecutor {
    service: Arc<dyn RecordService>,
}

impl BatchExecutor {
    pub fn new(service: Arc<dyn RecordService>) -> Self {
        Self { service }
    }

    /// Execute `requests` in order, calling `observer` after every item.
    pub async fn run<F>(&self, requests: Vec<CombinationRequest>, mut observer: F) -> BatchOutcome
    where
        F: FnMut(&BatchProgress),
    {
        let mut outcome = BatchOutcome {
            total: requests.len(),
            ..BatchOutcome::default()
        };
        info!(total = outcome.total, "Starting batch creation");

        for (index, request) in requests.into_iter().enumerate() {
            let error = match self.service.create_record(&request).await {
                Ok(record) => {
                    outcome.succeeded += 1;
                    outcome.created.push(CreatedActivity {
                        display_name: request.display_name.clone(),
                        activity_id: record.id,
                        game_id: request.game_id,
                    });
                    None
                }
                Err(e) => {
                    warn!(
                        item = index + 1,
                        name = %request.display_name,
                        error = %e,
                        "Batch item failed"
                    );
                    outcome.failed_names.push(request.display_name.clone());
                    Some(e.to_string())
                }
            };

            observer(&BatchProgress {
                current: index + 1,
                total: outcome.total,
                current_label: request.display_name,
                error,
                outcome: outcome.clone(),
            });
        }

        if outcome.failed_names.is_empty() {
            info!(succeeded = outcome.succeeded, "Batch creation complete");
        } else {
            warn!(
                succeeded = outcome.succeeded,
                failed = outcome.failed_names.len(),
                "Batch creation finished with failures"
            );
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    /// Fails the requests whose display names are listed; records call order
    /// and how many creates overlap.
    #[derive(Default)]
    struct FakeRecords {
        fail: Vec<String>,
        calls: Mutex<Vec<String>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    #[async_trait]
    impl RecordService for FakeRecords {
        async fn create_record(
            &self,
            request: &CombinationRequest,
        ) -> Result<CreatedRecord, ServiceError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            let mut calls = self.calls.lock().unwrap();
            calls.push(request.display_name.clone());
            if self.fail.contains(&request.display_name) {
                return Err(ServiceError::status(500, "insert failed"));
            }
            Ok(CreatedRecord {
                id: 1000 + calls.len() as i64,
            })
        }
    }

    fn request(name: &str, game_id: i64) -> CombinationRequest {
        CombinationRequest {
            game_id,
            question_type: "mc".into(),
            question_ids: (1..=16).collect(),
            display_name: name.into(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_in_the_middle_does_not_abort() {
        let service = Arc::new(FakeRecords {
            fail: vec!["name2".into()],
            ..Default::default()
        });
        let executor = BatchExecutor::new(service.clone());
        let mut progress = Vec::new();

        let outcome = executor
            .run(
                vec![request("name1", 1), request("name2", 1), request("name3", 2)],
                |p| progress.push(p.clone()),
            )
            .await;

        assert_eq!(outcome.total, 3);
        assert_eq!(outcome.succeeded, 2);
        assert_eq!(outcome.failed_names, vec!["name2".to_string()]);
        assert_eq!(
            *service.calls.lock().unwrap(),
            vec!["name1", "name2", "name3"]
        );
        assert_eq!(
            outcome.result(),
            BatchResult::PartialFailure {
                failed_names: vec!["name2".into()]
            }
        );
        assert_eq!(
            outcome.created,
            vec![
                CreatedActivity {
                    display_name: "name1".into(),
                    activity_id: 1001,
                    game_id: 1,
                },
                CreatedActivity {
                    display_name: "name3".into(),
                    activity_id: 1003,
                    game_id: 2,
                },
            ]
        );

        // One snapshot per item, in order.
        let seen: Vec<(usize, &str, bool)> = progress
            .iter()
            .map(|p| (p.current, p.current_label.as_str(), p.error.is_some()))
            .collect();
        assert_eq!(
            seen,
            vec![(1, "name1", false), (2, "name2", true), (3, "name3", false)]
        );
        assert_eq!(progress[1].outcome.processed(), 2);
        assert!(progress[2].outcome.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_creates_run_strictly_sequentially() {
        let service = Arc::new(FakeRecords::default());
        let executor = BatchExecutor::new(service.clone());

        let requests = (1..=12).map(|i| request(&format!("item{i}"), i)).collect();
        let outcome = executor.run(requests, |_| {}).await;

        assert_eq!(outcome.result(), BatchResult::Success);
        assert_eq!(outcome.succeeded, 12);
        assert_eq!(service.max_in_flight.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let executor = BatchExecutor::new(Arc::new(FakeRecords::default()));
        let mut calls = 0;
        let outcome = executor.run(Vec::new(), |_| calls += 1).await;
        assert_eq!(outcome, BatchOutcome::default());
        assert!(outcome.is_finished());
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_batch_result_serialize() {
        let result = BatchResult::PartialFailure {
            failed_names: vec!["A - Quiz Race - Essay".into()],
        };
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(
            json,
            r#"{"kind":"partialFailure","failedNames":["A - Quiz Race - Essay"]}"#
        );
    }
}
