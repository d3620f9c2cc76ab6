// crates/batch/tests/batch_flow.rs
//! Selection -> plan -> execution, wired together the way a view drives them.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pretty_assertions::assert_eq;

use quizforge_batch::{plan, validate_selections, BatchExecutor, BatchResult, QuestionSelection, RecordService};
use quizforge_types::{CombinationRequest, CreatedRecord, Game, QuestionType, ServiceError};

/// Rejects every request for one game; records what it was asked to create.
struct RejectGame {
    game_id: i64,
    seen: Mutex<Vec<CombinationRequest>>,
}

#[async_trait]
impl RecordService for RejectGame {
    async fn create_record(&self, request: &CombinationRequest) -> Result<CreatedRecord, ServiceError> {
        let mut seen = self.seen.lock().unwrap();
        seen.push(request.clone());
        if request.game_id == self.game_id {
            return Err(ServiceError::transport("connection reset"));
        }
        Ok(CreatedRecord {
            id: seen.len() as i64,
        })
    }
}

fn selection(ids: impl IntoIterator<Item = i64>) -> QuestionSelection {
    let mut selection = QuestionSelection::new();
    for id in ids {
        selection.add(id).unwrap();
    }
    selection
}

#[tokio::test]
async fn batch_creates_every_creatable_pair_and_reports_failures() {
    let games = vec![Game::new(1, "Runner"), Game::new(2, "Wheel"), Game::new(3, "Match")];
    let types = vec![
        QuestionType::new("mcq", "Multiple choice"),
        QuestionType::new("tf", "True/False"),
        QuestionType::new("fill", "Fill in"),
    ];
    let selections = HashMap::from([
        ("mcq".to_string(), selection(1..=16)),
        ("tf".to_string(), selection(100..=147)),
        ("fill".to_string(), selection(200..=214)),
    ]);

    let issues = validate_selections(&types, &selections);
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].message(), "Fill in: 15 questions selected, need 16-48");

    let requests = plan(&games, &types, &selections, "Unit 4");
    assert_eq!(requests.len(), 6);
    assert_eq!(requests, plan(&games, &types, &selections, "Unit 4"));

    let service = Arc::new(RejectGame {
        game_id: 2,
        seen: Mutex::new(Vec::new()),
    });
    let mut last_current = 0;
    let outcome = BatchExecutor::new(service.clone())
        .run(requests.clone(), |p| {
            assert_eq!(p.current, last_current + 1);
            assert_eq!(p.total, 6);
            last_current = p.current;
        })
        .await;

    assert_eq!(*service.seen.lock().unwrap(), requests);
    assert_eq!(outcome.succeeded, 4);
    assert_eq!(
        outcome.result(),
        BatchResult::PartialFailure {
            failed_names: vec![
                "Unit 4 - Wheel - Multiple choice".into(),
                "Unit 4 - Wheel - True/False".into(),
            ]
        }
    );
    let created: Vec<(i64, i64)> = outcome
        .created
        .iter()
        .map(|c| (c.activity_id, c.game_id))
        .collect();
    assert_eq!(created, vec![(1, 1), (2, 1), (5, 3), (6, 3)]);
}

#[tokio::test]
async fn empty_plan_runs_nothing() {
    let service = Arc::new(RejectGame {
        game_id: 0,
        seen: Mutex::new(Vec::new()),
    });
    let mut calls = 0;
    let outcome = BatchExecutor::new(service.clone())
        .run(Vec::new(), |_| calls += 1)
        .await;

    assert_eq!(calls, 0);
    assert_eq!(outcome.total, 0);
    assert_eq!(outcome.result(), BatchResult::Success);
    assert!(service.seen.lock().unwrap().is_empty());
}
