// crates/types/src/activity.rs
//! Activities, the games and question types they combine, and the creation
//! request produced for each (game, question type) combination.

use serde::{Deserialize, Serialize};

use crate::{ActivityId, BuildStatus, GameId, QuestionId};

/// Smallest number of questions an activity can be created with.
pub const MIN_QUESTIONS: usize = 16;

/// Largest number of questions an activity can be created with.
pub const MAX_QUESTIONS: usize = 48;

/// True when `count` questions make a creatable activity.
pub fn is_creatable_count(count: usize) -> bool {
    (MIN_QUESTIONS..=MAX_QUESTIONS).contains(&count)
}

/// A game template the user can pick for a batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    pub name: String,
}

impl Game {
    pub fn new(id: GameId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// A question type: `key` is what the API stores, `label` is what users read.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuestionType {
    pub key: String,
    pub label: String,
}

impl QuestionType {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
        }
    }
}

/// One activity to create: a game, a question type, and the questions chosen
/// for that type.
///
/// Only the batch planner builds these, and only for question sets within
/// [`MIN_QUESTIONS`]..=[`MAX_QUESTIONS`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinationRequest {
    pub game_id: GameId,
    pub question_type: String,
    pub question_ids: Vec<QuestionId>,
    pub display_name: String,
}

/// Response of the create-record call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedRecord {
    pub id: ActivityId,
}

/// One row of the activity list, as the server reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySummary {
    pub id: ActivityId,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_id: Option<GameId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_status: Option<BuildStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embed_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_url: Option<String>,
}
