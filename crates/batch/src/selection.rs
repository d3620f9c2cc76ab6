// crates/batch/src/selection.rs
//! Per-question-type question selections and their cardinality gate.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use quizforge_types::{is_creatable_count, QuestionId, QuestionType, MAX_QUESTIONS, MIN_QUESTIONS};

/// Errors raised while building a selection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("Selection is full: at most {max} questions per question type")]
    Full { max: usize },

    #[error("Question {0} is already selected")]
    Duplicate(QuestionId),
}

/// Ordered, duplicate-free set of question ids chosen for one question type.
///
/// Refuses to grow past [`MAX_QUESTIONS`], so an oversized selection cannot
/// be built in the first place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<QuestionId>", into = "Vec<QuestionId>")]
pub struct QuestionSelection {
    ids: Vec<QuestionId>,
}

impl QuestionSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a question at the end of the selection.
    pub fn add(&mut self, id: QuestionId) -> Result<(), SelectionError> {
        if self.ids.contains(&id) {
            return Err(SelectionError::Duplicate(id));
        }
        if self.ids.len() >= MAX_QUESTIONS {
            return Err(SelectionError::Full { max: MAX_QUESTIONS });
        }
        self.ids.push(id);
        Ok(())
    }

    /// Remove a question; returns whether it was selected.
    pub fn remove(&mut self, id: QuestionId) -> bool {
        let before = self.ids.len();
        self.ids.retain(|q| *q != id);
        self.ids.len() != before
    }

    pub fn contains(&self, id: QuestionId) -> bool {
        self.ids.contains(&id)
    }

    pub fn ids(&self) -> &[QuestionId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Between [`MIN_QUESTIONS`] and [`MAX_QUESTIONS`] questions, inclusive.
    pub fn is_creatable(&self) -> bool {
        is_creatable_count(self.ids.len())
    }
}

impl TryFrom<Vec<QuestionId>> for QuestionSelection {
    type Error = SelectionError;

    fn try_from(ids: Vec<QuestionId>) -> Result<Self, Self::Error> {
        let mut selection = Self::new();
        for id in ids {
            selection.add(id)?;
        }
        Ok(selection)
    }
}

impl From<QuestionSelection> for Vec<QuestionId> {
    fn from(selection: QuestionSelection) -> Self {
        selection.ids
    }
}

/// A selected question type whose question count would be excluded from a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionIssue {
    pub question_type: String,
    pub label: String,
    pub count: usize,
}

impl SelectionIssue {
    /// Message for the form, e.g. "Multiple choice: 12 questions selected, need 16-48".
    pub fn message(&self) -> String {
        format!(
            "{}: {} questions selected, need {}-{}",
            self.label, self.count, MIN_QUESTIONS, MAX_QUESTIONS
        )
    }
}

/// List the selected question types whose selections are outside
/// [`MIN_QUESTIONS`]..=[`MAX_QUESTIONS`] (a missing selection counts as 0).
///
/// Views call this before planning so the user sees why a combination would
/// be left out.
pub fn validate_selections(
    question_types: &[QuestionType],
    selections: &HashMap<String, QuestionSelection>,
) -> Vec<SelectionIssue> {
    question_types
        .iter()
        .filter_map(|qt| {
            let count = selections.get(&qt.key).map_or(0, QuestionSelection::len);
            (!is_creatable_count(count)).then(|| SelectionIssue {
                question_type: qt.key.clone(),
                label: qt.label.clone(),
                count,
            })
        })
        .collect()
}
