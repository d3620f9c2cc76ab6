// crates/cli/src/plan_file.rs
//! TOML description of a batch: base name, games, question types and the
//! questions picked for each type.
//!
//! ```toml
//! base_name = "Week 3"
//!
//! [[games]]
//! id = 1
//! name = "Runner"
//!
//! [[question_types]]
//! key = "mcq"
//! label = "Multiple choice"
//!
//! [selections]
//! mcq = [101, 102, 103]
//! ```

use std::collections::HashMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use quizforge_batch::{plan, validate_selections, QuestionSelection, SelectionIssue};
use quizforge_types::{CombinationRequest, Game, QuestionType};

#[derive(Debug, Clone, Deserialize)]
pub struct BatchPlanFile {
    pub base_name: String,
    #[serde(default)]
    pub games: Vec<Game>,
    #[serde(default)]
    pub question_types: Vec<QuestionType>,
    #[serde(default)]
    pub selections: HashMap<String, QuestionSelection>,
}

impl BatchPlanFile {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read plan file {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("Invalid plan file {}", path.display()))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let file: Self = toml::from_str(raw)?;
        if file.base_name.trim().is_empty() {
            bail!("base_name must not be empty");
        }
        if let Some(key) = file
            .selections
            .keys()
            .find(|key| !file.question_types.iter().any(|qt| &qt.key == *key))
        {
            bail!("selection for unknown question type {key:?}");
        }
        Ok(file)
    }

    /// Question types that will be skipped because of their question count.
    pub fn issues(&self) -> Vec<SelectionIssue> {
        validate_selections(&self.question_types, &self.selections)
    }

    pub fn requests(&self) -> Vec<CombinationRequest> {
        plan(
            &self.games,
            &self.question_types,
            &self.selections,
            self.base_name.trim(),
        )
    }
}
