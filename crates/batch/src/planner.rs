// crates/batch/src/planner.rs
//! Expands a (game x question type) multi-select into creation requests.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use quizforge_types::{CombinationRequest, Game, QuestionType};

use super::selection::QuestionSelection;

/// Display name of the activity created for one combination.
pub fn display_name(base_name: &str, game: &Game, question_type: &QuestionType) -> String {
    format!("{} - {} - {}", base_name, game.name, question_type.label)
}

/// Plan one [`CombinationRequest`] per (game, question type) pair whose
/// selection holds a creatable number of questions.
///
/// Games form the outer loop and question types the inner one, both in the
/// caller's order; repeated games or types only count once. Pairs whose
/// selection is missing or out of range are left out silently (views report
/// them beforehand with [`validate_selections`](super::validate_selections)).
///
/// Pure: the same inputs always give the same list in the same order, so
/// "3 of 12" means the same item on every run.
pub fn plan(
    games: &[Game],
    question_types: &[QuestionType],
    selections: &HashMap<String, QuestionSelection>,
    base_name: &str,
) -> Vec<CombinationRequest> {
    let mut seen_games = HashSet::new();
    let games: Vec<&Game> = games.iter().filter(|g| seen_games.insert(g.id)).collect();

    let mut seen_types = HashSet::new();
    let question_types: Vec<&QuestionType> = question_types
        .iter()
        .filter(|qt| seen_types.insert(qt.key.as_str()))
        .collect();

    let mut requests = Vec::with_capacity(games.len() * question_types.len());
    for game in &games {
        for qt in &question_types {
            let Some(selection) = selections.get(&qt.key).filter(|s| s.is_creatable()) else {
                continue;
            };
            requests.push(CombinationRequest {
                game_id: game.id,
                question_type: qt.key.clone(),
                question_ids: selection.ids().to_vec(),
                display_name: display_name(base_name, game, qt),
            });
        }
    }

    debug!(
        games = games.len(),
        question_types = question_types.len(),
        planned = requests.len(),
        "Planned batch"
    );
    requests
}
