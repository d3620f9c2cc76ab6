// crates/batch/src/lib.rs
//! Batch creation of activities from a (game x question type) multi-select.
//!
//! - `QuestionSelection`: per-type question picks, capped at 48
//! - `plan`: expand the multi-select into one request per creatable combination
//! - `BatchExecutor`: create them one by one, keeping track of every failure

pub mod executor;
pub mod planner;
pub mod selection;

pub use executor::{BatchExecutor, BatchOutcome, BatchProgress, BatchResult, CreatedActivity, RecordService};
pub use planner::{display_name, plan};
pub use selection::{validate_selections, QuestionSelection, SelectionError, SelectionIssue};
