// crates/types/src/lib.rs
//! Shared domain and wire types for the quizforge workspace.
//!
//! Everything here is plain data: ids, the request/response shapes exchanged
//! with the console's REST API, and the error type every collaborator returns.

pub mod activity;
pub mod build;
pub mod error;

pub use activity::*;
pub use build::*;
pub use error::*;

/// Server-assigned id of an activity (a game plus a fixed question set).
pub type ActivityId = i64;

/// Server-assigned id of a game template.
pub type GameId = i64;

/// Server-assigned id of a question.
pub type QuestionId = i64;
