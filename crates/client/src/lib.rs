// crates/client/src/lib.rs
//! HTTP access to the quiz console API and the console's configuration.

pub mod api;
pub mod config;
pub mod error;

pub use api::ApiClient;
pub use config::{ApiConfig, ConsoleConfig};
pub use error::ConfigError;
