// crates/cli/src/lib.rs
//! Command-line front end for build jobs and batch creation.

pub mod args;
pub mod commands;
pub mod plan_file;
pub mod render;
