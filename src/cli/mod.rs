//! CLI support for soql-model
//!
//! Provides programmatic access to the `soql` commands for embedding in
//! other tools.

mod check;
mod convert;

pub use check::{CheckOptions, CheckResult, execute_check};
pub use convert::{ConvertOptions, execute_convert, execute_format, execute_model, execute_normalize};

use std::io;

use thiserror::Error;

use crate::deserializer::ModelConstructionError;

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Query could not be modeled: {0}")]
    Model(#[from] ModelConstructionError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("No input provided. Pass it as an argument or pipe it to stdin.")]
    NoInput,
}
