//! Error types for the analysis engine

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced to the host application.
///
/// Rule predicates never produce these: a failing rule is logged and treated
/// as "did not fire". These cover caller-level preconditions and I/O at the
/// edges of the library (config files, rule pack documents).
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("nothing to analyze: the model has no components")]
    EmptyModel,

    #[error("unknown node: {0}")]
    UnknownNode(String),

    #[error("invalid rule pack: {0}")]
    InvalidRulePack(String),

    #[error("unknown rule pack: {0}")]
    UnknownRulePack(String),

    #[error("failed to load config {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
