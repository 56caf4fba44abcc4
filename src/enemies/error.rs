//! Error types for enemy data loading.

use thiserror::Error;

/// Errors that can occur when loading enemy definitions.
#[derive(Debug, Error)]
pub enum EnemyDataError {
    /// File could not be found.
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// File could not be read.
    #[error("Failed to read file '{path}': {details}")]
    ReadError { path: String, details: String },

    /// RON parsing failed.
    #[error("Parse error in '{path}': {details}")]
    ParseError { path: String, details: String },

    /// A stat is out of its valid range.
    #[error("Enemy '{enemy}' has invalid {stat}: {value}")]
    InvalidStat {
        enemy: String,
        stat: &'static str,
        value: f32,
    },
}
