//! Core error types for pomostudy-core.
//!
//! This module defines the error hierarchy using thiserror. Engine errors
//! are separated from storage and configuration errors so that callers can
//! tell a timer-invariant fault apart from a recoverable I/O problem.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for pomostudy-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Timer engine errors
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Timer-engine-specific errors.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Session plan rejected before building a session
    #[error("pair count must be at least 1 (got {0})")]
    InvalidPairCount(u32),

    /// A configured duration was zero
    #[error("{kind} duration must be positive")]
    InvalidDuration { kind: &'static str },

    /// The chunk queue was empty where a front chunk was required.
    /// Emptiness is resolved by an immediate rebuild, so reaching this
    /// variant indicates an internal consistency fault.
    #[error("session queue unexpectedly empty")]
    EmptySession,
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Named subject does not exist
    #[error("Unknown subject: {0}")]
    UnknownSubject(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
