// ABOUTME: Defines all error types for the arena library using thiserror.
// ABOUTME: Each submodule has its own error enum, unified under ArenaError.

use std::path::PathBuf;

/// Top-level error type for the arena library.
#[derive(Debug, thiserror::Error)]
pub enum ArenaError {
    #[error("Coordinator error: {0}")]
    Coordinator(#[from] CoordinatorError),

    #[error("Training error: {0}")]
    Training(#[from] TrainingError),

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("Pool error: {0}")]
    Pool(#[from] PoolError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Errors from the matchmaking coordinator.
#[derive(Debug, thiserror::Error)]
pub enum CoordinatorError {
    #[error("Agent queue closed after {received} of {expected} agents")]
    QueueClosed { received: usize, expected: usize },

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),
}

/// Errors from training workers.
#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    #[error("Trainer failed at iteration {iteration}: {source}")]
    Trainer {
        iteration: u64,
        #[source]
        source: anyhow::Error,
    },

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Agent queue closed while '{worker}' submitted iteration {iteration}")]
    QueueClosed { worker: String, iteration: u64 },
}

/// Errors from agent snapshot operations.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("Failed to persist snapshot to {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to load snapshot from {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors from the shared worker pool.
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error("Worker pool is shut down")]
    ShutDown,
}

/// Errors from loading or validating experiment configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
