//! Error types for the weather bot core.
//!
//! "Not found" and "already exists" outcomes are not errors here: the store
//! reports them as `false`/empty results and the provider as `None`. These types
//! cover the genuine faults.

use thiserror::Error;

/// Why a single provider lookup produced no report.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Provider answered with a non-200 status (unknown city, bad key, ...).
    #[error("provider returned status {status}")]
    Status { status: reqwest::StatusCode },

    /// DNS, connect, TLS or timeout failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A 200 response whose body is not the expected JSON.
    #[error("failed to decode provider response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Persistence-layer fault from the favorites store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("failed to prepare database location: {0}")]
    Io(#[from] std::io::Error),

    /// The blocking task running the store operation panicked or was cancelled.
    #[error("store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Faults surfaced by pipeline entry points.
#[derive(Debug, Error)]
pub enum BotError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type StoreResult<T> = Result<T, StoreError>;
pub type BotResult<T> = Result<T, BotError>;
