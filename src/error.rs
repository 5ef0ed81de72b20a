//! Crate-wide error taxonomy.
//!
//! Configuration errors are process-fatal (surfaced at startup). Backend
//! errors are per-flush and always recovered by the batcher. Decode errors
//! are per-record and always recovered by the reader's dispatch loop.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingEnv(&'static str),

    #[error("invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("connect: {0}")]
    Connect(String),

    #[error("ping: {0}")]
    Ping(String),

    #[error("begin transaction: {0}")]
    Begin(String),

    #[error("prepare statement: {0}")]
    Prepare(String),

    #[error("execute row {row}: {source}")]
    Execute { row: usize, source: String },

    #[error("close statement: {0}")]
    Close(String),

    #[error("commit: {0}")]
    Commit(String),

    #[error("flush deadline exceeded")]
    DeadlineExceeded,
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed outer frame: {0}")]
    MalformedFrame(String),

    #[error("malformed {kind} record: {source}")]
    MalformedRecord { kind: &'static str, source: String },
}
