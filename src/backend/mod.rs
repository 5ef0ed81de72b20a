//! The downstream columnar store, modeled as a typed bulk-insert trait.
//!
//! The concrete store and its wire protocol are an external collaborator
//! (see SPEC_FULL.md §1); this module only fixes the shape every lane
//! needs from it: a pooled, `Send + Sync` handle that can ping for
//! readiness and commit one columnar block per flush.

mod clickhouse;

pub use clickhouse::ClickhouseBackend;

use crate::error::BackendError;
use async_trait::async_trait;
use clickhouse_rs::Block;
use std::time::Duration;

#[async_trait]
pub trait BulkInsertBackend: Send + Sync {
    /// Connection-level health check, run once at startup. Failure here
    /// is fatal — the process never starts its pipeline against a store
    /// it cannot reach.
    async fn ping(&self, deadline: Duration) -> Result<(), BackendError>;

    /// Commits one columnar block to `table` under `deadline`. All-or-
    /// nothing: a partial failure never leaves rows durable, and the
    /// caller never retries — see SPEC_FULL.md §9, "No retry on flush
    /// failure".
    async fn insert(&self, table: &str, block: Block, deadline: Duration) -> Result<(), BackendError>;
}
