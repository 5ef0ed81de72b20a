//! ClickHouse native-protocol client, grounded in the same connect-by-DSN
//! shape the teacher uses for its time-series backend
//! (`persistence::tdengine::TDengineClient::connect`): build a connection
//! string from [`AppConfig`], hand it to the driver's pool, ping once.
//!
//! The native protocol commits a block in a single round trip, so the
//! five-phase begin/prepare/execute/close/commit contract described in
//! SPEC_FULL.md §4.3 collapses here to one call: `get_handle` plays the
//! role of begin+prepare, `insert` plays execute+close+commit. The
//! all-or-nothing, no-partial-retention, single-deadline behavior the
//! contract actually cares about is unchanged — see DESIGN.md for the
//! reasoning.

use super::BulkInsertBackend;
use crate::config::AppConfig;
use crate::error::BackendError;
use async_trait::async_trait;
use clickhouse_rs::{Block, Pool};
use std::time::Duration;
use tracing::info;

pub struct ClickhouseBackend {
    pool: Pool,
}

impl ClickhouseBackend {
    pub fn connect(config: &AppConfig) -> Self {
        let dsn = build_dsn(config);
        info!(host = %config.clickhouse_host, secure = config.clickhouse_secure, "connecting to clickhouse");
        Self {
            pool: Pool::new(dsn.as_str()),
        }
    }
}

fn build_dsn(config: &AppConfig) -> String {
    let mut dsn = match &config.clickhouse_password {
        Some(password) => format!("tcp://{}:{}", config.clickhouse_user, password),
        None => format!("tcp://{}", config.clickhouse_user),
    };
    dsn.push_str(&format!("@{}/{}", config.clickhouse_host, config.clickhouse_db));
    dsn.push_str("?compression=lz4");
    if config.clickhouse_secure {
        dsn.push_str("&secure=true");
    }
    dsn
}

#[async_trait]
impl BulkInsertBackend for ClickhouseBackend {
    async fn ping(&self, deadline: Duration) -> Result<(), BackendError> {
        let pool = self.pool.clone();
        tokio::time::timeout(deadline, async move {
            let mut handle = pool
                .get_handle()
                .await
                .map_err(|e| BackendError::Connect(e.to_string()))?;
            handle
                .ping()
                .await
                .map_err(|e| BackendError::Ping(e.to_string()))
        })
        .await
        .map_err(|_| BackendError::DeadlineExceeded)?
    }

    async fn insert(&self, table: &str, block: Block, deadline: Duration) -> Result<(), BackendError> {
        let pool = self.pool.clone();
        let table = table.to_string();
        tokio::time::timeout(deadline, async move {
            let mut handle = pool
                .get_handle()
                .await
                .map_err(|e| BackendError::Begin(e.to_string()))?;
            handle
                .insert(&table, block)
                .await
                .map_err(|e| BackendError::Commit(e.to_string()))
        })
        .await
        .map_err(|_| BackendError::DeadlineExceeded)?
    }
}
