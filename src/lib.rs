//! Streaming market-data ingester.
//!
//! Five event families (stock quotes, stock trades, crypto quotes, crypto
//! trades, fair-market-value) flow from three reconnecting upstream feed
//! readers through bounded lane queues into five columnar batch writers.
//! A supervisor samples queue depth and sheds load under sustained
//! overload. See SPEC_FULL.md for the full contract.
//!
//! # Modules
//!
//! - [`config`] — environment-variable configuration, loaded once at startup
//! - [`model`] — the five record kinds and their wire coercions
//! - [`queue`] — the bounded lane queue shared by reader, batcher, and supervisor
//! - [`backend`] — the columnar store trait and its ClickHouse implementation
//! - [`batch`] — the generic batcher-writer and its five lane schemas
//! - [`decode`] — frame splitting and `ev`-tag dispatch to the right lane
//! - [`reader`] — the reconnecting stream readers and frame dispatch
//! - [`supervisor`] — periodic queue-depth sampling and head-drop shedding

pub mod backend;
pub mod batch;
pub mod config;
pub mod decode;
pub mod error;
pub mod logging;
pub mod model;
pub mod queue;
pub mod reader;
pub mod supervisor;

use std::time::Duration;

/// Capacity of each per-lane bounded queue.
pub const Q_CAP: usize = 200_000;
/// Row-count flush trigger.
pub const N_MAX: usize = 50_000;
/// Time-since-last-flush trigger.
pub const T_MAX: Duration = Duration::from_secs(1);
/// Deadline covering begin+prepare+all row executions+commit for one flush.
pub const FLUSH_DEADLINE: Duration = Duration::from_secs(10);
/// Supervisor sampling interval.
pub const SUPERVISOR_INTERVAL: Duration = Duration::from_secs(10);
/// Shedder threshold, as a fraction of `Q_CAP`.
pub const SHED_THRESHOLD_FRACTION: f64 = 0.95;
/// Maximum records the shedder removes from one lane per tick.
pub const SHED_BATCH: usize = 1_000;
/// Reader backoff policy.
pub const BACKOFF_INITIAL: Duration = Duration::from_secs(5);
pub const BACKOFF_MULTIPLIER: u32 = 2;
pub const BACKOFF_CEILING: Duration = Duration::from_secs(120);
/// Backend startup ping deadline.
pub const PING_DEADLINE: Duration = Duration::from_secs(10);
