//! Process root.
//!
//! Loads configuration, verifies the backend is reachable, wires up the
//! five lane queues, and spawns the readers, batchers, and supervisor.
//! Runs until `Ctrl-C`, then cancels every task and waits for each to
//! finish its last flush before exiting.

use massive_ingest::backend::{BulkInsertBackend, ClickhouseBackend};
use massive_ingest::batch::{Batcher, CryptoQuoteColumns, CryptoTradeColumns, FmvColumns, QuoteColumns, TradeColumns};
use massive_ingest::config::AppConfig;
use massive_ingest::decode::{CryptoLanes, StockLanes};
use massive_ingest::queue::LaneQueue;
use massive_ingest::reader::crypto::run_crypto;
use massive_ingest::reader::fmv::run_fmv;
use massive_ingest::reader::stocks::run_stocks;
use massive_ingest::supervisor;
use massive_ingest::{logging, PING_DEADLINE, Q_CAP};
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    logging::init(&config);

    let backend = ClickhouseBackend::connect(&config);
    if let Err(e) = backend.ping(PING_DEADLINE).await {
        error!(error = %e, "backend unreachable at startup, exiting");
        return ExitCode::FAILURE;
    }
    let backend: Arc<dyn BulkInsertBackend> = Arc::new(backend);

    let quotes = Arc::new(LaneQueue::new(Q_CAP));
    let trades = Arc::new(LaneQueue::new(Q_CAP));
    let crypto_quotes = Arc::new(LaneQueue::new(Q_CAP));
    let crypto_trades = Arc::new(LaneQueue::new(Q_CAP));
    let fmv = Arc::new(LaneQueue::new(Q_CAP));

    let cancel = CancellationToken::new();
    let mut tasks = Vec::new();

    tasks.push(tokio::spawn(
        Batcher::<QuoteColumns>::new("quotes", quotes.clone(), backend.clone()).run(cancel.clone()),
    ));
    tasks.push(tokio::spawn(
        Batcher::<TradeColumns>::new("trades", trades.clone(), backend.clone()).run(cancel.clone()),
    ));
    tasks.push(tokio::spawn(
        Batcher::<CryptoQuoteColumns>::new("crypto_quotes", crypto_quotes.clone(), backend.clone())
            .run(cancel.clone()),
    ));
    tasks.push(tokio::spawn(
        Batcher::<CryptoTradeColumns>::new("crypto_trades", crypto_trades.clone(), backend.clone())
            .run(cancel.clone()),
    ));
    tasks.push(tokio::spawn(
        Batcher::<FmvColumns>::new("fmv", fmv.clone(), backend.clone()).run(cancel.clone()),
    ));

    let stock_lanes = StockLanes {
        quotes: quotes.clone(),
        trades: trades.clone(),
    };
    let crypto_lanes = CryptoLanes {
        quotes: crypto_quotes.clone(),
        trades: crypto_trades.clone(),
    };

    let api_key = config.api_key.clone();
    let stock_cancel = cancel.clone();
    tasks.push(tokio::spawn(async move {
        run_stocks(&api_key, stock_lanes, stock_cancel).await;
    }));

    let api_key = config.api_key.clone();
    let crypto_cancel = cancel.clone();
    tasks.push(tokio::spawn(async move {
        run_crypto(&api_key, crypto_lanes, crypto_cancel).await;
    }));

    let api_key = config.api_key.clone();
    let fmv_cancel = cancel.clone();
    let fmv_queue = fmv.clone();
    tasks.push(tokio::spawn(async move {
        run_fmv(&api_key, fmv_queue, fmv_cancel).await;
    }));

    let supervisor_lanes = supervisor::Lanes {
        quotes,
        trades,
        crypto_quotes,
        crypto_trades,
        fmv,
    };
    tasks.push(tokio::spawn(supervisor::run(supervisor_lanes, cancel.clone())));

    info!("ingester running, press Ctrl-C to stop");
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for ctrl-c");
    }
    info!("shutdown requested, cancelling tasks");
    cancel.cancel();

    for task in tasks {
        let _ = task.await;
    }
    info!("shutdown complete");
    ExitCode::SUCCESS
}
