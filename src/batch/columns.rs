//! Per-lane column accumulators.
//!
//! Each lane keeps one struct of parallel `Vec`s — the shape ClickHouse's
//! native block format wants directly, and the shape that makes `into_block`
//! a single pass of `Block::new().column(...)` calls with no intermediate
//! row representation.

use crate::model::{CryptoQuote, CryptoTrade, Fmv, StockQuote, StockTrade};
use clickhouse_rs::Block;

/// Common shape every lane's column accumulator implements. The batcher
/// driver in [`super::Batcher`] is generic over this trait so one control
/// loop serves all five lanes.
pub trait LaneBatch: Default {
    type Record;

    /// Defense-in-depth filter applied at enqueue time, independent of
    /// whatever validation already happened in the decoder. Default accepts
    /// everything; lanes keyed by symbol override it to reject an empty key.
    fn accepts(_record: &Self::Record) -> bool {
        true
    }

    fn push(&mut self, record: Self::Record);
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn table(&self) -> &'static str;
    fn into_block(self) -> Block;
}

#[derive(Default)]
pub struct QuoteColumns {
    sym: Vec<String>,
    bx: Vec<u8>,
    bp: Vec<f64>,
    bs: Vec<u64>,
    ax: Vec<u8>,
    ap: Vec<f64>,
    ask_size: Vec<u64>,
    c: Vec<u8>,
    i: Vec<Vec<u8>>,
    t: Vec<u64>,
    q: Vec<u64>,
    z: Vec<u8>,
}

impl LaneBatch for QuoteColumns {
    type Record = StockQuote;

    fn accepts(record: &StockQuote) -> bool {
        !record.symbol.is_empty()
    }

    fn push(&mut self, r: StockQuote) {
        self.sym.push(r.symbol);
        self.bx.push(r.bid_exchange);
        self.bp.push(r.bid_price);
        self.bs.push(r.bid_size);
        self.ax.push(r.ask_exchange);
        self.ap.push(r.ask_price);
        self.ask_size.push(r.ask_size);
        self.c.push(r.condition);
        self.i.push(r.indicators);
        self.t.push(r.timestamp_ns);
        self.q.push(r.sequence);
        self.z.push(r.tape);
    }

    fn len(&self) -> usize {
        self.sym.len()
    }

    fn table(&self) -> &'static str {
        "quotes"
    }

    fn into_block(self) -> Block {
        Block::new()
            .column("sym", self.sym)
            .column("bx", self.bx)
            .column("bp", self.bp)
            .column("bs", self.bs)
            .column("ax", self.ax)
            .column("ap", self.ap)
            .column("as", self.ask_size)
            .column("c", self.c)
            .column("i", self.i)
            .column("t", self.t)
            .column("q", self.q)
            .column("z", self.z)
    }
}

#[derive(Default)]
pub struct TradeColumns {
    sym: Vec<String>,
    i: Vec<String>,
    x: Vec<u8>,
    p: Vec<f64>,
    s: Vec<u64>,
    c: Vec<Vec<u8>>,
    t: Vec<u64>,
    q: Vec<u64>,
    z: Vec<u8>,
    trfi: Vec<u64>,
    trft: Vec<u64>,
}

impl LaneBatch for TradeColumns {
    type Record = StockTrade;

    fn accepts(record: &StockTrade) -> bool {
        !record.symbol.is_empty()
    }

    fn push(&mut self, r: StockTrade) {
        self.sym.push(r.symbol);
        self.i.push(r.trade_id);
        self.x.push(r.exchange);
        self.p.push(r.price);
        self.s.push(r.size);
        self.c.push(r.conditions);
        self.t.push(r.timestamp_ns);
        self.q.push(r.sequence);
        self.z.push(r.tape);
        self.trfi.push(r.trf_id);
        self.trft.push(r.trf_timestamp);
    }

    fn len(&self) -> usize {
        self.sym.len()
    }

    fn table(&self) -> &'static str {
        "trades"
    }

    fn into_block(self) -> Block {
        Block::new()
            .column("sym", self.sym)
            .column("i", self.i)
            .column("x", self.x)
            .column("p", self.p)
            .column("s", self.s)
            .column("c", self.c)
            .column("t", self.t)
            .column("q", self.q)
            .column("z", self.z)
            .column("trfi", self.trfi)
            .column("trft", self.trft)
    }
}

#[derive(Default)]
pub struct CryptoQuoteColumns {
    pair: Vec<String>,
    bp: Vec<f64>,
    bs: Vec<f64>,
    ap: Vec<f64>,
    ask_size: Vec<f64>,
    t: Vec<u64>,
    x: Vec<u8>,
    r: Vec<u64>,
}

impl LaneBatch for CryptoQuoteColumns {
    type Record = CryptoQuote;

    fn push(&mut self, r: CryptoQuote) {
        self.pair.push(r.pair);
        self.bp.push(r.bid_price);
        self.bs.push(r.bid_size);
        self.ap.push(r.ask_price);
        self.ask_size.push(r.ask_size);
        self.t.push(r.timestamp_ns);
        self.x.push(r.exchange);
        self.r.push(r.received_ns);
    }

    fn len(&self) -> usize {
        self.pair.len()
    }

    fn table(&self) -> &'static str {
        "crypto_quotes"
    }

    fn into_block(self) -> Block {
        Block::new()
            .column("pair", self.pair)
            .column("bp", self.bp)
            .column("bs", self.bs)
            .column("ap", self.ap)
            .column("as", self.ask_size)
            .column("t", self.t)
            .column("x", self.x)
            .column("r", self.r)
    }
}

#[derive(Default)]
pub struct CryptoTradeColumns {
    pair: Vec<String>,
    p: Vec<f64>,
    t: Vec<u64>,
    s: Vec<f64>,
    c: Vec<Vec<u8>>,
    i: Vec<String>,
    x: Vec<u8>,
    r: Vec<u64>,
}

impl LaneBatch for CryptoTradeColumns {
    type Record = CryptoTrade;

    fn push(&mut self, r: CryptoTrade) {
        self.pair.push(r.pair);
        self.p.push(r.price);
        self.t.push(r.timestamp_ns);
        self.s.push(r.size);
        self.c.push(r.conditions);
        self.i.push(r.trade_id);
        self.x.push(r.exchange);
        self.r.push(r.received_ns);
    }

    fn len(&self) -> usize {
        self.pair.len()
    }

    fn table(&self) -> &'static str {
        "crypto_trades"
    }

    fn into_block(self) -> Block {
        Block::new()
            .column("pair", self.pair)
            .column("p", self.p)
            .column("t", self.t)
            .column("s", self.s)
            .column("c", self.c)
            .column("i", self.i)
            .column("x", self.x)
            .column("r", self.r)
    }
}

#[derive(Default)]
pub struct FmvColumns {
    sym: Vec<String>,
    fmv: Vec<f64>,
    t: Vec<u64>,
}

impl LaneBatch for FmvColumns {
    type Record = Fmv;

    fn accepts(record: &Fmv) -> bool {
        !record.symbol.is_empty()
    }

    fn push(&mut self, r: Fmv) {
        self.sym.push(r.symbol);
        self.fmv.push(r.fmv);
        self.t.push(r.timestamp_ns);
    }

    fn len(&self) -> usize {
        self.sym.len()
    }

    fn table(&self) -> &'static str {
        "stock_fmv"
    }

    fn into_block(self) -> Block {
        Block::new()
            .column("sym", self.sym)
            .column("fmv", self.fmv)
            .column("t", self.t)
    }
}
