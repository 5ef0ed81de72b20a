//! The five record kinds that flow through the pipeline, and the wire
//! coercions needed to build them from upstream JSON.
//!
//! Each public record type is a flat, immutable, owned value — no borrowed
//! data survives the decoder. Wire structs (`Raw*`) stay private to this
//! module; [`DecodeError`] is the only thing that escapes a failed parse.

use crate::error::DecodeError;
use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// Accepts a JSON number or a decimal-digit string and converges to `u64`.
/// Needed because some upstream size fields exceed the safe-integer range
/// of naive JSON decoders and are sent as strings to route around it.
fn de_u64<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    struct U64Visitor;

    impl<'de> Visitor<'de> for U64Visitor {
        type Value = u64;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a u64 or a decimal string")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<u64, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<u64, E> {
            u64::try_from(v).map_err(de::Error::custom)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<u64, E> {
            v.parse().map_err(de::Error::custom)
        }
    }

    d.deserialize_any(U64Visitor)
}

/// Normalizes the polymorphic stock-quote condition field to a single u8:
/// scalar passes through, array takes the first element, absent or
/// malformed is 0. See §9 design notes — this collapse is lossy by design
/// and the single-u8 column is authoritative for this build.
fn canonicalize_condition(raw: &Option<Value>) -> u8 {
    match raw {
        Some(Value::Number(n)) => n.as_u64().and_then(|v| u8::try_from(v).ok()).unwrap_or(0),
        Some(Value::Array(items)) => items
            .first()
            .and_then(Value::as_u64)
            .and_then(|v| u8::try_from(v).ok())
            .unwrap_or(0),
        _ => 0,
    }
}

/// Picks the canonical key, preferring `sym` over the `symbol` fallback.
fn resolve_key(sym: Option<String>, symbol: Option<String>) -> String {
    sym.filter(|s| !s.is_empty())
        .or_else(|| symbol.filter(|s| !s.is_empty()))
        .unwrap_or_default()
}

fn malformed(kind: &'static str, e: serde_json::Error) -> DecodeError {
    DecodeError::MalformedRecord {
        kind,
        source: e.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StockQuote {
    pub symbol: String,
    pub bid_exchange: u8,
    pub bid_price: f64,
    pub bid_size: u64,
    pub ask_exchange: u8,
    pub ask_price: f64,
    pub ask_size: u64,
    pub condition: u8,
    pub indicators: Vec<u8>,
    pub timestamp_ns: u64,
    pub sequence: u64,
    pub tape: u8,
}

#[derive(Deserialize)]
struct RawStockQuote {
    sym: Option<String>,
    symbol: Option<String>,
    #[serde(default)]
    bx: u8,
    bp: f64,
    #[serde(deserialize_with = "de_u64")]
    bs: u64,
    #[serde(default)]
    ax: u8,
    ap: f64,
    #[serde(rename = "as", deserialize_with = "de_u64")]
    ask_size: u64,
    #[serde(default)]
    c: Option<Value>,
    #[serde(default)]
    i: Vec<u8>,
    t: u64,
    #[serde(default, deserialize_with = "de_u64")]
    q: u64,
    #[serde(default)]
    z: u8,
}

impl StockQuote {
    pub fn from_json(v: Value) -> Result<Self, DecodeError> {
        let raw: RawStockQuote = serde_json::from_value(v).map_err(|e| malformed("Q", e))?;
        Ok(Self {
            symbol: resolve_key(raw.sym, raw.symbol),
            bid_exchange: raw.bx,
            bid_price: raw.bp,
            bid_size: raw.bs,
            ask_exchange: raw.ax,
            ask_price: raw.ap,
            ask_size: raw.ask_size,
            condition: canonicalize_condition(&raw.c),
            indicators: raw.i,
            timestamp_ns: raw.t,
            sequence: raw.q,
            tape: raw.z,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StockTrade {
    pub symbol: String,
    pub trade_id: String,
    pub exchange: u8,
    pub price: f64,
    pub size: u64,
    pub conditions: Vec<u8>,
    pub timestamp_ns: u64,
    pub sequence: u64,
    pub tape: u8,
    pub trf_id: u64,
    pub trf_timestamp: u64,
}

#[derive(Deserialize)]
struct RawStockTrade {
    sym: Option<String>,
    symbol: Option<String>,
    #[serde(default)]
    i: String,
    #[serde(default)]
    x: u8,
    p: f64,
    #[serde(deserialize_with = "de_u64")]
    s: u64,
    #[serde(default)]
    c: Vec<u8>,
    t: u64,
    #[serde(default, deserialize_with = "de_u64")]
    q: u64,
    #[serde(default)]
    z: u8,
    #[serde(default, deserialize_with = "de_u64")]
    trfi: u64,
    #[serde(default, deserialize_with = "de_u64")]
    trft: u64,
}

impl StockTrade {
    pub fn from_json(v: Value) -> Result<Self, DecodeError> {
        let raw: RawStockTrade = serde_json::from_value(v).map_err(|e| malformed("T", e))?;
        Ok(Self {
            symbol: resolve_key(raw.sym, raw.symbol),
            trade_id: raw.i,
            exchange: raw.x,
            price: raw.p,
            size: raw.s,
            conditions: raw.c,
            timestamp_ns: raw.t,
            sequence: raw.q,
            tape: raw.z,
            trf_id: raw.trfi,
            trf_timestamp: raw.trft,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CryptoQuote {
    pub pair: String,
    pub bid_price: f64,
    pub bid_size: f64,
    pub ask_price: f64,
    pub ask_size: f64,
    pub timestamp_ns: u64,
    pub exchange: u8,
    pub received_ns: u64,
}

#[derive(Deserialize)]
struct RawCryptoQuote {
    pair: String,
    bp: f64,
    bs: f64,
    ap: f64,
    #[serde(rename = "as")]
    ask_size: f64,
    t: u64,
    #[serde(default)]
    x: u8,
    #[serde(default, deserialize_with = "de_u64")]
    r: u64,
}

impl CryptoQuote {
    pub fn from_json(v: Value) -> Result<Self, DecodeError> {
        let raw: RawCryptoQuote = serde_json::from_value(v).map_err(|e| malformed("XQ", e))?;
        Ok(Self {
            pair: raw.pair,
            bid_price: raw.bp,
            bid_size: raw.bs,
            ask_price: raw.ap,
            ask_size: raw.ask_size,
            timestamp_ns: raw.t,
            exchange: raw.x,
            received_ns: raw.r,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CryptoTrade {
    pub pair: String,
    pub price: f64,
    pub size: f64,
    pub conditions: Vec<u8>,
    pub trade_id: String,
    pub timestamp_ns: u64,
    pub exchange: u8,
    pub received_ns: u64,
}

#[derive(Deserialize)]
struct RawCryptoTrade {
    pair: String,
    p: f64,
    t: u64,
    s: f64,
    #[serde(default)]
    c: Vec<u8>,
    #[serde(default)]
    i: String,
    #[serde(default)]
    x: u8,
    #[serde(default, deserialize_with = "de_u64")]
    r: u64,
}

impl CryptoTrade {
    pub fn from_json(v: Value) -> Result<Self, DecodeError> {
        let raw: RawCryptoTrade = serde_json::from_value(v).map_err(|e| malformed("XT", e))?;
        Ok(Self {
            pair: raw.pair,
            price: raw.p,
            size: raw.s,
            conditions: raw.c,
            trade_id: raw.i,
            timestamp_ns: raw.t,
            exchange: raw.x,
            received_ns: raw.r,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fmv {
    pub symbol: String,
    pub fmv: f64,
    pub timestamp_ns: u64,
}

#[derive(Deserialize)]
struct RawFmv {
    sym: Option<String>,
    symbol: Option<String>,
    fmv: f64,
    t: u64,
}

impl Fmv {
    pub fn from_json(v: Value) -> Result<Self, DecodeError> {
        let raw: RawFmv = serde_json::from_value(v).map_err(|e| malformed("FMV", e))?;
        Ok(Self {
            symbol: resolve_key(raw.sym, raw.symbol),
            fmv: raw.fmv,
            timestamp_ns: raw.t,
        })
    }
}
