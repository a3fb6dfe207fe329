//! Uplink sources.
//!
//! This is the only place that touches the filesystem. Sources emit one
//! event per uplink line; a line that cannot be parsed is reported inside the
//! event so the batch keeps going, while I/O failures end the stream.

mod jsonl;

pub use jsonl::JsonLinesSource;

use serde::Deserialize;
use thiserror::Error;

use crate::payload::{PayloadError, Port, RawPayload};

/// One uplink as delivered by a network-server webhook.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Uplink {
    /// Configured device id or layout identifier.
    pub device: String,
    pub port: i64,
    #[serde(default)]
    pub bytes: Option<Vec<i64>>,
    /// Hex-encoded payload, alternative to `bytes`.
    #[serde(default)]
    pub payload: Option<String>,
    /// Unix timestamp in seconds.
    #[serde(default)]
    pub received_at: Option<f64>,
}

impl Uplink {
    pub fn port(&self) -> Result<Port, PayloadError> {
        Port::from_int(self.port)
    }

    pub fn raw_payload(&self) -> Result<RawPayload, PayloadError> {
        match (&self.bytes, &self.payload) {
            (Some(bytes), None) => RawPayload::from_ints(bytes.iter().copied()),
            (None, Some(hex)) => RawPayload::from_hex(hex),
            _ => Err(PayloadError::PayloadFields),
        }
    }
}

#[derive(Debug)]
pub struct UplinkEvent {
    /// 1-based line number in the input.
    pub line: usize,
    pub uplink: Result<Uplink, SourceError>,
}

pub trait UplinkSource {
    fn next_uplink(&mut self) -> Result<Option<UplinkEvent>, SourceError>;
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: invalid uplink JSON: {message}")]
    Json { line: usize, message: String },
}
