//! loradec core library for LoRaWAN uplink payload decoding.
//!
//! Devices send fixed-size payloads; this crate turns them into named numeric
//! records. Decoding is data-driven: each device type has a static layout
//! (field name, byte offset, codec) and a single decoder walks it. Byte access
//! and the 16-bit semi-float codec live in `codec`, layouts in `layouts`, the
//! dispatcher in `decoder`. Decoding is pure and side-effect free; file access
//! is isolated in `source`, and `batch` aggregates many uplinks into a
//! deterministic report.
//!
//! Invariants:
//! - A decode either returns a complete record or an error, never a partial one.
//! - Record fields keep layout order; field names are part of the output contract.
//! - Report outputs are deterministic and stable across runs.
//!
//! Version française (résumé):
//! Cette crate décode les charges utiles LoRaWAN : tables de layout statiques
//! -> décodeur unique -> enregistrement ordonné. Le codec semi-float et la
//! lecture big-endian sont dans `codec`, les E/S restent dans `source`.
//!
//! # Examples
//! ```
//! use loradec_core::{DeviceKind, Port, decode_device};
//!
//! let record = decode_device(DeviceKind::Bme280, &[0x07, 0x09, 0x60, 0x09, 0x60], Port(1))?;
//! assert_eq!(record.get_f64("celsius"), Some(24.0));
//! # Ok::<(), loradec_core::DecodeError>(())
//! ```

use serde::{Deserialize, Serialize};

mod batch;
pub mod codec;
mod decoder;
pub mod layouts;
mod payload;
mod record;
mod registry;
mod source;

pub use batch::{BatchError, UplinkError, decode_source, decode_uplink, decode_uplinks_file};
pub use codec::DecodeError;
pub use decoder::{PayloadDecoder, decode, decode_device};
pub use layouts::{DeviceKind, FieldCodec, FieldSpec, Layout, Scale};
pub use payload::{PayloadError, Port, RawPayload};
pub use record::{DecodedRecord, FieldValue};
pub use registry::{DeviceRegistry, DeviceResolver, LayoutIds};
pub use source::{JsonLinesSource, SourceError, Uplink, UplinkEvent, UplinkSource};

/// Current report schema version.
pub const REPORT_VERSION: u32 = 1;
/// Default timestamp used when no uplink carries a receive time.
pub const DEFAULT_GENERATED_AT: &str = "1970-01-01T00:00:00Z";

/// Batch decoding report with deterministic ordering.
///
/// # Examples
/// ```
/// use loradec_core::make_stub_report;
///
/// let report = make_stub_report("uplinks.jsonl", 123);
/// assert_eq!(report.report_version, loradec_core::REPORT_VERSION);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Report schema version (not the binary version).
    pub report_version: u32,
    /// Tool identification metadata.
    pub tool: ToolInfo,
    /// RFC3339 timestamp of the latest uplink, or the default epoch.
    pub generated_at: String,
    /// Input file metadata.
    pub input: InputInfo,
    /// Counters and time bounds.
    pub summary: UplinkSummary,
    /// One entry per uplink line, in input order.
    pub uplinks: Vec<UplinkResult>,
}

/// Tool metadata embedded in reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    /// Tool name (e.g., "loradec").
    pub name: String,
    /// Tool version (semver).
    pub version: String,
}

/// Input file metadata embedded in reports.
///
/// # Examples
/// ```
/// use loradec_core::InputInfo;
///
/// let input = InputInfo {
///     path: "uplinks.jsonl".to_string(),
///     bytes: 1024,
/// };
/// assert_eq!(input.bytes, 1024);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputInfo {
    /// Input path as provided to the decoder.
    pub path: String,
    /// Input size in bytes.
    pub bytes: u64,
}

/// Batch counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UplinkSummary {
    /// Uplink lines seen (blank and comment lines excluded).
    pub uplinks_total: u64,
    /// Uplinks that produced a record.
    pub decoded: u64,
    /// Uplinks rejected for any reason.
    pub failed: u64,
    /// RFC3339 timestamp of the earliest uplink (if known).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_start: Option<String>,
    /// RFC3339 timestamp of the latest uplink (if known).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_end: Option<String>,
}

/// Outcome for one uplink line. Exactly one of `record` and `error` is set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UplinkResult {
    /// 1-based line number in the input.
    pub line: usize,
    /// Device as written in the uplink (absent when the line is not JSON).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    /// Layout the device resolved to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u8>,
    /// RFC3339 receive time, when provided.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<DecodedRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Build a stub report with base fields filled and no uplinks.
///
/// # Examples
/// ```
/// use loradec_core::make_stub_report;
///
/// let report = make_stub_report("uplinks.jsonl", 123);
/// assert!(report.uplinks.is_empty());
/// assert_eq!(report.summary.uplinks_total, 0);
/// ```
pub fn make_stub_report(input_path: &str, input_bytes: u64) -> Report {
    Report {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "loradec".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        generated_at: DEFAULT_GENERATED_AT.to_string(),
        input: InputInfo {
            path: input_path.to_string(),
            bytes: input_bytes,
        },
        summary: UplinkSummary::default(),
        uplinks: vec![],
    }
}
