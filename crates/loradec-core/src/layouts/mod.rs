//! Declarative device layouts.
//!
//! A layout is plain data: an ordered list of fields, each with a byte
//! offset and a codec. The decoder walks the list; supporting a new device
//! means adding a table in `tables` and a `DeviceKind` variant.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::payload::PayloadError;

pub mod tables;

/// Scale applied to a raw or semi-float reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scale {
    Mul(f64),
    Div(f64),
}

impl Scale {
    pub fn apply(self, value: f64) -> f64 {
        match self {
            Scale::Mul(factor) => value * factor,
            Scale::Div(divisor) => value / divisor,
        }
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scale::Mul(factor) => write!(f, "*{factor}"),
            Scale::Div(divisor) => write!(f, "/{divisor}"),
        }
    }
}

/// How a field's bytes turn into a value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldCodec {
    /// Unsigned big-endian word, scaled.
    RawScaled(Scale),
    /// Big-endian semi-float word, scaled after decoding.
    SemiFloat(Scale),
    /// Single unsigned byte, unscaled.
    RawByte,
}

impl FieldCodec {
    pub const fn width(&self) -> usize {
        match self {
            FieldCodec::RawScaled(_) | FieldCodec::SemiFloat(_) => 2,
            FieldCodec::RawByte => 1,
        }
    }
}

impl fmt::Display for FieldCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldCodec::RawScaled(scale) => write!(f, "u16be{scale}"),
            FieldCodec::SemiFloat(scale) => write!(f, "sflt16{scale}"),
            FieldCodec::RawByte => write!(f, "u8"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub offset: usize,
    pub codec: FieldCodec,
}

impl FieldSpec {
    /// Byte range occupied by the field.
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset.saturating_add(self.codec.width())
    }
}

/// Ordered field table for one device payload format.
#[derive(Debug, PartialEq)]
pub struct Layout {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

impl Layout {
    /// Smallest payload length that covers every field.
    pub fn min_len(&self) -> usize {
        self.fields
            .iter()
            .map(|field| field.range().end)
            .max()
            .unwrap_or(0)
    }
}

/// Device types with a known layout.
///
/// # Examples
/// ```
/// use loradec_core::DeviceKind;
///
/// let kind: DeviceKind = "bme280".parse().unwrap();
/// assert_eq!(kind, DeviceKind::Bme280);
/// assert_eq!(kind.layout().min_len(), 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum DeviceKind {
    #[serde(rename = "dht22")]
    Dht22,
    #[serde(rename = "dht22-semifloat")]
    Dht22SemiFloat,
    #[serde(rename = "bme280")]
    Bme280,
    #[serde(rename = "cpu-load")]
    CpuLoad,
}

impl DeviceKind {
    pub const ALL: [DeviceKind; 4] = [
        DeviceKind::Dht22,
        DeviceKind::Dht22SemiFloat,
        DeviceKind::Bme280,
        DeviceKind::CpuLoad,
    ];

    pub fn layout(self) -> &'static Layout {
        match self {
            DeviceKind::Dht22 => &tables::DHT22,
            DeviceKind::Dht22SemiFloat => &tables::DHT22_SEMI_FLOAT,
            DeviceKind::Bme280 => &tables::BME280,
            DeviceKind::CpuLoad => &tables::CPU_LOAD,
        }
    }

    /// Stable identifier, identical to the layout name.
    pub fn id(self) -> &'static str {
        self.layout().name
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for DeviceKind {
    type Err = PayloadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        DeviceKind::ALL
            .into_iter()
            .find(|kind| kind.id() == wanted)
            .ok_or_else(|| PayloadError::UnknownDevice(s.to_string()))
    }
}

impl TryFrom<String> for DeviceKind {
    type Error = PayloadError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
