//! Validated input types for the decode boundary.
//!
//! Webhooks and uplink files hand over payloads as integer arrays or hex
//! strings. Both are checked here and rejected outright, never truncated,
//! before any layout sees them.

use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Malformed input at the decode boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("byte {index} out of range: {value} (expected 0..=255)")]
    ByteOutOfRange { index: usize, value: i64 },
    #[error("port out of range: {value} (expected 0..=255)")]
    PortOutOfRange { value: i64 },
    #[error("invalid hex payload: {0}")]
    InvalidHex(String),
    #[error("unknown device '{0}'")]
    UnknownDevice(String),
    #[error("expected exactly one of `bytes` or `payload`")]
    PayloadFields,
    #[error("received_at out of range: {0}")]
    ReceivedAtOutOfRange(String),
}

/// Raw uplink payload bytes.
///
/// # Examples
/// ```
/// use loradec_core::RawPayload;
///
/// let payload = RawPayload::from_hex("07 0960 0960").unwrap();
/// assert_eq!(payload.as_bytes(), &[0x07, 0x09, 0x60, 0x09, 0x60]);
/// assert!(RawPayload::from_ints([1, 256]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawPayload(Vec<u8>);

impl RawPayload {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Build a payload from untrusted integers, rejecting anything outside a byte.
    ///
    /// # Errors
    /// Returns `PayloadError::ByteOutOfRange` for the first offending value.
    pub fn from_ints<I>(values: I) -> Result<Self, PayloadError>
    where
        I: IntoIterator<Item = i64>,
    {
        values
            .into_iter()
            .enumerate()
            .map(|(index, value)| {
                u8::try_from(value).map_err(|_| PayloadError::ByteOutOfRange { index, value })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    /// Parse a hex string; whitespace and a leading `0x` are ignored.
    ///
    /// # Errors
    /// Returns `PayloadError::InvalidHex` for odd lengths or non-hex digits.
    pub fn from_hex(input: &str) -> Result<Self, PayloadError> {
        let trimmed = input.trim();
        let trimmed = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        let compact: String = trimmed.chars().filter(|c| !c.is_whitespace()).collect();
        hex::decode(&compact)
            .map(Self)
            .map_err(|err| PayloadError::InvalidHex(err.to_string()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl Deref for RawPayload {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for RawPayload {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for RawPayload {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

/// LoRaWAN application port (`FPort`) of an uplink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Port(pub u8);

impl Port {
    /// # Errors
    /// Returns `PayloadError::PortOutOfRange` outside 0..=255.
    pub fn from_int(value: i64) -> Result<Self, PayloadError> {
        u8::try_from(value)
            .map(Port)
            .map_err(|_| PayloadError::PortOutOfRange { value })
    }
}

impl From<u8> for Port {
    fn from(value: u8) -> Self {
        Port(value)
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
