//! Layout-driven uplink decoding.
//!
//! Every field range is validated before anything is decoded, so a payload
//! either yields a complete record or an error naming the first field that
//! does not fit. The port travels with the payload but does not select the
//! layout; callers pick the layout from the device identity.

use crate::codec::error::DecodeError;
use crate::codec::reader::PayloadReader;
use crate::codec::semifloat::decode_semi_float;
use crate::layouts::{DeviceKind, FieldCodec, FieldSpec, Layout};
use crate::payload::Port;
use crate::record::{DecodedRecord, FieldValue};

/// Anything that can turn an uplink payload into a record.
pub trait PayloadDecoder {
    fn decode(&self, payload: &[u8], port: Port) -> Result<DecodedRecord, DecodeError>;
}

impl PayloadDecoder for Layout {
    fn decode(&self, payload: &[u8], port: Port) -> Result<DecodedRecord, DecodeError> {
        decode(self, payload, port)
    }
}

impl PayloadDecoder for DeviceKind {
    fn decode(&self, payload: &[u8], port: Port) -> Result<DecodedRecord, DecodeError> {
        decode(self.layout(), payload, port)
    }
}

/// Decode `payload` with `layout`.
///
/// # Examples
/// ```
/// use loradec_core::{Port, decode, layouts::tables};
///
/// let record = decode(&tables::CPU_LOAD, &[0x00, 0x32], Port(1)).unwrap();
/// assert_eq!(record.get_f64("CPU_Load"), Some(0.5));
/// ```
///
/// # Errors
/// Returns `DecodeError::OutOfRange` when the payload is shorter than a field
/// requires.
pub fn decode(layout: &Layout, payload: &[u8], _port: Port) -> Result<DecodedRecord, DecodeError> {
    let reader = PayloadReader::new(payload);
    for field in layout.fields {
        check_range(&reader, field)?;
    }

    let mut record = DecodedRecord::with_capacity(layout.fields.len());
    for field in layout.fields {
        let value = decode_field(&reader, field)?;
        record.insert(field.name, value);
    }
    Ok(record)
}

/// Decode `payload` with the layout of `kind`.
pub fn decode_device(
    kind: DeviceKind,
    payload: &[u8],
    port: Port,
) -> Result<DecodedRecord, DecodeError> {
    decode(kind.layout(), payload, port)
}

fn check_range(reader: &PayloadReader<'_>, field: &FieldSpec) -> Result<(), DecodeError> {
    let needed = field.range().end;
    reader
        .require_len(needed)
        .map_err(|_| DecodeError::OutOfRange {
            field: field.name,
            needed,
            actual: reader.len(),
        })
}

fn decode_field(reader: &PayloadReader<'_>, field: &FieldSpec) -> Result<FieldValue, DecodeError> {
    let value = match field.codec {
        FieldCodec::RawByte => FieldValue::Unsigned(u64::from(reader.read_u8(field.offset)?)),
        FieldCodec::RawScaled(scale) => {
            let raw = reader.read_u16_be(field.offset)?;
            FieldValue::Float(scale.apply(f64::from(raw)))
        }
        FieldCodec::SemiFloat(scale) => {
            let raw = reader.read_u16_be(field.offset)?;
            FieldValue::Float(scale.apply(decode_semi_float(raw)))
        }
    };
    Ok(value)
}
