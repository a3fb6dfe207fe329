//! Byte-level primitives shared by every layout.
//!
//! - `reader`: bounds-checked access and big-endian word assembly
//! - `semifloat`: the signed 16-bit semi-float codec
//! - `error`: decode failures
//!
//! Nothing here knows about devices or field names; layouts build on top.

pub mod error;
pub mod reader;
pub mod semifloat;

pub use error::DecodeError;
pub use reader::{PayloadReader, assemble};
pub use semifloat::{decode_semi_float, decode_semi_float_bits, encode_semi_float};
