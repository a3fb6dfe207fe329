use thiserror::Error;

/// Errors returned by payload reading and layout decoding.
///
/// # Examples
/// ```
/// use loradec_core::DecodeError;
///
/// let err = DecodeError::OutOfRange {
///     field: "celsius",
///     needed: 4,
///     actual: 2,
/// };
/// assert!(err.to_string().contains("celsius"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("payload too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },
    #[error("field `{field}` out of range: need {needed} bytes, got {actual}")]
    OutOfRange {
        field: &'static str,
        needed: usize,
        actual: usize,
    },
}
