use thiserror::Error;

use crate::domain::PrimitiveId;

/// Structural problems in an engine payload. A decode error rejects the whole
/// payload; callers keep whatever geometry they already had.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("net '{net}' primitive {primitive}: point {index} has {arity} coordinates, expected 2")]
    MalformedPoint {
        net: String,
        primitive: PrimitiveId,
        index: usize,
        arity: usize,
    },
    #[error("net '{net}' primitive {primitive}: point {index} has a non-finite coordinate")]
    NonFiniteCoordinate {
        net: String,
        primitive: PrimitiveId,
        index: usize,
    },
    #[error("net '{net}' lists primitive {primitive} more than once")]
    DuplicatePrimitiveId { net: String, primitive: PrimitiveId },
    #[error("stats for primitive {primitive}: s has {s_len} samples but w_s has {w_len}")]
    StatsLengthMismatch {
        primitive: PrimitiveId,
        s_len: usize,
        w_len: usize,
    },
}

/// Rejected operator input for a settings field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsInputError {
    #[error("unknown settings field '{0}'")]
    UnknownField(String),
    #[error("expected key=value, got '{0}'")]
    MissingValue(String),
    #[error("'{value}' is not a valid value for {field}")]
    InvalidValue { field: &'static str, value: String },
}
