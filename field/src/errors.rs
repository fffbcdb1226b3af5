use thiserror::Error;

/// Errors raised by field, vector, matrix and polynomial operations.
///
/// All of these are reported synchronously and none are retried or recovered
/// from internally; a failed operation produces no partial results.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FieldError {
    /// An argument lies outside the operation's domain of definition, e.g.
    /// `exp(0, 0)` or division by the zero polynomial.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Operands that must agree in shape do not.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// An evaluation or interpolation domain is not a power of two, or the
    /// polynomial does not fit in it.
    #[error("invalid domain: {0}")]
    InvalidDomain(String),

    /// A raw value does not fit the 128-bit element representation.
    #[error("out of range: {0}")]
    OutOfRange(String),

    /// An exhaustive search ended without a hit.
    #[error("not found: {0}")]
    NotFound(String),
}

pub type Result<T> = core::result::Result<T, FieldError>;
