use std::fmt;
use thiserror::Error;

/// Unified error type for all colview operations.
///
/// Variants carry structured detail (kinds, indices, codes, names) so a failure
/// is actionable without re-running with extra logging.
///
/// # Thread Safety
///
/// `Error` implements `Send` and `Sync`, so it can be returned from readers
/// running on any thread.
#[derive(Error, Debug)]
pub enum Error {
    /// The requested host type cannot be read from the column.
    ///
    /// Raised at converter resolution time, before any element is read.
    /// `declared` is the column's logical kind and `storage` its physical slot
    /// kind (they differ for ENUM and DECIMAL columns). Values are never
    /// coerced silently into an incompatible type.
    #[error("cannot read {declared} column (stored as {storage}) as {requested}")]
    TypeMismatch {
        declared: &'static str,
        storage: &'static str,
        requested: String,
    },

    /// A required read hit a missing element.
    ///
    /// Raised by `get`-style reads, and by composite readers for null elements
    /// inside lists or maps, when the target type has no way to represent
    /// "absent". Use an `Option<T>` target or a default-returning read to accept
    /// missing values.
    #[error("element {index} is null but {target} cannot represent a missing value")]
    NullViolation { index: usize, target: String },

    /// Row or element index outside `[0, len)`.
    #[error("index {index} out of range for vector of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// A native engine call failed or handed back malformed memory.
    ///
    /// These indicate an engine bug or resource exhaustion and are not retried.
    #[error("native call failed: {0}")]
    Native(String),

    /// Stored data does not fit the target's value domain.
    ///
    /// Examples: an enum code with no dictionary entry, an enum name that the
    /// host enumeration lacks, an infinite date read as a calendar date.
    #[error("value does not match the expected domain: {0}")]
    DomainMismatch(String),

    /// A converter that already carries vector state was bound again.
    #[error("converter for {target} is already bound to a vector")]
    AlreadyBound { target: String },

    /// A converter that still needs vector state was invoked.
    #[error("converter for {target} must be bound to a vector before use")]
    NotBound { target: String },

    /// Column lookup by name failed.
    #[error("unknown column: {0}")]
    UnknownColumn(String),

    /// Invalid argument passed to a colview API.
    #[error("Invalid argument: {0}")]
    InvalidArgumentError(String),

    /// Arrow error raised while bridging Arrow data into chunks.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Violated internal invariant. Indicates a bug in colview.
    #[error("An internal operation failed: {0}")]
    Internal(String),
}

impl Error {
    /// Create a native-call error from any displayable error.
    #[inline]
    pub fn native<E: fmt::Display>(err: E) -> Self {
        Error::Native(err.to_string())
    }

    /// Create a domain mismatch error from any displayable error.
    ///
    /// # Examples
    ///
    /// ```
    /// use colview_result::Error;
    ///
    /// let err = Error::domain("enum code 7 has no dictionary entry");
    /// assert!(matches!(err, Error::DomainMismatch(msg) if msg.contains("code 7")));
    /// ```
    #[inline]
    pub fn domain<E: fmt::Display>(err: E) -> Self {
        Error::DomainMismatch(err.to_string())
    }

    /// Create a null violation for `index` reading into `target`.
    #[inline]
    pub fn null_violation(index: usize, target: impl fmt::Display) -> Self {
        Error::NullViolation {
            index,
            target: target.to_string(),
        }
    }
}
