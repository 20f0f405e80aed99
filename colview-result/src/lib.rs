//! Error types and result definitions for colview.
//!
//! Every colview crate returns [`Result<T>`] and reports failures through the
//! single [`Error`] enum, so errors cross crate boundaries with `?` and callers
//! can match on specific variants.
//!
//! # Error Categories
//!
//! - **Schema errors** ([`Error::TypeMismatch`]): the requested host type cannot
//!   be read from the column's declared/storage kind. Raised when a converter is
//!   resolved, before any row is read.
//! - **Data errors** ([`Error::NullViolation`], [`Error::DomainMismatch`]): a
//!   required element is missing, or a stored value has no representation in the
//!   target (enum name absent from the host enum, infinite date, ...).
//! - **Usage errors** ([`Error::IndexOutOfRange`], [`Error::AlreadyBound`],
//!   [`Error::NotBound`], [`Error::UnknownColumn`],
//!   [`Error::InvalidArgumentError`]).
//! - **Engine errors** ([`Error::Native`]): a native call failed or returned
//!   malformed memory. These are not retried.
//! - **Bridge errors** ([`Error::Arrow`]) and **internal errors**
//!   ([`Error::Internal`]).

pub mod error;
pub mod result;

pub use error::Error;
pub use result::Result;
