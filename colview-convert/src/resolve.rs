//! Statically typed resolution entry point.

use colview_result::Result;
use colview_vector::{ColumnDescriptor, compat};
use tracing::debug;

use crate::converter::Converter;
use crate::host::HostValue;

/// Resolve the converter plan reading `column` as `T`.
///
/// A pure function of the descriptor and `T`: the compatibility check runs
/// first and a rejected pair fails with
/// [`Error::TypeMismatch`](colview_result::Error::TypeMismatch) before any
/// reader is built. The returned plan may still need
/// [`Converter::bind_to_vector`] (or [`Converter::prepare`]) for composites.
pub fn resolve<T: HostValue>(column: &ColumnDescriptor) -> Result<Converter<T>> {
    let target = T::host_type();
    compat::check(column, &target)?;
    let converter = T::resolve(column)?;
    debug_assert_eq!(converter.target(), &target);
    debug!(
        kind = %column.kind(),
        storage = %column.storage(),
        target = %target,
        bound = converter.is_bound(),
        "resolved converter plan"
    );
    Ok(converter)
}
