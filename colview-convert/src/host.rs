use colview_result::Result;
use colview_types::{HostType, Value};
use colview_vector::ColumnDescriptor;

use crate::boxed;
use crate::converter::Converter;

/// A Rust type that column elements can be read into.
///
/// Implemented for the primitives, `String`, the `time`, `rust_decimal` and
/// `uuid` types, the leaf value types, `Vec<T>`, `Box<[T]>`, `HashMap<K, V>`,
/// [`StructValue`](colview_types::StructValue),
/// [`MapValue`](colview_types::MapValue), `Option<T>`, [`Value`] and host
/// enums declared with [`host_enum!`](crate::host_enum).
pub trait HostValue: Sized + Send + Sync + 'static {
    /// Whether the type has its own value for "missing" (`None`, `Null`).
    const REPRESENTS_MISSING: bool = false;

    fn host_type() -> HostType;

    /// Build the converter plan for `column`.
    ///
    /// Called after the compatibility check; implementations still reject
    /// kinds they cannot read with [`Error::TypeMismatch`](colview_result::Error).
    fn resolve(column: &ColumnDescriptor) -> Result<Converter<Self>>;

    /// The value a missing element reads as when nulls are tolerated.
    fn missing() -> Self;

    fn into_value(self) -> Value;

    /// Plan for `Option<Self>`. Types with a cheaper direct read override it.
    fn resolve_optional(column: &ColumnDescriptor) -> Result<Converter<Option<Self>>> {
        Ok(Self::resolve(column)?.map(|value| Ok(Some(value))))
    }
}

impl<T: HostValue> HostValue for Option<T> {
    const REPRESENTS_MISSING: bool = true;

    fn host_type() -> HostType {
        HostType::optional(T::host_type())
    }

    fn resolve(column: &ColumnDescriptor) -> Result<Converter<Self>> {
        T::resolve_optional(column)
    }

    fn missing() -> Self {
        None
    }

    fn into_value(self) -> Value {
        self.map_or(Value::Null, HostValue::into_value)
    }
}

impl HostValue for Value {
    const REPRESENTS_MISSING: bool = true;

    fn host_type() -> HostType {
        HostType::Value
    }

    fn resolve(column: &ColumnDescriptor) -> Result<Converter<Self>> {
        boxed::resolve_boxed(column)
    }

    fn missing() -> Self {
        Value::Null
    }

    fn into_value(self) -> Value {
        self
    }
}
