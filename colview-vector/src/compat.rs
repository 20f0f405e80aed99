//! Which host types each column kind can be read as.
//!
//! The table is the single authority for resolution: a converter is only ever
//! built for a (kind, host type) pair accepted here, and every rejection is a
//! [`Error::TypeMismatch`] naming both sides.

use colview_result::{Error, Result};
use colview_types::{HostType, StorageKind, ValueKind};

use crate::descriptor::ColumnDescriptor;

/// Canonical host type of a kind; what a `Value` read produces.
///
/// The canonical type never depends on the storage kind: ENUM reads as the
/// member name and DECIMAL as a decimal whatever their slot width.
pub fn default_type(kind: ValueKind, _storage: StorageKind) -> Option<HostType> {
    let ty = match kind {
        ValueKind::Boolean => HostType::Bool,
        ValueKind::TinyInt => HostType::I8,
        ValueKind::SmallInt => HostType::I16,
        ValueKind::Integer => HostType::I32,
        ValueKind::BigInt => HostType::I64,
        ValueKind::HugeInt => HostType::I128,
        ValueKind::UTinyInt => HostType::U8,
        ValueKind::USmallInt => HostType::U16,
        ValueKind::UInteger => HostType::U32,
        ValueKind::UBigInt => HostType::U64,
        ValueKind::UHugeInt => HostType::U128,
        ValueKind::Float => HostType::F32,
        ValueKind::Double => HostType::F64,
        ValueKind::Decimal => HostType::Decimal,
        ValueKind::Date => HostType::Date,
        ValueKind::Time => HostType::Time,
        ValueKind::TimeTz => HostType::TimeTzValue,
        ValueKind::Timestamp
        | ValueKind::TimestampS
        | ValueKind::TimestampMs
        | ValueKind::TimestampNs => HostType::DateTime,
        ValueKind::TimestampTz => HostType::OffsetDateTime,
        ValueKind::Interval => HostType::IntervalValue,
        ValueKind::Varchar => HostType::String,
        ValueKind::Blob => HostType::bytes(),
        ValueKind::Bit => HostType::BitString,
        ValueKind::VarInt => HostType::VarInt,
        ValueKind::Uuid => HostType::Uuid,
        ValueKind::Enum => HostType::String,
        ValueKind::List | ValueKind::Array => HostType::list(HostType::Value),
        ValueKind::Struct => HostType::Struct,
        ValueKind::Map => HostType::MapValue,
        ValueKind::Union | ValueKind::SqlNull => HostType::Value,
        ValueKind::Invalid | ValueKind::Any => return None,
    };
    Some(ty)
}

fn is_integer(ty: &HostType) -> bool {
    use HostType::*;
    matches!(ty, I8 | I16 | I32 | I64 | I128 | U8 | U16 | U32 | U64 | U128)
}

/// Whether values of `kind` can be read as `target`.
///
/// Only the outer shape of container targets is checked here; element types
/// are checked against child descriptors by [`check`].
pub fn compatible(kind: ValueKind, storage: StorageKind, target: &HostType) -> bool {
    use HostType as H;
    use ValueKind as K;
    match (kind, target) {
        (K::Invalid | K::Any, _) => false,
        (_, H::Value) => true,
        (_, H::Optional(inner)) => compatible(kind, storage, inner),
        (K::Boolean, H::Bool) => true,
        (K::TinyInt, H::I8 | H::I16 | H::I32 | H::I64 | H::I128) => true,
        (K::SmallInt, H::I16 | H::I32 | H::I64 | H::I128) => true,
        (K::Integer, H::I32 | H::I64 | H::I128) => true,
        (K::BigInt, H::I64 | H::I128) => true,
        (K::HugeInt, H::I128) => true,
        (K::UTinyInt, H::U8 | H::U16 | H::U32 | H::U64 | H::U128) => true,
        (K::UTinyInt, H::I16 | H::I32 | H::I64 | H::I128) => true,
        (K::USmallInt, H::U16 | H::U32 | H::U64 | H::U128) => true,
        (K::USmallInt, H::I32 | H::I64 | H::I128) => true,
        (K::UInteger, H::U32 | H::U64 | H::U128 | H::I64 | H::I128) => true,
        (K::UBigInt, H::U64 | H::U128 | H::I128) => true,
        (K::UHugeInt, H::U128) => true,
        (K::Float, H::F32 | H::F64) => true,
        (K::Double, H::F64) => true,
        (K::Decimal, H::Decimal | H::DecimalValue | H::F64) => true,
        (K::Date, H::Date | H::DateTime | H::DateValue) => true,
        (K::Time, H::Time | H::TimeValue) => true,
        (K::TimeTz, H::TimeTzValue) => true,
        (K::Timestamp | K::TimestampS | K::TimestampMs | K::TimestampNs, t)
        | (K::TimestampTz, t) => matches!(
            t,
            H::DateTime | H::OffsetDateTime | H::TimestampValue
        ),
        (K::Interval, H::IntervalValue | H::Duration) => true,
        (K::Varchar, H::String) => true,
        (K::Blob, H::List(element) | H::FixedList(element)) => **element == H::U8,
        (K::Bit, H::BitString | H::String) => true,
        (K::VarInt, H::VarInt | H::String) => true,
        (K::Uuid, H::Uuid) => true,
        (K::Enum, H::String | H::Enum { .. }) => true,
        (K::Enum, t) if is_integer(t) => compatible(storage, storage, t),
        (K::List | K::Array, H::List(_) | H::FixedList(_)) => true,
        (K::Struct, H::Struct) => true,
        (K::Map, H::MapValue | H::Map(_, _)) => true,
        _ => false,
    }
}

/// Check `target` against a column, element types of containers included.
pub fn check(column: &ColumnDescriptor, target: &HostType) -> Result<()> {
    if accepts(column, target) {
        Ok(())
    } else {
        Err(mismatch(column, target))
    }
}

fn accepts(column: &ColumnDescriptor, target: &HostType) -> bool {
    if !compatible(column.kind(), column.storage(), target) {
        return false;
    }
    match (column.kind(), target) {
        (_, HostType::Value) => true,
        (_, HostType::Optional(inner)) => accepts(column, inner),
        (ValueKind::List | ValueKind::Array, HostType::List(element))
        | (ValueKind::List | ValueKind::Array, HostType::FixedList(element)) => column
            .child()
            .map(|child| accepts(&child, element))
            .unwrap_or(false),
        (ValueKind::Map, HostType::Map(key, value)) => column
            .map_key_value()
            .map(|(k, v)| accepts(&k, key) && accepts(&v, value))
            .unwrap_or(false),
        _ => true,
    }
}

/// The error for reading `column` as `target`.
pub fn mismatch(column: &ColumnDescriptor, target: &HostType) -> Error {
    Error::TypeMismatch {
        declared: column.kind().name(),
        storage: column.storage().name(),
        requested: target.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use colview_types::LogicalType;

    fn column(ty: impl Into<LogicalType>) -> ColumnDescriptor {
        ColumnDescriptor::from_logical_type(ty.into()).unwrap()
    }

    #[test]
    fn integer_widening_only() {
        let int = column(ValueKind::Integer);
        assert!(check(&int, &HostType::I32).is_ok());
        assert!(check(&int, &HostType::I64).is_ok());
        assert!(check(&int, &HostType::I16).is_err());
        assert!(check(&int, &HostType::U32).is_err());
        let err = check(&int, &HostType::F64).unwrap_err();
        assert!(matches!(
            err,
            Error::TypeMismatch { declared: "INTEGER", ref requested, .. } if requested == "f64"
        ));
    }

    #[test]
    fn unsigned_to_wider_signed() {
        let u = column(ValueKind::UInteger);
        assert!(check(&u, &HostType::I64).is_ok());
        assert!(check(&u, &HostType::I32).is_err());
    }

    #[test]
    fn value_and_optional_everywhere() {
        for kind in [ValueKind::Boolean, ValueKind::Varchar, ValueKind::Uuid] {
            let c = column(kind);
            assert!(check(&c, &HostType::Value).is_ok());
            let canonical = c.default_host_type().unwrap();
            assert!(check(&c, &HostType::optional(canonical)).is_ok());
        }
    }

    #[test]
    fn list_elements_checked_recursively() {
        let list = column(LogicalType::list(ValueKind::Integer));
        assert!(check(&list, &HostType::list(HostType::I64)).is_ok());
        assert!(check(&list, &HostType::fixed_list(HostType::optional(HostType::I32))).is_ok());
        assert!(check(&list, &HostType::list(HostType::String)).is_err());
    }

    #[test]
    fn enum_storage_integers() {
        let e = column(LogicalType::enumeration(["A", "B"]));
        assert!(check(&e, &HostType::String).is_ok());
        assert!(check(&e, &HostType::U8).is_ok());
        assert!(check(&e, &HostType::U32).is_ok());
        assert!(check(&e, &HostType::I8).is_err());
        let mismatch = check(&e, &HostType::F32).unwrap_err();
        assert!(matches!(mismatch, Error::TypeMismatch { storage: "UTINYINT", .. }));
    }

    #[test]
    fn blob_as_bytes() {
        let blob = column(ValueKind::Blob);
        assert!(check(&blob, &HostType::bytes()).is_ok());
        assert!(check(&blob, &HostType::fixed_list(HostType::U8)).is_ok());
        assert!(check(&blob, &HostType::list(HostType::I8)).is_err());
    }

    #[test]
    fn map_key_value_checked() {
        let map = column(LogicalType::map(ValueKind::Varchar, ValueKind::Integer));
        assert!(check(&map, &HostType::map(HostType::String, HostType::I64)).is_ok());
        assert!(check(&map, &HostType::map(HostType::I32, HostType::I64)).is_err());
        assert!(check(&map, &HostType::MapValue).is_ok());
    }
}
