//! Runtime-keyed resolution: a [`HostType`] chosen at run time instead of a
//! static Rust type.
//!
//! Every plan produces [`Value`]s carrying the requested type's variant and
//! reports the requested type as its target, so the null policy is that of
//! the requested type, not of the `Value` carrier.

use colview_result::Result;
use colview_types::{
    BitString, DateValue, DecimalValue, HostType, IntervalValue, MapValue, StructValue,
    TimeTzValue, TimeValue, TimestampValue, Value, ValueKind, VarInt,
};
use colview_vector::{ColumnDescriptor, compat};
use rust_decimal::Decimal;
use tracing::debug;

use crate::boxed;
use crate::converter::Converter;
use crate::host::HostValue;
use crate::{enums, list, maps};

/// Resolve a plan reading `column` as the runtime-described `target`.
pub fn resolve_dynamic(column: &ColumnDescriptor, target: &HostType) -> Result<Converter<Value>> {
    compat::check(column, target)?;
    let converter = dispatch(column, target)?;
    debug!(kind = %column.kind(), target = %target, "resolved runtime-keyed plan");
    Ok(converter)
}

fn lift<T: HostValue>(column: &ColumnDescriptor) -> Result<Converter<Value>> {
    Ok(T::resolve(column)?.map(|value| Ok(value.into_value())))
}

fn dispatch(column: &ColumnDescriptor, target: &HostType) -> Result<Converter<Value>> {
    use HostType as H;
    let converter = match target {
        H::Value => return boxed::resolve_boxed(column),
        H::Optional(inner) => dispatch(column, inner)?,
        H::Bool => lift::<bool>(column)?,
        H::I8 => lift::<i8>(column)?,
        H::I16 => lift::<i16>(column)?,
        H::I32 => lift::<i32>(column)?,
        H::I64 => lift::<i64>(column)?,
        H::I128 => lift::<i128>(column)?,
        H::U8 => lift::<u8>(column)?,
        H::U16 => lift::<u16>(column)?,
        H::U32 => lift::<u32>(column)?,
        H::U64 => lift::<u64>(column)?,
        H::U128 => lift::<u128>(column)?,
        H::F32 => lift::<f32>(column)?,
        H::F64 => lift::<f64>(column)?,
        H::String => lift::<String>(column)?,
        H::Date => lift::<time::Date>(column)?,
        H::Time => lift::<time::Time>(column)?,
        H::DateTime => lift::<time::PrimitiveDateTime>(column)?,
        H::OffsetDateTime => lift::<time::OffsetDateTime>(column)?,
        H::Duration => lift::<time::Duration>(column)?,
        H::DateValue => lift::<DateValue>(column)?,
        H::TimeValue => lift::<TimeValue>(column)?,
        H::TimeTzValue => lift::<TimeTzValue>(column)?,
        H::TimestampValue => lift::<TimestampValue>(column)?,
        H::IntervalValue => lift::<IntervalValue>(column)?,
        H::Decimal => lift::<Decimal>(column)?,
        H::DecimalValue => lift::<DecimalValue>(column)?,
        H::Uuid => lift::<uuid::Uuid>(column)?,
        H::BitString => lift::<BitString>(column)?,
        H::VarInt => lift::<VarInt>(column)?,
        H::Enum { name, members } => enums::resolve_dynamic(column, *name, members)?,
        H::List(element) if column.kind() == ValueKind::Blob && **element == H::U8 => {
            lift::<Vec<u8>>(column)?
        }
        H::FixedList(element) if column.kind() == ValueKind::Blob && **element == H::U8 => {
            lift::<Box<[u8]>>(column)?
        }
        H::List(element) | H::FixedList(element) => {
            let element = dispatch(&list::element_column(column, target)?, element)?;
            list::resolve_list(column, element, Value::List)?
        }
        H::Map(key, value) => {
            let (key_column, value_column) = maps::key_value_columns(column, target)?;
            maps::resolve_map(
                column,
                dispatch(&key_column, key)?,
                dispatch(&value_column, value)?,
                |pairs| Value::Map(MapValue(pairs)),
            )?
        }
        H::Struct => lift::<StructValue>(column)?,
        H::MapValue => lift::<MapValue>(column)?,
    };
    Ok(converter.retarget(target.clone(), target.is_nullable()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use colview_native::MemVector;
    use colview_result::Error;
    use colview_types::LogicalType;
    use colview_vector::Vector;

    fn vector(ty: impl Into<LogicalType>, values: &[Value]) -> Vector {
        let native = MemVector::from_values(ty.into(), values).unwrap().into_handle();
        Vector::from_native(native, values.len()).unwrap()
    }

    #[test]
    fn follows_requested_variant() {
        let v = vector(ValueKind::SmallInt, &[Value::SmallInt(-3)]);
        let conv = resolve_dynamic(v.column(), &HostType::I64).unwrap();
        assert_eq!(conv.target(), &HostType::I64);
        assert_eq!(conv.convert(&v, 0, true).unwrap(), Value::BigInt(-3));
    }

    #[test]
    fn null_policy_of_requested_type() {
        let v = vector(ValueKind::Integer, &[Value::Null]);
        let strict = resolve_dynamic(v.column(), &HostType::I32).unwrap();
        assert!(matches!(
            strict.convert(&v, 0, true),
            Err(Error::NullViolation { .. })
        ));
        let optional =
            resolve_dynamic(v.column(), &HostType::optional(HostType::I32)).unwrap();
        assert_eq!(optional.convert(&v, 0, true).unwrap(), Value::Null);
    }

    #[test]
    fn nested_lists_recurse() {
        let rows = [Value::List(vec![Value::TinyInt(1), Value::Null])];
        let v = vector(LogicalType::list(ValueKind::TinyInt), &rows);
        let target = HostType::list(HostType::optional(HostType::I32));
        let conv = resolve_dynamic(v.column(), &target).unwrap().prepare(&v).unwrap();
        assert_eq!(
            conv.convert(&v, 0, true).unwrap(),
            Value::List(vec![Value::Integer(1), Value::Null])
        );

        let strict = resolve_dynamic(v.column(), &HostType::list(HostType::I32))
            .unwrap()
            .prepare(&v)
            .unwrap();
        assert!(matches!(
            strict.convert(&v, 0, true),
            Err(Error::NullViolation { index: 1, .. })
        ));
    }

    #[test]
    fn rejects_incompatible_targets() {
        let v = vector(ValueKind::Integer, &[Value::Integer(1)]);
        assert!(matches!(
            resolve_dynamic(v.column(), &HostType::F64),
            Err(Error::TypeMismatch { .. })
        ));
        assert!(matches!(
            resolve_dynamic(v.column(), &HostType::list(HostType::I32)),
            Err(Error::TypeMismatch { .. })
        ));
    }
}
