//! Boxed reads: every kind as its canonical host type wrapped in [`Value`].
//!
//! Leaf kinds get dedicated read functions that box directly; composites box
//! their elements recursively.

use colview_result::Result;
use colview_types::{MapValue, StructValue, Value, ValueKind};
use colview_vector::{ColumnDescriptor, Vector, compat};

use crate::converter::{Converter, ReadFn};
use crate::host::HostValue;
use crate::primitive::{read_bool_boxed, read_boxed};
use crate::{decimal, enums, list, temporal, text, unions};

unsafe fn read_null(_vector: &Vector, _index: usize) -> Result<Value> {
    Ok(Value::Null)
}

/// Plan reading `column` as its canonical type, boxed.
pub fn resolve_boxed(column: &ColumnDescriptor) -> Result<Converter<Value>> {
    let read: ReadFn<Value> = match column.kind() {
        ValueKind::Boolean => read_bool_boxed,
        ValueKind::TinyInt => read_boxed::<i8>,
        ValueKind::SmallInt => read_boxed::<i16>,
        ValueKind::Integer => read_boxed::<i32>,
        ValueKind::BigInt => read_boxed::<i64>,
        ValueKind::HugeInt => read_boxed::<i128>,
        ValueKind::UTinyInt => read_boxed::<u8>,
        ValueKind::USmallInt => read_boxed::<u16>,
        ValueKind::UInteger => read_boxed::<u32>,
        ValueKind::UBigInt => read_boxed::<u64>,
        ValueKind::UHugeInt => read_boxed::<u128>,
        ValueKind::Float => read_boxed::<f32>,
        ValueKind::Double => read_boxed::<f64>,
        ValueKind::Decimal => decimal::boxed_reader(column)?,
        ValueKind::Date => temporal::read_date_boxed,
        ValueKind::Time => temporal::read_time_boxed,
        ValueKind::TimeTz => temporal::read_time_tz_boxed,
        ValueKind::Timestamp
        | ValueKind::TimestampS
        | ValueKind::TimestampMs
        | ValueKind::TimestampNs
        | ValueKind::TimestampTz => temporal::read_timestamp_boxed,
        ValueKind::Interval => temporal::read_interval_boxed,
        kind @ (ValueKind::Varchar
        | ValueKind::Blob
        | ValueKind::Bit
        | ValueKind::VarInt
        | ValueKind::Uuid) => match text::boxed_reader(kind) {
            Some(read) => read,
            None => return Err(compat::mismatch(column, &Value::host_type())),
        },
        ValueKind::SqlNull => read_null,
        ValueKind::Enum => return enums::resolve_boxed(column),
        ValueKind::List | ValueKind::Array => {
            let element = resolve_boxed(&column.child()?)?;
            return list::resolve_list(column, element, Value::List);
        }
        ValueKind::Struct => {
            return Ok(StructValue::resolve(column)?.map(|s| Ok(Value::Struct(s))));
        }
        ValueKind::Map => return Ok(MapValue::resolve(column)?.map(|m| Ok(Value::Map(m)))),
        ValueKind::Union => return unions::resolve_union(column),
        ValueKind::Invalid | ValueKind::Any => {
            return Err(compat::mismatch(column, &Value::host_type()));
        }
    };
    Ok(Converter::stateless(column, read))
}

#[cfg(test)]
mod tests {
    use super::*;
    use colview_native::MemVector;
    use colview_types::{DateValue, LogicalType, TimestampValue};
    use rust_decimal::Decimal;

    fn vector(ty: impl Into<LogicalType>, values: &[Value]) -> Vector {
        let native = MemVector::from_values(ty.into(), values).unwrap().into_handle();
        Vector::from_native(native, values.len()).unwrap()
    }

    #[test]
    fn canonical_leaves() {
        let v = vector(ValueKind::USmallInt, &[Value::USmallInt(7), Value::Null]);
        let conv = resolve_boxed(v.column()).unwrap();
        assert!(conv.default_is_invalid());
        assert_eq!(conv.convert(&v, 0, true).unwrap(), Value::USmallInt(7));
        assert_eq!(conv.convert(&v, 1, true).unwrap(), Value::Null);
    }

    #[test]
    fn decimals_fall_back_to_raw() {
        let ty = LogicalType::decimal(38, 2).unwrap();
        let big = i128::MAX / 7;
        let v = vector(
            ty,
            &[
                Value::RawDecimal(colview_types::DecimalValue::new(12345, 2)),
                Value::RawDecimal(colview_types::DecimalValue::new(big, 2)),
            ],
        );
        let conv = resolve_boxed(v.column()).unwrap();
        assert_eq!(
            conv.convert(&v, 0, true).unwrap(),
            Value::Decimal(Decimal::new(12345, 2))
        );
        assert!(matches!(
            conv.convert(&v, 1, true).unwrap(),
            Value::RawDecimal(d) if d.value == big
        ));
    }

    #[test]
    fn infinities_stay_raw() {
        let dates = vector(
            ValueKind::Date,
            &[Value::RawDate(DateValue::POSITIVE_INFINITY)],
        );
        let conv = resolve_boxed(dates.column()).unwrap();
        assert_eq!(
            conv.convert(&dates, 0, true).unwrap(),
            Value::RawDate(DateValue::POSITIVE_INFINITY)
        );

        let stamps = vector(
            ValueKind::TimestampMs,
            &[Value::RawTimestamp(TimestampValue::NEGATIVE_INFINITY)],
        );
        let conv = resolve_boxed(stamps.column()).unwrap();
        assert_eq!(
            conv.convert(&stamps, 0, true).unwrap(),
            Value::RawTimestamp(TimestampValue::NEGATIVE_INFINITY)
        );
    }

    #[test]
    fn sql_null_reads_null() {
        let native = MemVector::nulls(2).into_handle();
        let v = Vector::from_native(native, 2).unwrap();
        let conv = resolve_boxed(v.column()).unwrap();
        assert_eq!(conv.convert(&v, 1, true).unwrap(), Value::Null);
    }
}
