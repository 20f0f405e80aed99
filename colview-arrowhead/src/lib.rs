//! Arrow -> colview bridge.
//!
//! Builds in-memory native vectors, chunks and results from Arrow arrays and
//! record batches so Arrow data can be read through the typed chunk readers.
//!
//!   - Fixed-width primitives whose Arrow layout equals the slot layout are
//!     copied as raw slot bytes.
//!   - Everything else goes through [`Value`]s and the native encoder.
//!   - Dictionary-encoded string columns become ENUM columns whose dictionary
//!     is the Arrow dictionary.

#![forbid(unsafe_code)]

use std::sync::Arc;

use arrow::array::{Array, AsArray, GenericListArray, OffsetSizeTrait};
use arrow::compute::cast;
use arrow::datatypes::{
    ArrowPrimitiveType, DataType, Date32Type, Decimal128Type, Float32Type, Float64Type, Int8Type,
    Int16Type, Int32Type, Int64Type, IntervalMonthDayNanoType, IntervalUnit, Schema,
    Time64MicrosecondType, TimeUnit, TimestampMicrosecondType, TimestampMillisecondType,
    TimestampNanosecondType, TimestampSecondType, UInt8Type, UInt16Type, UInt32Type, UInt64Type,
};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use time::OffsetDateTime;
use tracing::debug;

use colview_native::layout;
use colview_native::{MemChunk, MemResult, MemVector};
use colview_result::{Error, Result};
use colview_types::{
    DateValue, DecimalValue, IntervalValue, LogicalType, MapValue, StructValue, TimeValue,
    TimestampValue, Value, ValueKind,
};

const MILLIS_PER_DAY: i64 = 86_400_000;

/* ============================== TYPES ============================== */

/// Column type for an Arrow data type.
///
/// Dictionary types carry no value names, so they are rejected here; use
/// [`logical_type_of`] on the array instead.
pub fn logical_type_from_arrow(data_type: &DataType) -> Result<LogicalType> {
    let ty = match data_type {
        DataType::Null => ValueKind::SqlNull.into(),
        DataType::Boolean => ValueKind::Boolean.into(),
        DataType::Int8 => ValueKind::TinyInt.into(),
        DataType::Int16 => ValueKind::SmallInt.into(),
        DataType::Int32 => ValueKind::Integer.into(),
        DataType::Int64 => ValueKind::BigInt.into(),
        DataType::UInt8 => ValueKind::UTinyInt.into(),
        DataType::UInt16 => ValueKind::USmallInt.into(),
        DataType::UInt32 => ValueKind::UInteger.into(),
        DataType::UInt64 => ValueKind::UBigInt.into(),
        DataType::Float32 => ValueKind::Float.into(),
        DataType::Float64 => ValueKind::Double.into(),
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => ValueKind::Varchar.into(),
        DataType::Binary
        | DataType::LargeBinary
        | DataType::BinaryView
        | DataType::FixedSizeBinary(_) => ValueKind::Blob.into(),
        DataType::Date32 | DataType::Date64 => ValueKind::Date.into(),
        DataType::Time32(_) | DataType::Time64(_) => ValueKind::Time.into(),
        DataType::Timestamp(_, Some(_)) => ValueKind::TimestampTz.into(),
        DataType::Timestamp(unit, None) => match unit {
            TimeUnit::Second => ValueKind::TimestampS,
            TimeUnit::Millisecond => ValueKind::TimestampMs,
            TimeUnit::Microsecond => ValueKind::Timestamp,
            TimeUnit::Nanosecond => ValueKind::TimestampNs,
        }
        .into(),
        DataType::Interval(IntervalUnit::MonthDayNano) => ValueKind::Interval.into(),
        DataType::Decimal128(precision, scale) => {
            let scale = u8::try_from(*scale).map_err(|_| unsupported(data_type))?;
            LogicalType::decimal(*precision, scale)?
        }
        DataType::List(field) | DataType::LargeList(field) => {
            LogicalType::list(logical_type_from_arrow(field.data_type())?)
        }
        DataType::FixedSizeList(field, size) => {
            let size = usize::try_from(*size).map_err(|_| unsupported(data_type))?;
            LogicalType::array(logical_type_from_arrow(field.data_type())?, size)
        }
        DataType::Struct(fields) => LogicalType::structure(
            fields
                .iter()
                .map(|f| Ok((f.name().clone(), logical_type_from_arrow(f.data_type())?)))
                .collect::<Result<Vec<_>>>()?,
        ),
        DataType::Map(entries, _) => {
            let (key, value) = map_entry_types(entries.data_type())?;
            LogicalType::map(logical_type_from_arrow(key)?, logical_type_from_arrow(value)?)
        }
        DataType::Dictionary(_, _) => {
            return Err(Error::InvalidArgumentError(format!(
                "{data_type} needs its values to become an ENUM type"
            )));
        }
        other => return Err(unsupported(other)),
    };
    Ok(ty)
}

/// Column type for an Arrow array, reading dictionary values where needed.
pub fn logical_type_of(array: &dyn Array) -> Result<LogicalType> {
    match array.data_type() {
        DataType::Dictionary(_, _) => {
            let dictionary = array
                .as_any_dictionary_opt()
                .ok_or_else(|| downcast_failed(array))?;
            Ok(LogicalType::enumeration(dictionary_names(
                dictionary.values().as_ref(),
            )?))
        }
        DataType::List(_) => {
            let list = array.as_list_opt::<i32>().ok_or_else(|| downcast_failed(array))?;
            Ok(LogicalType::list(logical_type_of(list.values().as_ref())?))
        }
        DataType::LargeList(_) => {
            let list = array.as_list_opt::<i64>().ok_or_else(|| downcast_failed(array))?;
            Ok(LogicalType::list(logical_type_of(list.values().as_ref())?))
        }
        DataType::FixedSizeList(_, size) => {
            let list = array
                .as_fixed_size_list_opt()
                .ok_or_else(|| downcast_failed(array))?;
            let size = usize::try_from(*size).map_err(|_| unsupported(array.data_type()))?;
            Ok(LogicalType::array(logical_type_of(list.values().as_ref())?, size))
        }
        DataType::Struct(fields) => {
            let structure = array.as_struct_opt().ok_or_else(|| downcast_failed(array))?;
            let members = fields
                .iter()
                .zip(structure.columns())
                .map(|(field, column)| {
                    Ok((field.name().clone(), logical_type_of(column.as_ref())?))
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(LogicalType::structure(members))
        }
        DataType::Map(_, _) => {
            let map = array.as_map_opt().ok_or_else(|| downcast_failed(array))?;
            Ok(LogicalType::map(
                logical_type_of(map.keys().as_ref())?,
                logical_type_of(map.values().as_ref())?,
            ))
        }
        other => logical_type_from_arrow(other),
    }
}

fn map_entry_types(entries: &DataType) -> Result<(&DataType, &DataType)> {
    match entries {
        DataType::Struct(fields) if fields.len() == 2 => {
            Ok((fields[0].data_type(), fields[1].data_type()))
        }
        other => Err(Error::InvalidArgumentError(format!(
            "map entries must be a two-member struct, got {other}"
        ))),
    }
}

fn dictionary_names(values: &dyn Array) -> Result<Vec<String>> {
    let names: Vec<Option<&str>> = match values.data_type() {
        DataType::Utf8 => values
            .as_string_opt::<i32>()
            .ok_or_else(|| downcast_failed(values))?
            .iter()
            .collect(),
        DataType::LargeUtf8 => values
            .as_string_opt::<i64>()
            .ok_or_else(|| downcast_failed(values))?
            .iter()
            .collect(),
        other => {
            return Err(Error::InvalidArgumentError(format!(
                "dictionary values must be strings, got {other}"
            )));
        }
    };
    names
        .into_iter()
        .enumerate()
        .map(|(code, name)| {
            name.map(str::to_owned).ok_or_else(|| {
                Error::InvalidArgumentError(format!("dictionary entry {code} is null"))
            })
        })
        .collect()
}

/* ============================== VECTORS ============================== */

/// Native vector holding the rows of `array`.
pub fn vector_from_array(array: &dyn Array) -> Result<MemVector> {
    let ty = logical_type_of(array)?;
    match array.data_type() {
        DataType::Int8 => from_slots::<Int8Type>(ty, array),
        DataType::Int16 => from_slots::<Int16Type>(ty, array),
        DataType::Int32 => from_slots::<Int32Type>(ty, array),
        DataType::Int64 => from_slots::<Int64Type>(ty, array),
        DataType::UInt8 => from_slots::<UInt8Type>(ty, array),
        DataType::UInt16 => from_slots::<UInt16Type>(ty, array),
        DataType::UInt32 => from_slots::<UInt32Type>(ty, array),
        DataType::UInt64 => from_slots::<UInt64Type>(ty, array),
        DataType::Float32 => from_slots::<Float32Type>(ty, array),
        DataType::Float64 => from_slots::<Float64Type>(ty, array),
        DataType::Date32 => from_slots::<Date32Type>(ty, array),
        DataType::Time64(TimeUnit::Microsecond) => from_slots::<Time64MicrosecondType>(ty, array),
        DataType::Timestamp(TimeUnit::Second, None) => from_slots::<TimestampSecondType>(ty, array),
        DataType::Timestamp(TimeUnit::Millisecond, None) => {
            from_slots::<TimestampMillisecondType>(ty, array)
        }
        DataType::Timestamp(TimeUnit::Microsecond, None) => {
            from_slots::<TimestampMicrosecondType>(ty, array)
        }
        DataType::Timestamp(TimeUnit::Nanosecond, None) => {
            from_slots::<TimestampNanosecondType>(ty, array)
        }
        _ => {
            let values = values_of(array, &ty)?;
            MemVector::from_values(ty, &values)
        }
    }
}

fn from_slots<T: ArrowPrimitiveType>(ty: LogicalType, array: &dyn Array) -> Result<MemVector> {
    let primitive = array
        .as_primitive_opt::<T>()
        .ok_or_else(|| downcast_failed(array))?;
    // The scalar buffer is already sliced to the array's offset.
    let slots = primitive.values().inner().as_slice();
    MemVector::from_slots(ty, array.len(), slots, validity_of(array))
}

fn validity_of(array: &dyn Array) -> Option<Vec<u64>> {
    if array.null_count() == 0 {
        return None;
    }
    let mut words = vec![u64::MAX; layout::validity_words(array.len())];
    for row in 0..array.len() {
        if array.is_null(row) {
            layout::set_validity_bit(&mut words, row, false);
        }
    }
    Some(words)
}

fn rows<F>(array: &dyn Array, mut read: F) -> Result<Vec<Value>>
where
    F: FnMut(usize) -> Result<Value>,
{
    (0..array.len())
        .map(|row| {
            if array.is_null(row) {
                Ok(Value::Null)
            } else {
                read(row)
            }
        })
        .collect()
}

fn primitive_rows<T: ArrowPrimitiveType>(
    array: &dyn Array,
    wrap: fn(T::Native) -> Value,
) -> Result<Vec<Value>> {
    let primitive = array
        .as_primitive_opt::<T>()
        .ok_or_else(|| downcast_failed(array))?;
    rows(array, |row| Ok(wrap(primitive.value(row))))
}

/// Raw integer form of a temporal array in its own unit.
fn raw_i64(array: &dyn Array) -> Result<Vec<Option<i64>>> {
    let raw = cast(array, &DataType::Int64)?;
    let raw = raw
        .as_primitive_opt::<Int64Type>()
        .ok_or_else(|| downcast_failed(array))?;
    Ok(raw.iter().collect())
}

fn temporal_rows(array: &dyn Array, wrap: impl Fn(i64) -> Result<Value>) -> Result<Vec<Value>> {
    raw_i64(array)?
        .into_iter()
        .map(|raw| raw.map_or(Ok(Value::Null), &wrap))
        .collect()
}

fn unit_nanos(unit: &TimeUnit) -> i64 {
    match unit {
        TimeUnit::Second => 1_000_000_000,
        TimeUnit::Millisecond => 1_000_000,
        TimeUnit::Microsecond => 1_000,
        TimeUnit::Nanosecond => 1,
    }
}

fn timestamp_value(raw: i64, unit: &TimeUnit) -> Result<Value> {
    let nanos = i128::from(raw) * i128::from(unit_nanos(unit));
    match OffsetDateTime::from_unix_timestamp_nanos(nanos) {
        Ok(instant) => Ok(Value::TimestampTz(instant)),
        Err(_) => {
            let micros = i64::try_from(nanos.div_euclid(1_000)).map_err(|_| {
                Error::DomainMismatch(format!("timestamp {raw} {unit:?} is out of range"))
            })?;
            Ok(Value::RawTimestamp(TimestampValue::new(micros)))
        }
    }
}

fn list_rows<O: OffsetSizeTrait>(
    list: &GenericListArray<O>,
    element: &LogicalType,
) -> Result<Vec<Value>> {
    let children = values_of(list.values().as_ref(), element)?;
    let offsets = list.value_offsets();
    rows(list, |row| {
        let (start, end) = (offsets[row].as_usize(), offsets[row + 1].as_usize());
        Ok(Value::List(children[start..end].to_vec()))
    })
}

fn names_of(ty: &LogicalType) -> Result<Arc<[String]>> {
    match ty {
        LogicalType::Struct(members) => Ok(members.iter().map(|(name, _)| name.clone()).collect()),
        other => Err(Error::Internal(format!("{} has no member names", other.kind()))),
    }
}

fn values_of(array: &dyn Array, ty: &LogicalType) -> Result<Vec<Value>> {
    let data_type = array.data_type();
    match (data_type, ty) {
        (DataType::Null, _) => Ok(vec![Value::Null; array.len()]),
        (DataType::Boolean, _) => {
            let booleans = array.as_boolean_opt().ok_or_else(|| downcast_failed(array))?;
            rows(array, |row| Ok(Value::Boolean(booleans.value(row))))
        }
        (DataType::Int8, _) => primitive_rows::<Int8Type>(array, Value::TinyInt),
        (DataType::Int16, _) => primitive_rows::<Int16Type>(array, Value::SmallInt),
        (DataType::Int32, _) => primitive_rows::<Int32Type>(array, Value::Integer),
        (DataType::Int64, _) => primitive_rows::<Int64Type>(array, Value::BigInt),
        (DataType::UInt8, _) => primitive_rows::<UInt8Type>(array, Value::UTinyInt),
        (DataType::UInt16, _) => primitive_rows::<UInt16Type>(array, Value::USmallInt),
        (DataType::UInt32, _) => primitive_rows::<UInt32Type>(array, Value::UInteger),
        (DataType::UInt64, _) => primitive_rows::<UInt64Type>(array, Value::UBigInt),
        (DataType::Float32, _) => primitive_rows::<Float32Type>(array, Value::Float),
        (DataType::Float64, _) => primitive_rows::<Float64Type>(array, Value::Double),
        (DataType::Utf8, _) => {
            let strings = array.as_string_opt::<i32>().ok_or_else(|| downcast_failed(array))?;
            rows(array, |row| Ok(Value::Text(strings.value(row).to_owned())))
        }
        (DataType::LargeUtf8, _) => {
            let strings = array.as_string_opt::<i64>().ok_or_else(|| downcast_failed(array))?;
            rows(array, |row| Ok(Value::Text(strings.value(row).to_owned())))
        }
        (DataType::Utf8View, _) => {
            let strings = array.as_string_view_opt().ok_or_else(|| downcast_failed(array))?;
            rows(array, |row| Ok(Value::Text(strings.value(row).to_owned())))
        }
        (DataType::Binary, _) => {
            let blobs = array.as_binary_opt::<i32>().ok_or_else(|| downcast_failed(array))?;
            rows(array, |row| Ok(Value::Blob(blobs.value(row).to_vec())))
        }
        (DataType::LargeBinary, _) => {
            let blobs = array.as_binary_opt::<i64>().ok_or_else(|| downcast_failed(array))?;
            rows(array, |row| Ok(Value::Blob(blobs.value(row).to_vec())))
        }
        (DataType::BinaryView, _) => {
            let blobs = array.as_binary_view_opt().ok_or_else(|| downcast_failed(array))?;
            rows(array, |row| Ok(Value::Blob(blobs.value(row).to_vec())))
        }
        (DataType::FixedSizeBinary(_), _) => {
            let blobs = array
                .as_fixed_size_binary_opt()
                .ok_or_else(|| downcast_failed(array))?;
            rows(array, |row| Ok(Value::Blob(blobs.value(row).to_vec())))
        }
        (DataType::Date32, _) => {
            primitive_rows::<Date32Type>(array, |days| Value::RawDate(DateValue::new(days)))
        }
        (DataType::Date64, _) => temporal_rows(array, |millis| {
            let days = i32::try_from(millis.div_euclid(MILLIS_PER_DAY)).map_err(|_| {
                Error::DomainMismatch(format!("date {millis} ms is out of range"))
            })?;
            Ok(Value::RawDate(DateValue::new(days)))
        }),
        (DataType::Time32(unit) | DataType::Time64(unit), _) => {
            let nanos = unit_nanos(unit);
            let raw = match data_type {
                DataType::Time32(_) => cast(&cast(array, &DataType::Int32)?, &DataType::Int64)?,
                _ => cast(array, &DataType::Int64)?,
            };
            temporal_rows(raw.as_ref(), |raw| {
                Ok(Value::RawTime(TimeValue::new(raw.saturating_mul(nanos) / 1_000)))
            })
        }
        (DataType::Timestamp(unit, _), _) => {
            temporal_rows(array, |raw| timestamp_value(raw, unit))
        }
        (DataType::Interval(IntervalUnit::MonthDayNano), _) => {
            primitive_rows::<IntervalMonthDayNanoType>(array, |interval| {
                Value::Interval(IntervalValue::new(
                    interval.months,
                    interval.days,
                    interval.nanoseconds.div_euclid(1_000),
                ))
            })
        }
        (DataType::Decimal128(_, _), LogicalType::Decimal { scale, .. }) => {
            let scale = *scale;
            let decimals = array
                .as_primitive_opt::<Decimal128Type>()
                .ok_or_else(|| downcast_failed(array))?;
            rows(array, |row| {
                Ok(Value::RawDecimal(DecimalValue::new(decimals.value(row), scale)))
            })
        }
        (DataType::Dictionary(_, _), LogicalType::Enum { .. }) => {
            let dictionary = array
                .as_any_dictionary_opt()
                .ok_or_else(|| downcast_failed(array))?;
            let codes = dictionary.normalized_keys();
            rows(array, |row| {
                let code = u32::try_from(codes[row]).map_err(|_| {
                    Error::DomainMismatch(format!("dictionary code {} is too large", codes[row]))
                })?;
                Ok(Value::UInteger(code))
            })
        }
        (DataType::List(_), LogicalType::List(element)) => {
            let list = array.as_list_opt::<i32>().ok_or_else(|| downcast_failed(array))?;
            list_rows(list, element)
        }
        (DataType::LargeList(_), LogicalType::List(element)) => {
            let list = array.as_list_opt::<i64>().ok_or_else(|| downcast_failed(array))?;
            list_rows(list, element)
        }
        (DataType::FixedSizeList(_, _), LogicalType::Array { child, .. }) => {
            let list = array
                .as_fixed_size_list_opt()
                .ok_or_else(|| downcast_failed(array))?;
            let children = values_of(list.values().as_ref(), child)?;
            let size = list.value_length() as usize;
            rows(array, |row| {
                let start = list.value_offset(row) as usize;
                Ok(Value::List(children[start..start + size].to_vec()))
            })
        }
        (DataType::Struct(_), LogicalType::Struct(members)) => {
            let structure = array.as_struct_opt().ok_or_else(|| downcast_failed(array))?;
            let names = names_of(ty)?;
            let columns = structure
                .columns()
                .iter()
                .zip(members)
                .map(|(column, (_, member))| values_of(column.as_ref(), member))
                .collect::<Result<Vec<_>>>()?;
            rows(array, |row| {
                let cells = columns.iter().map(|column| column[row].clone()).collect();
                Ok(Value::Struct(StructValue::new(Arc::clone(&names), cells)))
            })
        }
        (DataType::Map(_, _), LogicalType::Map { key, value }) => {
            let map = array.as_map_opt().ok_or_else(|| downcast_failed(array))?;
            let keys = values_of(map.keys().as_ref(), key)?;
            let values = values_of(map.values().as_ref(), value)?;
            let offsets = map.value_offsets();
            rows(array, |row| {
                let (start, end) = (offsets[row] as usize, offsets[row + 1] as usize);
                let pairs = keys[start..end]
                    .iter()
                    .cloned()
                    .zip(values[start..end].iter().cloned())
                    .collect();
                Ok(Value::Map(MapValue(pairs)))
            })
        }
        (other, _) => Err(unsupported(other)),
    }
}

/* ============================== BATCHES ============================== */

fn batch_vectors(batch: &RecordBatch) -> Result<Vec<MemVector>> {
    batch
        .columns()
        .iter()
        .map(|column| vector_from_array(column.as_ref()))
        .collect()
}

/// Native chunk holding every column of `batch`.
pub fn chunk_from_batch(batch: &RecordBatch) -> Result<MemChunk> {
    MemChunk::new(batch_vectors(batch)?)
}

/// Native result over `batches`, all of which must follow `schema`.
///
/// Column types come from the first batch so dictionary columns pick up
/// their value names; every later batch must produce the same types.
pub fn result_from_batches(schema: &Schema, batches: &[RecordBatch]) -> Result<MemResult> {
    let columns: Vec<(String, LogicalType)> = match batches.first() {
        Some(first) => {
            check_width(schema, first)?;
            schema
                .fields()
                .iter()
                .zip(first.columns())
                .map(|(field, column)| {
                    Ok((field.name().clone(), logical_type_of(column.as_ref())?))
                })
                .collect::<Result<_>>()?
        }
        None => schema
            .fields()
            .iter()
            .map(|field| Ok((field.name().clone(), logical_type_from_arrow(field.data_type())?)))
            .collect::<Result<_>>()?,
    };

    let mut result = MemResult::new(columns.clone());
    for (i, batch) in batches.iter().enumerate() {
        check_width(schema, batch)?;
        let vectors = batch_vectors(batch)?;
        if let Some((column, (name, expected))) = vectors
            .iter()
            .zip(&columns)
            .map(|(vector, column)| (vector.ty(), column))
            .find(|(ty, (_, expected))| *ty != expected)
        {
            return Err(Error::InvalidArgumentError(format!(
                "batch {i} column {name} has type {column:?}, expected {expected:?}"
            )));
        }
        result.push_chunk(MemChunk::new(vectors)?)?;
    }
    debug!(
        columns = columns.len(),
        batches = batches.len(),
        "built result from record batches"
    );
    Ok(result)
}

fn check_width(schema: &Schema, batch: &RecordBatch) -> Result<()> {
    if batch.num_columns() != schema.fields().len() {
        return Err(ArrowError::SchemaError(format!(
            "batch has {} columns, schema has {}",
            batch.num_columns(),
            schema.fields().len()
        ))
        .into());
    }
    Ok(())
}

fn unsupported(data_type: &DataType) -> Error {
    ArrowError::NotYetImplemented(format!("no column type for Arrow {data_type}")).into()
}

fn downcast_failed(array: &dyn Array) -> Error {
    ArrowError::CastError(format!(
        "array does not match its data type {}",
        array.data_type()
    ))
    .into()
}
