//! Building in-memory vectors from boxed values.

use std::sync::Arc;

use colview_result::{Error, Result};
use colview_types::{
    DateValue, LogicalType, StructValue, TimeValue, TimestampValue, Value, ValueKind,
    uuid_to_hugeint,
};

use super::{MemVector, validity_from};
use crate::layout::ListEntry;

impl MemVector {
    /// Encode `values` into a vector of type `ty`. `Value::Null` rows are null.
    ///
    /// Each kind accepts the variants its canonical read produces plus the raw
    /// forms (`RawDate`, `RawDecimal`, integer codes for enums, ...), so test
    /// fixtures can also express values the typed API would reject.
    pub fn from_values(ty: LogicalType, values: &[Value]) -> Result<Self> {
        ty.validate()?;
        match ty.kind() {
            ValueKind::SqlNull => Ok(MemVector::nulls(values.len())),
            kind if kind.is_string_like() => encode_strings(ty, values),
            ValueKind::List => encode_list(ty, values),
            ValueKind::Map => encode_map(ty, values),
            ValueKind::Array => encode_array(ty, values),
            ValueKind::Struct => encode_struct(ty, values),
            ValueKind::Union => encode_union(ty, values),
            _ => encode_fixed(ty, values),
        }
    }
}

fn unexpected(ty: &LogicalType, value: &Value) -> Error {
    Error::InvalidArgumentError(format!(
        "cannot store a {} value in a {} vector",
        value.variant_name(),
        ty.kind()
    ))
}

fn row_validity(values: &[Value]) -> Option<Vec<u64>> {
    validity_from(values.iter().map(|v| !v.is_null()))
}

fn encode_fixed(ty: LogicalType, values: &[Value]) -> Result<MemVector> {
    let width = ty.storage_kind().slot_width().unwrap_or(0);
    let mut slots = vec![0u8; values.len() * width];
    for (i, value) in values.iter().enumerate() {
        if !value.is_null() {
            write_slot(&ty, value, &mut slots[i * width..(i + 1) * width])?;
        }
    }
    MemVector::from_slots(ty, values.len(), &slots, row_validity(values))
}

macro_rules! put_int {
    ($ty:ty, $wide:expr, $out:expr, $logical:expr, $value:expr) => {{
        let narrow = <$ty>::try_from($wide).map_err(|_| {
            Error::InvalidArgumentError(format!(
                "{} does not fit a {} slot",
                $value,
                $logical.kind()
            ))
        })?;
        $out.copy_from_slice(&narrow.to_ne_bytes());
    }};
}

fn write_slot(ty: &LogicalType, value: &Value, out: &mut [u8]) -> Result<()> {
    let storage = ty.storage_kind();
    match ty {
        LogicalType::Decimal { scale, .. } => {
            let mantissa = match value {
                Value::RawDecimal(d) if d.scale == *scale => d.value,
                Value::Decimal(d) => {
                    let mut d = *d;
                    d.rescale(u32::from(*scale));
                    d.mantissa()
                }
                other => other.as_i128().ok_or_else(|| unexpected(ty, value))?,
            };
            return write_int(ty, storage, mantissa, value, out);
        }
        LogicalType::Enum { dictionary } => {
            let code = match value {
                Value::Enum(name) | Value::Text(name) => dictionary
                    .iter()
                    .position(|member| member == name)
                    .map(|code| code as i128)
                    .ok_or_else(|| {
                        Error::InvalidArgumentError(format!("{name} is not an enum member"))
                    })?,
                other => other.as_i128().ok_or_else(|| unexpected(ty, value))?,
            };
            return write_int(ty, storage, code, value, out);
        }
        _ => {}
    }

    match (ty.kind(), value) {
        (ValueKind::Boolean, Value::Boolean(b)) => out[0] = u8::from(*b),
        (ValueKind::Float, Value::Float(f)) => out.copy_from_slice(&f.to_ne_bytes()),
        (ValueKind::Double, Value::Double(d)) => out.copy_from_slice(&d.to_ne_bytes()),
        (ValueKind::Double, Value::Float(f)) => out.copy_from_slice(&f64::from(*f).to_ne_bytes()),
        (ValueKind::UHugeInt, Value::UHugeInt(v)) => out.copy_from_slice(&v.to_ne_bytes()),
        (kind, other) if kind.is_numeric_primitive() && other.as_i128().is_some() => {
            let wide = other.as_i128().unwrap_or_default();
            write_int(ty, storage, wide, value, out)?;
        }
        (ValueKind::Date, Value::Date(d)) => {
            out.copy_from_slice(&DateValue::from_date(*d).days.to_ne_bytes())
        }
        (ValueKind::Date, Value::RawDate(d)) => out.copy_from_slice(&d.days.to_ne_bytes()),
        (ValueKind::Time, Value::Time(t)) => {
            out.copy_from_slice(&TimeValue::from_time(*t).micros.to_ne_bytes())
        }
        (ValueKind::Time, Value::RawTime(t)) => out.copy_from_slice(&t.micros.to_ne_bytes()),
        (ValueKind::TimeTz, Value::TimeTz(t)) => out.copy_from_slice(&t.to_bits().to_ne_bytes()),
        (kind, _) if kind.is_timestamp() => {
            let raw = timestamp_slot(ty, kind, value)?;
            out.copy_from_slice(&raw.to_ne_bytes());
        }
        (ValueKind::Interval, Value::Interval(iv)) => {
            out[..4].copy_from_slice(&iv.months.to_ne_bytes());
            out[4..8].copy_from_slice(&iv.days.to_ne_bytes());
            out[8..].copy_from_slice(&iv.micros.to_ne_bytes());
        }
        (ValueKind::Uuid, Value::Uuid(u)) => {
            out.copy_from_slice(&uuid_to_hugeint(*u).to_ne_bytes())
        }
        _ => return Err(unexpected(ty, value)),
    }
    Ok(())
}

fn write_int(
    ty: &LogicalType,
    storage: ValueKind,
    wide: i128,
    value: &Value,
    out: &mut [u8],
) -> Result<()> {
    match storage {
        ValueKind::TinyInt => put_int!(i8, wide, out, ty, value),
        ValueKind::SmallInt => put_int!(i16, wide, out, ty, value),
        ValueKind::Integer => put_int!(i32, wide, out, ty, value),
        ValueKind::BigInt => put_int!(i64, wide, out, ty, value),
        ValueKind::HugeInt => out.copy_from_slice(&wide.to_ne_bytes()),
        ValueKind::UTinyInt => put_int!(u8, wide, out, ty, value),
        ValueKind::USmallInt => put_int!(u16, wide, out, ty, value),
        ValueKind::UInteger => put_int!(u32, wide, out, ty, value),
        ValueKind::UBigInt => put_int!(u64, wide, out, ty, value),
        ValueKind::UHugeInt => put_int!(u128, wide, out, ty, value),
        _ => return Err(unexpected(ty, value)),
    }
    Ok(())
}

/// Raw slot for a timestamp kind, in that kind's unit.
fn timestamp_slot(ty: &LogicalType, kind: ValueKind, value: &Value) -> Result<i64> {
    let nanos: i128 = match value {
        Value::Timestamp(dt) => dt.assume_utc().unix_timestamp_nanos(),
        Value::TimestampTz(dt) => dt.unix_timestamp_nanos(),
        Value::RawTimestamp(ts) if !ts.is_finite() => return Ok(ts.micros),
        Value::RawTimestamp(TimestampValue { micros }) => i128::from(*micros) * 1_000,
        other => return Err(unexpected(ty, other)),
    };
    let unit: i128 = match kind {
        ValueKind::TimestampS => 1_000_000_000,
        ValueKind::TimestampMs => 1_000_000,
        ValueKind::TimestampNs => 1,
        _ => 1_000,
    };
    i64::try_from(nanos.div_euclid(unit)).map_err(|_| {
        Error::InvalidArgumentError(format!("{value} does not fit a {kind} slot"))
    })
}

fn encode_strings(ty: LogicalType, values: &[Value]) -> Result<MemVector> {
    let mut payloads: Vec<Option<Vec<u8>>> = Vec::with_capacity(values.len());
    for value in values {
        let payload = match (ty.kind(), value) {
            (_, Value::Null) => None,
            (ValueKind::Varchar, Value::Text(s)) => Some(s.as_bytes().to_vec()),
            (ValueKind::Blob, Value::Blob(b)) => Some(b.clone()),
            (ValueKind::Bit, Value::Bit(bits)) => Some(bits.to_blob()),
            (ValueKind::VarInt, Value::VarInt(v)) => Some(v.to_blob()),
            (ValueKind::VarInt, other) if other.as_i128().is_some() => other
                .as_i128()
                .map(|v| colview_types::VarInt::from_i128(v).to_blob()),
            _ => return Err(unexpected(&ty, value)),
        };
        payloads.push(payload);
    }
    let borrowed: Vec<Option<&[u8]>> = payloads.iter().map(|p| p.as_deref()).collect();
    MemVector::from_strings(ty, &borrowed)
}

/// Flatten the items of each row into one child column.
fn flatten_rows<'a>(
    ty: &LogicalType,
    values: &'a [Value],
    mut items: impl FnMut(&'a Value) -> Option<Vec<Value>>,
) -> Result<(Vec<ListEntry>, Vec<Value>)> {
    let mut entries = Vec::with_capacity(values.len());
    let mut flat = Vec::new();
    for value in values {
        if value.is_null() {
            entries.push(ListEntry::new(flat.len() as u64, 0));
            continue;
        }
        let row = items(value).ok_or_else(|| unexpected(ty, value))?;
        entries.push(ListEntry::new(flat.len() as u64, row.len() as u64));
        flat.extend(row);
    }
    Ok((entries, flat))
}

fn encode_list(ty: LogicalType, values: &[Value]) -> Result<MemVector> {
    let LogicalType::List(child_ty) = &ty else {
        return Err(Error::Internal("list encoder called for non-list".into()));
    };
    let (entries, flat) = flatten_rows(&ty, values, |v| v.as_list().map(<[Value]>::to_vec))?;
    let child = MemVector::from_values((**child_ty).clone(), &flat)?;
    let child_len = child.len();
    MemVector::from_list_parts(
        ty,
        &entries,
        row_validity(values),
        Arc::new(child),
        child_len,
    )
}

fn encode_map(ty: LogicalType, values: &[Value]) -> Result<MemVector> {
    let LogicalType::Map { key, value } = &ty else {
        return Err(Error::Internal("map encoder called for non-map".into()));
    };
    let entry_ty = LogicalType::map_entry_type(key, value);
    let (entries, flat) = flatten_rows(&ty, values, |v| match v {
        Value::Map(map) => Some(
            map.entries()
                .iter()
                .map(|(k, v)| Value::List(vec![k.clone(), v.clone()]))
                .collect(),
        ),
        _ => None,
    })?;
    let (keys, vals): (Vec<Value>, Vec<Value>) = flat
        .into_iter()
        .map(|pair| match pair {
            Value::List(mut kv) => {
                let v = kv.pop().unwrap_or_default();
                let k = kv.pop().unwrap_or_default();
                (k, v)
            }
            other => (other, Value::Null),
        })
        .unzip();
    let len = keys.len();
    let key_vector = MemVector::from_values((**key).clone(), &keys)?;
    let value_vector = MemVector::from_values((**value).clone(), &vals)?;
    let entry_vector = MemVector::from_struct_parts(
        entry_ty,
        len,
        None,
        vec![key_vector.into_handle(), value_vector.into_handle()],
    )?;
    MemVector::from_list_parts(
        ty,
        &entries,
        row_validity(values),
        entry_vector.into_handle(),
        len,
    )
}

fn encode_array(ty: LogicalType, values: &[Value]) -> Result<MemVector> {
    let LogicalType::Array { child, size } = &ty else {
        return Err(Error::Internal("array encoder called for non-array".into()));
    };
    let mut flat = Vec::with_capacity(values.len() * size);
    for value in values {
        match value {
            Value::Null => flat.extend(std::iter::repeat_n(Value::Null, *size)),
            Value::List(items) if items.len() == *size => flat.extend(items.iter().cloned()),
            other => return Err(unexpected(&ty, other)),
        }
    }
    let child_vector = MemVector::from_values((**child).clone(), &flat)?;
    MemVector::from_array_parts(
        ty.clone(),
        values.len(),
        row_validity(values),
        child_vector.into_handle(),
    )
}

/// Split struct rows into one column per member.
fn member_columns(
    ty: &LogicalType,
    values: &[Value],
    members: usize,
    row: impl Fn(&StructValue) -> Option<Vec<Value>>,
) -> Result<Vec<Vec<Value>>> {
    let mut columns = vec![Vec::with_capacity(values.len()); members];
    for value in values {
        let cells = match value {
            Value::Null => vec![Value::Null; members],
            Value::Struct(s) => row(s).ok_or_else(|| unexpected(ty, value))?,
            other => return Err(unexpected(ty, other)),
        };
        for (column, cell) in columns.iter_mut().zip(cells) {
            column.push(cell);
        }
    }
    Ok(columns)
}

fn encode_struct(ty: LogicalType, values: &[Value]) -> Result<MemVector> {
    let LogicalType::Struct(fields) = &ty else {
        return Err(Error::Internal("struct encoder called for non-struct".into()));
    };
    let columns = member_columns(&ty, values, fields.len(), |s| {
        (s.len() == fields.len()).then(|| s.values().to_vec())
    })?;
    let members = fields
        .iter()
        .zip(columns)
        .map(|((_, field_ty), column)| {
            MemVector::from_values(field_ty.clone(), &column).map(MemVector::into_handle)
        })
        .collect::<Result<Vec<_>>>()?;
    MemVector::from_struct_parts(ty.clone(), values.len(), row_validity(values), members)
}

/// Union rows are single-member structs naming the selected alternative.
fn encode_union(ty: LogicalType, values: &[Value]) -> Result<MemVector> {
    let LogicalType::Union(alternatives) = &ty else {
        return Err(Error::Internal("union encoder called for non-union".into()));
    };
    let columns = member_columns(&ty, values, alternatives.len() + 1, |s| {
        let (name, value) = s.iter().next().filter(|_| s.len() == 1)?;
        let tag = alternatives.iter().position(|(alt, _)| alt == name)?;
        let mut cells = vec![Value::Null; alternatives.len() + 1];
        cells[0] = Value::UTinyInt(tag as u8);
        cells[tag + 1] = value.clone();
        Some(cells)
    })?;
    let mut columns = columns.into_iter();
    let tags = columns.next().unwrap_or_default();
    let tag_vector = MemVector::from_values(ValueKind::UTinyInt.into(), &tags)?;
    let mut members = vec![tag_vector.into_handle()];
    for ((_, alt_ty), column) in alternatives.iter().zip(columns) {
        members.push(MemVector::from_values(alt_ty.clone(), &column)?.into_handle());
    }
    MemVector::from_struct_parts(ty.clone(), values.len(), row_validity(values), members)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NativeVector;
    use crate::layout;
    use colview_types::MapValue;

    #[test]
    fn list_offsets() {
        let ty = LogicalType::list(ValueKind::Integer);
        let rows = vec![
            Value::List(vec![Value::Integer(10), Value::Integer(20), Value::Integer(30)]),
            Value::List(vec![]),
            Value::Null,
            Value::List(vec![Value::Integer(40)]),
        ];
        let v = MemVector::from_values(ty, &rows).unwrap();
        let child = v.list_child().unwrap();
        assert_eq!(child.len, 4);
        unsafe {
            assert_eq!(layout::list_entry(v.data(), 0), ListEntry::new(0, 3));
            assert_eq!(layout::list_entry(v.data(), 1), ListEntry::new(3, 0));
            assert_eq!(layout::list_entry(v.data(), 3), ListEntry::new(3, 1));
            assert!(!layout::validity_bit(v.validity(), 2));
            assert_eq!(layout::read_slot::<i32>(child.vector.data(), 3), 40);
        }
    }

    #[test]
    fn enum_by_name_and_code() {
        let ty = LogicalType::enumeration(["RED", "BLUE"]);
        let v = MemVector::from_values(
            ty.clone(),
            &[Value::Enum("BLUE".into()), Value::UTinyInt(7)],
        )
        .unwrap();
        unsafe {
            assert_eq!(layout::read_slot::<u8>(v.data(), 0), 1);
            assert_eq!(layout::read_slot::<u8>(v.data(), 1), 7);
        }
        assert!(MemVector::from_values(ty, &[Value::Enum("GREEN".into())]).is_err());
    }

    #[test]
    fn map_child_is_key_value_struct() {
        let ty = LogicalType::map(ValueKind::Varchar, ValueKind::Integer);
        let row = Value::Map(MapValue(vec![
            (Value::Text("a".into()), Value::Integer(1)),
            (Value::Text("b".into()), Value::Null),
        ]));
        let v = MemVector::from_values(ty, &[row]).unwrap();
        let entries = v.list_child().unwrap();
        assert_eq!(entries.len, 2);
        let values = entries.vector.struct_member(1).unwrap();
        unsafe {
            assert_eq!(layout::read_slot::<i32>(values.data(), 0), 1);
            assert!(!layout::validity_bit(values.validity(), 1));
        }
    }

    #[test]
    fn narrowing_is_rejected() {
        let err = MemVector::from_values(ValueKind::TinyInt.into(), &[Value::Integer(300)]);
        assert!(matches!(err, Err(Error::InvalidArgumentError(_))));
    }
}
