//! The boxed, dynamically typed value.

use std::fmt;
use std::sync::Arc;

use rust_decimal::Decimal;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};
use uuid::Uuid;

use crate::bits::{BitString, VarInt};
use crate::decimal::DecimalValue;
use crate::interval::IntervalValue;
use crate::temporal::{DateValue, TimeTzValue, TimeValue, TimestampValue};

/// A single element read without a statically known target.
///
/// Every column can be read as a `Value`; the variant follows the column's
/// canonical host type (see the compatibility matrix), or the requested type
/// when read through the runtime-keyed path.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Boolean(bool),
    TinyInt(i8),
    SmallInt(i16),
    Integer(i32),
    BigInt(i64),
    HugeInt(i128),
    UTinyInt(u8),
    USmallInt(u16),
    UInteger(u32),
    UBigInt(u64),
    UHugeInt(u128),
    Float(f32),
    Double(f64),
    Decimal(Decimal),
    RawDecimal(DecimalValue),
    Date(Date),
    RawDate(DateValue),
    Time(Time),
    RawTime(TimeValue),
    TimeTz(TimeTzValue),
    Timestamp(PrimitiveDateTime),
    TimestampTz(OffsetDateTime),
    RawTimestamp(TimestampValue),
    Interval(IntervalValue),
    Duration(time::Duration),
    Uuid(Uuid),
    Text(String),
    Blob(Vec<u8>),
    Bit(BitString),
    VarInt(VarInt),
    /// Enum member name.
    Enum(String),
    List(Vec<Value>),
    Struct(StructValue),
    Map(MapValue),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short name of the variant, used in error messages.
    pub fn variant_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Boolean(_) => "Boolean",
            Value::TinyInt(_) => "TinyInt",
            Value::SmallInt(_) => "SmallInt",
            Value::Integer(_) => "Integer",
            Value::BigInt(_) => "BigInt",
            Value::HugeInt(_) => "HugeInt",
            Value::UTinyInt(_) => "UTinyInt",
            Value::USmallInt(_) => "USmallInt",
            Value::UInteger(_) => "UInteger",
            Value::UBigInt(_) => "UBigInt",
            Value::UHugeInt(_) => "UHugeInt",
            Value::Float(_) => "Float",
            Value::Double(_) => "Double",
            Value::Decimal(_) => "Decimal",
            Value::RawDecimal(_) => "RawDecimal",
            Value::Date(_) => "Date",
            Value::RawDate(_) => "RawDate",
            Value::Time(_) => "Time",
            Value::RawTime(_) => "RawTime",
            Value::TimeTz(_) => "TimeTz",
            Value::Timestamp(_) => "Timestamp",
            Value::TimestampTz(_) => "TimestampTz",
            Value::RawTimestamp(_) => "RawTimestamp",
            Value::Interval(_) => "Interval",
            Value::Duration(_) => "Duration",
            Value::Uuid(_) => "Uuid",
            Value::Text(_) => "Text",
            Value::Blob(_) => "Blob",
            Value::Bit(_) => "Bit",
            Value::VarInt(_) => "VarInt",
            Value::Enum(_) => "Enum",
            Value::List(_) => "List",
            Value::Struct(_) => "Struct",
            Value::Map(_) => "Map",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) | Value::Enum(s) => Some(s),
            _ => None,
        }
    }

    /// Signed integer view of any integer variant that fits in `i128`.
    pub fn as_i128(&self) -> Option<i128> {
        match *self {
            Value::TinyInt(v) => Some(v.into()),
            Value::SmallInt(v) => Some(v.into()),
            Value::Integer(v) => Some(v.into()),
            Value::BigInt(v) => Some(v.into()),
            Value::HugeInt(v) => Some(v),
            Value::UTinyInt(v) => Some(v.into()),
            Value::USmallInt(v) => Some(v.into()),
            Value::UInteger(v) => Some(v.into()),
            Value::UBigInt(v) => Some(v.into()),
            Value::UHugeInt(v) => i128::try_from(v).ok(),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&StructValue> {
        match self {
            Value::Struct(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Boolean(v) => write!(f, "{v}"),
            Value::TinyInt(v) => write!(f, "{v}"),
            Value::SmallInt(v) => write!(f, "{v}"),
            Value::Integer(v) => write!(f, "{v}"),
            Value::BigInt(v) => write!(f, "{v}"),
            Value::HugeInt(v) => write!(f, "{v}"),
            Value::UTinyInt(v) => write!(f, "{v}"),
            Value::USmallInt(v) => write!(f, "{v}"),
            Value::UInteger(v) => write!(f, "{v}"),
            Value::UBigInt(v) => write!(f, "{v}"),
            Value::UHugeInt(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::Decimal(v) => write!(f, "{v}"),
            Value::RawDecimal(v) => write!(f, "{v}"),
            Value::Date(v) => write!(f, "{v}"),
            Value::RawDate(v) => write!(f, "{} days", v.days),
            Value::Time(v) => write!(f, "{v}"),
            Value::RawTime(v) => write!(f, "{} us", v.micros),
            Value::TimeTz(v) => write!(f, "{} us {:+}s", v.time.micros, v.offset_seconds),
            Value::Timestamp(v) => write!(f, "{v}"),
            Value::TimestampTz(v) => write!(f, "{v}"),
            Value::RawTimestamp(v) => write!(f, "{} us", v.micros),
            Value::Interval(v) => write!(f, "{} months {} days {} us", v.months, v.days, v.micros),
            Value::Duration(v) => write!(f, "{v}"),
            Value::Uuid(v) => write!(f, "{v}"),
            Value::Text(v) | Value::Enum(v) => f.write_str(v),
            Value::Blob(bytes) => {
                for byte in bytes {
                    write!(f, "\\x{byte:02X}")?;
                }
                Ok(())
            }
            Value::Bit(v) => write!(f, "{v}"),
            Value::VarInt(v) => write!(f, "{v}"),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Struct(s) => write!(f, "{s}"),
            Value::Map(m) => write!(f, "{m}"),
        }
    }
}

/// A struct row: member names in declared order with one value each.
///
/// Names are shared between all rows read through the same plan.
#[derive(Debug, Clone, PartialEq)]
pub struct StructValue {
    names: Arc<[String]>,
    values: Vec<Value>,
}

impl StructValue {
    pub fn new(names: Arc<[String]>, values: Vec<Value>) -> Self {
        debug_assert_eq!(names.len(), values.len());
        Self { names, values }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| &self.values[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }
}

impl fmt::Display for StructValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "'{name}': {value}")?;
        }
        f.write_str("}")
    }
}

/// A map row as ordered key/value pairs. Values may be `Null`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MapValue(pub Vec<(Value, Value)>);

impl MapValue {
    pub fn entries(&self) -> &[(Value, Value)] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

impl fmt::Display for MapValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}={value}")?;
        }
        f.write_str("}")
    }
}
