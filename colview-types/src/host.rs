//! Runtime identity of the Rust types values can be read into.

use std::fmt;

/// Describes a host-side target type at runtime.
///
/// Every statically typed target has a `HostType`; the compatibility matrix,
/// error messages and the runtime-keyed read path all work in terms of it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HostType {
    Bool,
    I8,
    I16,
    I32,
    I64,
    I128,
    U8,
    U16,
    U32,
    U64,
    U128,
    F32,
    F64,
    String,
    /// `time::Date`
    Date,
    /// `time::Time`
    Time,
    /// `time::PrimitiveDateTime`
    DateTime,
    /// `time::OffsetDateTime`
    OffsetDateTime,
    /// `time::Duration`
    Duration,
    DateValue,
    TimeValue,
    TimeTzValue,
    TimestampValue,
    IntervalValue,
    /// `rust_decimal::Decimal`
    Decimal,
    DecimalValue,
    /// `uuid::Uuid`
    Uuid,
    BitString,
    VarInt,
    /// A host enumeration identified by its type name and member names.
    Enum {
        name: &'static str,
        members: Vec<&'static str>,
    },
    /// `Vec<T>`
    List(Box<HostType>),
    /// `Box<[T]>`
    FixedList(Box<HostType>),
    /// `HashMap<K, V>`
    Map(Box<HostType>, Box<HostType>),
    /// `StructValue`
    Struct,
    /// `MapValue`
    MapValue,
    /// `Option<T>`
    Optional(Box<HostType>),
    /// The boxed `Value`, accepted for every column.
    Value,
}

impl HostType {
    pub fn list(element: HostType) -> Self {
        HostType::List(Box::new(element))
    }

    pub fn fixed_list(element: HostType) -> Self {
        HostType::FixedList(Box::new(element))
    }

    pub fn map(key: HostType, value: HostType) -> Self {
        HostType::Map(Box::new(key), Box::new(value))
    }

    pub fn optional(inner: HostType) -> Self {
        HostType::Optional(Box::new(inner))
    }

    /// `Vec<u8>`, the canonical type of BLOB columns.
    pub fn bytes() -> Self {
        HostType::list(HostType::U8)
    }

    /// Whether the type has its own representation for a missing value.
    pub fn is_nullable(&self) -> bool {
        matches!(self, HostType::Optional(_) | HostType::Value)
    }

    /// Strip one `Optional` layer.
    pub fn non_optional(&self) -> &HostType {
        match self {
            HostType::Optional(inner) => inner,
            other => other,
        }
    }
}

impl fmt::Display for HostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostType::Bool => f.write_str("bool"),
            HostType::I8 => f.write_str("i8"),
            HostType::I16 => f.write_str("i16"),
            HostType::I32 => f.write_str("i32"),
            HostType::I64 => f.write_str("i64"),
            HostType::I128 => f.write_str("i128"),
            HostType::U8 => f.write_str("u8"),
            HostType::U16 => f.write_str("u16"),
            HostType::U32 => f.write_str("u32"),
            HostType::U64 => f.write_str("u64"),
            HostType::U128 => f.write_str("u128"),
            HostType::F32 => f.write_str("f32"),
            HostType::F64 => f.write_str("f64"),
            HostType::String => f.write_str("String"),
            HostType::Date => f.write_str("time::Date"),
            HostType::Time => f.write_str("time::Time"),
            HostType::DateTime => f.write_str("time::PrimitiveDateTime"),
            HostType::OffsetDateTime => f.write_str("time::OffsetDateTime"),
            HostType::Duration => f.write_str("time::Duration"),
            HostType::DateValue => f.write_str("DateValue"),
            HostType::TimeValue => f.write_str("TimeValue"),
            HostType::TimeTzValue => f.write_str("TimeTzValue"),
            HostType::TimestampValue => f.write_str("TimestampValue"),
            HostType::IntervalValue => f.write_str("IntervalValue"),
            HostType::Decimal => f.write_str("rust_decimal::Decimal"),
            HostType::DecimalValue => f.write_str("DecimalValue"),
            HostType::Uuid => f.write_str("uuid::Uuid"),
            HostType::BitString => f.write_str("BitString"),
            HostType::VarInt => f.write_str("VarInt"),
            HostType::Enum { name, .. } => f.write_str(name),
            HostType::List(inner) => write!(f, "Vec<{inner}>"),
            HostType::FixedList(inner) => write!(f, "Box<[{inner}]>"),
            HostType::Map(key, value) => write!(f, "HashMap<{key}, {value}>"),
            HostType::Struct => f.write_str("StructValue"),
            HostType::MapValue => f.write_str("MapValue"),
            HostType::Optional(inner) => write!(f, "Option<{inner}>"),
            HostType::Value => f.write_str("Value"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_nested() {
        let ty = HostType::optional(HostType::map(
            HostType::String,
            HostType::list(HostType::I32),
        ));
        assert_eq!(ty.to_string(), "Option<HashMap<String, Vec<i32>>>");
        assert!(ty.is_nullable());
        assert_eq!(ty.non_optional().to_string(), "HashMap<String, Vec<i32>>");
    }
}
