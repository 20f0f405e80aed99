//! Declared value kinds and their physical slot widths.

use std::fmt;

/// A tag identifying the logical type of a column, as reported by the engine.
///
/// Discriminants are the engine's C API type codes, so a raw code read from a
/// native type handle maps onto a variant with [`ValueKind::from_code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u32)]
pub enum ValueKind {
    Invalid = 0,
    Boolean = 1,
    TinyInt = 2,
    SmallInt = 3,
    Integer = 4,
    BigInt = 5,
    UTinyInt = 6,
    USmallInt = 7,
    UInteger = 8,
    UBigInt = 9,
    Float = 10,
    Double = 11,
    /// Microseconds since the Unix epoch.
    Timestamp = 12,
    /// Days since the Unix epoch.
    Date = 13,
    /// Microseconds since midnight.
    Time = 14,
    Interval = 15,
    HugeInt = 16,
    Varchar = 17,
    Blob = 18,
    Decimal = 19,
    TimestampS = 20,
    TimestampMs = 21,
    TimestampNs = 22,
    Enum = 23,
    List = 24,
    Struct = 25,
    Map = 26,
    Uuid = 27,
    Union = 28,
    Bit = 29,
    TimeTz = 30,
    TimestampTz = 31,
    UHugeInt = 32,
    Array = 33,
    Any = 34,
    VarInt = 35,
    SqlNull = 36,
}

/// The physical representation backing a [`ValueKind`].
///
/// Equal to the declared kind except for `Enum` (an unsigned integer sized by
/// the dictionary) and `Decimal` (a signed integer sized by the width).
pub type StorageKind = ValueKind;

const ALL_KINDS: [ValueKind; 37] = [
    ValueKind::Invalid,
    ValueKind::Boolean,
    ValueKind::TinyInt,
    ValueKind::SmallInt,
    ValueKind::Integer,
    ValueKind::BigInt,
    ValueKind::UTinyInt,
    ValueKind::USmallInt,
    ValueKind::UInteger,
    ValueKind::UBigInt,
    ValueKind::Float,
    ValueKind::Double,
    ValueKind::Timestamp,
    ValueKind::Date,
    ValueKind::Time,
    ValueKind::Interval,
    ValueKind::HugeInt,
    ValueKind::Varchar,
    ValueKind::Blob,
    ValueKind::Decimal,
    ValueKind::TimestampS,
    ValueKind::TimestampMs,
    ValueKind::TimestampNs,
    ValueKind::Enum,
    ValueKind::List,
    ValueKind::Struct,
    ValueKind::Map,
    ValueKind::Uuid,
    ValueKind::Union,
    ValueKind::Bit,
    ValueKind::TimeTz,
    ValueKind::TimestampTz,
    ValueKind::UHugeInt,
    ValueKind::Array,
    ValueKind::Any,
    ValueKind::VarInt,
    ValueKind::SqlNull,
];

impl ValueKind {
    /// Every kind, ordered by type code.
    pub const ALL: &'static [ValueKind] = &ALL_KINDS;

    /// Map an engine type code onto a kind.
    pub fn from_code(code: u32) -> Option<Self> {
        ALL_KINDS.get(code as usize).copied()
    }

    #[inline]
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// SQL spelling of the kind, used in error messages.
    pub const fn name(self) -> &'static str {
        match self {
            ValueKind::Invalid => "INVALID",
            ValueKind::Boolean => "BOOLEAN",
            ValueKind::TinyInt => "TINYINT",
            ValueKind::SmallInt => "SMALLINT",
            ValueKind::Integer => "INTEGER",
            ValueKind::BigInt => "BIGINT",
            ValueKind::UTinyInt => "UTINYINT",
            ValueKind::USmallInt => "USMALLINT",
            ValueKind::UInteger => "UINTEGER",
            ValueKind::UBigInt => "UBIGINT",
            ValueKind::Float => "FLOAT",
            ValueKind::Double => "DOUBLE",
            ValueKind::Timestamp => "TIMESTAMP",
            ValueKind::Date => "DATE",
            ValueKind::Time => "TIME",
            ValueKind::Interval => "INTERVAL",
            ValueKind::HugeInt => "HUGEINT",
            ValueKind::Varchar => "VARCHAR",
            ValueKind::Blob => "BLOB",
            ValueKind::Decimal => "DECIMAL",
            ValueKind::TimestampS => "TIMESTAMP_S",
            ValueKind::TimestampMs => "TIMESTAMP_MS",
            ValueKind::TimestampNs => "TIMESTAMP_NS",
            ValueKind::Enum => "ENUM",
            ValueKind::List => "LIST",
            ValueKind::Struct => "STRUCT",
            ValueKind::Map => "MAP",
            ValueKind::Uuid => "UUID",
            ValueKind::Union => "UNION",
            ValueKind::Bit => "BIT",
            ValueKind::TimeTz => "TIME WITH TIME ZONE",
            ValueKind::TimestampTz => "TIMESTAMP WITH TIME ZONE",
            ValueKind::UHugeInt => "UHUGEINT",
            ValueKind::Array => "ARRAY",
            ValueKind::Any => "ANY",
            ValueKind::VarInt => "VARINT",
            ValueKind::SqlNull => "NULL",
        }
    }

    /// Width in bytes of one slot in the vector's data buffer.
    ///
    /// `None` for kinds without a data buffer of their own (STRUCT, UNION and
    /// ARRAY keep their values in child vectors) and for kinds that never back a
    /// vector.
    pub const fn slot_width(self) -> Option<usize> {
        match self {
            ValueKind::Boolean | ValueKind::TinyInt | ValueKind::UTinyInt => Some(1),
            ValueKind::SmallInt | ValueKind::USmallInt => Some(2),
            ValueKind::Integer | ValueKind::UInteger | ValueKind::Float | ValueKind::Date => {
                Some(4)
            }
            ValueKind::BigInt
            | ValueKind::UBigInt
            | ValueKind::Double
            | ValueKind::Timestamp
            | ValueKind::TimestampS
            | ValueKind::TimestampMs
            | ValueKind::TimestampNs
            | ValueKind::TimestampTz
            | ValueKind::Time
            | ValueKind::TimeTz => Some(8),
            ValueKind::HugeInt
            | ValueKind::UHugeInt
            | ValueKind::Uuid
            | ValueKind::Interval
            | ValueKind::Varchar
            | ValueKind::Blob
            | ValueKind::Bit
            | ValueKind::VarInt
            | ValueKind::List
            | ValueKind::Map => Some(16),
            // Resolved through the storage kind.
            ValueKind::Decimal | ValueKind::Enum => None,
            ValueKind::Struct | ValueKind::Union | ValueKind::Array => None,
            ValueKind::SqlNull => Some(0),
            ValueKind::Invalid | ValueKind::Any => None,
        }
    }

    /// Kinds whose slot layout is exactly a Rust numeric primitive.
    pub const fn is_numeric_primitive(self) -> bool {
        matches!(
            self,
            ValueKind::TinyInt
                | ValueKind::SmallInt
                | ValueKind::Integer
                | ValueKind::BigInt
                | ValueKind::HugeInt
                | ValueKind::UTinyInt
                | ValueKind::USmallInt
                | ValueKind::UInteger
                | ValueKind::UBigInt
                | ValueKind::UHugeInt
                | ValueKind::Float
                | ValueKind::Double
        )
    }

    /// Kinds whose values live in child vectors.
    pub const fn is_nested(self) -> bool {
        matches!(
            self,
            ValueKind::List
                | ValueKind::Array
                | ValueKind::Struct
                | ValueKind::Map
                | ValueKind::Union
        )
    }

    /// Kinds stored as 16-byte string references.
    pub const fn is_string_like(self) -> bool {
        matches!(
            self,
            ValueKind::Varchar | ValueKind::Blob | ValueKind::Bit | ValueKind::VarInt
        )
    }

    pub const fn is_timestamp(self) -> bool {
        matches!(
            self,
            ValueKind::Timestamp
                | ValueKind::TimestampS
                | ValueKind::TimestampMs
                | ValueKind::TimestampNs
                | ValueKind::TimestampTz
        )
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for kind in ValueKind::ALL {
            assert_eq!(ValueKind::from_code(kind.code()), Some(*kind));
        }
        assert_eq!(ValueKind::from_code(37), None);
        assert_eq!(ValueKind::from_code(33), Some(ValueKind::Array));
    }

    #[test]
    fn slot_widths() {
        assert_eq!(ValueKind::Boolean.slot_width(), Some(1));
        assert_eq!(ValueKind::Date.slot_width(), Some(4));
        assert_eq!(ValueKind::TimeTz.slot_width(), Some(8));
        assert_eq!(ValueKind::Varchar.slot_width(), Some(16));
        assert_eq!(ValueKind::Struct.slot_width(), None);
    }
}
