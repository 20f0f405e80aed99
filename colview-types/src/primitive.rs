use crate::kind::ValueKind;

/// A Rust numeric type whose in-memory layout is exactly one engine slot.
///
/// Implemented for the fixed-width integers and floats. Readers use it for
/// zero-copy spans and single unaligned loads.
pub trait NativePrimitive: Copy + Send + Sync + 'static {
    /// The kind whose slots hold this type.
    const KIND: ValueKind;
}

macro_rules! impl_native_primitive {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl NativePrimitive for $ty {
                const KIND: ValueKind = ValueKind::$kind;
            }
        )*
    };
}

impl_native_primitive!(
    i8 => TinyInt,
    i16 => SmallInt,
    i32 => Integer,
    i64 => BigInt,
    i128 => HugeInt,
    u8 => UTinyInt,
    u16 => USmallInt,
    u32 => UInteger,
    u64 => UBigInt,
    u128 => UHugeInt,
    f32 => Float,
    f64 => Double,
);
