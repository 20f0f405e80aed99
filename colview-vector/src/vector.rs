//! A native vector paired with its column descriptor.

use std::fmt;
use std::sync::Arc;

use colview_native::layout::{self, ListEntry};
use colview_native::VectorHandle;
use colview_result::{Error, Result};
use colview_types::{NativePrimitive, ValueKind};
use tracing::trace;

use crate::descriptor::ColumnDescriptor;

/// Read access to one vector: descriptor, raw pointers and row count.
///
/// The vector holds a handle to the native vector, so the pointers stay valid
/// for as long as any clone of the `Vector` (or a converter bound to it) is
/// alive, whether or not the owning chunk has been dropped.
#[derive(Clone)]
pub struct Vector {
    column: ColumnDescriptor,
    data: *const u8,
    validity: *const u64,
    len: usize,
    native: VectorHandle,
}

// SAFETY: the pointers are read-only views into memory owned by `native`,
// which is itself `Send + Sync`, and nothing writes through them.
unsafe impl Send for Vector {}
// SAFETY: see above; all access through `&Vector` is read-only.
unsafe impl Sync for Vector {}

impl fmt::Debug for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vector")
            .field("kind", &self.column.kind())
            .field("storage", &self.column.storage())
            .field("len", &self.len)
            .field("all_valid", &self.validity.is_null())
            .finish()
    }
}

impl Vector {
    /// Describe the first `len` rows of a native vector, asking it for its
    /// type.
    pub fn from_native(native: VectorHandle, len: usize) -> Result<Self> {
        let ty = native.logical_type()?;
        let column = ColumnDescriptor::from_logical_type(ty)?;
        Self::over(native, column, len)
    }

    /// Describe a native vector whose type is already known.
    ///
    /// Fails when the vector's own type differs from `column` or when it has
    /// fewer than `len` rows.
    pub fn with_descriptor(
        native: VectorHandle,
        column: ColumnDescriptor,
        len: usize,
    ) -> Result<Self> {
        let actual = native.logical_type()?;
        if actual != *column.logical_type() {
            return Err(Error::Native(format!(
                "vector holds {actual:?}, expected {:?}",
                column.logical_type()
            )));
        }
        Self::over(native, column, len)
    }

    /// `column` must be the native vector's type.
    fn over(native: VectorHandle, column: ColumnDescriptor, len: usize) -> Result<Self> {
        if len > native.len() {
            return Err(Error::Native(format!(
                "{} vector has {} rows, {len} requested",
                column.kind(),
                native.len()
            )));
        }
        let data = native.data();
        let validity = native.validity();
        Ok(Self {
            column,
            data,
            validity,
            len,
            native,
        })
    }

    #[inline]
    pub fn column(&self) -> &ColumnDescriptor {
        &self.column
    }

    #[inline]
    pub fn kind(&self) -> ValueKind {
        self.column.kind()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn native(&self) -> &VectorHandle {
        &self.native
    }

    /// `true` when the vector has no validity bitmap.
    pub fn all_valid(&self) -> bool {
        self.validity.is_null()
    }

    #[inline]
    pub fn check_index(&self, index: usize) -> Result<()> {
        if index < self.len {
            Ok(())
        } else {
            Err(Error::IndexOutOfRange {
                index,
                len: self.len,
            })
        }
    }

    /// Whether row `index` holds a value.
    #[inline]
    pub fn is_valid(&self, index: usize) -> Result<bool> {
        self.check_index(index)?;
        // SAFETY: index < len and the bitmap covers len rows.
        Ok(unsafe { layout::validity_bit(self.validity, index) })
    }

    /// # Safety
    ///
    /// `index` must be less than `len()`.
    #[inline]
    pub unsafe fn is_valid_unchecked(&self, index: usize) -> bool {
        // SAFETY: forwarded to the caller.
        unsafe { layout::validity_bit(self.validity, index) }
    }

    /// Load slot `index` as a `T`.
    ///
    /// # Safety
    ///
    /// `index` must be less than `len()` and `T` must have the size and bit
    /// validity of the vector's slots.
    #[inline]
    pub unsafe fn read_unchecked<T: Copy>(&self, index: usize) -> T {
        // SAFETY: forwarded to the caller.
        unsafe { layout::read_slot::<T>(self.data, index) }
    }

    /// # Safety
    ///
    /// The vector must be a LIST or MAP vector and `index < len()`.
    #[inline]
    pub unsafe fn list_entry(&self, index: usize) -> ListEntry {
        // SAFETY: forwarded to the caller.
        unsafe { layout::list_entry(self.data, index) }
    }

    /// Payload of a string-like slot, borrowed from the vector.
    ///
    /// # Safety
    ///
    /// The vector must be string-like and `index < len()`.
    #[inline]
    pub unsafe fn string_bytes(&self, index: usize) -> &[u8] {
        // SAFETY: forwarded to the caller; the payload lives as long as the
        // native handle held by `self`.
        unsafe { layout::string_bytes(self.data, index) }
    }

    /// The child vector of a LIST or MAP vector. One native call.
    pub fn list_children(&self) -> Result<Vector> {
        let child = self.native.list_child()?;
        let column = self.column.child()?;
        trace!(kind = %self.kind(), child_len = child.len, "fetched list children");
        Vector::over(child.vector, column, child.len)
    }

    /// The child vector of an ARRAY vector, `len() * size` elements long.
    pub fn array_children(&self) -> Result<Vector> {
        let size = self.column.array_size().ok_or_else(|| {
            Error::InvalidArgumentError(format!("{} vector has no array children", self.kind()))
        })?;
        let child_len = self.len.checked_mul(size).ok_or_else(|| {
            Error::Native(format!("ARRAY of {} rows x {size} overflows", self.len))
        })?;
        let child = self.native.array_child()?;
        let column = self.column.child()?;
        Vector::over(child, column, child_len)
    }

    /// Member vector `index` of a STRUCT or UNION vector (UNION member 0 is
    /// the tag). Members have the parent's row count.
    pub fn struct_member(&self, index: usize) -> Result<Vector> {
        let column = self.column.member(index)?;
        let member = self.native.struct_member(index)?;
        Vector::over(member, column, self.len)
    }

    /// Zero-copy view of a primitive vector's slots.
    ///
    /// Null rows hold unspecified values; consult [`Vector::is_valid`].
    pub fn as_slice<T: NativePrimitive>(&self) -> Result<&[T]> {
        if self.kind() != T::KIND {
            return Err(Error::TypeMismatch {
                declared: self.kind().name(),
                storage: self.column.storage().name(),
                requested: format!("[{}]", T::KIND.name()),
            });
        }
        if self.len == 0 {
            return Ok(&[]);
        }
        if self.data.is_null() || (self.data as usize) % align_of::<T>() != 0 {
            return Err(Error::Native(format!(
                "{} data buffer at {:p} is not aligned for a slice",
                self.kind(),
                self.data
            )));
        }
        // SAFETY: the buffer holds `len` slots of T (kinds match), is aligned
        // and lives as long as `self.native`.
        Ok(unsafe { std::slice::from_raw_parts(self.data.cast::<T>(), self.len) })
    }

    /// Handle identity of the underlying native vector.
    pub fn same_native(&self, other: &Vector) -> bool {
        Arc::ptr_eq(&self.native, &other.native)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use colview_native::MemVector;
    use colview_types::{LogicalType, Value};

    #[test]
    fn validity_and_bounds() {
        let native = MemVector::primitive(&[Some(1i32), None]).into_handle();
        let v = Vector::from_native(native, 2).unwrap();
        assert!(v.is_valid(0).unwrap());
        assert!(!v.is_valid(1).unwrap());
        assert!(matches!(
            v.is_valid(2),
            Err(Error::IndexOutOfRange { index: 2, len: 2 })
        ));
    }

    #[test]
    fn slice_requires_matching_kind() {
        let native = MemVector::primitive(&[Some(1i64), Some(2), Some(3)]).into_handle();
        let v = Vector::from_native(native, 3).unwrap();
        assert_eq!(v.as_slice::<i64>().unwrap(), &[1, 2, 3]);
        assert!(v.as_slice::<u64>().is_err());
    }

    #[test]
    fn array_children_span_all_rows() {
        let ty = LogicalType::array(ValueKind::SmallInt, 2);
        let rows = [
            Value::List(vec![Value::SmallInt(1), Value::SmallInt(2)]),
            Value::List(vec![Value::SmallInt(3), Value::SmallInt(4)]),
        ];
        let native = MemVector::from_values(ty, &rows).unwrap().into_handle();
        let v = Vector::from_native(native, 2).unwrap();
        let children = v.array_children().unwrap();
        assert_eq!(children.len(), 4);
        assert_eq!(children.as_slice::<i16>().unwrap(), &[1, 2, 3, 4]);
    }

    #[test]
    fn row_count_cannot_exceed_native_length() {
        let native = MemVector::primitive(&[Some(1i32)]).into_handle();
        assert!(matches!(
            Vector::from_native(Arc::clone(&native), (1 << 29) + 12_345),
            Err(Error::Native(_))
        ));
        let column = ColumnDescriptor::from_logical_type(ValueKind::Integer.into()).unwrap();
        assert!(matches!(
            Vector::with_descriptor(Arc::clone(&native), column.clone(), 2),
            Err(Error::Native(_))
        ));
        assert_eq!(Vector::with_descriptor(native, column, 1).unwrap().len(), 1);
    }

    #[test]
    fn descriptor_must_match_native_type() {
        let native = MemVector::primitive(&[Some(1u8)]).into_handle();
        let wide = ColumnDescriptor::from_logical_type(ValueKind::HugeInt.into()).unwrap();
        assert!(matches!(
            Vector::with_descriptor(native, wide, 1),
            Err(Error::Native(_))
        ));
    }

    #[test]
    fn vector_outlives_its_handle_owner() {
        let native = MemVector::primitive(&[Some(9u16)]).into_handle();
        let v = Vector::from_native(Arc::clone(&native), 1).unwrap();
        drop(native);
        assert_eq!(unsafe { v.read_unchecked::<u16>(0) }, 9);
    }
}
