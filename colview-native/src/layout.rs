//! Raw slot layouts of engine vectors.
//!
//! Readers take the data and validity pointers handed out by a
//! [`NativeVector`](crate::NativeVector) and decode single slots. None of the
//! read functions check bounds; callers validate indices against the row count
//! first.

use colview_result::{Error, Result};

/// Size of a VARCHAR/BLOB/BIT/VARINT slot.
pub const STRING_REF_SIZE: usize = 16;
/// Longest payload stored inside the slot itself.
pub const STRING_INLINE_LEN: usize = 12;
/// Bytes of the payload repeated in the slot when it is stored out of line.
pub const STRING_PREFIX_LEN: usize = 4;
/// Size of a LIST/MAP slot.
pub const LIST_ENTRY_SIZE: usize = 16;
pub const VALIDITY_WORD_BITS: usize = 64;

/// A LIST or MAP slot: the row's span in the child vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(C)]
pub struct ListEntry {
    pub offset: u64,
    pub length: u64,
}

impl ListEntry {
    pub const fn new(offset: u64, length: u64) -> Self {
        Self { offset, length }
    }

    /// Exclusive end of the span, `None` on overflow.
    pub fn end(self) -> Option<u64> {
        self.offset.checked_add(self.length)
    }

    pub fn to_slot(self) -> [u8; LIST_ENTRY_SIZE] {
        let mut slot = [0u8; LIST_ENTRY_SIZE];
        slot[..8].copy_from_slice(&self.offset.to_ne_bytes());
        slot[8..].copy_from_slice(&self.length.to_ne_bytes());
        slot
    }
}

/// Number of `u64` words a validity bitmap needs for `rows` rows.
#[inline]
pub const fn validity_words(rows: usize) -> usize {
    rows.div_ceil(VALIDITY_WORD_BITS)
}

/// Test the validity bit of `index`. A null bitmap means every row is valid.
///
/// # Safety
///
/// A non-null `validity` must point to at least `validity_words(index + 1)`
/// readable words.
#[inline]
pub unsafe fn validity_bit(validity: *const u64, index: usize) -> bool {
    if validity.is_null() {
        return true;
    }
    // SAFETY: the caller guarantees the word holding `index` is readable.
    let word = unsafe { validity.add(index / VALIDITY_WORD_BITS).read_unaligned() };
    word & (1u64 << (index % VALIDITY_WORD_BITS)) != 0
}

/// Set or clear the validity bit of `index` in an owned bitmap.
#[inline]
pub fn set_validity_bit(words: &mut [u64], index: usize, valid: bool) {
    let mask = 1u64 << (index % VALIDITY_WORD_BITS);
    let word = &mut words[index / VALIDITY_WORD_BITS];
    if valid {
        *word |= mask;
    } else {
        *word &= !mask;
    }
}

/// Load slot `index` of a buffer of `T`-sized slots.
///
/// # Safety
///
/// `data` must point to at least `(index + 1) * size_of::<T>()` readable bytes
/// and those bytes must be a valid `T`.
#[inline]
pub unsafe fn read_slot<T: Copy>(data: *const u8, index: usize) -> T {
    // SAFETY: bounds are the caller's contract; the load tolerates any alignment.
    unsafe {
        data.add(index * size_of::<T>())
            .cast::<T>()
            .read_unaligned()
    }
}

/// # Safety
///
/// `data` must be the data buffer of a LIST or MAP vector with more than
/// `index` rows.
#[inline]
pub unsafe fn list_entry(data: *const u8, index: usize) -> ListEntry {
    // SAFETY: ListEntry is two plain u64s; bounds are the caller's contract.
    unsafe { read_slot::<ListEntry>(data, index) }
}

/// Payload bytes of a string-reference slot.
///
/// # Safety
///
/// `data` must be the data buffer of a string-like vector with more than
/// `index` rows, and the returned slice must not outlive that buffer (or the
/// out-of-line payload it points to).
#[inline]
pub unsafe fn string_bytes<'a>(data: *const u8, index: usize) -> &'a [u8] {
    // SAFETY: every step stays inside slot `index`, which the caller
    // guarantees exists; out-of-line payloads are owned by the vector.
    unsafe {
        let slot = data.add(index * STRING_REF_SIZE);
        let len = slot.cast::<u32>().read_unaligned() as usize;
        if len <= STRING_INLINE_LEN {
            std::slice::from_raw_parts(slot.add(4), len)
        } else {
            let ptr = slot.add(8).cast::<*const u8>().read_unaligned();
            std::slice::from_raw_parts(ptr, len)
        }
    }
}

/// Build the string-reference slot for `bytes`.
///
/// Payloads longer than [`STRING_INLINE_LEN`] are referenced by address, so
/// `bytes` must stay at a stable address for as long as the slot is read.
pub fn encode_string_ref(bytes: &[u8]) -> Result<[u8; STRING_REF_SIZE]> {
    let len = u32::try_from(bytes.len()).map_err(|_| {
        Error::InvalidArgumentError(format!(
            "string payload of {} bytes exceeds the slot length field",
            bytes.len()
        ))
    })?;
    let mut slot = [0u8; STRING_REF_SIZE];
    slot[..4].copy_from_slice(&len.to_ne_bytes());
    if bytes.len() <= STRING_INLINE_LEN {
        slot[4..4 + bytes.len()].copy_from_slice(bytes);
    } else {
        slot[4..4 + STRING_PREFIX_LEN].copy_from_slice(&bytes[..STRING_PREFIX_LEN]);
        let addr = (bytes.as_ptr() as usize).to_ne_bytes();
        slot[8..8 + addr.len()].copy_from_slice(&addr);
    }
    Ok(slot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_and_out_of_line_strings() {
        let short = b"hello";
        let long: Box<[u8]> = b"a string longer than twelve bytes".to_vec().into_boxed_slice();

        let mut data = Vec::new();
        data.extend_from_slice(&encode_string_ref(short).unwrap());
        data.extend_from_slice(&encode_string_ref(&long).unwrap());

        unsafe {
            assert_eq!(string_bytes(data.as_ptr(), 0), short);
            assert_eq!(string_bytes(data.as_ptr(), 1), &long[..]);
        }
        assert_eq!(&data[20..24], b"a st");
    }

    #[test]
    fn validity_bits() {
        let mut words = vec![u64::MAX; validity_words(130)];
        assert_eq!(words.len(), 3);
        set_validity_bit(&mut words, 65, false);
        unsafe {
            assert!(validity_bit(words.as_ptr(), 64));
            assert!(!validity_bit(words.as_ptr(), 65));
            assert!(validity_bit(std::ptr::null(), 1_000));
        }
    }

    #[test]
    fn list_entry_slot() {
        let slot = ListEntry::new(3, 4).to_slot();
        let entry = unsafe { list_entry(slot.as_ptr(), 0) };
        assert_eq!(entry, ListEntry::new(3, 4));
        assert_eq!(ListEntry::new(u64::MAX, 1).end(), None);
    }
}
