//! In-memory engine.
//!
//! [`MemVector`] owns buffers laid out exactly like the engine's vectors, so
//! readers exercised against it read the same bytes they would read from the
//! engine. Used by tests, benchmarks and the Arrow bridge.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use colview_result::{Error, Result};
use colview_types::{LogicalType, NativePrimitive, ValueKind};

use crate::layout::{self, ListEntry, STRING_REF_SIZE};
use crate::{ChildVector, ChunkHandle, NativeChunk, NativeResult, NativeVector, VectorHandle};

mod encode;

/// Byte buffer backed by `u128` words so every slot kind is naturally aligned.
#[derive(Debug, Default)]
struct SlotBuffer {
    words: Vec<u128>,
    len: usize,
}

impl SlotBuffer {
    fn zeroed(len: usize) -> Self {
        Self {
            words: vec![0; len.div_ceil(16)],
            len,
        }
    }

    fn from_bytes(bytes: &[u8]) -> Self {
        let mut buf = Self::zeroed(bytes.len());
        buf.bytes_mut().copy_from_slice(bytes);
        buf
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        // SAFETY: the words cover at least `len` bytes, u8 has alignment 1 and
        // every bit pattern is a valid u128.
        unsafe { std::slice::from_raw_parts_mut(self.words.as_mut_ptr().cast::<u8>(), self.len) }
    }

    fn as_ptr(&self) -> *const u8 {
        self.words.as_ptr().cast::<u8>()
    }
}

/// An engine-layout vector held in process memory.
pub struct MemVector {
    ty: LogicalType,
    len: usize,
    data: SlotBuffer,
    validity: Option<Vec<u64>>,
    /// Out-of-line string payloads; boxed so their addresses stay put.
    heap: Vec<Box<[u8]>>,
    children: Vec<VectorHandle>,
    list_child_len: usize,
}

impl MemVector {
    fn empty(ty: LogicalType, len: usize, validity: Option<Vec<u64>>) -> Result<Self> {
        ty.validate()?;
        let words = validity.as_ref().map_or(usize::MAX, Vec::len);
        if words < layout::validity_words(len) {
            return Err(Error::InvalidArgumentError(format!(
                "validity bitmap of {words} words is too short for {len} rows"
            )));
        }
        Ok(Self {
            ty,
            len,
            data: SlotBuffer::default(),
            validity,
            heap: Vec::new(),
            children: Vec::new(),
            list_child_len: 0,
        })
    }

    /// Build a vector of `T` slots; `None` entries are null.
    pub fn primitive<T: NativePrimitive>(values: &[Option<T>]) -> Self {
        let width = size_of::<T>();
        let mut data = SlotBuffer::zeroed(values.len() * width);
        let bytes = data.bytes_mut();
        for (i, value) in values.iter().enumerate() {
            if let Some(value) = value {
                // SAFETY: slot `i` lies inside the buffer; numeric primitives
                // have no padding bytes.
                unsafe {
                    bytes
                        .as_mut_ptr()
                        .add(i * width)
                        .cast::<T>()
                        .write_unaligned(*value)
                };
            }
        }
        Self {
            ty: LogicalType::Scalar(T::KIND),
            len: values.len(),
            data,
            validity: validity_from(values.iter().map(Option::is_some)),
            heap: Vec::new(),
            children: Vec::new(),
            list_child_len: 0,
        }
    }

    pub fn booleans(values: &[Option<bool>]) -> Self {
        let bytes: Vec<u8> = values
            .iter()
            .map(|v| u8::from(v.unwrap_or(false)))
            .collect();
        Self {
            ty: LogicalType::Scalar(ValueKind::Boolean),
            len: values.len(),
            data: SlotBuffer::from_bytes(&bytes),
            validity: validity_from(values.iter().map(Option::is_some)),
            heap: Vec::new(),
            children: Vec::new(),
            list_child_len: 0,
        }
    }

    pub fn varchars(values: &[Option<&str>]) -> Result<Self> {
        let payloads: Vec<Option<&[u8]>> = values.iter().map(|v| v.map(str::as_bytes)).collect();
        Self::from_strings(ValueKind::Varchar.into(), &payloads)
    }

    /// Fixed-width vector from raw slot bytes (`len * slot_width` bytes).
    pub fn from_slots(
        ty: LogicalType,
        len: usize,
        slots: &[u8],
        validity: Option<Vec<u64>>,
    ) -> Result<Self> {
        let storage = ty.storage_kind();
        let width = match storage.slot_width() {
            Some(width) if !storage.is_string_like() && !storage.is_nested() => width,
            _ => {
                return Err(Error::InvalidArgumentError(format!(
                    "{} vectors are not built from fixed-width slots",
                    ty.kind()
                )));
            }
        };
        if slots.len() != len * width {
            return Err(Error::InvalidArgumentError(format!(
                "{} slots for {len} rows need {} bytes, got {}",
                ty.kind(),
                len * width,
                slots.len()
            )));
        }
        let mut vector = Self::empty(ty, len, validity)?;
        vector.data = SlotBuffer::from_bytes(slots);
        Ok(vector)
    }

    /// String-like vector (VARCHAR, BLOB, BIT, VARINT) from raw payloads.
    pub fn from_strings(ty: LogicalType, values: &[Option<&[u8]>]) -> Result<Self> {
        if !ty.kind().is_string_like() {
            return Err(Error::InvalidArgumentError(format!(
                "{} is not a string-like type",
                ty.kind()
            )));
        }
        let validity = validity_from(values.iter().map(Option::is_some));
        let mut vector = Self::empty(ty, values.len(), validity)?;
        let mut data = SlotBuffer::zeroed(values.len() * STRING_REF_SIZE);
        let bytes = data.bytes_mut();
        for (i, value) in values.iter().enumerate() {
            let Some(payload) = value else { continue };
            let slot = if payload.len() > layout::STRING_INLINE_LEN {
                let owned: Box<[u8]> = payload.to_vec().into_boxed_slice();
                let slot = layout::encode_string_ref(&owned)?;
                vector.heap.push(owned);
                slot
            } else {
                layout::encode_string_ref(payload)?
            };
            bytes[i * STRING_REF_SIZE..(i + 1) * STRING_REF_SIZE].copy_from_slice(&slot);
        }
        vector.data = data;
        Ok(vector)
    }

    /// LIST or MAP vector from its entries and child vector.
    ///
    /// Entries are stored as given, out-of-range spans included.
    pub fn from_list_parts(
        ty: LogicalType,
        entries: &[ListEntry],
        validity: Option<Vec<u64>>,
        child: VectorHandle,
        child_len: usize,
    ) -> Result<Self> {
        if !matches!(ty.kind(), ValueKind::List | ValueKind::Map) {
            return Err(Error::InvalidArgumentError(format!(
                "{} vectors have no list entries",
                ty.kind()
            )));
        }
        if child_len > child.len() {
            return Err(Error::InvalidArgumentError(format!(
                "child length {child_len} exceeds the child vector's {} rows",
                child.len()
            )));
        }
        let mut vector = Self::empty(ty, entries.len(), validity)?;
        let mut data = SlotBuffer::zeroed(entries.len() * layout::LIST_ENTRY_SIZE);
        let bytes = data.bytes_mut();
        for (i, entry) in entries.iter().enumerate() {
            bytes[i * layout::LIST_ENTRY_SIZE..(i + 1) * layout::LIST_ENTRY_SIZE]
                .copy_from_slice(&entry.to_slot());
        }
        vector.data = data;
        vector.children = vec![child];
        vector.list_child_len = child_len;
        Ok(vector)
    }

    /// ARRAY vector over a child of `len * size` elements.
    pub fn from_array_parts(
        ty: LogicalType,
        len: usize,
        validity: Option<Vec<u64>>,
        child: VectorHandle,
    ) -> Result<Self> {
        if ty.kind() != ValueKind::Array {
            return Err(Error::InvalidArgumentError(format!(
                "{} is not an ARRAY type",
                ty.kind()
            )));
        }
        let mut vector = Self::empty(ty, len, validity)?;
        vector.children = vec![child];
        Ok(vector)
    }

    /// STRUCT vector, or UNION vector whose first member is the tag.
    pub fn from_struct_parts(
        ty: LogicalType,
        len: usize,
        validity: Option<Vec<u64>>,
        members: Vec<VectorHandle>,
    ) -> Result<Self> {
        let expected = match &ty {
            LogicalType::Struct(fields) => fields.len(),
            LogicalType::Union(alternatives) => alternatives.len() + 1,
            other => {
                return Err(Error::InvalidArgumentError(format!(
                    "{} vectors have no members",
                    other.kind()
                )));
            }
        };
        if members.len() != expected {
            return Err(Error::InvalidArgumentError(format!(
                "{} type has {expected} member vectors, got {}",
                ty.kind(),
                members.len()
            )));
        }
        let mut vector = Self::empty(ty, len, validity)?;
        vector.children = members;
        Ok(vector)
    }

    /// SQL NULL vector: no data, every row invalid.
    pub fn nulls(len: usize) -> Self {
        Self {
            ty: LogicalType::Scalar(ValueKind::SqlNull),
            len,
            data: SlotBuffer::default(),
            validity: Some(vec![0; layout::validity_words(len)]),
            heap: Vec::new(),
            children: Vec::new(),
            list_child_len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn ty(&self) -> &LogicalType {
        &self.ty
    }

    pub fn into_handle(self) -> VectorHandle {
        Arc::new(self)
    }
}

impl fmt::Debug for MemVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemVector")
            .field("ty", &self.ty)
            .field("len", &self.len)
            .field("children", &self.children.len())
            .finish_non_exhaustive()
    }
}

/// Bitmap for the given validity flags, or `None` when all are valid.
fn validity_from<I: IntoIterator<Item = bool>>(flags: I) -> Option<Vec<u64>> {
    let flags: Vec<bool> = flags.into_iter().collect();
    if flags.iter().all(|&valid| valid) {
        return None;
    }
    let mut words = vec![u64::MAX; layout::validity_words(flags.len())];
    for (i, valid) in flags.into_iter().enumerate() {
        if !valid {
            layout::set_validity_bit(&mut words, i, false);
        }
    }
    Some(words)
}

// SAFETY: the data buffer holds `len` slots of the storage kind, long string
// payloads live in `heap` for the vector's lifetime and the bitmap covers
// `len` rows.
unsafe impl NativeVector for MemVector {
    fn logical_type(&self) -> Result<LogicalType> {
        Ok(self.ty.clone())
    }

    fn len(&self) -> usize {
        self.len
    }

    fn data(&self) -> *const u8 {
        self.data.as_ptr()
    }

    fn validity(&self) -> *const u64 {
        self.validity
            .as_ref()
            .map_or(std::ptr::null(), |words| words.as_ptr())
    }

    fn list_child(&self) -> Result<ChildVector> {
        match (self.ty.kind(), self.children.first()) {
            (ValueKind::List | ValueKind::Map, Some(child)) => Ok(ChildVector {
                vector: Arc::clone(child),
                len: self.list_child_len,
            }),
            (kind, _) => Err(Error::Native(format!("{kind} vector has no list child"))),
        }
    }

    fn array_child(&self) -> Result<VectorHandle> {
        match (self.ty.kind(), self.children.first()) {
            (ValueKind::Array, Some(child)) => Ok(Arc::clone(child)),
            (kind, _) => Err(Error::Native(format!("{kind} vector has no array child"))),
        }
    }

    fn struct_member(&self, index: usize) -> Result<VectorHandle> {
        match self.ty.kind() {
            ValueKind::Struct | ValueKind::Union => {
                self.children.get(index).cloned().ok_or_else(|| {
                    Error::Native(format!(
                        "member {index} out of range for {} members",
                        self.children.len()
                    ))
                })
            }
            kind => Err(Error::Native(format!("{kind} vector has no members"))),
        }
    }
}

/// A chunk of in-memory vectors.
pub struct MemChunk {
    rows: usize,
    columns: Vec<VectorHandle>,
}

impl MemChunk {
    /// All columns must have the same length.
    pub fn new(columns: Vec<MemVector>) -> Result<Self> {
        let rows = columns.first().map_or(0, MemVector::len);
        if let Some((i, bad)) = columns.iter().enumerate().find(|(_, c)| c.len() != rows) {
            return Err(Error::InvalidArgumentError(format!(
                "column {i} has {} rows, expected {rows}",
                bad.len()
            )));
        }
        Ok(Self {
            rows,
            columns: columns.into_iter().map(MemVector::into_handle).collect(),
        })
    }

    /// Chunk over arbitrary native vectors, each exactly `rows` long.
    pub fn from_handles(rows: usize, columns: Vec<VectorHandle>) -> Result<Self> {
        if let Some((i, bad)) = columns.iter().enumerate().find(|(_, c)| c.len() != rows) {
            return Err(Error::InvalidArgumentError(format!(
                "column {i} has {} rows, expected {rows}",
                bad.len()
            )));
        }
        Ok(Self { rows, columns })
    }

    pub fn into_handle(self) -> ChunkHandle {
        Arc::new(self)
    }
}

impl NativeChunk for MemChunk {
    fn row_count(&self) -> usize {
        self.rows
    }

    fn column_count(&self) -> usize {
        self.columns.len()
    }

    fn vector(&self, index: usize) -> Result<VectorHandle> {
        self.columns
            .get(index)
            .cloned()
            .ok_or(Error::IndexOutOfRange {
                index,
                len: self.columns.len(),
            })
    }
}

/// A result over a fixed list of chunks.
pub struct MemResult {
    columns: Vec<(String, LogicalType)>,
    chunks: VecDeque<ChunkHandle>,
}

impl MemResult {
    pub fn new(columns: Vec<(String, LogicalType)>) -> Self {
        Self {
            columns,
            chunks: VecDeque::new(),
        }
    }

    /// One-chunk result; the schema is taken from the vectors.
    pub fn single<S: Into<String>>(columns: Vec<(S, MemVector)>) -> Result<Self> {
        let (names, vectors): (Vec<String>, Vec<MemVector>) = columns
            .into_iter()
            .map(|(name, vector)| (name.into(), vector))
            .unzip();
        let schema = names
            .into_iter()
            .zip(vectors.iter().map(|v| v.ty().clone()))
            .collect();
        let mut result = Self::new(schema);
        result.push_chunk(MemChunk::new(vectors)?)?;
        Ok(result)
    }

    pub fn push_chunk<C: NativeChunk + 'static>(&mut self, chunk: C) -> Result<()> {
        if chunk.column_count() != self.columns.len() {
            return Err(Error::InvalidArgumentError(format!(
                "chunk has {} columns, result has {}",
                chunk.column_count(),
                self.columns.len()
            )));
        }
        for (i, (name, expected)) in self.columns.iter().enumerate() {
            let vector = chunk.vector(i)?;
            if vector.len() != chunk.row_count() {
                return Err(Error::InvalidArgumentError(format!(
                    "column {name} has {} rows, chunk has {}",
                    vector.len(),
                    chunk.row_count()
                )));
            }
            let actual = vector.logical_type()?;
            if actual != *expected {
                return Err(Error::InvalidArgumentError(format!(
                    "column {name} has type {actual:?}, result declares {expected:?}"
                )));
            }
        }
        self.chunks.push_back(Arc::new(chunk));
        Ok(())
    }

    pub fn with_chunk<C: NativeChunk + 'static>(mut self, chunk: C) -> Result<Self> {
        self.push_chunk(chunk)?;
        Ok(self)
    }

    fn column(&self, index: usize) -> Result<&(String, LogicalType)> {
        self.columns.get(index).ok_or(Error::IndexOutOfRange {
            index,
            len: self.columns.len(),
        })
    }
}

impl NativeResult for MemResult {
    fn column_count(&self) -> usize {
        self.columns.len()
    }

    fn column_name(&self, index: usize) -> Result<String> {
        self.column(index).map(|(name, _)| name.clone())
    }

    fn column_type(&self, index: usize) -> Result<LogicalType> {
        self.column(index).map(|(_, ty)| ty.clone())
    }

    fn fetch_chunk(&mut self) -> Result<Option<ChunkHandle>> {
        Ok(self.chunks.pop_front())
    }
}
