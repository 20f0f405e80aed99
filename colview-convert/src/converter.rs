//! Converters: per-element readers from a vector into a host type.
//!
//! A converter is either *closed* (ready to read any vector of its source
//! kind) or *unbound* (a plan that still needs per-vector state, such as the
//! child vector of a list). Plans are resolved once per (column, target) and
//! bound once per vector.

use std::fmt;
use std::sync::Arc;

use colview_result::{Error, Result};
use colview_types::{HostType, StorageKind, ValueKind};
use colview_vector::{ColumnDescriptor, Vector};
use tracing::trace;

use crate::host::HostValue;

/// Reads element `index` of a vector.
///
/// # Safety
///
/// Callers guarantee that `index < vector.len()`, that the element is valid
/// and that the vector has the source kind the function was resolved for.
pub type ReadFn<T> = unsafe fn(&Vector, usize) -> Result<T>;

/// Like [`ReadFn`], with access to plan state.
pub type StateFn<S, T> = unsafe fn(&S, &Vector, usize) -> Result<T>;

/// A stateful element reader.
pub trait ElementReader<T>: Send + Sync {
    /// # Safety
    ///
    /// Same contract as [`ReadFn`].
    unsafe fn read(&self, vector: &Vector, index: usize) -> Result<T>;
}

/// Produces the reader for one concrete vector.
pub trait Binder<T>: Send + Sync {
    fn bind(&self, vector: &Vector) -> Result<Arc<dyn ElementReader<T>>>;
}

enum Reader<T> {
    Plain(ReadFn<T>),
    Stateful(Arc<dyn ElementReader<T>>),
}

impl<T> Clone for Reader<T> {
    fn clone(&self) -> Self {
        match self {
            Reader::Plain(f) => Reader::Plain(*f),
            Reader::Stateful(r) => Reader::Stateful(Arc::clone(r)),
        }
    }
}

impl<T> Reader<T> {
    #[inline]
    unsafe fn read(&self, vector: &Vector, index: usize) -> Result<T> {
        // SAFETY: forwarded from the caller.
        unsafe {
            match self {
                Reader::Plain(f) => f(vector, index),
                Reader::Stateful(r) => r.read(vector, index),
            }
        }
    }
}

enum State<T> {
    Closed(Reader<T>),
    Unbound(Arc<dyn Binder<T>>),
}

impl<T> Clone for State<T> {
    fn clone(&self) -> Self {
        match self {
            State::Closed(r) => State::Closed(r.clone()),
            State::Unbound(b) => State::Unbound(Arc::clone(b)),
        }
    }
}

struct StateReader<S, T> {
    state: S,
    read: StateFn<S, T>,
}

impl<S: Send + Sync, T> ElementReader<T> for StateReader<S, T> {
    #[inline]
    unsafe fn read(&self, vector: &Vector, index: usize) -> Result<T> {
        // SAFETY: forwarded from the caller.
        unsafe { (self.read)(&self.state, vector, index) }
    }
}

type MapFn<T, U> = Arc<dyn Fn(T) -> Result<U> + Send + Sync>;

struct MappedReader<T, U> {
    inner: Reader<T>,
    f: MapFn<T, U>,
}

impl<T, U> ElementReader<U> for MappedReader<T, U> {
    #[inline]
    unsafe fn read(&self, vector: &Vector, index: usize) -> Result<U> {
        // SAFETY: forwarded from the caller.
        let value = unsafe { self.inner.read(vector, index) }?;
        (self.f)(value)
    }
}

struct MappedBinder<T, U> {
    inner: Arc<dyn Binder<T>>,
    f: MapFn<T, U>,
}

impl<T: 'static, U: 'static> Binder<U> for MappedBinder<T, U> {
    fn bind(&self, vector: &Vector) -> Result<Arc<dyn ElementReader<U>>> {
        let inner = self.inner.bind(vector)?;
        Ok(Arc::new(MappedReader {
            inner: Reader::Stateful(inner),
            f: Arc::clone(&self.f),
        }))
    }
}

/// Converter from elements of one column kind into `T`.
pub struct Converter<T> {
    target: HostType,
    kind: ValueKind,
    storage: StorageKind,
    default_is_invalid: bool,
    state: State<T>,
}

impl<T> Clone for Converter<T> {
    fn clone(&self) -> Self {
        Self {
            target: self.target.clone(),
            kind: self.kind,
            storage: self.storage,
            default_is_invalid: self.default_is_invalid,
            state: self.state.clone(),
        }
    }
}

impl<T: 'static> fmt::Debug for Converter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converter")
            .field("target", &self.target)
            .field("source", &self.kind)
            .field("default_is_invalid", &self.default_is_invalid)
            .field("bound", &self.is_bound())
            .finish()
    }
}

impl<T: HostValue> Converter<T> {
    /// Stateful converter: `read` receives `state` on every call.
    ///
    /// `default_is_invalid` is forced on when `T` can represent a missing
    /// value.
    pub fn create<S>(
        column: &ColumnDescriptor,
        state: S,
        read: StateFn<S, T>,
        default_is_invalid: bool,
    ) -> Self
    where
        S: Send + Sync + 'static,
    {
        Self::from_state(
            column,
            State::Closed(Reader::Stateful(Arc::new(StateReader { state, read }))),
            default_is_invalid || T::REPRESENTS_MISSING,
        )
    }

    /// Converter backed by a plain function.
    pub fn stateless(column: &ColumnDescriptor, read: ReadFn<T>) -> Self {
        Self::from_state(
            column,
            State::Closed(Reader::Plain(read)),
            T::REPRESENTS_MISSING,
        )
    }

    /// Converter whose reader is produced per vector by `binder`.
    pub fn unbound<B>(column: &ColumnDescriptor, binder: B, default_is_invalid: bool) -> Self
    where
        B: Binder<T> + 'static,
    {
        Self::from_state(
            column,
            State::Unbound(Arc::new(binder)),
            default_is_invalid || T::REPRESENTS_MISSING,
        )
    }

    /// Read element `index` and, if it is missing, apply the null policy:
    /// with `require_valid` a target that cannot represent absence fails with
    /// [`Error::NullViolation`]; otherwise the missing value is `T::missing()`.
    #[inline]
    pub fn convert(&self, vector: &Vector, index: usize, require_valid: bool) -> Result<T> {
        match self.try_convert(vector, index)? {
            Some(value) => Ok(value),
            None if require_valid && !self.default_is_invalid => {
                Err(Error::null_violation(index, &self.target))
            }
            None => Ok(T::missing()),
        }
    }

    fn from_state(column: &ColumnDescriptor, state: State<T>, default_is_invalid: bool) -> Self {
        Self {
            target: T::host_type(),
            kind: column.kind(),
            storage: column.storage(),
            default_is_invalid,
            state,
        }
    }

    /// Lift into a converter for a host type that wraps `T`.
    pub fn map<U, F>(self, f: F) -> Converter<U>
    where
        U: HostValue,
        F: Fn(T) -> Result<U> + Send + Sync + 'static,
    {
        self.map_with(f, U::host_type(), U::REPRESENTS_MISSING)
    }
}

impl<T: 'static> Converter<T> {
    /// The host type this converter produces.
    pub fn target(&self) -> &HostType {
        &self.target
    }

    pub fn source_kind(&self) -> ValueKind {
        self.kind
    }

    /// Whether a missing element converts to the default rather than failing.
    pub fn default_is_invalid(&self) -> bool {
        self.default_is_invalid
    }

    /// `false` while the converter still needs [`Converter::bind_to_vector`].
    pub fn is_bound(&self) -> bool {
        matches!(self.state, State::Closed(_))
    }

    /// Run the binder against `vector`, producing a closed converter.
    ///
    /// Fails with [`Error::AlreadyBound`] on a converter that is already closed.
    pub fn bind_to_vector(&self, vector: &Vector) -> Result<Converter<T>> {
        match &self.state {
            State::Closed(_) => Err(Error::AlreadyBound {
                target: self.target.to_string(),
            }),
            State::Unbound(binder) => {
                self.check_source(vector)?;
                trace!(target = %self.target, kind = %self.kind, "binding converter");
                let reader = binder.bind(vector)?;
                Ok(Converter {
                    target: self.target.clone(),
                    kind: self.kind,
                    storage: self.storage,
                    default_is_invalid: self.default_is_invalid,
                    state: State::Closed(Reader::Stateful(reader)),
                })
            }
        }
    }

    /// A closed converter for `vector`: binds plans, clones closed converters.
    pub fn prepare(&self, vector: &Vector) -> Result<Converter<T>> {
        if self.is_bound() {
            Ok(self.clone())
        } else {
            self.bind_to_vector(vector)
        }
    }

    /// Read element `index`; `None` when the validity bit is clear. The read
    /// function is not invoked for missing elements.
    #[inline]
    pub fn try_convert(&self, vector: &Vector, index: usize) -> Result<Option<T>> {
        let reader = match &self.state {
            State::Closed(reader) => reader,
            State::Unbound(_) => {
                return Err(Error::NotBound {
                    target: self.target.to_string(),
                });
            }
        };
        self.check_source(vector)?;
        if !vector.is_valid(index)? {
            return Ok(None);
        }
        // SAFETY: the index is in range, the element is valid and the vector
        // has the kind this converter was resolved for.
        unsafe { reader.read(vector, index) }.map(Some)
    }

    /// Wrap with `f`, declaring the produced host type and null policy.
    pub fn map_with<U, F>(self, f: F, target: HostType, default_is_invalid: bool) -> Converter<U>
    where
        U: 'static,
        F: Fn(T) -> Result<U> + Send + Sync + 'static,
    {
        let f: MapFn<T, U> = Arc::new(f);
        let state = match self.state {
            State::Closed(inner) => {
                State::Closed(Reader::Stateful(Arc::new(MappedReader { inner, f })))
            }
            State::Unbound(inner) => State::Unbound(Arc::new(MappedBinder { inner, f })),
        };
        Converter {
            target,
            kind: self.kind,
            storage: self.storage,
            default_is_invalid,
            state,
        }
    }

    /// Replace the declared target and null policy, keeping the reader.
    pub(crate) fn retarget(mut self, target: HostType, default_is_invalid: bool) -> Self {
        self.target = target;
        self.default_is_invalid = default_is_invalid;
        self
    }

    #[inline]
    fn check_source(&self, vector: &Vector) -> Result<()> {
        let column = vector.column();
        if column.kind() == self.kind && column.storage() == self.storage {
            Ok(())
        } else {
            Err(Error::TypeMismatch {
                declared: column.kind().name(),
                storage: column.storage().name(),
                requested: format!("{} (converter resolved for {})", self.target, self.kind),
            })
        }
    }
}
