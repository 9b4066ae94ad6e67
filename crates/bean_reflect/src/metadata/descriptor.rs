use alloc::string::String;
use core::fmt;
use std::sync::OnceLock;

use crate::error::{BeanError, BeanResult, InvokeError, ResolutionError, ResolutionKind};
use crate::info::{BeanRef, HopFn, HopMutFn, ReadFn, TypeRef, WriteFn};
use crate::value::{Hop, HopMut, Value};
use crate::Bean;

// -----------------------------------------------------------------------------
// Reader & Writer

/// The reader half of a property.
#[derive(Clone)]
pub struct Reader {
    pub(crate) method: String,
    pub(crate) read: ReadFn,
    pub(crate) hop: Option<HopFn>,
    pub(crate) hop_mut: Option<HopMutFn>,
}

impl Reader {
    /// Name of the reader method, e.g. `getName`.
    #[inline]
    pub fn method(&self) -> &str {
        &self.method
    }

    #[inline]
    pub fn read(&self, bean: &dyn Bean) -> Result<Value, InvokeError> {
        (self.read)(bean)
    }

    /// Borrows the value in place; `None` if the reader cannot lend it.
    #[inline]
    pub fn hop<'a>(&self, bean: &'a dyn Bean) -> Option<Result<Hop<'a>, InvokeError>> {
        self.hop.as_ref().map(|hop| hop(bean))
    }

    #[inline]
    pub fn hop_mut<'a>(&self, bean: &'a mut dyn Bean) -> Option<Result<HopMut<'a>, InvokeError>> {
        self.hop_mut.as_ref().map(|hop_mut| hop_mut(bean))
    }
}

/// The writer half of a property.
#[derive(Clone)]
pub struct Writer {
    pub(crate) method: String,
    pub(crate) write: WriteFn,
}

impl Writer {
    #[inline]
    pub fn method(&self) -> &str {
        &self.method
    }

    #[inline]
    pub fn write(&self, bean: &mut dyn Bean, value: Value) -> Result<(), InvokeError> {
        (self.write)(bean, value)
    }
}

// -----------------------------------------------------------------------------
// PropertyDescriptor

/// One discovered property of a bean type.
///
/// Immutable once built, except that each element type may be filled in
/// once later if it could not be discovered from the signatures.
#[derive(Clone)]
pub struct PropertyDescriptor {
    pub(crate) name: String,
    pub(crate) owner: BeanRef,
    pub(crate) declared: TypeRef,
    pub(crate) element_types: [OnceLock<TypeRef>; 2],
    pub(crate) reader: Option<Reader>,
    pub(crate) writer: Option<Writer>,
    pub(crate) field_backed: bool,
    pub(crate) wrapped: bool,
}

impl PropertyDescriptor {
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn owner(&self) -> BeanRef {
        self.owner
    }

    #[inline]
    pub fn declared(&self) -> &TypeRef {
        &self.declared
    }

    /// Element type `index` (`0` or `1`), if known.
    #[inline]
    pub fn element_type(&self, index: usize) -> Option<&TypeRef> {
        self.element_types.get(index).and_then(OnceLock::get)
    }

    /// Fills element type `index` if it is still unknown.
    ///
    /// Returns the element type in effect afterwards, which is the earlier
    /// one if it was already set.
    pub fn back_fill(&self, index: usize, ty: TypeRef) -> Option<&TypeRef> {
        let slot = self.element_types.get(index)?;
        Some(slot.get_or_init(|| ty))
    }

    #[inline]
    pub fn reader(&self) -> Option<&Reader> {
        self.reader.as_ref()
    }

    #[inline]
    pub fn writer(&self) -> Option<&Writer> {
        self.writer.as_ref()
    }

    #[inline]
    pub fn has_reader(&self) -> bool {
        self.reader.is_some()
    }

    #[inline]
    pub fn has_writer(&self) -> bool {
        self.writer.is_some()
    }

    /// `true` if a stored field of the same name backs the accessors.
    #[inline]
    pub fn is_field_backed(&self) -> bool {
        self.field_backed
    }

    /// `true` for the inner value of a wrapper type.
    #[inline]
    pub fn is_wrapped_data(&self) -> bool {
        self.wrapped
    }

    /// `true` for properties that take part in tree interchange.
    #[inline]
    pub fn is_declared(&self) -> bool {
        self.field_backed || self.wrapped
    }

    /// Reads this property from `bean`.
    pub fn read(&self, bean: &dyn Bean) -> BeanResult<Value> {
        let reader = self.reader.as_ref().ok_or_else(|| self.missing(ResolutionKind::NoReader))?;
        reader
            .read(bean)
            .map_err(|e| BeanError::from_invoke(e, self.owner.type_path(), &self.name))
    }

    /// Writes `value` to `bean` without conversion.
    pub fn write(&self, bean: &mut dyn Bean, value: Value) -> BeanResult<()> {
        let writer = self.writer.as_ref().ok_or_else(|| self.missing(ResolutionKind::NoWriter))?;
        writer
            .write(bean, value)
            .map_err(|e| BeanError::from_invoke(e, self.owner.type_path(), &self.name))
    }

    pub(crate) fn missing(&self, kind: ResolutionKind) -> ResolutionError {
        ResolutionError::new(kind, self.owner.type_path(), self.name.as_str())
    }
}

impl PartialEq for PropertyDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.owner == other.owner
            && self.declared == other.declared
            && self.element_type(0) == other.element_type(0)
            && self.element_type(1) == other.element_type(1)
            && self.has_reader() == other.has_reader()
            && self.has_writer() == other.has_writer()
            && self.field_backed == other.field_backed
            && self.wrapped == other.wrapped
    }
}

impl fmt::Debug for PropertyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDescriptor")
            .field("name", &self.name)
            .field("owner", &self.owner)
            .field("declared", &self.declared)
            .field("element_types", &[self.element_type(0), self.element_type(1)])
            .field("reader", &self.reader.as_ref().map(Reader::method))
            .field("writer", &self.writer.as_ref().map(Writer::method))
            .field("field_backed", &self.field_backed)
            .field("wrapped", &self.wrapped)
            .finish()
    }
}
