use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::TypeId;
use core::fmt;
use core::hash::{Hash, Hasher};

use crate::info::{EnumShape, TypeShape};

// -----------------------------------------------------------------------------
// ScalarKind

/// Leaf value kinds handled by the scalar converters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScalarKind {
    Bool,
    Char,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    Decimal,
    Date,
    String,
}

impl ScalarKind {
    pub const ALL: [ScalarKind; 11] = [
        Self::Bool,
        Self::Char,
        Self::I8,
        Self::I16,
        Self::I32,
        Self::I64,
        Self::F32,
        Self::F64,
        Self::Decimal,
        Self::Date,
        Self::String,
    ];

    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Char => "char",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Decimal => "Decimal",
            Self::Date => "DateTime",
            Self::String => "String",
        }
    }

    #[inline]
    pub const fn is_integer(self) -> bool {
        matches!(self, Self::I8 | Self::I16 | Self::I32 | Self::I64)
    }

    #[inline]
    pub const fn is_number(self) -> bool {
        self.is_integer() || matches!(self, Self::F32 | Self::F64 | Self::Decimal)
    }
}

// -----------------------------------------------------------------------------
// CollectionKind

/// Ordered-container kinds. The abstract kinds map to a concrete one when
/// a container is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    Collection,
    List,
    Set,
    Queue,
    Deque,
}

impl CollectionKind {
    /// Returns the kind actually instantiated for `self`.
    ///
    /// ```
    /// use bean_reflect::info::CollectionKind;
    ///
    /// assert_eq!(CollectionKind::Collection.concrete(), CollectionKind::List);
    /// assert_eq!(CollectionKind::Queue.concrete(), CollectionKind::Deque);
    /// assert_eq!(CollectionKind::Set.concrete(), CollectionKind::Set);
    /// ```
    #[inline]
    pub const fn concrete(self) -> Self {
        match self {
            Self::Collection | Self::List => Self::List,
            Self::Queue | Self::Deque => Self::Deque,
            Self::Set => Self::Set,
        }
    }

    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Collection => "Collection",
            Self::List => "List",
            Self::Set => "Set",
            Self::Queue => "Queue",
            Self::Deque => "Deque",
        }
    }
}

// -----------------------------------------------------------------------------
// BeanRef & EnumRef

/// A handle to a bean type.
///
/// The shape is reached through a function pointer, so a handle can be
/// created while the shape itself is still being built (self-nesting types).
/// Equality and hashing use the [`TypeId`] only.
#[derive(Clone, Copy)]
pub struct BeanRef {
    id: TypeId,
    path: &'static str,
    shape: fn() -> &'static TypeShape,
}

impl BeanRef {
    #[inline]
    pub fn of<T: crate::Typed>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            path: core::any::type_name::<T>(),
            shape: T::type_shape,
        }
    }

    #[inline]
    pub const fn id(&self) -> TypeId {
        self.id
    }

    #[inline]
    pub const fn type_path(&self) -> &'static str {
        self.path
    }

    #[inline]
    pub fn shape(&self) -> &'static TypeShape {
        (self.shape)()
    }
}

impl PartialEq for BeanRef {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for BeanRef {}

impl Hash for BeanRef {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for BeanRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BeanRef({})", self.path)
    }
}

/// A handle to an enumerated-constant type.
#[derive(Clone, Copy)]
pub struct EnumRef {
    id: TypeId,
    path: &'static str,
    shape: fn() -> &'static EnumShape,
}

impl EnumRef {
    #[inline]
    pub fn of<E: crate::info::EnumType>() -> Self {
        Self {
            id: TypeId::of::<E>(),
            path: core::any::type_name::<E>(),
            shape: E::enum_shape,
        }
    }

    #[inline]
    pub const fn id(&self) -> TypeId {
        self.id
    }

    #[inline]
    pub const fn type_path(&self) -> &'static str {
        self.path
    }

    #[inline]
    pub fn shape(&self) -> &'static EnumShape {
        (self.shape)()
    }
}

impl PartialEq for EnumRef {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EnumRef {}

impl Hash for EnumRef {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for EnumRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EnumRef({})", self.path)
    }
}

// -----------------------------------------------------------------------------
// TypeRef

/// The declared type of a property, parameter or element.
///
/// Container element types are not part of a `TypeRef`; they travel
/// separately as generic arguments (see [`GenericType`]). Arrays are the
/// exception: the component type is part of the array type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// Unspecified; resolved from the runtime value where needed.
    Any,
    /// A scalar that cannot represent absence.
    Primitive(ScalarKind),
    /// A scalar that may be null.
    Scalar(ScalarKind),
    Array(Box<TypeRef>),
    Collection(CollectionKind),
    /// A string-keyed map. Argument `1` is the value type.
    Map,
    Enum(EnumRef),
    Bean(BeanRef),
}

impl TypeRef {
    #[inline]
    pub fn array_of(component: TypeRef) -> Self {
        Self::Array(Box::new(component))
    }

    #[inline]
    pub fn bean<T: crate::Typed>() -> Self {
        Self::Bean(BeanRef::of::<T>())
    }

    /// Returns the scalar kind of `Primitive` and `Scalar` types.
    #[inline]
    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        match self {
            Self::Primitive(kind) | Self::Scalar(kind) => Some(*kind),
            _ => None,
        }
    }

    #[inline]
    pub fn as_bean(&self) -> Option<BeanRef> {
        match self {
            Self::Bean(bean) => Some(*bean),
            _ => None,
        }
    }

    /// Returns `true` if a value of this type can be null.
    #[inline]
    pub fn is_nullable(&self) -> bool {
        !matches!(self, Self::Primitive(_))
    }

    /// Returns `true` for collections and maps.
    #[inline]
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Collection(_) | Self::Map)
    }

    /// Returns the nullable form of a primitive; other types are unchanged.
    #[inline]
    pub fn nullable(self) -> Self {
        match self {
            Self::Primitive(kind) => Self::Scalar(kind),
            other => other,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("Any"),
            Self::Primitive(kind) => f.write_str(kind.name()),
            Self::Scalar(kind) => write!(f, "Option<{}>", kind.name()),
            Self::Array(component) => write!(f, "[{component}]"),
            Self::Collection(kind) => f.write_str(kind.name()),
            Self::Map => f.write_str("Map"),
            Self::Enum(e) => f.write_str(e.type_path()),
            Self::Bean(b) => f.write_str(b.type_path()),
        }
    }
}

// -----------------------------------------------------------------------------
// GenericType

/// A generic argument as written in an accessor signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GenericArg {
    Type(TypeRef),
    /// An unresolved type variable such as `T`.
    Variable(&'static str),
}

/// A raw type plus up to two generic arguments.
///
/// # Examples
///
/// ```
/// use bean_reflect::info::{CollectionKind, GenericType, ScalarKind, TypeRef};
///
/// let ty = GenericType::list_of(TypeRef::Scalar(ScalarKind::I32));
/// assert_eq!(ty.raw(), &TypeRef::Collection(CollectionKind::List));
/// assert_eq!(ty.argument(0), Some(&TypeRef::Scalar(ScalarKind::I32)));
/// assert_eq!(ty.argument(1), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GenericType {
    raw: TypeRef,
    args: Vec<GenericArg>,
}

impl GenericType {
    #[inline]
    pub const fn plain(raw: TypeRef) -> Self {
        Self {
            raw,
            args: Vec::new(),
        }
    }

    /// # Panics
    ///
    /// Debug builds assert at most two arguments.
    pub fn with_args(raw: TypeRef, args: impl IntoIterator<Item = GenericArg>) -> Self {
        let args: Vec<GenericArg> = args.into_iter().collect();
        debug_assert!(args.len() <= 2, "at most two generic arguments");
        Self { raw, args }
    }

    #[inline]
    pub fn collection_of(kind: CollectionKind, element: TypeRef) -> Self {
        Self::with_args(TypeRef::Collection(kind), [GenericArg::Type(element)])
    }

    #[inline]
    pub fn list_of(element: TypeRef) -> Self {
        Self::collection_of(CollectionKind::List, element)
    }

    #[inline]
    pub fn set_of(element: TypeRef) -> Self {
        Self::collection_of(CollectionKind::Set, element)
    }

    #[inline]
    pub fn map_of(value: TypeRef) -> Self {
        Self::with_args(
            TypeRef::Map,
            [
                GenericArg::Type(TypeRef::Primitive(ScalarKind::String)),
                GenericArg::Type(value),
            ],
        )
    }

    #[inline]
    pub const fn raw(&self) -> &TypeRef {
        &self.raw
    }

    #[inline]
    pub fn args(&self) -> &[GenericArg] {
        &self.args
    }

    /// Returns the resolved argument at `index`.
    ///
    /// `None` for a missing argument or an unresolved type variable.
    #[inline]
    pub fn argument(&self, index: usize) -> Option<&TypeRef> {
        match self.args.get(index) {
            Some(GenericArg::Type(ty)) => Some(ty),
            _ => None,
        }
    }

    /// Returns `true` if the argument at `index` is a type variable.
    #[inline]
    pub fn is_unresolved(&self, index: usize) -> bool {
        matches!(self.args.get(index), Some(GenericArg::Variable(_)))
    }

    #[inline]
    pub fn into_raw(self) -> TypeRef {
        self.raw
    }
}

impl From<TypeRef> for GenericType {
    #[inline]
    fn from(raw: TypeRef) -> Self {
        Self::plain(raw)
    }
}

impl fmt::Display for GenericType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.raw, f)?;
        let mut iter = self.args.iter();
        if let Some(first) = iter.next() {
            f.write_str("<")?;
            write_arg(f, first)?;
            for arg in iter {
                f.write_str(", ")?;
                write_arg(f, arg)?;
            }
            f.write_str(">")?;
        }
        Ok(())
    }
}

fn write_arg(f: &mut fmt::Formatter<'_>, arg: &GenericArg) -> fmt::Result {
    match arg {
        GenericArg::Type(ty) => fmt::Display::fmt(ty, f),
        GenericArg::Variable(name) => f.write_str(name),
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn display_forms() {
        assert_eq!(TypeRef::Primitive(ScalarKind::I32).to_string(), "i32");
        assert_eq!(TypeRef::Scalar(ScalarKind::I32).to_string(), "Option<i32>");
        assert_eq!(
            TypeRef::array_of(TypeRef::Primitive(ScalarKind::Char)).to_string(),
            "[char]"
        );
        let ty = GenericType::with_args(
            TypeRef::Collection(CollectionKind::List),
            [GenericArg::Variable("T")],
        );
        assert_eq!(ty.to_string(), "List<T>");
        assert!(ty.is_unresolved(0));
        assert_eq!(ty.argument(0), None);
    }

    #[test]
    fn nullability() {
        assert!(!TypeRef::Primitive(ScalarKind::Bool).is_nullable());
        assert_eq!(
            TypeRef::Primitive(ScalarKind::Bool).nullable(),
            TypeRef::Scalar(ScalarKind::Bool)
        );
        assert!(TypeRef::Map.is_container());
        assert!(!TypeRef::Any.is_container());
    }
}
