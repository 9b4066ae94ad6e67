use alloc::boxed::Box;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use core::marker::PhantomData;
use std::sync::OnceLock;

use bean_utils::naming::{AccessorPrefix, accessor_name};

use crate::error::InvokeError;
use crate::info::{BeanRef, GenericType, ScalarKind, TypeRef};
use crate::value::{FromValue, Hop, HopMut, PropertyType, Value};
use crate::{Bean, Typed};

// -----------------------------------------------------------------------------
// Type-erased accessors

/// Reads a property as an owned [`Value`].
pub type ReadFn = Arc<dyn Fn(&dyn Bean) -> Result<Value, InvokeError> + Send + Sync>;

/// Borrows a bean-valued property for path traversal.
pub type HopFn = Arc<dyn for<'a> Fn(&'a dyn Bean) -> Result<Hop<'a>, InvokeError> + Send + Sync>;

/// Mutably borrows a bean-valued property for path traversal.
pub type HopMutFn =
    Arc<dyn for<'a> Fn(&'a mut dyn Bean) -> Result<HopMut<'a>, InvokeError> + Send + Sync>;

/// Writes a property from a [`Value`] of its declared type.
pub type WriteFn = Arc<dyn Fn(&mut dyn Bean, Value) -> Result<(), InvokeError> + Send + Sync>;

type UpFn = Arc<dyn for<'a> Fn(&'a dyn Bean) -> Result<&'a dyn Bean, InvokeError> + Send + Sync>;
type UpMutFn =
    Arc<dyn for<'a> Fn(&'a mut dyn Bean) -> Result<&'a mut dyn Bean, InvokeError> + Send + Sync>;

// The helpers pin the higher-ranked signatures for closure inference.

fn hop_fn<F>(f: F) -> HopFn
where
    F: for<'a> Fn(&'a dyn Bean) -> Result<Hop<'a>, InvokeError> + Send + Sync + 'static,
{
    Arc::new(f)
}

fn hop_mut_fn<F>(f: F) -> HopMutFn
where
    F: for<'a> Fn(&'a mut dyn Bean) -> Result<HopMut<'a>, InvokeError> + Send + Sync + 'static,
{
    Arc::new(f)
}

fn up_fn<F>(f: F) -> UpFn
where
    F: for<'a> Fn(&'a dyn Bean) -> Result<&'a dyn Bean, InvokeError> + Send + Sync + 'static,
{
    Arc::new(f)
}

fn up_mut_fn<F>(f: F) -> UpMutFn
where
    F: for<'a> Fn(&'a mut dyn Bean) -> Result<&'a mut dyn Bean, InvokeError>
        + Send
        + Sync
        + 'static,
{
    Arc::new(f)
}

#[inline]
fn receiver<T: Typed>(bean: &dyn Bean) -> Result<&T, InvokeError> {
    bean.downcast_ref::<T>().ok_or(InvokeError::WrongReceiver {
        expected: core::any::type_name::<T>(),
    })
}

#[inline]
fn receiver_mut<T: Typed>(bean: &mut dyn Bean) -> Result<&mut T, InvokeError> {
    bean.downcast_mut::<T>().ok_or(InvokeError::WrongReceiver {
        expected: core::any::type_name::<T>(),
    })
}

// -----------------------------------------------------------------------------
// Invoker

/// The body behind a declared method.
#[derive(Clone)]
pub enum Invoker {
    /// A zero-argument reader. `hop`/`hop_mut` are present when the value
    /// can be borrowed in place.
    Read {
        read: ReadFn,
        hop: Option<HopFn>,
        hop_mut: Option<HopMutFn>,
    },
    /// A one-argument writer.
    Write(WriteFn),
    /// Declared for discovery only.
    Opaque,
}

impl Invoker {
    // Re-targets an ancestor's accessor at the descendant that embeds it.
    fn lift(&self, link: &ParentLink) -> Self {
        match self {
            Self::Read { read, hop, hop_mut } => {
                let up = link.up.clone();
                let read = read.clone();
                let lifted_read: ReadFn = Arc::new(move |bean: &dyn Bean| read(up(bean)?));
                let lifted_hop = hop.clone().map(|hop| {
                    let up = link.up.clone();
                    hop_fn(move |bean| hop(up(bean)?))
                });
                let lifted_hop_mut = hop_mut.clone().map(|hop_mut| {
                    let up_mut = link.up_mut.clone();
                    hop_mut_fn(move |bean| hop_mut(up_mut(bean)?))
                });
                Self::Read {
                    read: lifted_read,
                    hop: lifted_hop,
                    hop_mut: lifted_hop_mut,
                }
            }
            Self::Write(write) => {
                let up_mut = link.up_mut.clone();
                let write = write.clone();
                Self::Write(Arc::new(move |bean: &mut dyn Bean, value| {
                    write(up_mut(bean)?, value)
                }))
            }
            Self::Opaque => Self::Opaque,
        }
    }
}

impl fmt::Debug for Invoker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { hop, .. } => f
                .debug_struct("Read")
                .field("borrowable", &hop.is_some())
                .finish(),
            Self::Write(_) => f.write_str("Write"),
            Self::Opaque => f.write_str("Opaque"),
        }
    }
}

// -----------------------------------------------------------------------------
// Declarations

/// A stored member declared by a type.
#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub name: &'static str,
    pub ty: GenericType,
}

/// A publicly invocable method declared by a type.
#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub name: String,
    pub params: Vec<GenericType>,
    /// `None` for methods returning nothing.
    pub returns: Option<GenericType>,
    pub invoker: Invoker,
}

/// Link from a type to the ancestor it embeds.
#[derive(Clone)]
pub struct ParentLink {
    bean: BeanRef,
    up: UpFn,
    up_mut: UpMutFn,
}

impl ParentLink {
    #[inline]
    pub fn bean(&self) -> BeanRef {
        self.bean
    }
}

impl fmt::Debug for ParentLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ParentLink").field(&self.bean).finish()
    }
}

// -----------------------------------------------------------------------------
// TypeShape

/// Everything the engine can learn about a bean type.
///
/// Built once per type with a [`ShapeBuilder`] and kept for the process
/// lifetime in a [`ShapeCell`].
pub struct TypeShape {
    ty: BeanRef,
    name: &'static str,
    parent: Option<ParentLink>,
    fields: Vec<FieldDecl>,
    methods: Vec<MethodDecl>,
    wrapped: Option<GenericType>,
    constructor: Option<fn() -> Box<dyn Bean>>,
}

impl TypeShape {
    #[inline]
    pub fn bean_ref(&self) -> BeanRef {
        self.ty
    }

    /// Full path, e.g. `my_app::model::Customer`.
    #[inline]
    pub fn type_path(&self) -> &'static str {
        self.ty.type_path()
    }

    /// Short name, e.g. `Customer`.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn parent(&self) -> Option<&ParentLink> {
        self.parent.as_ref()
    }

    /// Fields declared on this type only.
    #[inline]
    pub fn fields(&self) -> &[FieldDecl] {
        &self.fields
    }

    /// Methods declared on this type only.
    #[inline]
    pub fn methods(&self) -> &[MethodDecl] {
        &self.methods
    }

    /// Type of the inner value, when this type wraps one.
    #[inline]
    pub fn wrapped(&self) -> Option<&GenericType> {
        self.wrapped.as_ref()
    }

    #[inline]
    pub fn is_constructible(&self) -> bool {
        self.constructor.is_some()
    }

    /// Creates a default instance, if the type declared a constructor.
    #[inline]
    pub fn construct(&self) -> Option<Box<dyn Bean>> {
        self.constructor.map(|ctor| ctor())
    }

    /// Returns `true` if `other` is this type or one of its ancestors.
    pub fn is_a(&self, other: BeanRef) -> bool {
        let mut current = Some(self.ty);
        while let Some(bean) = current {
            if bean == other {
                return true;
            }
            current = bean.shape().parent().map(ParentLink::bean);
        }
        false
    }

    /// Methods of this type followed by inherited ones, ancestors' accessors
    /// re-targeted at this type. A method hides an inherited one of the same
    /// name.
    pub fn all_methods(&self) -> Vec<MethodDecl> {
        let mut methods = self.methods.clone();
        if let Some(link) = &self.parent {
            for inherited in link.bean.shape().all_methods() {
                if methods.iter().any(|m| m.name == inherited.name) {
                    continue;
                }
                methods.push(MethodDecl {
                    invoker: inherited.invoker.lift(link),
                    ..inherited
                });
            }
        }
        methods
    }

    /// Fields of this type followed by inherited ones. The closest
    /// declaration wins on a name collision.
    pub fn all_fields(&self) -> Vec<FieldDecl> {
        let mut fields = self.fields.clone();
        let mut current = self.parent.as_ref().map(ParentLink::bean);
        while let Some(bean) = current {
            let shape = bean.shape();
            for field in &shape.fields {
                if !fields.iter().any(|f| f.name == field.name) {
                    fields.push(field.clone());
                }
            }
            current = shape.parent().map(ParentLink::bean);
        }
        fields
    }
}

impl fmt::Debug for TypeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeShape")
            .field("type_path", &self.type_path())
            .field("parent", &self.parent)
            .field("fields", &self.fields)
            .field("methods", &self.methods)
            .field("wrapped", &self.wrapped)
            .field("constructible", &self.is_constructible())
            .finish()
    }
}

pub(crate) fn short_name(path: &'static str) -> &'static str {
    let head = path.split('<').next().unwrap_or(path);
    match head.rfind("::") {
        Some(at) => &path[at + 2..],
        None => path,
    }
}

// -----------------------------------------------------------------------------
// ShapeCell

/// Lazily initialised storage for one [`TypeShape`].
///
/// Intended for `static` items inside [`Typed::type_shape`].
pub struct ShapeCell(OnceLock<TypeShape>);

impl ShapeCell {
    #[inline]
    pub const fn new() -> Self {
        Self(OnceLock::new())
    }

    #[inline]
    pub fn get_or_init(&self, f: impl FnOnce() -> TypeShape) -> &TypeShape {
        self.0.get_or_init(f)
    }
}

impl Default for ShapeCell {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

// -----------------------------------------------------------------------------
// ShapeBuilder

/// Declares the fields and methods of `T`.
///
/// [`property`](Self::property) covers the common case of a stored field
/// with a conventional reader and writer. [`reader`](Self::reader),
/// [`writer`](Self::writer) and [`method`](Self::method) declare single
/// methods, for computed properties or unusual signatures.
pub struct ShapeBuilder<T> {
    parent: Option<ParentLink>,
    fields: Vec<FieldDecl>,
    methods: Vec<MethodDecl>,
    wrapped: Option<GenericType>,
    constructor: Option<fn() -> Box<dyn Bean>>,
    marker: PhantomData<fn() -> T>,
}

impl<T: Typed> Default for ShapeBuilder<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Typed> ShapeBuilder<T> {
    #[inline]
    pub fn new() -> Self {
        Self {
            parent: None,
            fields: Vec::new(),
            methods: Vec::new(),
            wrapped: None,
            constructor: None,
            marker: PhantomData,
        }
    }

    /// Declares that `T` embeds its ancestor `P`, reached through `get`.
    ///
    /// Fields and accessors of `P` become part of `T`.
    pub fn extends<P: Typed>(mut self, get: fn(&T) -> &P, get_mut: fn(&mut T) -> &mut P) -> Self {
        self.parent = Some(ParentLink {
            bean: BeanRef::of::<P>(),
            up: up_fn(move |bean| Ok(get(receiver::<T>(bean)?) as &dyn Bean)),
            up_mut: up_mut_fn(move |bean| Ok(get_mut(receiver_mut::<T>(bean)?) as &mut dyn Bean)),
        });
        self
    }

    /// Declares a stored field without accessors.
    pub fn field(mut self, name: &'static str, ty: impl Into<GenericType>) -> Self {
        self.fields.push(FieldDecl {
            name,
            ty: ty.into(),
        });
        self
    }

    /// Declares a zero-argument method returning a value.
    pub fn reader(
        mut self,
        name: impl Into<String>,
        returns: impl Into<GenericType>,
        read: fn(&T) -> Value,
    ) -> Self {
        self.methods.push(MethodDecl {
            name: name.into(),
            params: Vec::new(),
            returns: Some(returns.into()),
            invoker: Invoker::Read {
                read: Arc::new(move |bean: &dyn Bean| Ok(read(receiver::<T>(bean)?))),
                hop: None,
                hop_mut: None,
            },
        });
        self
    }

    /// Declares a one-argument method returning nothing.
    pub fn writer(
        mut self,
        name: impl Into<String>,
        param: impl Into<GenericType>,
        write: fn(&mut T, Value) -> Result<(), InvokeError>,
    ) -> Self {
        self.methods.push(MethodDecl {
            name: name.into(),
            params: alloc::vec![param.into()],
            returns: None,
            invoker: Invoker::Write(Arc::new(move |bean: &mut dyn Bean, value| {
                write(receiver_mut::<T>(bean)?, value)
            })),
        });
        self
    }

    /// Declares a method the engine may discover but never calls.
    pub fn method(
        mut self,
        name: impl Into<String>,
        params: impl IntoIterator<Item = GenericType>,
        returns: Option<GenericType>,
    ) -> Self {
        self.methods.push(MethodDecl {
            name: name.into(),
            params: params.into_iter().collect(),
            returns,
            invoker: Invoker::Opaque,
        });
        self
    }

    /// Declares field `name` of type `V` with a reader and a writer.
    ///
    /// The reader is `is<Name>` for a `bool` field and `get<Name>` otherwise;
    /// the writer is `set<Name>`.
    pub fn property<V>(
        mut self,
        name: &'static str,
        get: fn(&T) -> &V,
        get_mut: fn(&mut T) -> &mut V,
    ) -> Self
    where
        V: PropertyType + FromValue + Into<Value> + Clone,
    {
        let ty = V::generic_type();
        let prefix = match ty.raw() {
            TypeRef::Primitive(ScalarKind::Bool) => AccessorPrefix::Is,
            _ => AccessorPrefix::Get,
        };
        self.fields.push(FieldDecl {
            name,
            ty: ty.clone(),
        });
        let reader = accessor_name(prefix, name);
        let writer = accessor_name(AccessorPrefix::Set, name);
        self.push_accessors(reader, writer, ty, get, get_mut);
        self
    }

    /// Declares `T` as a wrapper around one inner value of type `D`,
    /// exposed through `getData` and `setData`.
    pub fn wraps<D>(mut self, get: fn(&T) -> &D, get_mut: fn(&mut T) -> &mut D) -> Self
    where
        D: PropertyType + FromValue + Into<Value> + Clone,
    {
        let ty = D::generic_type();
        self.wrapped = Some(ty.clone());
        self.push_accessors("getData".into(), "setData".into(), ty, get, get_mut);
        self
    }

    fn push_accessors<V>(
        &mut self,
        reader: String,
        writer: String,
        ty: GenericType,
        get: fn(&T) -> &V,
        get_mut: fn(&mut T) -> &mut V,
    ) where
        V: PropertyType + FromValue + Into<Value> + Clone,
    {
        self.methods.push(MethodDecl {
            name: reader,
            params: Vec::new(),
            returns: Some(ty.clone()),
            invoker: Invoker::Read {
                read: Arc::new(move |bean: &dyn Bean| Ok(get(receiver::<T>(bean)?).clone().into())),
                hop: Some(hop_fn(move |bean| Ok(V::hop(get(receiver::<T>(bean)?))))),
                hop_mut: Some(hop_mut_fn(move |bean| {
                    Ok(V::hop_mut(get_mut(receiver_mut::<T>(bean)?)))
                })),
            },
        });
        self.methods.push(MethodDecl {
            name: writer,
            params: alloc::vec![ty],
            returns: None,
            invoker: Invoker::Write(Arc::new(move |bean: &mut dyn Bean, value| {
                *get_mut(receiver_mut::<T>(bean)?) = V::from_value(value)?;
                Ok(())
            })),
        });
    }

    pub fn build(self) -> TypeShape {
        let ty = BeanRef::of::<T>();
        TypeShape {
            ty,
            name: short_name(ty.type_path()),
            parent: self.parent,
            fields: self.fields,
            methods: self.methods,
            wrapped: self.wrapped,
            constructor: self.constructor,
        }
    }
}

impl<T: Typed + Default> ShapeBuilder<T> {
    /// Registers `T::default` as the zero-argument constructor.
    pub fn constructible(mut self) -> Self {
        self.constructor = Some(|| Box::new(T::default()));
        self
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Default)]
    struct Named {
        name: String,
        active: bool,
    }

    impl Typed for Named {
        fn type_shape() -> &'static TypeShape {
            static CELL: ShapeCell = ShapeCell::new();
            CELL.get_or_init(|| {
                ShapeBuilder::<Self>::new()
                    .property("name", |n| &n.name, |n| &mut n.name)
                    .property("active", |n| &n.active, |n| &mut n.active)
                    .reader("getLabel", TypeRef::Primitive(ScalarKind::String), |n| {
                        Value::String(alloc::format!("<{}>", n.name))
                    })
                    .constructible()
                    .build()
            })
        }
    }

    #[derive(Debug, Clone, PartialEq, Default)]
    struct Special {
        base: Named,
        level: i32,
    }

    impl Typed for Special {
        fn type_shape() -> &'static TypeShape {
            static CELL: ShapeCell = ShapeCell::new();
            CELL.get_or_init(|| {
                ShapeBuilder::<Self>::new()
                    .extends(|s| &s.base, |s| &mut s.base)
                    .property("level", |s| &s.level, |s| &mut s.level)
                    .build()
            })
        }
    }

    fn invoke_read(methods: &[MethodDecl], name: &str, bean: &dyn Bean) -> Value {
        let method = methods.iter().find(|m| m.name == name).unwrap();
        match &method.invoker {
            Invoker::Read { read, .. } => read(bean).unwrap(),
            other => panic!("not a reader: {other:?}"),
        }
    }

    #[test]
    fn property_declares_conventional_accessors() {
        let shape = Named::type_shape();
        assert_eq!(shape.type_name(), "Named");
        let names: Vec<&str> = shape.methods().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["getName", "setName", "isActive", "setActive", "getLabel"]);
        assert!(shape.is_constructible());

        let bean = Named {
            name: "x".into(),
            active: true,
        };
        assert_eq!(invoke_read(shape.methods(), "getLabel", &bean), Value::String("<x>".into()));
        assert_eq!(invoke_read(shape.methods(), "isActive", &bean), Value::Bool(true));
    }

    #[test]
    fn inherited_accessors_reach_the_ancestor() {
        let shape = Special::type_shape();
        assert!(shape.is_a(BeanRef::of::<Named>()));
        assert!(!Named::type_shape().is_a(BeanRef::of::<Special>()));
        assert!(!shape.is_constructible());

        let fields: Vec<&str> = shape.all_fields().iter().map(|f| f.name).collect();
        assert_eq!(fields, ["level", "name", "active"]);

        let methods = shape.all_methods();
        let mut bean = Special::default();
        bean.base.name = "inner".into();
        assert_eq!(invoke_read(&methods, "getName", &bean), Value::String("inner".into()));

        let set = methods.iter().find(|m| m.name == "setName").unwrap();
        let Invoker::Write(write) = &set.invoker else {
            panic!("not a writer")
        };
        write(&mut bean, Value::String("changed".into())).unwrap();
        assert_eq!(bean.base.name, "changed");

        let err = write(&mut Named::default(), Value::Null).unwrap_err();
        assert!(matches!(err, InvokeError::WrongReceiver { .. }));
    }

    #[test]
    fn short_names() {
        assert_eq!(short_name("a::b::Customer"), "Customer");
        assert_eq!(short_name("Customer"), "Customer");
        assert_eq!(short_name("a::Page<b::Row>"), "Page<b::Row>");
    }
}
