use alloc::boxed::Box;
use core::any::Any;
use core::fmt::Debug;

use crate::info::{BeanRef, TypeShape};

// -----------------------------------------------------------------------------
// Typed

/// A concrete bean type with a static [`TypeShape`].
///
/// The shape is usually built once inside a [`ShapeCell`](crate::info::ShapeCell).
///
/// # Examples
///
/// ```
/// use bean_reflect::Typed;
/// use bean_reflect::info::{ShapeBuilder, ShapeCell, TypeShape};
///
/// #[derive(Debug, Clone, PartialEq, Default)]
/// struct Address {
///     line1: String,
/// }
///
/// impl Typed for Address {
///     fn type_shape() -> &'static TypeShape {
///         static CELL: ShapeCell = ShapeCell::new();
///         CELL.get_or_init(|| {
///             ShapeBuilder::<Self>::new()
///                 .property("line1", |a| &a.line1, |a| &mut a.line1)
///                 .constructible()
///                 .build()
///         })
///     }
/// }
///
/// assert_eq!(Address::type_shape().type_name(), "Address");
/// ```
pub trait Typed: Any + Send + Sync + Clone + PartialEq + Debug {
    fn type_shape() -> &'static TypeShape;
}

// -----------------------------------------------------------------------------
// Bean

/// Object-safe view of a [`Typed`] value.
///
/// Implemented for every `Typed` type; do not implement it by hand.
pub trait Bean: Any + Send + Sync + Debug + 'static {
    fn bean_shape(&self) -> &'static TypeShape;

    fn clone_bean(&self) -> Box<dyn Bean>;

    /// Returns `true` if `other` has the same concrete type and compares equal.
    fn bean_eq(&self, other: &dyn Bean) -> bool;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Typed> Bean for T {
    #[inline]
    fn bean_shape(&self) -> &'static TypeShape {
        T::type_shape()
    }

    #[inline]
    fn clone_bean(&self) -> Box<dyn Bean> {
        Box::new(self.clone())
    }

    fn bean_eq(&self, other: &dyn Bean) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }

    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }

    #[inline]
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    #[inline]
    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

impl dyn Bean {
    #[inline]
    pub fn bean_ref(&self) -> BeanRef {
        self.bean_shape().bean_ref()
    }

    #[inline]
    pub fn type_path(&self) -> &'static str {
        self.bean_shape().type_path()
    }

    #[inline]
    pub fn is<T: Any>(&self) -> bool {
        self.as_any().is::<T>()
    }

    #[inline]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref()
    }

    #[inline]
    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut()
    }

    /// Takes the concrete value out of the box.
    ///
    /// Returns `None` and drops the value on a type mismatch; check with
    /// [`is`](Self::is) first to keep it.
    #[inline]
    pub fn downcast<T: Any>(self: Box<Self>) -> Option<Box<T>> {
        self.into_any().downcast().ok()
    }
}

impl Clone for Box<dyn Bean> {
    #[inline]
    fn clone(&self) -> Self {
        (**self).clone_bean()
    }
}

impl PartialEq for dyn Bean {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.bean_eq(other)
    }
}
