use alloc::boxed::Box;
use alloc::collections::{BTreeMap, BTreeSet, VecDeque};
use alloc::string::String;
use alloc::vec::Vec;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::info::{BeanRef, CollectionKind, GenericArg, GenericType, ScalarKind, TypeRef};
use crate::value::Value;
use crate::{Bean, Typed};

// -----------------------------------------------------------------------------
// Hop

/// A borrowed property value seen from a path walk.
pub enum Hop<'a> {
    Bean(&'a dyn Bean),
    Null,
    /// The value is not a bean and cannot be walked into.
    Leaf,
}

/// Mutable counterpart of [`Hop`].
pub enum HopMut<'a> {
    Bean(&'a mut dyn Bean),
    Null,
    Leaf,
}

// -----------------------------------------------------------------------------
// PropertyType

/// How a Rust type is declared in a [`TypeShape`](crate::info::TypeShape).
///
/// | Rust type | Declared type |
/// |-----------|---------------|
/// | `i32`, `String`, ... | [`TypeRef::Primitive`] |
/// | `Option<i32>`, ... | [`TypeRef::Scalar`] |
/// | `Vec<T>`, `VecDeque<T>`, `BTreeSet<T>` | [`TypeRef::Collection`] with `T` as argument `0` |
/// | `Box<[T]>` | [`TypeRef::Array`] |
/// | `BTreeMap<String, T>` | [`TypeRef::Map`] with `T` as argument `1` |
/// | `T: Typed` | [`TypeRef::Bean`] |
/// | [`Value`] | [`TypeRef::Any`] |
pub trait PropertyType: Send + Sync + 'static {
    fn generic_type() -> GenericType;

    /// Borrows `value` as a bean for path traversal.
    fn hop(value: &Self) -> Hop<'_> {
        let _ = value;
        Hop::Leaf
    }

    fn hop_mut(value: &mut Self) -> HopMut<'_> {
        let _ = value;
        HopMut::Leaf
    }
}

macro_rules! impl_scalar_property {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl PropertyType for $ty {
                #[inline]
                fn generic_type() -> GenericType {
                    GenericType::plain(TypeRef::Primitive(ScalarKind::$kind))
                }
            }
        )*
    };
}

impl_scalar_property! {
    bool => Bool,
    char => Char,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    f32 => F32,
    f64 => F64,
    Decimal => Decimal,
    DateTime<Utc> => Date,
    String => String,
}

impl<T: Typed> PropertyType for T {
    #[inline]
    fn generic_type() -> GenericType {
        GenericType::plain(TypeRef::Bean(BeanRef::of::<T>()))
    }

    #[inline]
    fn hop(value: &Self) -> Hop<'_> {
        Hop::Bean(value)
    }

    #[inline]
    fn hop_mut(value: &mut Self) -> HopMut<'_> {
        HopMut::Bean(value)
    }
}

impl PropertyType for Value {
    #[inline]
    fn generic_type() -> GenericType {
        GenericType::plain(TypeRef::Any)
    }

    fn hop(value: &Self) -> Hop<'_> {
        match value {
            Value::Bean(bean) => Hop::Bean(&**bean),
            Value::Null => Hop::Null,
            _ => Hop::Leaf,
        }
    }

    fn hop_mut(value: &mut Self) -> HopMut<'_> {
        match value {
            Value::Bean(bean) => HopMut::Bean(&mut **bean),
            Value::Null => HopMut::Null,
            _ => HopMut::Leaf,
        }
    }
}

impl<T: PropertyType> PropertyType for Option<T> {
    fn generic_type() -> GenericType {
        let inner = T::generic_type();
        let args = inner.args().to_vec();
        GenericType::with_args(inner.into_raw().nullable(), args)
    }

    fn hop(value: &Self) -> Hop<'_> {
        match value {
            Some(inner) => T::hop(inner),
            None => Hop::Null,
        }
    }

    fn hop_mut(value: &mut Self) -> HopMut<'_> {
        match value {
            Some(inner) => T::hop_mut(inner),
            None => HopMut::Null,
        }
    }
}

#[inline]
fn element_of<T: PropertyType>() -> GenericArg {
    GenericArg::Type(T::generic_type().into_raw())
}

impl<T: PropertyType> PropertyType for Vec<T> {
    #[inline]
    fn generic_type() -> GenericType {
        GenericType::with_args(TypeRef::Collection(CollectionKind::List), [element_of::<T>()])
    }
}

impl<T: PropertyType> PropertyType for VecDeque<T> {
    #[inline]
    fn generic_type() -> GenericType {
        GenericType::with_args(TypeRef::Collection(CollectionKind::Deque), [element_of::<T>()])
    }
}

impl<T: PropertyType> PropertyType for BTreeSet<T> {
    #[inline]
    fn generic_type() -> GenericType {
        GenericType::with_args(TypeRef::Collection(CollectionKind::Set), [element_of::<T>()])
    }
}

impl<T: PropertyType> PropertyType for Box<[T]> {
    #[inline]
    fn generic_type() -> GenericType {
        GenericType::plain(TypeRef::array_of(T::generic_type().into_raw()))
    }
}

impl<T: PropertyType> PropertyType for BTreeMap<String, T> {
    #[inline]
    fn generic_type() -> GenericType {
        GenericType::map_of(T::generic_type().into_raw())
    }
}

// -----------------------------------------------------------------------------
// Tests
