use alloc::boxed::Box;
use alloc::collections::{BTreeMap, BTreeSet, VecDeque};
use alloc::string::String;
use alloc::vec::Vec;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::error::InvokeError;
use crate::info::CollectionKind;
use crate::value::{PropertyType, Value, self_mismatch};
use crate::Typed;

// -----------------------------------------------------------------------------
// FromValue

/// Converts a [`Value`] of the declared type back into a Rust value.
///
/// Conversions are exact: an `i32` only accepts [`Value::I32`]. Coercion
/// between kinds is the job of the conversion orchestrator, which runs
/// before a writer is called.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self, InvokeError>;
}

macro_rules! impl_scalar_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl FromValue for $ty {
                #[inline]
                fn from_value(value: Value) -> Result<Self, InvokeError> {
                    match value {
                        Value::$variant(v) => Ok(v),
                        other => Err(self_mismatch::<$ty>(other.kind_name())),
                    }
                }
            }

            impl From<$ty> for Value {
                #[inline]
                fn from(value: $ty) -> Self {
                    Value::$variant(value)
                }
            }
        )*
    };
}

impl_scalar_value! {
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

impl From<&str> for Value {
    #[inline]
    fn from(value: &str) -> Self {
        Value::String(value.into())
    }
}

impl FromValue for Value {
    #[inline]
    fn from_value(value: Value) -> Result<Self, InvokeError> {
        Ok(value)
    }
}

// -----------------------------------------------------------------------------
// Beans

/// A null value becomes a fresh instance when `T` is constructible.
impl<T: Typed> FromValue for T {
    fn from_value(value: Value) -> Result<Self, InvokeError> {
        match value {
            Value::Null => T::type_shape()
                .construct()
                .and_then(|bean| bean.downcast::<T>())
                .map(|bean| *bean)
                .ok_or_else(|| self_mismatch::<T>("null")),
            other => other.into_bean(),
        }
    }
}

impl<T: Typed> From<T> for Value {
    #[inline]
    fn from(value: T) -> Self {
        Value::Bean(Box::new(value))
    }
}

// -----------------------------------------------------------------------------
// Option

impl<T: FromValue> FromValue for Option<T> {
    #[inline]
    fn from_value(value: Value) -> Result<Self, InvokeError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    #[inline]
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

// -----------------------------------------------------------------------------
// Containers

// A null container reads as an empty one.
fn elements<T: FromValue, C: FromIterator<T>>(value: Value) -> Result<C, InvokeError> {
    match value {
        Value::Null => Ok(core::iter::empty().collect()),
        Value::Array(_, items) | Value::Collection(_, items) => {
            items.into_iter().map(T::from_value).collect()
        }
        other => Err(self_mismatch::<C>(other.kind_name())),
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    #[inline]
    fn from_value(value: Value) -> Result<Self, InvokeError> {
        elements::<T, _>(value)
    }
}

impl<T: FromValue> FromValue for VecDeque<T> {
    #[inline]
    fn from_value(value: Value) -> Result<Self, InvokeError> {
        elements::<T, _>(value)
    }
}

impl<T: FromValue + Ord> FromValue for BTreeSet<T> {
    #[inline]
    fn from_value(value: Value) -> Result<Self, InvokeError> {
        elements::<T, _>(value)
    }
}

impl<T: FromValue> FromValue for Box<[T]> {
    #[inline]
    fn from_value(value: Value) -> Result<Self, InvokeError> {
        elements::<T, _>(value)
    }
}

impl<T: FromValue> FromValue for BTreeMap<String, T> {
    fn from_value(value: Value) -> Result<Self, InvokeError> {
        match value {
            Value::Null => Ok(BTreeMap::new()),
            Value::Map(entries) => entries
                .into_iter()
                .map(|(key, v)| T::from_value(v).map(|v| (key, v)))
                .collect(),
            other => Err(self_mismatch::<Self>(other.kind_name())),
        }
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    #[inline]
    fn from(value: Vec<T>) -> Self {
        Value::Collection(CollectionKind::List, value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<VecDeque<T>> for Value {
    #[inline]
    fn from(value: VecDeque<T>) -> Self {
        Value::Collection(CollectionKind::Deque, value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<BTreeSet<T>> for Value {
    #[inline]
    fn from(value: BTreeSet<T>) -> Self {
        Value::Collection(CollectionKind::Set, value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value> + PropertyType> From<Box<[T]>> for Value {
    #[inline]
    fn from(value: Box<[T]>) -> Self {
        Value::Array(
            T::generic_type().into_raw(),
            value.into_vec().into_iter().map(Into::into).collect(),
        )
    }
}

impl<T: Into<Value>> From<BTreeMap<String, T>> for Value {
    #[inline]
    fn from(value: BTreeMap<String, T>) -> Self {
        Value::Map(value.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

// -----------------------------------------------------------------------------
// Tests
