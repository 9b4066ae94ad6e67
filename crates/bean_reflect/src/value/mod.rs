//! The loosely typed value domain.
//!
//! [`Value`] is what readers return, what writers accept and what the
//! conversion orchestrator works on. Rust types move in and out through
//! [`From`] and [`FromValue`]; [`PropertyType`] tells the shape builder how
//! a Rust type is declared.

// -----------------------------------------------------------------------------
// Modules

mod from_value;
mod property;

// -----------------------------------------------------------------------------
// Exports

pub use from_value::FromValue;
pub use property::{Hop, HopMut, PropertyType};

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::error::InvokeError;
use crate::info::{CollectionKind, EnumRef, EnumType, ScalarKind, TypeRef};
use crate::{Bean, Typed};

// -----------------------------------------------------------------------------
// EnumValue

/// One constant of an enumerated type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnumValue {
    ty: EnumRef,
    ordinal: usize,
}

impl EnumValue {
    #[inline]
    pub fn of<E: EnumType>(value: E) -> Self {
        Self {
            ty: EnumRef::of::<E>(),
            ordinal: value.ordinal(),
        }
    }

    /// Returns `None` if `ordinal` is out of range.
    pub fn from_ordinal(ty: EnumRef, ordinal: usize) -> Option<Self> {
        ty.shape().constant(ordinal).map(|_| Self { ty, ordinal })
    }

    #[inline]
    pub fn enum_ref(&self) -> EnumRef {
        self.ty
    }

    #[inline]
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    pub fn name(&self) -> &'static str {
        self.ty.shape().constant(self.ordinal).map_or("", |c| c.name)
    }

    pub fn code(&self) -> &'static str {
        self.ty.shape().constant(self.ordinal).map_or("", |c| c.code)
    }
}

// -----------------------------------------------------------------------------
// Value

/// A dynamically typed value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Char(char),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Decimal(Decimal),
    Date(DateTime<Utc>),
    String(String),
    Enum(EnumValue),
    /// Elements with the array's component type.
    Array(TypeRef, Vec<Value>),
    Collection(CollectionKind, Vec<Value>),
    Map(BTreeMap<String, Value>),
    Bean(Box<dyn Bean>),
}

impl Value {
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// A short name of the runtime kind, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Enum(e) => e.enum_ref().type_path(),
            Self::Array(..) => "array",
            Self::Collection(kind, _) => kind.name(),
            Self::Map(_) => "Map",
            Self::Bean(bean) => bean.type_path(),
            other => other.scalar_kind().map_or("?", ScalarKind::name),
        }
    }

    /// Returns the scalar kind of a scalar value.
    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        Some(match self {
            Self::Bool(_) => ScalarKind::Bool,
            Self::Char(_) => ScalarKind::Char,
            Self::I8(_) => ScalarKind::I8,
            Self::I16(_) => ScalarKind::I16,
            Self::I32(_) => ScalarKind::I32,
            Self::I64(_) => ScalarKind::I64,
            Self::F32(_) => ScalarKind::F32,
            Self::F64(_) => ScalarKind::F64,
            Self::Decimal(_) => ScalarKind::Decimal,
            Self::Date(_) => ScalarKind::Date,
            Self::String(_) => ScalarKind::String,
            _ => return None,
        })
    }

    /// The type of this value as observed at runtime. `Null` reports [`TypeRef::Any`].
    pub fn runtime_type(&self) -> TypeRef {
        match self {
            Self::Null => TypeRef::Any,
            Self::Enum(e) => TypeRef::Enum(e.enum_ref()),
            Self::Array(component, _) => TypeRef::Array(Box::new(component.clone())),
            Self::Collection(kind, _) => TypeRef::Collection(*kind),
            Self::Map(_) => TypeRef::Map,
            Self::Bean(bean) => TypeRef::Bean(bean.bean_ref()),
            other => other
                .scalar_kind()
                .map_or(TypeRef::Any, TypeRef::Primitive),
        }
    }

    /// Returns `true` if this value can be stored as `target` unchanged.
    ///
    /// Containers are never assignable, so they are always rebuilt.
    pub fn is_assignable_to(&self, target: &TypeRef) -> bool {
        match (target, self) {
            (TypeRef::Any, _) => true,
            (TypeRef::Primitive(_), Self::Null) => false,
            (TypeRef::Collection(_) | TypeRef::Map, _) => false,
            (_, Self::Null) => true,
            (TypeRef::Primitive(kind) | TypeRef::Scalar(kind), value) => {
                value.scalar_kind() == Some(*kind)
            }
            (TypeRef::Array(component), Self::Array(actual, _)) => **component == *actual,
            (TypeRef::Enum(e), Self::Enum(value)) => value.enum_ref() == *e,
            (TypeRef::Bean(b), Self::Bean(bean)) => bean.bean_shape().is_a(*b),
            _ => false,
        }
    }

    /// Elements of an array or collection.
    pub fn items(&self) -> Option<&[Value]> {
        match self {
            Self::Array(_, items) | Self::Collection(_, items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bean(&self) -> Option<&dyn Bean> {
        match self {
            Self::Bean(bean) => Some(&**bean),
            _ => None,
        }
    }

    /// Converts into a Rust value of type `T`.
    #[inline]
    pub fn take<T: FromValue>(self) -> Result<T, InvokeError> {
        T::from_value(self)
    }

    pub fn into_enum<E: EnumType>(self) -> Result<E, InvokeError> {
        match self {
            Self::Enum(value) if value.enum_ref() == EnumRef::of::<E>() => {
                E::from_ordinal(value.ordinal()).ok_or_else(|| self_mismatch::<E>("enum ordinal"))
            }
            other => Err(self_mismatch::<E>(other.kind_name())),
        }
    }

    pub fn into_bean<T: Typed>(self) -> Result<T, InvokeError> {
        match self {
            Self::Bean(bean) if (*bean).is::<T>() => bean
                .downcast::<T>()
                .map(|bean| *bean)
                .ok_or_else(|| self_mismatch::<T>("bean")),
            other => Err(self_mismatch::<T>(other.kind_name())),
        }
    }
}

#[inline]
pub(crate) fn self_mismatch<T>(found: &'static str) -> InvokeError {
    InvokeError::Mismatch {
        expected: core::any::type_name::<T>(),
        found,
    }
}

/// Canonical empty value for a declared type.
///
/// Primitives get their zero value; every other type gets `Null`.
///
/// ```
/// use bean_reflect::info::{ScalarKind, TypeRef};
/// use bean_reflect::value::{empty_value, Value};
///
/// assert_eq!(empty_value(&TypeRef::Primitive(ScalarKind::String)), Value::String(String::new()));
/// assert_eq!(empty_value(&TypeRef::Primitive(ScalarKind::I64)), Value::I64(0));
/// assert_eq!(empty_value(&TypeRef::Scalar(ScalarKind::I64)), Value::Null);
/// ```
pub fn empty_value(ty: &TypeRef) -> Value {
    match ty {
        TypeRef::Primitive(kind) => match kind {
            ScalarKind::Bool => Value::Bool(false),
            ScalarKind::Char => Value::Char('\0'),
            ScalarKind::I8 => Value::I8(0),
            ScalarKind::I16 => Value::I16(0),
            ScalarKind::I32 => Value::I32(0),
            ScalarKind::I64 => Value::I64(0),
            ScalarKind::F32 => Value::F32(0.0),
            ScalarKind::F64 => Value::F64(0.0),
            ScalarKind::Decimal => Value::Decimal(Decimal::ZERO),
            ScalarKind::Date => Value::Date(DateTime::<Utc>::UNIX_EPOCH),
            ScalarKind::String => Value::String(String::new()),
        },
        _ => Value::Null,
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn assignability() {
        let int = Value::I32(3);
        assert!(int.is_assignable_to(&TypeRef::Primitive(ScalarKind::I32)));
        assert!(int.is_assignable_to(&TypeRef::Scalar(ScalarKind::I32)));
        assert!(!int.is_assignable_to(&TypeRef::Scalar(ScalarKind::I64)));

        assert!(!Value::Null.is_assignable_to(&TypeRef::Primitive(ScalarKind::I32)));
        assert!(Value::Null.is_assignable_to(&TypeRef::Scalar(ScalarKind::I32)));

        let list = Value::Collection(CollectionKind::List, vec![int.clone()]);
        assert!(!list.is_assignable_to(&TypeRef::Collection(CollectionKind::List)));
        assert!(list.is_assignable_to(&TypeRef::Any));
    }

    #[test]
    fn runtime_types() {
        assert_eq!(Value::Null.runtime_type(), TypeRef::Any);
        assert_eq!(
            Value::String("a".into()).runtime_type(),
            TypeRef::Primitive(ScalarKind::String)
        );
        assert_eq!(Value::F64(1.0).kind_name(), "f64");
        assert_eq!(Value::Null.kind_name(), "null");
    }
}
