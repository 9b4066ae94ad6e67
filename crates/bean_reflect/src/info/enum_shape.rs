use alloc::vec::Vec;
use core::fmt::Debug;
use std::sync::OnceLock;

use crate::info::EnumRef;
use crate::info::shape::short_name;

// -----------------------------------------------------------------------------
// EnumType

/// A field-less enum whose constants have a symbolic name and a code.
///
/// Implement it with [`impl_enum_type!`](crate::impl_enum_type), which also
/// wires the enum into [`Value`](crate::value::Value).
pub trait EnumType: Copy + Send + Sync + PartialEq + Debug + 'static {
    fn enum_shape() -> &'static EnumShape;

    /// Position of `self` in declaration order.
    fn ordinal(self) -> usize;

    fn from_ordinal(ordinal: usize) -> Option<Self>;
}

// -----------------------------------------------------------------------------
// EnumShape

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumConstant {
    pub name: &'static str,
    pub code: &'static str,
}

/// The constants of an enumerated type, in declaration order.
#[derive(Debug)]
pub struct EnumShape {
    ty: EnumRef,
    name: &'static str,
    constants: Vec<EnumConstant>,
}

impl EnumShape {
    /// Builds the shape from `(name, code)` pairs in declaration order.
    pub fn new<E: EnumType>(constants: &[(&'static str, &'static str)]) -> Self {
        let ty = EnumRef::of::<E>();
        Self {
            ty,
            name: short_name(ty.type_path()),
            constants: constants
                .iter()
                .map(|&(name, code)| EnumConstant { name, code })
                .collect(),
        }
    }

    #[inline]
    pub fn enum_ref(&self) -> EnumRef {
        self.ty
    }

    #[inline]
    pub fn type_path(&self) -> &'static str {
        self.ty.type_path()
    }

    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn constants(&self) -> &[EnumConstant] {
        &self.constants
    }

    #[inline]
    pub fn constant(&self, ordinal: usize) -> Option<&EnumConstant> {
        self.constants.get(ordinal)
    }

    /// Finds a constant by exact symbolic name.
    pub fn by_name(&self, name: &str) -> Option<usize> {
        self.constants.iter().position(|c| c.name == name)
    }

    /// Finds a constant by code.
    pub fn by_code(&self, code: &str) -> Option<usize> {
        self.constants.iter().position(|c| c.code == code)
    }
}

// -----------------------------------------------------------------------------
// EnumCell

/// Lazily initialised storage for one [`EnumShape`].
pub struct EnumCell(OnceLock<EnumShape>);

impl EnumCell {
    #[inline]
    pub const fn new() -> Self {
        Self(OnceLock::new())
    }

    #[inline]
    pub fn get_or_init(&self, f: impl FnOnce() -> EnumShape) -> &EnumShape {
        self.0.get_or_init(f)
    }
}

impl Default for EnumCell {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

// -----------------------------------------------------------------------------
// impl_enum_type

/// Implements [`EnumType`] and the value conversions for a field-less enum.
///
/// Each variant is paired with its code.
///
/// # Examples
///
/// ```
/// use bean_reflect::impl_enum_type;
/// use bean_reflect::info::EnumType;
/// use bean_reflect::value::Value;
///
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// enum Status {
///     Active,
///     Closed,
/// }
///
/// impl_enum_type!(Status { Active => "A", Closed => "C" });
///
/// let shape = Status::enum_shape();
/// assert_eq!(shape.by_code("C"), Some(1));
/// assert_eq!(Status::from_ordinal(0), Some(Status::Active));
///
/// let value = Value::from(Status::Closed);
/// assert_eq!(value.take::<Status>(), Ok(Status::Closed));
/// ```
#[macro_export]
macro_rules! impl_enum_type {
    ($ty:ident { $($variant:ident => $code:literal),+ $(,)? }) => {
        impl $crate::info::EnumType for $ty {
            fn enum_shape() -> &'static $crate::info::EnumShape {
                static CELL: $crate::info::EnumCell = $crate::info::EnumCell::new();
                CELL.get_or_init(|| {
                    $crate::info::EnumShape::new::<Self>(&[$((stringify!($variant), $code)),+])
                })
            }

            fn ordinal(self) -> usize {
                [$($ty::$variant),+]
                    .iter()
                    .position(|v| *v == self)
                    .unwrap_or_default()
            }

            fn from_ordinal(ordinal: usize) -> Option<Self> {
                [$($ty::$variant),+].get(ordinal).copied()
            }
        }

        impl $crate::value::PropertyType for $ty {
            fn generic_type() -> $crate::info::GenericType {
                $crate::info::GenericType::plain($crate::info::TypeRef::Enum(
                    $crate::info::EnumRef::of::<Self>(),
                ))
            }
        }

        impl $crate::value::FromValue for $ty {
            fn from_value(
                value: $crate::value::Value,
            ) -> Result<Self, $crate::error::InvokeError> {
                value.into_enum::<Self>()
            }
        }

        impl From<$ty> for $crate::value::Value {
            fn from(value: $ty) -> Self {
                $crate::value::Value::Enum($crate::value::EnumValue::of(value))
            }
        }
    };
}
