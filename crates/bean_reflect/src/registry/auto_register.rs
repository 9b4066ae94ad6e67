use crate::Typed;
use crate::info::EnumType;
use crate::registry::TypeRegistry;

/// One registration submitted by [`auto_register!`](crate::auto_register).
pub struct AutoRegisterFunc(pub fn(&mut TypeRegistry));

inventory::collect!(AutoRegisterFunc);

#[doc(hidden)]
pub fn register_bean<T: Typed>(registry: &mut TypeRegistry) {
    registry.register::<T>();
}

#[doc(hidden)]
pub fn register_enum<E: EnumType>(registry: &mut TypeRegistry) {
    registry.register_enum::<E>();
}

/// Submits bean types (or, with a leading `enum`, enum types) for
/// [`TypeRegistry::auto_register`].
///
/// Only available with the `auto_register` feature.
///
/// # Examples
///
/// ```
/// use bean_reflect::{auto_register, Typed};
/// use bean_reflect::info::{ShapeBuilder, ShapeCell, TypeRef, TypeShape};
/// use bean_reflect::registry::{TypeRegistry, TypeResolver};
///
/// #[derive(Debug, Clone, PartialEq, Default)]
/// struct Invoice {
///     number: String,
/// }
///
/// impl Typed for Invoice {
///     fn type_shape() -> &'static TypeShape {
///         static CELL: ShapeCell = ShapeCell::new();
///         CELL.get_or_init(|| {
///             ShapeBuilder::<Self>::new()
///                 .property("number", |i| &i.number, |i| &mut i.number)
///                 .build()
///         })
///     }
/// }
///
/// auto_register!(Invoice);
///
/// fn main() {
///     let mut registry = TypeRegistry::new();
///     assert!(registry.auto_register());
///     assert_eq!(registry.resolve_type("Invoice"), Some(TypeRef::bean::<Invoice>()));
/// }
/// ```
#[macro_export]
macro_rules! auto_register {
    (enum $($ty:ty),+ $(,)?) => {
        $(
            $crate::__macro_exports::inventory::submit! {
                $crate::registry::AutoRegisterFunc($crate::registry::register_enum::<$ty>)
            }
        )+
    };
    ($($ty:ty),+ $(,)?) => {
        $(
            $crate::__macro_exports::inventory::submit! {
                $crate::registry::AutoRegisterFunc($crate::registry::register_bean::<$ty>)
            }
        )+
    };
}
