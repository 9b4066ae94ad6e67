use alloc::string::String;
use core::any::TypeId;

use bean_utils::TypeIdMap;
use bean_utils::hash::{HashMap, HashSet};

use crate::Typed;
use crate::info::{BeanRef, EnumRef, EnumType, TypeRef};
use crate::registry::TypeResolver;

// -----------------------------------------------------------------------------
// TypeRegistry

/// A name-to-type table for bean and enum types.
///
/// Types are found by full path (`my_app::model::Customer`) or, when
/// unambiguous, by short name (`Customer`). A short name shared by two
/// registered types resolves to nothing.
///
/// The registry also records element types of container properties whose
/// signatures leave them open, keyed by owner path and property name.
///
/// # Examples
///
/// ```
/// use bean_reflect::registry::{TypeRegistry, TypeResolver};
/// use bean_reflect::info::{ScalarKind, TypeRef};
///
/// let mut registry = TypeRegistry::new();
/// registry.register_element_type("app::Order", "lines", TypeRef::Scalar(ScalarKind::I64));
///
/// assert_eq!(
///     registry.element_type("app::Order", "lines"),
///     Some(TypeRef::Scalar(ScalarKind::I64))
/// );
/// assert_eq!(registry.resolve_type("Order"), None);
/// ```
#[derive(Default)]
pub struct TypeRegistry {
    types: TypeIdMap<TypeRef>,
    type_path_to_id: HashMap<&'static str, TypeId>,
    type_name_to_id: HashMap<&'static str, TypeId>,
    ambiguous_names: HashSet<&'static str>,
    element_types: HashMap<(String, String), TypeRef>,
}

impl TypeRegistry {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    // # Validity
    // The type must **not** already exist.
    fn add_new_type_indices(&mut self, id: TypeId, path: &'static str, name: &'static str) {
        if !self.ambiguous_names.contains(name) {
            if self.type_name_to_id.contains_key(name) {
                self.type_name_to_id.remove(name);
                self.ambiguous_names.insert(name);
            } else {
                self.type_name_to_id.insert(name, id);
            }
        }
        self.type_path_to_id.insert(path, id);
    }

    fn register_internal(
        &mut self,
        ty: TypeRef,
        id: TypeId,
        path: &'static str,
        name: &'static str,
    ) -> bool {
        if self.types.try_insert(id, || ty) {
            self.add_new_type_indices(id, path, name);
            log::trace!("registered `{path}`");
            true
        } else {
            false
        }
    }

    /// Registers bean type `T`. Returns `false` if it was already present.
    pub fn register<T: Typed>(&mut self) -> bool {
        let shape = T::type_shape();
        self.register_internal(
            TypeRef::Bean(BeanRef::of::<T>()),
            TypeId::of::<T>(),
            shape.type_path(),
            shape.type_name(),
        )
    }

    /// Registers enum type `E`. Returns `false` if it was already present.
    pub fn register_enum<E: EnumType>(&mut self) -> bool {
        let shape = E::enum_shape();
        self.register_internal(
            TypeRef::Enum(EnumRef::of::<E>()),
            TypeId::of::<E>(),
            shape.type_path(),
            shape.type_name(),
        )
    }

    /// Records the element type of `owner_path.property`, replacing any
    /// earlier record.
    pub fn register_element_type(
        &mut self,
        owner_path: impl Into<String>,
        property: impl Into<String>,
        element: TypeRef,
    ) {
        self.element_types
            .insert((owner_path.into(), property.into()), element);
    }

    #[inline]
    pub fn contains(&self, type_id: TypeId) -> bool {
        self.types.contains(&type_id)
    }

    #[inline]
    pub fn get(&self, type_id: TypeId) -> Option<&TypeRef> {
        self.types.get(&type_id)
    }

    pub fn get_with_type_path(&self, type_path: &str) -> Option<&TypeRef> {
        self.type_path_to_id
            .get(type_path)
            .and_then(|id| self.types.get(id))
    }

    /// Returns `None` for unknown or ambiguous names.
    pub fn get_with_type_name(&self, type_name: &str) -> Option<&TypeRef> {
        self.type_name_to_id
            .get(type_name)
            .and_then(|id| self.types.get(id))
    }

    #[inline]
    pub fn is_ambiguous(&self, type_name: &str) -> bool {
        self.ambiguous_names.contains(type_name)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Registers every type submitted with [`auto_register!`](crate::auto_register).
    ///
    /// Returns `false` when the `auto_register` feature is disabled.
    pub fn auto_register(&mut self) -> bool {
        #[cfg(feature = "auto_register")]
        {
            for entry in inventory::iter::<crate::registry::AutoRegisterFunc> {
                (entry.0)(self);
            }
            true
        }
        #[cfg(not(feature = "auto_register"))]
        {
            false
        }
    }
}

impl TypeResolver for TypeRegistry {
    fn resolve_type(&self, name: &str) -> Option<TypeRef> {
        self.get_with_type_path(name)
            .or_else(|| self.get_with_type_name(name))
            .cloned()
    }

    fn element_type(&self, owner_path: &str, property: &str) -> Option<TypeRef> {
        self.element_types
            .get(&(String::from(owner_path), String::from(property)))
            .cloned()
    }
}

impl core::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.type_path_to_id.keys()).finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::info::{ShapeBuilder, ShapeCell, TypeShape};

    mod a {
        use super::*;

        #[derive(Debug, Clone, PartialEq, Default)]
        pub struct Item;

        impl Typed for Item {
            fn type_shape() -> &'static TypeShape {
                static CELL: ShapeCell = ShapeCell::new();
                CELL.get_or_init(|| ShapeBuilder::<Self>::new().constructible().build())
            }
        }
    }

    mod b {
        use super::*;

        #[derive(Debug, Clone, PartialEq)]
        pub struct Item;

        impl Typed for Item {
            fn type_shape() -> &'static TypeShape {
                static CELL: ShapeCell = ShapeCell::new();
                CELL.get_or_init(|| ShapeBuilder::<Self>::new().build())
            }
        }
    }

    #[test]
    fn short_names_become_ambiguous() {
        let mut registry = TypeRegistry::new();
        assert!(registry.register::<a::Item>());
        assert!(!registry.register::<a::Item>());
        assert_eq!(registry.resolve_type("Item"), Some(TypeRef::bean::<a::Item>()));

        assert!(registry.register::<b::Item>());
        assert!(registry.is_ambiguous("Item"));
        assert_eq!(registry.resolve_type("Item"), None);

        let path = core::any::type_name::<b::Item>();
        assert_eq!(registry.resolve_type(path), Some(TypeRef::bean::<b::Item>()));
        assert_eq!(registry.len(), 2);
    }
}
