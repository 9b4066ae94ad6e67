use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::TypeId;
use std::sync::{PoisonError, RwLock};

use bean_utils::TypeIdMap;
use bean_utils::naming::join_path;

use crate::error::BeanResult;
use crate::info::{BeanRef, TypeRef, TypeShape};
use crate::metadata::{TypeMetadata, resolver};
use crate::registry::TypeResolver;

// -----------------------------------------------------------------------------
// NestedProperty

/// One readable property reached from a root type, see
/// [`MetadataCache::nested_properties_with_readers`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedProperty {
    path: String,
    owner: BeanRef,
    declared: TypeRef,
}

impl NestedProperty {
    /// Dotted path from the root type.
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The type declaring the last segment.
    #[inline]
    pub fn owner(&self) -> BeanRef {
        self.owner
    }

    #[inline]
    pub fn declared(&self) -> &TypeRef {
        &self.declared
    }
}

// -----------------------------------------------------------------------------
// MetadataCache

/// Per-type memo of [`TypeMetadata`] and the views derived from it.
///
/// Entries are computed outside any lock and inserted under a short write
/// lock; when two threads race on the same type the first insert is kept
/// and the other result is dropped. A failed resolution is never stored.
#[derive(Default)]
pub struct MetadataCache {
    tables: RwLock<TypeIdMap<Arc<TypeMetadata>>>,
    field_names: RwLock<TypeIdMap<Arc<[String]>>>,
    nested_field_names: RwLock<TypeIdMap<Arc<[String]>>>,
    nested_readers: RwLock<TypeIdMap<Arc<[NestedProperty]>>>,
}

fn memoize<V: Clone>(
    slot: &RwLock<TypeIdMap<V>>,
    id: TypeId,
    path: &str,
    compute: impl FnOnce() -> BeanResult<V>,
) -> BeanResult<V> {
    if let Some(hit) = slot.read().unwrap_or_else(PoisonError::into_inner).get(&id) {
        return Ok(hit.clone());
    }

    let value = compute()?;

    let mut guard = slot.write().unwrap_or_else(PoisonError::into_inner);
    if !guard.try_insert(id, || value.clone()) {
        log::debug!("discarding a racing resolution of `{path}`");
    }
    // Present either way.
    Ok(guard.get(&id).cloned().unwrap_or(value))
}

impl MetadataCache {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the metadata table of `shape`, resolving it on first use.
    pub fn metadata(
        &self,
        shape: &'static TypeShape,
        hook: Option<&dyn TypeResolver>,
    ) -> BeanResult<Arc<TypeMetadata>> {
        memoize(&self.tables, shape.bean_ref().id(), shape.type_path(), || {
            let table = resolver::resolve(shape, hook)?;
            log::debug!("resolved {} properties of `{}`", table.len(), shape.type_path());
            Ok(Arc::new(table))
        })
    }

    /// Names of properties that are field-backed, readable and writable,
    /// sorted.
    pub fn field_names(
        &self,
        shape: &'static TypeShape,
        hook: Option<&dyn TypeResolver>,
    ) -> BeanResult<Arc<[String]>> {
        memoize(&self.field_names, shape.bean_ref().id(), shape.type_path(), || {
            let table = self.metadata(shape, hook)?;
            Ok(table
                .iter()
                .filter(|p| p.is_field_backed() && p.has_reader() && p.has_writer())
                .map(|p| p.name().into())
                .collect())
        })
    }

    /// Field names of `shape` and, below every bean-typed field, the dotted
    /// field names of that type, sorted.
    ///
    /// A type already being expanded higher up the same path is listed but
    /// not expanded again.
    pub fn nested_field_names(
        &self,
        shape: &'static TypeShape,
        hook: Option<&dyn TypeResolver>,
    ) -> BeanResult<Arc<[String]>> {
        memoize(&self.nested_field_names, shape.bean_ref().id(), shape.type_path(), || {
            let mut names = Vec::new();
            let mut on_path = Vec::new();
            self.expand_field_names(shape, "", hook, &mut on_path, &mut names)?;
            names.sort_unstable();
            Ok(names.into())
        })
    }

    fn expand_field_names(
        &self,
        shape: &'static TypeShape,
        prefix: &str,
        hook: Option<&dyn TypeResolver>,
        on_path: &mut Vec<TypeId>,
        out: &mut Vec<String>,
    ) -> BeanResult<()> {
        let id = shape.bean_ref().id();
        if on_path.contains(&id) {
            log::trace!("`{}` already expanded above `{prefix}`", shape.type_path());
            return Ok(());
        }
        on_path.push(id);

        let table = self.metadata(shape, hook)?;
        for name in self.field_names(shape, hook)?.iter() {
            let path = join_path(prefix, name);
            out.push(path.clone());
            if let Some(TypeRef::Bean(child)) = table.get(name).map(|p| p.declared()) {
                self.expand_field_names(child.shape(), &path, hook, on_path, out)?;
            }
        }

        // The inner value of a wrapper is reached through `data`.
        if let Some(TypeRef::Bean(inner)) = shape.wrapped().map(|w| w.raw()) {
            let path = join_path(prefix, "data");
            self.expand_field_names(inner.shape(), &path, hook, on_path, out)?;
        }

        on_path.pop();
        Ok(())
    }

    /// Every readable property path reachable from `shape`, depth first,
    /// sorted by path.
    ///
    /// A type already on the current path is not entered again, so
    /// self-referencing types terminate.
    pub fn nested_properties_with_readers(
        &self,
        shape: &'static TypeShape,
        hook: Option<&dyn TypeResolver>,
    ) -> BeanResult<Arc<[NestedProperty]>> {
        memoize(&self.nested_readers, shape.bean_ref().id(), shape.type_path(), || {
            let mut found = Vec::new();
            let mut on_path = Vec::new();
            self.walk_readers(shape, "", hook, &mut on_path, &mut found)?;
            found.sort_unstable_by(|a: &NestedProperty, b| a.path.cmp(&b.path));
            Ok(found.into())
        })
    }

    fn walk_readers(
        &self,
        shape: &'static TypeShape,
        prefix: &str,
        hook: Option<&dyn TypeResolver>,
        on_path: &mut Vec<TypeId>,
        out: &mut Vec<NestedProperty>,
    ) -> BeanResult<()> {
        let id = shape.bean_ref().id();
        if on_path.contains(&id) {
            return Ok(());
        }
        on_path.push(id);

        let table = self.metadata(shape, hook)?;
        for property in table.iter().filter(|p| p.has_reader()) {
            let path = join_path(prefix, property.name());
            if let TypeRef::Bean(child) = property.declared() {
                self.walk_readers(child.shape(), &path, hook, on_path, out)?;
            }
            out.push(NestedProperty {
                path,
                owner: table.owner(),
                declared: property.declared().clone(),
            });
        }

        on_path.pop();
        Ok(())
    }

    /// Number of cached metadata tables.
    pub fn len(&self) -> usize {
        self.tables.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every cached entry.
    pub fn clear(&self) {
        self.tables.write().unwrap_or_else(PoisonError::into_inner).clear();
        self.field_names.write().unwrap_or_else(PoisonError::into_inner).clear();
        self.nested_field_names.write().unwrap_or_else(PoisonError::into_inner).clear();
        self.nested_readers.write().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

impl core::fmt::Debug for MetadataCache {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MetadataCache")
            .field("tables", &self.len())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::boxed::Box;
    use crate::Typed;
    use crate::info::{ScalarKind, ShapeBuilder, ShapeCell};
    use crate::value::Value;

    #[derive(Debug, Clone, PartialEq, Default)]
    struct Leaf {
        label: String,
    }

    impl Typed for Leaf {
        fn type_shape() -> &'static TypeShape {
            static CELL: ShapeCell = ShapeCell::new();
            CELL.get_or_init(|| {
                ShapeBuilder::<Self>::new()
                    .property("label", |l| &l.label, |l| &mut l.label)
                    .constructible()
                    .build()
            })
        }
    }

    // A tree node whose child is declared through explicit accessors.
    #[derive(Debug, Clone, PartialEq, Default)]
    struct Node {
        leaf: Leaf,
        next: Option<Box<Node>>,
    }

    impl Typed for Node {
        fn type_shape() -> &'static TypeShape {
            static CELL: ShapeCell = ShapeCell::new();
            CELL.get_or_init(|| {
                ShapeBuilder::<Self>::new()
                    .property("leaf", |n| &n.leaf, |n| &mut n.leaf)
                    .field("next", TypeRef::bean::<Node>())
                    .reader("getNext", TypeRef::bean::<Node>(), |n| {
                        n.next.as_ref().map_or(Value::Null, |next| Value::from((**next).clone()))
                    })
                    .writer("setNext", TypeRef::bean::<Node>(), |n, value| {
                        n.next = value.take::<Option<Node>>()?.map(Box::new);
                        Ok(())
                    })
                    .reader("getDepth", TypeRef::Primitive(ScalarKind::I32), |_| Value::I32(0))
                    .constructible()
                    .build()
            })
        }
    }

    #[test]
    fn tables_are_memoized() {
        let cache = MetadataCache::new();
        let first = cache.metadata(Leaf::type_shape(), None).unwrap();
        let second = cache.metadata(Leaf::type_shape(), None).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
        let third = cache.metadata(Leaf::type_shape(), None).unwrap();
        assert_eq!(*first, *third);
    }

    #[test]
    fn self_nesting_types_terminate() {
        let cache = MetadataCache::new();
        let names = cache.nested_field_names(Node::type_shape(), None).unwrap();
        assert_eq!(&*names, ["leaf", "leaf.label", "next"]);

        let readers = cache.nested_properties_with_readers(Node::type_shape(), None).unwrap();
        let paths: Vec<&str> = readers.iter().map(NestedProperty::path).collect();
        assert_eq!(paths, ["depth", "leaf", "leaf.label", "next"]);
        assert_eq!(readers[2].owner(), BeanRef::of::<Leaf>());
    }

    #[test]
    fn field_names_skip_computed_properties() {
        let cache = MetadataCache::new();
        let names = cache.field_names(Node::type_shape(), None).unwrap();
        assert_eq!(&*names, ["leaf", "next"]);
    }
}
