use alloc::string::String;
use alloc::sync::Arc;

use crate::convert::{ScalarConverter, StandardConverter};
use crate::error::{BeanResult, ResolutionError, ResolutionKind};
use crate::info::{TypeRef, TypeShape};
use crate::metadata::{MetadataCache, NestedProperty, PropertyDescriptor, TypeMetadata};
use crate::registry::{ResolverSlot, TypeResolver};
use crate::tree::ScalarTable;
use crate::Typed;

// -----------------------------------------------------------------------------
// EngineConfig

/// Tunables of a [`BeanEngine`].
///
/// # Examples
///
/// ```
/// use bean_reflect::{BeanEngine, EngineConfig};
///
/// let config = EngineConfig::default()
///     .with_max_depth(16)
///     .with_date_format("%d/%m/%Y");
/// let engine = BeanEngine::with_config(config);
/// assert_eq!(engine.config().max_depth, 16);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct EngineConfig {
    /// Deepest value nesting a tree walk enters. Default `128`.
    pub max_depth: usize,
    /// Convert null to the empty value of a primitive target. Default `true`.
    pub substitute_null_defaults: bool,
    /// `strftime` pattern for dates read from and written as text.
    /// RFC 3339 when unset.
    pub date_format: Option<String>,
}

impl Default for EngineConfig {
    #[inline]
    fn default() -> Self {
        Self {
            max_depth: 128,
            substitute_null_defaults: true,
            date_format: None,
        }
    }
}

impl EngineConfig {
    #[inline]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[inline]
    pub fn with_null_defaults(mut self, substitute: bool) -> Self {
        self.substitute_null_defaults = substitute;
        self
    }

    #[inline]
    pub fn with_date_format(mut self, pattern: impl Into<String>) -> Self {
        self.date_format = Some(pattern.into());
        self
    }
}

// -----------------------------------------------------------------------------
// BeanEngine

/// The root object: metadata cache, converters and the optional type
/// resolver.
///
/// Every operation takes `&self`; an engine can be shared between threads.
/// Engines are independent of each other.
///
/// # Operations
///
/// - metadata: [`metadata`](Self::metadata), [`field_names`](Self::field_names),
///   [`nested_field_names`](Self::nested_field_names),
///   [`nested_properties_with_readers`](Self::nested_properties_with_readers);
/// - property access: [`get_property`](Self::get_property),
///   [`get_nested`](Self::get_nested), [`set_nested`](Self::set_nested) and friends;
/// - conversion: [`convert`](Self::convert), [`populate_bean`](Self::populate_bean),
///   [`set_bean_property`](Self::set_bean_property) and friends;
/// - trees: [`serialize`](Self::serialize), [`deserialize`](Self::deserialize) and friends;
/// - whole beans: [`bean_equals`](Self::bean_equals), [`bean_hash`](Self::bean_hash),
///   [`shallow_copy`](Self::shallow_copy).
pub struct BeanEngine {
    pub(crate) config: EngineConfig,
    pub(crate) cache: MetadataCache,
    pub(crate) converter: Arc<dyn ScalarConverter>,
    pub(crate) scalars: ScalarTable,
    pub(crate) resolver: ResolverSlot,
}

impl Default for BeanEngine {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl BeanEngine {
    #[inline]
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let converter: Arc<dyn ScalarConverter> = Arc::new(StandardConverter);
        Self {
            scalars: ScalarTable::new(config.date_format.as_deref(), &converter),
            config,
            cache: MetadataCache::new(),
            converter,
            resolver: ResolverSlot::new(),
        }
    }

    /// Replaces the scalar converter, for conversions and tree leaves alike.
    #[must_use]
    pub fn with_converter(mut self, converter: Arc<dyn ScalarConverter>) -> Self {
        self.scalars = ScalarTable::new(self.config.date_format.as_deref(), &converter);
        self.converter = converter;
        self
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[inline]
    pub fn cache(&self) -> &MetadataCache {
        &self.cache
    }

    // -------------------------------------------------------------------------
    // Type resolver

    /// Installs `resolver`, returning the one it replaces.
    ///
    /// Metadata resolved before the call is kept; element types it left
    /// open are looked up again on use.
    pub fn register_type_resolver(
        &self,
        resolver: Arc<dyn TypeResolver>,
    ) -> Option<Arc<dyn TypeResolver>> {
        log::debug!("type resolver registered");
        self.resolver.register(resolver)
    }

    pub fn unregister_type_resolver(&self) -> Option<Arc<dyn TypeResolver>> {
        self.resolver.unregister()
    }

    /// Resolves a type path or short name through the registered resolver.
    pub fn resolve_type(&self, name: &str) -> BeanResult<TypeRef> {
        self.resolver
            .current()
            .and_then(|resolver| resolver.resolve_type(name))
            .ok_or_else(|| {
                ResolutionError::new(ResolutionKind::UnknownType, String::from(name), "").into()
            })
    }

    // -------------------------------------------------------------------------
    // Metadata

    /// Returns the property table of `shape`, resolving it on first use.
    pub fn metadata(&self, shape: &'static TypeShape) -> BeanResult<Arc<TypeMetadata>> {
        let hook = self.resolver.current();
        self.cache.metadata(shape, hook.as_deref())
    }

    #[inline]
    pub fn metadata_of<T: Typed>(&self) -> BeanResult<Arc<TypeMetadata>> {
        self.metadata(T::type_shape())
    }

    /// Names of field-backed properties with both a reader and a writer,
    /// sorted.
    pub fn field_names(&self, shape: &'static TypeShape) -> BeanResult<Arc<[String]>> {
        let hook = self.resolver.current();
        self.cache.field_names(shape, hook.as_deref())
    }

    /// [`field_names`](Self::field_names) expanded into every bean-typed
    /// field as dotted paths, sorted.
    ///
    /// ```
    /// # use bean_reflect::{BeanEngine, Typed};
    /// # use bean_reflect::info::{ShapeBuilder, ShapeCell, TypeShape};
    /// # #[derive(Debug, Clone, PartialEq, Default)]
    /// # struct Address { line1: String }
    /// # impl Typed for Address {
    /// #     fn type_shape() -> &'static TypeShape {
    /// #         static CELL: ShapeCell = ShapeCell::new();
    /// #         CELL.get_or_init(|| ShapeBuilder::<Self>::new()
    /// #             .property("line1", |a| &a.line1, |a| &mut a.line1)
    /// #             .build())
    /// #     }
    /// # }
    /// # #[derive(Debug, Clone, PartialEq, Default)]
    /// # struct Customer { name: String, address: Address }
    /// # impl Typed for Customer {
    /// #     fn type_shape() -> &'static TypeShape {
    /// #         static CELL: ShapeCell = ShapeCell::new();
    /// #         CELL.get_or_init(|| ShapeBuilder::<Self>::new()
    /// #             .property("name", |c| &c.name, |c| &mut c.name)
    /// #             .property("address", |c| &c.address, |c| &mut c.address)
    /// #             .build())
    /// #     }
    /// # }
    /// let engine = BeanEngine::new();
    /// let names = engine.nested_field_names(Customer::type_shape()).unwrap();
    /// assert_eq!(&*names, ["address", "address.line1", "name"]);
    /// ```
    pub fn nested_field_names(&self, shape: &'static TypeShape) -> BeanResult<Arc<[String]>> {
        let hook = self.resolver.current();
        self.cache.nested_field_names(shape, hook.as_deref())
    }

    /// Every readable property reachable from `shape`, sorted by path.
    pub fn nested_properties_with_readers(
        &self,
        shape: &'static TypeShape,
    ) -> BeanResult<Arc<[NestedProperty]>> {
        let hook = self.resolver.current();
        self.cache.nested_properties_with_readers(shape, hook.as_deref())
    }

    /// Element type `index` of `desc`.
    ///
    /// An element type the signatures left open is asked of the registered
    /// resolver and, once found, kept in the descriptor. Only the element of
    /// a collection (index `0`) and the value of a map (index `1`) are looked
    /// up this way.
    pub fn element_type(&self, desc: &PropertyDescriptor, index: usize) -> Option<TypeRef> {
        if let Some(known) = desc.element_type(index) {
            return Some(known.clone());
        }
        if !matches!((desc.declared(), index), (TypeRef::Collection(_), 0) | (TypeRef::Map, 1)) {
            return None;
        }

        let found = self
            .resolver
            .current()?
            .element_type(desc.owner().type_path(), desc.name())?;
        log::trace!(
            "element type of `{}.{}` resolved late as {found}",
            desc.owner().type_path(),
            desc.name()
        );
        desc.back_fill(index, found).cloned()
    }
}

impl core::fmt::Debug for BeanEngine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BeanEngine")
            .field("config", &self.config)
            .field("cache", &self.cache)
            .field("resolver", &self.resolver)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::info::{CollectionKind, GenericArg, GenericType, ScalarKind, ShapeBuilder, ShapeCell};
    use crate::registry::TypeRegistry;
    use crate::value::Value;
    use alloc::vec::Vec;

    #[derive(Debug, Clone, PartialEq, Default)]
    struct Batch {
        rows: Vec<Value>,
    }

    fn open_list() -> GenericType {
        GenericType::with_args(
            TypeRef::Collection(CollectionKind::List),
            [GenericArg::Variable("T")],
        )
    }

    impl Typed for Batch {
        fn type_shape() -> &'static TypeShape {
            static CELL: ShapeCell = ShapeCell::new();
            CELL.get_or_init(|| {
                ShapeBuilder::<Self>::new()
                    .field("rows", open_list())
                    .reader("getRows", open_list(), |b| {
                        Value::Collection(CollectionKind::List, b.rows.clone())
                    })
                    .writer("setRows", open_list(), |b, value| {
                        b.rows = value.take()?;
                        Ok(())
                    })
                    .constructible()
                    .build()
            })
        }
    }

    #[test]
    fn unknown_names_need_a_resolver() {
        let engine = BeanEngine::new();
        let err = engine.resolve_type("Batch").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Resolution);

        let mut registry = TypeRegistry::new();
        registry.register::<Batch>();
        engine.register_type_resolver(Arc::new(registry));
        assert_eq!(engine.resolve_type("Batch").unwrap(), TypeRef::bean::<Batch>());

        assert!(engine.unregister_type_resolver().is_some());
        assert!(engine.resolve_type("Batch").is_err());
    }

    #[test]
    fn open_element_types_are_filled_late() {
        let engine = BeanEngine::new();
        let table = engine.metadata_of::<Batch>().unwrap();
        let rows = table.get("rows").unwrap();
        assert_eq!(engine.element_type(rows, 0), None);

        let mut batch = Batch::default();
        engine
            .set_bean_property(&mut batch, "rows", Value::from("7"))
            .unwrap();
        assert_eq!(batch.rows, [Value::from("7")]);

        let mut registry = TypeRegistry::new();
        let path = Batch::type_shape().type_path();
        registry.register_element_type(path, "rows", TypeRef::Primitive(ScalarKind::I32));
        engine.register_type_resolver(Arc::new(registry));

        engine
            .set_bean_property(&mut batch, "rows", Value::from("7"))
            .unwrap();
        assert_eq!(batch.rows, [Value::I32(7)]);
        assert_eq!(rows.element_type(0), Some(&TypeRef::Primitive(ScalarKind::I32)));

        // A list has no second argument to fill.
        assert_eq!(engine.element_type(rows, 1), None);
        assert_eq!(rows.element_type(1), None);
    }

    #[test]
    fn engines_are_independent() {
        let a = BeanEngine::new();
        let b = BeanEngine::with_config(EngineConfig::default().with_null_defaults(false));
        a.metadata_of::<Batch>().unwrap();
        assert_eq!(a.cache().len(), 1);
        assert!(b.cache().is_empty());

        let target = TypeRef::Primitive(ScalarKind::I32);
        assert_eq!(a.convert(&target, Value::Null).unwrap(), Value::I32(0));
        assert_eq!(b.convert(&target, Value::Null).unwrap(), Value::Null);
    }
}
