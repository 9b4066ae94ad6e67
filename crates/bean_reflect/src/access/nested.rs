use crate::error::{BeanError, BeanResult, ResolutionError, ResolutionKind};
use crate::access::split_path;
use crate::info::{TypeRef, TypeShape};
use crate::metadata::PropertyDescriptor;
use crate::value::{Hop, HopMut, Value};
use crate::{Bean, BeanEngine};

fn not_traversable(owner: &'static str, property: &str) -> BeanError {
    ResolutionError::new(ResolutionKind::NotTraversable, owner, property).into()
}

// -----------------------------------------------------------------------------
// Single properties

impl BeanEngine {
    /// Returns the descriptor of `name` if it has a reader.
    pub fn reader_descriptor(
        &self,
        shape: &'static TypeShape,
        name: &str,
    ) -> BeanResult<PropertyDescriptor> {
        self.accessor(shape, name, ResolutionKind::NoReader, PropertyDescriptor::has_reader)
    }

    /// Returns the descriptor of `name` if it has a writer.
    pub fn writer_descriptor(
        &self,
        shape: &'static TypeShape,
        name: &str,
    ) -> BeanResult<PropertyDescriptor> {
        self.accessor(shape, name, ResolutionKind::NoWriter, PropertyDescriptor::has_writer)
    }

    /// Returns the descriptor of `name` if it has a reader and a writer.
    pub fn accessor_descriptor(
        &self,
        shape: &'static TypeShape,
        name: &str,
    ) -> BeanResult<PropertyDescriptor> {
        let desc = self.reader_descriptor(shape, name)?;
        if !desc.has_writer() {
            return Err(desc.missing(ResolutionKind::NoWriter).into());
        }
        Ok(desc)
    }

    fn accessor(
        &self,
        shape: &'static TypeShape,
        name: &str,
        kind: ResolutionKind,
        has: fn(&PropertyDescriptor) -> bool,
    ) -> BeanResult<PropertyDescriptor> {
        let table = self.metadata(shape)?;
        match table.get(name) {
            Some(desc) if has(desc) => Ok(desc.clone()),
            _ => Err(ResolutionError::new(kind, shape.type_path(), name).into()),
        }
    }

    /// Reads property `name` of `bean`.
    pub fn get_property(&self, bean: &dyn Bean, name: &str) -> BeanResult<Value> {
        let table = self.metadata(bean.bean_shape())?;
        match table.get(name) {
            Some(desc) => desc.read(bean),
            None => {
                Err(ResolutionError::new(ResolutionKind::NoReader, bean.type_path(), name).into())
            }
        }
    }

    /// Writes `value` to property `name` of `bean` as is.
    ///
    /// The value must already have the declared type; use
    /// [`set_bean_property`](Self::set_bean_property) to convert first.
    pub fn set_property(&self, bean: &mut dyn Bean, name: &str, value: Value) -> BeanResult<()> {
        let table = self.metadata(bean.bean_shape())?;
        match table.get(name) {
            Some(desc) => desc.write(bean, value),
            None => {
                Err(ResolutionError::new(ResolutionKind::NoWriter, bean.type_path(), name).into())
            }
        }
    }
}

// -----------------------------------------------------------------------------
// Nested paths

impl BeanEngine {
    /// Reads the property at dotted `path`, e.g. `address.line1`.
    ///
    /// A null bean met along the way ends the walk with [`Value::Null`].
    /// A segment without a reader is a [`ResolutionError`].
    pub fn get_nested(&self, bean: &dyn Bean, path: &str) -> BeanResult<Value> {
        let segments = split_path(bean.type_path(), path)?;
        self.read_path(bean, &segments, true)
            .map(|found| found.unwrap_or(Value::Null))
    }

    /// Like [`get_nested`](Self::get_nested), but returns `None` where
    /// `get_nested` fails to resolve a segment.
    pub fn find_nested(&self, bean: &dyn Bean, path: &str) -> BeanResult<Option<Value>> {
        let segments = split_path(bean.type_path(), path)?;
        self.read_path(bean, &segments, false)
    }

    fn read_path(
        &self,
        bean: &dyn Bean,
        segments: &[&str],
        strict: bool,
    ) -> BeanResult<Option<Value>> {
        let Some((&head, rest)) = segments.split_first() else {
            return Ok(None);
        };

        let owner = bean.type_path();
        let table = self.metadata(bean.bean_shape())?;
        let Some((desc, reader)) = table.get(head).and_then(|d| d.reader().map(|r| (d, r))) else {
            return if strict {
                Err(ResolutionError::new(ResolutionKind::NoReader, owner, head).into())
            } else {
                Ok(None)
            };
        };

        if rest.is_empty() {
            return desc.read(bean).map(Some);
        }

        let unwalkable = || if strict { Err(not_traversable(owner, head)) } else { Ok(None) };

        match reader.hop(bean) {
            Some(Ok(Hop::Bean(child))) => self.read_path(child, rest, strict),
            Some(Ok(Hop::Null)) => Ok(Some(Value::Null)),
            Some(Ok(Hop::Leaf)) => unwalkable(),
            Some(Err(e)) => Err(BeanError::from_invoke(e, owner, head)),
            None => match desc.read(bean)? {
                Value::Null => Ok(Some(Value::Null)),
                Value::Bean(child) => self.read_path(&*child, rest, strict),
                _ => unwalkable(),
            },
        }
    }

    /// Writes `value` as is to the property at dotted `path`.
    ///
    /// Every segment but the last must have a reader. If a bean along the
    /// way is null nothing is written.
    pub fn set_nested(&self, bean: &mut dyn Bean, path: &str, value: Value) -> BeanResult<()> {
        let segments = split_path(bean.type_path(), path)?;
        self.write_path(bean, &segments, |engine, target, name| {
            engine.set_property(target, name, value)
        })
    }

    /// Walks to the bean owning the last segment of `segments` and hands it
    /// to `write`.
    pub(crate) fn write_path<F>(
        &self,
        bean: &mut dyn Bean,
        segments: &[&str],
        write: F,
    ) -> BeanResult<()>
    where
        F: FnOnce(&Self, &mut dyn Bean, &str) -> BeanResult<()>,
    {
        let Some((&head, rest)) = segments.split_first() else {
            return Ok(());
        };
        if rest.is_empty() {
            return write(self, bean, head);
        }

        let owner = bean.type_path();
        let table = self.metadata(bean.bean_shape())?;
        let Some((desc, reader)) = table.get(head).and_then(|d| d.reader().map(|r| (d, r))) else {
            return Err(ResolutionError::new(ResolutionKind::NoReader, owner, head).into());
        };

        if reader.hop_mut.is_some() {
            return match reader.hop_mut(bean) {
                Some(Ok(HopMut::Bean(child))) => self.write_path(child, rest, write),
                Some(Ok(HopMut::Null)) => {
                    log::trace!("`{owner}.{head}` is null, nothing written");
                    Ok(())
                }
                Some(Ok(HopMut::Leaf)) | None => Err(not_traversable(owner, head)),
                Some(Err(e)) => Err(BeanError::from_invoke(e, owner, head)),
            };
        }

        // No mutable borrow available: update a copy and write it back.
        match desc.read(bean)? {
            Value::Null => {
                log::trace!("`{owner}.{head}` is null, nothing written");
                Ok(())
            }
            Value::Bean(mut child) if desc.has_writer() => {
                self.write_path(&mut *child, rest, write)?;
                desc.write(bean, Value::Bean(child))
            }
            _ => Err(not_traversable(owner, head)),
        }
    }

    /// Declared type of the property at dotted `path`, starting from `shape`.
    pub fn nested_field_type(&self, shape: &'static TypeShape, path: &str) -> BeanResult<TypeRef> {
        let segments = split_path(shape.type_path(), path)?;
        let mut current = shape;
        let mut declared = TypeRef::Any;
        for (at, segment) in segments.iter().enumerate() {
            if at > 0 {
                current = match &declared {
                    TypeRef::Bean(bean) => bean.shape(),
                    _ => return Err(not_traversable(current.type_path(), segments[at - 1])),
                };
            }
            let table = self.metadata(current)?;
            declared = match table.get(segment) {
                Some(desc) => desc.declared().clone(),
                None => {
                    let owner = current.type_path();
                    let cause = ResolutionError::new(ResolutionKind::NoReader, owner, *segment);
                    return Err(cause.into());
                }
            };
        }
        Ok(declared)
    }

    /// Returns `true` if every segment of `path` has a reader.
    pub fn is_gettable(&self, shape: &'static TypeShape, path: &str) -> BeanResult<bool> {
        self.path_has(shape, path, PropertyDescriptor::has_reader)
    }

    /// Returns `true` if every segment of `path` but the last has a reader
    /// and the last has a writer.
    pub fn is_settable(&self, shape: &'static TypeShape, path: &str) -> BeanResult<bool> {
        self.path_has(shape, path, PropertyDescriptor::has_writer)
    }

    fn path_has(
        &self,
        shape: &'static TypeShape,
        path: &str,
        last: fn(&PropertyDescriptor) -> bool,
    ) -> BeanResult<bool> {
        let segments = split_path(shape.type_path(), path)?;
        let mut current = shape;
        for (at, segment) in segments.iter().enumerate() {
            let table = self.metadata(current)?;
            let Some(desc) = table.get(segment) else {
                return Ok(false);
            };
            if at + 1 == segments.len() {
                return Ok(last(desc));
            }
            match desc.declared() {
                TypeRef::Bean(bean) if desc.has_reader() => current = bean.shape(),
                _ => return Ok(false),
            }
        }
        Ok(false)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use super::*;
    use crate::Typed;
    use crate::error::ErrorKind;
    use crate::info::{ScalarKind, ShapeBuilder, ShapeCell};

    #[derive(Debug, Clone, PartialEq, Default)]
    struct Address {
        line1: String,
    }

    impl Typed for Address {
        fn type_shape() -> &'static TypeShape {
            static CELL: ShapeCell = ShapeCell::new();
            CELL.get_or_init(|| {
                ShapeBuilder::<Self>::new()
                    .property("line1", |a| &a.line1, |a| &mut a.line1)
                    .constructible()
                    .build()
            })
        }
    }

    #[derive(Debug, Clone, PartialEq, Default)]
    struct Customer {
        name: String,
        address: Address,
        billing: Option<Address>,
    }

    impl Typed for Customer {
        fn type_shape() -> &'static TypeShape {
            static CELL: ShapeCell = ShapeCell::new();
            CELL.get_or_init(|| {
                ShapeBuilder::<Self>::new()
                    .property("name", |c| &c.name, |c| &mut c.name)
                    .property("address", |c| &c.address, |c| &mut c.address)
                    .property("billing", |c| &c.billing, |c| &mut c.billing)
                    .constructible()
                    .build()
            })
        }
    }

    #[test]
    fn nested_get_and_set() {
        let engine = BeanEngine::new();
        let mut customer = Customer::default();
        engine
            .set_nested(&mut customer, "address.line1", Value::from("24 Parklane"))
            .unwrap();
        assert_eq!(customer.address.line1, "24 Parklane");
        assert_eq!(
            engine.get_nested(&customer, "address.line1").unwrap(),
            Value::from("24 Parklane")
        );
    }

    #[test]
    fn null_intermediate() {
        let engine = BeanEngine::new();
        let mut customer = Customer::default();

        assert_eq!(engine.get_nested(&customer, "billing.line1").unwrap(), Value::Null);
        assert_eq!(engine.find_nested(&customer, "billing.line1").unwrap(), Some(Value::Null));

        engine
            .set_nested(&mut customer, "billing.line1", Value::from("skipped"))
            .unwrap();
        assert_eq!(customer.billing, None);

        customer.billing = Some(Address::default());
        engine
            .set_nested(&mut customer, "billing.line1", Value::from("1 Main"))
            .unwrap();
        assert_eq!(customer.billing.as_ref().unwrap().line1, "1 Main");
    }

    #[test]
    fn get_fails_where_find_does_not() {
        let engine = BeanEngine::new();
        let customer = Customer::default();

        let err = engine.get_nested(&customer, "address.zip").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Resolution);
        assert_eq!(err.property(), Some("zip"));
        assert_eq!(engine.find_nested(&customer, "address.zip").unwrap(), None);

        // `name` is a string and cannot be walked into.
        assert!(engine.get_nested(&customer, "name.length").is_err());
        assert_eq!(engine.find_nested(&customer, "name.length").unwrap(), None);

        assert!(engine.get_nested(&customer, "address..line1").is_err());
    }

    #[test]
    fn path_introspection() {
        let engine = BeanEngine::new();
        let shape = Customer::type_shape();
        assert_eq!(
            engine.nested_field_type(shape, "address.line1").unwrap(),
            TypeRef::Primitive(ScalarKind::String)
        );
        assert_eq!(engine.nested_field_type(shape, "address").unwrap(), TypeRef::bean::<Address>());
        assert!(engine.nested_field_type(shape, "name.x").is_err());

        assert!(engine.is_gettable(shape, "address.line1").unwrap());
        assert!(engine.is_settable(shape, "billing.line1").unwrap());
        assert!(!engine.is_gettable(shape, "address.zip").unwrap());
        assert!(!engine.is_settable(shape, "name.x").unwrap());
    }

    #[test]
    fn descriptor_lookups() {
        let engine = BeanEngine::new();
        let shape = Customer::type_shape();
        let desc = engine.accessor_descriptor(shape, "name").unwrap();
        assert_eq!(desc.reader().unwrap().method(), "getName");
        assert_eq!(desc.writer().unwrap().method(), "setName");

        let err = engine.writer_descriptor(shape, "missing").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Resolution);
    }
}
