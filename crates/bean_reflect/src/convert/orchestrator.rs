use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use crate::access::split_path;
use crate::convert::ValueFormatter;
use crate::error::{
    BeanError, BeanResult, CoercionError, ConversionError, ResolutionError, ResolutionKind,
};
use crate::info::{BeanRef, CollectionKind, EnumRef, GenericType, ScalarKind, TypeRef};
use crate::value::{EnumValue, Value, empty_value};
use crate::{Bean, BeanEngine};

type Formatter<'f> = Option<&'f dyn ValueFormatter>;

fn unsupported(target: &TypeRef, value: &Value) -> BeanError {
    ConversionError::new(alloc::format!("{target}"), value.kind_name()).into()
}

// A one-element array or collection stands for its element.
fn unwrap_single(value: Value) -> Value {
    match value {
        Value::Array(_, mut items) | Value::Collection(_, mut items) if items.len() == 1 => {
            items.pop().unwrap_or(Value::Null)
        }
        other => other,
    }
}

// -----------------------------------------------------------------------------
// Conversion

impl BeanEngine {
    /// Converts `value` to `target`.
    ///
    /// A value already of the target type is returned unchanged, except
    /// collections and maps which are always rebuilt. Element types of
    /// collections are unknown here, so elements are kept as they are; use
    /// [`convert_generic`](Self::convert_generic) or
    /// [`convert_collection`](Self::convert_collection) to convert them too.
    ///
    /// # Examples
    ///
    /// ```
    /// use bean_reflect::BeanEngine;
    /// use bean_reflect::info::{ScalarKind, TypeRef};
    /// use bean_reflect::value::Value;
    ///
    /// let engine = BeanEngine::new();
    /// let age = engine.convert(&TypeRef::Primitive(ScalarKind::I32), Value::from("42")).unwrap();
    /// assert_eq!(age, Value::I32(42));
    ///
    /// // Null becomes the primitive's empty value.
    /// let age = engine.convert(&TypeRef::Primitive(ScalarKind::I32), Value::Null).unwrap();
    /// assert_eq!(age, Value::I32(0));
    /// ```
    #[inline]
    pub fn convert(&self, target: &TypeRef, value: Value) -> BeanResult<Value> {
        self.coerce(target, [None, None], value, None)
    }

    /// Like [`convert`](Self::convert), with `formatter` applied before
    /// scalar coercion.
    #[inline]
    pub fn convert_with(
        &self,
        target: &TypeRef,
        value: Value,
        formatter: &dyn ValueFormatter,
    ) -> BeanResult<Value> {
        self.coerce(target, [None, None], value, Some(formatter))
    }

    /// Converts `value` to a type with generic arguments, e.g. `List<i32>`.
    pub fn convert_generic(&self, target: &GenericType, value: Value) -> BeanResult<Value> {
        self.coerce(target.raw(), [target.argument(0), target.argument(1)], value, None)
    }

    /// Converts `value` to a collection of `kind` whose elements are
    /// converted to `element`. A lone scalar becomes a one-element
    /// collection.
    ///
    /// ```
    /// use bean_reflect::BeanEngine;
    /// use bean_reflect::info::{CollectionKind, ScalarKind, TypeRef};
    /// use bean_reflect::value::Value;
    ///
    /// let engine = BeanEngine::new();
    /// let element = TypeRef::Primitive(ScalarKind::String);
    /// let list = engine
    ///     .convert_collection(CollectionKind::List, &element, Value::from("abc"))
    ///     .unwrap();
    /// assert_eq!(list, Value::Collection(CollectionKind::List, vec![Value::from("abc")]));
    /// ```
    #[inline]
    pub fn convert_collection(
        &self,
        kind: CollectionKind,
        element: &TypeRef,
        value: Value,
    ) -> BeanResult<Value> {
        self.coerce_collection(kind, Some(element), value, None)
    }

    pub fn convert_collection_with(
        &self,
        kind: CollectionKind,
        element: &TypeRef,
        value: Value,
        formatter: &dyn ValueFormatter,
    ) -> BeanResult<Value> {
        self.coerce_collection(kind, Some(element), value, Some(formatter))
    }

    pub(crate) fn coerce(
        &self,
        target: &TypeRef,
        args: [Option<&TypeRef>; 2],
        value: Value,
        formatter: Formatter<'_>,
    ) -> BeanResult<Value> {
        let scalar_target = target.scalar_kind().is_some();
        let converted = match target {
            TypeRef::Any => return Ok(value),
            TypeRef::Collection(kind) => {
                return self.coerce_collection(*kind, args[0], value, formatter);
            }
            TypeRef::Map => return self.coerce_map(args[1], value, formatter),
            _ if value.is_assignable_to(target) && !(scalar_target && formatter.is_some()) => {
                return Ok(value);
            }
            TypeRef::Primitive(kind) | TypeRef::Scalar(kind) => {
                self.coerce_scalar(*kind, unwrap_single(value), formatter)?
            }
            TypeRef::Array(component) => self.coerce_array(component, value, formatter)?,
            TypeRef::Enum(e) => self.coerce_enum(*e, unwrap_single(value))?,
            TypeRef::Bean(b) => self.coerce_bean(*b, value)?,
        };

        Ok(match (converted, target) {
            (Value::Null, TypeRef::Primitive(_)) if self.config.substitute_null_defaults => {
                empty_value(target)
            }
            (converted, _) => converted,
        })
    }

    fn coerce_scalar(
        &self,
        kind: ScalarKind,
        value: Value,
        formatter: Formatter<'_>,
    ) -> BeanResult<Value> {
        let fail = |value: &Value, cause: CoercionError| -> BeanError {
            ConversionError::new(kind.name(), value.kind_name()).with_cause(cause).into()
        };

        let value = match (formatter, value) {
            (Some(f), Value::String(text)) if kind != ScalarKind::String => {
                f.parse(&text).map_err(|e| fail(&Value::String(text), e))?
            }
            (Some(f), value) if kind == ScalarKind::String && !value.is_null() => {
                return f
                    .format(&value)
                    .map(Value::String)
                    .map_err(|e| fail(&value, e));
            }
            (_, value) => value,
        };

        self.converter
            .convert(kind, &value, self.config.date_format.as_deref())
            .map_err(|e| fail(&value, e))
    }

    fn coerce_array(
        &self,
        component: &TypeRef,
        value: Value,
        formatter: Formatter<'_>,
    ) -> BeanResult<Value> {
        let items = match value {
            Value::Null => return Ok(Value::Null),
            Value::Array(_, items) | Value::Collection(_, items) => items,
            Value::Map(entries) => entries.into_values().collect(),
            single => alloc::vec![single],
        };
        let items = items
            .into_iter()
            .map(|item| self.coerce(component, [None, None], item, formatter))
            .collect::<BeanResult<Vec<_>>>()?;
        Ok(Value::Array(component.clone(), items))
    }

    fn coerce_enum(&self, ty: EnumRef, value: Value) -> BeanResult<Value> {
        let text = match value {
            Value::Null => return Ok(Value::Null),
            Value::Enum(e) if e.enum_ref() == ty => return Ok(Value::Enum(e)),
            Value::Enum(e) => String::from(e.code()),
            Value::String(s) => s,
            other => match self.coerce_scalar(ScalarKind::String, other, None)? {
                Value::String(s) => s,
                _ => return Ok(Value::Null),
            },
        };

        let shape = ty.shape();
        let text = text.trim();
        Ok(shape
            .by_code(text)
            .or_else(|| shape.by_name(text))
            .and_then(|ordinal| EnumValue::from_ordinal(ty, ordinal))
            .map_or(Value::Null, Value::Enum))
    }

    fn coerce_bean(&self, ty: BeanRef, value: Value) -> BeanResult<Value> {
        match value {
            Value::Null => Ok(Value::Null),
            Value::Map(values) => {
                let shape = ty.shape();
                let mut bean = shape.construct().ok_or_else(|| {
                    let kind = ResolutionKind::NotConstructible;
                    BeanError::from(ResolutionError::new(kind, shape.type_path(), ""))
                })?;
                self.populate_bean(&mut *bean, values)?;
                Ok(Value::Bean(bean))
            }
            other => Err(unsupported(&TypeRef::Bean(ty), &other)),
        }
    }

    fn coerce_collection(
        &self,
        kind: CollectionKind,
        element: Option<&TypeRef>,
        value: Value,
        formatter: Formatter<'_>,
    ) -> BeanResult<Value> {
        let items = match value {
            Value::Null => return Ok(Value::Null),
            Value::Array(_, items) | Value::Collection(_, items) => items,
            Value::Map(entries) => entries.into_values().collect(),
            single => alloc::vec![single],
        };

        let mut out: Vec<Value> = Vec::with_capacity(items.len());
        for item in items {
            let item = match element {
                Some(ty) => self.coerce(ty, [None, None], item, formatter)?,
                None => item,
            };
            if kind == CollectionKind::Set && out.contains(&item) {
                continue;
            }
            out.push(item);
        }
        Ok(Value::Collection(kind.concrete(), out))
    }

    fn coerce_map(
        &self,
        element: Option<&TypeRef>,
        value: Value,
        formatter: Formatter<'_>,
    ) -> BeanResult<Value> {
        match value {
            Value::Null => Ok(Value::Null),
            Value::Map(entries) => entries
                .into_iter()
                .map(|(key, item)| {
                    let item = match element {
                        Some(ty) => self.coerce(ty, [None, None], item, formatter)?,
                        None => item,
                    };
                    Ok((key, item))
                })
                .collect::<BeanResult<BTreeMap<_, _>>>()
                .map(Value::Map),
            other => Err(unsupported(&TypeRef::Map, &other)),
        }
    }
}

// -----------------------------------------------------------------------------
// Bean population

impl BeanEngine {
    /// Converts `value` to the declared type of `name` and writes it.
    ///
    /// A property declared as [`TypeRef::Any`] takes the value unconverted.
    #[inline]
    pub fn set_bean_property(
        &self,
        bean: &mut dyn Bean,
        name: &str,
        value: Value,
    ) -> BeanResult<()> {
        self.populate_property(bean, name, value, None)
    }

    pub fn set_bean_property_with(
        &self,
        bean: &mut dyn Bean,
        name: &str,
        value: Value,
        formatter: &dyn ValueFormatter,
    ) -> BeanResult<()> {
        self.populate_property(bean, name, value, Some(formatter))
    }

    /// Converting counterpart of [`set_nested`](Self::set_nested).
    pub fn set_nested_bean_property(
        &self,
        bean: &mut dyn Bean,
        path: &str,
        value: Value,
    ) -> BeanResult<()> {
        let segments = split_path(bean.type_path(), path)?;
        self.write_path(bean, &segments, |engine, target, name| {
            engine.populate_property(target, name, value, None)
        })
    }

    pub fn set_nested_bean_property_with(
        &self,
        bean: &mut dyn Bean,
        path: &str,
        value: Value,
        formatter: &dyn ValueFormatter,
    ) -> BeanResult<()> {
        let segments = split_path(bean.type_path(), path)?;
        self.write_path(bean, &segments, |engine, target, name| {
            engine.populate_property(target, name, value, Some(formatter))
        })
    }

    /// Sets every property named in `values`. Properties not named are left
    /// untouched.
    ///
    /// ```
    /// # use bean_reflect::{BeanEngine, Typed};
    /// # use bean_reflect::info::{ShapeBuilder, ShapeCell, TypeShape};
    /// # #[derive(Debug, Clone, PartialEq, Default)]
    /// # struct Item { code: String, qty: i32 }
    /// # impl Typed for Item {
    /// #     fn type_shape() -> &'static TypeShape {
    /// #         static CELL: ShapeCell = ShapeCell::new();
    /// #         CELL.get_or_init(|| ShapeBuilder::<Self>::new()
    /// #             .property("code", |i| &i.code, |i| &mut i.code)
    /// #             .property("qty", |i| &i.qty, |i| &mut i.qty)
    /// #             .build())
    /// #     }
    /// # }
    /// use bean_reflect::value::Value;
    ///
    /// let engine = BeanEngine::new();
    /// let mut item = Item { code: "A1".into(), qty: 1 };
    /// engine
    ///     .populate_bean(&mut item, [("qty".to_string(), Value::from("12"))].into())
    ///     .unwrap();
    /// assert_eq!(item, Item { code: "A1".into(), qty: 12 });
    /// ```
    pub fn populate_bean(
        &self,
        bean: &mut dyn Bean,
        values: BTreeMap<String, Value>,
    ) -> BeanResult<()> {
        for (name, value) in values {
            self.populate_property(bean, &name, value, None)?;
        }
        Ok(())
    }

    /// Writes the empty value of its declared type to every writable
    /// property of `bean`.
    pub fn clear_all_bean_properties(&self, bean: &mut dyn Bean) -> BeanResult<()> {
        let table = self.metadata(bean.bean_shape())?;
        for desc in table.iter().filter(|d| d.has_writer()) {
            desc.write(bean, empty_value(desc.declared()))?;
        }
        Ok(())
    }

    fn populate_property(
        &self,
        bean: &mut dyn Bean,
        name: &str,
        value: Value,
        formatter: Formatter<'_>,
    ) -> BeanResult<()> {
        let owner = bean.type_path();
        let table = self.metadata(bean.bean_shape())?;
        let desc = match table.get(name) {
            Some(desc) if desc.has_writer() => desc,
            _ => return Err(ResolutionError::new(ResolutionKind::NoWriter, owner, name).into()),
        };

        let value = match desc.declared() {
            TypeRef::Any => value,
            declared => {
                let first = self.element_type(desc, 0);
                let second = self.element_type(desc, 1);
                self.coerce(declared, [first.as_ref(), second.as_ref()], value, formatter)
                    .map_err(|e| e.in_property(owner, name))?
            }
        };
        desc.write(bean, value)
    }
}

// -----------------------------------------------------------------------------
// Tests
