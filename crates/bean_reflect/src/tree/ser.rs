use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use super::trail::Trail;
use super::TreeNode;

use crate::error::{BeanError, ConversionError, SerializationError};
use crate::info::TypeRef;
use crate::metadata::PropertyDescriptor;
use crate::value::Value;
use crate::{Bean, BeanEngine};

type WriteResult<T> = Result<T, SerializationError>;

/// Walks a value graph and builds the matching [`TreeNode`].
///
/// Dispatch is by declared type, with [`TypeRef::Any`] replaced by the
/// runtime type of the value at hand:
///
/// 1. leaf types in the engine's scalar table;
/// 2. enum constants, by name;
/// 3. arrays, element by element against the component type;
/// 4. collections and maps, against the element type if one is known;
/// 5. beans, one member per readable declared property.
///
/// Null properties are left out of bean objects.
pub(super) struct TreeWriter<'e> {
    engine: &'e BeanEngine,
    trail: Trail,
    depth: usize,
}

impl<'e> TreeWriter<'e> {
    pub fn new(engine: &'e BeanEngine) -> Self {
        Self {
            engine,
            trail: Trail::new(),
            depth: 0,
        }
    }

    pub fn write(
        &mut self,
        ty: &TypeRef,
        args: [Option<&TypeRef>; 2],
        value: &Value,
    ) -> WriteResult<TreeNode> {
        self.depth += 1;
        let result = if self.depth > self.engine.config.max_depth {
            Err(self.trail.fail(format!(
                "graph is deeper than {} levels",
                self.engine.config.max_depth
            )))
        } else {
            self.dispatch(ty, args, value)
        };
        self.depth -= 1;
        result
    }

    pub fn write_bean(&mut self, bean: &dyn Bean) -> WriteResult<TreeNode> {
        let owner = bean.type_path();
        let table = self
            .engine
            .metadata(bean.bean_shape())
            .map_err(|e| self.trail.wrap(format!("cannot describe `{owner}`"), e))?;

        let mut members = BTreeMap::new();
        for desc in table.iter().filter(|d| d.has_reader() && d.is_declared()) {
            self.trail.push(owner, desc.name());
            let node = self.write_property(bean, desc);
            self.trail.pop();
            if let Some(node) = node? {
                members.insert(String::from(desc.name()), node);
            }
        }
        Ok(TreeNode::Map(members))
    }

    fn write_property(
        &mut self,
        bean: &dyn Bean,
        desc: &PropertyDescriptor,
    ) -> WriteResult<Option<TreeNode>> {
        let value = desc
            .read(bean)
            .map_err(|e| self.trail.wrap("cannot read property", e))?;
        if value.is_null() {
            return Ok(None);
        }

        let first = self.engine.element_type(desc, 0);
        let second = self.engine.element_type(desc, 1);
        self.write(desc.declared(), [first.as_ref(), second.as_ref()], &value)
            .map(Some)
    }

    fn dispatch(
        &mut self,
        ty: &TypeRef,
        args: [Option<&TypeRef>; 2],
        value: &Value,
    ) -> WriteResult<TreeNode> {
        if value.is_null() {
            return Ok(TreeNode::Null);
        }

        let runtime;
        let ty = match ty {
            TypeRef::Any => {
                runtime = value.runtime_type();
                &runtime
            }
            declared => declared,
        };

        if let Some(leaf) = self.engine.scalars.get(ty) {
            return leaf.to_tree(value).map_err(|cause| {
                let cause =
                    ConversionError::new(ty.to_string(), value.kind_name()).with_cause(cause);
                self.trail.wrap(format!("cannot write a {ty}"), BeanError::from(cause))
            });
        }

        let any = TypeRef::Any;
        match (ty, value) {
            (TypeRef::Enum(_), Value::Enum(constant)) => {
                Ok(TreeNode::String(String::from(constant.name())))
            }
            (TypeRef::Array(component), Value::Array(_, items) | Value::Collection(_, items)) => {
                self.write_items(component, items)
            }
            (TypeRef::Collection(_), Value::Collection(_, items) | Value::Array(_, items)) => {
                self.write_items(args[0].unwrap_or(&any), items)
            }
            (TypeRef::Map, Value::Map(entries)) => {
                let element = args[1].unwrap_or(&any);
                let mut members = BTreeMap::new();
                for (key, item) in entries {
                    members.insert(key.clone(), self.write(element, [None, None], item)?);
                }
                Ok(TreeNode::Map(members))
            }
            (TypeRef::Bean(_), Value::Bean(bean)) => self.write_bean(&**bean),
            (ty, value) => Err(self
                .trail
                .fail(format!("cannot write a {} as {ty}", value.kind_name()))),
        }
    }

    fn write_items(&mut self, element: &TypeRef, items: &[Value]) -> WriteResult<TreeNode> {
        items
            .iter()
            .map(|item| self.write(element, [None, None], item))
            .collect::<WriteResult<Vec<_>>>()
            .map(TreeNode::Seq)
    }
}
