use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::slice;

use super::trail::Trail;
use super::{Number, TreeNode};

use crate::error::{BeanError, ConversionError, ResolutionError, ResolutionKind, SerializationError};
use crate::info::{BeanRef, CollectionKind, EnumRef, TypeRef};
use crate::metadata::{PropertyDescriptor, TypeMetadata};
use crate::value::{EnumValue, HopMut, Value};
use crate::{Bean, BeanEngine};

type ReadResult<T> = Result<T, SerializationError>;

/// Builds values from a [`TreeNode`] against a declared type.
///
/// Mirrors [`TreeWriter`](super::ser::TreeWriter). Bean objects are strict:
/// every member must name a declared property with a writer.
pub(super) struct TreeReader<'e> {
    engine: &'e BeanEngine,
    trail: Trail,
    depth: usize,
}

impl<'e> TreeReader<'e> {
    pub fn new(engine: &'e BeanEngine) -> Self {
        Self {
            engine,
            trail: Trail::new(),
            depth: 0,
        }
    }

    pub fn read(
        &mut self,
        ty: &TypeRef,
        args: [Option<&TypeRef>; 2],
        node: &TreeNode,
    ) -> ReadResult<Value> {
        self.depth += 1;
        let result = if self.depth > self.engine.config.max_depth {
            Err(self.trail.fail(format!(
                "tree is deeper than {} levels",
                self.engine.config.max_depth
            )))
        } else {
            self.dispatch(ty, args, node)
        };
        self.depth -= 1;
        result
    }

    /// Sets the properties of `bean` named by the members of `members`.
    pub fn read_members(
        &mut self,
        bean: &mut dyn Bean,
        members: &BTreeMap<String, TreeNode>,
    ) -> ReadResult<()> {
        let owner = bean.type_path();
        let table = self
            .engine
            .metadata(bean.bean_shape())
            .map_err(|e| self.trail.wrap(format!("cannot describe `{owner}`"), e))?;

        for (name, node) in members {
            self.trail.push(owner, name);
            let result = self.read_member(bean, &table, name, node);
            self.trail.pop();
            result?;
        }
        Ok(())
    }

    fn read_member(
        &mut self,
        bean: &mut dyn Bean,
        table: &TypeMetadata,
        name: &str,
        node: &TreeNode,
    ) -> ReadResult<()> {
        let owner = bean.type_path();
        let Some(desc) = table.get(name) else {
            return Err(self.trail.fail(format!("`{owner}` has no property for member `{name}`")));
        };
        if !desc.is_declared() {
            return Err(self
                .trail
                .fail(format!("`{name}` is not a declared property of `{owner}`")));
        }

        if *desc.declared() == TypeRef::Any
            && let TreeNode::Map(members) = node
            && self.fill_held_bean(bean, desc, members)?
        {
            return Ok(());
        }

        if !desc.has_writer() {
            let cause = ResolutionError::new(ResolutionKind::NoWriter, owner, name);
            return Err(self.trail.wrap("cannot set member", cause.into()));
        }

        let first = self.engine.element_type(desc, 0);
        let second = self.engine.element_type(desc, 1);
        let value = self.read(desc.declared(), [first.as_ref(), second.as_ref()], node)?;
        desc.write(bean, value)
            .map_err(|e| self.trail.wrap("cannot set member", e))
    }

    // An untyped property holding a bean takes an object member into that
    // bean. Returns `false` if the property holds no bean.
    fn fill_held_bean(
        &mut self,
        bean: &mut dyn Bean,
        desc: &PropertyDescriptor,
        members: &BTreeMap<String, TreeNode>,
    ) -> ReadResult<bool> {
        let Some(reader) = desc.reader() else {
            return Ok(false);
        };

        if reader.hop_mut.is_some() {
            return match reader.hop_mut(bean) {
                Some(Ok(HopMut::Bean(held))) => self.read_members(held, members).map(|()| true),
                Some(Err(e)) => Err(self.trail.wrap(
                    "cannot read property",
                    BeanError::from_invoke(e, desc.owner().type_path(), desc.name()),
                )),
                _ => Ok(false),
            };
        }

        match desc.read(bean) {
            Ok(Value::Bean(mut held)) if desc.has_writer() => {
                self.read_members(&mut *held, members)?;
                desc.write(bean, Value::Bean(held))
                    .map_err(|e| self.trail.wrap("cannot set member", e))?;
                Ok(true)
            }
            Ok(_) => Ok(false),
            Err(e) => Err(self.trail.wrap("cannot read property", e)),
        }
    }

    fn dispatch(
        &mut self,
        ty: &TypeRef,
        args: [Option<&TypeRef>; 2],
        node: &TreeNode,
    ) -> ReadResult<Value> {
        if let TypeRef::Any = ty {
            return Ok(infer(node));
        }

        if let Some(leaf) = self.engine.scalars.get(ty) {
            return leaf.from_tree(node).map_err(|cause| {
                let cause =
                    ConversionError::new(ty.to_string(), node.kind_name()).with_cause(cause);
                self.trail.wrap(format!("cannot read a {ty}"), BeanError::from(cause))
            });
        }

        if node.is_null() {
            return Ok(Value::Null);
        }

        let any = TypeRef::Any;
        match ty {
            TypeRef::Enum(e) => self.read_enum(*e, node),
            TypeRef::Array(component) => {
                let items = self.read_items(component, node)?;
                Ok(Value::Array((**component).clone(), items))
            }
            TypeRef::Collection(kind) => {
                let mut items = self.read_items(args[0].unwrap_or(&any), node)?;
                if *kind == CollectionKind::Set {
                    let mut unique: Vec<Value> = Vec::with_capacity(items.len());
                    for item in items {
                        if !unique.contains(&item) {
                            unique.push(item);
                        }
                    }
                    items = unique;
                }
                Ok(Value::Collection(kind.concrete(), items))
            }
            TypeRef::Map => {
                let element = args[1].unwrap_or(&any);
                let members = self.expect_object(ty, node)?;
                let mut out = BTreeMap::new();
                for (key, item) in members {
                    out.insert(key.clone(), self.read(element, [None, None], item)?);
                }
                Ok(Value::Map(out))
            }
            TypeRef::Bean(b) => self.read_bean(*b, node),
            TypeRef::Any | TypeRef::Primitive(_) | TypeRef::Scalar(_) => {
                Err(self.trail.fail(format!("no tree reader for {ty}")))
            }
        }
    }

    fn read_enum(&self, ty: EnumRef, node: &TreeNode) -> ReadResult<Value> {
        let Some(name) = node.as_str() else {
            return Err(self.trail.fail(format!(
                "expected a constant name of `{}`, found a {}",
                ty.type_path(),
                node.kind_name()
            )));
        };
        Ok(ty
            .shape()
            .by_name(name)
            .and_then(|ordinal| EnumValue::from_ordinal(ty, ordinal))
            .map_or(Value::Null, Value::Enum))
    }

    fn read_items(&mut self, element: &TypeRef, node: &TreeNode) -> ReadResult<Vec<Value>> {
        let items = match node {
            TreeNode::Seq(items) => items.as_slice(),
            TreeNode::Map(_) => {
                return Err(self.trail.fail("expected a sequence, found an object"));
            }
            single => slice::from_ref(single),
        };
        items
            .iter()
            .map(|item| self.read(element, [None, None], item))
            .collect()
    }

    fn read_bean(&mut self, ty: BeanRef, node: &TreeNode) -> ReadResult<Value> {
        let members = self.expect_object(&TypeRef::Bean(ty), node)?;
        let shape = ty.shape();
        let Some(mut bean) = shape.construct() else {
            let cause =
                ResolutionError::new(ResolutionKind::NotConstructible, shape.type_path(), "");
            return Err(self.trail.wrap("cannot create bean", cause.into()));
        };
        self.read_members(&mut *bean, members)?;
        Ok(Value::Bean(bean))
    }

    fn expect_object<'n>(
        &self,
        ty: &TypeRef,
        node: &'n TreeNode,
    ) -> ReadResult<&'n BTreeMap<String, TreeNode>> {
        node.as_map().ok_or_else(|| {
            self.trail
                .fail(format!("expected an object for {ty}, found a {}", node.kind_name()))
        })
    }
}

/// The value a node stands for when nothing is declared.
fn infer(node: &TreeNode) -> Value {
    match node {
        TreeNode::Null => Value::Null,
        TreeNode::Bool(v) => Value::Bool(*v),
        TreeNode::Number(Number::Int(v)) => Value::I64(*v),
        TreeNode::Number(Number::Float(v)) => Value::F64(*v),
        TreeNode::String(v) => Value::String(v.clone()),
        TreeNode::Seq(items) => {
            Value::Collection(CollectionKind::List, items.iter().map(infer).collect())
        }
        TreeNode::Map(members) => Value::Map(
            members
                .iter()
                .map(|(key, item)| (key.clone(), infer(item)))
                .collect(),
        ),
    }
}
