//! Bean graphs to and from a format-independent tree.
//!
//! [`TreeNode`] is the interchange structure: null, boolean, number, string,
//! sequence and string-keyed object. It implements serde's `Serialize` and
//! `Deserialize`, so any self-describing serde format can render or parse it.
//!
//! The walk is driven by declared types. Leaf types go through a closed
//! table of converters; decimals and dates are written as strings, chars as
//! one-char strings. Enum constants are written by name and read back by
//! exact name, an unknown name reading as null. Beans are objects with one
//! member per readable declared property; nulls are left out.
//!
//! ## Menu
//!
//! - [`TreeNode`], [`Number`]: the interchange structure.
//! - [`BeanEngine::serialize`](crate::BeanEngine::serialize),
//!   [`BeanEngine::serialize_bean`](crate::BeanEngine::serialize_bean): values to trees.
//! - [`BeanEngine::deserialize`](crate::BeanEngine::deserialize),
//!   [`BeanEngine::deserialize_bean`](crate::BeanEngine::deserialize_bean),
//!   [`BeanEngine::read_into`](crate::BeanEngine::read_into): trees to values.

// -----------------------------------------------------------------------------
// Modules

mod de;
mod node;
mod scalar_table;
mod ser;
mod serde_impls;
mod trail;

// -----------------------------------------------------------------------------
// Exports

pub use node::{Number, TreeNode};

pub(crate) use scalar_table::ScalarTable;

use alloc::format;
use alloc::vec::Vec;

use crate::error::{BeanError, BeanResult, SerializationError};
use crate::info::{GenericType, TypeRef};
use crate::value::Value;
use crate::{Bean, BeanEngine, Typed};

use de::TreeReader;
use ser::TreeWriter;

// -----------------------------------------------------------------------------
// Entry points

impl BeanEngine {
    /// Writes `value` as a tree, dispatching on its runtime type.
    pub fn serialize(&self, value: &Value) -> BeanResult<TreeNode> {
        Ok(TreeWriter::new(self).write(&TypeRef::Any, [None, None], value)?)
    }

    /// Writes `value` as a tree against a declared type.
    ///
    /// ```
    /// use bean_reflect::BeanEngine;
    /// use bean_reflect::info::{GenericType, ScalarKind, TypeRef};
    /// use bean_reflect::tree::TreeNode;
    /// use bean_reflect::value::Value;
    ///
    /// let engine = BeanEngine::new();
    /// let ty = GenericType::list_of(TypeRef::Scalar(ScalarKind::I32));
    /// let value = Value::from(vec![1, 2, 3]);
    ///
    /// let node = engine.serialize_as(&ty, &value).unwrap();
    /// assert_eq!(node, TreeNode::from(vec![1_i64, 2, 3]));
    /// assert_eq!(engine.deserialize_as(&ty, &node).unwrap(), value);
    /// ```
    pub fn serialize_as(&self, ty: &GenericType, value: &Value) -> BeanResult<TreeNode> {
        Ok(TreeWriter::new(self).write(ty.raw(), [ty.argument(0), ty.argument(1)], value)?)
    }

    /// Writes `bean` as a tree object.
    pub fn serialize_bean(&self, bean: &dyn Bean) -> BeanResult<TreeNode> {
        Ok(TreeWriter::new(self).write_bean(bean)?)
    }

    /// Reads `node` as a value of `ty`.
    ///
    /// `element` is the element type of a collection or the value type of a
    /// map; without it elements are read by their tree shape.
    pub fn deserialize(
        &self,
        ty: &TypeRef,
        element: Option<&TypeRef>,
        node: &TreeNode,
    ) -> BeanResult<Value> {
        Ok(TreeReader::new(self).read(ty, [element, element], node)?)
    }

    pub fn deserialize_as(&self, ty: &GenericType, node: &TreeNode) -> BeanResult<Value> {
        Ok(TreeReader::new(self).read(ty.raw(), [ty.argument(0), ty.argument(1)], node)?)
    }

    /// Reads `node` as a value of the type registered under `name`.
    ///
    /// Needs a registered [`TypeResolver`](crate::registry::TypeResolver).
    pub fn deserialize_named(&self, name: &str, node: &TreeNode) -> BeanResult<Value> {
        let ty = self.resolve_type(name)?;
        self.deserialize(&ty, None, node)
    }

    /// Reads a tree object into a new `T`.
    ///
    /// ```
    /// # use bean_reflect::{BeanEngine, Typed};
    /// # use bean_reflect::info::{ShapeBuilder, ShapeCell, TypeShape};
    /// # #[derive(Debug, Clone, PartialEq, Default)]
    /// # struct Book { author: Option<String>, copies: i32 }
    /// # impl Typed for Book {
    /// #     fn type_shape() -> &'static TypeShape {
    /// #         static CELL: ShapeCell = ShapeCell::new();
    /// #         CELL.get_or_init(|| ShapeBuilder::<Self>::new()
    /// #             .property("author", |b| &b.author, |b| &mut b.author)
    /// #             .property("copies", |b| &b.copies, |b| &mut b.copies)
    /// #             .constructible()
    /// #             .build())
    /// #     }
    /// # }
    /// use bean_reflect::tree::TreeNode;
    ///
    /// let engine = BeanEngine::new();
    /// let node: TreeNode = serde_json::from_str(r#"{"author":"Bramer","copies":20}"#).unwrap();
    /// let book: Book = engine.deserialize_bean(&node).unwrap();
    /// assert_eq!(book, Book { author: Some("Bramer".into()), copies: 20 });
    /// ```
    pub fn deserialize_bean<T: Typed>(&self, node: &TreeNode) -> BeanResult<T> {
        match self.deserialize(&TypeRef::bean::<T>(), None, node)? {
            Value::Bean(bean) if (*bean).is::<T>() => bean
                .downcast::<T>()
                .map(|bean| *bean)
                .ok_or_else(|| not_a::<T>(node)),
            _ => Err(not_a::<T>(node)),
        }
    }

    /// Reads the members of a tree object into `bean`. Properties without a
    /// member keep their values.
    pub fn read_into(&self, bean: &mut dyn Bean, node: &TreeNode) -> BeanResult<()> {
        let Some(members) = node.as_map() else {
            return Err(not_an_object(bean.type_path(), node));
        };
        Ok(TreeReader::new(self).read_members(bean, members)?)
    }
}

#[cold]
fn not_a<T: Typed>(node: &TreeNode) -> BeanError {
    not_an_object(T::type_shape().type_path(), node)
}

#[cold]
fn not_an_object(type_path: &str, node: &TreeNode) -> BeanError {
    SerializationError::new(
        format!("expected an object for `{type_path}`, found a {}", node.kind_name()),
        Vec::new(),
    )
    .into()
}

// -----------------------------------------------------------------------------
// Tests
