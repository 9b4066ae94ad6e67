use alloc::boxed::Box;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use bean_utils::hash::HashMap;

use crate::convert::{ScalarConverter, format_date, is_blank};
use crate::error::CoercionError;
use crate::info::{ScalarKind, TypeRef};
use crate::tree::{Number, TreeNode};
use crate::value::Value;

// -----------------------------------------------------------------------------
// TreeConverter

/// Moves one leaf type between [`Value`] and [`TreeNode`].
pub(crate) trait TreeConverter: Send + Sync {
    fn to_tree(&self, value: &Value) -> Result<TreeNode, CoercionError>;

    fn from_tree(&self, node: &TreeNode) -> Result<Value, CoercionError>;
}

// -----------------------------------------------------------------------------
// ScalarNode

struct ScalarNode {
    kind: ScalarKind,
    nullable: bool,
    date_format: Option<Arc<str>>,
    converter: Arc<dyn ScalarConverter>,
}

impl ScalarNode {
    fn coerce(&self, value: &Value) -> Result<Value, CoercionError> {
        self.converter.convert(self.kind, value, self.date_format.as_deref())
    }
}

impl TreeConverter for ScalarNode {
    fn to_tree(&self, value: &Value) -> Result<TreeNode, CoercionError> {
        let owned;
        let value = match value.scalar_kind() {
            _ if value.is_null() => return Ok(TreeNode::Null),
            Some(kind) if kind == self.kind => value,
            _ => {
                owned = self.coerce(value)?;
                &owned
            }
        };

        Ok(match value {
            Value::Bool(v) => TreeNode::Bool(*v),
            Value::Char(v) => TreeNode::String(v.to_string()),
            Value::I8(v) => TreeNode::Number(Number::Int(i64::from(*v))),
            Value::I16(v) => TreeNode::Number(Number::Int(i64::from(*v))),
            Value::I32(v) => TreeNode::Number(Number::Int(i64::from(*v))),
            Value::I64(v) => TreeNode::Number(Number::Int(*v)),
            Value::F32(v) => TreeNode::Number(Number::Float(f64::from(*v))),
            Value::F64(v) => TreeNode::Number(Number::Float(*v)),
            Value::Decimal(v) => TreeNode::String(v.to_string()),
            Value::Date(v) => TreeNode::String(format_date(v, self.date_format.as_deref())?),
            Value::String(v) => TreeNode::String(v.clone()),
            other => {
                return Err(CoercionError::new(format!(
                    "cannot write a {} as {}",
                    other.kind_name(),
                    self.kind.name()
                )));
            }
        })
    }

    fn from_tree(&self, node: &TreeNode) -> Result<Value, CoercionError> {
        let raw = match node {
            TreeNode::Null if self.nullable => return Ok(Value::Null),
            TreeNode::Null => {
                return Err(CoercionError::new(format!(
                    "null where a {} is required",
                    self.kind.name()
                )));
            }
            TreeNode::Bool(v) => Value::Bool(*v),
            TreeNode::Number(Number::Int(v)) => Value::I64(*v),
            TreeNode::Number(Number::Float(v)) => Value::F64(*v),
            TreeNode::String(v) => Value::String(v.clone()),
            TreeNode::Seq(_) | TreeNode::Map(_) => {
                return Err(CoercionError::new(format!(
                    "expected a {} leaf, found a {}",
                    self.kind.name(),
                    node.kind_name()
                )));
            }
        };

        let blank = raw.as_str().is_some_and(|s| is_blank(self.kind, s));
        match self.coerce(&raw)? {
            Value::Null if !(self.nullable && blank) => Err(CoercionError::new(format!(
                "cannot read a {} as {}",
                node.kind_name(),
                self.kind.name()
            ))),
            value => Ok(value),
        }
    }
}

// -----------------------------------------------------------------------------
// ArrayNode

struct ArrayNode {
    component: TypeRef,
    element: ScalarNode,
}

impl TreeConverter for ArrayNode {
    fn to_tree(&self, value: &Value) -> Result<TreeNode, CoercionError> {
        match value {
            Value::Null => Ok(TreeNode::Null),
            Value::Array(_, items) | Value::Collection(_, items) => items
                .iter()
                .map(|item| self.element.to_tree(item))
                .collect::<Result<Vec<_>, _>>()
                .map(TreeNode::Seq),
            other => Err(CoercionError::new(format!(
                "cannot write a {} as an array of {}",
                other.kind_name(),
                self.component
            ))),
        }
    }

    fn from_tree(&self, node: &TreeNode) -> Result<Value, CoercionError> {
        let items = match node {
            TreeNode::Null => return Ok(Value::Null),
            TreeNode::Seq(items) => items
                .iter()
                .map(|item| self.element.from_tree(item))
                .collect::<Result<Vec<_>, _>>()?,
            TreeNode::Map(_) => {
                return Err(CoercionError::new(format!(
                    "expected an array of {}, found an object",
                    self.component
                )));
            }
            single => alloc::vec![self.element.from_tree(single)?],
        };
        Ok(Value::Array(self.component.clone(), items))
    }
}

// -----------------------------------------------------------------------------
// ScalarTable

/// The closed table of leaf converters, keyed by exact declared type.
///
/// Covers every scalar kind in its primitive and nullable forms, and the
/// one-dimensional arrays of both. Leaves are coerced with the engine's
/// [`ScalarConverter`].
pub(crate) struct ScalarTable {
    converters: HashMap<TypeRef, Box<dyn TreeConverter>>,
}

impl ScalarTable {
    pub(crate) fn new(date_format: Option<&str>, converter: &Arc<dyn ScalarConverter>) -> Self {
        let date_format: Option<Arc<str>> = date_format.map(Arc::from);
        let leaf = |kind, nullable| ScalarNode {
            kind,
            nullable,
            date_format: date_format.clone(),
            converter: Arc::clone(converter),
        };

        let mut converters: HashMap<TypeRef, Box<dyn TreeConverter>> = HashMap::default();
        for kind in ScalarKind::ALL {
            let forms = [(TypeRef::Primitive(kind), false), (TypeRef::Scalar(kind), true)];
            for (ty, nullable) in forms {
                converters.insert(
                    TypeRef::array_of(ty.clone()),
                    Box::new(ArrayNode {
                        component: ty.clone(),
                        element: leaf(kind, nullable),
                    }),
                );
                converters.insert(ty, Box::new(leaf(kind, nullable)));
            }
        }
        Self { converters }
    }

    #[inline]
    pub(crate) fn get(&self, ty: &TypeRef) -> Option<&dyn TreeConverter> {
        self.converters.get(ty).map(|c| &**c)
    }
}

impl fmt::Debug for ScalarTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<String> = self.converters.keys().map(ToString::to_string).collect();
        keys.sort();
        f.debug_struct("ScalarTable").field("types", &keys).finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::StandardConverter;
    use alloc::vec;
    use rust_decimal::Decimal;

    fn table() -> ScalarTable {
        let converter: Arc<dyn ScalarConverter> = Arc::new(StandardConverter);
        ScalarTable::new(None, &converter)
    }

    #[test]
    fn covers_every_leaf_form() {
        let table = table();
        for kind in ScalarKind::ALL {
            assert!(table.get(&TypeRef::Primitive(kind)).is_some());
            assert!(table.get(&TypeRef::array_of(TypeRef::Scalar(kind))).is_some());
        }
        assert!(table.get(&TypeRef::Map).is_none());
        assert!(table.get(&TypeRef::array_of(TypeRef::Any)).is_none());
    }

    #[test]
    fn primitives_reject_null() {
        let table = table();
        let int = table.get(&TypeRef::Primitive(ScalarKind::I32)).unwrap();
        assert!(int.from_tree(&TreeNode::Null).is_err());
        assert_eq!(int.from_tree(&TreeNode::from(7_i64)).unwrap(), Value::I32(7));
        assert!(int.from_tree(&TreeNode::Seq(vec![])).is_err());

        let boxed = table.get(&TypeRef::Scalar(ScalarKind::I32)).unwrap();
        assert_eq!(boxed.from_tree(&TreeNode::Null).unwrap(), Value::Null);
    }

    #[test]
    fn decimals_travel_as_text() {
        let table = table();
        let dec = table.get(&TypeRef::Scalar(ScalarKind::Decimal)).unwrap();
        let value = Value::Decimal(Decimal::new(254, 2));
        let node = dec.to_tree(&value).unwrap();
        assert_eq!(node, TreeNode::from("2.54"));
        assert_eq!(dec.from_tree(&node).unwrap(), value);
        assert_eq!(dec.from_tree(&TreeNode::from(2.54)).unwrap(), value);
    }

    #[test]
    fn chars_travel_as_one_char_strings() {
        let table = table();
        let ch = table.get(&TypeRef::Primitive(ScalarKind::Char)).unwrap();
        assert_eq!(ch.to_tree(&Value::Char('x')).unwrap(), TreeNode::from("x"));
        assert_eq!(ch.from_tree(&TreeNode::from("x")).unwrap(), Value::Char('x'));
        assert_eq!(ch.from_tree(&TreeNode::from(" ")).unwrap(), Value::Char(' '));
        assert!(ch.from_tree(&TreeNode::from("")).is_err());

        let maybe = table.get(&TypeRef::Scalar(ScalarKind::Char)).unwrap();
        assert_eq!(maybe.from_tree(&TreeNode::from(" ")).unwrap(), Value::Char(' '));
        assert_eq!(maybe.from_tree(&TreeNode::from("")).unwrap(), Value::Null);
    }

    #[test]
    fn arrays_accept_a_lone_leaf() {
        let table = table();
        let component = TypeRef::Scalar(ScalarKind::F64);
        let arr = table.get(&TypeRef::array_of(component.clone())).unwrap();
        assert_eq!(
            arr.from_tree(&TreeNode::from(3.86)).unwrap(),
            Value::Array(component.clone(), vec![Value::F64(3.86)])
        );
        assert_eq!(
            arr.to_tree(&Value::Array(component, vec![Value::F64(2.35), Value::Null])).unwrap(),
            TreeNode::Seq(vec![TreeNode::from(2.35), TreeNode::Null])
        );
    }

    #[test]
    fn mismatched_leaf_is_an_error() {
        let table = table();
        let flag = table.get(&TypeRef::Primitive(ScalarKind::Bool)).unwrap();
        assert!(flag.from_tree(&TreeNode::from(1_i64)).is_err());
        assert_eq!(flag.from_tree(&TreeNode::Bool(true)).unwrap(), Value::Bool(true));
    }
}
