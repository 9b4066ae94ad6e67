use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::{self, Formatter};

use serde_core::de::{MapAccess, SeqAccess, Visitor};
use serde_core::ser::{SerializeMap, SerializeSeq};
use serde_core::{Deserialize, Deserializer, Serialize, Serializer};

use super::{Number, TreeNode};

// -----------------------------------------------------------------------------
// Serialize

impl Serialize for TreeNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(v) => serializer.serialize_bool(*v),
            Self::Number(Number::Int(v)) => serializer.serialize_i64(*v),
            Self::Number(Number::Float(v)) => serializer.serialize_f64(*v),
            Self::String(v) => serializer.serialize_str(v),
            Self::Seq(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Map(members) => {
                let mut map = serializer.serialize_map(Some(members.len()))?;
                for (key, value) in members {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

// -----------------------------------------------------------------------------
// Deserialize

/// A [`Visitor`] accepting any self-describing input as a [`TreeNode`].
struct TreeVisitor;

impl<'de> Visitor<'de> for TreeVisitor {
    type Value = TreeNode;

    fn expecting(&self, formatter: &mut Formatter) -> fmt::Result {
        formatter.write_str("any tree value")
    }

    #[inline]
    fn visit_bool<E>(self, v: bool) -> Result<Self::Value, E> {
        Ok(TreeNode::Bool(v))
    }

    #[inline]
    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E> {
        Ok(TreeNode::Number(Number::Int(v)))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
        Ok(TreeNode::Number(match i64::try_from(v) {
            Ok(v) => Number::Int(v),
            Err(_) => Number::Float(v as f64),
        }))
    }

    #[inline]
    fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E> {
        Ok(TreeNode::Number(Number::Float(v)))
    }

    fn visit_char<E>(self, v: char) -> Result<Self::Value, E> {
        let mut s = String::new();
        s.push(v);
        Ok(TreeNode::String(s))
    }

    #[inline]
    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E> {
        Ok(TreeNode::String(v.into()))
    }

    #[inline]
    fn visit_string<E>(self, v: String) -> Result<Self::Value, E> {
        Ok(TreeNode::String(v))
    }

    #[inline]
    fn visit_unit<E>(self) -> Result<Self::Value, E> {
        Ok(TreeNode::Null)
    }

    #[inline]
    fn visit_none<E>(self) -> Result<Self::Value, E> {
        Ok(TreeNode::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        TreeNode::deserialize(deserializer)
    }

    fn visit_seq<V>(self, mut seq: V) -> Result<Self::Value, V::Error>
    where
        V: SeqAccess<'de>,
    {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or_default());
        while let Some(item) = seq.next_element::<TreeNode>()? {
            items.push(item);
        }
        Ok(TreeNode::Seq(items))
    }

    fn visit_map<V>(self, mut map: V) -> Result<Self::Value, V::Error>
    where
        V: MapAccess<'de>,
    {
        let mut members = BTreeMap::new();
        while let Some((key, value)) = map.next_entry::<String, TreeNode>()? {
            members.insert(key, value);
        }
        Ok(TreeNode::Map(members))
    }
}

impl<'de> Deserialize<'de> for TreeNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(TreeVisitor)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn json_round_trip() {
        let text = r#"{"age":42,"name":"Mia","ratio":0.5,"tags":["a",null,true]}"#;
        let node: TreeNode = serde_json::from_str(text).unwrap();

        assert_eq!(node.get("age"), Some(&TreeNode::from(42_i64)));
        assert_eq!(node.get("ratio"), Some(&TreeNode::from(0.5)));
        assert_eq!(
            node.get("tags"),
            Some(&TreeNode::Seq(vec![
                TreeNode::from("a"),
                TreeNode::Null,
                TreeNode::Bool(true)
            ]))
        );
        assert_eq!(serde_json::to_string(&node).unwrap(), text);
    }

    #[test]
    fn ron_round_trip() {
        let node = TreeNode::Map(
            [
                ("line1".into(), TreeNode::from("24 Parklane")),
                ("zip".into(), TreeNode::from(1234_i64)),
            ]
            .into(),
        );
        let text = ron::to_string(&node).unwrap();
        let back: TreeNode = ron::from_str(&text).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn large_unsigned_becomes_float() {
        let node: TreeNode = serde_json::from_str("18446744073709551615").unwrap();
        assert!(matches!(node, TreeNode::Number(Number::Float(_))));
    }
}
