mod common;

use std::sync::Arc;

use bean_reflect::convert::{ScalarConverter, StandardConverter};
use bean_reflect::error::{CoercionError, ErrorKind};
use bean_reflect::info::{
    CollectionKind, GenericType, ScalarKind, ShapeBuilder, ShapeCell, TypeRef, TypeShape,
};
use bean_reflect::{BeanEngine, Typed};
use chrono::{DateTime, TimeZone, Utc};
use bean_reflect::registry::TypeRegistry;
use bean_reflect::tree::TreeNode;
use bean_reflect::value::Value;

use common::{Customer, Status, customer};

#[derive(Debug, Clone, PartialEq)]
struct Ruler {
    sep: char,
    pad: Option<char>,
    stamp: DateTime<Utc>,
}

impl Default for Ruler {
    fn default() -> Self {
        Self {
            sep: ',',
            pad: None,
            stamp: DateTime::<Utc>::UNIX_EPOCH,
        }
    }
}

impl Typed for Ruler {
    fn type_shape() -> &'static TypeShape {
        static CELL: ShapeCell = ShapeCell::new();
        CELL.get_or_init(|| {
            ShapeBuilder::<Self>::new()
                .property("sep", |r| &r.sep, |r| &mut r.sep)
                .property("pad", |r| &r.pad, |r| &mut r.pad)
                .property("stamp", |r| &r.stamp, |r| &mut r.stamp)
                .constructible()
                .build()
        })
    }
}

// Reads spelled-out small numbers as integers.
struct Spelled;

impl ScalarConverter for Spelled {
    fn convert(
        &self,
        target: ScalarKind,
        value: &Value,
        date_format: Option<&str>,
    ) -> Result<Value, CoercionError> {
        let spelled = match (target, value.as_str()) {
            (ScalarKind::I32, Some("one")) => Some(1),
            (ScalarKind::I32, Some("two")) => Some(2),
            (ScalarKind::I32, Some("three")) => Some(3),
            _ => None,
        };
        match spelled {
            Some(n) => Ok(Value::I32(n)),
            None => StandardConverter.convert(target, value, date_format),
        }
    }
}

fn parse(json: &str) -> TreeNode {
    serde_json::from_str(json).unwrap()
}

#[test]
fn customer_to_json_and_back() {
    let engine = BeanEngine::new();
    let node = engine.serialize_bean(&customer()).unwrap();
    let json = serde_json::to_string(&node).unwrap();
    assert_eq!(
        json,
        concat!(
            r#"{"address":{"city":"Arlington","line1":"12 Harbour Rd"},"age":41,"name":"Grace","#,
            r#""status":"Active","tags":["navy","cobol"]}"#,
        )
    );

    let back: Customer = engine.deserialize_bean(&parse(&json)).unwrap();
    assert_eq!(back, customer());
}

#[test]
fn customer_through_ron() {
    let engine = BeanEngine::new();
    let node = engine.serialize_bean(&customer()).unwrap();
    let text = ron::to_string(&node).unwrap();
    let parsed: TreeNode = ron::from_str(&text).unwrap();
    assert_eq!(parsed, node);
    assert_eq!(engine.deserialize_bean::<Customer>(&parsed).unwrap(), customer());
}

#[test]
fn typed_lists_and_single_values() {
    let engine = BeanEngine::new();
    let ints = GenericType::list_of(TypeRef::Scalar(ScalarKind::I32));

    let value = engine.deserialize_as(&ints, &parse("[1, 2, 3]")).unwrap();
    assert_eq!(value, Value::from(vec![1, 2, 3]));
    assert_eq!(engine.serialize_as(&ints, &value).unwrap(), parse("[1,2,3]"));

    let words = GenericType::list_of(TypeRef::Scalar(ScalarKind::String));
    let single = engine.deserialize_as(&words, &parse(r#""abc""#)).unwrap();
    assert_eq!(single, Value::Collection(CollectionKind::List, vec![Value::from("abc")]));

    let converted = engine.convert_generic(&words, Value::from("abc")).unwrap();
    assert_eq!(converted, single);
}

#[test]
fn named_types_need_a_registry() {
    let engine = BeanEngine::new();
    let node = parse(r#"{"name":"Ada","status":"Suspended"}"#);
    assert_eq!(
        engine.deserialize_named("Customer", &node).unwrap_err().kind(),
        ErrorKind::Resolution
    );

    let mut registry = TypeRegistry::new();
    registry.register::<Customer>();
    registry.register_enum::<Status>();
    engine.register_type_resolver(Arc::new(registry));

    let value = engine.deserialize_named("Customer", &node).unwrap();
    let ada = value.into_bean::<Customer>().unwrap();
    assert_eq!(ada.name, "Ada");
    assert_eq!(ada.status, Some(Status::Suspended));
    assert_eq!(ada.address, None);
}

#[test]
fn malformed_members_report_their_path() {
    let engine = BeanEngine::new();
    let err = engine
        .deserialize_bean::<Customer>(&parse(r#"{"address":{"city":[1]}}"#))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Serialization);
    let text = err.to_string();
    assert!(text.contains("Customer.address"), "{text}");
    assert!(text.contains("Address.city"), "{text}");

    let err = engine.deserialize_bean::<Customer>(&parse("[]")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Serialization);
}

#[test]
fn spaces_and_fine_dates_survive_a_round_trip() {
    let engine = BeanEngine::new();
    let ruler = Ruler {
        sep: ' ',
        pad: Some(' '),
        stamp: Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap(),
    };

    let node = engine.serialize_bean(&ruler).unwrap();
    assert_eq!(
        node,
        parse(r#"{"pad":" ","sep":" ","stamp":"2023-11-14T22:13:20.123456789Z"}"#)
    );
    assert_eq!(engine.deserialize_bean::<Ruler>(&node).unwrap(), ruler);

    let empty_pad: Ruler = engine.deserialize_bean(&parse(r#"{"pad":"","sep":";"}"#)).unwrap();
    assert_eq!(empty_pad.pad, None);
    assert_eq!(empty_pad.sep, ';');
    assert!(engine.deserialize_bean::<Ruler>(&parse(r#"{"sep":""}"#)).is_err());
}

#[test]
fn custom_converter_reads_leaves() {
    let ints = GenericType::list_of(TypeRef::Scalar(ScalarKind::I32));
    let node = parse(r#"["one", 2, "three"]"#);

    assert!(BeanEngine::new().deserialize_as(&ints, &node).is_err());

    let engine = BeanEngine::new().with_converter(Arc::new(Spelled));
    assert_eq!(engine.deserialize_as(&ints, &node).unwrap(), Value::from(vec![1, 2, 3]));
    assert_eq!(
        engine.deserialize(&TypeRef::Primitive(ScalarKind::I32), None, &parse(r#""two""#)).unwrap(),
        Value::I32(2)
    );
    assert_eq!(
        engine.convert(&TypeRef::Scalar(ScalarKind::I32), Value::from("one")).unwrap(),
        Value::I32(1)
    );
}
