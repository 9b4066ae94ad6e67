//! Beans shared by the integration tests.
#![allow(dead_code)]

use bean_reflect::info::{ScalarKind, ShapeBuilder, ShapeCell, TypeRef, TypeShape};
use bean_reflect::value::Value;
use bean_reflect::{Typed, impl_enum_type};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Status {
    Active,
    Suspended,
}

impl_enum_type!(Status { Active => "A", Suspended => "S" });

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Address {
    pub line1: String,
    pub city: String,
}

impl Typed for Address {
    fn type_shape() -> &'static TypeShape {
        static CELL: ShapeCell = ShapeCell::new();
        CELL.get_or_init(|| {
            ShapeBuilder::<Self>::new()
                .property("line1", |a| &a.line1, |a| &mut a.line1)
                .property("city", |a| &a.city, |a| &mut a.city)
                .constructible()
                .build()
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Customer {
    pub name: String,
    pub age: i32,
    pub address: Option<Address>,
    pub tags: Vec<String>,
    pub status: Option<Status>,
}

impl Typed for Customer {
    fn type_shape() -> &'static TypeShape {
        static CELL: ShapeCell = ShapeCell::new();
        CELL.get_or_init(|| {
            ShapeBuilder::<Self>::new()
                .property("name", |c| &c.name, |c| &mut c.name)
                .property("age", |c| &c.age, |c| &mut c.age)
                .property("address", |c| &c.address, |c| &mut c.address)
                .property("tags", |c| &c.tags, |c| &mut c.tags)
                .property("status", |c| &c.status, |c| &mut c.status)
                .constructible()
                .build()
        })
    }
}

pub fn customer() -> Customer {
    Customer {
        name: "Grace".into(),
        age: 41,
        address: Some(Address {
            line1: "12 Harbour Rd".into(),
            city: "Arlington".into(),
        }),
        tags: vec!["navy".into(), "cobol".into()],
        status: Some(Status::Active),
    }
}

/// Holds a single [`Address`] exposed as `data`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Envelope {
    pub inner: Address,
}

impl Typed for Envelope {
    fn type_shape() -> &'static TypeShape {
        static CELL: ShapeCell = ShapeCell::new();
        CELL.get_or_init(|| {
            ShapeBuilder::<Self>::new()
                .wraps(|e| &e.inner, |e| &mut e.inner)
                .constructible()
                .build()
        })
    }
}

// Field `code` is an `i32`, its writer takes a string.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Broken {
    pub code: i32,
}

impl Typed for Broken {
    fn type_shape() -> &'static TypeShape {
        static CELL: ShapeCell = ShapeCell::new();
        CELL.get_or_init(|| {
            ShapeBuilder::<Self>::new()
                .field("code", TypeRef::Primitive(ScalarKind::I32))
                .writer("setCode", TypeRef::Primitive(ScalarKind::String), |_, _| Ok(()))
                .build()
        })
    }
}

/// Reaches its members only through `getX` / `setX` methods, so nested
/// writes go through a copy of the held bean.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Parcel {
    pub label: Option<Address>,
    pub extra: Value,
}

impl Typed for Parcel {
    fn type_shape() -> &'static TypeShape {
        static CELL: ShapeCell = ShapeCell::new();
        CELL.get_or_init(|| {
            ShapeBuilder::<Self>::new()
                .field("label", TypeRef::bean::<Address>())
                .reader("getLabel", TypeRef::bean::<Address>(), |p| {
                    p.label.clone().map_or(Value::Null, Value::from)
                })
                .writer("setLabel", TypeRef::bean::<Address>(), |p, value| {
                    p.label = value.take::<Option<Address>>()?;
                    Ok(())
                })
                .field("extra", TypeRef::Any)
                .reader("getExtra", TypeRef::Any, |p| p.extra.clone())
                .writer("setExtra", TypeRef::Any, |p, value| {
                    p.extra = value;
                    Ok(())
                })
                .constructible()
                .build()
        })
    }
}
