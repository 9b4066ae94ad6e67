mod common;

use std::sync::Arc;
use std::thread;

use bean_reflect::error::ErrorKind;
use bean_reflect::info::TypeRef;
use bean_reflect::{BeanEngine, Typed};

use common::{Address, Broken, Customer, Envelope};

#[test]
fn nested_field_names_are_sorted_paths() {
    let engine = BeanEngine::new();
    let names = engine.nested_field_names(Customer::type_shape()).unwrap();
    assert_eq!(
        &*names,
        ["address", "address.city", "address.line1", "age", "name", "status", "tags"]
    );

    let flat = engine.field_names(Customer::type_shape()).unwrap();
    assert_eq!(&*flat, ["address", "age", "name", "status", "tags"]);
}

#[test]
fn conflicting_accessors_are_fatal() {
    let engine = BeanEngine::new();
    let err = engine.metadata_of::<Broken>().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DescriptorConflict);
    assert_eq!(err.property(), Some("code"));

    // Not remembered as a success.
    assert!(engine.field_names(Broken::type_shape()).is_err());
    assert!(engine.cache().is_empty());
}

#[test]
fn wrapped_value_is_named_data() {
    let engine = BeanEngine::new();
    let table = engine.metadata_of::<Envelope>().unwrap();
    let data = table.get("data").unwrap();
    assert!(data.is_wrapped_data());
    assert_eq!(data.declared(), &TypeRef::bean::<Address>());

    let names = engine.nested_field_names(Envelope::type_shape()).unwrap();
    assert_eq!(&*names, ["data.city", "data.line1"]);
}

#[test]
fn readers_reach_every_level() {
    let engine = BeanEngine::new();
    let found = engine.nested_properties_with_readers(Customer::type_shape()).unwrap();
    let paths: Vec<&str> = found.iter().map(|p| p.path()).collect();
    assert!(paths.contains(&"address.city"));
    assert!(paths.contains(&"tags"));
    assert!(paths.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn concurrent_resolution_yields_one_table() {
    let engine = Arc::new(BeanEngine::new());
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || engine.metadata_of::<Customer>().unwrap())
        })
        .collect();

    let tables: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let first = &tables[0];
    assert!(tables.iter().all(|t| Arc::ptr_eq(t, first)));
    assert_eq!(first.len(), 5);
}
