//! Discovers the properties of a bean type from its [`TypeShape`].

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;
use std::sync::OnceLock;

use bean_utils::hash::HashMap;
use bean_utils::naming::{AccessorPrefix, parse_accessor};

use crate::Bean;
use crate::error::{BeanResult, DescriptorConflictError, InvokeError};
use crate::info::{GenericType, Invoker, MethodDecl, ScalarKind, TypeRef, TypeShape};
use crate::metadata::{PropertyDescriptor, Reader, TypeMetadata, Writer};
use crate::registry::TypeResolver;

const WRAPPED_DATA: &str = "data";

// -----------------------------------------------------------------------------
// Accessor collection

#[derive(Default)]
struct Accessors {
    reader: Option<(GenericType, Reader)>,
    writer: Option<(GenericType, Writer)>,
}

fn is_boolean(ty: &GenericType) -> bool {
    matches!(
        ty.raw(),
        TypeRef::Primitive(ScalarKind::Bool) | TypeRef::Scalar(ScalarKind::Bool)
    )
}

fn reader_of(method: &MethodDecl) -> Reader {
    match &method.invoker {
        Invoker::Read { read, hop, hop_mut } => Reader {
            method: method.name.clone(),
            read: read.clone(),
            hop: hop.clone(),
            hop_mut: hop_mut.clone(),
        },
        _ => {
            let name = method.name.clone();
            Reader {
                method: method.name.clone(),
                read: Arc::new(move |_: &dyn Bean| Err(InvokeError::NotInvocable(name.clone()))),
                hop: None,
                hop_mut: None,
            }
        }
    }
}

fn writer_of(method: &MethodDecl) -> Writer {
    match &method.invoker {
        Invoker::Write(write) => Writer {
            method: method.name.clone(),
            write: write.clone(),
        },
        _ => {
            let name = method.name.clone();
            Writer {
                method: method.name.clone(),
                write: Arc::new(move |_: &mut dyn Bean, _| {
                    Err(InvokeError::NotInvocable(name.clone()))
                }),
            }
        }
    }
}

/// Two signatures agree when their raw types match and every element type
/// known on both sides matches.
fn agree(left: &GenericType, right: &GenericType) -> bool {
    left.raw() == right.raw()
        && (0..2).all(|at| match (left.argument(at), right.argument(at)) {
            (Some(l), Some(r)) => l == r,
            _ => true,
        })
}

fn conflict(
    shape: &TypeShape,
    property: &str,
    left: &GenericType,
    right: &GenericType,
) -> DescriptorConflictError {
    DescriptorConflictError {
        type_path: shape.type_path(),
        property: property.into(),
        left: left.to_string(),
        right: right.to_string(),
    }
}

// Scans methods for `get<Name>`/`is<Name>` readers and `set<Name>` writers.
fn collect_accessors(shape: &TypeShape) -> BeanResult<BTreeMap<String, Accessors>> {
    let mut found: BTreeMap<String, Accessors> = BTreeMap::new();

    for method in shape.all_methods() {
        let Some((prefix, property)) = parse_accessor(&method.name) else {
            continue;
        };

        match (prefix, method.params.len(), &method.returns) {
            (AccessorPrefix::Get | AccessorPrefix::Is, 0, Some(returns)) => {
                if prefix == AccessorPrefix::Is && !is_boolean(returns) {
                    continue;
                }
                let entry = found.entry(property.clone()).or_default();
                match &entry.reader {
                    // `getX` and `isX` both present: the first one stays.
                    Some((existing, _)) if !agree(existing, returns) => {
                        return Err(conflict(shape, &property, existing, returns).into());
                    }
                    Some(_) => {}
                    None => entry.reader = Some((returns.clone(), reader_of(&method))),
                }
            }
            (AccessorPrefix::Set, 1, None) => {
                let param = method.params[0].clone();
                let entry = found.entry(property).or_default();
                if entry.writer.is_none() {
                    entry.writer = Some((param, writer_of(&method)));
                }
            }
            _ => {}
        }
    }

    Ok(found)
}

// -----------------------------------------------------------------------------
// resolve

/// Builds the metadata table of `shape`.
///
/// Reader and writer of one property must declare the same type and element
/// types. A field-backed property must also agree with its field. Any
/// disagreement is a [`DescriptorConflictError`].
///
/// Element types left open by the signatures are looked up through `hook`
/// by owner path and property name; if that fails they stay empty and can
/// be filled in later with [`PropertyDescriptor::back_fill`].
pub fn resolve(
    shape: &'static TypeShape,
    hook: Option<&dyn TypeResolver>,
) -> BeanResult<TypeMetadata> {
    let fields: HashMap<&'static str, GenericType> = shape
        .all_fields()
        .into_iter()
        .map(|f| (f.name, f.ty))
        .collect();

    let owner = shape.bean_ref();
    let mut properties = Vec::new();

    for (name, accessors) in collect_accessors(shape)? {
        if let (Some((read_ty, _)), Some((write_ty, _))) = (&accessors.reader, &accessors.writer) {
            if !agree(read_ty, write_ty) {
                return Err(conflict(shape, &name, read_ty, write_ty).into());
            }
        }

        let wrapped = match shape.wrapped() {
            Some(inner) if name == WRAPPED_DATA && accessors.reader.is_some() => Some(inner),
            _ => None,
        };

        let field = match wrapped {
            Some(_) => None,
            None => fields.get(name.as_str()),
        };
        if let Some(field_ty) = field {
            for accessor_ty in [
                accessors.reader.as_ref().map(|(ty, _)| ty),
                accessors.writer.as_ref().map(|(ty, _)| ty),
            ]
            .into_iter()
            .flatten()
            {
                if !agree(field_ty, accessor_ty) {
                    return Err(conflict(shape, &name, field_ty, accessor_ty).into());
                }
            }
        }

        let signature = match (wrapped, &accessors.reader, &accessors.writer) {
            (Some(inner), _, _) => inner,
            (None, Some((ty, _)), _) | (None, None, Some((ty, _))) => ty,
            (None, None, None) => continue,
        };

        let declared = signature.raw().clone();
        let element_types: [OnceLock<TypeRef>; 2] = Default::default();
        for (at, slot) in element_types.iter().enumerate() {
            let known = signature
                .argument(at)
                .or_else(|| field.and_then(|f| f.argument(at)))
                .or_else(|| accessors.reader.as_ref().and_then(|(ty, _)| ty.argument(at)))
                .or_else(|| accessors.writer.as_ref().and_then(|(ty, _)| ty.argument(at)));
            if let Some(ty) = known {
                let _ = slot.set(ty.clone());
            }
        }

        if matches!(declared, TypeRef::Collection(_)) && element_types[0].get().is_none() {
            match hook.and_then(|h| h.element_type(shape.type_path(), &name)) {
                Some(ty) => {
                    let _ = element_types[0].set(ty);
                }
                None => log::warn!(
                    "element type of `{}.{}` is unknown, deferred until supplied",
                    shape.type_path(),
                    name
                ),
            }
        }

        properties.push(PropertyDescriptor {
            declared,
            element_types,
            owner,
            field_backed: field.is_some(),
            wrapped: wrapped.is_some(),
            reader: accessors.reader.map(|(_, r)| r),
            writer: accessors.writer.map(|(_, w)| w),
            name,
        });
    }

    Ok(TypeMetadata::new(owner, properties))
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BeanError, ErrorKind};
    use crate::info::{CollectionKind, GenericArg, ShapeBuilder, ShapeCell};
    use crate::value::Value;
    use crate::Typed;

    #[derive(Debug, Clone, PartialEq, Default)]
    struct Account {
        id: i64,
        tags: Vec<String>,
        open: bool,
    }

    impl Typed for Account {
        fn type_shape() -> &'static TypeShape {
            static CELL: ShapeCell = ShapeCell::new();
            CELL.get_or_init(|| {
                ShapeBuilder::<Self>::new()
                    .property("id", |a| &a.id, |a| &mut a.id)
                    .property("tags", |a| &a.tags, |a| &mut a.tags)
                    .property("open", |a| &a.open, |a| &mut a.open)
                    .reader("getDisplay", TypeRef::Primitive(ScalarKind::String), |a| {
                        Value::String(alloc::format!("#{}", a.id))
                    })
                    .reader("isHidden", TypeRef::Primitive(ScalarKind::I32), |_| Value::I32(0))
                    .method(
                        "getOwner",
                        [GenericType::plain(TypeRef::Any)],
                        Some(TypeRef::Any.into()),
                    )
                    .method("setup", Vec::new(), None)
                    .build()
            })
        }
    }

    // Field `x` is an `i32` but its writer takes a `String`.
    #[derive(Debug, Clone, PartialEq, Default)]
    struct Broken {
        x: i32,
    }

    impl Typed for Broken {
        fn type_shape() -> &'static TypeShape {
            static CELL: ShapeCell = ShapeCell::new();
            CELL.get_or_init(|| {
                ShapeBuilder::<Self>::new()
                    .field("x", TypeRef::Primitive(ScalarKind::I32))
                    .writer("setX", TypeRef::Primitive(ScalarKind::String), |_, _| Ok(()))
                    .build()
            })
        }
    }

    #[derive(Debug, Clone, PartialEq, Default)]
    struct Mismatched;

    impl Typed for Mismatched {
        fn type_shape() -> &'static TypeShape {
            static CELL: ShapeCell = ShapeCell::new();
            CELL.get_or_init(|| {
                ShapeBuilder::<Self>::new()
                    .reader(
                        "getCodes",
                        GenericType::list_of(TypeRef::Scalar(ScalarKind::I32)),
                        |_| Value::Null,
                    )
                    .writer(
                        "setCodes",
                        GenericType::list_of(TypeRef::Scalar(ScalarKind::I64)),
                        |_, _| Ok(()),
                    )
                    .build()
            })
        }
    }

    #[derive(Debug, Clone, PartialEq, Default)]
    struct Open;

    impl Typed for Open {
        fn type_shape() -> &'static TypeShape {
            static CELL: ShapeCell = ShapeCell::new();
            CELL.get_or_init(|| {
                ShapeBuilder::<Self>::new()
                    .writer(
                        "setRows",
                        GenericType::with_args(
                            TypeRef::Collection(CollectionKind::List),
                            [GenericArg::Variable("T")],
                        ),
                        |_, _| Ok(()),
                    )
                    .build()
            })
        }
    }

    struct RowsResolver;

    impl TypeResolver for RowsResolver {
        fn resolve_type(&self, _: &str) -> Option<TypeRef> {
            None
        }

        fn element_type(&self, owner_path: &str, property: &str) -> Option<TypeRef> {
            (owner_path.ends_with("Open") && property == "rows")
                .then_some(TypeRef::Primitive(ScalarKind::String))
        }
    }

    #[test]
    fn discovers_conventional_accessors() {
        let table = resolve(Account::type_shape(), None).unwrap();
        let names: Vec<&str> = table.names().collect();
        assert_eq!(names, ["display", "id", "open", "tags"]);

        let id = table.get("id").unwrap();
        assert!(id.has_reader() && id.has_writer() && id.is_field_backed());
        assert_eq!(id.declared(), &TypeRef::Primitive(ScalarKind::I64));

        let display = table.get("display").unwrap();
        assert!(display.has_reader() && !display.has_writer() && !display.is_field_backed());

        let tags = table.get("tags").unwrap();
        assert_eq!(tags.element_type(0), Some(&TypeRef::Primitive(ScalarKind::String)));

        assert_eq!(table.get("open").unwrap().reader().unwrap().method(), "isOpen");
        // `isHidden` returns an i32; `getOwner` takes an argument.
        assert!(!table.contains("hidden"));
        assert!(!table.contains("owner"));
    }

    #[test]
    fn field_and_writer_conflict() {
        let err = resolve(Broken::type_shape(), None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DescriptorConflict);
        let BeanError::DescriptorConflict(conflict) = err else {
            unreachable!()
        };
        assert_eq!(conflict.property, "x");
        assert!(conflict.type_path.ends_with("Broken"));
    }

    #[test]
    fn element_type_conflict() {
        let err = resolve(Mismatched::type_shape(), None).unwrap_err();
        assert_eq!(err.property(), Some("codes"));
    }

    #[test]
    fn open_element_type_uses_hook_or_defers() {
        let deferred = resolve(Open::type_shape(), None).unwrap();
        let rows = deferred.get("rows").unwrap();
        assert_eq!(rows.element_type(0), None);
        assert_eq!(
            rows.back_fill(0, TypeRef::Primitive(ScalarKind::I32)),
            Some(&TypeRef::Primitive(ScalarKind::I32))
        );
        // Write-once.
        assert_eq!(
            rows.back_fill(0, TypeRef::Primitive(ScalarKind::I64)),
            Some(&TypeRef::Primitive(ScalarKind::I32))
        );

        let hooked = resolve(Open::type_shape(), Some(&RowsResolver)).unwrap();
        assert_eq!(
            hooked.get("rows").unwrap().element_type(0),
            Some(&TypeRef::Primitive(ScalarKind::String))
        );
    }

    #[test]
    fn independent_resolutions_are_equal() {
        let first = resolve(Account::type_shape(), None).unwrap();
        let second = resolve(Account::type_shape(), None).unwrap();
        assert_eq!(first, second);
    }
}
