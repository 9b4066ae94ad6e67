//! Type introspection by explicit registration.
//!
//! A bean type describes itself once through a [`ShapeBuilder`]; the result,
//! a [`TypeShape`], lists its stored fields, its invocable methods with
//! their generic signatures, an optional ancestor, an optional wrapped value
//! and an optional constructor. The rest of the engine only reads shapes.
//!
//! ## Menu
//!
//! - [`TypeRef`], [`GenericType`]: declared types and generic arguments.
//! - [`ScalarKind`], [`CollectionKind`]: leaf and container kinds.
//! - [`BeanRef`], [`EnumRef`]: cheap, comparable handles to shapes.
//! - [`TypeShape`], [`ShapeBuilder`], [`ShapeCell`]: bean declarations.
//! - [`EnumShape`], [`EnumType`], [`EnumCell`]: enumerated constants.

// -----------------------------------------------------------------------------
// Modules

mod enum_shape;
mod shape;
mod type_ref;

// -----------------------------------------------------------------------------
// Exports

pub use enum_shape::{EnumCell, EnumConstant, EnumShape, EnumType};
pub use shape::{FieldDecl, Invoker, MethodDecl, ParentLink, ShapeBuilder, ShapeCell, TypeShape};
pub use shape::{HopFn, HopMutFn, ReadFn, WriteFn};
pub use type_ref::{BeanRef, CollectionKind, EnumRef, GenericArg, GenericType, ScalarKind, TypeRef};
