//! Name-based type lookup and the pluggable [`TypeResolver`] hook.
//!
//! The engine never loads or generates types. When it needs a type it cannot
//! learn from a shape (a type given by name, or the element type of a
//! container property declared with an open type variable), it asks the
//! resolver installed on the engine, if any.
//!
//! [`TypeRegistry`] is a ready-made resolver. With the `auto_register`
//! feature, types submitted through [`auto_register!`](crate::auto_register)
//! anywhere in the program can be collected in one call.

// -----------------------------------------------------------------------------
// Modules

#[cfg(feature = "auto_register")]
mod auto_register;
mod type_registry;
mod type_resolver;

// -----------------------------------------------------------------------------
// Exports

#[cfg(feature = "auto_register")]
pub use auto_register::{AutoRegisterFunc, register_bean, register_enum};
pub use type_registry::TypeRegistry;
pub use type_resolver::{ResolverSlot, TypeResolver};
