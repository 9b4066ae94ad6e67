//! Property discovery and its per-type cache.
//!
//! A type's [`TypeShape`](crate::info::TypeShape) is scanned once for
//! `get<Name>`/`is<Name>` readers and `set<Name>` writers. The result is a
//! [`TypeMetadata`] table of [`PropertyDescriptor`]s, kept by the
//! [`MetadataCache`] for the lifetime of the engine.
//!
//! ## Menu
//!
//! - [`PropertyDescriptor`], [`Reader`], [`Writer`]: one property.
//! - [`TypeMetadata`]: all properties of one type, sorted by name.
//! - [`MetadataCache`], [`NestedProperty`]: memoized tables and derived views.

// -----------------------------------------------------------------------------
// Modules

mod cache;
mod descriptor;
mod resolver;
mod table;

// -----------------------------------------------------------------------------
// Exports

pub use cache::{MetadataCache, NestedProperty};
pub use descriptor::{PropertyDescriptor, Reader, Writer};
pub use resolver::resolve;
pub use table::TypeMetadata;
