#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

// -----------------------------------------------------------------------------
// Extern Self

// Doc tests and exported macros name the crate as `bean_reflect`.
extern crate self as bean_reflect;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod bean;
mod engine;

pub mod access;
pub mod convert;
pub mod error;
pub mod info;
pub mod metadata;
pub mod ops;
pub mod registry;
pub mod tree;
pub mod value;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use bean::{Bean, Typed};
pub use engine::{BeanEngine, EngineConfig};

#[doc(hidden)]
pub mod __macro_exports {
    #[cfg(feature = "auto_register")]
    pub use inventory;
}
