//! Whole-bean operations built on property metadata.
//!
//! ## Menu
//!
//! - [`BeanEngine::bean_equals`](crate::BeanEngine::bean_equals),
//!   [`BeanEngine::bean_hash`](crate::BeanEngine::bean_hash): comparison over
//!   readable properties, with an ignore list.
//! - [`BeanEngine::shallow_copy`](crate::BeanEngine::shallow_copy),
//!   [`BeanEngine::shallow_copy_fields`](crate::BeanEngine::shallow_copy_fields):
//!   copying along nested field paths.

mod copy;
mod equality;
