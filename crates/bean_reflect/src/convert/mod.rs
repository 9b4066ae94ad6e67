//! Value coercion and bean population.
//!
//! Scalar-to-scalar coercion is delegated to a [`ScalarConverter`]; the
//! engine builds containers, arrays, enum constants and beans around it and
//! applies the null-to-empty rule for primitives.
//!
//! ## Menu
//!
//! - [`ScalarConverter`], [`StandardConverter`]: scalar coercion.
//! - [`ValueFormatter`], [`DateFormatter`]: caller-supplied text formats.
//! - [`BeanEngine::convert`](crate::BeanEngine::convert) and friends,
//!   [`BeanEngine::populate_bean`](crate::BeanEngine::populate_bean),
//!   [`BeanEngine::set_bean_property`](crate::BeanEngine::set_bean_property),
//!   [`BeanEngine::clear_all_bean_properties`](crate::BeanEngine::clear_all_bean_properties).

// -----------------------------------------------------------------------------
// Modules

mod formatter;
mod orchestrator;
mod scalar;

// -----------------------------------------------------------------------------
// Exports

pub use formatter::{DateFormatter, ValueFormatter};
pub use scalar::{ScalarConverter, StandardConverter};

pub(crate) use scalar::{format_date, is_blank, parse_date};
