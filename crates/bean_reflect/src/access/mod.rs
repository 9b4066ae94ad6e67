//! Property reads and writes by name and by dotted path.
//!
//! Everything here is an inherent method of [`BeanEngine`](crate::BeanEngine):
//!
//! - [`get_property`](crate::BeanEngine::get_property),
//!   [`set_property`](crate::BeanEngine::set_property): one property, no conversion.
//! - [`get_nested`](crate::BeanEngine::get_nested),
//!   [`find_nested`](crate::BeanEngine::find_nested),
//!   [`set_nested`](crate::BeanEngine::set_nested): dotted paths such as
//!   `address.line1`.
//! - [`nested_field_type`](crate::BeanEngine::nested_field_type),
//!   [`is_gettable`](crate::BeanEngine::is_gettable),
//!   [`is_settable`](crate::BeanEngine::is_settable): path checks on types.

mod nested;
mod path;

pub(crate) use path::split_path;
