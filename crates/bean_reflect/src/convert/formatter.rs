use alloc::format;
use alloc::string::String;

use crate::convert::scalar::{format_date, is_blank, parse_date};
use crate::error::CoercionError;
use crate::info::ScalarKind;
use crate::value::Value;

/// A caller-supplied text representation applied before coercion.
///
/// When a conversion target is a non-string scalar and the source is text,
/// [`parse`](Self::parse) runs first. When the target is a string,
/// [`format`](Self::format) produces it.
pub trait ValueFormatter: Send + Sync {
    fn format(&self, value: &Value) -> Result<String, CoercionError>;

    fn parse(&self, text: &str) -> Result<Value, CoercionError>;
}

/// Formats and parses dates with a `strftime` pattern.
///
/// # Examples
///
/// ```
/// use bean_reflect::convert::{DateFormatter, ValueFormatter};
/// use bean_reflect::value::Value;
///
/// let formatter = DateFormatter::new("%d/%m/%Y");
/// let date = formatter.parse("18/10/2014").unwrap();
/// assert_eq!(formatter.format(&date).unwrap(), "18/10/2014");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormatter {
    pattern: String,
}

impl DateFormatter {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }

    #[inline]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl ValueFormatter for DateFormatter {
    fn format(&self, value: &Value) -> Result<String, CoercionError> {
        match value {
            Value::Date(date) => format_date(date, Some(&self.pattern)),
            other => Err(CoercionError::new(format!(
                "cannot format a {} as a date",
                other.kind_name()
            ))),
        }
    }

    fn parse(&self, text: &str) -> Result<Value, CoercionError> {
        if is_blank(ScalarKind::Date, text) {
            return Ok(Value::Null);
        }
        parse_date(text, Some(&self.pattern))
            .map(Value::Date)
            .ok_or_else(|| {
                CoercionError::new(format!("`{text}` does not match `{}`", self.pattern))
            })
    }
}
