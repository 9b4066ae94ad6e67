use alloc::format;
use alloc::string::{String, ToString};
use core::fmt::Write;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::error::CoercionError;
use crate::info::ScalarKind;
use crate::value::Value;

// -----------------------------------------------------------------------------
// ScalarConverter

/// Coerces one scalar value to another scalar kind.
///
/// `Null` converts to `Null`. A source the converter has no rule for also
/// yields `Null`; a source it has a rule for but cannot parse is an error.
pub trait ScalarConverter: Send + Sync {
    fn convert(
        &self,
        target: ScalarKind,
        value: &Value,
        date_format: Option<&str>,
    ) -> Result<Value, CoercionError>;
}

/// The stock [`ScalarConverter`].
///
/// | Target | Accepted sources |
/// |--------|------------------|
/// | string | every scalar; dates use the date format or RFC 3339; enums give their code |
/// | bool | bool; strings `true`, `y`, `yes`, `on` (any case) are true, other strings false |
/// | char | char; the first char of a string; integer code points |
/// | integers | integers, floats, decimals (truncated), numeric strings; `i64` dates as millis |
/// | floats, decimal | integers, floats, decimals, numeric strings |
/// | date | dates; strings in the date format or RFC 3339 or `YYYY-MM-DD`; `i64` epoch millis |
///
/// Blank strings convert to `Null` for every target but string. For char
/// only the empty string is blank.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardConverter;

fn failed(value: &Value, target: ScalarKind) -> CoercionError {
    CoercionError::new(format!("`{value:?}` is not a valid {}", target.name()))
}

fn integer_of(value: &Value, target: ScalarKind) -> Result<Option<i128>, CoercionError> {
    Ok(Some(match value {
        Value::I8(v) => i128::from(*v),
        Value::I16(v) => i128::from(*v),
        Value::I32(v) => i128::from(*v),
        Value::I64(v) => i128::from(*v),
        Value::F32(v) if v.is_finite() => v.trunc() as i128,
        Value::F64(v) if v.is_finite() => v.trunc() as i128,
        Value::F32(_) | Value::F64(_) => return Err(failed(value, target)),
        Value::Decimal(d) => d.trunc().to_i128().ok_or_else(|| failed(value, target))?,
        Value::Date(d) if target == ScalarKind::I64 => i128::from(d.timestamp_millis()),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(v) = s.parse::<i128>() {
                v
            } else {
                let d = s.parse::<Decimal>().map_err(|_| failed(value, target))?;
                d.trunc().to_i128().ok_or_else(|| failed(value, target))?
            }
        }
        _ => return Ok(None),
    }))
}

fn float_of(value: &Value, target: ScalarKind) -> Result<Option<f64>, CoercionError> {
    Ok(Some(match value {
        Value::I8(v) => f64::from(*v),
        Value::I16(v) => f64::from(*v),
        Value::I32(v) => f64::from(*v),
        Value::I64(v) => *v as f64,
        Value::F32(v) => f64::from(*v),
        Value::F64(v) => *v,
        Value::Decimal(d) => d.to_f64().ok_or_else(|| failed(value, target))?,
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| failed(value, target))?,
        _ => return Ok(None),
    }))
}

fn decimal_of(value: &Value) -> Result<Option<Decimal>, CoercionError> {
    Ok(Some(match value {
        Value::I8(v) => Decimal::from(*v),
        Value::I16(v) => Decimal::from(*v),
        Value::I32(v) => Decimal::from(*v),
        Value::I64(v) => Decimal::from(*v),
        Value::F32(v) => Decimal::try_from(*v).map_err(|e| CoercionError::new(e.to_string()))?,
        Value::F64(v) => Decimal::try_from(*v).map_err(|e| CoercionError::new(e.to_string()))?,
        Value::Decimal(d) => *d,
        Value::String(s) => s
            .trim()
            .parse::<Decimal>()
            .map_err(|_| failed(value, ScalarKind::Decimal))?,
        _ => return Ok(None),
    }))
}

/// Returns `true` if `text` stands for no value of kind `target`.
pub(crate) fn is_blank(target: ScalarKind, text: &str) -> bool {
    match target {
        ScalarKind::String => false,
        ScalarKind::Char => text.is_empty(),
        _ => text.trim().is_empty(),
    }
}

pub(crate) fn parse_date(text: &str, date_format: Option<&str>) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Some(pattern) = date_format {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, pattern) {
            return Some(dt.and_utc());
        }
        if let Ok(d) = NaiveDate::parse_from_str(text, pattern) {
            return d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Renders `date` with `pattern`, or as RFC 3339 with as many fraction
/// digits as it needs.
pub(crate) fn format_date(
    date: &DateTime<Utc>,
    pattern: Option<&str>,
) -> Result<String, CoercionError> {
    match pattern {
        Some(pattern) => {
            let mut out = String::new();
            write!(out, "{}", date.format(pattern))
                .map_err(|_| CoercionError::new(format!("invalid date format `{pattern}`")))?;
            Ok(out)
        }
        None => Ok(date.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
    }
}

fn narrow(target: ScalarKind, v: i128, value: &Value) -> Result<Value, CoercionError> {
    let out = match target {
        ScalarKind::I8 => i8::try_from(v).map(Value::I8).ok(),
        ScalarKind::I16 => i16::try_from(v).map(Value::I16).ok(),
        ScalarKind::I32 => i32::try_from(v).map(Value::I32).ok(),
        ScalarKind::I64 => i64::try_from(v).map(Value::I64).ok(),
        _ => None,
    };
    out.ok_or_else(|| {
        CoercionError::new(format!("`{value:?}` is out of range for {}", target.name()))
    })
}

impl ScalarConverter for StandardConverter {
    fn convert(
        &self,
        target: ScalarKind,
        value: &Value,
        date_format: Option<&str>,
    ) -> Result<Value, CoercionError> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        if value.scalar_kind() == Some(target) {
            return Ok(value.clone());
        }
        if value.as_str().is_some_and(|s| is_blank(target, s)) {
            return Ok(Value::Null);
        }
        if !matches!(value, Value::Enum(_)) && value.scalar_kind().is_none() {
            return Err(CoercionError::new(format!(
                "a {} is not a scalar",
                value.kind_name()
            )));
        }

        Ok(match target {
            ScalarKind::String => Value::String(match value {
                Value::Bool(v) => v.to_string(),
                Value::Char(v) => v.to_string(),
                Value::I8(v) => v.to_string(),
                Value::I16(v) => v.to_string(),
                Value::I32(v) => v.to_string(),
                Value::I64(v) => v.to_string(),
                Value::F32(v) => v.to_string(),
                Value::F64(v) => v.to_string(),
                Value::Decimal(v) => v.to_string(),
                Value::Date(v) => format_date(v, date_format)?,
                Value::Enum(v) => v.code().into(),
                _ => return Ok(Value::Null),
            }),
            ScalarKind::Bool => match value {
                Value::String(s) => {
                    let s = s.trim();
                    let truthy = ["true", "y", "yes", "on"];
                    Value::Bool(truthy.iter().any(|t| s.eq_ignore_ascii_case(t)))
                }
                _ => Value::Null,
            },
            ScalarKind::Char => match value {
                Value::String(s) => s.chars().next().map_or(Value::Null, Value::Char),
                other => match integer_of(other, target)? {
                    Some(code) => u32::try_from(code)
                        .ok()
                        .and_then(char::from_u32)
                        .map(Value::Char)
                        .ok_or_else(|| failed(value, target))?,
                    None => Value::Null,
                },
            },
            ScalarKind::I8 | ScalarKind::I16 | ScalarKind::I32 | ScalarKind::I64 => {
                match integer_of(value, target)? {
                    Some(v) => narrow(target, v, value)?,
                    None => Value::Null,
                }
            }
            ScalarKind::F32 => {
                float_of(value, target)?.map_or(Value::Null, |v| Value::F32(v as f32))
            }
            ScalarKind::F64 => float_of(value, target)?.map_or(Value::Null, Value::F64),
            ScalarKind::Decimal => decimal_of(value)?.map_or(Value::Null, Value::Decimal),
            ScalarKind::Date => match value {
                Value::String(s) => parse_date(s, date_format)
                    .map(Value::Date)
                    .ok_or_else(|| failed(value, target))?,
                Value::I64(ms) => DateTime::from_timestamp_millis(*ms)
                    .map(Value::Date)
                    .ok_or_else(|| failed(value, target))?,
                _ => Value::Null,
            },
        })
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn convert(target: ScalarKind, value: impl Into<Value>) -> Result<Value, CoercionError> {
        StandardConverter.convert(target, &value.into(), None)
    }

    #[test]
    fn booleans() {
        assert_eq!(convert(ScalarKind::Bool, "Yes"), Ok(Value::Bool(true)));
        assert_eq!(convert(ScalarKind::Bool, "on"), Ok(Value::Bool(true)));
        assert_eq!(convert(ScalarKind::Bool, "False"), Ok(Value::Bool(false)));
        assert_eq!(convert(ScalarKind::Bool, "Internet"), Ok(Value::Bool(false)));
        assert_eq!(convert(ScalarKind::Bool, 20i32), Ok(Value::Null));
        assert_eq!(convert(ScalarKind::Bool, Value::Null), Ok(Value::Null));
    }

    #[test]
    fn integers_truncate() {
        assert_eq!(convert(ScalarKind::I32, 145.38f64), Ok(Value::I32(145)));
        assert_eq!(convert(ScalarKind::I8, 85.38f64), Ok(Value::I8(85)));
        assert_eq!(convert(ScalarKind::I16, "3567"), Ok(Value::I16(3567)));
        assert_eq!(convert(ScalarKind::I64, " 12.9 "), Ok(Value::I64(12)));
        assert_eq!(convert(ScalarKind::I32, ""), Ok(Value::Null));
        assert!(convert(ScalarKind::I8, 300i32).is_err());
        assert!(convert(ScalarKind::I32, "abc").is_err());
    }

    #[test]
    fn floats_and_decimals() {
        assert_eq!(convert(ScalarKind::F64, 10i32), Ok(Value::F64(10.0)));
        assert_eq!(convert(ScalarKind::F64, "3567.6789"), Ok(Value::F64(3567.6789)));
        assert_eq!(
            convert(ScalarKind::Decimal, "3567.6789"),
            Ok(Value::Decimal(Decimal::new(35676789, 4)))
        );
        assert_eq!(convert(ScalarKind::Decimal, 10i32), Ok(Value::Decimal(Decimal::from(10))));
    }

    #[test]
    fn chars() {
        assert_eq!(convert(ScalarKind::Char, "Hello"), Ok(Value::Char('H')));
        assert_eq!(convert(ScalarKind::Char, 77i32), Ok(Value::Char('M')));
        assert_eq!(convert(ScalarKind::Char, " "), Ok(Value::Char(' ')));
        assert_eq!(convert(ScalarKind::Char, ""), Ok(Value::Null));
        assert_eq!(convert(ScalarKind::I32, " "), Ok(Value::Null));
    }

    #[test]
    fn dates() {
        let date = Utc.with_ymd_and_hms(2014, 10, 18, 0, 0, 0).unwrap();
        assert_eq!(convert(ScalarKind::Date, "2014-10-18"), Ok(Value::Date(date)));
        assert_eq!(
            StandardConverter.convert(
                ScalarKind::Date,
                &Value::from("18/10/2014"),
                Some("%d/%m/%Y")
            ),
            Ok(Value::Date(date))
        );
        assert_eq!(
            convert(ScalarKind::String, date),
            Ok(Value::from("2014-10-18T00:00:00Z"))
        );
        assert_eq!(
            convert(ScalarKind::I64, date),
            Ok(Value::I64(date.timestamp_millis()))
        );
        assert_eq!(convert(ScalarKind::Decimal, date), Ok(Value::Null));
        assert!(convert(ScalarKind::Date, "not a date").is_err());
    }

    #[test]
    fn dates_keep_sub_millisecond_digits() {
        let precise = Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap();
        let text = convert(ScalarKind::String, precise).unwrap();
        assert_eq!(text, Value::from("2023-11-14T22:13:20.123456789Z"));
        assert_eq!(convert(ScalarKind::Date, text), Ok(Value::Date(precise)));
    }

    #[test]
    fn non_scalars_are_rejected() {
        let map = Value::Map(Default::default());
        assert!(StandardConverter.convert(ScalarKind::String, &map, None).is_err());
    }
}
