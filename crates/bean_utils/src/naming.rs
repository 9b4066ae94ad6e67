//! Accessor naming conventions.
//!
//! A method is a reader when it is named `get<Name>` or `is<Name>` and a
//! writer when it is named `set<Name>`, where the character right after the
//! prefix is upper-case. The property name is that character lower-cased
//! followed by the remainder, so `getAddressLine1` reads `addressLine1`.

use alloc::string::String;

// -----------------------------------------------------------------------------
// AccessorPrefix

/// The conventional prefix an accessor name starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessorPrefix {
    /// `get<Name>`
    Get,
    /// `is<Name>`, only meaningful for boolean readers.
    Is,
    /// `set<Name>`
    Set,
}

impl AccessorPrefix {
    /// Returns the literal prefix.
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Is => "is",
            Self::Set => "set",
        }
    }

    /// Returns `true` for the reader prefixes.
    #[inline]
    pub const fn is_reader(self) -> bool {
        matches!(self, Self::Get | Self::Is)
    }
}

// -----------------------------------------------------------------------------
// Parse & build

/// Splits an accessor name into its prefix and property name.
///
/// Returns `None` when `name` does not follow the convention.
///
/// # Examples
///
/// ```
/// use bean_utils::naming::{parse_accessor, AccessorPrefix};
///
/// assert_eq!(parse_accessor("getName"), Some((AccessorPrefix::Get, "name".into())));
/// assert_eq!(parse_accessor("isActive"), Some((AccessorPrefix::Is, "active".into())));
/// assert_eq!(parse_accessor("setURL"), Some((AccessorPrefix::Set, "uRL".into())));
/// assert_eq!(parse_accessor("getter"), None);
/// assert_eq!(parse_accessor("get"), None);
/// ```
pub fn parse_accessor(name: &str) -> Option<(AccessorPrefix, String)> {
    let prefix = if name.starts_with("get") {
        AccessorPrefix::Get
    } else if name.starts_with("is") {
        AccessorPrefix::Is
    } else if name.starts_with("set") {
        AccessorPrefix::Set
    } else {
        return None;
    };

    let rest = &name[prefix.as_str().len()..];
    let mut chars = rest.chars();
    let first = chars.next()?;
    if !first.is_uppercase() {
        return None;
    }

    let mut property = String::with_capacity(rest.len());
    property.extend(first.to_lowercase());
    property.push_str(chars.as_str());
    Some((prefix, property))
}

/// Builds the accessor name for `property`.
///
/// # Examples
///
/// ```
/// use bean_utils::naming::{accessor_name, AccessorPrefix};
///
/// assert_eq!(accessor_name(AccessorPrefix::Set, "line1"), "setLine1");
/// assert_eq!(accessor_name(AccessorPrefix::Is, "active"), "isActive");
/// ```
pub fn accessor_name(prefix: AccessorPrefix, property: &str) -> String {
    let mut name = String::with_capacity(prefix.as_str().len() + property.len());
    name.push_str(prefix.as_str());
    let mut chars = property.chars();
    if let Some(first) = chars.next() {
        name.extend(first.to_uppercase());
        name.push_str(chars.as_str());
    }
    name
}

// -----------------------------------------------------------------------------
// Dotted paths

/// Joins a parent path and a child name with `.`. An empty parent yields
/// the child alone.
///
/// ```
/// use bean_utils::naming::join_path;
///
/// assert_eq!(join_path("", "address"), "address");
/// assert_eq!(join_path("address", "line1"), "address.line1");
/// ```
#[inline]
pub fn join_path(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        return String::from(child);
    }
    let mut path = String::with_capacity(parent.len() + child.len() + 1);
    path.push_str(parent);
    path.push('.');
    path.push_str(child);
    path
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lower_case_after_prefix_is_rejected() {
        assert_eq!(parse_accessor("settle"), None);
        assert_eq!(parse_accessor("island"), None);
        assert_eq!(parse_accessor("is"), None);
        assert_eq!(parse_accessor("name"), None);
    }

    #[test]
    fn build_then_parse() {
        let name = accessor_name(AccessorPrefix::Get, "addressLine1");
        assert_eq!(name, "getAddressLine1");
        assert_eq!(
            parse_accessor(&name),
            Some((AccessorPrefix::Get, "addressLine1".into()))
        );
        assert_eq!(join_path("address", "line1"), "address.line1");
    }
}
