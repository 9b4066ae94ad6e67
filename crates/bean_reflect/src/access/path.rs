use alloc::vec::Vec;

use crate::error::{ResolutionError, ResolutionKind};

/// Splits a dotted property path into its segments.
///
/// An empty path, or one with an empty segment such as `a..b`, is rejected.
pub(crate) fn split_path<'p>(
    owner: &'static str,
    path: &'p str,
) -> Result<Vec<&'p str>, ResolutionError> {
    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(ResolutionError::new(ResolutionKind::InvalidPath, owner, path));
    }
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_dots() {
        assert_eq!(split_path("T", "a").unwrap(), ["a"]);
        assert_eq!(split_path("T", "address.line1").unwrap(), ["address", "line1"]);
    }

    #[test]
    fn empty_segments_are_invalid() {
        for path in ["", ".", "a.", ".a", "a..b"] {
            let err = split_path("T", path).unwrap_err();
            assert_eq!(err.kind, ResolutionKind::InvalidPath);
            assert_eq!(err.property, path);
        }
    }
}
