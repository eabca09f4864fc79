//! Key Normalizer
//!
//! Trims and validates externally supplied key components before they reach
//! storage, and derives the lookup form used for case-insensitive keys.

use super::entity::{DomainError, DomainResult};

/// True when the value is missing, empty or whitespace-only
pub fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

/// Validate a required string parameter and return it trimmed.
///
/// `label` names the parameter in the error message, e.g. "tag type code".
pub fn validate_string_parameter(label: &str, value: Option<&str>) -> DomainResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(DomainError::InvalidInput(format!("A {} must be specified.", label))),
    }
}

/// Trim an optional text field; blank collapses to `None`
pub fn validate_optional_parameter(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Lower-cased form stored in shadow columns backing case-insensitive keys
pub fn lookup_key(value: &str) -> String {
    value.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trims_value() {
        assert_eq!(
            validate_string_parameter("namespace", Some("  NS_1 \t")).unwrap(),
            "NS_1"
        );
    }

    #[test]
    fn test_rejects_missing_and_blank() {
        for raw in [None, Some(""), Some("   "), Some("\n\t")] {
            let err = validate_string_parameter("tag type code", raw).unwrap_err();
            assert_eq!(
                err,
                DomainError::InvalidInput("A tag type code must be specified.".to_string())
            );
        }
    }

    #[test]
    fn test_optional_parameter() {
        assert_eq!(validate_optional_parameter(None), None);
        assert_eq!(validate_optional_parameter(Some("  ")), None);
        assert_eq!(
            validate_optional_parameter(Some(" desc ")),
            Some("desc".to_string())
        );
    }

    #[test]
    fn test_lookup_key() {
        assert_eq!(lookup_key(" Namespace_A "), "namespace_a");
        assert_eq!(lookup_key("ÄBC"), lookup_key("äbc"));
        assert!(is_blank(Some(" ")));
        assert!(!is_blank(Some("x")));
    }
}
