//! Field-level input validation shared by the create/update forms.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Validation failure bound to one input field.
///
/// `field` uses the wire name so callers can render the message next to the
/// offending input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl Error for ValidationError {}

/// Unknown string value for a closed set such as a status or type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
    pub expected: &'static str,
}

impl Display for UnknownVariant {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown {} `{}`; expected {}",
            self.kind, self.value, self.expected
        )
    }
}

impl Error for UnknownVariant {}

/// Checks the trimmed char count of `value` against `min..=max`.
///
/// `too_short` is reported below `min`; the upper bound gets a generic
/// message.
pub(crate) fn check_char_range(
    field: &'static str,
    value: &str,
    min: usize,
    max: usize,
    too_short: &str,
) -> Result<(), ValidationError> {
    let count = value.trim().chars().count();
    if count < min {
        return Err(ValidationError::new(field, too_short));
    }
    if count > max {
        return Err(ValidationError::new(
            field,
            format!("must be at most {max} characters"),
        ));
    }
    Ok(())
}

/// Trims an optional text input; blank values become `None`.
pub(crate) fn normalize_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::{check_char_range, normalize_optional};

    #[test]
    fn char_range_counts_trimmed_chars() {
        assert!(check_char_range("name", "  a  ", 2, 10, "too short").is_err());
        assert!(check_char_range("name", " ab ", 2, 10, "too short").is_ok());

        let err = check_char_range("name", "abcdef", 2, 5, "too short").unwrap_err();
        assert_eq!(err.field, "name");
        assert!(err.message.contains("at most 5"));
    }

    #[test]
    fn char_range_counts_unicode_scalars_not_bytes() {
        assert!(check_char_range("name", "Zoë", 3, 3, "too short").is_ok());
    }

    #[test]
    fn normalize_optional_drops_blank_values() {
        assert_eq!(normalize_optional(Some("   ")), None);
        assert_eq!(normalize_optional(None), None);
        assert_eq!(
            normalize_optional(Some(" a@b.edu ")).as_deref(),
            Some("a@b.edu")
        );
    }
}
