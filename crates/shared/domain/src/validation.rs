//! Input validation helpers shared by the create/update payloads.

use once_cell::sync::Lazy;
use regex::Regex;
use validator::Validate;

use crate::error::{DomainError, DomainResult};

/// International or local mobile numbers: optional `+`, 8 to 15 digits.
static MOBILE_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9]{8,15}$").expect("mobile number pattern is valid"));

pub fn is_valid_mobile_number(value: &str) -> bool {
    MOBILE_NUMBER.is_match(value)
}

/// Reject a payload whose mobile number does not look dialable.
pub fn ensure_mobile_number(value: &str) -> DomainResult<()> {
    if is_valid_mobile_number(value) {
        Ok(())
    } else {
        Err(DomainError::validation(format!(
            "The mobile number {} is not valid",
            value
        )))
    }
}

/// Run the derived validator rules and flatten failures into one message.
pub fn validate_input<T: Validate>(input: &T) -> DomainResult<()> {
    input.validate().map_err(|errors| {
        let mut fields: Vec<String> = errors
            .field_errors()
            .keys()
            .map(|field| field.to_string())
            .collect();
        fields.sort();
        DomainError::validation(format!("Invalid value for: {}", fields.join(", ")))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mobile_numbers() {
        assert!(is_valid_mobile_number("+26772000001"));
        assert!(is_valid_mobile_number("72000001"));
        assert!(!is_valid_mobile_number("72-000-001"));
        assert!(!is_valid_mobile_number("123"));
        assert!(ensure_mobile_number("abc").is_err());
    }
}
