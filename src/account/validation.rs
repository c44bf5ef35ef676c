//! Input validation for account identities
//!
//! Validated newtypes for the three unique keys of an account. Fields are
//! private so every value in the store went through `new()`.

use std::fmt;

/// Validation errors for account identity fields
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ValidationError {
    #[error("Invalid length for {field}: expected {min}-{max}, got {actual}")]
    InvalidLength {
        field: &'static str,
        min: usize,
        max: usize,
        actual: usize,
    },

    #[error("Invalid format for {field}: '{value}' (expected: {expected})")]
    InvalidFormat {
        field: &'static str,
        value: String,
        expected: &'static str,
    },
}

fn check_length(
    field: &'static str,
    value: &str,
    min: usize,
    max: usize,
) -> Result<(), ValidationError> {
    let actual = value.chars().count();
    if actual < min || actual > max {
        return Err(ValidationError::InvalidLength {
            field,
            min,
            max,
            actual,
        });
    }
    Ok(())
}

// ============================================================================
// EmailAddress
// ============================================================================

/// Validated, normalized (trimmed + lowercased) email address
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// # Validation Rules
    /// - Length: 3-254 characters
    /// - Exactly one `@` with a non-empty local part
    /// - Domain contains a dot that is neither first nor last
    /// - No whitespace
    pub fn new(email: &str) -> Result<Self, ValidationError> {
        let email = email.trim().to_lowercase();
        check_length("email", &email, 3, 254)?;

        let invalid = || ValidationError::InvalidFormat {
            field: "email",
            value: email.clone(),
            expected: "local@domain.tld",
        };

        if email.chars().any(char::is_whitespace) {
            return Err(invalid());
        }
        let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
        if local.is_empty() || domain.contains('@') {
            return Err(invalid());
        }
        match domain.find('.') {
            Some(dot) if dot > 0 && !domain.ends_with('.') => {}
            _ => return Err(invalid()),
        }

        Ok(Self(email))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// MobileNumber
// ============================================================================

/// Validated mobile number: optional leading `+`, then 10-15 digits
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MobileNumber(String);

impl MobileNumber {
    pub fn new(mobile: &str) -> Result<Self, ValidationError> {
        let mobile = mobile.trim();
        let digits = mobile.strip_prefix('+').unwrap_or(mobile);
        check_length("mobile", digits, 10, 15)?;

        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::InvalidFormat {
                field: "mobile",
                value: mobile.to_string(),
                expected: "digits with optional leading +",
            });
        }

        Ok(Self(mobile.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for MobileNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// NationalId
// ============================================================================

/// Validated national ID: 10-17 digits
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NationalId(String);

impl NationalId {
    pub fn new(nid: &str) -> Result<Self, ValidationError> {
        let nid = nid.trim();
        check_length("nid", nid, 10, 17)?;

        if !nid.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::InvalidFormat {
                field: "nid",
                value: nid.to_string(),
                expected: "digits only",
            });
        }

        Ok(Self(nid.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for NationalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_normalized() {
        let email = EmailAddress::new("  Alice@Example.COM ").unwrap();
        assert_eq!(email.as_str(), "alice@example.com");
    }

    #[test]
    fn test_email_rejects_bad_format() {
        assert!(EmailAddress::new("alice").is_err());
        assert!(EmailAddress::new("@example.com").is_err());
        assert!(EmailAddress::new("alice@example").is_err());
        assert!(EmailAddress::new("alice@.com").is_err());
        assert!(EmailAddress::new("alice@example.").is_err());
        assert!(EmailAddress::new("a b@example.com").is_err());
        assert!(EmailAddress::new("a@b@example.com").is_err());
    }

    #[test]
    fn test_mobile() {
        assert!(MobileNumber::new("01712345678").is_ok());
        assert!(MobileNumber::new("+8801712345678").is_ok());
        assert!(matches!(
            MobileNumber::new("0171"),
            Err(ValidationError::InvalidLength { field: "mobile", .. })
        ));
        assert!(matches!(
            MobileNumber::new("0171234567x"),
            Err(ValidationError::InvalidFormat { field: "mobile", .. })
        ));
    }

    #[test]
    fn test_nid() {
        assert!(NationalId::new("1234567890").is_ok());
        assert!(NationalId::new("12345678901234567").is_ok());
        assert!(NationalId::new("123456789").is_err());
        assert!(NationalId::new("12345678AB").is_err());
    }
}
