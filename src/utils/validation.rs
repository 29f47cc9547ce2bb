use crate::utils::error::{MarketError, Result};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
});

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const PHONE_DIGITS: usize = 10;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// `local@domain.tld` shape, no whitespace anywhere.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Exactly ten digits once every non-digit character is stripped.
pub fn is_valid_phone(phone: &str) -> bool {
    phone.chars().filter(|c| c.is_ascii_digit()).count() == PHONE_DIGITS
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordStrength {
    Weak,
    Medium,
    Strong,
}

impl PasswordStrength {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Weak => "Débil",
            Self::Medium => "Media",
            Self::Strong => "Fuerte",
        }
    }
}

/// One point each for length, an uppercase letter, a digit and a symbol.
pub fn password_score(password: &str) -> u8 {
    let checks = [
        password.chars().count() >= MIN_PASSWORD_LENGTH,
        password.chars().any(|c| c.is_ascii_uppercase()),
        password.chars().any(|c| c.is_ascii_digit()),
        password.chars().any(|c| !c.is_ascii_alphanumeric()),
    ];
    checks.iter().filter(|passed| **passed).count() as u8
}

pub fn password_strength(password: &str) -> PasswordStrength {
    match password_score(password) {
        0 | 1 => PasswordStrength::Weak,
        2 | 3 => PasswordStrength::Medium,
        _ => PasswordStrength::Strong,
    }
}

/// First rule a password breaks. Symbols raise the strength score but are
/// not required to accept a password.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordIssue {
    Missing,
    TooShort,
    NoUppercase,
    NoDigit,
}

impl PasswordIssue {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Missing => "La contraseña es requerida",
            Self::TooShort => "Mínimo 8 caracteres",
            Self::NoUppercase => "Debe contener al menos una mayúscula",
            Self::NoDigit => "Debe contener al menos un número",
        }
    }
}

pub fn check_password(password: &str) -> std::result::Result<(), PasswordIssue> {
    if password.is_empty() {
        return Err(PasswordIssue::Missing);
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(PasswordIssue::TooShort);
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(PasswordIssue::NoUppercase);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(PasswordIssue::NoDigit);
    }
    Ok(())
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(MarketError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(MarketError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(MarketError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(MarketError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(MarketError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_shape() {
        assert!(is_valid_email("ana@correo.com"));
        assert!(is_valid_email("a.b+c@sub.dominio.co"));
        assert!(!is_valid_email("ana@correo"));
        assert!(!is_valid_email("ana correo@x.com"));
        assert!(!is_valid_email("@correo.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_phone_counts_digits_only() {
        assert!(is_valid_phone("3001234567"));
        assert!(is_valid_phone("300 123 4567"));
        assert!(is_valid_phone("(300) 123-4567"));
        assert!(!is_valid_phone("+57 300 123 4567"));
        assert!(!is_valid_phone("300123456"));
    }

    #[test]
    fn test_password_strength_levels() {
        assert_eq!(password_score(""), 0);
        assert_eq!(password_strength("abc"), PasswordStrength::Weak);
        assert_eq!(password_strength("abcdefgh"), PasswordStrength::Weak);
        assert_eq!(password_strength("Abcdefgh"), PasswordStrength::Medium);
        assert_eq!(password_strength("Abcdefg1"), PasswordStrength::Medium);
        assert_eq!(password_strength("Abcdef1!"), PasswordStrength::Strong);
        assert_eq!(PasswordStrength::Strong.label(), "Fuerte");
    }

    #[test]
    fn test_password_acceptance_does_not_require_symbol() {
        assert_eq!(check_password("Abcdefg1"), Ok(()));
        assert_eq!(password_strength("Abcdefg1"), PasswordStrength::Medium);
    }

    #[test]
    fn test_password_acceptance_reports_first_broken_rule() {
        assert_eq!(check_password(""), Err(PasswordIssue::Missing));
        assert_eq!(check_password("Ab1"), Err(PasswordIssue::TooShort));
        assert_eq!(check_password("abcdefg1"), Err(PasswordIssue::NoUppercase));
        assert_eq!(check_password("Abcdefgh"), Err(PasswordIssue::NoDigit));
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("api.base_url", "https://example.com").is_ok());
        assert!(validate_url("api.base_url", "http://localhost:5000").is_ok());
        assert!(validate_url("api.base_url", "").is_err());
        assert!(validate_url("api.base_url", "invalid-url").is_err());
        assert!(validate_url("api.base_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("search.page_size", 12, 1, 100).is_ok());
        assert!(validate_range("search.page_size", 0, 1, 100).is_err());
    }
}
