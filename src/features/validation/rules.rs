//! Field rules shared by every form. Each rule is a pure function returning
//! the violation message, or `None` when the value is acceptable. The server
//! stays authoritative; these rules only fail fast on the client.

use crate::features::{declarations::types::MaritalStatus, users::types::DocumentType};
use regex::Regex;

/// Characters that satisfy the password special-character condition.
pub const PASSWORD_SPECIALS: &str = "!@#$%^&*(),.?\":{}|<>";
pub const PASSWORD_MIN_CHARS: usize = 8;
pub const FULL_NAME_MIN_CHARS: usize = 3;
pub const FISCAL_YEAR_RANGE: std::ops::RangeInclusive<i32> = 2000..=2100;
pub const MAX_AMOUNT: f64 = 999_999_999_999.0;
pub const MAX_DEPENDENTS: u32 = 99;
pub const MAX_NOTES_CHARS: usize = 1000;

pub const REQUIRED: &str = "This field is required.";

/// One unmet password condition. Conditions are independent; each has its
/// own message so the caller can show the first one as guidance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PasswordViolation {
    TooShort,
    MissingLowercase,
    MissingUppercase,
    MissingDigit,
    MissingSpecial,
}

impl PasswordViolation {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::TooShort => "Password must be at least 8 characters long.",
            Self::MissingLowercase => "Password must contain at least one lowercase letter.",
            Self::MissingUppercase => "Password must contain at least one uppercase letter.",
            Self::MissingDigit => "Password must contain at least one number.",
            Self::MissingSpecial => {
                "Password must contain at least one special character (!@#$%^&*(),.?\":{}|<>)."
            }
        }
    }
}

fn matches(pattern: &str, value: &str) -> bool {
    Regex::new(pattern).is_ok_and(|regex| regex.is_match(value))
}

/// Non-empty after trimming.
#[must_use]
pub fn required(value: &str) -> Option<&'static str> {
    value.trim().is_empty().then_some(REQUIRED)
}

#[must_use]
pub fn full_name(value: &str) -> Option<&'static str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Some(REQUIRED);
    }
    if trimmed.chars().count() < FULL_NAME_MIN_CHARS {
        return Some("Full name must be at least 3 characters long.");
    }
    if !matches(r"^[\p{L}\s]+$", trimmed) {
        return Some("Full name may only contain letters and spaces.");
    }
    None
}

/// Digits only, unless the document is a passport, which also allows
/// letters. Without a document type the digits-only default applies.
#[must_use]
pub fn document_number(value: &str, kind: Option<DocumentType>) -> Option<&'static str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Some(REQUIRED);
    }
    match kind {
        Some(DocumentType::Passport) => (!matches(r"^[A-Za-z0-9]+$", trimmed))
            .then_some("Passport numbers may only contain letters and numbers."),
        _ => (!matches(r"^[0-9]+$", trimmed))
            .then_some("Document number may only contain numbers."),
    }
}

#[must_use]
pub fn document_type(value: &str) -> Option<&'static str> {
    if value.trim().is_empty() {
        return Some(REQUIRED);
    }
    value
        .parse::<DocumentType>()
        .is_err()
        .then_some("Choose a valid document type.")
}

#[must_use]
pub fn email(value: &str) -> Option<&'static str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Some(REQUIRED);
    }
    (!matches(
        r"^[A-Za-z0-9._-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$",
        trimmed,
    ))
    .then_some("Enter a valid email address.")
}

/// Every unmet strength condition, in the order they are reported.
#[must_use]
pub fn password_violations(value: &str) -> Vec<PasswordViolation> {
    let mut violations = Vec::new();
    if value.chars().count() < PASSWORD_MIN_CHARS {
        violations.push(PasswordViolation::TooShort);
    }
    if !value.chars().any(|c| c.is_ascii_lowercase()) {
        violations.push(PasswordViolation::MissingLowercase);
    }
    if !value.chars().any(|c| c.is_ascii_uppercase()) {
        violations.push(PasswordViolation::MissingUppercase);
    }
    if !value.chars().any(|c| c.is_ascii_digit()) {
        violations.push(PasswordViolation::MissingDigit);
    }
    if !value.chars().any(|c| PASSWORD_SPECIALS.contains(c)) {
        violations.push(PasswordViolation::MissingSpecial);
    }
    violations
}

/// First unmet strength condition.
#[must_use]
pub fn password_strength(value: &str) -> Option<&'static str> {
    if value.is_empty() {
        return Some(REQUIRED);
    }
    password_violations(value)
        .first()
        .map(|violation| violation.message())
}

/// Agreement is only checked once the primary password has a valid shape.
#[must_use]
pub fn password_confirmation(password: &str, confirmation: &str) -> Option<&'static str> {
    if password_strength(password).is_some() {
        return None;
    }
    (password != confirmation).then_some("Passwords do not match.")
}

#[must_use]
pub fn fiscal_year(value: &str) -> Option<&'static str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Some(REQUIRED);
    }
    match trimmed.parse::<i32>() {
        Ok(year) if FISCAL_YEAR_RANGE.contains(&year) => None,
        Ok(_) => Some("Fiscal year must be between 2000 and 2100."),
        Err(_) => Some("Fiscal year must be a whole number."),
    }
}

#[must_use]
pub fn total_income(value: &str) -> Option<&'static str> {
    if value.trim().is_empty() {
        return Some(REQUIRED);
    }
    amount(value)
}

/// Deductions are optional; when present they follow the amount rule.
#[must_use]
pub fn deductions(value: &str) -> Option<&'static str> {
    if value.trim().is_empty() {
        return None;
    }
    amount(value)
}

fn amount(value: &str) -> Option<&'static str> {
    match value.trim().parse::<f64>() {
        Ok(number) if !number.is_finite() => Some("Amount must be a valid number."),
        Ok(number) if number < 0.0 => Some("Amount cannot be negative."),
        Ok(number) if number > MAX_AMOUNT => Some("Amount exceeds the allowed limit."),
        Ok(_) => None,
        Err(_) => Some("Amount must be a valid number."),
    }
}

#[must_use]
pub fn marital_status(value: &str) -> Option<&'static str> {
    if value.trim().is_empty() {
        return Some(REQUIRED);
    }
    value
        .parse::<MaritalStatus>()
        .is_err()
        .then_some("Marital status must be one of: Soltero/a, Casado/a, Divorciado/a, Viudo/a.")
}

#[must_use]
pub fn dependents(value: &str) -> Option<&'static str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.parse::<i64>() {
        Ok(count) if count < 0 => Some("Dependents cannot be negative."),
        Ok(count) if count > i64::from(MAX_DEPENDENTS) => {
            Some("Dependents exceed the allowed limit.")
        }
        Ok(_) => None,
        Err(_) => Some("Dependents must be a whole number."),
    }
}

#[must_use]
pub fn other_notes(value: &str) -> Option<&'static str> {
    (value.trim().chars().count() > MAX_NOTES_CHARS)
        .then_some("Notes are too long (maximum 1000 characters).")
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRONG: &str = "Abcdef1!";

    #[test]
    fn full_name_accepts_accented_letters() {
        assert_eq!(full_name("José Núñez"), None);
        assert_eq!(full_name("  Ana  "), None);
    }

    #[test]
    fn full_name_rejects_short_digits_and_symbols() {
        assert_eq!(full_name("   "), Some(REQUIRED));
        assert!(full_name("Al").is_some());
        assert!(full_name("R2D2 Unit").is_some());
        assert!(full_name("Ana_Maria").is_some());
    }

    #[test]
    fn document_number_depends_on_type() {
        let all = [
            DocumentType::Cedula,
            DocumentType::IdentityCard,
            DocumentType::Passport,
            DocumentType::ForeignerId,
        ];
        for kind in all {
            assert_eq!(document_number("123456", Some(kind)), None, "{kind:?}");
            let alnum = document_number("AB1234", Some(kind));
            if kind == DocumentType::Passport {
                assert_eq!(alnum, None);
            } else {
                assert!(alnum.is_some(), "{kind:?} accepted AB1234");
            }
        }
        assert_eq!(document_number("123456", None), None);
        assert!(document_number("AB1234", None).is_some());
        assert_eq!(document_number("", Some(DocumentType::Passport)), Some(REQUIRED));
    }

    #[test]
    fn email_shape() {
        assert_eq!(email("ana.maria_perez-1@example.com.co"), None);
        assert!(email("ana+tag@example.com").is_some());
        assert!(email("ana@example").is_some());
        assert!(email("@example.com").is_some());
        assert!(email("ana example@example.com").is_some());
        assert_eq!(email(""), Some(REQUIRED));
    }

    #[test]
    fn strong_password_passes() {
        assert!(password_violations(STRONG).is_empty());
        assert_eq!(password_strength(STRONG), None);
    }

    #[test]
    fn removing_each_property_flips_the_result() {
        let cases = [
            ("Abcde1!", PasswordViolation::TooShort),
            ("ABCDEF1!", PasswordViolation::MissingLowercase),
            ("abcdef1!", PasswordViolation::MissingUppercase),
            ("Abcdefg!", PasswordViolation::MissingDigit),
            ("Abcdefg1", PasswordViolation::MissingSpecial),
        ];
        for (password, expected) in cases {
            assert_eq!(password_violations(password), vec![expected], "{password}");
            assert_eq!(password_strength(password), Some(expected.message()));
        }
    }

    #[test]
    fn each_condition_has_a_distinct_message() {
        let messages = [
            PasswordViolation::TooShort,
            PasswordViolation::MissingLowercase,
            PasswordViolation::MissingUppercase,
            PasswordViolation::MissingDigit,
            PasswordViolation::MissingSpecial,
        ]
        .map(PasswordViolation::message);
        for (index, message) in messages.iter().enumerate() {
            assert!(!messages[index + 1..].contains(message));
        }
    }

    #[test]
    fn case_rules_only_count_ascii_letters() {
        assert_eq!(
            password_violations("ÁBCDEF1!é"),
            vec![PasswordViolation::MissingLowercase]
        );
        assert_eq!(
            password_violations("ábcdef1!É"),
            vec![PasswordViolation::MissingUppercase]
        );
    }

    #[test]
    fn short_password_reports_length_first() {
        assert_eq!(
            password_strength("abc"),
            Some(PasswordViolation::TooShort.message())
        );
        assert_eq!(password_violations("abc").len(), 4);
    }

    #[test]
    fn confirmation_waits_for_valid_shape() {
        assert_eq!(password_confirmation("abc", "xyz"), None);
        assert_eq!(
            password_confirmation(STRONG, "Abcdef1?"),
            Some("Passwords do not match.")
        );
        assert_eq!(password_confirmation(STRONG, STRONG), None);
    }

    #[test]
    fn declaration_rules() {
        assert_eq!(fiscal_year("2024"), None);
        assert!(fiscal_year("1999").is_some());
        assert!(fiscal_year("20x4").is_some());

        assert_eq!(total_income("1500000.50"), None);
        assert!(total_income("").is_some());
        assert!(total_income("-1").is_some());
        assert!(total_income("1000000000000").is_some());
        assert!(total_income("NaN").is_some());

        assert_eq!(deductions(""), None);
        assert!(deductions("abc").is_some());

        assert_eq!(marital_status("Casado/a"), None);
        assert!(marital_status("Complicated").is_some());

        assert_eq!(dependents(""), None);
        assert_eq!(dependents("3"), None);
        assert!(dependents("-1").is_some());
        assert!(dependents("100").is_some());

        assert_eq!(other_notes(&"a".repeat(1000)), None);
        assert!(other_notes(&"a".repeat(1001)).is_some());
    }
}
