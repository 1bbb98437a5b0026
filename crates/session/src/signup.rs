//! Sign-up request and pre-flight validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const MIN_PASSWORD_LEN: usize = 10;
const PASSWORD_SPECIALS: &str = "!@#$%^&*(),.?\":{}|<>";

/// Company created together with the first account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCompany {
    pub name: String,
    pub industry: String,
}

/// Default branch created together with the first account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBranch {
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub phone: String,
}

/// Everything the service needs to create a company, its default branch and
/// an admin principal in one call.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub company: NewCompany,
    pub branch: NewBranch,
}

impl fmt::Debug for SignUpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignUpRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("full_name", &self.full_name)
            .field("company", &self.company)
            .field("branch", &self.branch)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: &'static str,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every rule a request broke, in field order.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid request: {}", join(.0))]
pub struct ValidationErrors(pub Vec<FieldViolation>);

impl ValidationErrors {
    pub fn violations(&self) -> &[FieldViolation] {
        &self.0
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|v| v.field == field)
    }
}

fn join(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// `local@domain.tld`: one `@`, no whitespace, and a dot inside the domain.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let bytes = domain.as_bytes();
    bytes
        .iter()
        .enumerate()
        .any(|(i, b)| *b == b'.' && i > 0 && i + 1 < bytes.len())
}

/// Every password rule the input breaks.
pub fn password_violations(password: &str) -> Vec<&'static str> {
    let mut violations = Vec::new();
    if password.chars().count() < MIN_PASSWORD_LEN {
        violations.push("must be at least 10 characters");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        violations.push("must contain at least one uppercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        violations.push("must contain at least one lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        violations.push("must contain at least one number");
    }
    if !password.chars().any(|c| PASSWORD_SPECIALS.contains(c)) {
        violations.push("must contain at least one special character");
    }
    violations
}

fn require_len(out: &mut Vec<FieldViolation>, field: &'static str, value: &str, min: usize, message: &'static str) {
    if value.trim().chars().count() < min {
        out.push(FieldViolation { field, message });
    }
}

impl SignUpRequest {
    /// Check the request before it reaches the service.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut out = Vec::new();

        if !is_valid_email(&self.email) {
            out.push(FieldViolation {
                field: "email",
                message: "invalid email format",
            });
        }
        out.extend(
            password_violations(&self.password)
                .into_iter()
                .map(|message| FieldViolation {
                    field: "password",
                    message,
                }),
        );
        require_len(&mut out, "full_name", &self.full_name, 2, "full name is required");
        require_len(&mut out, "company.name", &self.company.name, 2, "company name is required");
        require_len(&mut out, "company.industry", &self.company.industry, 1, "industry is required");
        require_len(&mut out, "branch.name", &self.branch.name, 2, "branch name is required");
        require_len(&mut out, "branch.address", &self.branch.address, 5, "address is required");
        require_len(&mut out, "branch.city", &self.branch.city, 2, "city is required");
        require_len(&mut out, "branch.state", &self.branch.state, 2, "state is required");
        require_len(&mut out, "branch.postal_code", &self.branch.postal_code, 3, "postal code is required");
        require_len(&mut out, "branch.phone", &self.branch.phone, 10, "valid phone number required");

        if out.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(out))
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_request(email: &str) -> SignUpRequest {
    SignUpRequest {
        email: email.to_string(),
        password: "Str0ng!Passw0rd".to_string(),
        full_name: "Maria Lopez".to_string(),
        company: NewCompany {
            name: "Lopez Trading".to_string(),
            industry: "retail".to_string(),
        },
        branch: NewBranch {
            name: "Main Branch".to_string(),
            address: "12 Market Street".to_string(),
            city: "Austin".to_string(),
            state: "TX".to_string(),
            postal_code: "73301".to_string(),
            phone: "5125550100".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shape() {
        assert!(is_valid_email("maria@example.com"));
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("maria@example"));
        assert!(!is_valid_email("maria@.com"));
        assert!(!is_valid_email("maria@example."));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("ma ria@example.com"));
        assert!(!is_valid_email("a@b@c.com"));
    }

    #[test]
    fn password_reports_all_violations() {
        assert!(password_violations("Str0ng!Passw0rd").is_empty());
        assert_eq!(password_violations("short").len(), 4);
        assert_eq!(password_violations("").len(), 5);
        assert_eq!(
            password_violations("alllowercase1!"),
            vec!["must contain at least one uppercase letter"]
        );
    }

    #[test]
    fn valid_request_passes() {
        assert_eq!(sample_request("maria@example.com").validate(), Ok(()));
    }

    #[test]
    fn invalid_request_lists_every_field() {
        let mut request = sample_request("not-an-email");
        request.password = "password".to_string();
        request.branch.phone = "123".to_string();

        let err = request.validate().unwrap_err();
        assert!(err.has_field("email"));
        assert!(err.has_field("branch.phone"));
        let password_count = err.violations().iter().filter(|v| v.field == "password").count();
        assert_eq!(password_count, 4);
        assert!(err.to_string().starts_with("invalid request: email: invalid email format"));
    }

    #[test]
    fn debug_hides_password() {
        let rendered = format!("{:?}", sample_request("maria@example.com"));
        assert!(!rendered.contains("Str0ng"));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: appending a compliant suffix always clears the password rules.
            #[test]
            fn compliant_suffix_satisfies_rules(prefix in "[a-zA-Z0-9]{0,20}") {
                let password = format!("{prefix}Aa1!xxxxxx");
                prop_assert!(password_violations(&password).is_empty());
            }

            /// Property: validation never panics on arbitrary emails.
            #[test]
            fn email_check_is_total(email in "\\PC{0,40}") {
                let _ = is_valid_email(&email);
            }
        }
    }
}
