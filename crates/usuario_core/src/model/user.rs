//! User domain model and validation gate.
//!
//! # Responsibility
//! - Define `UserRecord`, the canonical stored shape.
//! - Define `UserDraft`, the field set proposed on create and edit.
//! - Validate drafts before they reach any repository.
//!
//! # Invariants
//! - `id` is assigned by storage and never changes afterwards.
//! - Stored names are trimmed, 3-100 chars long and free of control chars.
//! - Stored ages are within `[0, 150]`.
//! - Stored emails match the address shape and are at most 255 chars.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

/// Store-assigned user identifier.
pub type UserId = i64;

pub const NAME_MIN_CHARS: usize = 3;
pub const NAME_MAX_CHARS: usize = 100;
pub const AGE_MIN: i64 = 0;
pub const AGE_MAX: i64 = 150;
pub const EMAIL_MAX_CHARS: usize = 255;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// Field-level validation failure. The first failing rule wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Name is blank, its trimmed length is outside `[3, 100]`, or it
    /// contains control characters.
    InvalidName(String),
    /// Age is outside `[0, 150]`.
    InvalidAge(i64),
    /// Email is blank, too long or not shaped like `local@domain.tld`.
    InvalidEmail(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName(_) => write!(
                f,
                "name must be between {NAME_MIN_CHARS} and {NAME_MAX_CHARS} printable characters"
            ),
            Self::InvalidAge(age) => {
                write!(f, "age {age} is out of range [{AGE_MIN}, {AGE_MAX}]")
            }
            Self::InvalidEmail(_) => write!(
                f,
                "email must look like local@domain.tld and have at most {EMAIL_MAX_CHARS} characters"
            ),
        }
    }
}

impl Error for ValidationError {}

/// Proposed user fields for create and edit operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDraft {
    pub name: String,
    pub age: i64,
    pub email: String,
}

impl UserDraft {
    pub fn new(name: impl Into<String>, age: i64, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            age,
            email: email.into(),
        }
    }

    /// Runs the validation gate: name, then age, then email.
    ///
    /// Has no side effects; edit paths validate the full proposed values,
    /// not only the changed fields.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let name = self.name.trim();
        let name_chars = name.chars().count();
        if !(NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&name_chars)
            || name.chars().any(char::is_control)
        {
            return Err(ValidationError::InvalidName(self.name.clone()));
        }

        if !(AGE_MIN..=AGE_MAX).contains(&self.age) {
            return Err(ValidationError::InvalidAge(self.age));
        }

        if !is_valid_email(&self.email) {
            return Err(ValidationError::InvalidEmail(self.email.clone()));
        }

        Ok(())
    }

    /// Returns a copy with the name trimmed, as it is persisted.
    pub fn normalized(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            age: self.age,
            email: self.email.clone(),
        }
    }
}

/// Canonical stored user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub name: String,
    pub age: i64,
    pub email: String,
    /// Unix epoch milliseconds, set once on creation.
    pub registered_at: i64,
    /// Unix epoch milliseconds of the latest edit, `None` until first edit.
    pub updated_at: Option<i64>,
}

impl UserRecord {
    /// Returns the editable fields of this record as a draft.
    pub fn to_draft(&self) -> UserDraft {
        UserDraft::new(self.name.clone(), self.age, self.email.clone())
    }

    /// Re-checks stored fields against the validation gate.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.to_draft().validate()
    }
}

/// Current wall-clock time in Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
        })
}

fn is_valid_email(email: &str) -> bool {
    if email.trim().is_empty() || email.chars().count() > EMAIL_MAX_CHARS {
        return false;
    }
    EMAIL_RE.is_match(email)
}

#[cfg(test)]
mod tests {
    use super::{is_valid_email, UserDraft, ValidationError};

    #[test]
    fn email_shape_requires_dot_in_domain() {
        assert!(is_valid_email("ana@x.com"));
        assert!(!is_valid_email("ana@localhost"));
        assert!(!is_valid_email("ana @x.com"));
        assert!(!is_valid_email("@x.com"));
    }

    #[test]
    fn first_failing_rule_wins() {
        let draft = UserDraft::new("", -1, "nope");
        assert!(matches!(
            draft.validate(),
            Err(ValidationError::InvalidName(_))
        ));

        let draft = UserDraft::new("Ana", -1, "nope");
        assert_eq!(draft.validate(), Err(ValidationError::InvalidAge(-1)));
    }

    #[test]
    fn normalized_trims_name_only() {
        let draft = UserDraft::new("  Ana  ", 30, "ana@x.com").normalized();
        assert_eq!(draft.name, "Ana");
        assert_eq!(draft.email, "ana@x.com");
    }
}
