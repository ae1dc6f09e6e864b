//! Raw input parsing for the menu boundary.
//!
//! Parse failures never reach the store; they abort the current menu action.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Non-integer text where an integer (age or id) was expected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub field: &'static str,
    pub raw: String,
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "`{}` is not a valid {}", self.raw, self.field)
    }
}

impl Error for ParseError {}

pub fn parse_int(raw: &str, field: &'static str) -> Result<i64, ParseError> {
    raw.trim().parse::<i64>().map_err(|_| ParseError {
        field,
        raw: raw.trim().to_string(),
    })
}

/// Returns `None` for blank input, meaning "keep the current value".
pub fn non_blank(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}
