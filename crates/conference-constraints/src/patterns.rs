//! Format patterns shared by the command rule tables.
//!
//! Patterns are written unanchored; [`crate::rule::PatternRule`] anchors
//! them so every match is a full match. The `regex` crate has no
//! look-around, so the password policy is a conjunction of independent
//! patterns, each reported under its own rule id.

use crate::error::ConstraintError;
use crate::rule::Rule;

/// Canonical lowercase UUID v4: version nibble `4`, variant nibble in `{8,9,a,b}`.
pub const UUID_V4: &str =
    "[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}";

pub const EMAIL: &str =
    r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?)*\.[A-Za-z]{2,}";

pub const URL: &str =
    r"https?://[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?)*(?::[0-9]{1,5})?(?:[/?#]\S*)?";

/// Letters, with single spaces, apostrophes or hyphens between letter runs.
pub const PERSON_NAME: &str = r"\p{L}+(?:[ '\-]\p{L}+)*";

/// Lowercase slug of 1 to 32 characters, no leading or trailing hyphen.
pub const TAG: &str = "[a-z0-9](?:[a-z0-9-]{0,30}[a-z0-9])?";

pub const PASSWORD_SHAPE: &str = r"\S{8,64}";
pub const PASSWORD_DIGIT: &str = ".*[0-9].*";
pub const PASSWORD_LOWERCASE: &str = ".*[a-z].*";
pub const PASSWORD_UPPERCASE: &str = ".*[A-Z].*";
pub const PASSWORD_SYMBOL: &str = r".*[^A-Za-z0-9\s].*";

pub fn identifier() -> Result<Rule, ConstraintError> {
    Rule::pattern("uuid", UUID_V4, "must be a lowercase version 4 UUID")
}

pub fn email() -> Result<Rule, ConstraintError> {
    Rule::pattern("email", EMAIL, "must be a valid email address")
}

pub fn url() -> Result<Rule, ConstraintError> {
    Rule::pattern("url", URL, "must be an http or https URL")
}

pub fn person_name() -> Result<Rule, ConstraintError> {
    Rule::pattern(
        "person_name",
        PERSON_NAME,
        "must contain only letters, single spaces, apostrophes or hyphens",
    )
}

pub fn tags() -> Result<Rule, ConstraintError> {
    Rule::each_matches(
        "tag",
        TAG,
        "must be lowercase letters, digits or inner hyphens, at most 32 characters",
    )
}

/// Password policy rules, in the order they are reported.
pub fn password() -> Result<Vec<Rule>, ConstraintError> {
    Ok(vec![
        Rule::pattern(
            "password_shape",
            PASSWORD_SHAPE,
            "must be 8 to 64 characters without whitespace",
        )?,
        Rule::pattern("password_digit", PASSWORD_DIGIT, "must contain a digit")?,
        Rule::pattern(
            "password_lowercase",
            PASSWORD_LOWERCASE,
            "must contain a lowercase letter",
        )?,
        Rule::pattern(
            "password_uppercase",
            PASSWORD_UPPERCASE,
            "must contain an uppercase letter",
        )?,
        Rule::pattern(
            "password_symbol",
            PASSWORD_SYMBOL,
            "must contain a symbol",
        )?,
    ])
}
