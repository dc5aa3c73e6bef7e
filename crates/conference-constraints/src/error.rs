use serde::{Deserialize, Serialize};
use std::fmt;

/// One failed rule against one field (or against the object as a whole).
///
/// `path` is empty for object-level failures (null argument, any-of),
/// the field name for field rules, and `param.field` for nested parameter
/// validation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Violation {
    pub path: String,
    pub message: String,
    pub rule_id: String,
}

impl Violation {
    pub fn new(
        path: impl Into<String>,
        message: impl Into<String>,
        rule_id: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            rule_id: rule_id.into(),
        }
    }

    /// Violation reported for a missing top-level argument.
    pub fn not_null(path: impl Into<String>) -> Self {
        Self::new(path, "must not be null", "not_null")
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "[{}] {}", self.rule_id, self.message)
        } else {
            write!(f, "[{}] {}: {}", self.rule_id, self.path, self.message)
        }
    }
}

/// Insertion-ordered set of violations.
///
/// Order follows evaluation order (fields in declaration order, rules in
/// registration order, object-level rules last). Exact duplicates are
/// dropped on insert.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Violations(Vec<Violation>);

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, violation: Violation) {
        if !self.0.contains(&violation) {
            self.0.push(violation);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.0.iter()
    }

    /// True if some violation has this exact path and rule id.
    pub fn contains(&self, path: &str, rule_id: &str) -> bool {
        self.0
            .iter()
            .any(|v| v.path == path && v.rule_id == rule_id)
    }

    pub fn into_vec(self) -> Vec<Violation> {
        self.0
    }

    /// `Ok(())` when empty, otherwise a [`ValidationFailure`] carrying every
    /// violation. This is where callers decide to turn a result into an error.
    pub fn into_result(self) -> Result<(), ValidationFailure> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ValidationFailure { violations: self })
        }
    }
}

impl Extend<Violation> for Violations {
    fn extend<I: IntoIterator<Item = Violation>>(&mut self, iter: I) {
        for violation in iter {
            self.push(violation);
        }
    }
}

impl FromIterator<Violation> for Violations {
    fn from_iter<I: IntoIterator<Item = Violation>>(iter: I) -> Self {
        let mut violations = Self::new();
        violations.extend(iter);
        violations
    }
}

impl IntoIterator for Violations {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Violations {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A non-empty violation set raised by a caller that requires validity.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("validation failed with {} violation(s)", .violations.len())]
pub struct ValidationFailure {
    pub violations: Violations,
}

/// Rule-table configuration errors, reported when a rule set, signature or
/// engine is built. Never produced while validating data.
#[derive(Debug, thiserror::Error)]
pub enum ConstraintError {
    #[error("{type_name} has no field named `{field}`")]
    UnknownField {
        type_name: &'static str,
        field: &'static str,
    },
    #[error("rule `{rule}` cannot be applied to {type_name}.{field}")]
    RuleNotApplicable {
        type_name: &'static str,
        field: &'static str,
        rule: &'static str,
    },
    #[error("invalid bounds for rule `{rule}`: min {min:?}, max {max:?}")]
    InvalidBounds {
        rule: &'static str,
        min: Option<f64>,
        max: Option<f64>,
    },
    #[error("invalid pattern `{id}`: {source}")]
    InvalidPattern {
        id: &'static str,
        #[source]
        source: regex::Error,
    },
    #[error("any-of rule on {type_name} needs at least one field")]
    EmptyAnyOf { type_name: &'static str },
    #[error("rule set for {type_name} registered twice")]
    DuplicateRuleSet { type_name: &'static str },
    #[error("use case `{use_case}` registered twice")]
    DuplicateUseCase { use_case: &'static str },
    #[error("use case `{use_case}` declares parameter `{param}` twice")]
    DuplicateParameter {
        use_case: &'static str,
        param: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_drops_exact_duplicates_and_keeps_order() {
        let mut violations = Violations::new();
        violations.push(Violation::new("b", "m", "r"));
        violations.push(Violation::new("a", "m", "r"));
        violations.push(Violation::new("b", "m", "r"));

        let paths: Vec<_> = violations.iter().map(|v| v.path.as_str()).collect();
        assert_eq!(paths, ["b", "a"]);
    }

    #[test]
    fn into_result_is_ok_only_when_empty() {
        assert!(Violations::new().into_result().is_ok());

        let failure = Violations::from_iter([Violation::not_null("")])
            .into_result()
            .unwrap_err();
        assert_eq!(failure.to_string(), "validation failed with 1 violation(s)");
    }

    #[test]
    fn display_omits_empty_path() {
        assert_eq!(
            Violation::not_null("").to_string(),
            "[not_null] must not be null"
        );
        assert_eq!(
            Violation::new("email", "must be a valid email address", "email").to_string(),
            "[email] email: must be a valid email address"
        );
    }
}
