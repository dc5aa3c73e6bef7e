//! Single-field rules.
//!
//! A [`Rule`] is a pure predicate over one [`FieldValue`] that yields at most
//! one [`Violation`]. Rules hold no state beyond their configuration and are
//! `Send + Sync`, so a built rule table can be shared freely.
//!
//! Null handling follows one convention: only [`Rule::Required`] and
//! [`Rule::WordCount`] look at absent values. Pattern, bound and
//! iterable-pattern rules pass on `Absent`, which lets "required" and
//! "well-formed" compose independently on optional fields.

use regex::Regex;

use crate::error::{ConstraintError, Violation};
use crate::value::{FieldKind, FieldValue};

/// A full-match regular expression with a stable rule id and message.
#[derive(Clone, Debug)]
pub struct PatternRule {
    id: &'static str,
    regex: Regex,
    message: &'static str,
}

impl PatternRule {
    /// Compile `pattern` anchored at both ends.
    pub fn new(
        id: &'static str,
        pattern: &str,
        message: &'static str,
    ) -> Result<Self, ConstraintError> {
        let regex = Regex::new(&format!("^(?:{pattern})$"))
            .map_err(|source| ConstraintError::InvalidPattern { id, source })?;
        Ok(Self { id, regex, message })
    }

    pub fn id(&self) -> &'static str {
        self.id
    }

    pub fn message(&self) -> &'static str {
        self.message
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// Inclusive numeric bounds. Either side may be open.
///
/// The measured quantity depends on the field: the value itself for integers
/// and decimals, the character count for text, the element count for lists.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bound {
    min: Option<f64>,
    max: Option<f64>,
}

impl Bound {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Result<Self, ConstraintError> {
        let invalid = || ConstraintError::InvalidBounds {
            rule: "bound",
            min,
            max,
        };
        if min.is_none() && max.is_none() {
            return Err(invalid());
        }
        if min.is_some_and(f64::is_nan) || max.is_some_and(f64::is_nan) {
            return Err(invalid());
        }
        if let (Some(lo), Some(hi)) = (min, max) {
            if lo > hi {
                return Err(invalid());
            }
        }
        Ok(Self { min, max })
    }

    pub fn contains(&self, measured: f64) -> bool {
        // NaN fails both comparisons and is therefore out of bounds.
        self.min.is_none_or(|lo| measured >= lo) && self.max.is_none_or(|hi| measured <= hi)
    }

    fn describe(&self) -> String {
        match (self.min, self.max) {
            (Some(lo), Some(hi)) => format!("between {lo} and {hi}"),
            (Some(lo), None) => format!("greater than or equal to {lo}"),
            (None, Some(hi)) => format!("less than or equal to {hi}"),
            (None, None) => "unbounded".to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub enum Rule {
    /// Present, and for text non-blank, for lists non-empty.
    Required,
    /// Text must fully match the pattern.
    Pattern(PatternRule),
    /// Value, length or size must lie within the bound.
    Bound(Bound),
    /// Whitespace-separated word count must lie in `[min, max]`.
    /// Absent text counts as zero words and is still checked.
    WordCount { min: usize, max: usize },
    /// Every list element must fully match the pattern. An absent list is
    /// vacuously valid.
    IterablePattern(PatternRule),
}

impl Rule {
    pub fn required() -> Self {
        Self::Required
    }

    pub fn pattern(
        id: &'static str,
        pattern: &str,
        message: &'static str,
    ) -> Result<Self, ConstraintError> {
        PatternRule::new(id, pattern, message).map(Self::Pattern)
    }

    pub fn each_matches(
        id: &'static str,
        pattern: &str,
        message: &'static str,
    ) -> Result<Self, ConstraintError> {
        PatternRule::new(id, pattern, message).map(Self::IterablePattern)
    }

    /// Integer range, inclusive on both ends.
    pub fn range(min: i64, max: i64) -> Result<Self, ConstraintError> {
        Bound::new(Some(min as f64), Some(max as f64)).map(Self::Bound)
    }

    /// `value >= 0`, zero included.
    pub fn positive_or_zero() -> Self {
        Self::Bound(Bound {
            min: Some(0.0),
            max: None,
        })
    }

    /// `value <= max`, `max` included.
    pub fn decimal_max(max: f64) -> Result<Self, ConstraintError> {
        Bound::new(None, Some(max)).map(Self::Bound)
    }

    /// Text length in characters or list size, inclusive.
    pub fn length(min: usize, max: usize) -> Result<Self, ConstraintError> {
        Bound::new(Some(min as f64), Some(max as f64)).map(Self::Bound)
    }

    pub fn word_count(min: usize, max: usize) -> Result<Self, ConstraintError> {
        if min > max {
            return Err(ConstraintError::InvalidBounds {
                rule: "word_count",
                min: Some(min as f64),
                max: Some(max as f64),
            });
        }
        Ok(Self::WordCount { min, max })
    }

    /// Stable identifier reported in violations.
    pub fn id(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Pattern(p) | Self::IterablePattern(p) => p.id(),
            Self::Bound(_) => "bound",
            Self::WordCount { .. } => "word_count",
        }
    }

    /// Whether this rule can be attached to a field of `kind`.
    pub fn applies_to(&self, kind: FieldKind) -> bool {
        match self {
            Self::Required => true,
            Self::Pattern(_) | Self::WordCount { .. } => kind == FieldKind::Text,
            Self::IterablePattern(_) => kind == FieldKind::TextList,
            Self::Bound(_) => matches!(
                kind,
                FieldKind::Integer | FieldKind::Decimal | FieldKind::Text | FieldKind::TextList
            ),
        }
    }

    /// Evaluate against one value, reporting under `path`.
    pub fn check(&self, path: &str, value: &FieldValue<'_>) -> Option<Violation> {
        match self {
            Self::Required => check_required(path, value),
            Self::Pattern(pattern) => match value {
                FieldValue::Text(text) if !pattern.is_match(text) => {
                    Some(Violation::new(path, pattern.message(), pattern.id()))
                }
                _ => None,
            },
            Self::Bound(bound) => check_bound(path, bound, value),
            Self::WordCount { min, max } => {
                let words = match value {
                    FieldValue::Text(text) => count_words(text),
                    _ => 0,
                };
                if (*min..=*max).contains(&words) {
                    None
                } else {
                    Some(Violation::new(
                        path,
                        format!("must contain between {min} and {max} words"),
                        "word_count",
                    ))
                }
            }
            Self::IterablePattern(pattern) => {
                let FieldValue::TextList(items) = value else {
                    return None;
                };
                let offending: Vec<usize> = items
                    .iter()
                    .enumerate()
                    .filter(|(_, item)| !pattern.is_match(item))
                    .map(|(index, _)| index)
                    .collect();
                if offending.is_empty() {
                    None
                } else {
                    Some(Violation::new(
                        path,
                        format!("elements at {offending:?}: {}", pattern.message()),
                        pattern.id(),
                    ))
                }
            }
        }
    }
}

/// Number of tokens separated by runs of whitespace.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

fn check_required(path: &str, value: &FieldValue<'_>) -> Option<Violation> {
    let message = match value {
        FieldValue::Absent => "must not be null",
        FieldValue::Text(text) if text.trim().is_empty() => "must not be blank",
        FieldValue::TextList(items) if items.is_empty() => "must not be empty",
        _ => return None,
    };
    Some(Violation::new(path, message, "required"))
}

fn check_bound(path: &str, bound: &Bound, value: &FieldValue<'_>) -> Option<Violation> {
    let (measured, subject) = match value {
        FieldValue::Integer(n) => (*n as f64, "must be"),
        FieldValue::Decimal(x) => (*x, "must be"),
        FieldValue::Text(text) => (text.chars().count() as f64, "length must be"),
        FieldValue::TextList(items) => (items.len() as f64, "size must be"),
        FieldValue::Absent | FieldValue::Timestamp(_) => return None,
    };
    if bound.contains(measured) {
        None
    } else {
        Some(Violation::new(
            path,
            format!("{subject} {}", bound.describe()),
            "bound",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> FieldValue<'_> {
        FieldValue::Text(s)
    }

    #[test]
    fn word_count_bounds_are_inclusive() {
        let rule = Rule::word_count(5, 10).unwrap();
        let four = "one two three four";
        let five = "one two three four five";
        let ten = "a b c d e f g h i j";
        let eleven = "a b c d e f g h i j k";

        assert!(rule.check("d", &text(four)).is_some());
        assert!(rule.check("d", &text(five)).is_none());
        assert!(rule.check("d", &text(ten)).is_none());
        assert!(rule.check("d", &text(eleven)).is_some());
    }

    #[test]
    fn word_count_ignores_leading_trailing_and_repeated_whitespace() {
        assert_eq!(count_words("  one \t two\n\nthree  "), 3);
        assert_eq!(count_words("   "), 0);
    }

    #[test]
    fn word_count_checks_absent_text_as_zero_words() {
        let strict = Rule::word_count(1, 3).unwrap();
        let lenient = Rule::word_count(0, 3).unwrap();

        let violation = strict.check("summary", &FieldValue::Absent).unwrap();
        assert_eq!(violation.rule_id, "word_count");
        assert!(lenient.check("summary", &FieldValue::Absent).is_none());
        assert!(lenient.check("summary", &text("   ")).is_none());
    }

    #[test]
    fn bounds_are_inclusive_at_both_edges() {
        let range = Rule::range(1, 5).unwrap();
        assert!(range.check("r", &FieldValue::Integer(1)).is_none());
        assert!(range.check("r", &FieldValue::Integer(5)).is_none());
        assert!(range.check("r", &FieldValue::Integer(0)).is_some());
        assert!(range.check("r", &FieldValue::Integer(6)).is_some());

        let non_negative = Rule::positive_or_zero();
        assert!(non_negative.check("c", &FieldValue::Integer(0)).is_none());
        assert!(non_negative.check("c", &FieldValue::Decimal(-0.01)).is_some());

        let max = Rule::decimal_max(99.99).unwrap();
        assert!(max.check("p", &FieldValue::Decimal(99.99)).is_none());
        assert!(max.check("p", &FieldValue::Decimal(100.0)).is_some());
        assert!(max.check("p", &FieldValue::Decimal(f64::NAN)).is_some());
    }

    #[test]
    fn length_measures_characters_not_bytes() {
        let rule = Rule::length(1, 3).unwrap();
        assert!(rule.check("n", &text("äöü")).is_none());
        assert_eq!(
            rule.check("n", &text("äöüß")).unwrap().message,
            "length must be between 1 and 3"
        );
    }

    #[test]
    fn inverted_or_open_bounds_are_rejected() {
        assert!(Rule::range(5, 1).is_err());
        assert!(Rule::word_count(3, 2).is_err());
        assert!(Rule::decimal_max(f64::NAN).is_err());
        assert!(Bound::new(None, None).is_err());
    }

    #[test]
    fn pattern_requires_full_match_and_skips_absent() {
        let rule = Rule::pattern("digits", "[0-9]+", "must be digits").unwrap();
        assert!(rule.check("x", &text("123")).is_none());
        assert!(rule.check("x", &text("123a")).is_some());
        assert!(rule.check("x", &text("a123")).is_some());
        assert!(rule.check("x", &FieldValue::Absent).is_none());
    }

    #[test]
    fn invalid_pattern_is_a_configuration_error() {
        let err = Rule::pattern("broken", "(", "never").unwrap_err();
        assert!(matches!(err, ConstraintError::InvalidPattern { id: "broken", .. }));
    }

    #[test]
    fn iterable_pattern_reports_offending_positions_once() {
        let rule = Rule::each_matches("tag", "[a-z]+", "must be lowercase letters").unwrap();
        let items = vec!["ok".to_string(), "Bad".to_string(), "fine".to_string(), "1".to_string()];

        let violation = rule.check("tags", &FieldValue::TextList(&items)).unwrap();
        assert_eq!(violation.path, "tags");
        assert_eq!(violation.rule_id, "tag");
        assert_eq!(violation.message, "elements at [1, 3]: must be lowercase letters");

        assert!(rule.check("tags", &FieldValue::Absent).is_none());
        assert!(rule.check("tags", &FieldValue::TextList(&[])).is_none());
    }

    #[test]
    fn required_rejects_null_blank_and_empty() {
        let rule = Rule::required();
        assert_eq!(
            rule.check("name", &FieldValue::Absent).unwrap().message,
            "must not be null"
        );
        assert_eq!(
            rule.check("name", &text(" \t")).unwrap().message,
            "must not be blank"
        );
        assert_eq!(
            rule.check("tags", &FieldValue::TextList(&[])).unwrap().message,
            "must not be empty"
        );
        assert!(rule.check("n", &FieldValue::Integer(0)).is_none());
    }

    #[test]
    fn applicability_follows_field_kind() {
        assert!(Rule::positive_or_zero().applies_to(FieldKind::Decimal));
        assert!(!Rule::positive_or_zero().applies_to(FieldKind::Timestamp));
        assert!(!Rule::word_count(0, 1).unwrap().applies_to(FieldKind::TextList));
        assert!(Rule::required().applies_to(FieldKind::Timestamp));
    }
}
