//! Field access without reflection.
//!
//! A command type describes its fields once, in declaration order, through
//! [`Constrained::FIELDS`], and hands out borrowed [`FieldValue`]s by name.
//! Rule sets are checked against that description when they are built, so a
//! rule naming a missing field, or a rule that cannot apply to a field's
//! kind, is rejected before any data is validated.

use chrono::{DateTime, Utc};

/// Static shape of a field value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Text,
    Integer,
    Decimal,
    Timestamp,
    TextList,
}

impl FieldKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Decimal => "decimal",
            Self::Timestamp => "timestamp",
            Self::TextList => "text list",
        }
    }
}

/// Declared field: name plus kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl Field {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind }
    }
}

/// Borrowed view of one field value. `Absent` stands for a null field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FieldValue<'a> {
    Absent,
    Text(&'a str),
    Integer(i64),
    Decimal(f64),
    Timestamp(DateTime<Utc>),
    TextList(&'a [String]),
}

impl FieldValue<'_> {
    /// Non-null and, for text and lists, non-empty.
    ///
    /// This is the population test used by any-of rules. Whitespace-only
    /// text counts as populated here; blankness is the `Required` rule's
    /// concern.
    pub fn is_populated(&self) -> bool {
        match self {
            Self::Absent => false,
            Self::Text(s) => !s.is_empty(),
            Self::TextList(items) => !items.is_empty(),
            Self::Integer(_) | Self::Decimal(_) | Self::Timestamp(_) => true,
        }
    }
}

impl<'a> From<&'a Option<String>> for FieldValue<'a> {
    fn from(value: &'a Option<String>) -> Self {
        value.as_deref().map_or(Self::Absent, Self::Text)
    }
}

impl<'a> From<&'a Option<Vec<String>>> for FieldValue<'a> {
    fn from(value: &'a Option<Vec<String>>) -> Self {
        value.as_deref().map_or(Self::Absent, Self::TextList)
    }
}

impl<'a> From<&'a str> for FieldValue<'a> {
    fn from(value: &'a str) -> Self {
        Self::Text(value)
    }
}

impl From<Option<i64>> for FieldValue<'_> {
    fn from(value: Option<i64>) -> Self {
        value.map_or(Self::Absent, Self::Integer)
    }
}

impl From<Option<f64>> for FieldValue<'_> {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Self::Absent, Self::Decimal)
    }
}

impl From<Option<DateTime<Utc>>> for FieldValue<'_> {
    fn from(value: Option<DateTime<Utc>>) -> Self {
        value.map_or(Self::Absent, Self::Timestamp)
    }
}

/// A type whose fields can be validated by a [`crate::RuleSet`].
pub trait Constrained: 'static {
    /// Name used in diagnostics and configuration errors.
    const TYPE_NAME: &'static str;

    /// Every field, in declaration order.
    const FIELDS: &'static [Field];

    /// Current value of the field called `name`.
    ///
    /// Only names from [`Self::FIELDS`] are ever requested; anything else may
    /// return [`FieldValue::Absent`].
    fn field(&self, name: &str) -> FieldValue<'_>;

    fn field_kind(name: &str) -> Option<FieldKind> {
        Self::FIELDS
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.kind)
    }
}
