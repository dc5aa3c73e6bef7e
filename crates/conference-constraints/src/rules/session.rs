use conference_types::{CastVote, CreateSession, UpdateSession};

use crate::error::ConstraintError;
use crate::patterns;
use crate::rule::Rule;
use crate::rule_set::RuleSet;
use crate::value::{Constrained, Field, FieldKind, FieldValue};

impl Constrained for CreateSession {
    const TYPE_NAME: &'static str = "CreateSession";
    const FIELDS: &'static [Field] = &[
        Field::new("event_id", FieldKind::Text),
        Field::new("title", FieldKind::Text),
        Field::new("summary", FieldKind::Text),
        Field::new("tags", FieldKind::TextList),
        Field::new("duration_minutes", FieldKind::Integer),
    ];

    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "event_id" => (&self.event_id).into(),
            "title" => (&self.title).into(),
            "summary" => (&self.summary).into(),
            "tags" => (&self.tags).into(),
            "duration_minutes" => self.duration_minutes.into(),
            _ => FieldValue::Absent,
        }
    }
}

impl Constrained for UpdateSession {
    const TYPE_NAME: &'static str = "UpdateSession";
    const FIELDS: &'static [Field] = &[
        Field::new("event_id", FieldKind::Text),
        Field::new("session_id", FieldKind::Text),
        Field::new("title", FieldKind::Text),
        Field::new("summary", FieldKind::Text),
        Field::new("tags", FieldKind::TextList),
        Field::new("duration_minutes", FieldKind::Integer),
    ];

    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "event_id" => (&self.event_id).into(),
            "session_id" => (&self.session_id).into(),
            "title" => (&self.title).into(),
            "summary" => (&self.summary).into(),
            "tags" => (&self.tags).into(),
            "duration_minutes" => self.duration_minutes.into(),
            _ => FieldValue::Absent,
        }
    }
}

impl Constrained for CastVote {
    const TYPE_NAME: &'static str = "CastVote";
    const FIELDS: &'static [Field] = &[
        Field::new("event_id", FieldKind::Text),
        Field::new("session_id", FieldKind::Text),
        Field::new("rating", FieldKind::Integer),
    ];

    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "event_id" => (&self.event_id).into(),
            "session_id" => (&self.session_id).into(),
            "rating" => self.rating.into(),
            _ => FieldValue::Absent,
        }
    }
}

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;

pub fn create_session() -> Result<RuleSet<CreateSession>, ConstraintError> {
    RuleSet::builder()
        .field("event_id", [Rule::required(), patterns::identifier()?])
        .field("title", [Rule::required(), Rule::length(3, 120)?])
        .field("summary", [Rule::required(), Rule::word_count(5, 150)?])
        .field("tags", [Rule::length(0, 5)?, patterns::tags()?])
        .field("duration_minutes", [Rule::required(), Rule::range(5, 480)?])
        .build()
}

pub fn update_session() -> Result<RuleSet<UpdateSession>, ConstraintError> {
    RuleSet::builder()
        .field("event_id", [Rule::required(), patterns::identifier()?])
        .field("session_id", [Rule::required(), patterns::identifier()?])
        .field("title", [Rule::length(3, 120)?])
        .field("summary", [Rule::word_count(0, 150)?])
        .field("tags", [Rule::length(0, 5)?, patterns::tags()?])
        .field("duration_minutes", [Rule::range(5, 480)?])
        .any_of(["title", "summary", "tags", "duration_minutes"])
        .build()
}

pub fn cast_vote() -> Result<RuleSet<CastVote>, ConstraintError> {
    RuleSet::builder()
        .field("event_id", [Rule::required(), patterns::identifier()?])
        .field("session_id", [Rule::required(), patterns::identifier()?])
        .field("rating", [Rule::required(), Rule::range(MIN_RATING, MAX_RATING)?])
        .build()
}
