use conference_types::{CreateEvent, UpdateEvent};

use crate::error::ConstraintError;
use crate::patterns;
use crate::rule::Rule;
use crate::rule_set::RuleSet;
use crate::value::{Constrained, Field, FieldKind, FieldValue};

impl Constrained for CreateEvent {
    const TYPE_NAME: &'static str = "CreateEvent";
    const FIELDS: &'static [Field] = &[
        Field::new("name", FieldKind::Text),
        Field::new("description", FieldKind::Text),
        Field::new("location", FieldKind::Text),
        Field::new("website", FieldKind::Text),
        Field::new("tags", FieldKind::TextList),
        Field::new("capacity", FieldKind::Integer),
        Field::new("ticket_price", FieldKind::Decimal),
        Field::new("starts_at", FieldKind::Timestamp),
        Field::new("ends_at", FieldKind::Timestamp),
    ];

    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "name" => (&self.name).into(),
            "description" => (&self.description).into(),
            "location" => (&self.location).into(),
            "website" => (&self.website).into(),
            "tags" => (&self.tags).into(),
            "capacity" => self.capacity.into(),
            "ticket_price" => self.ticket_price.into(),
            "starts_at" => self.starts_at.into(),
            "ends_at" => self.ends_at.into(),
            _ => FieldValue::Absent,
        }
    }
}

impl Constrained for UpdateEvent {
    const TYPE_NAME: &'static str = "UpdateEvent";
    const FIELDS: &'static [Field] = &[
        Field::new("id", FieldKind::Text),
        Field::new("name", FieldKind::Text),
        Field::new("description", FieldKind::Text),
        Field::new("location", FieldKind::Text),
        Field::new("website", FieldKind::Text),
        Field::new("tags", FieldKind::TextList),
        Field::new("capacity", FieldKind::Integer),
        Field::new("ticket_price", FieldKind::Decimal),
        Field::new("starts_at", FieldKind::Timestamp),
        Field::new("ends_at", FieldKind::Timestamp),
    ];

    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "id" => (&self.id).into(),
            "name" => (&self.name).into(),
            "description" => (&self.description).into(),
            "location" => (&self.location).into(),
            "website" => (&self.website).into(),
            "tags" => (&self.tags).into(),
            "capacity" => self.capacity.into(),
            "ticket_price" => self.ticket_price.into(),
            "starts_at" => self.starts_at.into(),
            "ends_at" => self.ends_at.into(),
            _ => FieldValue::Absent,
        }
    }
}

pub const MAX_TICKET_PRICE: f64 = 10_000.0;

pub fn create_event() -> Result<RuleSet<CreateEvent>, ConstraintError> {
    RuleSet::builder()
        .field("name", [Rule::required(), Rule::length(3, 100)?])
        .field("description", [Rule::required(), Rule::word_count(5, 250)?])
        .field("location", [Rule::length(1, 200)?])
        .field("website", [patterns::url()?])
        .field("tags", [Rule::length(0, 10)?, patterns::tags()?])
        .field("capacity", [Rule::positive_or_zero()])
        .field(
            "ticket_price",
            [Rule::positive_or_zero(), Rule::decimal_max(MAX_TICKET_PRICE)?],
        )
        .field("starts_at", [Rule::required()])
        .build()
}

/// Same formats as creation, nothing but the id required, and at least one
/// field to change.
pub fn update_event() -> Result<RuleSet<UpdateEvent>, ConstraintError> {
    RuleSet::builder()
        .field("id", [Rule::required(), patterns::identifier()?])
        .field("name", [Rule::length(3, 100)?])
        .field("description", [Rule::word_count(0, 250)?])
        .field("location", [Rule::length(1, 200)?])
        .field("website", [patterns::url()?])
        .field("tags", [Rule::length(0, 10)?, patterns::tags()?])
        .field("capacity", [Rule::positive_or_zero()])
        .field(
            "ticket_price",
            [Rule::positive_or_zero(), Rule::decimal_max(MAX_TICKET_PRICE)?],
        )
        .any_of([
            "name",
            "description",
            "location",
            "website",
            "tags",
            "capacity",
            "ticket_price",
            "starts_at",
            "ends_at",
        ])
        .build()
}
