use conference_types::Id;

use crate::error::ConstraintError;
use crate::patterns;
use crate::rule::Rule;
use crate::rule_set::RuleSet;
use crate::value::{Constrained, Field, FieldKind, FieldValue};

impl Constrained for Id {
    const TYPE_NAME: &'static str = "Id";
    const FIELDS: &'static [Field] = &[Field::new("id", FieldKind::Text)];

    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "id" => self.0.as_str().into(),
            _ => FieldValue::Absent,
        }
    }
}

pub fn id() -> Result<RuleSet<Id>, ConstraintError> {
    RuleSet::builder()
        .field("id", [Rule::required(), patterns::identifier()?])
        .build()
}

/// Rules for a scalar identifier parameter.
pub fn identifier_param() -> Result<[Rule; 2], ConstraintError> {
    Ok([Rule::required(), patterns::identifier()?])
}
