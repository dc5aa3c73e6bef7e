use conference_types::{CreateUser, Login, UpdateUser};

use crate::error::ConstraintError;
use crate::patterns;
use crate::rule::Rule;
use crate::rule_set::RuleSet;
use crate::value::{Constrained, Field, FieldKind, FieldValue};

impl Constrained for CreateUser {
    const TYPE_NAME: &'static str = "CreateUser";
    const FIELDS: &'static [Field] = &[
        Field::new("email", FieldKind::Text),
        Field::new("first_name", FieldKind::Text),
        Field::new("last_name", FieldKind::Text),
        Field::new("password", FieldKind::Text),
    ];

    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "email" => (&self.email).into(),
            "first_name" => (&self.first_name).into(),
            "last_name" => (&self.last_name).into(),
            "password" => (&self.password).into(),
            _ => FieldValue::Absent,
        }
    }
}

impl Constrained for UpdateUser {
    const TYPE_NAME: &'static str = "UpdateUser";
    const FIELDS: &'static [Field] = &[
        Field::new("id", FieldKind::Text),
        Field::new("first_name", FieldKind::Text),
        Field::new("last_name", FieldKind::Text),
        Field::new("password", FieldKind::Text),
    ];

    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "id" => (&self.id).into(),
            "first_name" => (&self.first_name).into(),
            "last_name" => (&self.last_name).into(),
            "password" => (&self.password).into(),
            _ => FieldValue::Absent,
        }
    }
}

impl Constrained for Login {
    const TYPE_NAME: &'static str = "Login";
    const FIELDS: &'static [Field] = &[
        Field::new("email", FieldKind::Text),
        Field::new("password", FieldKind::Text),
    ];

    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "email" => (&self.email).into(),
            "password" => (&self.password).into(),
            _ => FieldValue::Absent,
        }
    }
}

fn name_rules() -> Result<[Rule; 2], ConstraintError> {
    Ok([Rule::length(1, 50)?, patterns::person_name()?])
}

pub fn create_user() -> Result<RuleSet<CreateUser>, ConstraintError> {
    RuleSet::builder()
        .field("email", [Rule::required(), Rule::length(3, 254)?, patterns::email()?])
        .field("first_name", [Rule::required()])
        .field("first_name", name_rules()?)
        .field("last_name", [Rule::required()])
        .field("last_name", name_rules()?)
        .field("password", [Rule::required()])
        .field("password", patterns::password()?)
        .build()
}

pub fn update_user() -> Result<RuleSet<UpdateUser>, ConstraintError> {
    RuleSet::builder()
        .field("id", [Rule::required(), patterns::identifier()?])
        .field("first_name", name_rules()?)
        .field("last_name", name_rules()?)
        .field("password", patterns::password()?)
        .any_of(["first_name", "last_name", "password"])
        .build()
}

/// Login only checks shape; the password policy is not revealed to callers
/// that have not authenticated.
pub fn login() -> Result<RuleSet<Login>, ConstraintError> {
    RuleSet::builder()
        .field("email", [Rule::required(), patterns::email()?])
        .field("password", [Rule::required()])
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weak_password_reports_each_missing_class() {
        let command = CreateUser {
            email: Some("ada@example.org".into()),
            first_name: Some("Ada".into()),
            last_name: Some("Lovelace".into()),
            password: Some("password".into()),
        };
        let violations = create_user().unwrap().check(&command);
        let got: Vec<_> = violations.iter().map(|v| v.rule_id.as_str()).collect();
        assert_eq!(got, ["password_digit", "password_uppercase", "password_symbol"]);
    }

    #[test]
    fn update_user_without_changes_fails_any_of() {
        let command = UpdateUser {
            id: Some("2cb4601f-8c3e-4f8a-bd2b-0a1b2c3d4e5f".into()),
            ..Default::default()
        };
        let violations = update_user().unwrap().check(&command);
        assert_eq!(violations.len(), 1);
        assert!(violations.contains("", "any_of"));
    }

    #[test]
    fn login_does_not_apply_password_policy() {
        let command = Login {
            email: Some("ada@example.org".into()),
            password: Some("x".into()),
        };
        assert!(login().unwrap().check(&command).is_empty());
    }
}
