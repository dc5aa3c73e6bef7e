//! Command objects accepted by the use cases.
//!
//! Every field is optional so that a command can represent exactly what the
//! caller sent. Presence, formats and bounds are enforced by the constraint
//! engine before a use case acts on a command.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A bare identifier, validated on its own (path lookups, deletes).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Id(pub String);

impl Id {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateEvent {
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub tags: Option<Vec<String>>,
    pub capacity: Option<i64>,
    pub ticket_price: Option<f64>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

/// Partial update of an event. Absent fields keep their stored value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateEvent {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub tags: Option<Vec<String>>,
    pub capacity: Option<i64>,
    pub ticket_price: Option<f64>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSession {
    pub event_id: Option<String>,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub tags: Option<Vec<String>>,
    pub duration_minutes: Option<i64>,
}

/// Partial update of a session. Absent fields keep their stored value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateSession {
    pub event_id: Option<String>,
    pub session_id: Option<String>,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub tags: Option<Vec<String>>,
    pub duration_minutes: Option<i64>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastVote {
    pub event_id: Option<String>,
    pub session_id: Option<String>,
    pub rating: Option<i64>,
}

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateUser {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: Option<String>,
}

/// Partial update of a user profile. Absent fields keep their stored value.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateUser {
    pub id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: Option<String>,
}

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Login {
    pub email: Option<String>,
    pub password: Option<String>,
}

fn redacted(password: &Option<String>) -> Option<&'static str> {
    password.as_ref().map(|_| "<redacted>")
}

impl fmt::Debug for CreateUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateUser")
            .field("email", &self.email)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("password", &redacted(&self.password))
            .finish()
    }
}

impl fmt::Debug for UpdateUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateUser")
            .field("id", &self.id)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("password", &redacted(&self.password))
            .finish()
    }
}

impl fmt::Debug for Login {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Login")
            .field("email", &self.email)
            .field("password", &redacted(&self.password))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_never_contains_password() {
        let login = Login {
            email: Some("ada@example.org".into()),
            password: Some("Sup3r$ecret".into()),
        };
        let rendered = format!("{login:?}");
        assert!(rendered.contains("ada@example.org"));
        assert!(!rendered.contains("Sup3r$ecret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn absent_password_renders_as_none() {
        let update = UpdateUser::default();
        assert!(format!("{update:?}").contains("password: None"));
    }
}
