use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{InternalUserId, UserId};

/// Domain form of a user. The password hash is deliberately absent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub internal_id: InternalUserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Identity of the logged-in caller as reported by the authentication layer.
///
/// The wrapped string is the external user identifier; it is not required to
/// be a well-formed [`UserId`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExternalIdentity(pub String);

impl ExternalIdentity {
    pub fn new(external_id: impl Into<String>) -> Self {
        Self(external_id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
