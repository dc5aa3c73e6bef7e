//! Persistence-level records.
//!
//! Records are what the store accessors read and write. They carry the audit
//! columns flat and hold parents by id only: a session names its event, an
//! event never lists its sessions. The domain forms in [`crate::event`],
//! [`crate::session`] and [`crate::user`] are produced from records by the
//! service mappers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{EventId, InternalUserId, SessionId, UserId};

/// Who created/last modified a record, and when.
///
/// `created_*` are assigned once on first save; `modified_by` and
/// `updated_at` are re-stamped on every update.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStamp {
    pub created_by: InternalUserId,
    pub modified_by: InternalUserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AuditStamp {
    /// Stamp for a record saved for the first time.
    pub fn created(actor: InternalUserId, now: DateTime<Utc>) -> Self {
        Self {
            created_by: actor,
            modified_by: actor,
            created_at: now,
            updated_at: now,
        }
    }

    /// Re-stamp the modification columns, keeping the creation columns.
    pub fn touched(&self, actor: InternalUserId, now: DateTime<Utc>) -> Self {
        Self {
            created_by: self.created_by,
            modified_by: actor,
            created_at: self.created_at,
            updated_at: now,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: EventId,
    pub name: String,
    pub description: String,
    pub location: Option<String>,
    pub website: Option<String>,
    pub tags: Vec<String>,
    pub capacity: Option<i64>,
    pub ticket_price: Option<f64>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub audit: AuditStamp,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub voter: UserId,
    pub rating: i64,
    pub cast_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: SessionId,
    pub event_id: EventId,
    pub title: String,
    pub summary: String,
    pub tags: Vec<String>,
    pub duration_minutes: i64,
    pub votes: Vec<VoteRecord>,
    pub audit: AuditStamp,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub internal_id: InternalUserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Verifier-specific encoded password hash. Never leaves the store layer
    /// except through the credential lookup used by login.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
