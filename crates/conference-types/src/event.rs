use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::EventId;
use crate::record::AuditStamp;

/// Domain form of a conference event.
///
/// Sessions are not held here. They reference their event by id and are
/// listed through the session repository.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
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

