use serde::{Deserialize, Serialize};

use crate::id::{EventId, SessionId, UserId};
use crate::record::AuditStamp;

/// A single rating cast on a session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub voter: UserId,
    pub rating: i64,
}

/// Domain form of a session, as produced by the base session mapping.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub event_id: EventId,
    pub title: String,
    pub summary: String,
    pub tags: Vec<String>,
    pub duration_minutes: i64,
    pub votes: Vec<Vote>,
    pub audit: AuditStamp,
}

impl Session {
    /// Mean rating, or `None` when nobody has voted.
    pub fn average_rating(&self) -> Option<f64> {
        if self.votes.is_empty() {
            return None;
        }
        let total: i64 = self.votes.iter().map(|v| v.rating).sum();
        Some(total as f64 / self.votes.len() as f64)
    }
}

/// Display-ready voter entry produced by the enrichment step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterSummary {
    pub user_id: UserId,
    /// `None` when the voter's user record no longer resolves.
    pub display_name: Option<String>,
    pub rating: i64,
}

/// A session together with its resolved voters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionDetails {
    pub session: Session,
    pub voters: Vec<VoterSummary>,
    pub average_rating: Option<f64>,
}
