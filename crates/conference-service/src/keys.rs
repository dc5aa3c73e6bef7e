//! Cache key scheme.
//!
//! | entity            | key                          |
//! |-------------------|------------------------------|
//! | event             | `event:<eid>`                |
//! | session           | `event:<eid>:session:<sid>`  |
//! | sessions of event | `event:<eid>:*` (eviction)   |
//! | user              | `user:<uid>`                 |
//! | auditor           | `<external user id>`         |
//!
//! Lookups only ever use concrete keys. The wildcard form exists for bulk
//! eviction and is turned into a prefix with [`wildcard_prefix`]; note that
//! `event:<eid>:` does not match the event's own key.

use conference_types::{EventId, SessionId, UserId};

pub const WILDCARD: char = '*';

pub fn event_key(id: &EventId) -> String {
    format!("event:{id}")
}

pub fn session_key(event_id: &EventId, session_id: &SessionId) -> String {
    format!("event:{event_id}:session:{session_id}")
}

/// Wildcard covering every session of `event_id`.
pub fn event_sessions_pattern(event_id: &EventId) -> String {
    format!("event:{event_id}:{WILDCARD}")
}

pub fn user_key(id: &UserId) -> String {
    format!("user:{id}")
}

pub fn auditor_key(external_id: &str) -> String {
    external_id.to_string()
}

/// Literal prefix of a trailing-wildcard pattern.
pub fn wildcard_prefix(pattern: &str) -> &str {
    pattern.strip_suffix(WILDCARD).unwrap_or(pattern)
}
