//! Persistent-store ports and an in-memory reference store.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

use conference_types::{
    EventId, EventRecord, InternalUserId, SessionId, SessionRecord, UserId, UserRecord,
    VoteRecord,
};
use parking_lot::RwLock;

use crate::auditor::UserLookup;
use crate::error::BackendError;
use crate::keys;

/// A persisted row: how it is keyed, cached and grouped under a parent.
pub trait Record: Clone + Send + Sync + 'static {
    type Key: Clone + Ord + fmt::Debug + Send + Sync;
    /// Owner of the record; `()` for top-level records.
    type Parent: Send + Sync;

    fn key(&self) -> Self::Key;
    fn belongs_to(&self, parent: &Self::Parent) -> bool;
    fn cache_key(key: &Self::Key) -> String;
}

/// Sessions are addressed through their event.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionKey {
    pub event_id: EventId,
    pub session_id: SessionId,
}

impl SessionKey {
    pub fn new(event_id: EventId, session_id: SessionId) -> Self {
        Self {
            event_id,
            session_id,
        }
    }
}

impl Record for EventRecord {
    type Key = EventId;
    type Parent = ();

    fn key(&self) -> EventId {
        self.id.clone()
    }

    fn belongs_to(&self, _parent: &()) -> bool {
        true
    }

    fn cache_key(key: &EventId) -> String {
        keys::event_key(key)
    }
}

impl Record for SessionRecord {
    type Key = SessionKey;
    type Parent = EventId;

    fn key(&self) -> SessionKey {
        SessionKey::new(self.event_id.clone(), self.id.clone())
    }

    fn belongs_to(&self, parent: &EventId) -> bool {
        &self.event_id == parent
    }

    fn cache_key(key: &SessionKey) -> String {
        keys::session_key(&key.event_id, &key.session_id)
    }
}

impl Record for UserRecord {
    type Key = UserId;
    type Parent = ();

    fn key(&self) -> UserId {
        self.id.clone()
    }

    fn belongs_to(&self, _parent: &()) -> bool {
        true
    }

    fn cache_key(key: &UserId) -> String {
        keys::user_key(key)
    }
}

pub trait RecordStore<R: Record>: Send + Sync {
    fn find_by_id(&self, key: &R::Key) -> Result<Option<R>, BackendError>;

    /// Insert or replace by key; returns the stored record.
    fn save(&self, record: R) -> Result<R, BackendError>;

    /// Returns whether a record was removed.
    fn delete_by_id(&self, key: &R::Key) -> Result<bool, BackendError>;

    fn find_all_by_parent_id(&self, parent: &R::Parent) -> Result<Vec<R>, BackendError>;

    /// Returns how many records were removed.
    fn delete_all_by_parent_id(&self, parent: &R::Parent) -> Result<usize, BackendError>;

    fn count(&self) -> Result<u64, BackendError>;
}

/// Session writes that must not be built from a separate read.
pub trait SessionStore: RecordStore<SessionRecord> {
    /// Add `vote` to the session in one step, replacing an earlier vote by
    /// the same voter. `None` when there is no such session.
    fn upsert_vote(
        &self,
        key: &SessionKey,
        vote: VoteRecord,
    ) -> Result<Option<SessionRecord>, BackendError>;
}

/// User-specific queries beyond keyed access.
pub trait UserStore: RecordStore<UserRecord> + UserLookup {
    /// Case-insensitive email match.
    fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, BackendError>;

    /// Save `record` unless its email is already taken, checked in the same
    /// step. Returns whether it was saved.
    fn insert_unique_email(&self, record: UserRecord) -> Result<bool, BackendError>;

    fn next_internal_id(&self) -> Result<InternalUserId, BackendError>;
}

/// Ordered in-memory table guarded by a read-write lock.
#[derive(Debug)]
pub struct InMemoryStore<R: Record> {
    rows: RwLock<BTreeMap<R::Key, R>>,
    sequence: AtomicI64,
}

impl<R: Record> Default for InMemoryStore<R> {
    fn default() -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
            sequence: AtomicI64::new(0),
        }
    }
}

impl<R: Record> InMemoryStore<R> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<R: Record> RecordStore<R> for InMemoryStore<R> {
    fn find_by_id(&self, key: &R::Key) -> Result<Option<R>, BackendError> {
        Ok(self.rows.read().get(key).cloned())
    }

    fn save(&self, record: R) -> Result<R, BackendError> {
        self.rows.write().insert(record.key(), record.clone());
        Ok(record)
    }

    fn delete_by_id(&self, key: &R::Key) -> Result<bool, BackendError> {
        Ok(self.rows.write().remove(key).is_some())
    }

    fn find_all_by_parent_id(&self, parent: &R::Parent) -> Result<Vec<R>, BackendError> {
        Ok(self
            .rows
            .read()
            .values()
            .filter(|row| row.belongs_to(parent))
            .cloned()
            .collect())
    }

    fn delete_all_by_parent_id(&self, parent: &R::Parent) -> Result<usize, BackendError> {
        let mut rows = self.rows.write();
        let before = rows.len();
        rows.retain(|_, row| !row.belongs_to(parent));
        Ok(before - rows.len())
    }

    fn count(&self) -> Result<u64, BackendError> {
        Ok(self.rows.read().len() as u64)
    }
}

impl SessionStore for InMemoryStore<SessionRecord> {
    fn upsert_vote(
        &self,
        key: &SessionKey,
        vote: VoteRecord,
    ) -> Result<Option<SessionRecord>, BackendError> {
        let mut rows = self.rows.write();
        let Some(record) = rows.get_mut(key) else {
            return Ok(None);
        };
        match record.votes.iter_mut().find(|v| v.voter == vote.voter) {
            Some(existing) => *existing = vote,
            None => record.votes.push(vote),
        }
        Ok(Some(record.clone()))
    }
}

impl UserLookup for InMemoryStore<UserRecord> {
    fn find_internal_id(&self, external_id: &str) -> Result<Option<InternalUserId>, BackendError> {
        Ok(self
            .rows
            .read()
            .values()
            .find(|row| row.id.as_str() == external_id)
            .map(|row| row.internal_id))
    }
}

impl UserStore for InMemoryStore<UserRecord> {
    fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, BackendError> {
        Ok(self
            .rows
            .read()
            .values()
            .find(|row| row.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    fn insert_unique_email(&self, record: UserRecord) -> Result<bool, BackendError> {
        let mut rows = self.rows.write();
        if rows.values().any(|row| row.email.eq_ignore_ascii_case(&record.email)) {
            return Ok(false);
        }
        rows.insert(record.key(), record);
        Ok(true)
    }

    fn next_internal_id(&self) -> Result<InternalUserId, BackendError> {
        Ok(self.sequence.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use chrono::Utc;
    use conference_types::AuditStamp;

    use super::*;

    fn session(event_id: &EventId) -> SessionRecord {
        SessionRecord {
            id: SessionId::new_v4(),
            event_id: event_id.clone(),
            title: "Ownership in practice".into(),
            summary: "A tour of borrowing rules in real code".into(),
            tags: vec![],
            duration_minutes: 45,
            votes: vec![],
            audit: AuditStamp::created(1, Utc::now()),
        }
    }

    #[test]
    fn parent_queries_only_touch_children_of_that_parent() {
        let store = InMemoryStore::<SessionRecord>::new();
        let first = EventId::new_v4();
        let second = EventId::new_v4();
        store.save(session(&first)).unwrap();
        store.save(session(&first)).unwrap();
        let kept = store.save(session(&second)).unwrap();

        assert_eq!(store.find_all_by_parent_id(&first).unwrap().len(), 2);
        assert_eq!(store.delete_all_by_parent_id(&first).unwrap(), 2);
        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(store.find_by_id(&kept.key()).unwrap(), Some(kept));
    }

    #[test]
    fn internal_ids_are_allocated_in_sequence() {
        let store = InMemoryStore::<UserRecord>::new();
        assert_eq!(store.next_internal_id().unwrap(), 1);
        assert_eq!(store.next_internal_id().unwrap(), 2);
    }

    #[test]
    fn concurrent_votes_on_one_session_are_all_kept() {
        let store = Arc::new(InMemoryStore::<SessionRecord>::new());
        let key = store.save(session(&EventId::new_v4())).unwrap().key();

        thread::scope(|scope| {
            for rating in 1..=8 {
                let store = store.clone();
                let key = key.clone();
                scope.spawn(move || {
                    let vote = VoteRecord {
                        voter: UserId::new_v4(),
                        rating,
                        cast_at: Utc::now(),
                    };
                    store.upsert_vote(&key, vote).unwrap().unwrap();
                });
            }
        });

        let stored = store.find_by_id(&key).unwrap().unwrap();
        assert_eq!(stored.votes.len(), 8);
    }

    #[test]
    fn repeat_vote_replaces_and_missing_session_is_none() {
        let store = InMemoryStore::<SessionRecord>::new();
        let key = store.save(session(&EventId::new_v4())).unwrap().key();
        let voter = UserId::new_v4();
        let vote = |rating| VoteRecord {
            voter: voter.clone(),
            rating,
            cast_at: Utc::now(),
        };

        store.upsert_vote(&key, vote(2)).unwrap();
        let stored = store.upsert_vote(&key, vote(5)).unwrap().unwrap();
        assert_eq!(stored.votes.len(), 1);
        assert_eq!(stored.votes[0].rating, 5);

        let missing = SessionKey::new(EventId::new_v4(), SessionId::new_v4());
        assert_eq!(store.upsert_vote(&missing, vote(3)).unwrap(), None);
    }

    fn user(email: &str) -> UserRecord {
        UserRecord {
            id: UserId::new_v4(),
            internal_id: 1,
            email: email.into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            password_hash: "sha256$00$00".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn only_one_of_racing_inserts_claims_an_email() {
        let store = Arc::new(InMemoryStore::<UserRecord>::new());
        let saved = thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let store = store.clone();
                    scope.spawn(move || store.insert_unique_email(user("ada@example.com")).unwrap())
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .filter(|saved| *saved)
                .count()
        });

        assert_eq!(saved, 1);
        assert_eq!(store.count().unwrap(), 1);
        assert!(!store.insert_unique_email(user("ADA@example.com")).unwrap());
    }
}
