use std::sync::Arc;

use chrono::Utc;
use conference_types::{
    CreateSession, EventId, Session, SessionId, SessionRecord, UpdateSession, UserId, VoteRecord,
};
use tracing::info;

use super::CacheAside;
use crate::auditor::AuditorResolver;
use crate::cache::Cache;
use crate::config::ServiceConfig;
use crate::error::RepositoryError;
use crate::keys;
use crate::mapper::{Mapper, SessionMapper, WriteContext};
use crate::store::{SessionKey, SessionStore};

/// Sessions, cached under `event:<eid>:session:<sid>`.
///
/// A session only knows its event id; listing an event's sessions is a
/// store query by parent id.
pub struct SessionRepository {
    sessions: CacheAside<SessionMapper>,
    store: Arc<dyn SessionStore>,
    auditor: Arc<AuditorResolver>,
}

impl SessionRepository {
    pub fn new<S: SessionStore + 'static>(
        store: Arc<S>,
        cache: Arc<dyn Cache<Session>>,
        auditor: Arc<AuditorResolver>,
        config: &ServiceConfig,
    ) -> Self {
        Self {
            sessions: CacheAside::new("session", store.clone(), cache, config.is_read_through()),
            store,
            auditor,
        }
    }

    pub fn get_by_id(
        &self,
        event_id: &EventId,
        session_id: &SessionId,
    ) -> Result<Option<Session>, RepositoryError> {
        self.sessions
            .get(&SessionKey::new(event_id.clone(), session_id.clone()))
    }

    pub fn exists(
        &self,
        event_id: &EventId,
        session_id: &SessionId,
    ) -> Result<bool, RepositoryError> {
        self.sessions
            .exists(&SessionKey::new(event_id.clone(), session_id.clone()))
    }

    /// Sessions of `event_id`, each served through the session cache.
    pub fn list_by_event(&self, event_id: &EventId) -> Result<Vec<Session>, RepositoryError> {
        self.sessions
            .store()
            .find_all_by_parent_id(event_id)?
            .iter()
            .map(|record| self.sessions.serve(record))
            .collect()
    }

    pub fn create(&self, command: &CreateSession) -> Result<SessionId, RepositoryError> {
        let context = WriteContext {
            actor: self.auditor.resolve_current_user()?,
            now: Utc::now(),
        };
        let event_id = EventId::parse(command.event_id.as_deref().unwrap_or_default())?;
        let id = SessionId::new_v4();
        let record = SessionMapper::to_record(id.clone(), event_id.clone(), command, &context)?;
        self.sessions.insert(record)?;
        info!(
            target: "conference::repository",
            %event_id,
            session_id = %id,
            actor = context.actor,
            "session created"
        );
        Ok(id)
    }

    pub fn update(
        &self,
        event_id: &EventId,
        session_id: &SessionId,
        command: &UpdateSession,
    ) -> Result<Option<Session>, RepositoryError> {
        let context = WriteContext {
            actor: self.auditor.resolve_current_user()?,
            now: Utc::now(),
        };
        let key = SessionKey::new(event_id.clone(), session_id.clone());
        let Some(record) = self.sessions.load(&key)? else {
            return Ok(None);
        };
        let merged = SessionMapper::merge(command, record, &context);
        self.sessions.replace(merged).map(Some)
    }

    /// Record `voter`'s rating, replacing an earlier vote by the same user,
    /// and drop the cached session; the next read reloads it. `None` when
    /// there is no such session.
    ///
    /// The store applies the vote in one step, so concurrent voters on the
    /// same session do not overwrite each other.
    pub fn record_vote(
        &self,
        event_id: &EventId,
        session_id: &SessionId,
        voter: &UserId,
        rating: i64,
    ) -> Result<Option<Session>, RepositoryError> {
        let key = SessionKey::new(event_id.clone(), session_id.clone());
        let vote = VoteRecord {
            voter: voter.clone(),
            rating,
            cast_at: Utc::now(),
        };
        let Some(saved) = self.store.upsert_vote(&key, vote)? else {
            return Ok(None);
        };
        self.sessions.evict(&key)?;
        Ok(Some(SessionMapper::to_domain(&saved)))
    }

    pub fn delete_by_id(
        &self,
        event_id: &EventId,
        session_id: &SessionId,
    ) -> Result<bool, RepositoryError> {
        let deleted = self
            .sessions
            .delete(&SessionKey::new(event_id.clone(), session_id.clone()))?;
        if deleted {
            info!(target: "conference::repository", %event_id, %session_id, "session deleted");
        }
        Ok(deleted)
    }

    /// Delete every session of `event_id` and evict the `event:<eid>:*`
    /// group in one cache call. Returns how many sessions were deleted.
    pub fn delete_all_by_parent_id(&self, event_id: &EventId) -> Result<usize, RepositoryError> {
        let deleted = self.sessions.store().delete_all_by_parent_id(event_id)?;
        self.sessions
            .evict_group(&keys::event_sessions_pattern(event_id))?;
        info!(target: "conference::repository", %event_id, deleted, "sessions of event deleted");
        Ok(deleted)
    }

    pub fn count(&self) -> Result<u64, RepositoryError> {
        self.sessions.count()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    use conference_types::{AuditStamp, InternalUserId, UserRecord};

    use super::*;
    use crate::auditor::{CurrentUserCell, ReadModeCell};
    use crate::cache::InMemoryCache;
    use crate::error::BackendError;
    use crate::store::{InMemoryStore, Record, RecordStore};

    /// Session store that counts keyed reads.
    #[derive(Default)]
    struct CountingStore {
        inner: InMemoryStore<SessionRecord>,
        reads: AtomicUsize,
    }

    impl CountingStore {
        fn reads(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }
    }

    impl RecordStore<SessionRecord> for CountingStore {
        fn find_by_id(&self, key: &SessionKey) -> Result<Option<SessionRecord>, BackendError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.find_by_id(key)
        }
        fn save(&self, record: SessionRecord) -> Result<SessionRecord, BackendError> {
            self.inner.save(record)
        }
        fn delete_by_id(&self, key: &SessionKey) -> Result<bool, BackendError> {
            self.inner.delete_by_id(key)
        }
        fn find_all_by_parent_id(
            &self,
            parent: &EventId,
        ) -> Result<Vec<SessionRecord>, BackendError> {
            self.inner.find_all_by_parent_id(parent)
        }
        fn delete_all_by_parent_id(&self, parent: &EventId) -> Result<usize, BackendError> {
            self.inner.delete_all_by_parent_id(parent)
        }
        fn count(&self) -> Result<u64, BackendError> {
            self.inner.count()
        }
    }

    impl SessionStore for CountingStore {
        fn upsert_vote(
            &self,
            key: &SessionKey,
            vote: VoteRecord,
        ) -> Result<Option<SessionRecord>, BackendError> {
            self.inner.upsert_vote(key, vote)
        }
    }

    struct Fixture {
        store: Arc<CountingStore>,
        cache: Arc<InMemoryCache<Session>>,
        repo: SessionRepository,
    }

    fn fixture() -> Fixture {
        let users = Arc::new(InMemoryStore::<UserRecord>::new());
        let auditor = Arc::new(AuditorResolver::new(
            Arc::new(CurrentUserCell::default()),
            users,
            Arc::new(InMemoryCache::<InternalUserId>::new()),
            Arc::new(ReadModeCell::default()),
        ));
        let store = Arc::new(CountingStore::default());
        let cache = Arc::new(InMemoryCache::<Session>::new());
        let repo = SessionRepository::new(
            store.clone(),
            cache.clone(),
            auditor,
            &ServiceConfig::default(),
        );
        Fixture { store, cache, repo }
    }

    fn record(event_id: &EventId) -> SessionRecord {
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

    #[test_log::test]
    fn child_read_after_group_eviction_goes_back_to_the_store() {
        let f = fixture();
        let event_id = EventId::new_v4();
        let child = f.store.inner.save(record(&event_id)).unwrap();

        f.repo.get_by_id(&event_id, &child.id).unwrap();
        f.repo.get_by_id(&event_id, &child.id).unwrap();
        assert_eq!(f.store.reads(), 1);

        assert_eq!(f.repo.delete_all_by_parent_id(&event_id).unwrap(), 1);
        assert!(f.cache.is_empty());

        f.store.inner.save(child.clone()).unwrap();
        let reread = f.repo.get_by_id(&event_id, &child.id).unwrap();
        assert_eq!(f.store.reads(), 2);
        assert_eq!(reread.map(|s| s.id), Some(child.id));
    }

    #[test_log::test]
    fn concurrent_voters_all_land_and_next_read_sees_them() {
        let f = fixture();
        let event_id = EventId::new_v4();
        let session = f.store.inner.save(record(&event_id)).unwrap();
        f.repo.get_by_id(&event_id, &session.id).unwrap();

        thread::scope(|scope| {
            for rating in 1..=5 {
                let repo = &f.repo;
                let (event_id, session_id) = (&event_id, &session.id);
                scope.spawn(move || {
                    repo.record_vote(event_id, session_id, &UserId::new_v4(), rating)
                        .unwrap()
                        .unwrap();
                });
            }
        });

        let stored = f.store.inner.find_by_id(&session.key()).unwrap().unwrap();
        assert_eq!(stored.votes.len(), 5);
        let served = f.repo.get_by_id(&event_id, &session.id).unwrap().unwrap();
        assert_eq!(served.votes.len(), 5);
    }

    #[test]
    fn vote_on_missing_session_is_none() {
        let f = fixture();
        let voter = UserId::new_v4();
        let outcome = f
            .repo
            .record_vote(&EventId::new_v4(), &SessionId::new_v4(), &voter, 3)
            .unwrap();
        assert!(outcome.is_none());
        assert!(f.cache.is_empty());
    }
}
