use std::sync::Arc;

use chrono::Utc;
use conference_types::{CreateEvent, Event, EventId, EventRecord, UpdateEvent};
use tracing::info;

use super::CacheAside;
use crate::auditor::AuditorResolver;
use crate::cache::Cache;
use crate::config::ServiceConfig;
use crate::error::RepositoryError;
use crate::mapper::{EventMapper, WriteContext};
use crate::store::RecordStore;

pub struct EventRepository {
    events: CacheAside<EventMapper>,
    auditor: Arc<AuditorResolver>,
}

impl EventRepository {
    pub fn new(
        store: Arc<dyn RecordStore<EventRecord>>,
        cache: Arc<dyn Cache<Event>>,
        auditor: Arc<AuditorResolver>,
        config: &ServiceConfig,
    ) -> Self {
        Self {
            events: CacheAside::new("event", store, cache, config.is_read_through()),
            auditor,
        }
    }

    pub fn get_by_id(&self, id: &EventId) -> Result<Option<Event>, RepositoryError> {
        self.events.get(id)
    }

    pub fn exists(&self, id: &EventId) -> Result<bool, RepositoryError> {
        self.events.exists(id)
    }

    /// Assign a fresh id, stamp the creator and save.
    pub fn create(&self, command: &CreateEvent) -> Result<EventId, RepositoryError> {
        let context = WriteContext {
            actor: self.auditor.resolve_current_user()?,
            now: Utc::now(),
        };
        let id = EventId::new_v4();
        let record = EventMapper::to_record(id.clone(), command, &context)?;
        self.events.insert(record)?;
        info!(target: "conference::repository", event_id = %id, actor = context.actor, "event created");
        Ok(id)
    }

    /// Merge `command` into the stored event. `None` when there is no such
    /// event.
    pub fn update(
        &self,
        id: &EventId,
        command: &UpdateEvent,
    ) -> Result<Option<Event>, RepositoryError> {
        let context = WriteContext {
            actor: self.auditor.resolve_current_user()?,
            now: Utc::now(),
        };
        let Some(record) = self.events.load(id)? else {
            return Ok(None);
        };
        let merged = EventMapper::merge(command, record, &context);
        self.events.replace(merged).map(Some)
    }

    /// Returns whether an event was removed. Its sessions are not touched;
    /// see [`crate::SessionRepository::delete_all_by_parent_id`].
    pub fn delete_by_id(&self, id: &EventId) -> Result<bool, RepositoryError> {
        let deleted = self.events.delete(id)?;
        if deleted {
            info!(target: "conference::repository", event_id = %id, "event deleted");
        }
        Ok(deleted)
    }

    pub fn count(&self) -> Result<u64, RepositoryError> {
        self.events.count()
    }
}
