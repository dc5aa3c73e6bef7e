//! Cache-aside repositories.
//!
//! Reads go to the cache first and fall back to the store on a miss,
//! populating the cache only when the store has the record. Writes go to
//! the store and then fix up the cache: updates overwrite the entry,
//! deletes remove it, parent deletes remove the whole key group.
//!
//! There is no locking between the store read and the cache populate. A
//! write landing between the two can leave a stale entry until the next
//! write to the same key.

mod event;
mod session;
mod user;

pub use event::EventRepository;
pub use session::SessionRepository;
pub use user::{Credentials, UserRepository};

use std::sync::Arc;

use tracing::debug;

use crate::cache::Cache;
use crate::error::RepositoryError;
use crate::keys;
use crate::mapper::Mapper;
use crate::store::{Record, RecordStore};

type Key<M> = <<M as Mapper>::Record as Record>::Key;

/// Store plus cache for one entity type.
pub struct CacheAside<M: Mapper> {
    entity: &'static str,
    store: Arc<dyn RecordStore<M::Record>>,
    cache: Arc<dyn Cache<M::Entity>>,
    read_through: bool,
}

impl<M: Mapper> CacheAside<M> {
    pub fn new(
        entity: &'static str,
        store: Arc<dyn RecordStore<M::Record>>,
        cache: Arc<dyn Cache<M::Entity>>,
        read_through: bool,
    ) -> Self {
        Self {
            entity,
            store,
            cache,
            read_through,
        }
    }

    pub fn get(&self, key: &Key<M>) -> Result<Option<M::Entity>, RepositoryError> {
        let cache_key = <M::Record as Record>::cache_key(key);
        if self.read_through {
            if let Some(hit) = self.cache.get(&cache_key)? {
                debug!(target: "conference::cache", entity = self.entity, key = %cache_key, "hit");
                return Ok(Some(hit));
            }
            debug!(target: "conference::cache", entity = self.entity, key = %cache_key, "miss");
        }
        let Some(record) = self.store.find_by_id(key)? else {
            return Ok(None);
        };
        Ok(Some(self.populate(&cache_key, &record)?))
    }

    pub fn exists(&self, key: &Key<M>) -> Result<bool, RepositoryError> {
        if self.read_through && self.cache.contains_key(&<M::Record as Record>::cache_key(key))? {
            return Ok(true);
        }
        Ok(self.store.find_by_id(key)?.is_some())
    }

    /// Serve an already loaded record through the cache.
    pub fn serve(&self, record: &M::Record) -> Result<M::Entity, RepositoryError> {
        let cache_key = <M::Record as Record>::cache_key(&record.key());
        if self.read_through {
            if let Some(hit) = self.cache.get(&cache_key)? {
                return Ok(hit);
            }
        }
        self.populate(&cache_key, record)
    }

    /// Current stored record, bypassing the cache.
    pub fn load(&self, key: &Key<M>) -> Result<Option<M::Record>, RepositoryError> {
        Ok(self.store.find_by_id(key)?)
    }

    /// Save a new record. The cache fills on first read.
    pub fn insert(&self, record: M::Record) -> Result<M::Record, RepositoryError> {
        Ok(self.store.save(record)?)
    }

    /// Save a changed record and overwrite its cache entry.
    pub fn replace(&self, record: M::Record) -> Result<M::Entity, RepositoryError> {
        let saved = self.store.save(record)?;
        let cache_key = <M::Record as Record>::cache_key(&saved.key());
        let entity = M::to_domain(&saved);
        self.cache.put(&cache_key, entity.clone())?;
        debug!(target: "conference::cache", entity = self.entity, key = %cache_key, "overwritten");
        Ok(entity)
    }

    pub fn delete(&self, key: &Key<M>) -> Result<bool, RepositoryError> {
        let deleted = self.store.delete_by_id(key)?;
        self.evict(key)?;
        Ok(deleted)
    }

    pub fn evict(&self, key: &Key<M>) -> Result<(), RepositoryError> {
        let cache_key = <M::Record as Record>::cache_key(key);
        self.cache.remove(&cache_key)?;
        debug!(target: "conference::cache", entity = self.entity, key = %cache_key, "evicted");
        Ok(())
    }

    /// Remove every entry matching a trailing-wildcard pattern in one call.
    pub fn evict_group(&self, pattern: &str) -> Result<usize, RepositoryError> {
        let removed = self.cache.remove_by_prefix(keys::wildcard_prefix(pattern))?;
        debug!(target: "conference::cache", entity = self.entity, %pattern, removed, "group evicted");
        Ok(removed)
    }

    pub fn count(&self) -> Result<u64, RepositoryError> {
        Ok(self.store.count()?)
    }

    pub fn store(&self) -> &dyn RecordStore<M::Record> {
        self.store.as_ref()
    }

    fn populate(&self, cache_key: &str, record: &M::Record) -> Result<M::Entity, RepositoryError> {
        let entity = M::to_domain(record);
        if self.read_through {
            self.cache.put(cache_key, entity.clone())?;
            debug!(target: "conference::cache", entity = self.entity, key = %cache_key, "populated");
        }
        Ok(entity)
    }
}
