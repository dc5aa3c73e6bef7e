use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use conference_types::{CreateUser, InternalUserId, UpdateUser, User, UserId};
use tracing::info;

use super::CacheAside;
use crate::cache::Cache;
use crate::config::ServiceConfig;
use crate::error::RepositoryError;
use crate::mapper::{UserMapper, normalize_email};
use crate::store::UserStore;

/// What login needs to check a password. Never cached.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user_id: UserId,
    pub internal_id: InternalUserId,
    pub password_hash: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user_id", &self.user_id)
            .field("internal_id", &self.internal_id)
            .finish_non_exhaustive()
    }
}

/// Users, cached under `user:<uid>`. Password hashes stay in the store:
/// the cached [`User`] has no hash field.
pub struct UserRepository {
    users: CacheAside<UserMapper>,
    store: Arc<dyn UserStore>,
}

impl UserRepository {
    pub fn new<S: UserStore + 'static>(
        store: Arc<S>,
        cache: Arc<dyn Cache<User>>,
        config: &ServiceConfig,
    ) -> Self {
        Self {
            users: CacheAside::new("user", store.clone(), cache, config.is_read_through()),
            store,
        }
    }

    pub fn get_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        self.users.get(id)
    }

    pub fn exists(&self, id: &UserId) -> Result<bool, RepositoryError> {
        self.users.exists(id)
    }

    /// Store lookup by email, bypassing the cache.
    pub fn find_credentials(&self, email: &str) -> Result<Option<Credentials>, RepositoryError> {
        Ok(self
            .store
            .find_by_email(&normalize_email(email))?
            .map(|record| Credentials {
                user_id: record.id,
                internal_id: record.internal_id,
                password_hash: record.password_hash,
            }))
    }

    /// Assign external and internal ids and save. `password_hash` is
    /// stored as given. `None` when the email is already registered; the
    /// store checks and inserts in one step.
    pub fn create(
        &self,
        command: &CreateUser,
        password_hash: String,
    ) -> Result<Option<UserId>, RepositoryError> {
        let id = UserId::new_v4();
        let internal_id = self.store.next_internal_id()?;
        let record =
            UserMapper::to_record(id.clone(), internal_id, command, password_hash, Utc::now())?;
        if !self.store.insert_unique_email(record)? {
            return Ok(None);
        }
        info!(target: "conference::repository", user_id = %id, internal_id, "user created");
        Ok(Some(id))
    }

    pub fn update(
        &self,
        id: &UserId,
        command: &UpdateUser,
        password_hash: Option<String>,
    ) -> Result<Option<User>, RepositoryError> {
        let Some(record) = self.users.load(id)? else {
            return Ok(None);
        };
        let merged = UserMapper::merge(command, record, password_hash, Utc::now());
        self.users.replace(merged).map(Some)
    }

    pub fn delete_by_id(&self, id: &UserId) -> Result<bool, RepositoryError> {
        let deleted = self.users.delete(id)?;
        if deleted {
            info!(target: "conference::repository", user_id = %id, "user deleted");
        }
        Ok(deleted)
    }

    pub fn count(&self) -> Result<u64, RepositoryError> {
        self.users.count()
    }
}
