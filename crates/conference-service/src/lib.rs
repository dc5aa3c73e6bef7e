//! Cache-aside repositories and use cases for events, sessions and users.
//!
//! Use cases validate their arguments with the constraint engine, then act
//! through repositories that keep a [`Cache`] in front of a [`RecordStore`].
//! Writes are stamped with the acting user's internal id, which the
//! [`AuditorResolver`] looks up once per user and caches.
//!
//! The stores, caches and current-user holder are traits; the in-memory
//! implementations here back [`ConferenceService::in_memory`] and the tests.

mod auditor;
mod cache;
mod config;
mod error;
pub mod keys;
mod mapper;
mod password;
mod repository;
mod service;
mod store;
mod usecase;

pub use auditor::{
    AuditorResolver, CurrentUser, CurrentUserCell, ForcedMode, ReadMode, ReadModeCell,
    ReadModeControl, ReadModeGuard, UnknownReadMode, UserLookup,
};
pub use cache::{Cache, InMemoryCache};
pub use config::{AUDITOR_READ_MODE_VAR, READ_THROUGH_VAR, ServiceConfig};
pub use error::{
    AuditorError, BackendError, ConfigError, ErrorCode, RepositoryError, ServiceError,
    UseCaseError,
};
pub use mapper::{EventMapper, Mapper, SessionMapper, UserMapper, WriteContext, normalize_email};
pub use password::{PasswordVerifier, Sha256PasswordVerifier};
pub use repository::{CacheAside, Credentials, EventRepository, SessionRepository, UserRepository};
pub use service::ConferenceService;
pub use store::{InMemoryStore, Record, RecordStore, SessionKey, SessionStore, UserStore};
pub use usecase::{EventUseCases, SessionUseCases, UserUseCases};
