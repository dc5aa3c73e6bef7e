use std::sync::Arc;

use conference_constraints::{ConstraintEngine, standard_engine};
use conference_types::{
    Event, EventRecord, ExternalIdentity, InternalUserId, Login, Session, SessionRecord, User,
    UserRecord,
};
use tracing::info;

use crate::auditor::{AuditorResolver, CurrentUserCell, ReadModeCell};
use crate::cache::InMemoryCache;
use crate::config::ServiceConfig;
use crate::error::{ServiceError, UseCaseError};
use crate::password::Sha256PasswordVerifier;
use crate::repository::{EventRepository, SessionRepository, UserRepository};
use crate::store::InMemoryStore;
use crate::usecase::{EventUseCases, SessionUseCases, UserUseCases};

/// The use cases wired to the in-memory collaborators.
///
/// Hosts with real stores and caches build the repositories and use cases
/// themselves; this type is the reference wiring.
pub struct ConferenceService {
    config: ServiceConfig,
    engine: Arc<ConstraintEngine>,
    current_user: Arc<CurrentUserCell>,
    read_mode: Arc<ReadModeCell>,
    event_cache: Arc<InMemoryCache<Event>>,
    session_cache: Arc<InMemoryCache<Session>>,
    user_cache: Arc<InMemoryCache<User>>,
    auditor_cache: Arc<InMemoryCache<InternalUserId>>,
    events: EventUseCases,
    sessions: SessionUseCases,
    users: UserUseCases,
}

impl ConferenceService {
    pub fn in_memory(config: ServiceConfig) -> Result<Self, ServiceError> {
        let engine = Arc::new(standard_engine()?);
        let current_user = Arc::new(CurrentUserCell::default());
        let read_mode = Arc::new(ReadModeCell::default());

        let event_store = Arc::new(InMemoryStore::<EventRecord>::new());
        let session_store = Arc::new(InMemoryStore::<SessionRecord>::new());
        let user_store = Arc::new(InMemoryStore::<UserRecord>::new());

        let event_cache = Arc::new(InMemoryCache::<Event>::new());
        let session_cache = Arc::new(InMemoryCache::<Session>::new());
        let user_cache = Arc::new(InMemoryCache::<User>::new());
        let auditor_cache = Arc::new(InMemoryCache::<InternalUserId>::new());

        let auditor = Arc::new(
            AuditorResolver::new(
                current_user.clone(),
                user_store.clone(),
                auditor_cache.clone(),
                read_mode.clone(),
            )
            .lookup_mode(config.get_auditor_read_mode()),
        );

        let event_repository = Arc::new(EventRepository::new(
            event_store,
            event_cache.clone(),
            auditor.clone(),
            &config,
        ));
        let session_repository = Arc::new(SessionRepository::new(
            session_store,
            session_cache.clone(),
            auditor,
            &config,
        ));
        let user_repository =
            Arc::new(UserRepository::new(user_store, user_cache.clone(), &config));

        let events = EventUseCases::new(
            engine.clone(),
            event_repository.clone(),
            session_repository.clone(),
        );
        let sessions = SessionUseCases::new(
            engine.clone(),
            event_repository,
            session_repository,
            user_repository.clone(),
            current_user.clone(),
        );
        let users = UserUseCases::new(
            engine.clone(),
            user_repository,
            Arc::new(Sha256PasswordVerifier),
        );

        info!(
            target: "conference::usecase",
            read_through = config.is_read_through(),
            auditor_read_mode = %config.get_auditor_read_mode(),
            types = engine.registered_types().len(),
            "conference service ready"
        );

        Ok(Self {
            config,
            engine,
            current_user,
            read_mode,
            event_cache,
            session_cache,
            user_cache,
            auditor_cache,
            events,
            sessions,
            users,
        })
    }

    /// Wire with configuration read from the environment.
    pub fn from_env() -> Result<Self, ServiceError> {
        Self::in_memory(ServiceConfig::from_env()?)
    }

    /// Check the credentials and make that user the current user.
    pub fn log_in(&self, command: &Login) -> Result<User, UseCaseError> {
        let user = self.users.login(command)?;
        self.current_user.log_in(ExternalIdentity::new(user.id.as_str()));
        Ok(user)
    }

    pub fn log_out(&self) {
        self.current_user.log_out();
    }

    pub fn events(&self) -> &EventUseCases {
        &self.events
    }

    pub fn sessions(&self) -> &SessionUseCases {
        &self.sessions
    }

    pub fn users(&self) -> &UserUseCases {
        &self.users
    }

    pub fn engine(&self) -> &ConstraintEngine {
        &self.engine
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn current_user(&self) -> &CurrentUserCell {
        &self.current_user
    }

    pub fn read_mode(&self) -> &ReadModeCell {
        &self.read_mode
    }

    pub fn event_cache(&self) -> &InMemoryCache<Event> {
        &self.event_cache
    }

    pub fn session_cache(&self) -> &InMemoryCache<Session> {
        &self.session_cache
    }

    pub fn user_cache(&self) -> &InMemoryCache<User> {
        &self.user_cache
    }

    pub fn auditor_cache(&self) -> &InMemoryCache<InternalUserId> {
        &self.auditor_cache
    }
}
