use std::sync::Arc;

use conference_constraints::use_cases::{
    CAST_VOTE, CREATE_SESSION, DELETE_SESSION, GET_SESSION, GET_SESSION_DETAILS, LIST_SESSIONS,
    UPDATE_SESSION,
};
use conference_constraints::{Argument, ConstraintEngine};
use conference_types::{
    CastVote, CreateSession, EventId, Session, SessionDetails, SessionId, UpdateSession, UserId,
};
use tracing::{info, warn};

use super::validate;
use crate::auditor::CurrentUser;
use crate::error::{RepositoryError, UseCaseError};
use crate::mapper::SessionMapper;
use crate::repository::{EventRepository, SessionRepository, UserRepository};

pub struct SessionUseCases {
    engine: Arc<ConstraintEngine>,
    events: Arc<EventRepository>,
    sessions: Arc<SessionRepository>,
    users: Arc<UserRepository>,
    current_user: Arc<dyn CurrentUser>,
}

impl SessionUseCases {
    pub fn new(
        engine: Arc<ConstraintEngine>,
        events: Arc<EventRepository>,
        sessions: Arc<SessionRepository>,
        users: Arc<UserRepository>,
        current_user: Arc<dyn CurrentUser>,
    ) -> Self {
        Self {
            engine,
            events,
            sessions,
            users,
            current_user,
        }
    }

    pub fn create(&self, command: &CreateSession) -> Result<SessionId, UseCaseError> {
        validate(&self.engine, CREATE_SESSION, &[Argument::object(command)])?;
        let event_id = EventId::parse(command.event_id.as_deref().unwrap_or_default())?;
        self.require_event(&event_id)?;
        Ok(self.sessions.create(command)?)
    }

    pub fn get(&self, event_id: &str, session_id: &str) -> Result<Session, UseCaseError> {
        validate(
            &self.engine,
            GET_SESSION,
            &[Argument::text(event_id), Argument::text(session_id)],
        )?;
        let (event_id, session_id) = parse_ids(event_id, session_id)?;
        self.sessions
            .get_by_id(&event_id, &session_id)?
            .ok_or_else(|| not_found(&event_id, &session_id))
    }

    /// Session plus voter names and average rating.
    pub fn get_details(
        &self,
        event_id: &str,
        session_id: &str,
    ) -> Result<SessionDetails, UseCaseError> {
        validate(
            &self.engine,
            GET_SESSION_DETAILS,
            &[Argument::text(event_id), Argument::text(session_id)],
        )?;
        let (event_id, session_id) = parse_ids(event_id, session_id)?;
        let session = self
            .sessions
            .get_by_id(&event_id, &session_id)?
            .ok_or_else(|| not_found(&event_id, &session_id))?;
        let details = SessionMapper::with_voters(session, |voter| {
            Ok::<_, RepositoryError>(self.users.get_by_id(voter)?.map(|user| user.display_name()))
        })?;
        Ok(details)
    }

    pub fn list(&self, event_id: &str) -> Result<Vec<Session>, UseCaseError> {
        validate(&self.engine, LIST_SESSIONS, &[Argument::text(event_id)])?;
        let event_id = EventId::parse(event_id)?;
        self.require_event(&event_id)?;
        Ok(self.sessions.list_by_event(&event_id)?)
    }

    pub fn update(&self, command: &UpdateSession) -> Result<Session, UseCaseError> {
        validate(&self.engine, UPDATE_SESSION, &[Argument::object(command)])?;
        let (event_id, session_id) = parse_ids(
            command.event_id.as_deref().unwrap_or_default(),
            command.session_id.as_deref().unwrap_or_default(),
        )?;
        self.sessions
            .update(&event_id, &session_id, command)?
            .ok_or_else(|| not_found(&event_id, &session_id))
    }

    pub fn delete(&self, event_id: &str, session_id: &str) -> Result<(), UseCaseError> {
        validate(
            &self.engine,
            DELETE_SESSION,
            &[Argument::text(event_id), Argument::text(session_id)],
        )?;
        let (event_id, session_id) = parse_ids(event_id, session_id)?;
        if !self.sessions.delete_by_id(&event_id, &session_id)? {
            return Err(not_found(&event_id, &session_id));
        }
        Ok(())
    }

    /// Record the logged-in user's rating. A second vote by the same user
    /// replaces the first.
    pub fn cast_vote(&self, command: &CastVote) -> Result<Session, UseCaseError> {
        validate(&self.engine, CAST_VOTE, &[Argument::object(command)])?;
        let Some(identity) = self.current_user.current_user() else {
            return Err(UseCaseError::Unauthenticated);
        };
        let voter = UserId::parse(identity.as_str())
            .map_err(|err| UseCaseError::DataIntegrity(err.to_string()))?;
        if !self.users.exists(&voter)? {
            warn!(target: "conference::usecase", %voter, "voter has no user record");
            return Err(UseCaseError::DataIntegrity(format!(
                "authenticated user {voter} has no user record"
            )));
        }
        let (event_id, session_id) = parse_ids(
            command.event_id.as_deref().unwrap_or_default(),
            command.session_id.as_deref().unwrap_or_default(),
        )?;
        let rating = command
            .rating
            .ok_or(RepositoryError::IncompleteCommand { field: "rating" })?;
        let session = self
            .sessions
            .record_vote(&event_id, &session_id, &voter, rating)?
            .ok_or_else(|| not_found(&event_id, &session_id))?;
        info!(target: "conference::usecase", %event_id, %session_id, %voter, rating, "vote cast");
        Ok(session)
    }

    fn require_event(&self, event_id: &EventId) -> Result<(), UseCaseError> {
        if self.events.exists(event_id)? {
            Ok(())
        } else {
            Err(UseCaseError::EventNotFound {
                id: event_id.to_string(),
            })
        }
    }
}

fn parse_ids(event_id: &str, session_id: &str) -> Result<(EventId, SessionId), UseCaseError> {
    Ok((EventId::parse(event_id)?, SessionId::parse(session_id)?))
}

fn not_found(event_id: &EventId, session_id: &SessionId) -> UseCaseError {
    UseCaseError::SessionNotFound {
        event_id: event_id.to_string(),
        session_id: session_id.to_string(),
    }
}
