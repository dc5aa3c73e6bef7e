use std::sync::Arc;

use conference_constraints::use_cases::{CREATE_EVENT, DELETE_EVENT, GET_EVENT, UPDATE_EVENT};
use conference_constraints::{Argument, ConstraintEngine};
use conference_types::{CreateEvent, Event, EventId, UpdateEvent};
use tracing::info;

use super::validate;
use crate::error::UseCaseError;
use crate::repository::{EventRepository, SessionRepository};

pub struct EventUseCases {
    engine: Arc<ConstraintEngine>,
    events: Arc<EventRepository>,
    sessions: Arc<SessionRepository>,
}

impl EventUseCases {
    pub fn new(
        engine: Arc<ConstraintEngine>,
        events: Arc<EventRepository>,
        sessions: Arc<SessionRepository>,
    ) -> Self {
        Self {
            engine,
            events,
            sessions,
        }
    }

    pub fn create(&self, command: &CreateEvent) -> Result<EventId, UseCaseError> {
        validate(&self.engine, CREATE_EVENT, &[Argument::object(command)])?;
        Ok(self.events.create(command)?)
    }

    pub fn get(&self, id: &str) -> Result<Event, UseCaseError> {
        validate(&self.engine, GET_EVENT, &[Argument::text(id)])?;
        let id = EventId::parse(id)?;
        self.events
            .get_by_id(&id)?
            .ok_or_else(|| not_found(&id))
    }

    pub fn update(&self, command: &UpdateEvent) -> Result<Event, UseCaseError> {
        validate(&self.engine, UPDATE_EVENT, &[Argument::object(command)])?;
        let id = EventId::parse(command.id.as_deref().unwrap_or_default())?;
        self.events
            .update(&id, command)?
            .ok_or_else(|| not_found(&id))
    }

    /// Delete the event and, with it, all of its sessions.
    pub fn delete(&self, id: &str) -> Result<(), UseCaseError> {
        validate(&self.engine, DELETE_EVENT, &[Argument::text(id)])?;
        let id = EventId::parse(id)?;
        if !self.events.exists(&id)? {
            return Err(not_found(&id));
        }
        let sessions = self.sessions.delete_all_by_parent_id(&id)?;
        self.events.delete_by_id(&id)?;
        info!(target: "conference::usecase", event_id = %id, sessions, "event deleted with sessions");
        Ok(())
    }
}

fn not_found(id: &EventId) -> UseCaseError {
    UseCaseError::EventNotFound { id: id.to_string() }
}
