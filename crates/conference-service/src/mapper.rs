//! Conversions between commands, stored records and domain entities.
//!
//! Mappers are stateless. Commands reaching them have already passed
//! validation, so a missing required field is reported as
//! [`RepositoryError::IncompleteCommand`] rather than defaulted.

use chrono::{DateTime, Utc};
use conference_types::{
    AuditStamp, CreateEvent, CreateSession, CreateUser, Event, EventId, EventRecord,
    InternalUserId, Session, SessionDetails, SessionId, SessionRecord, UpdateEvent, UpdateSession,
    UpdateUser, User, UserId, UserRecord, Vote, VoterSummary,
};

use crate::error::RepositoryError;
use crate::store::Record;

/// Record to entity, as used by the cache-aside read path.
pub trait Mapper: 'static {
    type Record: Record;
    type Entity: Clone + Send + Sync + 'static;

    fn to_domain(record: &Self::Record) -> Self::Entity;
}

/// Who writes, and when.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WriteContext {
    pub actor: InternalUserId,
    pub now: DateTime<Utc>,
}

fn required<T: Clone>(value: &Option<T>, field: &'static str) -> Result<T, RepositoryError> {
    value
        .clone()
        .ok_or(RepositoryError::IncompleteCommand { field })
}

fn assign<T: Clone>(target: &mut T, value: &Option<T>) {
    if let Some(value) = value {
        *target = value.clone();
    }
}

fn assign_optional<T: Clone>(target: &mut Option<T>, value: &Option<T>) {
    if value.is_some() {
        target.clone_from(value);
    }
}

pub struct EventMapper;

impl Mapper for EventMapper {
    type Record = EventRecord;
    type Entity = Event;

    fn to_domain(record: &EventRecord) -> Event {
        Event {
            id: record.id.clone(),
            name: record.name.clone(),
            description: record.description.clone(),
            location: record.location.clone(),
            website: record.website.clone(),
            tags: record.tags.clone(),
            capacity: record.capacity,
            ticket_price: record.ticket_price,
            starts_at: record.starts_at,
            ends_at: record.ends_at,
            audit: record.audit.clone(),
        }
    }
}

impl EventMapper {
    pub fn to_record(
        id: EventId,
        command: &CreateEvent,
        context: &WriteContext,
    ) -> Result<EventRecord, RepositoryError> {
        Ok(EventRecord {
            id,
            name: required(&command.name, "name")?,
            description: required(&command.description, "description")?,
            location: command.location.clone(),
            website: command.website.clone(),
            tags: command.tags.clone().unwrap_or_default(),
            capacity: command.capacity,
            ticket_price: command.ticket_price,
            starts_at: required(&command.starts_at, "starts_at")?,
            ends_at: command.ends_at,
            audit: AuditStamp::created(context.actor, context.now),
        })
    }

    /// Apply the populated fields of `command` and stamp the modification.
    pub fn merge(
        command: &UpdateEvent,
        mut record: EventRecord,
        context: &WriteContext,
    ) -> EventRecord {
        assign(&mut record.name, &command.name);
        assign(&mut record.description, &command.description);
        assign_optional(&mut record.location, &command.location);
        assign_optional(&mut record.website, &command.website);
        assign(&mut record.tags, &command.tags);
        assign_optional(&mut record.capacity, &command.capacity);
        assign_optional(&mut record.ticket_price, &command.ticket_price);
        assign(&mut record.starts_at, &command.starts_at);
        assign_optional(&mut record.ends_at, &command.ends_at);
        record.audit = record.audit.touched(context.actor, context.now);
        record
    }
}

pub struct SessionMapper;

impl Mapper for SessionMapper {
    type Record = SessionRecord;
    type Entity = Session;

    fn to_domain(record: &SessionRecord) -> Session {
        Session {
            id: record.id.clone(),
            event_id: record.event_id.clone(),
            title: record.title.clone(),
            summary: record.summary.clone(),
            tags: record.tags.clone(),
            duration_minutes: record.duration_minutes,
            votes: record
                .votes
                .iter()
                .map(|vote| Vote {
                    voter: vote.voter.clone(),
                    rating: vote.rating,
                })
                .collect(),
            audit: record.audit.clone(),
        }
    }
}

impl SessionMapper {
    pub fn to_record(
        id: SessionId,
        event_id: EventId,
        command: &CreateSession,
        context: &WriteContext,
    ) -> Result<SessionRecord, RepositoryError> {
        Ok(SessionRecord {
            id,
            event_id,
            title: required(&command.title, "title")?,
            summary: required(&command.summary, "summary")?,
            tags: command.tags.clone().unwrap_or_default(),
            duration_minutes: required(&command.duration_minutes, "duration_minutes")?,
            votes: Vec::new(),
            audit: AuditStamp::created(context.actor, context.now),
        })
    }

    pub fn merge(
        command: &UpdateSession,
        mut record: SessionRecord,
        context: &WriteContext,
    ) -> SessionRecord {
        assign(&mut record.title, &command.title);
        assign(&mut record.summary, &command.summary);
        assign(&mut record.tags, &command.tags);
        assign(&mut record.duration_minutes, &command.duration_minutes);
        record.audit = record.audit.touched(context.actor, context.now);
        record
    }

    /// Second mapping step: attach voter names to an already mapped session.
    ///
    /// `display_name` returns `None` for voters whose user record is gone;
    /// their vote still counts.
    pub fn with_voters<E>(
        session: Session,
        mut display_name: impl FnMut(&UserId) -> Result<Option<String>, E>,
    ) -> Result<SessionDetails, E> {
        let voters = session
            .votes
            .iter()
            .map(|vote| {
                Ok(VoterSummary {
                    user_id: vote.voter.clone(),
                    display_name: display_name(&vote.voter)?,
                    rating: vote.rating,
                })
            })
            .collect::<Result<Vec<_>, E>>()?;
        let average_rating = session.average_rating();
        Ok(SessionDetails {
            session,
            voters,
            average_rating,
        })
    }
}

pub struct UserMapper;

impl Mapper for UserMapper {
    type Record = UserRecord;
    type Entity = User;

    fn to_domain(record: &UserRecord) -> User {
        User {
            id: record.id.clone(),
            internal_id: record.internal_id,
            email: record.email.clone(),
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

impl UserMapper {
    /// Emails are stored trimmed and lowercased.
    pub fn to_record(
        id: UserId,
        internal_id: InternalUserId,
        command: &CreateUser,
        password_hash: String,
        now: DateTime<Utc>,
    ) -> Result<UserRecord, RepositoryError> {
        Ok(UserRecord {
            id,
            internal_id,
            email: normalize_email(&required(&command.email, "email")?),
            first_name: required(&command.first_name, "first_name")?,
            last_name: required(&command.last_name, "last_name")?,
            password_hash,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn merge(
        command: &UpdateUser,
        mut record: UserRecord,
        password_hash: Option<String>,
        now: DateTime<Utc>,
    ) -> UserRecord {
        assign(&mut record.first_name, &command.first_name);
        assign(&mut record.last_name, &command.last_name);
        if let Some(hash) = password_hash {
            record.password_hash = hash;
        }
        record.updated_at = now;
        record
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use conference_types::VoteRecord;

    use super::*;

    fn context(actor: InternalUserId) -> WriteContext {
        WriteContext {
            actor,
            now: Utc::now(),
        }
    }

    #[test]
    fn merge_keeps_absent_fields_and_stamps_modifier() {
        let created = context(1);
        let record = EventMapper::to_record(
            EventId::new_v4(),
            &CreateEvent {
                name: Some("RustConf".into()),
                description: Some("Three days of talks about the Rust language".into()),
                location: Some("Montreal".into()),
                starts_at: Some(created.now),
                ..Default::default()
            },
            &created,
        )
        .unwrap();

        let later = WriteContext {
            actor: 2,
            now: created.now + Duration::hours(1),
        };
        let merged = EventMapper::merge(
            &UpdateEvent {
                name: Some("RustConf 2026".into()),
                ..Default::default()
            },
            record.clone(),
            &later,
        );

        assert_eq!(merged.name, "RustConf 2026");
        assert_eq!(merged.location.as_deref(), Some("Montreal"));
        assert_eq!(merged.audit, record.audit.touched(2, later.now));
    }

    #[test]
    fn incomplete_command_is_reported_not_defaulted() {
        let err = SessionMapper::to_record(
            SessionId::new_v4(),
            EventId::new_v4(),
            &CreateSession::default(),
            &context(1),
        )
        .unwrap_err();
        assert!(matches!(err, RepositoryError::IncompleteCommand { field: "title" }));
    }

    #[test]
    fn voter_enrichment_is_a_separate_step() {
        let known = UserId::new_v4();
        let gone = UserId::new_v4();
        let record = SessionRecord {
            id: SessionId::new_v4(),
            event_id: EventId::new_v4(),
            title: "Ownership in practice".into(),
            summary: "A tour of borrowing rules in real code".into(),
            tags: vec![],
            duration_minutes: 45,
            votes: vec![
                VoteRecord {
                    voter: known.clone(),
                    rating: 5,
                    cast_at: Utc::now(),
                },
                VoteRecord {
                    voter: gone.clone(),
                    rating: 2,
                    cast_at: Utc::now(),
                },
            ],
            audit: AuditStamp::created(1, Utc::now()),
        };

        let session = SessionMapper::to_domain(&record);
        let details = SessionMapper::with_voters(session, |id| {
            Ok::<_, ()>((id == &known).then(|| "Ada Lovelace".to_string()))
        })
        .unwrap();

        assert_eq!(details.average_rating, Some(3.5));
        assert_eq!(details.voters[0].display_name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(details.voters[1].display_name, None);
        assert_eq!(details.voters[1].user_id, gone);
    }

    #[test]
    fn emails_are_normalized() {
        assert_eq!(normalize_email("  Ada@Example.ORG "), "ada@example.org");
    }
}
