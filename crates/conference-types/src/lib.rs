pub mod command;
pub mod error;
pub mod event;
pub mod id;
pub mod record;
pub mod session;
pub mod user;

pub use command::{
    CastVote, CreateEvent, CreateSession, CreateUser, Id, Login, UpdateEvent, UpdateSession,
    UpdateUser,
};
pub use error::DomainError;
pub use event::Event;
pub use id::{EventId, InternalUserId, SessionId, UserId};
pub use record::{AuditStamp, EventRecord, SessionRecord, UserRecord, VoteRecord};
pub use session::{Session, SessionDetails, Vote, VoterSummary};
pub use user::{ExternalIdentity, User};
