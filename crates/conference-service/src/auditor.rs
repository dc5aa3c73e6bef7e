//! Resolution of the acting user to the internal id stamped on records.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use conference_types::{ExternalIdentity, InternalUserId};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cache::Cache;
use crate::error::{AuditorError, BackendError};
use crate::keys;

/// Source of the logged-in user for the current unit of work.
pub trait CurrentUser: Send + Sync {
    fn current_user(&self) -> Option<ExternalIdentity>;
}

/// Store query mapping an external user id to its internal id.
pub trait UserLookup: Send + Sync {
    fn find_internal_id(&self, external_id: &str) -> Result<Option<InternalUserId>, BackendError>;
}

/// Visibility of writes not yet committed by the current unit of work.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadMode {
    Committed,
    #[default]
    SeeUncommitted,
}

impl fmt::Display for ReadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Committed => "committed",
            Self::SeeUncommitted => "see_uncommitted",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown read mode {0:?}")]
pub struct UnknownReadMode(pub String);

impl FromStr for ReadMode {
    type Err = UnknownReadMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "committed" => Ok(Self::Committed),
            "see_uncommitted" | "uncommitted" => Ok(Self::SeeUncommitted),
            _ => Err(UnknownReadMode(s.to_string())),
        }
    }
}

/// Read-mode switch of the store session used by the resolver.
///
/// Forced modes stack on top of the session's own mode. Each [`force`]
/// returns a ticket that [`release`] retires, in any order; once every
/// ticket is released the session's own mode applies again.
///
/// [`force`]: ReadModeControl::force
/// [`release`]: ReadModeControl::release
pub trait ReadModeControl: Send + Sync {
    /// Mode in effect: the newest forced mode, else the session's own.
    fn read_mode(&self) -> ReadMode;
    fn set_read_mode(&self, mode: ReadMode);
    fn force(&self, mode: ReadMode) -> ForcedMode;
    fn release(&self, ticket: ForcedMode);
}

/// Ticket for one forced read mode.
#[derive(Debug, PartialEq, Eq)]
pub struct ForcedMode(u64);

/// Forces a read mode for its lifetime and releases it on drop, including
/// during unwinding.
#[must_use = "the forced read mode is released when the guard is dropped"]
pub struct ReadModeGuard<'a> {
    control: &'a dyn ReadModeControl,
    ticket: Option<ForcedMode>,
}

impl<'a> ReadModeGuard<'a> {
    pub fn enter(control: &'a dyn ReadModeControl, mode: ReadMode) -> Self {
        let ticket = control.force(mode);
        Self {
            control,
            ticket: Some(ticket),
        }
    }
}

impl Drop for ReadModeGuard<'_> {
    fn drop(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            self.control.release(ticket);
        }
    }
}

#[derive(Debug)]
struct ReadModeState {
    own: ReadMode,
    forced: Vec<(u64, ReadMode)>,
    next_ticket: u64,
}

/// Shared read-mode cell.
#[derive(Debug)]
pub struct ReadModeCell(Mutex<ReadModeState>);

impl ReadModeCell {
    pub fn new(mode: ReadMode) -> Self {
        Self(Mutex::new(ReadModeState {
            own: mode,
            forced: Vec::new(),
            next_ticket: 0,
        }))
    }

    /// Number of forced modes not yet released.
    pub fn forced_count(&self) -> usize {
        self.0.lock().forced.len()
    }
}

impl Default for ReadModeCell {
    fn default() -> Self {
        Self::new(ReadMode::Committed)
    }
}

impl ReadModeControl for ReadModeCell {
    fn read_mode(&self) -> ReadMode {
        let state = self.0.lock();
        state.forced.last().map_or(state.own, |&(_, mode)| mode)
    }

    fn set_read_mode(&self, mode: ReadMode) {
        self.0.lock().own = mode;
    }

    fn force(&self, mode: ReadMode) -> ForcedMode {
        let mut state = self.0.lock();
        let id = state.next_ticket;
        state.next_ticket += 1;
        state.forced.push((id, mode));
        ForcedMode(id)
    }

    fn release(&self, ticket: ForcedMode) {
        self.0.lock().forced.retain(|&(id, _)| id != ticket.0);
    }
}

/// Settable holder for the logged-in user.
#[derive(Debug, Default)]
pub struct CurrentUserCell(RwLock<Option<ExternalIdentity>>);

impl CurrentUserCell {
    pub fn log_in(&self, identity: ExternalIdentity) {
        *self.0.write() = Some(identity);
    }

    pub fn log_out(&self) {
        *self.0.write() = None;
    }
}

impl CurrentUser for CurrentUserCell {
    fn current_user(&self) -> Option<ExternalIdentity> {
        self.0.read().clone()
    }
}

/// Cache-aside resolver from the logged-in identity to its internal id.
///
/// Entries never expire and are never invalidated: the mapping from
/// external to internal id does not change for the lifetime of a user.
pub struct AuditorResolver {
    current_user: Arc<dyn CurrentUser>,
    users: Arc<dyn UserLookup>,
    cache: Arc<dyn Cache<InternalUserId>>,
    read_mode: Arc<dyn ReadModeControl>,
    lookup_mode: ReadMode,
}

impl AuditorResolver {
    pub fn new(
        current_user: Arc<dyn CurrentUser>,
        users: Arc<dyn UserLookup>,
        cache: Arc<dyn Cache<InternalUserId>>,
        read_mode: Arc<dyn ReadModeControl>,
    ) -> Self {
        Self {
            current_user,
            users,
            cache,
            read_mode,
            lookup_mode: ReadMode::SeeUncommitted,
        }
    }

    /// Read mode forced while the store is queried on a cache miss.
    pub fn lookup_mode(mut self, mode: ReadMode) -> Self {
        self.lookup_mode = mode;
        self
    }

    pub fn resolve_current_user(&self) -> Result<InternalUserId, AuditorError> {
        let Some(identity) = self.current_user.current_user() else {
            return Err(AuditorError::Unauthenticated);
        };
        let key = keys::auditor_key(identity.as_str());
        if let Some(internal_id) = self.cache.get(&key)? {
            debug!(target: "conference::auditor", %key, internal_id, "cache hit");
            return Ok(internal_id);
        }
        debug!(target: "conference::auditor", %key, "cache miss");

        let found = {
            let _guard = ReadModeGuard::enter(self.read_mode.as_ref(), self.lookup_mode);
            self.users.find_internal_id(identity.as_str())?
        };
        let Some(internal_id) = found else {
            warn!(
                target: "conference::auditor",
                external_id = identity.as_str(),
                "authenticated user has no user record"
            );
            return Err(AuditorError::UserNotFound {
                external_id: identity.0,
            });
        };
        self.cache.put(&key, internal_id)?;
        debug!(target: "conference::auditor", %key, internal_id, "cache populated");
        Ok(internal_id)
    }
}

impl fmt::Debug for AuditorResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuditorResolver")
            .field("lookup_mode", &self.lookup_mode)
            .finish_non_exhaustive()
    }
}
