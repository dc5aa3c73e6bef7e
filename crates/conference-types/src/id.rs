use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::{Uuid, Variant};

/// Internal numeric user identifier stamped on created/modified records.
///
/// Never exposed outside the persistence boundary; the external
/// [`UserId`] is what callers see.
pub type InternalUserId = i64;

/// Parse `raw` as a canonical lowercase, hyphenated UUID v4.
///
/// `Uuid::try_parse` is lenient (uppercase, braces, simple form), so the
/// parsed value is re-rendered and compared against the input.
fn parse_v4(kind: &'static str, raw: &str) -> Result<String, DomainError> {
    let malformed = || DomainError::MalformedId {
        kind,
        raw: raw.to_string(),
    };
    let uuid = Uuid::try_parse(raw).map_err(|_| malformed())?;
    if uuid.get_version_num() != 4 || uuid.get_variant() != Variant::RFC4122 {
        return Err(malformed());
    }
    let canonical = uuid.hyphenated().to_string();
    if canonical != raw {
        return Err(malformed());
    }
    Ok(canonical)
}

macro_rules! external_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Allocate a fresh random identifier.
            pub fn new_v4() -> Self {
                Self(Uuid::new_v4().hyphenated().to_string())
            }

            /// Parse a canonical lowercase UUID v4 string.
            pub fn parse(raw: &str) -> Result<Self, DomainError> {
                parse_v4($kind, raw).map(Self)
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl FromStr for $name {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }
    };
}

external_id!(
    /// Externally visible event identifier.
    EventId,
    "event"
);
external_id!(
    /// Externally visible session identifier. Sessions are always addressed
    /// together with their owning [`EventId`].
    SessionId,
    "session"
);
external_id!(
    /// Externally visible user identifier.
    UserId,
    "user"
);
