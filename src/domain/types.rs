/// Core identifier and value types used throughout the domain layer
///
/// This module defines the ID newtypes (users, addictions, entries) and the
/// clamped `Level` type that drives reminder frequency.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Declares a UUID-backed identifier newtype
///
/// Each ID is a distinct type so you can't accidentally pass an entry ID
/// where an addiction ID is expected.
macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a new random ID
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Parse an ID from its string form (used when loading rows and tool arguments)
            pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
                Ok(Self(Uuid::parse_str(s.trim())?))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

uuid_id!(
    /// The authenticated principal that owns addictions, entries and streaks
    UserId
);

uuid_id!(
    /// Unique identifier for a tracked addiction (habit)
    AddictionId
);

uuid_id!(
    /// Unique identifier for a single consumption entry
    EntryId
);

/// Intensity level of an addiction, always within 1..=10
///
/// Out-of-range inputs are clamped rather than rejected, so a level read back
/// from storage or passed by a client can always drive the reminder interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub struct Level(u8);

impl Level {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    /// Clamp any integer into the valid level range
    pub fn clamped(raw: i64) -> Self {
        Self(raw.clamp(Self::MIN as i64, Self::MAX as i64) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Level {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

impl From<i64> for Level {
    fn from(raw: i64) -> Self {
        Self::clamped(raw)
    }
}

impl From<Level> for i64 {
    fn from(level: Level) -> Self {
        level.0 as i64
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
