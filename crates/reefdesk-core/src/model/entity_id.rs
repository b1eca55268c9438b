// ── Core identity types ──
//
// Every cross-reference between entities goes through one of these
// identifiers: rooms and reservations by auto-increment integer, users
// by normalized email. Nothing holds a live pointer to another entity.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident($inner:ty)) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name($inner);

        impl $name {
            pub const fn new(raw: $inner) -> Self {
                Self(raw)
            }

            pub const fn get(self) -> $inner {
                self.0
            }

            /// The id that follows this one in allocation order.
            pub const fn next(self) -> Self {
                Self(self.0 + 1)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().trim_start_matches('#').parse::<$inner>().map(Self)
            }
        }

        impl From<$inner> for $name {
            fn from(raw: $inner) -> Self {
                Self(raw)
            }
        }
    };
}

numeric_id!(
    /// Room identifier, allocated as `max(existing) + 1`.
    RoomId(u32)
);

numeric_id!(
    /// Reservation identifier, allocated as `max(existing) + 1`.
    ReservationId(u64)
);

// ── Email ───────────────────────────────────────────────────────────

/// User key. Normalized to trimmed lowercase so lookups are case-insensitive.
///
/// Construction never fails; well-formedness is checked separately by
/// [`crate::credentials::validate_email`] where the caller needs it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Email(String);

impl Email {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Email {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<String> for Email {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for Email {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<Email> for String {
    fn from(e: Email) -> Self {
        e.0
    }
}
