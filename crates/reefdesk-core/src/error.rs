// ── Core error types ──
//
// Every fallible store operation returns `CoreError`. Consumers that only
// need the broad category (CLI exit codes, UI banners) match on
// `CoreError::kind()` instead of individual variants.

use chrono::NaiveDate;
use thiserror::Error;

use crate::access::Capability;
use crate::model::RoomId;

/// Broad error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed input or a broken business rule (bad dates, weak password).
    Validation,
    /// The request is well-formed but collides with existing state.
    Conflict,
    NotFound,
    /// Wrong credentials or a missing capability.
    Auth,
    /// Persistence failure. In-memory state is unchanged when this is raised.
    Storage,
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    // ── Conflicts ────────────────────────────────────────────────────
    #[error("An account with email {email} already exists")]
    EmailTaken { email: String },

    #[error("Room {room_id} is not available from {arrival} to {departure}")]
    RoomUnavailable {
        room_id: RoomId,
        arrival: NaiveDate,
        departure: NaiveDate,
    },

    #[error("An identical reservation already exists")]
    DuplicateReservation,

    #[error("QR code already used")]
    QrAlreadyUsed,

    #[error("QR code for reservation {id} was replaced by a reissued one")]
    QrReissued { id: String },

    #[error("Reservation {id} has not been checked in")]
    NotCheckedIn { id: String },

    #[error("Reservation {id} is already checked out")]
    AlreadyCheckedOut { id: String },

    #[error("Operation rejected: {message}")]
    Conflict { message: String },

    // ── Lookup ───────────────────────────────────────────────────────
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    // ── Auth ─────────────────────────────────────────────────────────
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Not signed in")]
    NotAuthenticated,

    #[error("Permission denied: {capability} required")]
    Forbidden { capability: Capability },

    // ── Storage ──────────────────────────────────────────────────────
    #[error("Storage failure for key '{key}'")]
    Storage {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt data under key '{key}'")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Schema migration failed: {message}")]
    Migration { message: String },
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::EmailTaken { .. }
            | Self::RoomUnavailable { .. }
            | Self::DuplicateReservation
            | Self::QrAlreadyUsed
            | Self::QrReissued { .. }
            | Self::NotCheckedIn { .. }
            | Self::AlreadyCheckedOut { .. }
            | Self::Conflict { .. } => ErrorKind::Conflict,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::InvalidCredentials | Self::NotAuthenticated | Self::Forbidden { .. } => {
                ErrorKind::Auth
            }
            Self::Storage { .. } | Self::Serialization { .. } | Self::Migration { .. } => {
                ErrorKind::Storage
            }
        }
    }

    // ── Constructors ─────────────────────────────────────────────────

    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn not_found(entity_type: &'static str, identifier: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            identifier: identifier.to_string(),
        }
    }

    pub(crate) fn storage(key: &str, source: std::io::Error) -> Self {
        Self::Storage {
            key: key.to_owned(),
            source,
        }
    }

    pub(crate) fn serialization(key: &str, source: serde_json::Error) -> Self {
        Self::Serialization {
            key: key.to_owned(),
            source,
        }
    }
}

pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_group_variants() {
        assert_eq!(CoreError::QrAlreadyUsed.kind(), ErrorKind::Conflict);
        assert_eq!(CoreError::InvalidCredentials.kind(), ErrorKind::Auth);
        assert_eq!(
            CoreError::not_found("Room", RoomId::new(9)).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            CoreError::validation("dates", "end before start").kind(),
            ErrorKind::Validation
        );
    }

    #[test]
    fn qr_message_is_stable() {
        assert_eq!(CoreError::QrAlreadyUsed.to_string(), "QR code already used");
    }
}
