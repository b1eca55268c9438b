//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use reefdesk_config::ConfigError;
use reefdesk_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONFLICT: i32 = 6;
    pub const STORAGE: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Authentication ───────────────────────────────────────────────
    #[error("Invalid email or password")]
    #[diagnostic(
        code(reefdesk::auth_failed),
        help("Check the email and password, or create an account with: reefdesk account register <EMAIL>")
    )]
    AuthFailed,

    #[error("Not signed in")]
    #[diagnostic(code(reefdesk::not_signed_in), help("Run: reefdesk account login <EMAIL>"))]
    NotSignedIn,

    #[error("Permission denied: {capability} required")]
    #[diagnostic(
        code(reefdesk::permission_denied),
        help("Sign in with an account whose role grants '{capability}'.")
    )]
    PermissionDenied { capability: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(reefdesk::not_found),
        help("Run: reefdesk {list_command} to see what exists")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("{message}")]
    #[diagnostic(code(reefdesk::conflict))]
    Conflict { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(reefdesk::validation))]
    Validation { field: String, reason: String },

    // ── Storage ──────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(reefdesk::storage),
        help("Check that the data directory exists and is writable. Nothing was changed.")
    )]
    Storage {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(reefdesk::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: reefdesk config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(reefdesk::config))]
    Config(ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(reefdesk::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::AuthFailed | Self::NotSignedIn => exit_code::AUTH,
            Self::PermissionDenied { .. } => exit_code::PERMISSION,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Conflict { .. } => exit_code::CONFLICT,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            Self::Storage { .. } => exit_code::STORAGE,
            Self::ProfileNotFound { .. } | Self::Config(_) | Self::Io(_) => exit_code::GENERAL,
        }
    }

    pub fn validation(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(other),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation { field, reason } => Self::Validation {
                field: field.into(),
                reason,
            },

            CoreError::NotFound {
                entity_type,
                identifier,
            } => Self::NotFound {
                list_command: list_command_for(entity_type).into(),
                resource_type: entity_type.into(),
                identifier,
            },

            CoreError::InvalidCredentials => Self::AuthFailed,
            CoreError::NotAuthenticated => Self::NotSignedIn,
            CoreError::Forbidden { capability } => Self::PermissionDenied {
                capability: capability.to_string(),
            },

            CoreError::Storage { .. } | CoreError::Serialization { .. } | CoreError::Migration { .. } => {
                Self::Storage {
                    message: err.to_string(),
                    source: Some(Box::new(err)),
                }
            }

            CoreError::EmailTaken { .. }
            | CoreError::RoomUnavailable { .. }
            | CoreError::DuplicateReservation
            | CoreError::QrAlreadyUsed
            | CoreError::QrReissued { .. }
            | CoreError::NotCheckedIn { .. }
            | CoreError::AlreadyCheckedOut { .. }
            | CoreError::Conflict { .. } => Self::Conflict {
                message: err.to_string(),
            },
        }
    }
}

fn list_command_for(entity_type: &str) -> &'static str {
    match entity_type {
        "Room" => "rooms list",
        "User" => "users list",
        _ => "reservations list",
    }
}
