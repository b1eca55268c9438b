//! Shared helpers for command handlers.

use chrono::{Datelike, NaiveDate};
use secrecy::SecretString;

use reefdesk_core::{
    PaymentMethod, ReservationId, ReservationStore, Role, RoomId, RoomStatus, RoomType,
    Session,
};

use crate::cli::{PaymentMethodArg, RoleArg, RoomStatusArg, RoomTypeArg};
use crate::error::CliError;

// ── Argument parsing ────────────────────────────────────────────────

pub fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, CliError> {
    raw.trim()
        .parse()
        .map_err(|_| CliError::validation(field, format!("expected YYYY-MM-DD, got '{raw}'")))
}

/// `YYYY-MM` into `(year, month)`.
pub fn parse_month(raw: &str) -> Result<(i32, u32), CliError> {
    let first = NaiveDate::parse_from_str(&format!("{}-01", raw.trim()), "%Y-%m-%d")
        .map_err(|_| CliError::validation("month", format!("expected YYYY-MM, got '{raw}'")))?;
    Ok((first.year(), first.month()))
}

pub fn parse_room_id(raw: &str) -> Result<RoomId, CliError> {
    raw.parse()
        .map_err(|_| CliError::validation("room", format!("'{raw}' is not a room ID")))
}

pub fn parse_reservation_id(raw: &str) -> Result<ReservationId, CliError> {
    raw.parse()
        .map_err(|_| CliError::validation("reservation", format!("'{raw}' is not a reservation ID")))
}

// ── Domain enum conversions ─────────────────────────────────────────

impl From<RoomTypeArg> for RoomType {
    fn from(arg: RoomTypeArg) -> Self {
        match arg {
            RoomTypeArg::Basic => Self::Basic,
            RoomTypeArg::Medium => Self::Medium,
            RoomTypeArg::Premium => Self::Premium,
        }
    }
}

impl From<RoomStatusArg> for RoomStatus {
    fn from(arg: RoomStatusArg) -> Self {
        match arg {
            RoomStatusArg::Available => Self::Available,
            RoomStatusArg::Occupied => Self::Occupied,
            RoomStatusArg::Cleaning => Self::Cleaning,
            RoomStatusArg::Maintenance => Self::Maintenance,
        }
    }
}

impl From<RoleArg> for Role {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::Admin => Self::Admin,
            RoleArg::Staff => Self::Staff,
            RoleArg::Guest => Self::Guest,
        }
    }
}

impl From<PaymentMethodArg> for PaymentMethod {
    fn from(arg: PaymentMethodArg) -> Self {
        match arg {
            PaymentMethodArg::Cash => Self::Cash,
            PaymentMethodArg::Card => Self::Card,
            PaymentMethodArg::Transfer => Self::Transfer,
        }
    }
}

// ── Session & prompts ───────────────────────────────────────────────

/// The persisted session, or a "not signed in" error.
pub fn session(store: &ReservationStore) -> Result<Session, CliError> {
    Ok(store.require_session()?)
}

/// Use `provided` or prompt on the terminal without echo.
pub fn password(provided: Option<String>, prompt: &str) -> Result<SecretString, CliError> {
    let raw = match provided {
        Some(p) => p,
        None => rpassword::prompt_password(prompt)?,
    };
    Ok(SecretString::from(raw))
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}
