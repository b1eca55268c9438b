// ── Front-desk audit trail ──
//
// Append-only. Entries are never edited or removed once committed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entity_id::{Email, ReservationId, RoomId};
use super::reservation::PaymentMethod;
use super::room::RoomStatus;

/// Structured payload attached to a log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionDetails {
    CheckIn {
        room_id: RoomId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        notes: Option<String>,
    },
    CheckOut {
        room_id: RoomId,
    },
    Payment {
        amount: u64,
        method: PaymentMethod,
        percent_paid: u8,
    },
    RoomStatus {
        room_id: RoomId,
        status: RoomStatus,
    },
    QrReissued,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionLog {
    /// Staff member who performed the action.
    pub staff: Email,
    pub action: String,
    pub timestamp: DateTime<Utc>,
    /// Session the action was performed under.
    #[serde(default)]
    pub session_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reservation_id: Option<ReservationId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ActionDetails>,
}
