// ── Reservation domain type ──
//
// Room name, type, and nightly price are snapshotted at booking time so
// later inventory edits never rewrite history.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::entity_id::{Email, ReservationId, RoomId};
use super::room::RoomType;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PaymentStatus {
    Paid,
    Partial,
    #[default]
    Pending,
}

impl PaymentStatus {
    /// 100 → paid, anything in between → partial, 0 → pending.
    pub fn from_percent(percent: u8) -> Self {
        match percent {
            0 => Self::Pending,
            100.. => Self::Paid,
            _ => Self::Partial,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PaymentMethod {
    Cash,
    #[strum(to_string = "card", serialize = "tarjeta")]
    Card,
    #[strum(to_string = "transfer", serialize = "transferencia")]
    Transfer,
}

/// Percentage of `total` covered by `paid`, rounded half-up and capped at 100.
///
/// A zero total counts as fully paid.
pub fn percent_paid(paid: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    let paid = u128::from(paid);
    let total = u128::from(total);
    let rounded = (paid * 200 + total) / (total * 2);
    u8::try_from(rounded.min(100)).unwrap_or(100)
}

/// Guest contact details captured with the booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestDetails {
    pub full_name: String,
    pub phone: String,
    pub email: Email,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
}

impl GuestDetails {
    /// Placeholder details for bookings made without a contact form.
    pub fn placeholder(id: ReservationId, email: Email) -> Self {
        Self {
            full_name: format!("Guest #{id}"),
            phone: String::new(),
            email,
            document: None,
        }
    }
}

/// Scannable confirmation token. The payload always embeds the reservation id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrToken {
    pub payload: String,
    /// Rendered image (typically a data URL), supplied by the consumer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub issued_at: DateTime<Utc>,
}

/// Who performed a front-desk step, and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeskStamp {
    pub at: DateTime<Utc>,
    pub staff: Email,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: ReservationId,
    pub guest_email: Email,
    pub room_id: RoomId,
    pub room_name: String,
    pub room_type: RoomType,
    pub arrival: NaiveDate,
    pub departure: NaiveDate,
    pub nights: u32,
    pub price_per_night: u64,
    pub total: u64,
    pub created_at: DateTime<Utc>,

    pub payment_status: PaymentStatus,
    pub percent_paid: u8,
    #[serde(default)]
    pub amount_paid: u64,

    /// Single-use flag, flipped by the first successful check-in.
    pub qr_used: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr: Option<QrToken>,
    /// Payloads superseded by a reissue. Scanning one is refused.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub revoked_qr: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_in: Option<DeskStamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_out: Option<DeskStamp>,

    pub guest: GuestDetails,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Reservation {
    pub fn is_checked_in(&self) -> bool {
        self.check_in.is_some()
    }

    pub fn is_checked_out(&self) -> bool {
        self.check_out.is_some()
    }

    /// True if `payload` is one this reservation's QR has been reissued from.
    pub fn is_revoked_qr(&self, payload: &str) -> bool {
        let payload = payload.trim();
        self.revoked_qr.iter().any(|old| old.trim() == payload)
    }

    pub fn balance_due(&self) -> u64 {
        self.total.saturating_sub(self.amount_paid)
    }

    /// Record `amount` as the sum paid so far and rederive percent and
    /// status from it. Anything above the total counts as the total.
    pub fn apply_payment(&mut self, amount: u64) {
        self.amount_paid = amount.min(self.total);
        self.percent_paid = percent_paid(amount, self.total);
        self.payment_status = PaymentStatus::from_percent(self.percent_paid);
    }
}
