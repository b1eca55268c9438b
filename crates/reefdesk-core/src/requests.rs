// ── Typed request structs for store operations ──

use chrono::NaiveDate;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::model::{
    Email, GuestDetails, PaymentMethod, Role, Room, RoomId, RoomStatus, RoomType,
};

// ── Reservations ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReservation {
    pub guest_email: Email,
    pub room_id: RoomId,
    pub arrival: NaiveDate,
    pub departure: NaiveDate,
    /// Contact snapshot. Placeholder details are used when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest: Option<GuestDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Payment collected together with the booking, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_payment: Option<PaymentIntent>,
}

impl NewReservation {
    pub fn new(guest_email: Email, room_id: RoomId, arrival: NaiveDate, departure: NaiveDate) -> Self {
        Self {
            guest_email,
            room_id,
            arrival,
            departure,
            guest: None,
            notes: None,
            initial_payment: None,
        }
    }

    pub fn with_guest(mut self, guest: GuestDetails) -> Self {
        self.guest = Some(guest);
        self
    }

    pub fn with_payment(mut self, amount: u64, method: PaymentMethod) -> Self {
        self.initial_payment = Some(PaymentIntent { amount, method });
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub amount: u64,
    pub method: PaymentMethod,
}

// ── Rooms ──────────────────────────────────────────────────────────

/// Insert-or-replace payload. `id: None` inserts with the next free id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RoomId>,
    pub name: String,
    pub room_type: RoomType,
    pub price_per_night: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<RoomStatus>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beds: Option<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
}

impl RoomDraft {
    pub fn new(name: impl Into<String>, room_type: RoomType, price_per_night: u64) -> Self {
        Self {
            id: None,
            name: name.into(),
            room_type,
            price_per_night,
            status: None,
            images: Vec::new(),
            description: None,
            capacity: None,
            beds: None,
            amenities: Vec::new(),
        }
    }

    /// Build the room. Without an explicit status the room keeps
    /// `current_status`, or starts available.
    pub(crate) fn into_room(self, id: RoomId, current_status: Option<RoomStatus>) -> Room {
        let mut room = Room::new(id, self.name, self.room_type, self.price_per_night);
        room.set_status(self.status.or(current_status).unwrap_or_default());
        room.images = self.images;
        room.description = self.description;
        room.capacity = self.capacity;
        room.beds = self.beds;
        room.amenities = self.amenities;
        room
    }
}

impl From<&Room> for RoomDraft {
    fn from(room: &Room) -> Self {
        Self {
            id: Some(room.id),
            name: room.name.clone(),
            room_type: room.room_type,
            price_per_night: room.price_per_night,
            status: Some(room.status()),
            images: room.images.clone(),
            description: room.description.clone(),
            capacity: room.capacity,
            beds: room.beds.clone(),
            amenities: room.amenities.clone(),
        }
    }
}

/// Filters for [`ReservationStore::search_available_rooms`](crate::ReservationStore::search_available_rooms).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomSearch {
    pub arrival: NaiveDate,
    pub departure: NaiveDate,
    pub room_type: Option<RoomType>,
    pub guests: Option<u32>,
}

// ── Users ──────────────────────────────────────────────────────────

/// Partial profile update. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub role: Option<Role>,
    pub phone: Option<String>,
    pub shift: Option<String>,
    pub password: Option<SecretString>,
}
