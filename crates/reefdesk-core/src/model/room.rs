// ── Room domain type ──
//
// `available` is a derived flag kept for consumers that only care about
// bookability. It is private and only ever written through
// `Room::set_status`, so it cannot drift from `status`.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::entity_id::RoomId;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum RoomType {
    Basic,
    Medium,
    Premium,
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum RoomStatus {
    #[default]
    Available,
    Occupied,
    Cleaning,
    Maintenance,
}

impl RoomStatus {
    pub fn is_available(self) -> bool {
        self == Self::Available
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    #[serde(rename = "type")]
    pub room_type: RoomType,
    pub price_per_night: u64,
    available: bool,
    status: RoomStatus,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beds: Option<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
}

impl Room {
    /// A new room in the `available` state with no media or amenities.
    pub fn new(id: RoomId, name: impl Into<String>, room_type: RoomType, price_per_night: u64) -> Self {
        Self {
            id,
            name: name.into(),
            room_type,
            price_per_night,
            available: true,
            status: RoomStatus::Available,
            images: Vec::new(),
            description: None,
            capacity: None,
            beds: None,
            amenities: Vec::new(),
        }
    }

    pub fn status(&self) -> RoomStatus {
        self.status
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    /// Set the status and recompute the availability flag in one step.
    pub fn set_status(&mut self, status: RoomStatus) {
        self.status = status;
        self.available = status.is_available();
    }

    /// Whether the room sleeps at least `guests` people. Rooms with no
    /// recorded capacity accept any party size.
    pub fn fits(&self, guests: u32) -> bool {
        self.capacity.is_none_or(|cap| cap >= guests)
    }
}
