// ── Room inventory operations ──

use std::sync::Arc;

use super::ReservationStore;
use crate::access::{Capability, Session, authorize};
use crate::availability::{DateRange, is_range_available};
use crate::error::{CoreError, Result};
use crate::model::{ActionDetails, ActionLog, Reservation, Room, RoomId, RoomStatus};
use crate::requests::{RoomDraft, RoomSearch};

impl ReservationStore {
    /// All rooms, ordered by id.
    pub fn list_rooms(&self) -> Vec<Arc<Room>> {
        self.state.rooms.snapshot()
    }

    pub fn room(&self, id: RoomId) -> Result<Arc<Room>> {
        self.state
            .rooms
            .get_by_key(&id)
            .ok_or_else(|| CoreError::not_found("Room", id))
    }

    /// Insert a room (next free id when `draft.id` is `None`) or replace
    /// the room with that id. A replacement keeps the current status
    /// unless the draft sets one.
    pub fn upsert_room(&mut self, session: &Session, draft: RoomDraft) -> Result<Arc<Room>> {
        authorize(session, Capability::ManageInventory)?;
        if draft.name.trim().is_empty() {
            return Err(CoreError::validation("name", "must not be empty"));
        }
        if draft.price_per_night == 0 {
            return Err(CoreError::validation("price_per_night", "must be greater than zero"));
        }
        if draft.capacity == Some(0) {
            return Err(CoreError::validation("capacity", "must be at least one guest"));
        }

        let (room, is_new) = self.transact(|state, _| {
            let id = match draft.id {
                Some(id) => {
                    state.claim_room_id(id);
                    id
                }
                None => state.allocate_room_id(),
            };
            let current_status = state.rooms.get_by_key(&id).map(|r| r.status());
            let room = draft.into_room(id, current_status);
            let is_new = state.rooms.upsert(id, room);
            let room = state
                .rooms
                .get_by_key(&id)
                .ok_or_else(|| CoreError::not_found("Room", id))?;
            Ok((room, is_new))
        })?;

        tracing::info!(room_id = %room.id, name = %room.name, is_new, "saved room");
        Ok(room)
    }

    /// Remove a room. Reservations keep their room snapshot.
    pub fn delete_room(&mut self, session: &Session, id: RoomId) -> Result<Arc<Room>> {
        authorize(session, Capability::ManageInventory)?;
        let removed = self.transact(|state, _| {
            state
                .rooms
                .remove(&id)
                .ok_or_else(|| CoreError::not_found("Room", id))
        })?;
        tracing::info!(room_id = %id, "deleted room");
        Ok(removed)
    }

    /// Set the status and availability flag of a room together.
    pub fn set_room_status(&mut self, session: &Session, id: RoomId, status: RoomStatus) -> Result<Arc<Room>> {
        authorize(session, Capability::ManageRoomStatus)?;
        let staff = session.email.clone();
        let session_id = session.id;

        let room = self.transact(|state, now| {
            let current = state
                .rooms
                .get_by_key(&id)
                .ok_or_else(|| CoreError::not_found("Room", id))?;
            let mut updated = (*current).clone();
            updated.set_status(status);
            state.rooms.upsert(id, updated);
            state.append_log(ActionLog {
                staff,
                action: format!("Room status set to {status}"),
                timestamp: now,
                session_id: Some(session_id),
                reservation_id: None,
                details: Some(ActionDetails::RoomStatus { room_id: id, status }),
            });
            state
                .rooms
                .get_by_key(&id)
                .ok_or_else(|| CoreError::not_found("Room", id))
        })?;

        tracing::info!(room_id = %id, %status, "room status changed");
        Ok(room)
    }

    /// Rooms that are free for the whole stay, optionally narrowed by type
    /// and party size. Rooms under maintenance are never offered.
    pub fn search_available_rooms(&self, search: &RoomSearch) -> Result<Vec<Arc<Room>>> {
        let range = DateRange::new(search.arrival, search.departure)?;
        let reservations: Vec<&Reservation> = self.state.reservations.values().map(AsRef::as_ref).collect();

        Ok(self
            .state
            .rooms
            .values()
            .filter(|room| room.status() != RoomStatus::Maintenance)
            .filter(|room| search.room_type.is_none_or(|t| room.room_type == t))
            .filter(|room| search.guests.is_none_or(|g| room.fits(g)))
            .filter(|room| is_range_available(reservations.iter().copied(), room.id, &range, None))
            .cloned()
            .collect())
    }

    /// The room plus the unconsumed reservation arriving on it today, if any.
    pub fn room_with_todays_reservation(
        &self,
        session: &Session,
        id: RoomId,
    ) -> Result<(Arc<Room>, Option<Arc<Reservation>>)> {
        authorize(session, Capability::FrontDesk)?;
        let room = self.room(id)?;
        let today = self.today();
        let reservation = self
            .state
            .reservations
            .values()
            .find(|r| r.room_id == id && r.arrival == today && !r.qr_used)
            .cloned();
        Ok((room, reservation))
    }
}
