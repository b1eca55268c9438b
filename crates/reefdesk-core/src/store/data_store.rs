// ── In-memory state of a reservation store ──
//
// Indexed collections for users, rooms, and reservations, the append-only
// action log, the persisted session marker, and the id high-water marks.
// `DataStore` is a plain value: the reservation store clones it, mutates
// the copy, persists the collections whose version moved in one batch,
// and only then swaps the copy in.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use super::backend::KeyValueBackend;
use super::collection::EntityCollection;
use crate::error::{CoreError, Result};
use crate::model::{ActionLog, Email, Reservation, ReservationId, Room, RoomId, User};

// ── Storage keys ─────────────────────────────────────────────────────

pub(crate) const USERS_KEY: &str = "users.v1";
pub(crate) const ROOMS_KEY: &str = "rooms.v1";
pub(crate) const RESERVATIONS_KEY: &str = "reservations.v1";
pub(crate) const ACTION_LOGS_KEY: &str = "action_logs.v1";
pub(crate) const SESSION_KEY: &str = "session";
pub(crate) const COUNTERS_KEY: &str = "counters";
pub(crate) const SCHEMA_VERSION_KEY: &str = "schema_version";

/// Who is signed in. Only the email is authoritative; the role is
/// resolved from the users collection every time the marker is read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct SessionMarker {
    pub id: Uuid,
    pub email: Email,
    pub started_at: DateTime<Utc>,
}

/// Highest id ever handed out per collection. Ids are never reused, even
/// after the entity that held them is deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct IdCounters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<RoomId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reservation: Option<ReservationId>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct DataStore {
    pub(crate) users: EntityCollection<Email, User>,
    pub(crate) rooms: EntityCollection<RoomId, Room>,
    pub(crate) reservations: EntityCollection<ReservationId, Reservation>,
    pub(crate) action_logs: Vec<Arc<ActionLog>>,
    pub(crate) session: Option<SessionMarker>,
    counters: IdCounters,
    logs_version: u64,
    session_version: u64,
    counters_version: u64,
}

impl DataStore {
    /// Read every collection from `backend`. Missing keys load empty.
    pub(crate) fn load(backend: &dyn KeyValueBackend) -> Result<Self> {
        let users = load_collection(backend, USERS_KEY, |u: &User| u.email.clone())?;
        let rooms = load_collection(backend, ROOMS_KEY, |r: &Room| r.id)?;
        let reservations = load_collection(backend, RESERVATIONS_KEY, |r: &Reservation| r.id)?;
        let action_logs: Vec<ActionLog> = load_value(backend, ACTION_LOGS_KEY)?.unwrap_or_default();
        let session = load_value(backend, SESSION_KEY)?;
        let counters = load_value(backend, COUNTERS_KEY)?.unwrap_or_default();

        tracing::debug!(
            users = users.len(),
            rooms = rooms.len(),
            reservations = reservations.len(),
            logs = action_logs.len(),
            "loaded store state"
        );

        Ok(Self {
            users,
            rooms,
            reservations,
            action_logs: action_logs.into_iter().map(Arc::new).collect(),
            session,
            counters,
            logs_version: 0,
            session_version: 0,
            counters_version: 0,
        })
    }

    /// Write every collection that changed relative to `before` as one
    /// backend batch.
    ///
    /// Returns the keys written. On error neither the backend nor memory
    /// has been touched; the caller discards `self`.
    pub(crate) fn persist_changes(
        &self,
        before: &DataStore,
        backend: &dyn KeyValueBackend,
    ) -> Result<Vec<&'static str>> {
        let mut batch: Vec<(&'static str, Option<String>)> = Vec::new();

        if self.users.version() != before.users.version() {
            batch.push((USERS_KEY, Some(encode(USERS_KEY, self.users.to_json())?)));
        }
        if self.rooms.version() != before.rooms.version() {
            batch.push((ROOMS_KEY, Some(encode(ROOMS_KEY, self.rooms.to_json())?)));
        }
        if self.reservations.version() != before.reservations.version() {
            batch.push((
                RESERVATIONS_KEY,
                Some(encode(RESERVATIONS_KEY, self.reservations.to_json())?),
            ));
        }
        if self.logs_version != before.logs_version {
            let logs: Vec<&ActionLog> = self.action_logs.iter().map(AsRef::as_ref).collect();
            batch.push((
                ACTION_LOGS_KEY,
                Some(encode(ACTION_LOGS_KEY, serde_json::to_string_pretty(&logs))?),
            ));
        }
        if self.session_version != before.session_version {
            let value = self
                .session
                .as_ref()
                .map(|marker| encode(SESSION_KEY, serde_json::to_string_pretty(marker)))
                .transpose()?;
            batch.push((SESSION_KEY, value));
        }
        if self.counters_version != before.counters_version {
            batch.push((
                COUNTERS_KEY,
                Some(encode(COUNTERS_KEY, serde_json::to_string_pretty(&self.counters))?),
            ));
        }

        if !batch.is_empty() {
            backend.write_batch(&batch)?;
        }
        Ok(batch.into_iter().map(|(key, _)| key).collect())
    }

    // ── Mutation helpers ─────────────────────────────────────────────

    pub(crate) fn append_log(&mut self, entry: ActionLog) {
        self.action_logs.push(Arc::new(entry));
        self.logs_version += 1;
    }

    pub(crate) fn set_session(&mut self, marker: Option<SessionMarker>) {
        self.session = marker;
        self.session_version += 1;
    }

    /// The id the next inserted room would get.
    pub(crate) fn next_room_id(&self) -> RoomId {
        self.counters
            .room
            .max(self.rooms.last_key().copied())
            .map_or(RoomId::new(1), RoomId::next)
    }

    pub(crate) fn next_reservation_id(&self) -> ReservationId {
        self.counters
            .reservation
            .max(self.reservations.last_key().copied())
            .map_or(ReservationId::new(1), ReservationId::next)
    }

    pub(crate) fn allocate_room_id(&mut self) -> RoomId {
        let id = self.next_room_id();
        self.claim_room_id(id);
        id
    }

    pub(crate) fn allocate_reservation_id(&mut self) -> ReservationId {
        let id = self.next_reservation_id();
        if self.counters.reservation < Some(id) {
            self.counters.reservation = Some(id);
            self.counters_version += 1;
        }
        id
    }

    /// Raise the room high-water mark to cover an explicitly chosen id.
    pub(crate) fn claim_room_id(&mut self, id: RoomId) {
        if self.counters.room < Some(id) {
            self.counters.room = Some(id);
            self.counters_version += 1;
        }
    }
}

fn load_value<T: DeserializeOwned>(backend: &dyn KeyValueBackend, key: &str) -> Result<Option<T>> {
    backend
        .get(key)?
        .map(|raw| serde_json::from_str(&raw).map_err(|e| CoreError::serialization(key, e)))
        .transpose()
}

fn load_collection<K: Ord + Clone, T: DeserializeOwned>(
    backend: &dyn KeyValueBackend,
    key: &str,
    key_of: impl Fn(&T) -> K,
) -> Result<EntityCollection<K, T>> {
    match backend.get(key)? {
        Some(raw) => EntityCollection::from_json(&raw, key_of).map_err(|e| CoreError::serialization(key, e)),
        None => Ok(EntityCollection::new()),
    }
}

fn encode(key: &str, value: serde_json::Result<String>) -> Result<String> {
    value.map_err(|e| CoreError::serialization(key, e))
}
