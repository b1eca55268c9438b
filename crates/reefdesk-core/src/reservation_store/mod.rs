// ── Reservation store ──
//
// The single stateful service over users, rooms, reservations, and the
// action log. Reads borrow `&self`; every write takes `&mut self` and
// runs through `transact`, which stages the change on a copy of the
// state, persists the touched collections, and only then commits the
// copy and notifies subscribers. A failed write leaves memory untouched.

mod booking;
mod front_desk;
mod identity;
mod inventory;

pub use booking::SEARCH_LIMIT;

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::watch;

use crate::access::{Capability, Session, authorize};
use crate::clock::{Clock, SystemClock};
use crate::config::{StorageLocation, StoreConfig};
use crate::error::Result;
use crate::model::{Reservation, Room};
use crate::reports::ReportView;
use crate::store::{
    DataStore, DirectoryBackend, KeyValueBackend, MemoryBackend, MigrationOutcome, apply_seed,
    migrate,
};
use crate::stream::{EntityStream, Snapshot};

pub struct ReservationStore {
    backend: Arc<dyn KeyValueBackend>,
    clock: Arc<dyn Clock>,
    config: StoreConfig,
    state: DataStore,
    migration: MigrationOutcome,
    rooms_tx: watch::Sender<Snapshot<Room>>,
    reservations_tx: watch::Sender<Snapshot<Reservation>>,
}

impl std::fmt::Debug for ReservationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReservationStore")
            .field("storage", &self.config.storage)
            .field("rooms", &self.state.rooms.len())
            .field("reservations", &self.state.reservations.len())
            .field("users", &self.state.users.len())
            .finish_non_exhaustive()
    }
}

impl ReservationStore {
    /// Open the store described by `config` on the wall clock.
    pub fn open(config: StoreConfig) -> Result<Self> {
        let backend: Arc<dyn KeyValueBackend> = match &config.storage {
            StorageLocation::Memory => Arc::new(MemoryBackend::new()),
            StorageLocation::Directory(path) => Arc::new(DirectoryBackend::open(path.clone())?),
        };
        Self::with_backend(backend, Arc::new(SystemClock), config)
    }

    /// Open over an explicit backend and clock.
    ///
    /// Runs the schema migration, loads every collection, and applies seed
    /// data. `config.storage` is informational only here.
    pub fn with_backend(
        backend: Arc<dyn KeyValueBackend>,
        clock: Arc<dyn Clock>,
        config: StoreConfig,
    ) -> Result<Self> {
        let migration = migrate::run(backend.as_ref())?;
        let state = DataStore::load(backend.as_ref())?;

        let (rooms_tx, _) = watch::channel(Arc::new(state.rooms.snapshot()));
        let (reservations_tx, _) = watch::channel(Arc::new(state.reservations.snapshot()));

        let mut store = Self {
            backend,
            clock,
            config,
            state,
            migration,
            rooms_tx,
            reservations_tx,
        };

        let seed = store.config.seed.clone();
        let fresh = migration.is_fresh();
        store.transact(|state, now| {
            apply_seed(state, &seed, fresh, now);
            Ok(())
        })?;

        tracing::info!(?migration, "reservation store ready");
        Ok(store)
    }

    // ── Metadata ─────────────────────────────────────────────────────

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// What the schema migration did when this store was opened.
    pub fn migration(&self) -> MigrationOutcome {
        self.migration
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe_rooms(&self) -> EntityStream<Room> {
        EntityStream::new(self.rooms_tx.subscribe())
    }

    pub fn subscribe_reservations(&self) -> EntityStream<Reservation> {
        EntityStream::new(self.reservations_tx.subscribe())
    }

    // ── Reports ──────────────────────────────────────────────────────

    /// Read-only projections over the current state, as of today.
    pub fn reports(&self, session: &Session) -> Result<ReportView> {
        authorize(session, Capability::ViewReports)?;
        Ok(ReportView::new(
            self.state.reservations.snapshot(),
            self.state.rooms.snapshot(),
            self.today(),
            self.config.upcoming_window_days,
        ))
    }

    // ── Write boundary ───────────────────────────────────────────────

    /// Run `op` against a staged copy of the state and commit it if both
    /// `op` and persistence succeed.
    fn transact<R>(&mut self, op: impl FnOnce(&mut DataStore, DateTime<Utc>) -> Result<R>) -> Result<R> {
        let now = self.clock.now();
        let mut staged = self.state.clone();
        let out = op(&mut staged, now)?;

        let written = staged.persist_changes(&self.state, self.backend.as_ref())?;
        let rooms_changed = staged.rooms.version() != self.state.rooms.version();
        let reservations_changed = staged.reservations.version() != self.state.reservations.version();
        self.state = staged;

        if rooms_changed {
            let snap = Arc::new(self.state.rooms.snapshot());
            self.rooms_tx.send_modify(|s| *s = snap);
        }
        if reservations_changed {
            let snap = Arc::new(self.state.reservations.snapshot());
            self.reservations_tx.send_modify(|s| *s = snap);
        }
        if !written.is_empty() {
            tracing::trace!(?written, "committed");
        }
        Ok(out)
    }
}


#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::test_support::*;
    use crate::model::{RoomId, RoomStatus};

    #[test]
    fn seeded_store_publishes_rooms() {
        let store = store_on("2025-06-01");
        let stream = store.subscribe_rooms();
        assert_eq!(stream.current().len(), 3);
        assert!(store.migration().is_fresh());
    }

    #[test]
    fn committed_writes_reach_subscribers() {
        let mut store = store_on("2025-06-01");
        let admin = admin(&mut store);
        let mut stream = store.subscribe_rooms();

        store
            .set_room_status(&admin, RoomId::new(1), RoomStatus::Cleaning)
            .unwrap();

        let snap = tokio_test::block_on(stream.changed()).unwrap();
        assert_eq!(snap[0].status(), RoomStatus::Cleaning);
    }

    #[test]
    fn failed_write_publishes_nothing() {
        let mut store = store_on("2025-06-01");
        let admin = admin(&mut store);
        let stream = store.subscribe_rooms();

        assert!(store.set_room_status(&admin, RoomId::new(99), RoomStatus::Cleaning).is_err());
        assert_eq!(stream.latest()[0].status(), RoomStatus::Available);
    }
}
