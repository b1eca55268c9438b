// Integration tests for durable storage: reopen, legacy migration, write
// failures, and id allocation.
#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use secrecy::SecretString;

use reefdesk_core::{
    CoreError, Email, ErrorKind, FixedClock, KeyValueBackend, MemoryBackend, MigrationOutcome,
    NewReservation, PaymentStatus, ReservationId, ReservationStore, RoomId, RoomStatus, Session,
    StoreConfig,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn day(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn secret(s: &str) -> SecretString {
    SecretString::from(s.to_owned())
}

fn open(backend: Arc<dyn KeyValueBackend>) -> ReservationStore {
    ReservationStore::with_backend(
        backend,
        Arc::new(FixedClock::on(day("2025-06-10"))),
        StoreConfig::default(),
    )
    .unwrap()
}

/// Delegates to memory until `fail` is flipped, then rejects every write.
#[derive(Default)]
struct FlakyBackend {
    inner: MemoryBackend,
    fail: AtomicBool,
}

impl FlakyBackend {
    fn check(&self, key: &str) -> reefdesk_core::error::Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(CoreError::Storage {
                key: key.to_owned(),
                source: std::io::Error::other("disk full"),
            });
        }
        Ok(())
    }
}

impl KeyValueBackend for FlakyBackend {
    fn get(&self, key: &str) -> reefdesk_core::error::Result<Option<String>> {
        self.inner.get(key)
    }

    fn put(&self, key: &str, value: &str) -> reefdesk_core::error::Result<()> {
        self.check(key)?;
        self.inner.put(key, value)
    }

    fn delete(&self, key: &str) -> reefdesk_core::error::Result<()> {
        self.check(key)?;
        self.inner.delete(key)
    }
}

/// Delegates to memory but rejects every write of one key.
struct RejectsKey {
    inner: MemoryBackend,
    key: &'static str,
    armed: AtomicBool,
}

impl RejectsKey {
    fn new(key: &'static str) -> Self {
        Self {
            inner: MemoryBackend::new(),
            key,
            armed: AtomicBool::new(false),
        }
    }
}

impl KeyValueBackend for RejectsKey {
    fn get(&self, key: &str) -> reefdesk_core::error::Result<Option<String>> {
        self.inner.get(key)
    }

    fn put(&self, key: &str, value: &str) -> reefdesk_core::error::Result<()> {
        if key == self.key && self.armed.load(Ordering::SeqCst) {
            return Err(CoreError::Storage {
                key: key.to_owned(),
                source: std::io::Error::other("disk full"),
            });
        }
        self.inner.put(key, value)
    }

    fn delete(&self, key: &str) -> reefdesk_core::error::Result<()> {
        self.inner.delete(key)
    }
}

fn front_desk(store: &mut ReservationStore) -> Session {
    store
        .login("recepcion@pacificreef.cl", &secret("recepcion123"))
        .unwrap()
        .unwrap()
}

fn book_room_one(store: &mut ReservationStore, desk: &Session, email: &str) -> ReservationId {
    store
        .create_reservation(
            desk,
            NewReservation::new(
                Email::new(email),
                RoomId::new(1),
                day("2025-06-10"),
                day("2025-06-12"),
            ),
        )
        .unwrap()
        .id
}

// ── Directory storage ───────────────────────────────────────────────

#[test]
fn directory_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();

    let id = {
        let mut store = ReservationStore::open(StoreConfig::in_directory(dir.path())).unwrap();
        assert!(store.migration().is_fresh());
        let desk = store
            .login("recepcion@pacificreef.cl", &secret("recepcion123"))
            .unwrap()
            .unwrap();
        store
            .create_reservation(
                &desk,
                NewReservation::new(
                    Email::new("ana@test.cl"),
                    RoomId::new(2),
                    day("2030-01-10"),
                    day("2030-01-12"),
                ),
            )
            .unwrap()
            .id
    };
    assert!(dir.path().join("reservations.v1.json").exists());

    let reopened = ReservationStore::open(StoreConfig::in_directory(dir.path())).unwrap();
    assert_eq!(reopened.migration(), MigrationOutcome::UpToDate);
    assert_eq!(reopened.list_rooms().len(), 3);

    let session = reopened.current_session().unwrap();
    assert_eq!(session.email.as_str(), "recepcion@pacificreef.cl");
    let r = reopened.reservation(&session, id).unwrap();
    assert_eq!(r.total, 2 * 78_000);
    assert!(!reopened
        .is_range_available(RoomId::new(2), day("2030-01-11"), day("2030-01-13"), None)
        .unwrap());
}

#[test]
fn logout_is_remembered() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut store = ReservationStore::open(StoreConfig::in_directory(dir.path())).unwrap();
        store.login("admin@pacificreef.cl", &secret("admin123")).unwrap().unwrap();
        store.logout().unwrap();
    }
    let store = ReservationStore::open(StoreConfig::in_directory(dir.path())).unwrap();
    assert!(store.current_session().is_none());
    assert_eq!(store.require_session().unwrap_err().kind(), ErrorKind::Auth);
}

// ── Legacy data ─────────────────────────────────────────────────────

#[test]
fn legacy_documents_are_migrated_on_open() {
    let backend = Arc::new(MemoryBackend::new());
    backend
        .put(
            "rooms.v1",
            r#"[
                {"id": 4, "name": "Old Suite", "type": "premium", "price_per_night": 90000, "available": false},
                {"id": 5, "name": "Old Double", "type": "medium", "price_per_night": 60000}
            ]"#,
        )
        .unwrap();
    backend
        .put(
            "reservations.v1",
            r#"[{
                "id": 3,
                "guest_email": "ana@test.cl",
                "room_id": 5,
                "room_name": "Old Double",
                "room_type": "medium",
                "arrival": "2025-06-20",
                "departure": "2025-06-22",
                "price_per_night": 60000,
                "total": 120000,
                "created_at": "2025-05-01T10:00:00Z"
            }]"#,
        )
        .unwrap();

    let mut store = open(backend.clone());
    assert_eq!(
        store.migration(),
        MigrationOutcome::Migrated {
            from: 0,
            rooms: 2,
            reservations: 1
        }
    );

    // legacy stores are not re-seeded with rooms, only accounts
    let rooms = store.list_rooms();
    assert_eq!(rooms.len(), 2);
    // a missing status is backfilled as available, whatever the old flag said
    assert_eq!(store.room(RoomId::new(4)).unwrap().status(), RoomStatus::Available);
    assert!(store.room(RoomId::new(4)).unwrap().is_available());
    assert!(store.room(RoomId::new(5)).unwrap().is_available());

    let admin = store
        .login("admin@pacificreef.cl", &secret("admin123"))
        .unwrap()
        .unwrap();
    let r = store.reservation(&admin, ReservationId::new(3)).unwrap();
    assert_eq!(r.nights, 2);
    assert_eq!(r.payment_status, PaymentStatus::Paid);
    assert_eq!(r.amount_paid, 120_000);
    assert_eq!(r.guest.full_name, "Guest #3");

    // ids continue after the highest stored one
    let next = store
        .create_reservation(
            &admin,
            NewReservation::new(
                Email::new("bob@test.cl"),
                RoomId::new(5),
                day("2025-06-22"),
                day("2025-06-23"),
            ),
        )
        .unwrap();
    assert_eq!(next.id, ReservationId::new(4));
    assert_eq!(backend.get("schema_version").unwrap().as_deref(), Some("1"));
}

// ── Failure handling ────────────────────────────────────────────────

#[test]
fn failed_persist_leaves_memory_untouched() {
    let backend = Arc::new(FlakyBackend::default());
    let mut store = open(backend.clone());
    let desk = store
        .login("recepcion@pacificreef.cl", &secret("recepcion123"))
        .unwrap()
        .unwrap();
    let mut stream = store.subscribe_reservations();

    backend.fail.store(true, Ordering::SeqCst);
    let err = store
        .create_reservation(
            &desk,
            NewReservation::new(
                Email::new("ana@test.cl"),
                RoomId::new(1),
                day("2025-06-10"),
                day("2025-06-11"),
            ),
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Storage);
    assert!(store.list_reservations(&desk).is_empty());
    assert!(stream.latest().is_empty());

    backend.fail.store(false, Ordering::SeqCst);
    let r = store
        .create_reservation(
            &desk,
            NewReservation::new(
                Email::new("ana@test.cl"),
                RoomId::new(1),
                day("2025-06-10"),
                day("2025-06-11"),
            ),
        )
        .unwrap();
    // the failed attempt did not burn an id
    assert_eq!(r.id, ReservationId::new(1));
    let snap = tokio_test::block_on(stream.changed()).unwrap();
    assert_eq!(snap.len(), 1);
}

#[test]
fn check_in_is_not_half_saved_when_the_log_write_fails() {
    let backend = Arc::new(RejectsKey::new("action_logs.v1"));
    let mut store = open(backend.clone());
    let desk = front_desk(&mut store);
    let id = book_room_one(&mut store, &desk, "ana@test.cl");

    backend.armed.store(true, Ordering::SeqCst);
    let err = store.check_in(&desk, id, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Storage);
    assert!(!store.reservation(&desk, id).unwrap().qr_used);

    backend.armed.store(false, Ordering::SeqCst);
    let reopened = open(backend.clone());
    let desk = reopened.current_session().unwrap();
    assert!(!reopened.reservation(&desk, id).unwrap().qr_used);
    assert_eq!(reopened.room(RoomId::new(1)).unwrap().status(), RoomStatus::Available);
    assert!(reopened.action_logs(&desk).unwrap().is_empty());
}

#[test]
fn directory_check_in_is_not_half_saved() {
    let dir = tempfile::tempdir().unwrap();
    let (id, desk) = {
        let mut store = ReservationStore::open(StoreConfig::in_directory(dir.path())).unwrap();
        let desk = front_desk(&mut store);
        (book_room_one(&mut store, &desk, "ana@test.cl"), desk)
    };

    let squatter = dir.path().join(".action_logs.v1.json.tmp");
    std::fs::create_dir(&squatter).unwrap();
    {
        let mut store = ReservationStore::open(StoreConfig::in_directory(dir.path())).unwrap();
        let err = store.check_in(&desk, id, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Storage);
    }
    std::fs::remove_dir(&squatter).unwrap();

    let reopened = ReservationStore::open(StoreConfig::in_directory(dir.path())).unwrap();
    let desk = reopened.current_session().unwrap();
    assert!(!reopened.reservation(&desk, id).unwrap().qr_used);
    assert_eq!(reopened.room(RoomId::new(1)).unwrap().status(), RoomStatus::Available);
    assert!(reopened.action_logs(&desk).unwrap().is_empty());
    assert!(!dir.path().join(".reservations.v1.json.tmp").exists());
}

// ── Id allocation ───────────────────────────────────────────────────

#[test]
fn deleted_ids_stay_retired_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let payload = {
        let mut store = ReservationStore::open(StoreConfig::in_directory(dir.path())).unwrap();
        let desk = front_desk(&mut store);
        let id = book_room_one(&mut store, &desk, "ana@test.cl");
        let payload = store.reservation(&desk, id).unwrap().qr.clone().unwrap().payload;
        store.remove_reservation(&desk, id).unwrap();
        payload
    };

    let mut store = ReservationStore::open(StoreConfig::in_directory(dir.path())).unwrap();
    let desk = store.current_session().unwrap();
    let bob = book_room_one(&mut store, &desk, "bob@test.cl");
    assert_eq!(bob, ReservationId::new(2));

    let err = store.check_in_by_qr(&desk, &payload, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(!store.reservation(&desk, bob).unwrap().qr_used);
}
