// End-to-end tests for `ReservationStore` over the in-memory backend.
#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use chrono::{Days, NaiveDate};
use pretty_assertions::assert_eq;
use secrecy::SecretString;

use reefdesk_core::{
    CoreError, Email, ErrorKind, FixedClock, MemoryBackend, NewReservation, PaymentMethod,
    PaymentStatus, ReservationStore, RoomId, RoomStatus, Session, StoreConfig, ranges_overlap,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn day(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn secret(s: &str) -> SecretString {
    SecretString::from(s.to_owned())
}

fn open_on(today: &str) -> ReservationStore {
    ReservationStore::with_backend(
        Arc::new(MemoryBackend::new()),
        Arc::new(FixedClock::on(day(today))),
        StoreConfig::default(),
    )
    .unwrap()
}

fn front_desk(store: &mut ReservationStore) -> Session {
    store
        .login("recepcion@pacificreef.cl", &secret("recepcion123"))
        .unwrap()
        .unwrap()
}

fn book(
    store: &mut ReservationStore,
    session: &Session,
    room: u32,
    arrival: NaiveDate,
    departure: NaiveDate,
) -> Result<Arc<reefdesk_core::Reservation>, CoreError> {
    store.create_reservation(
        session,
        NewReservation::new(Email::new("guest@test.cl"), RoomId::new(room), arrival, departure),
    )
}

// ── Scenarios ───────────────────────────────────────────────────────

#[test]
fn guest_books_pays_checks_in_and_out() {
    let mut store = open_on("2025-06-10");

    store.register("maria@test.cl", &secret("Abcdefg1")).unwrap();
    let maria = store.login("maria@test.cl", &secret("Abcdefg1")).unwrap().unwrap();

    let reservation = store
        .create_reservation(
            &maria,
            NewReservation::new(
                Email::new("maria@test.cl"),
                RoomId::new(1),
                day("2025-06-10"),
                day("2025-06-13"),
            ),
        )
        .unwrap();
    assert_eq!(reservation.total, 135_000);

    let desk = front_desk(&mut store);
    assert_eq!(store.check_ins_due(&desk, day("2025-06-10")).unwrap().len(), 1);

    let paid = store
        .register_payment(&desk, reservation.id, 135_000, PaymentMethod::Cash)
        .unwrap();
    assert_eq!(paid.payment_status, PaymentStatus::Paid);
    assert_eq!(paid.percent_paid, 100);

    let payload = paid.qr.as_ref().unwrap().payload.clone();
    store.check_in_by_qr(&desk, &payload, None).unwrap();
    assert_eq!(store.room(RoomId::new(1)).unwrap().status(), RoomStatus::Occupied);
    assert!(store.check_ins_due(&desk, day("2025-06-10")).unwrap().is_empty());

    let err = store.check_in(&desk, reservation.id, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    store.check_out(&desk, reservation.id).unwrap();
    let room = store.room(RoomId::new(1)).unwrap();
    assert_eq!(room.status(), RoomStatus::Cleaning);
    assert!(!room.is_available());

    let actions: Vec<String> = store
        .logs_by_reservation(&desk, reservation.id)
        .unwrap()
        .iter()
        .map(|l| l.action.clone())
        .collect();
    assert_eq!(actions, vec!["Check-out", "Check-in", "Payment received"]);
}

#[test]
fn availability_agrees_with_overlap_for_every_pair() {
    let base = day("2025-09-01");
    let at = |n: u64| base + Days::new(n);
    let offsets = [0_u64, 2, 4, 6];

    for (i, &s1) in offsets.iter().enumerate() {
        for &e1 in &offsets[i + 1..] {
            for (j, &s2) in offsets.iter().enumerate() {
                for &e2 in &offsets[j + 1..] {
                    let mut store = open_on("2025-08-01");
                    let desk = front_desk(&mut store);
                    book(&mut store, &desk, 2, at(s1), at(e1)).unwrap();

                    let free = store
                        .is_range_available(RoomId::new(2), at(s2), at(e2), None)
                        .unwrap();
                    assert_eq!(free, !ranges_overlap(at(s1), at(e1), at(s2), at(e2)));

                    // a different room is never affected
                    assert!(store.is_range_available(RoomId::new(3), at(s2), at(e2), None).unwrap());
                }
            }
        }
    }
}

#[test]
fn reports_reflect_store_state() {
    let mut store = open_on("2025-06-10");
    let desk = front_desk(&mut store);

    let today = day("2025-06-10");
    let a = book(&mut store, &desk, 1, today, day("2025-06-12")).unwrap();
    book(&mut store, &desk, 2, today, day("2025-06-11")).unwrap();
    book(&mut store, &desk, 1, day("2025-07-01"), day("2025-07-02")).unwrap();
    store.check_in(&desk, a.id, None).unwrap();

    let reports = store.reports(&desk).unwrap();
    let summary = reports.check_in_summary(None);
    assert_eq!((summary.total, summary.done, summary.pending), (2, 1, 1));
    assert_eq!(reports.pending_payments().len(), 2);
    assert!(reports.overbookings().is_empty());
    assert_eq!(reports.reservations_this_month(), 2);
    assert_eq!(reports.totals_by_month().len(), 2);
    assert_eq!(reports.top_rooms(10)[0].room_id, RoomId::new(1));
    assert_eq!(reports.upcoming_check_ins(None).len(), 1);
    assert_eq!(reports.upcoming_check_ins(Some(30)).len(), 2);

    let occupied = reports
        .room_status_histogram()
        .into_iter()
        .find(|c| c.status == RoomStatus::Occupied)
        .unwrap();
    assert_eq!(occupied.rooms, 1);
}

#[test]
fn guests_cannot_read_reports_or_logs() {
    let mut store = open_on("2025-06-10");
    store.register("ana@test.cl", &secret("Secure123")).unwrap();
    let ana = store.login("ana@test.cl", &secret("Secure123")).unwrap().unwrap();

    assert!(matches!(store.reports(&ana), Err(CoreError::Forbidden { .. })));
    assert_eq!(store.action_logs(&ana).unwrap_err().kind(), ErrorKind::Auth);
}

#[test]
fn deleting_a_user_cascades_reservations() {
    let mut store = open_on("2025-06-10");
    let desk = front_desk(&mut store);
    book(&mut store, &desk, 1, day("2025-06-20"), day("2025-06-22")).unwrap();
    store.register("guest@test.cl", &secret("Secure123")).unwrap();

    let admin = store
        .login("admin@pacificreef.cl", &secret("admin123"))
        .unwrap()
        .unwrap();
    let removed = store.delete_user(&admin, &Email::new("guest@test.cl")).unwrap();
    assert_eq!(removed, 1);
    assert!(store.list_reservations(&admin).is_empty());
    assert!(store
        .is_range_available(RoomId::new(1), day("2025-06-20"), day("2025-06-22"), None)
        .unwrap());
}

#[test]
fn reservation_stream_sees_bookings() {
    let mut store = open_on("2025-06-10");
    let desk = front_desk(&mut store);
    let mut stream = store.subscribe_reservations();
    assert!(stream.current().is_empty());

    book(&mut store, &desk, 3, day("2025-06-15"), day("2025-06-17")).unwrap();
    let snap = tokio_test::block_on(stream.changed()).unwrap();
    assert_eq!(snap.len(), 1);
    assert_eq!(snap[0].nights, 2);
}
