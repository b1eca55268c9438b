// ── Reservation lifecycle: booking, edits, QR, and queries ──

use std::cmp::Reverse;
use std::sync::Arc;

use chrono::NaiveDate;

use super::ReservationStore;
use crate::access::{Capability, Session, authorize, authorize_reservation};
use crate::availability::{DateRange, is_range_available};
use crate::credentials::validate_email;
use crate::error::{CoreError, Result};
use crate::model::{
    ActionDetails, ActionLog, Email, GuestDetails, PaymentStatus, QrToken, Reservation,
    ReservationId, RoomId,
};
use crate::qr;
use crate::requests::NewReservation;

/// Upper bound on free-text search results.
pub const SEARCH_LIMIT: usize = 10;

impl ReservationStore {
    /// True iff no reservation on `room_id` other than `exclude` overlaps
    /// `[arrival, departure)`. An empty or inverted range is a validation error.
    pub fn is_range_available(
        &self,
        room_id: RoomId,
        arrival: NaiveDate,
        departure: NaiveDate,
        exclude: Option<ReservationId>,
    ) -> Result<bool> {
        let range = DateRange::new(arrival, departure)?;
        Ok(is_range_available(
            self.state.reservations.values().map(AsRef::as_ref),
            room_id,
            &range,
            exclude,
        ))
    }

    /// Book a room. The reservation starts `pending` unless the request
    /// carries an initial payment, and gets its confirmation QR payload.
    pub fn create_reservation(&mut self, session: &Session, request: NewReservation) -> Result<Arc<Reservation>> {
        authorize(session, Capability::Book)?;
        if request.guest_email != session.email {
            authorize(session, Capability::ManageAnyReservation)?;
        }
        validate_email(&request.guest_email)?;
        let range = DateRange::new(request.arrival, request.departure)?;
        let room = self.room(request.room_id)?;

        let duplicate = self.state.reservations.values().any(|r| {
            r.room_id == request.room_id
                && r.arrival == request.arrival
                && r.departure == request.departure
                && r.guest_email == request.guest_email
        });
        if duplicate {
            return Err(CoreError::DuplicateReservation);
        }
        if !self.is_range_available(room.id, range.arrival, range.departure, None)? {
            tracing::debug!(room_id = %room.id, arrival = %range.arrival, departure = %range.departure, "range taken");
            return Err(CoreError::RoomUnavailable {
                room_id: room.id,
                arrival: range.arrival,
                departure: range.departure,
            });
        }

        let nights = range.nights();
        let total = u64::from(nights)
            .checked_mul(room.price_per_night)
            .ok_or_else(|| CoreError::validation("total", "stay too long for this room price"))?;

        let staff = session.email.clone();
        let session_id = session.id;
        let reservation = self.transact(|state, now| {
            let id = state.allocate_reservation_id();
            let guest = request
                .guest
                .unwrap_or_else(|| GuestDetails::placeholder(id, request.guest_email.clone()));
            let mut reservation = Reservation {
                id,
                guest_email: request.guest_email,
                room_id: room.id,
                room_name: room.name.clone(),
                room_type: room.room_type,
                arrival: range.arrival,
                departure: range.departure,
                nights,
                price_per_night: room.price_per_night,
                total,
                created_at: now,
                payment_status: PaymentStatus::Pending,
                percent_paid: 0,
                amount_paid: 0,
                qr_used: false,
                qr: None,
                revoked_qr: Vec::new(),
                check_in: None,
                check_out: None,
                guest,
                notes: request.notes,
            };
            if let Some(payment) = request.initial_payment {
                reservation.apply_payment(payment.amount);
                state.append_log(ActionLog {
                    staff,
                    action: "Payment received".into(),
                    timestamp: now,
                    session_id: Some(session_id),
                    reservation_id: Some(id),
                    details: Some(ActionDetails::Payment {
                        amount: payment.amount,
                        method: payment.method,
                        percent_paid: reservation.percent_paid,
                    }),
                });
            }
            reservation.qr = Some(QrToken {
                payload: qr::confirmation_payload(&reservation),
                image: None,
                issued_at: now,
            });
            state.reservations.upsert(id, reservation);
            state
                .reservations
                .get_by_key(&id)
                .ok_or_else(|| CoreError::not_found("Reservation", id))
        })?;

        tracing::info!(
            reservation_id = %reservation.id,
            room_id = %reservation.room_id,
            guest = %reservation.guest_email,
            nights,
            total,
            "reservation created"
        );
        Ok(reservation)
    }

    /// Associate a scannable token (and its rendered image) with a
    /// reservation. The payload must embed the reservation's own id.
    pub fn attach_qr(
        &mut self,
        session: &Session,
        id: ReservationId,
        payload: String,
        image: Option<String>,
    ) -> Result<Arc<Reservation>> {
        let current = self.reservation(session, id)?;
        if qr::extract_reservation_id(&payload) != Some(id) {
            return Err(CoreError::validation("qr", format!("payload does not reference reservation #{id}")));
        }
        if current.qr_used {
            return Err(CoreError::QrAlreadyUsed);
        }

        self.transact(|state, now| {
            let mut updated = (*current).clone();
            updated.qr = Some(QrToken {
                payload,
                image,
                issued_at: now,
            });
            state.reservations.upsert(id, updated);
            state
                .reservations
                .get_by_key(&id)
                .ok_or_else(|| CoreError::not_found("Reservation", id))
        })
    }

    /// Issue a fresh payload for an unconsumed QR and revoke the old one.
    /// Scanning the old payload afterwards fails with
    /// [`CoreError::QrReissued`].
    pub fn reissue_qr(&mut self, session: &Session, id: ReservationId) -> Result<Arc<Reservation>> {
        authorize(session, Capability::FrontDesk)?;
        let current = self.find_reservation(id)?;
        if current.qr_used {
            return Err(CoreError::Conflict {
                message: format!("QR for reservation #{id} was already used at check-in"),
            });
        }

        let staff = session.email.clone();
        let session_id = session.id;
        let reservation = self.transact(|state, now| {
            let mut updated = (*current).clone();
            let payload = qr::reissue_payload(id, now);
            if let Some(old) = updated.qr.take().filter(|old| old.payload.trim() != payload) {
                updated.revoked_qr.push(old.payload);
            }
            updated.qr = Some(QrToken {
                payload,
                image: None,
                issued_at: now,
            });
            state.reservations.upsert(id, updated);
            state.append_log(ActionLog {
                staff,
                action: "QR reissued".into(),
                timestamp: now,
                session_id: Some(session_id),
                reservation_id: Some(id),
                details: Some(ActionDetails::QrReissued),
            });
            state
                .reservations
                .get_by_key(&id)
                .ok_or_else(|| CoreError::not_found("Reservation", id))
        })?;
        tracing::info!(reservation_id = %id, "QR reissued");
        Ok(reservation)
    }

    /// Resolve a scanned payload to its reservation: exact match on a
    /// stored payload first, then an id embedded in the text. A payload
    /// revoked by a reissue is refused even though it still names an id.
    pub fn resolve_qr(&self, session: &Session, payload: &str) -> Result<Arc<Reservation>> {
        authorize(session, Capability::FrontDesk)?;
        let trimmed = payload.trim();
        if let Some(found) = self
            .state
            .reservations
            .values()
            .find(|r| r.qr.as_ref().is_some_and(|q| q.payload.trim() == trimmed))
        {
            return Ok(Arc::clone(found));
        }
        if let Some(revoked) = self.state.reservations.values().find(|r| r.is_revoked_qr(trimmed)) {
            tracing::warn!(reservation_id = %revoked.id, staff = %session.email, "scan of reissued QR");
            return Err(CoreError::QrReissued {
                id: revoked.id.to_string(),
            });
        }
        let id = qr::extract_reservation_id(trimmed)
            .ok_or_else(|| CoreError::validation("qr", "payload does not contain a reservation id"))?;
        self.find_reservation(id)
    }

    /// Move a stay to new dates, keeping the booked nightly price.
    pub fn update_reservation_dates(
        &mut self,
        session: &Session,
        id: ReservationId,
        arrival: NaiveDate,
        departure: NaiveDate,
    ) -> Result<Arc<Reservation>> {
        let current = self.reservation(session, id)?;
        if current.qr_used {
            return Err(CoreError::Conflict {
                message: format!("reservation #{id} has already been checked in"),
            });
        }
        let range = DateRange::new(arrival, departure)?;
        if !self.is_range_available(current.room_id, arrival, departure, Some(id))? {
            return Err(CoreError::RoomUnavailable {
                room_id: current.room_id,
                arrival,
                departure,
            });
        }

        let nights = range.nights();
        let total = u64::from(nights)
            .checked_mul(current.price_per_night)
            .ok_or_else(|| CoreError::validation("total", "stay too long for this room price"))?;

        let reservation = self.transact(|state, _| {
            let mut updated = (*current).clone();
            updated.arrival = arrival;
            updated.departure = departure;
            updated.nights = nights;
            updated.total = total;
            let paid = updated.amount_paid;
            updated.apply_payment(paid);
            state.reservations.upsert(id, updated);
            state
                .reservations
                .get_by_key(&id)
                .ok_or_else(|| CoreError::not_found("Reservation", id))
        })?;
        tracing::info!(reservation_id = %id, %arrival, %departure, total, "reservation dates changed");
        Ok(reservation)
    }

    pub fn remove_reservation(&mut self, session: &Session, id: ReservationId) -> Result<Arc<Reservation>> {
        self.reservation(session, id)?;
        let removed = self.transact(|state, _| {
            state
                .reservations
                .remove(&id)
                .ok_or_else(|| CoreError::not_found("Reservation", id))
        })?;
        tracing::info!(reservation_id = %id, "reservation removed");
        Ok(removed)
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// A single reservation visible to `session`.
    pub fn reservation(&self, session: &Session, id: ReservationId) -> Result<Arc<Reservation>> {
        let found = self.find_reservation(id)?;
        authorize_reservation(session, &found)?;
        Ok(found)
    }

    /// Newest first. Guests only see their own bookings.
    pub fn list_reservations(&self, session: &Session) -> Vec<Arc<Reservation>> {
        let mut out: Vec<Arc<Reservation>> = self
            .state
            .reservations
            .values()
            .filter(|r| session.owns_or_manages(r))
            .cloned()
            .collect();
        sort_newest_first(&mut out);
        out
    }

    /// Newest first.
    pub fn reservations_by_email(&self, session: &Session, email: &Email) -> Result<Vec<Arc<Reservation>>> {
        if email != &session.email {
            authorize(session, Capability::ManageAnyReservation)?;
        }
        let mut out: Vec<Arc<Reservation>> = self
            .state
            .reservations
            .values()
            .filter(|r| &r.guest_email == email)
            .cloned()
            .collect();
        sort_newest_first(&mut out);
        Ok(out)
    }

    /// Reservations arriving or departing on `day`.
    pub fn reservations_for_day(&self, session: &Session, day: NaiveDate) -> Result<Vec<Arc<Reservation>>> {
        authorize(session, Capability::ManageAnyReservation)?;
        Ok(self
            .state
            .reservations
            .values()
            .filter(|r| r.arrival == day || r.departure == day)
            .cloned()
            .collect())
    }

    /// Arrivals on `day` whose QR has not been consumed yet.
    pub fn check_ins_due(&self, session: &Session, day: NaiveDate) -> Result<Vec<Arc<Reservation>>> {
        authorize(session, Capability::FrontDesk)?;
        Ok(self
            .state
            .reservations
            .values()
            .filter(|r| r.arrival == day && !r.qr_used)
            .cloned()
            .collect())
    }

    /// Case-insensitive match on id, guest name, guest email, or room
    /// name. At most [`SEARCH_LIMIT`] results, newest first.
    pub fn search_reservations(&self, session: &Session, query: &str) -> Result<Vec<Arc<Reservation>>> {
        authorize(session, Capability::FrontDesk)?;
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        let id = needle.parse::<ReservationId>().ok();

        let mut out: Vec<Arc<Reservation>> = self
            .state
            .reservations
            .values()
            .rev()
            .filter(|r| {
                Some(r.id) == id
                    || r.guest.full_name.to_lowercase().contains(&needle)
                    || r.guest_email.as_str().contains(&needle)
                    || r.room_name.to_lowercase().contains(&needle)
            })
            .take(SEARCH_LIMIT)
            .cloned()
            .collect();
        sort_newest_first(&mut out);
        Ok(out)
    }

    pub(super) fn find_reservation(&self, id: ReservationId) -> Result<Arc<Reservation>> {
        self.state
            .reservations
            .get_by_key(&id)
            .ok_or_else(|| CoreError::not_found("Reservation", id))
    }
}

fn sort_newest_first(reservations: &mut [Arc<Reservation>]) {
    reservations.sort_by_key(|r| Reverse((r.created_at, r.id)));
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::super::test_support::*;
    use crate::error::{CoreError, ErrorKind};
    use crate::model::{Email, PaymentMethod, PaymentStatus, ReservationId, RoomId};
    use crate::qr::extract_reservation_id;
    use crate::requests::{NewReservation, RoomDraft};

    fn booking(email: &str, room: u32, arrival: &str, departure: &str) -> NewReservation {
        NewReservation::new(Email::new(email), RoomId::new(room), day(arrival), day(departure))
    }

    #[test]
    fn basic_room_three_nights() {
        let mut store = store_on("2025-06-01");
        let ana = guest(&mut store, "ana@test.cl");

        let r = store
            .create_reservation(&ana, booking("ana@test.cl", 1, "2025-06-10", "2025-06-13"))
            .unwrap();
        assert_eq!(r.nights, 3);
        assert_eq!(r.total, 135_000);
        assert_eq!(r.payment_status, PaymentStatus::Pending);
        assert_eq!(r.room_name, "Basic Garden View");

        let overlap = store
            .create_reservation(&ana, booking("ana@test.cl", 1, "2025-06-12", "2025-06-15"))
            .unwrap_err();
        assert!(matches!(overlap, CoreError::RoomUnavailable { .. }));
        assert_eq!(overlap.kind(), ErrorKind::Conflict);

        let touching = store
            .create_reservation(&ana, booking("ana@test.cl", 1, "2025-06-13", "2025-06-15"))
            .unwrap();
        assert_eq!(touching.nights, 2);
    }

    #[test]
    fn confirmation_qr_is_issued_with_embedded_id() {
        let mut store = store_on("2025-06-01");
        let ana = guest(&mut store, "ana@test.cl");
        let r = store
            .create_reservation(&ana, booking("ana@test.cl", 2, "2025-06-10", "2025-06-11"))
            .unwrap();
        let qr = r.qr.as_ref().unwrap();
        assert!(qr.payload.starts_with("HOTEL PACIFIC REEF\nReservation #1\n"));
        assert_eq!(extract_reservation_id(&qr.payload), Some(r.id));
    }

    #[test]
    fn initial_payment_sets_partial() {
        let mut store = store_on("2025-06-01");
        let ana = guest(&mut store, "ana@test.cl");
        let r = store
            .create_reservation(
                &ana,
                booking("ana@test.cl", 1, "2025-06-10", "2025-06-13").with_payment(40_500, PaymentMethod::Card),
            )
            .unwrap();
        assert_eq!(r.payment_status, PaymentStatus::Partial);
        assert_eq!(r.percent_paid, 30);
    }

    #[test]
    fn exact_duplicate_is_rejected_before_overlap() {
        let mut store = store_on("2025-06-01");
        let ana = guest(&mut store, "ana@test.cl");
        let request = booking("ana@test.cl", 1, "2025-06-10", "2025-06-13");
        store.create_reservation(&ana, request.clone()).unwrap();
        let err = store.create_reservation(&ana, request).unwrap_err();
        assert!(matches!(err, CoreError::DuplicateReservation));
    }

    #[test]
    fn invalid_range_and_unknown_room() {
        let mut store = store_on("2025-06-01");
        let ana = guest(&mut store, "ana@test.cl");
        let err = store
            .create_reservation(&ana, booking("ana@test.cl", 1, "2025-06-10", "2025-06-10"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = store
            .create_reservation(&ana, booking("ana@test.cl", 77, "2025-06-10", "2025-06-11"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn guests_cannot_book_for_others_but_staff_can() {
        let mut store = store_on("2025-06-01");
        let ana = guest(&mut store, "ana@test.cl");
        let err = store
            .create_reservation(&ana, booking("bob@test.cl", 1, "2025-06-10", "2025-06-11"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Auth);

        let staff = staff(&mut store);
        assert!(store
            .create_reservation(&staff, booking("walkin@test.cl", 1, "2025-06-10", "2025-06-11"))
            .is_ok());
    }

    #[test]
    fn create_remove_create_leaves_no_lock() {
        let mut store = store_on("2025-06-01");
        let ana = guest(&mut store, "ana@test.cl");
        let request = booking("ana@test.cl", 3, "2025-08-01", "2025-08-05");

        let first = store.create_reservation(&ana, request.clone()).unwrap();
        store.remove_reservation(&ana, first.id).unwrap();
        let second = store.create_reservation(&ana, request).unwrap();
        assert_eq!(second.total, first.total);
    }

    #[test]
    fn date_edit_keeps_snapshot_price() {
        let mut store = store_on("2025-06-01");
        let ana = guest(&mut store, "ana@test.cl");
        let r = store
            .create_reservation(&ana, booking("ana@test.cl", 1, "2025-06-10", "2025-06-13"))
            .unwrap();

        let admin = admin(&mut store);
        let mut repriced = RoomDraft::from(store.room(RoomId::new(1)).unwrap().as_ref());
        repriced.price_per_night = 99_000;
        store.upsert_room(&admin, repriced).unwrap();

        let moved = store
            .update_reservation_dates(&ana, r.id, day("2025-06-20"), day("2025-06-24"))
            .unwrap();
        assert_eq!(moved.nights, 4);
        assert_eq!(moved.total, 4 * 45_000);
        assert_eq!(moved.price_per_night, 45_000);
    }

    #[test]
    fn date_edit_excludes_itself_but_not_others() {
        let mut store = store_on("2025-06-01");
        let ana = guest(&mut store, "ana@test.cl");
        let a = store
            .create_reservation(&ana, booking("ana@test.cl", 1, "2025-06-10", "2025-06-13"))
            .unwrap();
        store
            .create_reservation(&ana, booking("ana@test.cl", 1, "2025-06-20", "2025-06-22"))
            .unwrap();

        // shifting onto its own nights is fine
        assert!(store
            .update_reservation_dates(&ana, a.id, day("2025-06-11"), day("2025-06-14"))
            .is_ok());
        // colliding with the second booking is not
        let err = store
            .update_reservation_dates(&ana, a.id, day("2025-06-18"), day("2025-06-21"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        // nor is an inverted range
        let err = store
            .update_reservation_dates(&ana, a.id, day("2025-06-18"), day("2025-06-17"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn guests_see_only_their_own_newest_first() {
        let mut store = store_on("2025-06-01");
        let ana = guest(&mut store, "ana@test.cl");
        store
            .create_reservation(&ana, booking("ana@test.cl", 1, "2025-06-10", "2025-06-11"))
            .unwrap();
        store
            .create_reservation(&ana, booking("ana@test.cl", 2, "2025-06-10", "2025-06-11"))
            .unwrap();
        let bob = guest(&mut store, "bob@test.cl");
        store
            .create_reservation(&bob, booking("bob@test.cl", 3, "2025-06-10", "2025-06-11"))
            .unwrap();

        let ids: Vec<u64> = store.list_reservations(&ana).iter().map(|r| r.id.get()).collect();
        assert_eq!(ids, vec![2, 1]);
        assert_eq!(store.reservation(&bob, ReservationId::new(1)).unwrap_err().kind(), ErrorKind::Auth);

        let staff = staff(&mut store);
        assert_eq!(store.list_reservations(&staff).len(), 3);
    }

    #[test]
    fn search_matches_name_email_room_and_id() {
        let mut store = store_on("2025-06-01");
        let staff = staff(&mut store);
        for (i, email) in ["ana@test.cl", "bob@test.cl"].iter().enumerate() {
            let room = u32::try_from(i).unwrap() + 1;
            store
                .create_reservation(&staff, booking(email, room, "2025-06-10", "2025-06-12"))
                .unwrap();
        }

        assert_eq!(store.search_reservations(&staff, "BOB").unwrap().len(), 1);
        assert_eq!(store.search_reservations(&staff, "partial sea").unwrap().len(), 1);
        assert_eq!(store.search_reservations(&staff, "guest #1").unwrap()[0].id, ReservationId::new(1));
        assert_eq!(store.search_reservations(&staff, "2").unwrap()[0].id, ReservationId::new(2));
        assert!(store.search_reservations(&staff, "   ").unwrap().is_empty());
    }

    #[test]
    fn search_is_capped() {
        let mut store = store_on("2025-06-01");
        let staff = staff(&mut store);
        let start = day("2025-07-01");
        for n in 0..12 {
            let arrival = start + chrono::Days::new(n * 2);
            let departure = arrival + chrono::Days::new(1);
            store
                .create_reservation(
                    &staff,
                    NewReservation::new(Email::new("ana@test.cl"), RoomId::new(1), arrival, departure),
                )
                .unwrap();
        }
        assert_eq!(store.search_reservations(&staff, "ana").unwrap().len(), 10);
    }

    #[test]
    fn resolve_qr_by_exact_payload_or_embedded_id() {
        let mut store = store_on("2025-06-01");
        let staff = staff(&mut store);
        let r = store
            .create_reservation(&staff, booking("ana@test.cl", 1, "2025-06-10", "2025-06-11"))
            .unwrap();
        let payload = r.qr.as_ref().unwrap().payload.clone();

        assert_eq!(store.resolve_qr(&staff, &payload).unwrap().id, r.id);
        assert_eq!(store.resolve_qr(&staff, "Reservation #1").unwrap().id, r.id);
        assert_eq!(
            store.resolve_qr(&staff, r#"{"reservation_id":1}"#).unwrap().id,
            r.id
        );
        assert_eq!(store.resolve_qr(&staff, "no id").unwrap_err().kind(), ErrorKind::Validation);
        assert_eq!(store.resolve_qr(&staff, "Reservation #9").unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn attach_qr_requires_matching_id() {
        let mut store = store_on("2025-06-01");
        let ana = guest(&mut store, "ana@test.cl");
        let r = store
            .create_reservation(&ana, booking("ana@test.cl", 1, "2025-06-10", "2025-06-11"))
            .unwrap();

        let err = store
            .attach_qr(&ana, r.id, "Reservation #5".into(), None)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let updated = store
            .attach_qr(&ana, r.id, "Reservation #1".into(), Some("data:image/png;base64,AAAA".into()))
            .unwrap();
        assert_eq!(updated.qr.as_ref().unwrap().image.as_deref(), Some("data:image/png;base64,AAAA"));

        let err = store
            .attach_qr(&ana, ReservationId::new(40), "Reservation #40".into(), None)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn reissue_changes_payload() {
        let mut store = store_on("2025-06-01");
        let staff = staff(&mut store);
        let r = store
            .create_reservation(&staff, booking("ana@test.cl", 1, "2025-06-10", "2025-06-11"))
            .unwrap();
        let old = r.qr.as_ref().unwrap().payload.clone();

        let reissued = store.reissue_qr(&staff, r.id).unwrap();
        let new = reissued.qr.as_ref().unwrap().payload.clone();
        assert_ne!(old, new);
        assert_eq!(store.resolve_qr(&staff, &new).unwrap().id, r.id);
        assert_eq!(reissued.revoked_qr, vec![old]);
    }

    #[test]
    fn reissued_payload_no_longer_resolves() {
        let mut store = store_on("2025-06-01");
        let staff = staff(&mut store);
        let r = store
            .create_reservation(&staff, booking("ana@test.cl", 1, "2025-06-10", "2025-06-11"))
            .unwrap();
        let old = r.qr.as_ref().unwrap().payload.clone();
        store.reissue_qr(&staff, r.id).unwrap();

        let err = store.resolve_qr(&staff, &old).unwrap_err();
        assert!(matches!(err, CoreError::QrReissued { .. }));
        assert_eq!(err.kind(), ErrorKind::Conflict);
        // scanners may add surrounding whitespace
        let padded = format!("  {old}\n");
        assert!(matches!(
            store.resolve_qr(&staff, &padded).unwrap_err(),
            CoreError::QrReissued { .. }
        ));
        let err = store.check_in_by_qr(&staff, &old, None).unwrap_err();
        assert!(matches!(err, CoreError::QrReissued { .. }));
        assert!(!store.reservation(&staff, r.id).unwrap().qr_used);

        // a hand-typed reference that only carries the id still works
        assert_eq!(store.resolve_qr(&staff, "Reservation #1").unwrap().id, r.id);
    }

    #[test]
    fn deleted_reservation_ids_are_not_reused() {
        let mut store = store_on("2025-06-01");
        let staff = staff(&mut store);
        let ana = store
            .create_reservation(&staff, booking("ana@test.cl", 1, "2025-06-10", "2025-06-11"))
            .unwrap();
        let old = ana.qr.as_ref().unwrap().payload.clone();
        store.remove_reservation(&staff, ana.id).unwrap();

        let bob = store
            .create_reservation(&staff, booking("bob@test.cl", 3, "2025-06-10", "2025-06-11"))
            .unwrap();
        assert_eq!(bob.id, ReservationId::new(2));

        let err = store.resolve_qr(&staff, &old).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        let err = store.check_in_by_qr(&staff, &old, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(!store.reservation(&staff, bob.id).unwrap().qr_used);
    }

    #[test]
    fn partial_payment_survives_a_date_edit() {
        let mut store = store_on("2025-06-01");
        let staff = staff(&mut store);
        let r = store
            .create_reservation(
                &staff,
                booking("ana@test.cl", 1, "2025-06-10", "2025-06-13")
                    .with_payment(45_000, PaymentMethod::Cash),
            )
            .unwrap();
        assert_eq!(r.percent_paid, 33);

        let moved = store
            .update_reservation_dates(&staff, r.id, day("2025-06-10"), day("2025-06-12"))
            .unwrap();
        assert_eq!(moved.amount_paid, 45_000);
        assert_eq!(moved.percent_paid, 50);
        assert_eq!(moved.payment_status, PaymentStatus::Partial);
    }
}
