// ── Front-desk operations and audit trail ──

use std::sync::Arc;

use super::ReservationStore;
use crate::access::{Capability, Session, authorize};
use crate::error::{CoreError, Result};
use crate::model::{
    ActionDetails, ActionLog, DeskStamp, Email, PaymentMethod, Reservation, ReservationId,
    RoomId, RoomStatus,
};
use crate::store::DataStore;

impl ReservationStore {
    /// Consume the reservation's QR, stamp the arrival, and mark the room
    /// occupied. A second check-in always fails with [`CoreError::QrAlreadyUsed`].
    pub fn check_in(
        &mut self,
        session: &Session,
        id: ReservationId,
        notes: Option<String>,
    ) -> Result<Arc<Reservation>> {
        authorize(session, Capability::FrontDesk)?;
        let current = self.find_reservation(id)?;
        if current.qr_used {
            tracing::warn!(reservation_id = %id, staff = %session.email, "check-in with used QR");
            return Err(CoreError::QrAlreadyUsed);
        }

        let staff = session.email.clone();
        let session_id = session.id;
        let reservation = self.transact(|state, now| {
            let mut updated = (*current).clone();
            updated.qr_used = true;
            updated.check_in = Some(DeskStamp {
                at: now,
                staff: staff.clone(),
            });
            if let Some(extra) = notes.as_deref().filter(|n| !n.trim().is_empty()) {
                updated.notes = Some(match updated.notes.take() {
                    Some(existing) => format!("{existing}\n{extra}"),
                    None => extra.to_owned(),
                });
            }
            let room_id = updated.room_id;
            state.reservations.upsert(id, updated);
            set_status_if_present(state, room_id, RoomStatus::Occupied);
            state.append_log(ActionLog {
                staff,
                action: "Check-in".into(),
                timestamp: now,
                session_id: Some(session_id),
                reservation_id: Some(id),
                details: Some(ActionDetails::CheckIn { room_id, notes }),
            });
            state
                .reservations
                .get_by_key(&id)
                .ok_or_else(|| CoreError::not_found("Reservation", id))
        })?;

        tracing::info!(reservation_id = %id, room_id = %reservation.room_id, staff = %session.email, "checked in");
        Ok(reservation)
    }

    /// Resolve a scanned payload and check that reservation in.
    pub fn check_in_by_qr(
        &mut self,
        session: &Session,
        payload: &str,
        notes: Option<String>,
    ) -> Result<Arc<Reservation>> {
        let id = self.resolve_qr(session, payload)?.id;
        self.check_in(session, id, notes)
    }

    /// Stamp the departure and send the room to cleaning.
    pub fn check_out(&mut self, session: &Session, id: ReservationId) -> Result<Arc<Reservation>> {
        authorize(session, Capability::FrontDesk)?;
        let current = self.find_reservation(id)?;
        if !current.is_checked_in() {
            return Err(CoreError::NotCheckedIn { id: id.to_string() });
        }
        if current.is_checked_out() {
            return Err(CoreError::AlreadyCheckedOut { id: id.to_string() });
        }

        let staff = session.email.clone();
        let session_id = session.id;
        let reservation = self.transact(|state, now| {
            let mut updated = (*current).clone();
            updated.check_out = Some(DeskStamp {
                at: now,
                staff: staff.clone(),
            });
            let room_id = updated.room_id;
            state.reservations.upsert(id, updated);
            set_status_if_present(state, room_id, RoomStatus::Cleaning);
            state.append_log(ActionLog {
                staff,
                action: "Check-out".into(),
                timestamp: now,
                session_id: Some(session_id),
                reservation_id: Some(id),
                details: Some(ActionDetails::CheckOut { room_id }),
            });
            state
                .reservations
                .get_by_key(&id)
                .ok_or_else(|| CoreError::not_found("Reservation", id))
        })?;

        tracing::info!(reservation_id = %id, room_id = %reservation.room_id, staff = %session.email, "checked out");
        Ok(reservation)
    }

    /// Record a payment. `amount` is what the guest has paid towards the
    /// stay so far; percent and status are derived from it.
    pub fn register_payment(
        &mut self,
        session: &Session,
        id: ReservationId,
        amount: u64,
        method: PaymentMethod,
    ) -> Result<Arc<Reservation>> {
        authorize(session, Capability::FrontDesk)?;
        let current = self.find_reservation(id)?;

        let staff = session.email.clone();
        let session_id = session.id;
        let reservation = self.transact(|state, now| {
            let mut updated = (*current).clone();
            updated.apply_payment(amount);
            let percent_paid = updated.percent_paid;
            state.reservations.upsert(id, updated);
            state.append_log(ActionLog {
                staff,
                action: "Payment received".into(),
                timestamp: now,
                session_id: Some(session_id),
                reservation_id: Some(id),
                details: Some(ActionDetails::Payment {
                    amount,
                    method,
                    percent_paid,
                }),
            });
            state
                .reservations
                .get_by_key(&id)
                .ok_or_else(|| CoreError::not_found("Reservation", id))
        })?;

        tracing::info!(
            reservation_id = %id,
            amount,
            %method,
            percent_paid = reservation.percent_paid,
            status = %reservation.payment_status,
            "payment registered"
        );
        Ok(reservation)
    }

    // ── Audit trail ──────────────────────────────────────────────────

    /// Every log entry, newest first.
    pub fn action_logs(&self, session: &Session) -> Result<Vec<Arc<ActionLog>>> {
        authorize(session, Capability::ViewAuditLog)?;
        Ok(self.state.action_logs.iter().rev().cloned().collect())
    }

    pub fn logs_by_staff(&self, session: &Session, staff: &Email) -> Result<Vec<Arc<ActionLog>>> {
        authorize(session, Capability::ViewAuditLog)?;
        Ok(self
            .state
            .action_logs
            .iter()
            .rev()
            .filter(|l| &l.staff == staff)
            .cloned()
            .collect())
    }

    pub fn logs_by_reservation(&self, session: &Session, id: ReservationId) -> Result<Vec<Arc<ActionLog>>> {
        authorize(session, Capability::ViewAuditLog)?;
        Ok(self
            .state
            .action_logs
            .iter()
            .rev()
            .filter(|l| l.reservation_id == Some(id))
            .cloned()
            .collect())
    }
}

/// Rooms may have been deleted since booking; the stay still proceeds.
fn set_status_if_present(state: &mut DataStore, room_id: RoomId, status: RoomStatus) {
    let Some(room) = state.rooms.get_by_key(&room_id) else {
        tracing::debug!(%room_id, "room no longer exists, status unchanged");
        return;
    };
    let mut updated = (*room).clone();
    updated.set_status(status);
    state.rooms.upsert(room_id, updated);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::super::test_support::*;
    use crate::access::Session;
    use crate::error::{CoreError, ErrorKind};
    use crate::model::{
        ActionDetails, Email, PaymentMethod, PaymentStatus, ReservationId, RoomId, RoomStatus,
    };
    use crate::reservation_store::ReservationStore;
    use crate::requests::NewReservation;

    fn booked(store: &mut ReservationStore, staff: &Session) -> ReservationId {
        store
            .create_reservation(
                staff,
                NewReservation::new(
                    Email::new("ana@test.cl"),
                    RoomId::new(1),
                    day("2025-06-10"),
                    day("2025-06-13"),
                ),
            )
            .unwrap()
            .id
    }

    #[test]
    fn check_in_is_single_use() {
        let mut store = store_on("2025-06-10");
        let staff = staff(&mut store);
        let id = booked(&mut store, &staff);

        let r = store.check_in(&staff, id, Some("late arrival".into())).unwrap();
        assert!(r.qr_used);
        assert_eq!(r.check_in.as_ref().unwrap().staff, staff.email);
        assert_eq!(r.notes.as_deref(), Some("late arrival"));
        assert_eq!(store.room(RoomId::new(1)).unwrap().status(), RoomStatus::Occupied);

        let err = store.check_in(&staff, id, None).unwrap_err();
        assert!(matches!(err, CoreError::QrAlreadyUsed));
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(store.logs_by_reservation(&staff, id).unwrap().len(), 1);
    }

    #[test]
    fn check_in_by_scanned_payload() {
        let mut store = store_on("2025-06-10");
        let staff = staff(&mut store);
        let id = booked(&mut store, &staff);

        let r = store
            .check_in_by_qr(&staff, "HOTEL PACIFIC REEF\nReservation #1\n...", None)
            .unwrap();
        assert_eq!(r.id, id);
        let err = store.check_in_by_qr(&staff, "Reservation #1", None).unwrap_err();
        assert!(matches!(err, CoreError::QrAlreadyUsed));
    }

    #[test]
    fn check_out_needs_check_in_and_happens_once() {
        let mut store = store_on("2025-06-10");
        let staff = staff(&mut store);
        let id = booked(&mut store, &staff);

        assert!(matches!(store.check_out(&staff, id), Err(CoreError::NotCheckedIn { .. })));
        store.check_in(&staff, id, None).unwrap();
        let r = store.check_out(&staff, id).unwrap();
        assert!(r.is_checked_out());
        assert_eq!(store.room(RoomId::new(1)).unwrap().status(), RoomStatus::Cleaning);
        assert!(!store.room(RoomId::new(1)).unwrap().is_available());
        assert!(matches!(store.check_out(&staff, id), Err(CoreError::AlreadyCheckedOut { .. })));
    }

    #[test]
    fn guests_cannot_work_the_desk() {
        let mut store = store_on("2025-06-10");
        let staff = staff(&mut store);
        let id = booked(&mut store, &staff);
        let ana = guest(&mut store, "ana@test.cl");
        assert_eq!(store.check_in(&ana, id, None).unwrap_err().kind(), ErrorKind::Auth);
        assert_eq!(
            store.register_payment(&ana, id, 1, PaymentMethod::Cash).unwrap_err().kind(),
            ErrorKind::Auth
        );
    }

    #[test]
    fn payments_drive_status() {
        let mut store = store_on("2025-06-10");
        let staff = staff(&mut store);
        let id = booked(&mut store, &staff);

        let r = store.register_payment(&staff, id, 0, PaymentMethod::Cash).unwrap();
        assert_eq!(r.payment_status, PaymentStatus::Pending);
        assert_eq!(r.percent_paid, 0);

        let r = store.register_payment(&staff, id, 40_500, PaymentMethod::Card).unwrap();
        assert_eq!(r.payment_status, PaymentStatus::Partial);
        assert_eq!(r.percent_paid, 30);

        let r = store.register_payment(&staff, id, 135_000, PaymentMethod::Transfer).unwrap();
        assert_eq!(r.payment_status, PaymentStatus::Paid);
        assert_eq!(r.percent_paid, 100);
        assert_eq!(r.balance_due(), 0);

        let logs = store.logs_by_reservation(&staff, id).unwrap();
        assert_eq!(logs.len(), 3);
        assert_eq!(
            logs[0].details,
            Some(ActionDetails::Payment {
                amount: 135_000,
                method: PaymentMethod::Transfer,
                percent_paid: 100
            })
        );
    }

    #[test]
    fn zero_payment_after_partial_is_pending() {
        let mut store = store_on("2025-06-10");
        let staff = staff(&mut store);
        let id = booked(&mut store, &staff);

        store.register_payment(&staff, id, 40_500, PaymentMethod::Card).unwrap();
        let r = store.register_payment(&staff, id, 0, PaymentMethod::Cash).unwrap();
        assert_eq!(r.payment_status, PaymentStatus::Pending);
        assert_eq!(r.percent_paid, 0);
        assert_eq!(r.amount_paid, 0);
        assert_eq!(r.balance_due(), 135_000);
    }

    #[test]
    fn overpayment_counts_as_the_total() {
        let mut store = store_on("2025-06-10");
        let staff = staff(&mut store);
        let id = booked(&mut store, &staff);

        let r = store.register_payment(&staff, id, 175_500, PaymentMethod::Cash).unwrap();
        assert_eq!(r.payment_status, PaymentStatus::Paid);
        assert_eq!(r.percent_paid, 100);
        assert_eq!(r.amount_paid, 135_000);
    }

    #[test]
    fn full_payment_in_one_go() {
        let mut store = store_on("2025-06-10");
        let staff = staff(&mut store);
        let id = booked(&mut store, &staff);
        let r = store.register_payment(&staff, id, 135_000, PaymentMethod::Cash).unwrap();
        assert_eq!(r.payment_status, PaymentStatus::Paid);
        assert_eq!(r.percent_paid, 100);
    }

    #[test]
    fn logs_filter_by_staff() {
        let mut store = store_on("2025-06-10");
        let staff = staff(&mut store);
        let id = booked(&mut store, &staff);
        store.check_in(&staff, id, None).unwrap();
        let admin = admin(&mut store);
        store.check_out(&admin, id).unwrap();

        assert_eq!(store.logs_by_staff(&admin, &staff.email).unwrap().len(), 1);
        assert_eq!(store.logs_by_staff(&admin, &admin.email).unwrap().len(), 1);
        let all = store.action_logs(&admin).unwrap();
        assert_eq!(all[0].action, "Check-out");
    }
}
