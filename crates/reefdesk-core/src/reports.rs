// ── Reporting projections ──
//
// Pure functions over reservation and room snapshots. Nothing here
// touches the store; "today" is always passed in.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;
use strum::IntoEnumIterator;

use crate::model::{PaymentStatus, Reservation, ReservationId, Room, RoomId, RoomStatus};

/// Default limit for [`top_rooms`].
pub const TOP_ROOMS_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyTotal {
    /// `YYYY-MM` of the arrival date.
    pub month: String,
    pub total: u64,
    pub reservations: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomBookings {
    pub room_id: RoomId,
    pub room_name: String,
    pub bookings: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Overbooking {
    pub room_id: RoomId,
    pub room_name: String,
    pub reservations: Vec<ReservationId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: RoomStatus,
    pub rooms: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CheckInSummary {
    pub total: usize,
    pub done: usize,
    pub pending: usize,
}

/// Sum and count of reservations grouped by arrival month, oldest first.
pub fn totals_by_month(reservations: &[Arc<Reservation>]) -> Vec<MonthlyTotal> {
    let mut by_month: BTreeMap<(i32, u32), (u64, usize)> = BTreeMap::new();
    for r in reservations {
        let entry = by_month.entry((r.arrival.year(), r.arrival.month())).or_default();
        entry.0 = entry.0.saturating_add(r.total);
        entry.1 += 1;
    }
    by_month
        .into_iter()
        .map(|((year, month), (total, count))| MonthlyTotal {
            month: format!("{year:04}-{month:02}"),
            total,
            reservations: count,
        })
        .collect()
}

/// Rooms by booking count, descending; ties go to the lower room id.
pub fn top_rooms(reservations: &[Arc<Reservation>], limit: usize) -> Vec<RoomBookings> {
    let mut by_room: BTreeMap<RoomId, RoomBookings> = BTreeMap::new();
    for r in reservations {
        by_room
            .entry(r.room_id)
            .or_insert_with(|| RoomBookings {
                room_id: r.room_id,
                room_name: r.room_name.clone(),
                bookings: 0,
            })
            .bookings += 1;
    }
    let mut ranked: Vec<RoomBookings> = by_room.into_values().collect();
    // stable sort keeps ascending id order within equal counts
    ranked.sort_by(|a, b| b.bookings.cmp(&a.bookings));
    ranked.truncate(limit);
    ranked
}

/// Arrivals on `today` that are not fully paid.
pub fn pending_payments(reservations: &[Arc<Reservation>], today: NaiveDate) -> Vec<Arc<Reservation>> {
    reservations
        .iter()
        .filter(|r| r.arrival == today && r.payment_status != PaymentStatus::Paid)
        .cloned()
        .collect()
}

/// Rooms with more than one unconsumed reservation arriving `today`.
pub fn overbookings(reservations: &[Arc<Reservation>], today: NaiveDate) -> Vec<Overbooking> {
    let mut by_room: BTreeMap<RoomId, Vec<&Reservation>> = BTreeMap::new();
    for r in reservations.iter().filter(|r| r.arrival == today && !r.qr_used) {
        by_room.entry(r.room_id).or_default().push(r);
    }
    by_room
        .into_iter()
        .filter(|(_, group)| group.len() > 1)
        .map(|(room_id, group)| Overbooking {
            room_id,
            room_name: group[0].room_name.clone(),
            reservations: group.iter().map(|r| r.id).collect(),
        })
        .collect()
}

/// Room count per status, every status listed even when zero.
pub fn room_status_histogram(rooms: &[Arc<Room>]) -> Vec<StatusCount> {
    RoomStatus::iter()
        .map(|status| StatusCount {
            status,
            rooms: rooms.iter().filter(|r| r.status() == status).count(),
        })
        .collect()
}

/// Unconsumed reservations arriving within `days` days of `today`
/// (inclusive on both ends), soonest first.
pub fn upcoming_check_ins(reservations: &[Arc<Reservation>], today: NaiveDate, days: u32) -> Vec<Arc<Reservation>> {
    let limit = today
        .checked_add_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MAX);
    let mut out: Vec<Arc<Reservation>> = reservations
        .iter()
        .filter(|r| !r.qr_used && r.arrival >= today && r.arrival <= limit)
        .cloned()
        .collect();
    out.sort_by_key(|r| (r.arrival, r.id));
    out
}

/// Arrivals on `day`, split by whether the QR has been consumed.
pub fn check_in_summary(reservations: &[Arc<Reservation>], day: NaiveDate) -> CheckInSummary {
    let arriving: Vec<&Arc<Reservation>> = reservations.iter().filter(|r| r.arrival == day).collect();
    let done = arriving.iter().filter(|r| r.qr_used).count();
    CheckInSummary {
        total: arriving.len(),
        done,
        pending: arriving.len() - done,
    }
}

/// Reservations whose arrival falls in `year`-`month`.
pub fn reservation_count_for_month(reservations: &[Arc<Reservation>], year: i32, month: u32) -> usize {
    reservations
        .iter()
        .filter(|r| r.arrival.year() == year && r.arrival.month() == month)
        .count()
}

/// Point-in-time view handed out by
/// [`ReservationStore::reports`](crate::ReservationStore::reports).
#[derive(Debug, Clone)]
pub struct ReportView {
    reservations: Vec<Arc<Reservation>>,
    rooms: Vec<Arc<Room>>,
    today: NaiveDate,
    upcoming_days: u32,
}

impl ReportView {
    pub(crate) fn new(
        reservations: Vec<Arc<Reservation>>,
        rooms: Vec<Arc<Room>>,
        today: NaiveDate,
        upcoming_days: u32,
    ) -> Self {
        Self {
            reservations,
            rooms,
            today,
            upcoming_days,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn totals_by_month(&self) -> Vec<MonthlyTotal> {
        totals_by_month(&self.reservations)
    }

    pub fn top_rooms(&self, limit: usize) -> Vec<RoomBookings> {
        top_rooms(&self.reservations, limit)
    }

    pub fn pending_payments(&self) -> Vec<Arc<Reservation>> {
        pending_payments(&self.reservations, self.today)
    }

    pub fn overbookings(&self) -> Vec<Overbooking> {
        overbookings(&self.reservations, self.today)
    }

    pub fn room_status_histogram(&self) -> Vec<StatusCount> {
        room_status_histogram(&self.rooms)
    }

    /// Uses the configured window unless `days` is given.
    pub fn upcoming_check_ins(&self, days: Option<u32>) -> Vec<Arc<Reservation>> {
        upcoming_check_ins(&self.reservations, self.today, days.unwrap_or(self.upcoming_days))
    }

    /// Defaults to today.
    pub fn check_in_summary(&self, day: Option<NaiveDate>) -> CheckInSummary {
        check_in_summary(&self.reservations, day.unwrap_or(self.today))
    }

    pub fn reservations_this_month(&self) -> usize {
        reservation_count_for_month(&self.reservations, self.today.year(), self.today.month())
    }

    pub fn reservation_count_for_month(&self, year: i32, month: u32) -> usize {
        reservation_count_for_month(&self.reservations, year, month)
    }
}
