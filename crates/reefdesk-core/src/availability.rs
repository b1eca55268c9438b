// ── Availability & overlap engine ──
//
// Stay ranges are half-open `[arrival, departure)`: a guest leaving on the
// 13th frees the room for a guest arriving on the 13th.

use chrono::NaiveDate;

use crate::error::{CoreError, Result};
use crate::model::{Reservation, ReservationId, RoomId};

/// A validated, non-empty stay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub arrival: NaiveDate,
    pub departure: NaiveDate,
}

impl DateRange {
    /// Fails unless `departure` is strictly after `arrival`.
    pub fn new(arrival: NaiveDate, departure: NaiveDate) -> Result<Self> {
        if departure <= arrival {
            return Err(CoreError::validation(
                "dates",
                format!("departure {departure} must be after arrival {arrival}"),
            ));
        }
        Ok(Self { arrival, departure })
    }

    /// Whole nights in the stay. Always at least one.
    pub fn nights(&self) -> u32 {
        let days = (self.departure - self.arrival).num_days();
        u32::try_from(days).unwrap_or(u32::MAX)
    }

    pub fn overlaps(&self, other: &DateRange) -> bool {
        ranges_overlap(self.arrival, self.departure, other.arrival, other.departure)
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.arrival <= day && day < self.departure
    }
}

/// Half-open interval overlap: `a_start < b_end && b_start < a_end`.
pub fn ranges_overlap(a_start: NaiveDate, a_end: NaiveDate, b_start: NaiveDate, b_end: NaiveDate) -> bool {
    a_start < b_end && b_start < a_end
}

/// Whether `range` on `room_id` is free of every reservation in
/// `reservations`, ignoring the one with id `exclude`.
pub fn is_range_available<'a, I>(
    reservations: I,
    room_id: RoomId,
    range: &DateRange,
    exclude: Option<ReservationId>,
) -> bool
where
    I: IntoIterator<Item = &'a Reservation>,
{
    reservations
        .into_iter()
        .filter(|r| r.room_id == room_id)
        .filter(|r| Some(r.id) != exclude)
        .all(|r| !ranges_overlap(range.arrival, range.departure, r.arrival, r.departure))
}
