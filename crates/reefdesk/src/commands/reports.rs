//! Management report handlers.

use chrono::Datelike;
use serde::Serialize;
use tabled::Tabled;

use reefdesk_core::{MonthlyTotal, Overbooking, ReservationStore, RoomBookings, StatusCount};

use crate::cli::{GlobalOpts, ReportsArgs, ReportsCommand};
use crate::error::CliError;
use crate::output;

use super::{reservations, util};

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct MonthlyRow {
    #[tabled(rename = "Month")]
    month: String,
    #[tabled(rename = "Reservations")]
    reservations: usize,
    #[tabled(rename = "Total")]
    total: String,
}

impl From<&MonthlyTotal> for MonthlyRow {
    fn from(m: &MonthlyTotal) -> Self {
        Self {
            month: m.month.clone(),
            reservations: m.reservations,
            total: output::money(m.total),
        }
    }
}

#[derive(Tabled)]
struct TopRoomRow {
    #[tabled(rename = "Room")]
    room_id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Bookings")]
    bookings: usize,
}

impl From<&RoomBookings> for TopRoomRow {
    fn from(r: &RoomBookings) -> Self {
        Self {
            room_id: r.room_id.to_string(),
            name: r.room_name.clone(),
            bookings: r.bookings,
        }
    }
}

#[derive(Tabled)]
struct OverbookingRow {
    #[tabled(rename = "Room")]
    room_id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Reservations")]
    reservations: String,
}

impl From<&Overbooking> for OverbookingRow {
    fn from(o: &Overbooking) -> Self {
        Self {
            room_id: o.room_id.to_string(),
            name: o.room_name.clone(),
            reservations: o
                .reservations
                .iter()
                .map(|id| format!("#{id}"))
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

#[derive(Tabled)]
struct StatusRow {
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Rooms")]
    rooms: usize,
}

#[derive(Serialize)]
struct CheckInReport {
    day: String,
    total: usize,
    done: usize,
    pending: usize,
}

#[derive(Serialize)]
struct MonthCount {
    month: String,
    reservations: usize,
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(store: &mut ReservationStore, args: ReportsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let session = util::session(store)?;
    let view = store.reports(&session)?;
    let color = output::should_color(&global.color);

    let out = match args.command {
        ReportsCommand::Monthly => output::render_list(
            &global.output,
            &view.totals_by_month(),
            |m| MonthlyRow::from(m),
            |m| m.month.clone(),
        ),

        ReportsCommand::TopRooms { limit } => output::render_list(
            &global.output,
            &view.top_rooms(limit),
            |r| TopRoomRow::from(r),
            |r| r.room_id.to_string(),
        ),

        ReportsCommand::PendingPayments => {
            reservations::print_reservations(&view.pending_payments(), global);
            return Ok(());
        }

        ReportsCommand::Overbookings => output::render_list(
            &global.output,
            &view.overbookings(),
            |o| OverbookingRow::from(o),
            |o| o.room_id.to_string(),
        ),

        ReportsCommand::RoomStatus => output::render_list(
            &global.output,
            &view.room_status_histogram(),
            |s: &StatusCount| StatusRow {
                status: output::room_status(s.status, color),
                rooms: s.rooms,
            },
            |s| format!("{} {}", s.status, s.rooms),
        ),

        ReportsCommand::Upcoming { days } => {
            reservations::print_reservations(&view.upcoming_check_ins(days), global);
            return Ok(());
        }

        ReportsCommand::CheckIns { day } => {
            let day = match day {
                Some(raw) => util::parse_date("day", &raw)?,
                None => view.today(),
            };
            let summary = view.check_in_summary(Some(day));
            let report = CheckInReport {
                day: day.to_string(),
                total: summary.total,
                done: summary.done,
                pending: summary.pending,
            };
            output::render_single(
                &global.output,
                &report,
                |r| {
                    format!(
                        "Day:        {}\nArrivals:   {}\nChecked in: {}\nPending:    {}",
                        r.day, r.total, r.done, r.pending
                    )
                },
                |r| format!("{}/{}", r.done, r.total),
            )
        }

        ReportsCommand::Month { month } => {
            let (year, month) = match month {
                Some(raw) => util::parse_month(&raw)?,
                None => (view.today().year(), view.today().month()),
            };
            let report = MonthCount {
                month: format!("{year:04}-{month:02}"),
                reservations: view.reservation_count_for_month(year, month),
            };
            output::render_single(
                &global.output,
                &report,
                |r| format!("{}: {} reservation(s)", r.month, r.reservations),
                |r| r.reservations.to_string(),
            )
        }
    };

    output::print_output(&out, global.quiet);
    Ok(())
}
