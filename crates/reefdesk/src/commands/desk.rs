//! Front-desk handlers: arrivals, departures, payments.

use std::sync::Arc;

use serde::Serialize;

use reefdesk_core::{Reservation, ReservationStore, Room};

use crate::cli::{DeskArgs, DeskCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::{reservations, rooms, util};

/// A room together with the guest expected on it today.
#[derive(Serialize)]
struct RoomToday {
    room: Arc<Room>,
    arrival: Option<Arc<Reservation>>,
}

fn room_today_detail(view: &RoomToday, color: bool) -> String {
    let mut out = rooms::detail(&view.room, color);
    out.push_str("\n\n");
    match &view.arrival {
        Some(r) => out.push_str(&reservations::detail(r, color)),
        None => out.push_str("No arrival pending today."),
    }
    out
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(store: &mut ReservationStore, args: DeskArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let session = util::session(store)?;

    match args.command {
        DeskCommand::CheckIn { id, qr, notes } => {
            let reservation = match (id, qr) {
                (_, Some(payload)) => store.check_in_by_qr(&session, &payload, notes)?,
                (Some(id), None) => store.check_in(&session, util::parse_reservation_id(&id)?, notes)?,
                (None, None) => {
                    return Err(CliError::validation("id", "a reservation ID or --qr payload is required"));
                }
            };
            output::notice(
                &format!(
                    "Checked in reservation #{} ({}, room {})",
                    reservation.id, reservation.guest.full_name, reservation.room_name
                ),
                global.quiet,
            );
            Ok(())
        }

        DeskCommand::CheckOut { id } => {
            let reservation = store.check_out(&session, util::parse_reservation_id(&id)?)?;
            output::notice(
                &format!(
                    "Checked out reservation #{}; room {} sent to cleaning",
                    reservation.id, reservation.room_name
                ),
                global.quiet,
            );
            Ok(())
        }

        DeskCommand::Pay { id, amount, method } => {
            let reservation =
                store.register_payment(&session, util::parse_reservation_id(&id)?, amount, method.into())?;
            output::notice(
                &format!(
                    "Recorded {} on #{}: {}% paid, balance {}",
                    output::money(amount),
                    reservation.id,
                    reservation.percent_paid,
                    output::money(reservation.balance_due())
                ),
                global.quiet,
            );
            Ok(())
        }

        DeskCommand::Due { day } => {
            let day = match day {
                Some(raw) => util::parse_date("day", &raw)?,
                None => store.today(),
            };
            reservations::print_reservations(&store.check_ins_due(&session, day)?, global);
            Ok(())
        }

        DeskCommand::Room { id } => {
            let (room, arrival) = store.room_with_todays_reservation(&session, util::parse_room_id(&id)?)?;
            let view = RoomToday { room, arrival };
            let color = output::should_color(&global.color);
            let out = output::render_single(
                &global.output,
                &view,
                |v| room_today_detail(v, color),
                |v| v.room.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
