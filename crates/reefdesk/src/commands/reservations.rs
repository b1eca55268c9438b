//! Reservation command handlers.

use std::sync::Arc;

use tabled::Tabled;

use reefdesk_core::{
    Email, GuestDetails, NewReservation, PaymentMethod, Reservation, ReservationStore,
};

use crate::cli::{GlobalOpts, ReservationsArgs, ReservationsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
pub(super) struct ReservationRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Guest")]
    guest: String,
    #[tabled(rename = "Room")]
    room: String,
    #[tabled(rename = "Arrival")]
    arrival: String,
    #[tabled(rename = "Departure")]
    departure: String,
    #[tabled(rename = "Nights")]
    nights: u32,
    #[tabled(rename = "Total")]
    total: String,
    #[tabled(rename = "Paid")]
    paid: String,
    #[tabled(rename = "Payment")]
    payment: String,
    #[tabled(rename = "In")]
    checked_in: String,
}

impl ReservationRow {
    pub(super) fn new(r: &Arc<Reservation>, color: bool) -> Self {
        Self {
            id: r.id.to_string(),
            guest: r.guest.full_name.clone(),
            room: r.room_name.clone(),
            arrival: r.arrival.to_string(),
            departure: r.departure.to_string(),
            nights: r.nights,
            total: output::money(r.total),
            paid: format!("{}%", r.percent_paid),
            payment: output::payment_status(r.payment_status, color),
            checked_in: if r.is_checked_in() { "yes" } else { "" }.into(),
        }
    }
}

pub(super) fn detail(r: &Reservation, color: bool) -> String {
    let mut lines = vec![
        format!("ID:          {}", r.id),
        format!("Guest:       {} <{}>", r.guest.full_name, r.guest.email),
        format!("Booked by:   {}", r.guest_email),
        format!("Room:        {} ({}, #{})", r.room_name, r.room_type, r.room_id),
        format!("Stay:        {} -> {} ({} nights)", r.arrival, r.departure, r.nights),
        format!("Price/Night: {}", output::money(r.price_per_night)),
        format!("Total:       {}", output::money(r.total)),
        format!(
            "Paid:        {} ({}%, {})",
            output::money(r.amount_paid),
            r.percent_paid,
            output::payment_status(r.payment_status, color)
        ),
        format!("Balance:     {}", output::money(r.balance_due())),
    ];
    if !r.guest.phone.is_empty() {
        lines.push(format!("Phone:       {}", r.guest.phone));
    }
    if let Some(doc) = &r.guest.document {
        lines.push(format!("Document:    {doc}"));
    }
    if let Some(stamp) = &r.check_in {
        lines.push(format!("Checked in:  {} by {}", stamp.at.format("%Y-%m-%d %H:%M"), stamp.staff));
    }
    if let Some(stamp) = &r.check_out {
        lines.push(format!("Checked out: {} by {}", stamp.at.format("%Y-%m-%d %H:%M"), stamp.staff));
    }
    if let Some(qr) = &r.qr {
        let state = if r.qr_used { "used" } else { "valid" };
        lines.push(format!("QR:          {} ({state})", qr.payload));
    }
    if let Some(notes) = &r.notes {
        lines.push(format!("Notes:       {notes}"));
    }
    lines.join("\n")
}

pub(super) fn print_reservations(reservations: &[Arc<Reservation>], global: &GlobalOpts) {
    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        reservations,
        |r| ReservationRow::new(r, color),
        |r| r.id.to_string(),
    );
    output::print_output(&out, global.quiet);
}

pub(super) fn print_reservation(reservation: &Arc<Reservation>, global: &GlobalOpts) {
    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        reservation,
        |r| detail(r, color),
        |r| r.id.to_string(),
    );
    output::print_output(&out, global.quiet);
}

fn guest_details(
    email: &Email,
    name: Option<String>,
    phone: Option<String>,
    document: Option<String>,
) -> Option<GuestDetails> {
    if name.is_none() && phone.is_none() && document.is_none() {
        return None;
    }
    Some(GuestDetails {
        full_name: name.unwrap_or_else(|| email.to_string()),
        phone: phone.unwrap_or_default(),
        email: email.clone(),
        document,
    })
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub fn handle(store: &mut ReservationStore, args: ReservationsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let session = util::session(store)?;

    match args.command {
        ReservationsCommand::List { email, day } => {
            let reservations = match (email, day) {
                (Some(email), _) => store.reservations_by_email(&session, &Email::new(&email))?,
                (None, Some(day)) => store.reservations_for_day(&session, util::parse_date("day", &day)?)?,
                (None, None) => store.list_reservations(&session),
            };
            print_reservations(&reservations, global);
            Ok(())
        }

        ReservationsCommand::Get { id } => {
            let reservation = store.reservation(&session, util::parse_reservation_id(&id)?)?;
            print_reservation(&reservation, global);
            Ok(())
        }

        ReservationsCommand::Create {
            room,
            arrival,
            departure,
            email,
            name,
            phone,
            document,
            notes,
            pay,
            method,
        } => {
            let guest_email = email.map_or_else(|| session.email.clone(), Email::new);
            let mut request = NewReservation::new(
                guest_email.clone(),
                util::parse_room_id(&room)?,
                util::parse_date("arrival", &arrival)?,
                util::parse_date("departure", &departure)?,
            );
            if let Some(guest) = guest_details(&guest_email, name, phone, document) {
                request = request.with_guest(guest);
            }
            if let Some(amount) = pay {
                let method = method.map_or(PaymentMethod::Cash, Into::into);
                request = request.with_payment(amount, method);
            }
            request.notes = notes;

            let reservation = store.create_reservation(&session, request)?;
            output::notice(
                &format!(
                    "Booked reservation #{} for {} ({} nights, {})",
                    reservation.id,
                    reservation.room_name,
                    reservation.nights,
                    output::money(reservation.total)
                ),
                global.quiet,
            );
            print_reservation(&reservation, global);
            Ok(())
        }

        ReservationsCommand::EditDates { id, arrival, departure } => {
            let reservation = store.update_reservation_dates(
                &session,
                util::parse_reservation_id(&id)?,
                util::parse_date("arrival", &arrival)?,
                util::parse_date("departure", &departure)?,
            )?;
            print_reservation(&reservation, global);
            Ok(())
        }

        ReservationsCommand::Delete { id } => {
            let id = util::parse_reservation_id(&id)?;
            if !util::confirm(&format!("Cancel reservation #{id}?"), global.yes)? {
                return Ok(());
            }
            let removed = store.remove_reservation(&session, id)?;
            output::notice(
                &format!("Cancelled reservation #{} ({})", removed.id, removed.room_name),
                global.quiet,
            );
            Ok(())
        }

        ReservationsCommand::Search { query } => {
            print_reservations(&store.search_reservations(&session, &query)?, global);
            Ok(())
        }

        ReservationsCommand::Qr { id } => {
            let reservation = store.reservation(&session, util::parse_reservation_id(&id)?)?;
            let qr = reservation.qr.as_ref().ok_or_else(|| CliError::NotFound {
                resource_type: "QR code".into(),
                identifier: format!("#{}", reservation.id),
                list_command: "reservations list".into(),
            })?;
            output::print_output(&qr.payload, global.quiet);
            Ok(())
        }

        ReservationsCommand::AttachQr { id, payload, image } => {
            let reservation = store.attach_qr(&session, util::parse_reservation_id(&id)?, payload, image)?;
            output::notice(&format!("QR attached to reservation #{}", reservation.id), global.quiet);
            Ok(())
        }

        ReservationsCommand::ReissueQr { id } => {
            let reservation = store.reissue_qr(&session, util::parse_reservation_id(&id)?)?;
            if let Some(qr) = &reservation.qr {
                output::print_output(&qr.payload, global.quiet);
            }
            Ok(())
        }

        ReservationsCommand::Resolve { payload } => {
            let reservation = store.resolve_qr(&session, &payload)?;
            print_reservation(&reservation, global);
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn guest_details_only_when_something_was_given() {
        let email = Email::new("ana@example.com");
        assert!(guest_details(&email, None, None, None).is_none());

        let guest = guest_details(&email, None, Some("+56 9 1234".into()), None).unwrap();
        assert_eq!(guest.full_name, "ana@example.com");
        assert_eq!(guest.phone, "+56 9 1234");
        assert_eq!(guest.email, email);
    }
}
