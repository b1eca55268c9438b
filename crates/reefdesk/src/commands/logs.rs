//! Front-desk audit log handlers.

use std::sync::Arc;

use tabled::Tabled;

use reefdesk_core::{ActionDetails, ActionLog, Email, ReservationStore};

use crate::cli::{GlobalOpts, LogsArgs, LogsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct LogRow {
    #[tabled(rename = "Time")]
    timestamp: String,
    #[tabled(rename = "Staff")]
    staff: String,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Reservation")]
    reservation: String,
    #[tabled(rename = "Details")]
    details: String,
}

impl From<&Arc<ActionLog>> for LogRow {
    fn from(log: &Arc<ActionLog>) -> Self {
        Self {
            timestamp: log.timestamp.format("%Y-%m-%d %H:%M").to_string(),
            staff: log.staff.to_string(),
            action: log.action.clone(),
            reservation: log.reservation_id.map(|id| format!("#{id}")).unwrap_or_default(),
            details: log.details.as_ref().map(summarize).unwrap_or_default(),
        }
    }
}

fn summarize(details: &ActionDetails) -> String {
    match details {
        ActionDetails::CheckIn { room_id, notes } => match notes {
            Some(notes) => format!("room {room_id}: {notes}"),
            None => format!("room {room_id}"),
        },
        ActionDetails::CheckOut { room_id } => format!("room {room_id}"),
        ActionDetails::Payment {
            amount,
            method,
            percent_paid,
        } => format!("{} {method} ({percent_paid}%)", output::money(*amount)),
        ActionDetails::RoomStatus { room_id, status } => format!("room {room_id} -> {status}"),
        ActionDetails::QrReissued => "new QR issued".into(),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(store: &mut ReservationStore, args: LogsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let session = util::session(store)?;

    match args.command {
        LogsCommand::List { staff, reservation } => {
            let logs = match (staff, reservation) {
                (Some(staff), _) => store.logs_by_staff(&session, &Email::new(&staff))?,
                (None, Some(id)) => store.logs_by_reservation(&session, util::parse_reservation_id(&id)?)?,
                (None, None) => store.action_logs(&session)?,
            };
            let out = output::render_list(
                &global.output,
                &logs,
                |l| LogRow::from(l),
                |l| format!("{} {}", l.timestamp.to_rfc3339(), l.action),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
