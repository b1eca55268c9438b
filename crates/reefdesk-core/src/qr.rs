// ── QR confirmation payloads ──
//
// A payload is free text or JSON that embeds the reservation id. Scanners
// hand back whatever they decoded; `extract_reservation_id` recovers the
// id from any of the shapes we issue or have issued in the past.

use std::fmt::Write as _;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::model::{Reservation, ReservationId};

const HEADER: &str = "HOTEL PACIFIC REEF";

static LABELLED_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:reservation|reserva)\s*#\s*(\d+)").expect("valid reservation-id regex")
});
static BARE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#\s*(\d+)").expect("valid bare-id regex"));

/// The confirmation text issued when a reservation is created.
pub fn confirmation_payload(reservation: &Reservation) -> String {
    let mut out = String::with_capacity(192);
    let _ = writeln!(out, "{HEADER}");
    let _ = writeln!(out, "Reservation #{}", reservation.id);
    let _ = writeln!(out, "Guest: {}", reservation.guest.full_name);
    let _ = writeln!(out, "Room: {}", reservation.room_name);
    let _ = writeln!(out, "Arrival: {}", reservation.arrival);
    let _ = writeln!(out, "Departure: {}", reservation.departure);
    let _ = writeln!(out, "Nights: {}", reservation.nights);
    let _ = write!(out, "Total: ${}", reservation.total);
    out
}

/// A fresh payload for a reissued code. The timestamp makes it differ
/// from every previously issued payload for the same reservation.
pub fn reissue_payload(id: ReservationId, issued_at: DateTime<Utc>) -> String {
    format!(
        "{HEADER}\nReservation #{id}\nIssued: {}",
        issued_at.format("%Y-%m-%dT%H:%M:%SZ")
    )
}

/// Pull a reservation id out of a scanned payload.
///
/// Tries, in order: a JSON object with `reservation_id` or `id`, a
/// `Reservation #N` label, then any `#N`.
pub fn extract_reservation_id(payload: &str) -> Option<ReservationId> {
    let trimmed = payload.trim();
    if trimmed.starts_with('{') {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
            let id = value
                .get("reservation_id")
                .or_else(|| value.get("id"))
                .and_then(json_id);
            if id.is_some() {
                return id;
            }
        }
    }

    [&*LABELLED_ID, &*BARE_ID].iter().find_map(|re| {
        re.captures(trimmed)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    })
}

fn json_id(value: &serde_json::Value) -> Option<ReservationId> {
    match value {
        serde_json::Value::Number(n) => n.as_u64().map(ReservationId::new),
        serde_json::Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn extracts_from_issued_text() {
        let payload = "HOTEL PACIFIC REEF\nReservation #42\nGuest: Ana\nTotal: $135000";
        assert_eq!(extract_reservation_id(payload), Some(ReservationId::new(42)));
    }

    #[test]
    fn extracts_from_legacy_spanish_label() {
        let payload = "HOTEL PACIFIC REEF\nReserva #7\nHuésped: Ana";
        assert_eq!(extract_reservation_id(payload), Some(ReservationId::new(7)));
    }

    #[test]
    fn extracts_from_json() {
        assert_eq!(
            extract_reservation_id(r#"{"reservation_id": 12, "room": 3}"#),
            Some(ReservationId::new(12))
        );
        assert_eq!(
            extract_reservation_id(r#"{"id": "9"}"#),
            Some(ReservationId::new(9))
        );
    }

    #[test]
    fn label_wins_over_other_hashes() {
        let payload = "Room #3\nReservation #15";
        assert_eq!(extract_reservation_id(payload), Some(ReservationId::new(15)));
    }

    #[test]
    fn no_id_means_none() {
        assert_eq!(extract_reservation_id("hello world"), None);
        assert_eq!(extract_reservation_id(""), None);
    }

    #[test]
    fn reissue_payload_round_trips_id() {
        let payload = reissue_payload(ReservationId::new(5), DateTime::<Utc>::UNIX_EPOCH);
        assert_eq!(extract_reservation_id(&payload), Some(ReservationId::new(5)));
        assert!(payload.ends_with("Issued: 1970-01-01T00:00:00Z"));
    }
}
