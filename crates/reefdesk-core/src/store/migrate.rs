// ── Versioned schema migration ──
//
// Runs once when a store is opened, on the raw JSON documents, before
// anything is deserialized into typed entities. Older documents lacking
// room status or reservation payment fields are backfilled here so the
// typed model never has to guess.

use chrono::NaiveDate;
use serde_json::{Map, Value, json};

use super::backend::KeyValueBackend;
use super::data_store::{RESERVATIONS_KEY, ROOMS_KEY, SCHEMA_VERSION_KEY, USERS_KEY};
use crate::error::{CoreError, Result};

pub const CURRENT_SCHEMA: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// Nothing was stored yet; the store will be seeded.
    Fresh,
    UpToDate,
    Migrated {
        from: u32,
        rooms: usize,
        reservations: usize,
    },
}

impl MigrationOutcome {
    pub fn is_fresh(self) -> bool {
        self == Self::Fresh
    }
}

pub(crate) fn run(backend: &dyn KeyValueBackend) -> Result<MigrationOutcome> {
    let stored = read_version(backend)?;
    if stored >= CURRENT_SCHEMA {
        tracing::debug!(version = stored, "schema up to date");
        return Ok(MigrationOutcome::UpToDate);
    }

    let has_data = [USERS_KEY, ROOMS_KEY, RESERVATIONS_KEY]
        .into_iter()
        .map(|key| backend.get(key))
        .collect::<Result<Vec<_>>>()?
        .iter()
        .any(Option::is_some);

    if !has_data {
        write_version(backend)?;
        tracing::info!(version = CURRENT_SCHEMA, "initialized fresh store");
        return Ok(MigrationOutcome::Fresh);
    }

    let rooms = migrate_document(backend, ROOMS_KEY, backfill_room)?;
    let reservations = migrate_document(backend, RESERVATIONS_KEY, backfill_reservation)?;
    write_version(backend)?;

    tracing::info!(
        from = stored,
        to = CURRENT_SCHEMA,
        rooms,
        reservations,
        "migrated store schema"
    );
    Ok(MigrationOutcome::Migrated {
        from: stored,
        rooms,
        reservations,
    })
}

fn read_version(backend: &dyn KeyValueBackend) -> Result<u32> {
    let Some(raw) = backend.get(SCHEMA_VERSION_KEY)? else {
        return Ok(0);
    };
    raw.trim().parse().map_err(|_| CoreError::Migration {
        message: format!("unreadable schema version '{}'", raw.trim()),
    })
}

fn write_version(backend: &dyn KeyValueBackend) -> Result<()> {
    backend.put(SCHEMA_VERSION_KEY, &CURRENT_SCHEMA.to_string())
}

/// Apply `backfill` to every object in the array stored under `key`.
/// Returns how many records were touched.
fn migrate_document(
    backend: &dyn KeyValueBackend,
    key: &str,
    backfill: fn(&mut Map<String, Value>) -> bool,
) -> Result<usize> {
    let Some(raw) = backend.get(key)? else {
        return Ok(0);
    };
    let mut doc: Value = serde_json::from_str(&raw).map_err(|e| CoreError::serialization(key, e))?;
    let Some(records) = doc.as_array_mut() else {
        return Err(CoreError::Migration {
            message: format!("'{key}' is not an array"),
        });
    };

    let touched = records
        .iter_mut()
        .filter_map(Value::as_object_mut)
        .map(backfill)
        .filter(|changed| *changed)
        .count();

    if touched > 0 {
        let out = serde_json::to_string_pretty(&doc).map_err(|e| CoreError::serialization(key, e))?;
        backend.put(key, &out)?;
    }
    Ok(touched)
}

/// A room without a `status` is `available`; the legacy flag is then
/// resynced to the status.
fn backfill_room(room: &mut Map<String, Value>) -> bool {
    let mut changed = false;
    if !room.get("status").is_some_and(Value::is_string) {
        room.insert("status".into(), json!("available"));
        changed = true;
    }
    let available = room.get("status").and_then(Value::as_str) == Some("available");
    if room.get("available").and_then(Value::as_bool) != Some(available) {
        room.insert("available".into(), json!(available));
        changed = true;
    }
    changed
}

/// Older reservations were only written after payment, so missing payment
/// fields mean fully paid.
fn backfill_reservation(reservation: &mut Map<String, Value>) -> bool {
    let mut changed = false;
    let total = reservation.get("total").and_then(Value::as_u64).unwrap_or(0);

    if !reservation.contains_key("nights") {
        if let Some(nights) = nights_between(reservation) {
            reservation.insert("nights".into(), json!(nights));
            changed = true;
        }
    }
    if !reservation.contains_key("payment_status") {
        reservation.insert("payment_status".into(), json!("paid"));
        changed = true;
    }
    if !reservation.contains_key("percent_paid") {
        reservation.insert("percent_paid".into(), json!(100));
        changed = true;
    }
    if !reservation.contains_key("amount_paid") {
        let percent = reservation.get("percent_paid").and_then(Value::as_u64).unwrap_or(100);
        reservation.insert("amount_paid".into(), json!(total * percent.min(100) / 100));
        changed = true;
    }
    if !reservation.contains_key("qr_used") {
        reservation.insert("qr_used".into(), json!(false));
        changed = true;
    }
    if !reservation.contains_key("guest") {
        let id = reservation.get("id").cloned().unwrap_or(Value::Null);
        let email = reservation.get("guest_email").cloned().unwrap_or_else(|| json!(""));
        let name = match &id {
            Value::Number(n) => format!("Guest #{n}"),
            _ => "Guest".to_owned(),
        };
        reservation.insert(
            "guest".into(),
            json!({ "full_name": name, "phone": "", "email": email }),
        );
        changed = true;
    }
    changed
}

fn nights_between(reservation: &Map<String, Value>) -> Option<i64> {
    let parse = |field: &str| {
        reservation
            .get(field)
            .and_then(Value::as_str)
            .and_then(|s| s.parse::<NaiveDate>().ok())
    };
    let days = (parse("departure")? - parse("arrival")?).num_days();
    (days > 0).then_some(days)
}
