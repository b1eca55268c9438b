// ── Persistent data store ──
//
// Indexed in-memory collections over a pluggable key-value backend.

mod backend;
mod collection;
mod data_store;
pub mod migrate;
mod seed;

pub use backend::{DirectoryBackend, KeyValueBackend, MemoryBackend};
pub use migrate::{CURRENT_SCHEMA, MigrationOutcome};

pub(crate) use data_store::{DataStore, SessionMarker};
pub(crate) use seed::apply as apply_seed;
