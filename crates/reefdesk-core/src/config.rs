// ── Runtime store configuration ──
//
// These types describe *where* the store lives and how a fresh store is
// seeded. They carry credential data but never touch config files.
// The CLI builds a `StoreConfig` from its profile and hands it in.

use std::path::PathBuf;

use secrecy::SecretString;

use crate::model::Email;

/// Where persisted collections are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StorageLocation {
    /// Process-local; lost on drop. Default for tests.
    #[default]
    Memory,
    /// One JSON document per collection inside this directory.
    Directory(PathBuf),
}

/// A seeded account. Seeded passwords bypass the strength policy.
#[derive(Debug, Clone)]
pub struct SeedAccount {
    pub email: Email,
    pub password: SecretString,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct SeedConfig {
    /// Seed rooms on a fresh store and recreate missing seed accounts.
    pub enabled: bool,
    pub admin: SeedAccount,
    pub staff: SeedAccount,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            admin: SeedAccount {
                email: Email::new("admin@pacificreef.cl"),
                password: SecretString::from("admin123".to_owned()),
                name: "Super Admin".into(),
            },
            staff: SeedAccount {
                email: Email::new("recepcion@pacificreef.cl"),
                password: SecretString::from("recepcion123".to_owned()),
                name: "Front Desk".into(),
            },
        }
    }
}

/// Configuration for opening a single reservation store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub storage: StorageLocation,
    pub seed: SeedConfig,
    /// Window used by the upcoming-check-ins report.
    pub upcoming_window_days: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage: StorageLocation::Memory,
            seed: SeedConfig::default(),
            upcoming_window_days: 7,
        }
    }
}

impl StoreConfig {
    pub fn in_directory(path: impl Into<PathBuf>) -> Self {
        Self {
            storage: StorageLocation::Directory(path.into()),
            ..Self::default()
        }
    }
}
