//! Shared configuration for the reefdesk tools.
//!
//! TOML profiles, seed credential resolution (env + keyring + plaintext),
//! and translation to `reefdesk_core::StoreConfig`. The CLI layers its
//! global flags on top of what this crate resolves.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use reefdesk_core::{Email, SeedAccount, SeedConfig, StorageLocation, StoreConfig};

/// Keyring service name for stored seed passwords.
pub const KEYRING_SERVICE: &str = "reefdesk";

/// Overrides the config file location when set.
pub const CONFIG_PATH_ENV: &str = "REEFDESK_CONFIG";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    UnknownProfile { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named store profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Name of the profile to use: explicit choice, then `default_profile`,
    /// then `"default"`.
    pub fn active_profile_name(&self, requested: Option<&str>) -> String {
        requested
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into())
    }

    /// The named profile, or an empty one when the name is the implicit
    /// default and nothing was configured.
    pub fn profile(&self, name: &str) -> Result<Profile, ConfigError> {
        match self.profiles.get(name) {
            Some(p) => Ok(p.clone()),
            None if name == "default" => Ok(Profile::default()),
            None => Err(ConfigError::UnknownProfile { name: name.into() }),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_true() -> bool {
    true
}

/// A named store profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Directory holding the JSON collections. Defaults to the platform
    /// data directory.
    pub data_dir: Option<PathBuf>,

    /// Seed rooms and staff accounts into a fresh store.
    #[serde(default = "default_true")]
    pub seed: bool,

    pub admin_email: Option<String>,

    /// Seed admin password (plaintext, prefer keyring or env var).
    pub admin_password: Option<String>,

    /// Environment variable name holding the seed admin password.
    pub admin_password_env: Option<String>,

    pub staff_email: Option<String>,

    /// Seed front-desk password (plaintext, prefer keyring or env var).
    pub staff_password: Option<String>,

    /// Environment variable name holding the seed front-desk password.
    pub staff_password_env: Option<String>,

    /// Window for the upcoming check-ins report, in days.
    pub upcoming_days: Option<u32>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            data_dir: None,
            seed: true,
            admin_email: None,
            admin_password: None,
            admin_password_env: None,
            staff_email: None,
            staff_password: None,
            staff_password_env: None,
            upcoming_days: None,
        }
    }
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("cl", "pacificreef", "reefdesk")
}

/// Resolve the config file path: `REEFDESK_CONFIG`, then platform conventions.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    project_dirs().map_or_else(
        || fallback_dir(".config").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Default directory for store data when a profile sets none.
pub fn default_data_dir(profile_name: &str) -> PathBuf {
    let base = project_dirs().map_or_else(
        || fallback_dir(".local/share"),
        |dirs| dirs.data_dir().to_path_buf(),
    );
    base.join(profile_name)
}

fn fallback_dir(kind: &str) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(kind);
    p.push("reefdesk");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file. A missing file yields the defaults.
///
/// Environment keys use `__` for nesting, e.g.
/// `REEFDESK_PROFILES__FRONT__DATA_DIR`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("REEFDESK_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_else(|err| {
        tracing::warn!(error = %err, "ignoring unreadable config");
        Config::default()
    })
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Seed credential resolution ──────────────────────────────────────

/// Which seeded account a password belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedRole {
    Admin,
    Staff,
}

impl SeedRole {
    fn keyring_suffix(self) -> &'static str {
        match self {
            Self::Admin => "admin-password",
            Self::Staff => "staff-password",
        }
    }
}

/// Keyring account name for a profile's seed password.
pub fn keyring_account(profile_name: &str, role: SeedRole) -> String {
    format!("{profile_name}/{}", role.keyring_suffix())
}

/// Resolve a seed password: env var named by the profile, then the
/// system keyring, then plaintext. `None` means use the built-in default.
pub fn resolve_seed_password(
    profile: &Profile,
    profile_name: &str,
    role: SeedRole,
) -> Option<SecretString> {
    let (env_name, plaintext) = match role {
        SeedRole::Admin => (&profile.admin_password_env, &profile.admin_password),
        SeedRole::Staff => (&profile.staff_password_env, &profile.staff_password),
    };

    // 1. Profile's *_password_env → env var lookup
    if let Some(val) = env_name.as_deref().and_then(|name| std::env::var(name).ok()) {
        return Some(SecretString::from(val));
    }

    // 2. System keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &keyring_account(profile_name, role)) {
        if let Ok(secret) = entry.get_password() {
            return Some(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    plaintext.clone().map(SecretString::from)
}

fn seed_account(
    base: SeedAccount,
    email: Option<&str>,
    password: Option<SecretString>,
    field: &str,
) -> Result<SeedAccount, ConfigError> {
    let email = match email {
        Some(raw) if raw.trim().is_empty() => {
            return Err(ConfigError::Validation {
                field: field.into(),
                reason: "email must not be empty".into(),
            });
        }
        Some(raw) => Email::new(raw),
        None => base.email,
    };
    Ok(SeedAccount {
        email,
        password: password.unwrap_or(base.password),
        name: base.name,
    })
}

/// Build a `StoreConfig` from a profile, without CLI flag overrides.
pub fn profile_to_store_config(profile: &Profile, profile_name: &str) -> Result<StoreConfig, ConfigError> {
    let defaults = StoreConfig::default();

    let upcoming_window_days = match profile.upcoming_days {
        Some(0) => {
            return Err(ConfigError::Validation {
                field: "upcoming_days".into(),
                reason: "must be at least 1".into(),
            });
        }
        Some(days) => days,
        None => defaults.upcoming_window_days,
    };

    let admin = seed_account(
        defaults.seed.admin,
        profile.admin_email.as_deref(),
        resolve_seed_password(profile, profile_name, SeedRole::Admin),
        "admin_email",
    )?;
    let staff = seed_account(
        defaults.seed.staff,
        profile.staff_email.as_deref(),
        resolve_seed_password(profile, profile_name, SeedRole::Staff),
        "staff_email",
    )?;

    let data_dir = profile
        .data_dir
        .clone()
        .unwrap_or_else(|| default_data_dir(profile_name));

    Ok(StoreConfig {
        storage: StorageLocation::Directory(data_dir),
        seed: SeedConfig {
            enabled: profile.seed,
            admin,
            staff,
        },
        upcoming_window_days,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some("default"));
        assert_eq!(cfg.defaults.output, "table");
        assert!(cfg.profile("default").is_ok());
        assert!(matches!(cfg.profile("front"), Err(ConfigError::UnknownProfile { .. })));
    }

    #[test]
    fn saved_profiles_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut cfg = Config::default();
        cfg.profiles.insert(
            "front".into(),
            Profile {
                data_dir: Some(dir.path().join("data")),
                staff_email: Some("desk@reef.cl".into()),
                upcoming_days: Some(14),
                ..Profile::default()
            },
        );
        cfg.default_profile = Some("front".into());
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.active_profile_name(None), "front");
        assert_eq!(loaded.active_profile_name(Some("other")), "other");
        let front = loaded.profile("front").unwrap();
        assert_eq!(front.upcoming_days, Some(14));
        assert!(front.seed);
    }

    #[test]
    fn profile_overrides_seed_and_window() {
        let profile = Profile {
            data_dir: Some(PathBuf::from("/tmp/reef")),
            admin_email: Some("Boss@Reef.cl".into()),
            admin_password: Some("Str0ngPass".into()),
            upcoming_days: Some(3),
            ..Profile::default()
        };
        let store = profile_to_store_config(&profile, "unit-test-no-keyring").unwrap();
        assert_eq!(store.storage, StorageLocation::Directory(PathBuf::from("/tmp/reef")));
        assert_eq!(store.upcoming_window_days, 3);
        assert_eq!(store.seed.admin.email.as_str(), "boss@reef.cl");
        assert_eq!(store.seed.admin.password.expose_secret(), "Str0ngPass");
        assert_eq!(store.seed.staff.email.as_str(), "recepcion@pacificreef.cl");
    }

    #[test]
    fn zero_window_is_rejected() {
        let profile = Profile {
            upcoming_days: Some(0),
            ..Profile::default()
        };
        let err = profile_to_store_config(&profile, "default").unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "upcoming_days"));
    }

    #[test]
    fn blank_seed_email_is_rejected() {
        let profile = Profile {
            staff_email: Some("  ".into()),
            ..Profile::default()
        };
        assert!(profile_to_store_config(&profile, "default").is_err());
    }
}
