//! CLI-side configuration: applies global flag overrides on top of the
//! profile resolved by `reefdesk-config`.

use reefdesk_config::{Config, ConfigError, profile_to_store_config};
use reefdesk_core::{StorageLocation, StoreConfig};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use reefdesk_config::{config_path, load_config_or_default, save_config};

/// Profile name from `--profile`, the config default, or "default".
pub fn active_profile_name(global: &GlobalOpts, cfg: &Config) -> String {
    cfg.active_profile_name(global.profile.as_deref())
}

/// Build the `StoreConfig` for this invocation.
pub fn build_store_config(global: &GlobalOpts) -> Result<StoreConfig, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let profile = cfg.profile(&profile_name).map_err(|err| match err {
        ConfigError::UnknownProfile { name } => profile_not_found(&cfg, name),
        other => other.into(),
    })?;

    let mut store_config = profile_to_store_config(&profile, &profile_name)?;
    if let Some(dir) = &global.data_dir {
        store_config.storage = StorageLocation::Directory(dir.clone());
    }
    tracing::debug!(profile = %profile_name, storage = ?store_config.storage, "resolved store config");
    Ok(store_config)
}

pub fn profile_not_found(cfg: &Config, name: String) -> CliError {
    let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
    available.sort();
    CliError::ProfileNotFound {
        name,
        available: if available.is_empty() {
            "(none)".into()
        } else {
            available.join(", ")
        },
    }
}
