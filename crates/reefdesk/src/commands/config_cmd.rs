//! Config subcommand handlers.

use dialoguer::{Confirm, Input, Select};

use reefdesk_config::{Config, KEYRING_SERVICE, Profile, SeedRole, keyring_account};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

const REDACTED: &str = "****";

/// Copy of the config with plaintext seed passwords masked.
fn redacted(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    for profile in cfg.profiles.values_mut() {
        if profile.admin_password.is_some() {
            profile.admin_password = Some(REDACTED.into());
        }
        if profile.staff_password.is_some() {
            profile.staff_password = Some(REDACTED.into());
        }
    }
    cfg
}

fn format_config(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let p = &cfg.profiles[name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        if let Some(ref dir) = p.data_dir {
            let _ = writeln!(out, "data_dir = \"{}\"", dir.display());
        }
        let _ = writeln!(out, "seed = {}", p.seed);
        if let Some(ref email) = p.admin_email {
            let _ = writeln!(out, "admin_email = \"{email}\"");
        }
        if let Some(ref pw) = p.admin_password {
            let _ = writeln!(out, "admin_password = \"{pw}\"");
        }
        if let Some(ref env) = p.admin_password_env {
            let _ = writeln!(out, "admin_password_env = \"{env}\"");
        }
        if let Some(ref email) = p.staff_email {
            let _ = writeln!(out, "staff_email = \"{email}\"");
        }
        if let Some(ref pw) = p.staff_password {
            let _ = writeln!(out, "staff_password = \"{pw}\"");
        }
        if let Some(ref env) = p.staff_password_env {
            let _ = writeln!(out, "staff_password_env = \"{env}\"");
        }
        if let Some(days) = p.upcoming_days {
            let _ = writeln!(out, "upcoming_days = {days}");
        }
    }

    out
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::validation("interactive", format!("prompt failed: {e}"))
}

fn keyring_err(e: impl std::fmt::Display) -> CliError {
    CliError::validation("keyring", format!("failed to access keyring: {e}"))
}

fn store_in_keyring(profile_name: &str, role: SeedRole, secret: &str) -> Result<(), CliError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &keyring_account(profile_name, role))
        .map_err(keyring_err)?;
    entry.set_password(secret).map_err(keyring_err)
}

/// Offer to store a seed password in the system keyring, or return it for
/// plaintext config.
fn prompt_keyring_storage(profile_name: &str, role: SeedRole, secret: &str) -> Result<Option<String>, CliError> {
    let choices = &["Store in system keyring (recommended)", "Save to config file (plaintext)"];
    let selection = Select::new()
        .with_prompt("Where to store the password?")
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 0 {
        store_in_keyring(profile_name, role, secret)?;
        eprintln!("   Password stored in system keyring");
        Ok(None)
    } else {
        Ok(Some(secret.to_owned()))
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str, expected: &str) -> Result<T, CliError> {
    value
        .parse()
        .map_err(|_| CliError::validation(key, format!("must be {expected}")))
}

fn apply_setting(profile: &mut Profile, key: &str, value: String) -> Result<(), CliError> {
    match key {
        "data_dir" | "data-dir" => profile.data_dir = Some(value.into()),
        "seed" => profile.seed = parse_value(key, &value, "'true' or 'false'")?,
        "admin_email" | "admin-email" => profile.admin_email = Some(value),
        "admin_password_env" | "admin-password-env" => profile.admin_password_env = Some(value),
        "staff_email" | "staff-email" => profile.staff_email = Some(value),
        "staff_password_env" | "staff-password-env" => profile.staff_password_env = Some(value),
        "upcoming_days" | "upcoming-days" => {
            let days: u32 = parse_value(key, &value, "a number of days")?;
            if days == 0 {
                return Err(CliError::validation(key, "must be at least 1"));
            }
            profile.upcoming_days = Some(days);
        }
        other => {
            return Err(CliError::validation(
                other,
                format!(
                    "unknown config key '{other}'. Valid keys: data_dir, seed, admin_email, \
                     admin_password_env, staff_email, staff_password_env, upcoming_days"
                ),
            ));
        }
    }
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("reefdesk configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            let default_dir = reefdesk_config::default_data_dir(&profile_name);
            let data_dir: String = Input::new()
                .with_prompt("Data directory")
                .default(default_dir.display().to_string())
                .interact_text()
                .map_err(prompt_err)?;

            let seed = Confirm::new()
                .with_prompt("Seed sample rooms and staff accounts into a new store?")
                .default(true)
                .interact()
                .map_err(prompt_err)?;

            let mut profile = Profile {
                data_dir: Some(data_dir.into()),
                seed,
                ..Profile::default()
            };

            if seed {
                let admin_email: String = Input::new()
                    .with_prompt("Admin email")
                    .default("admin@pacificreef.cl".into())
                    .interact_text()
                    .map_err(prompt_err)?;
                let password = rpassword::prompt_password("Admin password (blank keeps the built-in one): ")
                    .map_err(prompt_err)?;
                if !password.is_empty() {
                    profile.admin_password = prompt_keyring_storage(&profile_name, SeedRole::Admin, &password)?;
                }
                profile.admin_email = Some(admin_email);
            }

            let mut cfg = config::load_config_or_default();
            cfg.profiles.insert(profile_name.clone(), profile);
            cfg.default_profile = Some(profile_name.clone());

            let written = config::save_config(&cfg)?;

            eprintln!("\nConfiguration written to {}", written.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Try it: reefdesk rooms list");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = redacted(&config::load_config_or_default());
            let out = output::render_single(&global.output, &cfg, format_config, |_| "config".into());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            let profile = cfg.profiles.entry(profile_name.clone()).or_default();
            apply_setting(profile, &key, value)?;

            config::save_config(&cfg)?;
            output::notice(&format!("Set {key} on profile '{profile_name}'"), global.quiet);
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: reefdesk config init");
            } else {
                let mut names: Vec<_> = cfg.profiles.keys().collect();
                names.sort();
                for name in names {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();
            if !cfg.profiles.contains_key(&name) {
                return Err(config::profile_not_found(&cfg, name));
            }

            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            output::notice(&format!("Default profile set to '{name}'"), global.quiet);
            Ok(())
        }

        // ── SetPassword ─────────────────────────────────────────────
        ConfigCommand::SetPassword { staff } => {
            let cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            let role = if staff { SeedRole::Staff } else { SeedRole::Admin };

            let secret = rpassword::prompt_password("Password: ").map_err(prompt_err)?;
            if secret.is_empty() {
                return Err(CliError::validation("password", "value cannot be empty"));
            }
            store_in_keyring(&profile_name, role, &secret)?;

            output::notice(
                &format!("Password stored in system keyring for profile '{profile_name}'"),
                global.quiet,
            );
            Ok(())
        }
    }
}
