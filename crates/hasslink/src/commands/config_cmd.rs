//! Config subcommand handlers. None of these open a connection.

use hasslink_config::{self as store, Config, Profile};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

/// Map an interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn invalid(field: &str, reason: &str) -> CliError {
    CliError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = store::load_config_or_default();
            let out = output::render_item(global.output, &cfg, |c| format!("{c:#?}"));
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            output::print_output(&store::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = store::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: hasslink config set host <HOST>");
                return Ok(());
            }
            let mut names: Vec<_> = cfg.profiles.keys().collect();
            names.sort();
            for name in names {
                let marker = if name == default { " *" } else { "" };
                output::print_output(&format!("{name}{marker}"), global.quiet);
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = store::load_config_or_default();
            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    available: config::available_profiles(&cfg),
                    name,
                });
            }
            cfg.default_profile = Some(name.clone());
            store::save_config(&cfg)?;
            eprintln!("✓ Default profile set to '{name}'");
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = store::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            set_key(&mut cfg, &profile_name, &key, value)?;
            store::save_config(&cfg)?;
            eprintln!("✓ Set {key} on profile '{profile_name}'");
            Ok(())
        }

        // ── SetToken ────────────────────────────────────────────────
        ConfigCommand::SetToken => {
            let cfg = store::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);

            let token = rpassword::prompt_password("Access token: ").map_err(prompt_err)?;
            if token.trim().is_empty() {
                return Err(invalid("access_token", "value cannot be empty"));
            }
            store::store_access_token(&profile_name, token.trim())?;
            eprintln!("✓ Access token stored in system keyring for profile '{profile_name}'");
            Ok(())
        }
    }
}

/// Apply one `config set` assignment, creating the profile if needed.
fn set_key(cfg: &mut Config, profile_name: &str, key: &str, value: String) -> Result<(), CliError> {
    let profile = cfg
        .profiles
        .entry(profile_name.to_owned())
        .or_insert_with(|| Profile::new(String::new()));

    match key {
        "host" => profile.host = value,
        "port" => {
            profile.port = value
                .parse()
                .map_err(|_| invalid("port", "must be a number between 1 and 65535"))?;
        }
        "tls" => {
            profile.tls = value
                .parse()
                .map_err(|_| invalid("tls", "must be 'true' or 'false'"))?;
        }
        "access_token_env" | "access-token-env" => profile.access_token_env = Some(value),
        "event_type" | "event-type" => profile.event_type = Some(value),
        "reconnect_cooldown_secs" | "reconnect-cooldown-secs" => {
            profile.reconnect_cooldown_secs = Some(
                value
                    .parse()
                    .map_err(|_| invalid("reconnect_cooldown_secs", "must be a number (seconds)"))?,
            );
        }
        "shutdown_timeout_secs" | "shutdown-timeout-secs" => {
            profile.shutdown_timeout_secs = Some(
                value
                    .parse()
                    .map_err(|_| invalid("shutdown_timeout_secs", "must be a number (seconds)"))?,
            );
        }
        other => {
            return Err(CliError::Validation {
                field: other.into(),
                reason: format!(
                    "unknown config key '{other}'. Valid keys: host, port, tls, \
                     access_token_env, event_type, reconnect_cooldown_secs, shutdown_timeout_secs"
                ),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn set_creates_profile() {
        let mut cfg = Config::default();
        set_key(&mut cfg, "cabin", "host", "cabin.lan".into()).unwrap();
        set_key(&mut cfg, "cabin", "port", "8443".into()).unwrap();
        set_key(&mut cfg, "cabin", "tls", "true".into()).unwrap();
        set_key(&mut cfg, "cabin", "event-type", "zha_event".into()).unwrap();

        let profile = cfg.profile("cabin").unwrap();
        assert_eq!(profile.host, "cabin.lan");
        assert_eq!(profile.port, 8443);
        assert!(profile.tls);
        assert_eq!(profile.event_type.as_deref(), Some("zha_event"));
    }

    #[test]
    fn set_rejects_bad_values() {
        let mut cfg = Config::default();
        assert!(set_key(&mut cfg, "default", "port", "http".into()).is_err());
        assert!(set_key(&mut cfg, "default", "tls", "yes".into()).is_err());
        assert!(set_key(&mut cfg, "default", "site", "x".into()).is_err());
    }
}
