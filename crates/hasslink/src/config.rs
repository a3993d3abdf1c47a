//! Translation of the on-disk profile plus global flags into a
//! `hasslink_core::ConnectorConfig`.
//!
//! This is the single boundary where CLI flags cross into core types.

use secrecy::SecretString;

use hasslink_config::{self as store, Config, Profile};
use hasslink_core::ConnectorConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.active_profile_name(global.profile.as_deref())
}

/// Build a `ConnectorConfig` from the config file, profile, and CLI overrides.
///
/// Flags win over the profile. With no matching profile, `--host` alone is
/// enough as long as a token can be found.
pub fn connector_config(global: &GlobalOpts) -> Result<ConnectorConfig, CliError> {
    let cfg = store::load_config()?;
    let profile_name = active_profile_name(global, &cfg);
    let profile = select_profile(&cfg, &profile_name, global)?;
    let token = match global.token {
        Some(ref token) => SecretString::from(token.clone()),
        None => store::resolve_access_token(&profile, &profile_name)?,
    };
    Ok(store::build_connector_config(&profile, token, &cfg.defaults)?)
}

fn select_profile(
    cfg: &Config,
    profile_name: &str,
    global: &GlobalOpts,
) -> Result<Profile, CliError> {
    let mut profile = match (cfg.profiles.get(profile_name), global.host.as_deref()) {
        (Some(profile), _) => profile.clone(),
        (None, Some(host)) => Profile::new(host),
        (None, None) if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name: profile_name.into(),
                available: available_profiles(cfg),
            });
        }
        (None, None) => {
            return Err(CliError::NoConfig {
                path: store::config_path().display().to_string(),
            });
        }
    };

    if let Some(ref host) = global.host {
        profile.host.clone_from(host);
    }
    if let Some(port) = global.port {
        profile.port = port;
    }
    if global.tls {
        profile.tls = true;
    }
    Ok(profile)
}

/// Comma-separated profile names, or `(none)`.
pub fn available_profiles(cfg: &Config) -> String {
    let mut names: Vec<_> = cfg.profiles.keys().cloned().collect();
    if names.is_empty() {
        return "(none)".into();
    }
    names.sort();
    names.join(", ")
}
