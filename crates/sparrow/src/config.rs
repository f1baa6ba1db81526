//! CLI-aware configuration: shared config crate plus `GlobalOpts` overrides.

use std::time::Duration;

use secrecy::SecretString;

pub use sparrow_config::{
    Config, Defaults, Profile, config_path, load_config, load_config_or_default, save_config,
    store_token,
};
use sparrow_core::{DEFAULT_HUB_URL, HubConfig, ProjectUid};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Profile named by `--profile`, else the config's default, else `default`.
pub fn active_profile_name(global: &GlobalOpts, cfg: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| cfg.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

fn parse_hub(raw: &str) -> Result<url::Url, CliError> {
    raw.parse().map_err(|_| CliError::Validation {
        field: "hub".into(),
        reason: format!("invalid URL: {raw}"),
    })
}

/// Build a `HubConfig` from the config file, profile, and CLI overrides.
pub fn build_hub_config(global: &GlobalOpts) -> Result<HubConfig, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let mut hub = if let Some(profile) = cfg.profiles.get(&profile_name) {
        let mut profile = profile.clone();
        if let Some(ref project) = global.project {
            profile.project.clone_from(project);
        }
        if let Some(ref token) = global.token {
            profile.token = Some(token.clone());
            profile.token_env = None;
        }
        sparrow_config::profile_to_hub_config(&profile, &profile_name, &cfg.defaults)?
    } else if global.profile.is_some() {
        let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
        available.sort();
        return Err(CliError::ProfileNotFound {
            name: profile_name,
            available: available.join(", "),
        });
    } else {
        // No profile: flags / env vars alone
        let project = global.project.clone().ok_or_else(|| CliError::NoConfig {
            path: config_path().display().to_string(),
        })?;
        let token = global
            .token
            .clone()
            .map(SecretString::from)
            .ok_or(CliError::NoCredentials {
                profile: profile_name,
            })?;
        let mut hub = HubConfig::new(parse_hub(DEFAULT_HUB_URL)?, ProjectUid::new(project), token);
        hub.timeout = Duration::from_secs(cfg.defaults.timeout);
        hub.history_hours = cfg.defaults.history_hours;
        hub
    };

    if let Some(ref raw) = global.hub {
        hub.base_url = parse_hub(raw)?;
    }
    if let Some(timeout) = global.timeout {
        hub.timeout = Duration::from_secs(timeout);
    }
    if let Some(hours) = global.history_hours {
        hub.history_hours = hours;
    }
    Ok(hub)
}
