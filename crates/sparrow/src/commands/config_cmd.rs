//! Config subcommand handlers.

use std::fmt::Write as _;

use secrecy::SecretString;

use sparrow_core::DEFAULT_HUB_URL;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config for display, masking the token.
fn format_config_redacted(cfg: &Config) -> String {
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);
    let _ = writeln!(out, "history_hours = {}", cfg.defaults.history_hours);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let p = &cfg.profiles[name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "hub = \"{}\"", p.hub);
        let _ = writeln!(out, "project = \"{}\"", p.project);
        if p.token.is_some() {
            let _ = writeln!(out, "token = \"****\"");
        }
        if let Some(ref env) = p.token_env {
            let _ = writeln!(out, "token_env = \"{env}\"");
        }
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        if let Some(hours) = p.history_hours {
            let _ = writeln!(out, "history_hours = {hours}");
        }
    }

    out
}

/// `Config` with every plaintext token replaced by a mask, for structured output.
fn redacted(mut cfg: Config) -> Config {
    for profile in cfg.profiles.values_mut() {
        if profile.token.is_some() {
            profile.token = Some("****".into());
        }
    }
    cfg
}

fn save_config(cfg: &Config) -> Result<(), CliError> {
    config::save_config(cfg)?;
    Ok(())
}

fn load_existing() -> Result<Config, CliError> {
    let path = config::config_path();
    if path.exists() {
        Ok(config::load_config()?)
    } else {
        Ok(Config::default())
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init ────────────────────────────────────────────────────
        ConfigCommand::Init {
            project,
            hub,
            token,
            token_env,
            plaintext,
        } => {
            if project.trim().is_empty() {
                return Err(CliError::Validation {
                    field: "project".into(),
                    reason: "project uid cannot be empty".into(),
                });
            }
            let hub = hub.unwrap_or_else(|| DEFAULT_HUB_URL.into());
            if url::Url::parse(&hub).is_err() {
                return Err(CliError::Validation {
                    field: "hub".into(),
                    reason: format!("invalid URL: {hub}"),
                });
            }

            let mut cfg = load_existing()?;
            let profile_name = config::active_profile_name(global, &cfg);

            let plaintext_token = match token {
                Some(t) if plaintext => Some(t),
                Some(t) => {
                    config::store_token(&profile_name, &SecretString::from(t))?;
                    eprintln!("   ✓ token stored in system keyring");
                    None
                }
                None => None,
            };

            let profile = cfg.profiles.entry(profile_name.clone()).or_default();
            profile.hub = hub;
            profile.project = project;
            if plaintext_token.is_some() {
                profile.token = plaintext_token;
            }
            if token_env.is_some() {
                profile.token_env = token_env;
            }
            if cfg.default_profile.is_none() {
                cfg.default_profile = Some(profile_name.clone());
            }

            let path = config::save_config(&cfg)?;
            eprintln!("✓ Configuration written to {}", path.display());
            eprintln!("  Profile: {profile_name}");
            eprintln!("\n  Test it: sparrow gateways list");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = redacted(config::load_config_or_default());
            let out = output::render_single(&global.output, &cfg, format_config_redacted, |_| {
                "config".into()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }

        // ── SetToken ────────────────────────────────────────────────
        ConfigCommand::SetToken { token } => {
            let cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            if token.trim().is_empty() {
                return Err(CliError::Validation {
                    field: "token".into(),
                    reason: "token cannot be empty".into(),
                });
            }
            config::store_token(&profile_name, &SecretString::from(token))?;
            eprintln!("✓ Token stored in system keyring for profile '{profile_name}'");
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: sparrow config init --project <uid>");
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
                let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
                available.sort();
                return Err(CliError::ProfileNotFound {
                    name,
                    available: if available.is_empty() {
                        "(none)".into()
                    } else {
                        available.join(", ")
                    },
                });
            }

            cfg.default_profile = Some(name.clone());
            save_config(&cfg)?;
            eprintln!("✓ Default profile set to '{name}'");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_with_token() -> Config {
        let profile = Profile {
            project: "app:1234".into(),
            hub: DEFAULT_HUB_URL.into(),
            token: Some("secret-token".into()),
            token_env: Some("NOTEHUB_TOKEN".into()),
            ..Profile::default()
        };
        Config {
            default_profile: Some("lab".into()),
            defaults: config::Defaults::default(),
            profiles: HashMap::from([("lab".to_owned(), profile)]),
        }
    }

    #[test]
    fn redacted_text_masks_token() {
        let text = format_config_redacted(&config_with_token());
        assert!(text.contains("[profiles.lab]"));
        assert!(text.contains("project = \"app:1234\""));
        assert!(text.contains("token = \"****\""));
        assert!(text.contains("token_env = \"NOTEHUB_TOKEN\""));
        assert!(!text.contains("secret-token"));
    }

    #[test]
    fn redacted_config_masks_token() {
        let cfg = redacted(config_with_token());
        assert_eq!(cfg.profiles["lab"].token.as_deref(), Some("****"));
    }
}
