//! Config subcommand handlers.

use dialoguer::{Input, Select};
use strum::VariantNames;

use roompla_config::{Config, Environment, Profile};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Helpers ─────────────────────────────────────────────────────────

/// Copy of `cfg` with plaintext tokens masked.
fn redacted(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    for profile in cfg.profiles.values_mut() {
        if profile.token.is_some() {
            profile.token = Some("********".into());
        }
    }
    cfg
}

fn describe(cfg: &Config) -> String {
    let default = cfg.default_profile.as_deref().unwrap_or("default");
    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort_unstable();

    let mut lines = vec![
        format!("Config path: {}", roompla_config::config_path().display()),
        format!("Output:      {}", cfg.defaults.output),
    ];
    if names.is_empty() {
        lines.push("Profiles:    (none)".into());
    }
    for name in names {
        let profile = &cfg.profiles[name];
        let marker = if name == default { " (default)" } else { "" };
        lines.push(String::new());
        lines.push(format!("[{name}]{marker}"));
        lines.push(format!("  environment: {}", profile.environment));
        lines.push(format!("  server:      {}", util::cell(profile.server.as_ref())));
        lines.push(format!("  username:    {}", util::cell(profile.username.as_ref())));
        if let Some(ref env) = profile.token_env {
            lines.push(format!("  token_env:   {env}"));
        }
        if profile.token.is_some() {
            lines.push("  token:       ******** (plaintext)".into());
        }
    }
    lines.join("\n")
}

fn parse_environment(value: &str) -> Result<Environment, CliError> {
    value.parse().map_err(|_| CliError::Validation {
        field: "environment".into(),
        reason: format!("expected one of: {}", Environment::VARIANTS.join(", ")),
    })
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = roompla_config::config_path();
            eprintln!("roompla configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            // 1. Profile name
            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(util::prompt_err)?;

            // 2. Environment
            let selection = Select::new()
                .with_prompt("Environment")
                .items(Environment::VARIANTS)
                .default(0)
                .interact()
                .map_err(util::prompt_err)?;
            let environment = parse_environment(Environment::VARIANTS[selection])?;

            // 3. Server origin (production only)
            let server = if environment == Environment::Production {
                let origin: String = Input::new()
                    .with_prompt("Server URL")
                    .interact_text()
                    .map_err(util::prompt_err)?;
                Some(origin)
            } else {
                None
            };

            // 4. Username
            let username: String = Input::new()
                .with_prompt("Username (optional)")
                .allow_empty(true)
                .interact_text()
                .map_err(util::prompt_err)?;

            let profile = Profile {
                environment,
                server,
                username: (!username.is_empty()).then_some(username),
                ..Profile::default()
            };
            roompla_config::base_path(&profile)?;

            let mut cfg = roompla_config::load_config_or_default();
            cfg.profiles.insert(profile_name.clone(), profile);
            cfg.default_profile = Some(profile_name.clone());

            let path = roompla_config::save_config(&cfg)?;

            eprintln!("\n✓ Configuration written to {}", path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Next: roompla login");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = redacted(&roompla_config::load_config_or_default());
            let out = output::render_single(&global.output, &cfg, describe, |_| {
                roompla_config::config_path().display().to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = roompla_config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            let profile = cfg.profiles.entry(profile_name.clone()).or_default();

            match key.as_str() {
                "environment" => profile.environment = parse_environment(&value)?,
                "server" => {
                    let probe = Profile {
                        environment: Environment::Production,
                        server: Some(value.clone()),
                        ..Profile::default()
                    };
                    roompla_config::base_path(&probe)?;
                    profile.server = Some(value);
                }
                "username" => profile.username = Some(value),
                "token_env" | "token-env" => profile.token_env = Some(value),
                other => {
                    return Err(CliError::Validation {
                        field: other.into(),
                        reason: format!(
                            "unknown config key '{other}'. Valid keys: environment, server, \
                             username, token_env"
                        ),
                    });
                }
            }

            roompla_config::save_config(&cfg)?;
            output::print_status(&format!("✓ Set {key} on profile '{profile_name}'"), global.quiet);
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = roompla_config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: roompla config init");
            } else {
                let mut names: Vec<_> = cfg.profiles.keys().collect();
                names.sort_unstable();
                for name in names {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = roompla_config::load_config_or_default();
            cfg.profile(&name)?;
            cfg.default_profile = Some(name.clone());
            roompla_config::save_config(&cfg)?;
            output::print_status(&format!("✓ Default profile set to '{name}'"), global.quiet);
            Ok(())
        }
    }
}
