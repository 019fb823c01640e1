//! CLI-side profile resolution on top of `roompla-config`.
//!
//! Applies `GlobalOpts` overrides to the stored profile and turns the
//! result into a ready `Session`.

use secrecy::SecretString;

use roompla_config::{Config, Profile};
use roompla_core::Session;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// A profile with CLI overrides applied, plus the name it was found under.
#[derive(Debug, Clone)]
pub struct ResolvedProfile {
    pub name: String,
    pub profile: Profile,
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Look up the active profile and apply `--environment` / `--server`.
///
/// An explicitly requested profile must exist; the implicit default falls
/// back to a development profile so a fresh install works against a local
/// server.
pub fn resolve_profile(global: &GlobalOpts, config: &Config) -> Result<ResolvedProfile, CliError> {
    let name = active_profile_name(global, config);
    let mut profile = match config.profiles.get(&name) {
        Some(profile) => profile.clone(),
        None if global.profile.is_none() => Profile::default(),
        None => {
            return Err(CliError::ProfileNotFound {
                available: config.available_profiles(),
                name,
            });
        }
    };

    if let Some(environment) = global.environment {
        profile.environment = environment;
    }
    if let Some(ref server) = global.server {
        profile.server = Some(server.clone());
    }

    Ok(ResolvedProfile { name, profile })
}

/// Anonymous session against the profile's server.
pub fn anonymous_session(resolved: &ResolvedProfile) -> Result<Session, CliError> {
    let config = roompla_config::configuration_with_token(&resolved.profile, None)?;
    Ok(Session::with_configuration(config))
}

/// Session logged in with the `--token` flag or the profile's stored token,
/// anonymous if neither is set.
///
/// A token without a configured username is recorded under the profile
/// name, so the session never holds a token while looking anonymous.
pub fn build_session(global: &GlobalOpts, resolved: &ResolvedProfile) -> Result<Session, CliError> {
    let session = anonymous_session(resolved)?;

    let token = global
        .token
        .clone()
        .map(SecretString::from)
        .or_else(|| roompla_config::resolve_token(&resolved.profile, &resolved.name));
    if let Some(token) = token {
        let user_id = resolved
            .profile
            .username
            .clone()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| resolved.name.clone());
        session.login(token, user_id);
    }

    Ok(session)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use roompla_config::Environment;

    use super::*;
    use crate::cli::OutputFormat;

    fn global(token: Option<&str>) -> GlobalOpts {
        GlobalOpts {
            profile: None,
            environment: None,
            server: None,
            token: token.map(Into::into),
            output: OutputFormat::Table,
            verbose: 0,
            quiet: true,
            yes: false,
        }
    }

    fn resolved(username: Option<&str>) -> ResolvedProfile {
        ResolvedProfile {
            name: "lab".into(),
            profile: Profile {
                environment: Environment::Production,
                server: Some("http://127.0.0.1:5050".into()),
                username: username.map(Into::into),
                ..Profile::default()
            },
        }
    }

    #[test]
    fn token_without_username_signs_in_as_profile() {
        let session = build_session(&global(Some("jwt")), &resolved(None)).unwrap();
        let snap = session.snapshot();
        assert!(snap.is_signed_in());
        assert_eq!(snap.user_id(), "lab");
    }

    #[test]
    fn token_with_username_uses_it() {
        let session = build_session(&global(Some("jwt")), &resolved(Some("ada"))).unwrap();
        assert_eq!(session.user_id(), "ada");
    }

    #[test]
    fn explicit_missing_profile_is_not_found() {
        let mut opts = global(None);
        opts.profile = Some("nope".into());
        let err = resolve_profile(&opts, &Config::default()).unwrap_err();
        assert!(matches!(err, CliError::ProfileNotFound { .. }));
    }
}
