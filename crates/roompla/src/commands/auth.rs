//! Login and logout handlers.

use dialoguer::Input;
use secrecy::ExposeSecret;

use roompla_core::Credentials;

use crate::cli::{GlobalOpts, LoginArgs};
use crate::config::{self, ResolvedProfile};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn login(
    args: LoginArgs,
    resolved: &ResolvedProfile,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let username = match args.username.or_else(|| resolved.profile.username.clone()) {
        Some(username) => username,
        None => Input::new()
            .with_prompt("Username")
            .interact_text()
            .map_err(util::prompt_err)?,
    };

    let password = if args.password_stdin {
        util::read_stdin_line()?
    } else {
        rpassword::prompt_password("Password: ").map_err(util::prompt_err)?
    };
    if username.is_empty() || password.is_empty() {
        return Err(CliError::Validation {
            field: "credentials".into(),
            reason: "username and password cannot be empty".into(),
        });
    }

    let session = config::anonymous_session(resolved)?;
    let snap = session
        .sign_in(Credentials::new(username, password))
        .await?;
    let token = snap
        .api()
        .configuration()
        .resolve_token()
        .ok_or_else(|| CliError::Decode {
            message: "server returned an empty token".into(),
        })?;

    if args.print_token {
        output::print_output(token.expose_secret(), false);
        return Ok(());
    }

    roompla_config::store_token(&resolved.name, &token).map_err(|source| {
        CliError::TokenStorage {
            profile: resolved.name.clone(),
            source,
        }
    })?;
    output::print_status(
        &format!("✓ Logged in as {} (profile '{}')", snap.user_id(), resolved.name),
        global.quiet,
    );
    Ok(())
}

pub fn logout(resolved: &ResolvedProfile, global: &GlobalOpts) -> Result<(), CliError> {
    let removed = roompla_config::delete_token(&resolved.name).map_err(|source| {
        CliError::TokenStorage {
            profile: resolved.name.clone(),
            source,
        }
    })?;

    let message = if removed {
        format!("✓ Logged out of profile '{}'", resolved.name)
    } else {
        format!("No stored login for profile '{}'", resolved.name)
    };
    output::print_status(&message, global.quiet);

    if global.token.is_some() || resolved.profile.token.is_some() {
        output::print_status(
            "  A token is still supplied via --token/ROOMPLA_TOKEN or the config file.",
            global.quiet,
        );
    }
    Ok(())
}
