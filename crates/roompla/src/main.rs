mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let global = &cli.global;

    match cli.command {
        // Config commands don't need a server
        Command::Config(args) => commands::config_cmd::handle(args, global),

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "roompla", &mut std::io::stdout());
            Ok(())
        }

        Command::Login(args) => commands::auth::login(args, &active_profile(global)?, global).await,
        Command::Logout => commands::auth::logout(&active_profile(global)?, global),

        Command::Rooms(args) => {
            let session = config::build_session(global, &active_profile(global)?)?;
            commands::rooms::handle(&session, args, global).await
        }
        Command::Occupancies(args) => {
            let session = config::build_session(global, &active_profile(global)?)?;
            commands::occupancies::handle(&session, args, global).await
        }
    }
}

/// Load the config file and resolve the profile the command runs against.
fn active_profile(global: &cli::GlobalOpts) -> Result<config::ResolvedProfile, CliError> {
    let cfg = roompla_config::load_config()?;
    let resolved = config::resolve_profile(global, &cfg)?;
    tracing::debug!(
        profile = %resolved.name,
        environment = %resolved.profile.environment,
        "using profile"
    );
    Ok(resolved)
}
