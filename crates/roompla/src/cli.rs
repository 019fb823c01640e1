//! Clap derive structures for the `roompla` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use roompla_config::Environment;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// roompla -- book rooms from the command line
#[derive(Debug, Parser)]
#[command(
    name = "roompla",
    version,
    about = "Book rooms on a roompla server from the command line",
    long_about = "Command-line client for the roompla room-booking service.\n\n\
        List rooms, inspect their occupancies, and book, move or cancel\n\
        your own time slots at hourly precision.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Server profile to use
    #[arg(long, short = 'p', env = "ROOMPLA_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Deployment environment (overrides profile)
    #[arg(long, short = 'e', env = "ROOMPLA_ENVIRONMENT", global = true)]
    pub environment: Option<Environment>,

    /// Server origin, e.g. https://rooms.example.org (overrides profile)
    #[arg(long, short = 's', env = "ROOMPLA_SERVER", global = true)]
    pub server: Option<String>,

    /// Bearer token (overrides the stored login)
    #[arg(long, env = "ROOMPLA_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "ROOMPLA_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,
}

// ── Output Enum ──────────────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and store the session token
    Login(LoginArgs),

    /// Forget the stored session token
    Logout,

    /// List rooms
    #[command(alias = "r")]
    Rooms(RoomsArgs),

    /// List, book, move and cancel room occupancies
    #[command(alias = "occ", alias = "o")]
    Occupancies(OccupanciesArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Login ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Account name (defaults to the profile's username)
    #[arg(long, short = 'u')]
    pub username: Option<String>,

    /// Read the password from stdin instead of prompting
    #[arg(long)]
    pub password_stdin: bool,

    /// Print the token to stdout instead of storing it in the keyring
    #[arg(long)]
    pub print_token: bool,
}

// ── Rooms ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct RoomsArgs {
    #[command(subcommand)]
    pub command: RoomsCommand,
}

#[derive(Debug, Subcommand)]
pub enum RoomsCommand {
    /// List all rooms
    #[command(alias = "ls")]
    List,
}

// ── Occupancies ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct OccupanciesArgs {
    #[command(subcommand)]
    pub command: OccupanciesCommand,
}

#[derive(Debug, Args)]
pub struct SlotArgs {
    /// Start of the slot (RFC 3339, truncated to the hour)
    #[arg(long)]
    pub start: DateTime<Utc>,

    /// End of the slot (RFC 3339, truncated to the hour)
    #[arg(long)]
    pub end: DateTime<Utc>,
}

#[derive(Debug, Subcommand)]
pub enum OccupanciesCommand {
    /// List occupancies of a room
    #[command(alias = "ls")]
    List {
        /// Room ID
        room: String,

        /// Only occupancies starting at or after this instant (RFC 3339)
        #[arg(long)]
        start: Option<DateTime<Utc>>,

        /// Only occupancies ending at or before this instant (RFC 3339)
        #[arg(long)]
        end: Option<DateTime<Utc>>,
    },

    /// Book a room for a time slot
    Book {
        /// Room ID
        room: String,

        #[command(flatten)]
        slot: SlotArgs,
    },

    /// Move one of your occupancies to a new time slot
    #[command(alias = "move")]
    Update {
        /// Room ID
        room: String,

        /// Occupancy ID
        id: i64,

        #[command(flatten)]
        slot: SlotArgs,
    },

    /// Cancel one of your occupancies
    #[command(alias = "rm")]
    Delete {
        /// Room ID
        room: String,

        /// Occupancy ID
        id: i64,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive configuration wizard
    Init,

    /// Show the effective configuration
    Show,

    /// Set a profile value
    Set {
        /// One of: environment, server, username, token_env
        key: String,
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name
        name: String,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: Shell,
}
