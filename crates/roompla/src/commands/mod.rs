//! Command handlers, one module per top-level subcommand.

pub mod auth;
pub mod config_cmd;
pub mod occupancies;
pub mod rooms;
pub mod util;
