//! Room command handlers.

use tabled::Tabled;

use roompla_core::{Room, Session};

use crate::cli::{GlobalOpts, RoomsArgs, RoomsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct RoomRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Capacity")]
    capacity: String,
}

impl From<&Room> for RoomRow {
    fn from(r: &Room) -> Self {
        Self {
            id: util::cell(r.id.as_ref()),
            capacity: util::cell(r.max_occupancy.as_ref()),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(session: &Session, args: RoomsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        RoomsCommand::List => {
            let map = session.sync_rooms().await?;
            let rooms: Vec<Room> = map.rooms().cloned().collect();
            let out = output::render_list(
                &global.output,
                &rooms,
                |r| RoomRow::from(r),
                |r| util::cell(r.id.as_ref()),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
