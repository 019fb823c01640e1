//! Occupancy command handlers.

use tabled::Tabled;

use roompla_core::{Occupancy, Session, TimeRange};

use crate::cli::{GlobalOpts, OccupanciesArgs, OccupanciesCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct OccupancyRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Room")]
    room: String,
    #[tabled(rename = "Start")]
    start: String,
    #[tabled(rename = "End")]
    end: String,
    #[tabled(rename = "User")]
    user: String,
    #[tabled(rename = "Contact")]
    contact: String,
}

impl From<&Occupancy> for OccupancyRow {
    fn from(o: &Occupancy) -> Self {
        Self {
            id: util::cell(o.id.as_ref()),
            room: util::cell(o.room.as_ref()),
            start: util::cell(o.start.as_ref()),
            end: util::cell(o.end.as_ref()),
            user: util::cell(o.user_name.as_ref().or(o.user_id.as_ref())),
            contact: util::cell(o.user_contact.as_ref()),
        }
    }
}

fn detail(o: &Occupancy) -> String {
    [
        format!("ID:      {}", util::cell(o.id.as_ref())),
        format!("Room:    {}", util::cell(o.room.as_ref())),
        format!("Start:   {}", util::cell(o.start.as_ref())),
        format!("End:     {}", util::cell(o.end.as_ref())),
        format!("User:    {}", util::cell(o.user_id.as_ref())),
        format!("Name:    {}", util::cell(o.user_name.as_ref())),
        format!("Contact: {}", util::cell(o.user_contact.as_ref())),
    ]
    .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    session: &Session,
    args: OccupanciesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        OccupanciesCommand::List { room, start, end } => {
            let occupancies = session
                .occupancies(room, start.map(util::instant), end.map(util::instant))
                .await?;
            let out = output::render_list(
                &global.output,
                &occupancies,
                |o| OccupancyRow::from(o),
                |o| util::cell(o.id.as_ref()),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        OccupanciesCommand::Book { room, slot } => {
            let range = TimeRange::hourly(slot.start, slot.end)?;
            let occupancy = session.book(room, range).await?;
            let out = output::render_single(&global.output, &occupancy, detail, |o| {
                util::cell(o.id.as_ref())
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        OccupanciesCommand::Update { room, id, slot } => {
            let range = TimeRange::hourly(slot.start, slot.end)?;
            let message = format!(
                "✓ Occupancy {id} moved to {} until {}",
                util::cell(range.start.as_ref()),
                util::cell(range.end.as_ref()),
            );
            session.reschedule(room, id, range).await?;
            output::print_status(&message, global.quiet);
            Ok(())
        }

        OccupanciesCommand::Delete { room, id } => {
            if !util::confirm(&format!("Cancel occupancy {id} in room '{room}'?"), global.yes)? {
                return Ok(());
            }
            session.cancel(room, id).await?;
            output::print_status(&format!("✓ Occupancy {id} cancelled"), global.quiet);
            Ok(())
        }
    }
}
