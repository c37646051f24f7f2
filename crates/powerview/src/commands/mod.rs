//! Command dispatch: bridges CLI args -> `Hub` calls -> output formatting.

pub mod hub;
pub mod shades;

use powerview_core::Hub;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a hub-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, hub: &Hub, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Shades(args) => shades::handle(hub, args, global).await,
        Command::Hub(args) => hub::handle(hub, args, global).await,
        // Completions are handled before a hub is built
        Command::Completions(_) => Ok(()),
    }
}
