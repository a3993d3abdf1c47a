//! Command dispatch: bridges CLI args -> connector operations -> output formatting.

pub mod call;
pub mod config_cmd;
pub mod events;
pub mod states;
pub mod util;

use hasslink_core::Connector;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a connection-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    connector: &Connector,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::States(args) => states::handle(connector, args, global).await,
        Command::Events(args) => events::handle(connector, args, global).await,
        Command::Call(args) => call::handle(connector, &args, global).await,
        // Config and Completions are handled before a connector exists
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
