//! Command dispatch: bridges CLI args -> core queries -> output formatting.

pub mod config_cmd;
pub mod events;
pub mod gateways;
pub mod latest;
pub mod sync;
pub mod util;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

use self::util::Session;

/// Dispatch a hub-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Sync => sync::handle(session, global).await,
        Command::Latest(args) => latest::handle(session, args, global).await,
        Command::Count => latest::count(session, global).await,
        Command::Gateways(args) => gateways::handle(session, args, global).await,
        Command::Events(args) => events::handle(session, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Err(CliError::Validation {
            field: "command".into(),
            reason: "config and completions do not use a hub session".into(),
        }),
    }
}
