//! Command dispatch: bridges CLI args -> store operations -> output formatting.

pub mod account;
pub mod config_cmd;
pub mod desk;
pub mod logs;
pub mod reports;
pub mod reservations;
pub mod rooms;
pub mod users;
pub mod util;

use reefdesk_core::ReservationStore;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a store-bound command to the appropriate handler.
pub fn dispatch(cmd: Command, store: &mut ReservationStore, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Account(args) => account::handle(store, args, global),
        Command::Users(args) => users::handle(store, args, global),
        Command::Rooms(args) => rooms::handle(store, args, global),
        Command::Reservations(args) => reservations::handle(store, args, global),
        Command::Desk(args) => desk::handle(store, args, global),
        Command::Logs(args) => logs::handle(store, args, global),
        Command::Reports(args) => reports::handle(store, args, global),
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
