// console/src/commands/mod.rs

pub mod auth;
pub mod orders;
pub mod settings;

use anyhow::bail;
use chatpaykit::OrderListViewModel;

/// Turns the board's current error into the command's failure.
pub(crate) fn fail_on_board_error(board: &OrderListViewModel) -> anyhow::Result<()> {
  match board.last_error() {
    Some(message) => bail!("{message}"),
    None => Ok(()),
  }
}
