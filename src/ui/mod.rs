//! Terminal user interface: central `App` state, key-to-command mapping,
//! modal form state, table view models, and the Ratatui event loop.

mod app;
mod command;
mod forms;
mod helpers;
mod rows;
mod terminal;

pub use app::{App, PAGE_SIZE};
pub use command::{command_for, Command, Section};
pub use terminal::run_app;
