// tlog! is used crate-wide, so the logging module comes first.
#[macro_use]
mod logging;

pub mod binding;
pub mod bridge;
pub mod catalog;
pub mod feeder;
pub mod io;
pub mod panel;
pub mod settings;
pub mod tui;

pub use logging::{init_file_logging, stop_file_logging};
