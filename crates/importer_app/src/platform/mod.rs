//! Process-level wiring: CLI, config file, logging, browser, and terminal.

mod app;
mod browser;
mod cli;
mod clipboard;
mod config;
mod logging;
mod terminal;
mod workspace;

pub use app::run;
pub use cli::Cli;
pub use logging::initialize as initialize_logging;
