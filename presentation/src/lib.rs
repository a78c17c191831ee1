//! Presentation layer for tandem
//!
//! This crate contains CLI definitions, output formatters,
//! progress reporters, and the interactive REPL.

pub mod chat;
pub mod cli;
pub mod config;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use chat::ChatRepl;
pub use cli::commands::{Cli, Command, OutputFormat, RunArgs, SessionArgs};
pub use config::{OutputConfig, ReplConfig};
pub use output::console::{ConsoleFormatter, StatusView};
pub use progress::reporter::{ProgressReporter, SimpleProgress};
