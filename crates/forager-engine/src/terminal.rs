//! Terminal implementations of the host capabilities.
//!
//! Outside the game there is no chat box to type into, so the engine
//! echoes each command to standard output and treats it as accepted.
//! Messages for the user go to standard output, errors to standard error.

use forager_core::host::{CommandExecutor, NotificationSink};

/// Prints each command instead of sending it to a game client.
#[derive(Debug, Default)]
pub struct EchoExecutor;

impl CommandExecutor for EchoExecutor {
    fn execute(&self, command: &str) -> bool {
        tracing::debug!(command, "echoing command");
        println!("> {command}");
        true
    }
}

/// Writes notifications to the terminal.
#[derive(Debug, Default)]
pub struct TerminalSink;

impl NotificationSink for TerminalSink {
    fn print(&self, message: &str) {
        println!("{message}");
    }

    fn print_error(&self, message: &str) {
        eprintln!("{message}");
    }
}
