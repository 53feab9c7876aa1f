//! Worker side of the desktop app: command queue, tokio runtime and native
//! file dialogs.

pub mod commands;
pub mod prompt;
pub mod runtime;
