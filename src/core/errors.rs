/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use crate::cover::CoverError;
pub use crate::setup::SetupError;
pub use crate::syscalls::DispatchError;
pub use crate::target::BootstrapError;

/// Executor-level errors with serialization support
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum ExecutorError {
    #[error("Call {call} takes {given} arguments, target allows at most {max}")]
    #[diagnostic(
        code(executor::too_many_args),
        help("Trim the argument list; the target ABI passes a fixed number of words.")
    )]
    TooManyArgs {
        call: String,
        given: usize,
        max: usize,
    },

    #[error("Unknown call: {0}")]
    #[diagnostic(
        code(executor::unknown_call),
        help("The call is not in this target's syscall table. Check the program against the table.")
    )]
    UnknownCall(String),

    #[error("Bootstrap failed: {0}")]
    #[diagnostic(
        code(executor::bootstrap),
        help("The target refused to reserve the data segment. Check memory limits.")
    )]
    Bootstrap(#[from] BootstrapError),

    #[error("Setup failed: {0}")]
    #[diagnostic(code(executor::setup))]
    Setup(#[from] SetupError),

    #[error("Data segment exhausted: needed {needed} bytes, {available} left")]
    #[diagnostic(
        code(executor::data_exhausted),
        help("Program buffers do not fit in the data segment. Use fewer or smaller buffers.")
    )]
    DataExhausted { needed: usize, available: usize },

    #[error("Invalid program: {0}")]
    #[diagnostic(
        code(executor::invalid_program),
        help("Programs are JSON arrays of {{\"call\": name, \"args\": [...]}} records.")
    )]
    InvalidProgram(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(executor::config), help("Check the configuration file and XV6_EXECUTOR_* variables."))]
    Config(String),

    #[error("I/O error: {0}")]
    #[diagnostic(code(executor::io))]
    Io(String),
}

impl From<std::io::Error> for ExecutorError {
    fn from(err: std::io::Error) -> Self {
        ExecutorError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ExecutorError {
    fn from(err: serde_json::Error) -> Self {
        ExecutorError::InvalidProgram(err.to_string())
    }
}
