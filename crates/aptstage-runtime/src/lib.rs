//! External tool execution for aptstage.
//!
//! This crate implements the execution layer: the pluggable `CommandRunner`
//! trait with a host process runner and a recording mock, argument builders
//! for `apt-key`, `apt-get` and `dpkg`, and prerequisite checking for those
//! tools.

pub mod mock;
pub mod prereq;
pub mod process;
pub mod runner;
pub mod tools;

pub use mock::{Invocation, MockRunner};
pub use prereq::{check_apt_prereqs, format_missing, MissingPrereq};
pub use process::HostRunner;
pub use runner::{select_runner, CommandRunner};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("runtime I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("'{program}' exited with {status}")]
    CommandFailed {
        program: String,
        status: String,
        output: String,
    },
    #[error("runner '{0}' is not available")]
    RunnerUnavailable(String),
}

impl RuntimeError {
    /// Captured combined output of a failed command, if any was produced.
    pub fn output(&self) -> Option<&str> {
        match self {
            RuntimeError::CommandFailed { output, .. } => Some(output),
            _ => None,
        }
    }
}
