//! External process execution for administrative actions.

use std::process::Command;

use tracing::warn;

use crate::error::{OrchestraError, Result};
use crate::interrupt;

/// Runs a program to completion with inherited stdio.
#[cfg_attr(test, mockall::automock)]
pub trait CommandRunner {
    /// Returns the exit code, or `None` when the process was killed by a
    /// signal. Failing to start the program is an error, and Ctrl-C while it
    /// runs is `Err(OrchestraError::Interrupted)`.
    fn run(&self, program: &str, args: &[String]) -> Result<Option<i32>>;
}

/// [`CommandRunner`] backed by `std::process::Command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<Option<i32>> {
        let status = Command::new(program).args(args).status().map_err(|e| {
            warn!(program = %program, error = %e, "Failed to start command");
            OrchestraError::NotFound(format!("{}: {}", program, e))
        })?;
        if interrupt::child_interrupted(&status) {
            return Err(OrchestraError::Interrupted);
        }
        Ok(status.code())
    }
}
