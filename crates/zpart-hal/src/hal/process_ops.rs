//! Process execution helpers.
//!
//! External commands are considered "world-touching" and must go through the HAL so we can
//! test the shell without spawning real processes.

use crate::HalResult;
use std::process::Output;
use std::time::Duration;

/// Process execution trait (external command runner).
pub trait ProcessOps {
    /// Run `program` with captured stdout/stderr, killing it after `timeout`.
    fn command_output(&self, program: &str, args: &[&str], timeout: Duration) -> HalResult<Output>;

    /// Run `program` and fail with `CommandFailed` on a non-zero exit.
    fn command_status(&self, program: &str, args: &[&str], timeout: Duration) -> HalResult<()>;

    /// Run `program` attached to the terminal, with no timeout.
    fn command_interactive(&self, program: &str, args: &[&str]) -> HalResult<()>;
}
