//! Validate-then-execute cycle for the parted subshell.

use super::table::{parse, PartitionTableReport};
use super::validate::{validate, PartedOperation, Rejection, Validated};
use std::path::{Path, PathBuf};
use thiserror::Error;
use zpart_hal::{HalError, PartedOps};

#[derive(Debug, Error)]
pub enum CommandError {
    /// The arguments were refused; parted was not run.
    #[error("{0}")]
    Rejected(#[from] Rejection),

    /// parted ran (or could not be started) and failed. Not retried.
    #[error("{operation}: execution failed: {source}")]
    ExecutionFailed {
        operation: PartedOperation,
        #[source]
        source: HalError,
    },
}

/// Result of a successful command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// `show`: the freshly parsed table.
    Report(PartitionTableReport),
    /// A mutating command ran with these parted arguments.
    Executed(Vec<String>),
}

/// Binds a HAL to the image the parted subshell works on.
pub struct PartedSession<'a, H: PartedOps + ?Sized> {
    hal: &'a H,
    image: PathBuf,
}

impl<'a, H: PartedOps + ?Sized> PartedSession<'a, H> {
    pub fn new(hal: &'a H, image: impl Into<PathBuf>) -> Self {
        Self {
            hal,
            image: image.into(),
        }
    }

    pub fn image(&self) -> &Path {
        &self.image
    }

    /// Run `parted print -m` and parse it. A failed run is `Unparseable`.
    pub fn report(&self) -> PartitionTableReport {
        match self.hal.parted_print(&self.image) {
            Ok(raw) => parse(&raw),
            Err(err) => {
                log::warn!("parted print failed for {}: {}", self.image.display(), err);
                PartitionTableReport::Unparseable
            }
        }
    }

    /// Ids of the current partitions, empty when there are none.
    pub fn partition_ids(&self) -> Vec<String> {
        self.report().ids().into_iter().map(str::to_string).collect()
    }

    pub fn run<S: AsRef<str>>(
        &self,
        operation: PartedOperation,
        args: &[S],
    ) -> Result<Outcome, CommandError> {
        let source = || self.report();
        match validate(operation, args, &source)? {
            Validated::Show => Ok(Outcome::Report(self.report())),
            Validated::Execute(argv) => {
                log::info!("parted {} -s {}", self.image.display(), argv.join(" "));
                self.hal
                    .parted_run(&self.image, &argv)
                    .map_err(|source| CommandError::ExecutionFailed { operation, source })?;
                Ok(Outcome::Executed(argv))
            }
        }
    }
}
