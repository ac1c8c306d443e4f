//! Partitioning operations (`parted`).

use crate::HalResult;
use std::path::Path;

pub trait PartedOps {
    /// Run `parted -s <image> print -m` and return its stdout.
    ///
    /// A non-zero exit is reported as `HalError::CommandFailed`; the caller decides what the
    /// absence of a report means.
    fn parted_print(&self, image: &Path) -> HalResult<String>;

    /// Run `parted -s <image> <args...>` for an already validated argument vector.
    fn parted_run(&self, image: &Path, args: &[String]) -> HalResult<()>;
}
