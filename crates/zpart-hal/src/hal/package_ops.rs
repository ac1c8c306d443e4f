//! Host package installation.

use crate::HalResult;

/// Program that runs the package manager; a failed install reports this name.
pub const INSTALL_PROGRAM: &str = "sudo";

/// Package manager invocation after [`INSTALL_PROGRAM`].
pub const INSTALL_ARGS: [&str; 4] = ["apt-get", "install", "--force-yes", "-y"];

pub trait PackageOps {
    /// `sudo apt-get install --force-yes -y <packages...>`
    fn install_packages(&self, packages: &[&str]) -> HalResult<()>;
}
