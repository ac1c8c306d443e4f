//! Fake HAL implementation for testing.
//!
//! This implementation records all operations without executing them and answers probes from
//! scripted output, allowing CI-safe testing without root privileges or the host tools.

use super::{GuestOps, ImageInfo, ImageOps, Inventory, PackageOps, PartedOps, INSTALL_PROGRAM};
use crate::{HalError, HalResult};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Operation records for testing and verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    PartedPrint {
        image: PathBuf,
    },
    PartedRun {
        image: PathBuf,
        args: Vec<String>,
    },
    ImageInfo {
        image: PathBuf,
    },
    ImageCreate {
        image: PathBuf,
        format: String,
        size: String,
    },
    ListInventory {
        image: PathBuf,
        what: Inventory,
    },
    GuestMount {
        image: PathBuf,
        fs: String,
        mountpoint: PathBuf,
    },
    GuestUnmount {
        mountpoint: PathBuf,
    },
    Guestfish {
        image: PathBuf,
    },
    InstallPackages {
        packages: Vec<String>,
    },
}

/// Shared state for FakeHal operations.
#[derive(Debug, Clone, Default)]
struct FakeHalState {
    /// All operations that were recorded
    operations: Vec<Operation>,
    /// Stdout of `parted print -m`; `None` makes the print fail
    parted_output: Option<String>,
    /// Answer to `qemu-img info`; `None` makes the probe fail
    image_info: Option<ImageInfo>,
    inventory: BTreeMap<Inventory, String>,
    /// Programs whose next invocations exit non-zero
    failing: HashSet<String>,
}

/// Fake HAL implementation that records operations without executing them.
///
/// This is designed for testing and CI environments where the libguestfs and parted
/// tools are missing or would need root.
#[derive(Debug, Clone, Default)]
pub struct FakeHal {
    state: Arc<Mutex<FakeHalState>>,
}

impl FakeHal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the stdout of `parted print -m`.
    pub fn with_parted_output(self, output: impl Into<String>) -> Self {
        self.set_parted_output(output);
        self
    }

    pub fn set_parted_output(&self, output: impl Into<String>) {
        self.state.lock().unwrap().parted_output = Some(output.into());
    }

    pub fn with_image_info(self, format: &str, virtual_size: u64) -> Self {
        self.state.lock().unwrap().image_info = Some(ImageInfo {
            format: format.to_string(),
            virtual_size,
        });
        self
    }

    pub fn set_inventory(&self, what: Inventory, listing: impl Into<String>) {
        self.state
            .lock()
            .unwrap()
            .inventory
            .insert(what, listing.into());
    }

    /// Make every later invocation of `program` exit with status 1.
    pub fn fail_program(&self, program: &str) {
        self.state
            .lock()
            .unwrap()
            .failing
            .insert(program.to_string());
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<Operation> {
        self.state.lock().unwrap().operations.clone()
    }

    /// Get the number of operations recorded.
    pub fn operation_count(&self) -> usize {
        self.state.lock().unwrap().operations.len()
    }

    /// Check if a specific operation was recorded.
    pub fn has_operation(&self, check: impl Fn(&Operation) -> bool) -> bool {
        self.state.lock().unwrap().operations.iter().any(check)
    }

    /// Clear all recorded operations.
    pub fn clear(&self) {
        self.state.lock().unwrap().operations.clear();
    }

    fn record_operation(&self, op: Operation) {
        self.state.lock().unwrap().operations.push(op);
    }

    fn check_failing(&self, program: &str) -> HalResult<()> {
        if self.state.lock().unwrap().failing.contains(program) {
            return Err(HalError::CommandFailed {
                program: program.to_string(),
                code: Some(1),
                stderr: format!("{}: simulated failure", program),
            });
        }
        Ok(())
    }
}

impl PartedOps for FakeHal {
    fn parted_print(&self, image: &Path) -> HalResult<String> {
        self.record_operation(Operation::PartedPrint {
            image: image.to_path_buf(),
        });
        self.check_failing("parted")?;
        self.state
            .lock()
            .unwrap()
            .parted_output
            .clone()
            .ok_or_else(|| HalError::CommandFailed {
                program: "parted".to_string(),
                code: Some(1),
                stderr: format!("Error: Could not stat device {}", image.display()),
            })
    }

    fn parted_run(&self, image: &Path, args: &[String]) -> HalResult<()> {
        self.record_operation(Operation::PartedRun {
            image: image.to_path_buf(),
            args: args.to_vec(),
        });
        self.check_failing("parted")
    }
}

impl ImageOps for FakeHal {
    fn image_info(&self, image: &Path) -> HalResult<ImageInfo> {
        self.record_operation(Operation::ImageInfo {
            image: image.to_path_buf(),
        });
        self.check_failing("qemu-img")?;
        self.state
            .lock()
            .unwrap()
            .image_info
            .clone()
            .ok_or_else(|| HalError::CommandFailed {
                program: "qemu-img".to_string(),
                code: Some(1),
                stderr: format!("Could not open '{}'", image.display()),
            })
    }

    fn image_create(&self, image: &Path, format: &str, size: &str) -> HalResult<()> {
        log::info!("FAKE HAL: qemu-img create {} ({}, {})", image.display(), format, size);
        self.record_operation(Operation::ImageCreate {
            image: image.to_path_buf(),
            format: format.to_string(),
            size: size.to_string(),
        });
        self.check_failing("qemu-img")
    }
}

impl GuestOps for FakeHal {
    fn list_inventory(&self, image: &Path, what: Inventory) -> HalResult<String> {
        self.record_operation(Operation::ListInventory {
            image: image.to_path_buf(),
            what,
        });
        self.check_failing("virt-filesystems")?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .inventory
            .get(&what)
            .cloned()
            .unwrap_or_default())
    }

    fn guest_mount(&self, image: &Path, fs: &str, mountpoint: &Path) -> HalResult<()> {
        log::info!(
            "FAKE HAL: guestmount {} {} -> {}",
            image.display(),
            fs,
            mountpoint.display()
        );
        self.record_operation(Operation::GuestMount {
            image: image.to_path_buf(),
            fs: fs.to_string(),
            mountpoint: mountpoint.to_path_buf(),
        });
        self.check_failing("guestmount")
    }

    fn guest_unmount(&self, mountpoint: &Path) -> HalResult<()> {
        self.record_operation(Operation::GuestUnmount {
            mountpoint: mountpoint.to_path_buf(),
        });
        self.check_failing("guestunmount")
    }

    fn guestfish(&self, image: &Path) -> HalResult<()> {
        self.record_operation(Operation::Guestfish {
            image: image.to_path_buf(),
        });
        self.check_failing("guestfish")
    }
}

impl PackageOps for FakeHal {
    fn install_packages(&self, packages: &[&str]) -> HalResult<()> {
        self.record_operation(Operation::InstallPackages {
            packages: packages.iter().map(|p| p.to_string()).collect(),
        });
        self.check_failing(INSTALL_PROGRAM)
    }
}
