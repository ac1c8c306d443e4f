//! HAL trait definitions and implementations.
//!
//! This module defines the traits for the host tools zpart wraps and provides
//! both real (LinuxHal) and fake (FakeHal) implementations.

pub mod fake_hal;
pub mod guest_ops;
pub mod image_ops;
pub mod linux_hal;
pub mod package_ops;
pub mod parted_ops;
pub mod process_ops;

pub use fake_hal::{FakeHal, Operation};
pub use guest_ops::{GuestOps, Inventory};
pub use image_ops::{ImageInfo, ImageOps};
pub use linux_hal::{LinuxHal, Timeouts};
pub use package_ops::{PackageOps, INSTALL_ARGS, INSTALL_PROGRAM};
pub use parted_ops::PartedOps;
pub use process_ops::ProcessOps;

/// Complete HAL combining all host tool traits.
pub trait SystemHal: PartedOps + ImageOps + GuestOps + PackageOps {}

/// Automatically implement SystemHal for any type implementing all required traits.
impl<T> SystemHal for T where T: PartedOps + ImageOps + GuestOps + PackageOps {}
