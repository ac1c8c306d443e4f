//! libguestfs operations (`virt-filesystems`, `guestmount`, `guestunmount`, `guestfish`).

use crate::HalResult;
use std::fmt;
use std::path::Path;

/// What `virt-filesystems` should list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Inventory {
    Devices,
    Filesystems,
    Partitions,
}

impl Inventory {
    pub const ALL: [Inventory; 3] = [Inventory::Devices, Inventory::Filesystems, Inventory::Partitions];

    /// Short name used on the zpart command line (`ls dev`).
    pub fn name(self) -> &'static str {
        match self {
            Inventory::Devices => "dev",
            Inventory::Filesystems => "fs",
            Inventory::Partitions => "part",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|i| i.name() == name)
    }

    pub fn flag(self) -> &'static str {
        match self {
            Inventory::Devices => "--blkdevs",
            Inventory::Filesystems => "--filesystems",
            Inventory::Partitions => "--partitions",
        }
    }
}

impl fmt::Display for Inventory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub trait GuestOps {
    /// `virt-filesystems -a <image> <flag>`; returns the raw listing.
    fn list_inventory(&self, image: &Path, what: Inventory) -> HalResult<String>;

    /// `guestmount -o allow_other -a <image> -m <fs> <mountpoint>`
    fn guest_mount(&self, image: &Path, fs: &str, mountpoint: &Path) -> HalResult<()>;

    /// `guestunmount <mountpoint>`
    fn guest_unmount(&self, mountpoint: &Path) -> HalResult<()>;

    /// Hand the terminal to `guestfish -a <image>` until it exits.
    fn guestfish(&self, image: &Path) -> HalResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inventory_names_round_trip() {
        for what in Inventory::ALL {
            assert_eq!(Inventory::from_name(what.name()), Some(what));
        }
        assert_eq!(Inventory::from_name("disk"), None);
    }
}
