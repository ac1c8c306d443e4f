//! State and actions of the image subshell.

use super::attrs::{AttrName, DiskAttrs, ImageFormat};
use super::cache::{image_mtime, ListingCache};
use super::commands::ImageCommand;
use crate::errors::ImageError;
use crate::parted::PartedSession;
use std::path::{Path, PathBuf};
use zpart_hal::{Inventory, SystemHal};

/// What the shell should do after an image command succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageOutcome {
    Done,
    /// Lines to print.
    Show(Vec<String>),
    /// Raw tool listing to print.
    Listing(String),
    /// Open the parted subshell.
    EnterParted,
}

pub struct ImageSession<'a, H: SystemHal + ?Sized> {
    hal: &'a H,
    attrs: DiskAttrs,
    cache: ListingCache,
}

impl<'a, H: SystemHal + ?Sized> ImageSession<'a, H> {
    /// Open `file`, reading its format and size if it already exists.
    pub fn open(hal: &'a H, file: impl Into<PathBuf>) -> Self {
        Self {
            hal,
            attrs: DiskAttrs::probe(hal, file),
            cache: ListingCache::new(),
        }
    }

    pub fn attrs(&self) -> &DiskAttrs {
        &self.attrs
    }

    pub fn file(&self) -> &Path {
        self.attrs.file()
    }

    pub fn run(&mut self, command: ImageCommand) -> Result<ImageOutcome, ImageError> {
        match command {
            ImageCommand::Set { attr, value } => {
                self.attrs.set(attr, &value)?;
                if attr == AttrName::File {
                    self.cache = ListingCache::new();
                }
                Ok(ImageOutcome::Done)
            }
            ImageCommand::Get(attr) => {
                let names = attr.map_or_else(|| AttrName::ALL.to_vec(), |a| vec![a]);
                let lines = names
                    .into_iter()
                    .map(|a| format!("{}:\t\t{}", a, self.attrs.get(a)))
                    .collect();
                Ok(ImageOutcome::Show(lines))
            }
            ImageCommand::Create => {
                self.create()?;
                Ok(ImageOutcome::Done)
            }
            ImageCommand::Ls(what) => Ok(ImageOutcome::Listing(self.list(what)?.to_string())),
            ImageCommand::Mount { fs, mountpoint } => {
                self.hal
                    .guest_mount(self.attrs.file(), &fs, &mountpoint)
                    .map_err(ImageError::tool("mount"))?;
                Ok(ImageOutcome::Done)
            }
            ImageCommand::Umount(mountpoint) => {
                self.hal
                    .guest_unmount(&mountpoint)
                    .map_err(ImageError::tool("umount"))?;
                Ok(ImageOutcome::Done)
            }
            ImageCommand::Parted => {
                self.check_parted()?;
                Ok(ImageOutcome::EnterParted)
            }
            ImageCommand::Guestfish => {
                self.hal
                    .guestfish(self.attrs.file())
                    .map_err(ImageError::tool("guestfish"))?;
                Ok(ImageOutcome::Done)
            }
        }
    }

    fn create(&self) -> Result<(), ImageError> {
        let format = self
            .attrs
            .format
            .ok_or(ImageError::MissingAttribute(AttrName::Format))?;
        let size = self
            .attrs
            .size
            .as_deref()
            .ok_or(ImageError::MissingAttribute(AttrName::Size))?;
        self.hal
            .image_create(self.attrs.file(), format.name(), size)
            .map_err(ImageError::tool("create"))
    }

    /// `virt-filesystems` listing, served from the cache while the image is unchanged.
    pub fn list(&mut self, what: Inventory) -> Result<&str, ImageError> {
        let hal = self.hal;
        let file = self.attrs.file.clone();
        let mtime = image_mtime(&file);
        self.cache.get_or_fill(what, mtime, || {
            hal.list_inventory(&file, what)
                .map_err(ImageError::tool("ls"))
        })
    }

    /// parted only handles raw images.
    pub fn check_parted(&self) -> Result<(), ImageError> {
        match self.attrs.format {
            Some(ImageFormat::Raw) => Ok(()),
            other => Err(ImageError::FormatNotRaw(
                other.map_or_else(|| "None".to_string(), |f| f.to_string()),
            )),
        }
    }

    pub fn parted(&self) -> Result<PartedSession<'a, H>, ImageError> {
        self.check_parted()?;
        Ok(PartedSession::new(self.hal, self.attrs.file.clone()))
    }
}
