//! Attributes of the disk image an image subshell works on.

use crate::errors::ImageError;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use zpart_hal::ImageOps;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Raw,
    Qcow2,
}

impl ImageFormat {
    pub const NAMES: [&'static str; 2] = ["raw", "qcow2"];

    pub fn name(self) -> &'static str {
        match self {
            ImageFormat::Raw => "raw",
            ImageFormat::Qcow2 => "qcow2",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ImageFormat {
    type Err = ImageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "raw" => Ok(ImageFormat::Raw),
            "qcow2" => Ok(ImageFormat::Qcow2),
            other => Err(ImageError::not_one_of("set", other, &Self::NAMES)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttrName {
    File,
    Format,
    Size,
}

impl AttrName {
    pub const ALL: [AttrName; 3] = [AttrName::File, AttrName::Format, AttrName::Size];
    pub const NAMES: [&'static str; 3] = ["file", "format", "size"];

    pub fn name(self) -> &'static str {
        match self {
            AttrName::File => "file",
            AttrName::Format => "format",
            AttrName::Size => "size",
        }
    }

    /// Parse an attribute name typed after `command`; unknown names are rejected.
    pub fn parse_for(command: &str, raw: &str) -> Result<Self, ImageError> {
        Self::ALL
            .into_iter()
            .find(|a| a.name() == raw)
            .ok_or_else(|| ImageError::not_one_of(command, raw, &Self::NAMES))
    }
}

impl fmt::Display for AttrName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskAttrs {
    pub file: PathBuf,
    pub format: Option<ImageFormat>,
    /// Virtual size as accepted by `qemu-img create` (`10G`, `512M`, bytes).
    pub size: Option<String>,
}

impl DiskAttrs {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            format: None,
            size: None,
        }
    }

    /// Attributes for `file`, filled from `qemu-img info` when the file already exists.
    pub fn probe<H: ImageOps + ?Sized>(hal: &H, file: impl Into<PathBuf>) -> Self {
        let mut attrs = Self::new(file);
        if !attrs.file.is_file() {
            return attrs;
        }
        match hal.image_info(&attrs.file) {
            Ok(info) => {
                attrs.format = info.format.parse().ok();
                if attrs.format.is_none() {
                    log::warn!(
                        "{} has unsupported format '{}'",
                        attrs.file.display(),
                        info.format
                    );
                }
                attrs.size = Some(info.virtual_size.to_string());
            }
            Err(err) => log::warn!("qemu-img info {} failed: {}", attrs.file.display(), err),
        }
        attrs
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Display value of an attribute; unset attributes show as `None`.
    pub fn get(&self, name: AttrName) -> String {
        match name {
            AttrName::File => self.file.display().to_string(),
            AttrName::Format => self
                .format
                .map(|f| f.to_string())
                .unwrap_or_else(|| "None".to_string()),
            AttrName::Size => self.size.clone().unwrap_or_else(|| "None".to_string()),
        }
    }

    pub fn set(&mut self, name: AttrName, value: &str) -> Result<(), ImageError> {
        match name {
            AttrName::File => self.file = PathBuf::from(value),
            AttrName::Format => self.format = Some(value.parse()?),
            AttrName::Size => self.size = Some(value.to_string()),
        }
        Ok(())
    }
}
