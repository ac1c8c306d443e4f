//! Disk image operations (`qemu-img`).

use crate::{HalError, HalResult};
use serde::Deserialize;
use std::path::Path;

/// Subset of `qemu-img info --output json` that zpart cares about.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ImageInfo {
    pub format: String,
    #[serde(rename = "virtual-size")]
    pub virtual_size: u64,
}

impl ImageInfo {
    pub fn from_json(raw: &str) -> HalResult<Self> {
        serde_json::from_str(raw)
            .map_err(|e| HalError::Parse(format!("qemu-img info output: {}", e)))
    }
}

pub trait ImageOps {
    /// Read format and virtual size of an existing image.
    fn image_info(&self, image: &Path) -> HalResult<ImageInfo>;

    /// `qemu-img create -f <format> <image> <size>`; overwrites an existing file.
    fn image_create(&self, image: &Path, format: &str, size: &str) -> HalResult<()>;
}
