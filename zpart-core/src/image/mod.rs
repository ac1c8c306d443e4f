//! The image subshell: disk attributes, libguestfs listings and mounts.

pub mod attrs;
pub mod cache;
pub mod commands;
pub mod session;

pub use attrs::{AttrName, DiskAttrs, ImageFormat};
pub use cache::{image_mtime, ListingCache};
pub use commands::ImageCommand;
pub use session::{ImageOutcome, ImageSession};
