//! zpart core library.
//!
//! `zpart-core` holds the parts of the shell that make decisions: parsing `parted print -m`
//! reports, validating partitioning commands, and the image subshell state. Everything that
//! spawns a process goes through `zpart-hal`.

pub mod config;
pub mod errors;
pub mod image;
pub mod logging;
pub mod parted;

pub use errors::ImageError;
