//! zpart host abstraction layer.
//!
//! Every external program zpart drives (`parted`, `qemu-img`, the libguestfs tools and the
//! package manager) is reached through the traits in [`hal`], so the shell and the core can be
//! exercised against [`FakeHal`] without spawning anything.

pub mod error;
pub mod hal;

pub use error::{HalError, HalResult};
pub use hal::*;

/// Render a program and its arguments as a single shell-quoted line, the way it is echoed
/// before execution.
pub fn command_line<S: AsRef<str>>(program: &str, args: &[S]) -> String {
    let mut words: Vec<&str> = Vec::with_capacity(args.len() + 1);
    words.push(program);
    words.extend(args.iter().map(|a| a.as_ref()));
    shlex::try_join(words.iter().copied()).unwrap_or_else(|_| words.join(" "))
}
