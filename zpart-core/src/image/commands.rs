//! Argument checking for the image subshell commands.

use super::attrs::AttrName;
use crate::errors::ImageError;
use std::path::PathBuf;
use zpart_hal::Inventory;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageCommand {
    Set { attr: AttrName, value: String },
    /// `None` shows every attribute.
    Get(Option<AttrName>),
    Create,
    Ls(Inventory),
    Mount { fs: String, mountpoint: PathBuf },
    Umount(PathBuf),
    Parted,
    Guestfish,
}

impl ImageCommand {
    pub const NAMES: [&'static str; 8] = [
        "create",
        "get",
        "guestfish",
        "ls",
        "mount",
        "parted",
        "set",
        "umount",
    ];

    /// Check `args` for the image command `name`. Returns `Ok(None)` if `name` is not an image
    /// command at all.
    pub fn parse<S: AsRef<str>>(name: &str, args: &[S]) -> Result<Option<Self>, ImageError> {
        let args: Vec<&str> = args.iter().map(AsRef::as_ref).collect();
        let expect = |n: usize, label: &'static str| {
            if args.len() == n {
                Ok(())
            } else {
                Err(ImageError::arity(name, label, args.len()))
            }
        };

        let command = match name {
            "set" => {
                expect(2, "2")?;
                ImageCommand::Set {
                    attr: AttrName::parse_for(name, args[0])?,
                    value: args[1].to_string(),
                }
            }
            "get" => match args.as_slice() {
                [] => ImageCommand::Get(None),
                [attr] => ImageCommand::Get(Some(AttrName::parse_for(name, attr)?)),
                _ => return Err(ImageError::arity(name, "0 or 1", args.len())),
            },
            "create" => {
                expect(0, "0")?;
                ImageCommand::Create
            }
            "ls" => {
                expect(1, "1")?;
                let names: Vec<&str> = Inventory::ALL.iter().map(|i| i.name()).collect();
                let what = Inventory::from_name(args[0])
                    .ok_or_else(|| ImageError::not_one_of(name, args[0], &names))?;
                ImageCommand::Ls(what)
            }
            "mount" => {
                expect(2, "2")?;
                ImageCommand::Mount {
                    fs: args[0].to_string(),
                    mountpoint: PathBuf::from(args[1]),
                }
            }
            "umount" => {
                expect(1, "1")?;
                let mountpoint = PathBuf::from(args[0]);
                if !mountpoint.is_dir() {
                    return Err(ImageError::NotADirectory(mountpoint));
                }
                ImageCommand::Umount(mountpoint)
            }
            "parted" => {
                expect(0, "0")?;
                ImageCommand::Parted
            }
            "guestfish" => {
                expect(0, "0")?;
                ImageCommand::Guestfish
            }
            _ => return Ok(None),
        };
        Ok(Some(command))
    }
}
