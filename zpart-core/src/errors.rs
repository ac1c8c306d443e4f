use crate::image::attrs::AttrName;
use std::path::PathBuf;
use thiserror::Error;
use zpart_hal::HalError;

/// Errors from the root and image shells. Each one is reported and the shell carries on.
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("{command}: requires {expected} argument(s), {given} supplied.")]
    Arity {
        command: String,
        expected: &'static str,
        given: usize,
    },

    #[error("{command}: illegal argument '{value}', must be one of {allowed:?}.")]
    NotOneOf {
        command: String,
        value: String,
        allowed: Vec<String>,
    },

    #[error("umount: '{}' is not a directory.", .0.display())]
    NotADirectory(PathBuf),

    #[error("create: attribute '{0}' is not set.")]
    MissingAttribute(AttrName),

    #[error("parted: format '{0}' is not 'raw'.")]
    FormatNotRaw(String),

    #[error("{command}: execution failed: {source}")]
    Tool {
        command: String,
        #[source]
        source: HalError,
    },
}

impl ImageError {
    pub fn arity(command: &str, expected: &'static str, given: usize) -> Self {
        ImageError::Arity {
            command: command.to_string(),
            expected,
            given,
        }
    }

    pub fn not_one_of<S: AsRef<str>>(command: &str, value: &str, allowed: &[S]) -> Self {
        ImageError::NotOneOf {
            command: command.to_string(),
            value: value.to_string(),
            allowed: allowed.iter().map(|s| s.as_ref().to_string()).collect(),
        }
    }

    pub fn tool(command: &str) -> impl FnOnce(HalError) -> Self + '_ {
        move |source| ImageError::Tool {
            command: command.to_string(),
            source,
        }
    }
}
