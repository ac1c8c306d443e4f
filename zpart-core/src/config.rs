//! Optional TOML configuration for the shell.
//!
//! ```toml
//! root_prompt = "zpart"
//! temp_dir = "/tmp/zpart-shell"
//!
//! [timeouts]
//! parted_secs = 300
//! ```

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use zpart_hal::Timeouts;

pub const DEFAULT_ROOT_PROMPT: &str = "zpart";
pub const DEFAULT_TEMP_DIR: &str = "/tmp/zpart-shell";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Prompt of the root shell; subshells append their own name.
    pub root_prompt: String,
    /// Where the session log goes.
    pub temp_dir: PathBuf,
    pub timeouts: TimeoutConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_prompt: DEFAULT_ROOT_PROMPT.to_string(),
            temp_dir: PathBuf::from(DEFAULT_TEMP_DIR),
            timeouts: TimeoutConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimeoutConfig {
    pub probe_secs: u64,
    pub parted_secs: u64,
    pub create_secs: u64,
    pub mount_secs: u64,
    pub install_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        let t = Timeouts::default();
        Self {
            probe_secs: t.probe.as_secs(),
            parted_secs: t.parted.as_secs(),
            create_secs: t.create.as_secs(),
            mount_secs: t.mount.as_secs(),
            install_secs: t.install.as_secs(),
        }
    }
}

impl TimeoutConfig {
    pub fn to_timeouts(self) -> Timeouts {
        Timeouts {
            probe: Duration::from_secs(self.probe_secs),
            parted: Duration::from_secs(self.parted_secs),
            create: Duration::from_secs(self.create_secs),
            mount: Duration::from_secs(self.mount_secs),
            install: Duration::from_secs(self.install_secs),
        }
    }
}

impl Config {
    pub fn from_toml_str(raw: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw, path)
    }

    /// Defaults when `path` is `None`.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn log_file(&self) -> PathBuf {
        self.temp_dir.join("zpart.log")
    }
}
