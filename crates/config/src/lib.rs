//! Layered configuration for bale exports.
//!
//! Settings merge in precedence order: built-in defaults, then an optional
//! TOML file, then `BALE_`-prefixed environment variables. The result
//! materializes into [`bale_archive::ExportOptions`], so nothing downstream
//! ever consults global state — the preview toggle in particular is an
//! explicit per-export value, not a process-wide flag.

pub mod error;

use crate::error::{ErrorKind, Result};
use bale_archive::ExportOptions;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "BALE_";
const CONFIG_FILENAME: &str = "bale.toml";

/// User-facing export configuration.
///
/// # Examples
///
/// ```
/// use bale_config::Config;
///
/// let config = Config::default();
/// assert!(config.include_previews);
/// assert_eq!(config.archive_extension, "unitypackage");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Project root that stored asset paths are made relative to.
    pub project_root: PathBuf,
    /// Staging directory reused across exports; a temporary directory is
    /// used when unset.
    pub staging_dir: Option<PathBuf>,
    /// Whether exports ask the renderer for preview images.
    pub include_previews: bool,
    /// Extension required on archive output filenames.
    pub archive_extension: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            staging_dir: None,
            include_previews: true,
            archive_extension: bale_archive::ARCHIVE_EXTENSION.to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from the default file location (when the
    /// platform has one) and the environment.
    pub fn load() -> Result<Self> {
        match default_file() {
            Some(file) => Self::load_from(file),
            None => extract(Self::figment(None)),
        }
    }

    /// Loads configuration from a specific TOML file and the environment.
    /// A missing file is not an error; defaults and environment apply.
    pub fn load_from(file: impl AsRef<Path>) -> Result<Self> {
        extract(Self::figment(Some(file.as_ref())))
    }

    fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(file) = file {
            tracing::trace!(file = %file.display(), "merging configuration file");
            figment = figment.merge(Toml::file(file));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }
}

impl From<Config> for ExportOptions {
    fn from(config: Config) -> Self {
        ExportOptions {
            project_root: config.project_root,
            staging_dir: config.staging_dir,
            include_previews: config.include_previews,
            archive_extension: config.archive_extension,
        }
    }
}

fn extract(figment: Figment) -> Result<Config> {
    match figment.extract() {
        Ok(config) => Ok(config),
        Err(error) => exn::bail!(ErrorKind::Invalid(error)),
    }
}

/// Platform configuration file, e.g. `~/.config/bale/bale.toml` on Linux.
fn default_file() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "bale").map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
}
