//! Runtime configuration loading.
//!
//! Resolves the configuration file given on the command line. A missing
//! file at the default location falls back to the stock vehicle defaults;
//! a missing file the operator named explicitly is an error.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use vcu_common::config::ConfigError;
use vcu_common::vehicle::config::{VcuConfig, load_config};

/// Where the active configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults,
}

/// Validated configuration ready for the runner.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: VcuConfig,
    pub source: ConfigSource,
}

/// Load `path`, or the built-in defaults when it does not exist and
/// `required` is false.
pub fn load(path: &Path, required: bool) -> Result<LoadedConfig, ConfigError> {
    match load_config(path) {
        Ok(config) => {
            info!(
                path = %path.display(),
                tick_period_us = config.tick_period_us,
                "configuration loaded"
            );
            Ok(LoadedConfig {
                config,
                source: ConfigSource::File(path.to_path_buf()),
            })
        }
        Err(ConfigError::FileNotFound(_)) if !required => {
            warn!(path = %path.display(), "configuration file not found, using defaults");
            let config = VcuConfig::default();
            config.validate()?;
            Ok(LoadedConfig {
                config,
                source: ConfigSource::Defaults,
            })
        }
        Err(e) => Err(e),
    }
}
