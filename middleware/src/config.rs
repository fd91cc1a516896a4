use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use developool_core::DEFAULT_BASE_URL;
use serde::Deserialize;

/// Middleware configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MiddlewareConfig {
    /// Root of the Developool API, e.g. `http://developool.com/api`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for MiddlewareConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

impl MiddlewareConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Load configuration, later sources overriding earlier ones:
    /// 1. Built-in defaults
    /// 2. `developool.toml` in the working directory, if present
    /// 3. Environment variables prefixed with `DEVELOPOOL_`
    ///    (e.g. `DEVELOPOOL_BASE_URL`)
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("base_url", DEFAULT_BASE_URL)?
            .add_source(File::with_name("developool").required(false))
            .add_source(Environment::with_prefix("DEVELOPOOL").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Load configuration from an explicit file, still honoring `DEVELOPOOL_*`
    /// overrides.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("base_url", DEFAULT_BASE_URL)?
            .add_source(File::from(path.as_ref()))
            .add_source(Environment::with_prefix("DEVELOPOOL").try_parsing(true))
            .build()?
            .try_deserialize()
    }
}
