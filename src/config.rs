//! Process configuration, read once from the environment at startup.

use std::sync::Arc;

use thiserror::Error;

use crate::webhooks::policies::ImageAllowlist;

/// Environment variable holding the JSON array of allowed images.
pub const ALLOWLIST_ENV: &str = "VALID_KATA_IMAGES";

/// Value used when the allow-list variable is unset or empty.
const DEFAULT_ALLOWLIST: &str = "[]";

/// Errors raised while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The allow-list is not a JSON array of strings
    #[error("invalid image allow-list in VALID_KATA_IMAGES: {0}")]
    InvalidAllowlist(#[source] serde_json::Error),
}

/// Immutable configuration shared by every request handler
#[derive(Clone, Debug, Default)]
pub struct Config {
    pub allowlist: Arc<ImageAllowlist>,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// An unset or empty allow-list means no image is allowed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let source = lookup(ALLOWLIST_ENV)
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_ALLOWLIST.to_string());
        let allowlist = ImageAllowlist::load(&source)?;

        Ok(Self {
            allowlist: Arc::new(allowlist),
        })
    }
}
