//! Allow-list of container images permitted on the hardened runtime.

use std::collections::HashSet;

use crate::config::ConfigError;

/// Immutable set of approved image references.
///
/// Matching is exact string equality: `registry/app:1.0` does not match
/// `registry/app:1.1`, `registry/app` or `registry/app@sha256:...`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImageAllowlist {
    images: HashSet<String>,
}

impl ImageAllowlist {
    /// Parse a JSON array of image references, e.g. `["registry/safe:1.0"]`.
    pub fn load(source: &str) -> Result<Self, ConfigError> {
        let images: Vec<String> =
            serde_json::from_str(source).map_err(ConfigError::InvalidAllowlist)?;
        Ok(images.into_iter().collect())
    }

    /// Whether `image` is exactly one of the approved references.
    pub fn contains(&self, image: &str) -> bool {
        self.images.contains(image)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for ImageAllowlist {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            images: iter.into_iter().map(Into::into).collect(),
        }
    }
}
