//! Container settings.
//!
//! Settings are plain data with serde defaults, so they can be embedded in a
//! larger application config or read from a TOML snippet on their own:
//!
//! ```
//! use beanbox_container::settings::{ContainerSettings, Pipeline, SingletonCreation};
//!
//! let settings = ContainerSettings::from_toml_str(r#"
//!     pipeline = "instantiate_only"
//!     singleton_creation = "exclusive"
//! "#).unwrap();
//!
//! assert_eq!(settings.pipeline, Pipeline::InstantiateOnly);
//! assert_eq!(settings.singleton_creation, SingletonCreation::Exclusive);
//! ```

use serde::Deserialize;

/// Which stages `get_bean` runs when materializing a bean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pipeline {
    /// Instantiation, injection, post-processors and the init method.
    #[default]
    Full,
    /// Instantiation and caching only. Injection points, init methods and
    /// post-processors are ignored.
    InstantiateOnly,
}

impl Pipeline {
    #[inline]
    pub fn wires_lifecycle(&self) -> bool {
        matches!(self, Pipeline::Full)
    }
}

/// How concurrent first retrievals of one singleton are coordinated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SingletonCreation {
    /// No coordination. Racing callers may each build an instance; the last
    /// one cached is what later callers get.
    #[default]
    Racy,
    /// One successful build per name; racing callers wait for it.
    ///
    /// Two threads entering the same dependency cycle from opposite ends
    /// can block each other in this mode.
    Exclusive,
}

/// Tunables for a [`Container`](crate::container::Container).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContainerSettings {
    pub pipeline: Pipeline,
    pub singleton_creation: SingletonCreation,
}

impl ContainerSettings {
    /// Parses settings from a TOML document. Missing keys take defaults.
    ///
    /// # Errors
    /// [`SettingsError::Parse`] on malformed TOML or unknown keys.
    pub fn from_toml_str(source: &str) -> Result<Self, SettingsError> {
        toml::from_str(source).map_err(SettingsError::Parse)
    }
}

/// Errors raised while reading settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Invalid container settings: {0}")]
    Parse(#[source] toml::de::Error),
}
