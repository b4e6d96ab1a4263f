//! Application context: a container populated by component scanning.

use std::any::Any;
use std::path::Path;
use std::sync::Arc;

use tracing::{info, instrument};

use beanbox_container::bean::Bean;
use beanbox_container::container::Container;
use beanbox_container::error::{ContainerError, Result};

use crate::component::ComponentScan;
use crate::config::{AppConfig, ConfigError};

/// Errors from building a context out of a config file.
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Container(#[from] ContainerError),
}

/// A [`Container`] holding every component found under one module path.
///
/// ```ignore
/// let context = ApplicationContext::scan("my_app")?;
/// let users: Arc<UserService> = context.get_bean("userService")?;
/// ```
pub struct ApplicationContext {
    base: String,
    container: Container,
}

impl ApplicationContext {
    /// Scans `base` with default settings.
    ///
    /// # Errors
    /// The first registration error, usually
    /// [`ContainerError::DuplicateRegistration`].
    pub fn scan(base: &str) -> Result<Self> {
        Self::scan_with(base, &AppConfig::default())
    }

    /// Scans `base` into a container built with `config.container`.
    ///
    /// Logging settings are not applied here; call
    /// [`logging::init`](beanbox_support::logging::init) for that.
    #[instrument(skip(config))]
    pub fn scan_with(base: &str, config: &AppConfig) -> Result<Self> {
        let container = Container::builder()
            .settings(config.container)
            .source(ComponentScan::new(base))
            .build()?;

        info!(
            beans = container.bean_definition_count(),
            processors = container.post_processor_count(),
            "Application context ready"
        );

        Ok(Self {
            base: base.to_string(),
            container,
        })
    }

    /// Loads [`AppConfig`] from a TOML file and scans `base` with it.
    ///
    /// # Errors
    /// [`ContextError::Config`] or [`ContextError::Container`].
    pub fn from_config_file(base: &str, path: impl AsRef<Path>) -> std::result::Result<Self, ContextError> {
        let config = AppConfig::from_file(path)?;
        Ok(Self::scan_with(base, &config)?)
    }

    /// Creates every singleton now rather than on first use.
    ///
    /// Returns how many singletons were created or already cached.
    ///
    /// # Errors
    /// The first retrieval error, in bean name order.
    #[instrument(skip(self), fields(base = %self.base))]
    pub fn preinstantiate_singletons(&self) -> Result<usize> {
        let mut count = 0;
        for name in self.container.bean_definition_names() {
            if self.container.is_singleton(&name)? {
                self.container.get_bean_any(&name)?;
                count += 1;
            }
        }
        info!(singletons = count, "Singletons pre-instantiated");
        Ok(count)
    }

    pub fn get_bean<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>> {
        self.container.get_bean(name)
    }

    pub fn get_bean_any(&self, name: &str) -> Result<Bean> {
        self.container.get_bean_any(name)
    }

    /// Registered bean names, sorted.
    pub fn bean_names(&self) -> Vec<String> {
        self.container.bean_definition_names()
    }

    /// The module path this context was scanned from.
    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn container(&self) -> &Container {
        &self.container
    }
}

impl std::fmt::Debug for ApplicationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApplicationContext")
            .field("base", &self.base)
            .field("container", &self.container)
            .finish()
    }
}
