//! Definition sources: bundles of related bean definitions.
//!
//! A source registers its definitions (and optionally post-processors)
//! into anything implementing [`DefinitionRegistry`]. The container is one;
//! a test double is another, so sources can be checked in isolation.
//!
//! # Examples
//! ```
//! use beanbox_container::prelude::*;
//!
//! #[derive(Default)]
//! struct Mailer;
//!
//! struct MailSource;
//!
//! impl DefinitionSource for MailSource {
//!     fn register(&self, registry: &dyn DefinitionRegistry) -> Result<()> {
//!         registry.register_bean_definition("mailer", BeanDefinition::new(BeanClass::of_default::<Mailer>()))
//!     }
//! }
//!
//! let container = Container::new();
//! container.add_source(&MailSource).unwrap();
//! assert!(container.contains_bean_definition("mailer"));
//! ```

use std::sync::Arc;

use crate::descriptor::BeanDefinition;
use crate::error::Result;
use crate::processor::BeanPostProcessor;

/// Something that registers bean definitions.
pub trait DefinitionSource: Send + Sync {
    /// Registers everything this source knows about.
    ///
    /// Implementations should stop at the first failed registration and
    /// return its error.
    fn register(&self, registry: &dyn DefinitionRegistry) -> Result<()>;

    /// Human-readable name for logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// The registration half of a container, as seen by a [`DefinitionSource`].
pub trait DefinitionRegistry {
    fn register_bean_definition(&self, name: &str, definition: BeanDefinition) -> Result<()>;

    fn add_bean_post_processor(&self, processor: Arc<dyn BeanPostProcessor>);
}
