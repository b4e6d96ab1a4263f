//! Component records and module-path scanning.
//!
//! Every `#[derive(Component)]` type submits a [`Component`] record through
//! `inventory`. Post-processors are submitted by hand as
//! [`PostProcessorComponent`]s:
//!
//! ```ignore
//! beanbox::inventory::submit! {
//!     beanbox::PostProcessorComponent::new(module_path!(), || std::sync::Arc::new(AuditProcessor))
//! }
//! ```

use std::sync::Arc;

use tracing::{debug, instrument};

use beanbox_container::descriptor::BeanDefinition;
use beanbox_container::error::Result;
use beanbox_container::processor::BeanPostProcessor;
use beanbox_container::provider::{DefinitionRegistry, DefinitionSource};

/// Implemented by `#[derive(Component)]`.
pub trait BeanComponent: Send + Sync + 'static {
    /// Logical name the type registers under.
    const BEAN_NAME: &'static str;

    fn bean_definition() -> BeanDefinition;
}

/// A discoverable bean definition.
#[derive(Debug, Clone, Copy)]
pub struct Component {
    pub name: &'static str,
    /// `module_path!()` of the declaring module.
    pub module_path: &'static str,
    pub definition: fn() -> BeanDefinition,
}

impl Component {
    pub const fn new(name: &'static str, module_path: &'static str, definition: fn() -> BeanDefinition) -> Self {
        Self {
            name,
            module_path,
            definition,
        }
    }
}

inventory::collect!(Component);

/// A discoverable post-processor.
#[derive(Debug, Clone, Copy)]
pub struct PostProcessorComponent {
    pub module_path: &'static str,
    pub factory: fn() -> Arc<dyn BeanPostProcessor>,
}

impl PostProcessorComponent {
    pub const fn new(module_path: &'static str, factory: fn() -> Arc<dyn BeanPostProcessor>) -> Self {
        Self { module_path, factory }
    }
}

inventory::collect!(PostProcessorComponent);

/// Whether `module_path` is `base` or one of its descendants.
fn in_namespace(module_path: &str, base: &str) -> bool {
    match module_path.strip_prefix(base) {
        Some("") => true,
        Some(rest) => rest.starts_with("::"),
        None => false,
    }
}

/// Registers every submitted component under a module path.
///
/// Post-processors under `base` are added first, in submission order;
/// then bean definitions, in name order so that duplicate-name errors are
/// reported deterministically.
#[derive(Debug, Clone)]
pub struct ComponentScan {
    base: String,
}

impl ComponentScan {
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Components under the base path, sorted by name.
    pub fn components(&self) -> Vec<&'static Component> {
        let mut found: Vec<&'static Component> = inventory::iter::<Component>
            .into_iter()
            .filter(|c| in_namespace(c.module_path, &self.base))
            .collect();
        found.sort_by_key(|c| c.name);
        found
    }

    pub fn post_processors(&self) -> Vec<&'static PostProcessorComponent> {
        inventory::iter::<PostProcessorComponent>
            .into_iter()
            .filter(|p| in_namespace(p.module_path, &self.base))
            .collect()
    }
}

impl DefinitionSource for ComponentScan {
    #[instrument(skip_all, fields(base = %self.base))]
    fn register(&self, registry: &dyn DefinitionRegistry) -> Result<()> {
        for processor in self.post_processors() {
            let processor = (processor.factory)();
            debug!(processor = processor.name(), "Scanned post-processor");
            registry.add_bean_post_processor(processor);
        }

        for component in self.components() {
            debug!(bean = component.name, module = component.module_path, "Scanned component");
            registry.register_bean_definition(component.name, (component.definition)())?;
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "ComponentScan"
    }
}
