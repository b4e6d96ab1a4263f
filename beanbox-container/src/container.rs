//! # The Container
//!
//! Holds bean definitions, materializes beans from them on demand and
//! caches singletons.
//!
//! # Architecture
//! ```text
//! register_bean_definition ──> Registry (name → BeanDefinition)
//!
//! get_bean(name)
//!   ├─ SingletonCache hit ──────────────────────────────> Bean
//!   └─ Registry lookup
//!        ├─ cycle guard (per-call resolution path)
//!        ├─ before_instantiation hooks ── Some ──────────> Bean
//!        ├─ instantiate
//!        ├─ inject (recursive get_bean per injection point)
//!        ├─ before_initialization hooks
//!        ├─ init method
//!        ├─ after_initialization hooks
//!        └─ cache if singleton ─────────────────────────> Bean
//! ```
//!
//! # Examples
//! ```rust
//! use beanbox_container::prelude::*;
//! use std::sync::Arc;
//!
//! #[derive(Default)]
//! struct UserRepository;
//!
//! #[derive(Default)]
//! struct UserService {
//!     repository: Option<Arc<UserRepository>>,
//! }
//!
//! let container = Container::new();
//! container
//!     .register_bean_definition(
//!         "userRepository",
//!         BeanDefinition::new(BeanClass::of_default::<UserRepository>()),
//!     )
//!     .unwrap();
//! container
//!     .register_bean_definition(
//!         "userService",
//!         BeanDefinition::new(
//!             BeanClass::builder::<UserService>()
//!                 .constructor(UserService::default)
//!                 .inject_named("repository", "userRepository", |s: &mut UserService, r| {
//!                     s.repository = Some(r)
//!                 })
//!                 .build(),
//!         ),
//!     )
//!     .unwrap();
//!
//! let service: Arc<UserService> = container.get_bean("userService").unwrap();
//! let repository: Arc<UserRepository> = container.get_bean("userRepository").unwrap();
//! assert!(Arc::ptr_eq(service.repository.as_ref().unwrap(), &repository));
//! ```

use std::any::{Any, type_name};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use beanbox_support::rendering::suggest_similar;
use tracing::{debug, info, instrument, trace, warn};

use crate::bean::Bean;
use crate::cache::SingletonCache;
use crate::descriptor::BeanDefinition;
use crate::error::{ContainerError, CyclicDependencyError, DefinitionNotFoundError, Result};
use crate::graph::GraphValidator;
use crate::inject::{BeanResolver, inject};
use crate::instantiate::instantiate;
use crate::interceptor::{INTERCEPTION, MethodInterceptor};
use crate::lifecycle::invoke_init;
use crate::processor::{BeanPostProcessor, PostProcessors};
use crate::provider::{DefinitionRegistry, DefinitionSource};
use crate::registry::Registry;
use crate::settings::{ContainerSettings, Pipeline, SingletonCreation};

const MAX_SUGGESTIONS: usize = 3;

// ============================================================
// ContainerBuilder
// ============================================================

/// Builds a [`Container`] from settings, definitions, processors and
/// definition sources.
///
/// Everything is registered in the order it was added: processors first,
/// then definitions, then sources. [`build`](ContainerBuilder::build)
/// returns the first registration error.
///
/// # Examples
/// ```rust
/// use beanbox_container::prelude::*;
///
/// #[derive(Default)]
/// struct Clock;
///
/// let container = Container::builder()
///     .singleton_creation(SingletonCreation::Exclusive)
///     .definition("clock", BeanDefinition::new(BeanClass::of_default::<Clock>()))
///     .validate_on_build()
///     .build()
///     .unwrap();
///
/// assert!(container.contains_bean_definition("clock"));
/// ```
#[derive(Default)]
pub struct ContainerBuilder {
    settings: ContainerSettings,
    definitions: Vec<(String, BeanDefinition)>,
    processors: Vec<Arc<dyn BeanPostProcessor>>,
    sources: Vec<Box<dyn DefinitionSource>>,
    validate: bool,
}

impl ContainerBuilder {
    fn new() -> Self {
        Self::default()
    }

    /// Replaces all settings at once.
    pub fn settings(mut self, settings: ContainerSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn pipeline(mut self, pipeline: Pipeline) -> Self {
        self.settings.pipeline = pipeline;
        self
    }

    pub fn singleton_creation(mut self, mode: SingletonCreation) -> Self {
        self.settings.singleton_creation = mode;
        self
    }

    pub fn definition(mut self, name: impl Into<String>, definition: BeanDefinition) -> Self {
        self.definitions.push((name.into(), definition));
        self
    }

    pub fn post_processor(mut self, processor: Arc<dyn BeanPostProcessor>) -> Self {
        self.processors.push(processor);
        self
    }

    /// Adds a [`DefinitionSource`] to run at build time.
    pub fn source(mut self, source: impl DefinitionSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Runs [`Container::validate`] as the last build step.
    pub fn validate_on_build(mut self) -> Self {
        self.validate = true;
        self
    }

    /// Builds the container.
    ///
    /// # Errors
    /// The first registration error, or a validation error when
    /// [`validate_on_build`](Self::validate_on_build) was requested.
    #[instrument(skip(self), name = "container_build")]
    pub fn build(self) -> Result<Container> {
        let container = Container::with_settings(self.settings);

        for processor in self.processors {
            container.add_bean_post_processor(processor);
        }
        for (name, definition) in self.definitions {
            container.register_bean_definition(&name, definition)?;
        }
        for source in &self.sources {
            container.add_source(source.as_ref())?;
        }
        if self.validate {
            container.validate()?;
        }

        info!(
            definitions = container.bean_definition_count(),
            processors = container.post_processor_count(),
            "Container built"
        );
        Ok(container)
    }
}

impl fmt::Debug for ContainerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerBuilder")
            .field("settings", &self.settings)
            .field("definitions", &self.definitions.len())
            .field("processors", &self.processors.len())
            .field("sources", &self.sources.len())
            .field("validate", &self.validate)
            .finish()
    }
}

// ============================================================
// Container
// ============================================================

/// Thread-safe bean container.
///
/// Share it by reference or behind an `Arc`. Definitions and processors
/// can be added at any time, but are normally all in place before the
/// first `get_bean`.
///
/// There is no teardown: cached singletons live as long as the container.
pub struct Container {
    settings: ContainerSettings,
    registry: Registry,
    singletons: SingletonCache,
    processors: PostProcessors,
}

impl Container {
    /// An empty container with default settings.
    pub fn new() -> Self {
        Self::with_settings(ContainerSettings::default())
    }

    pub fn with_settings(settings: ContainerSettings) -> Self {
        debug!(?settings, "Creating container");
        Self {
            settings,
            registry: Registry::new(),
            singletons: SingletonCache::new(),
            processors: PostProcessors::new(),
        }
    }

    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    pub fn settings(&self) -> &ContainerSettings {
        &self.settings
    }

    // ── Registration ──

    /// Registers `definition` under `name`.
    ///
    /// # Errors
    /// [`ContainerError::DuplicateRegistration`] if `name` is taken. The
    /// stored definition is left untouched.
    pub fn register_bean_definition(&self, name: &str, definition: BeanDefinition) -> Result<()> {
        self.registry.register(name, definition)
    }

    /// Appends a post-processor. Order of addition is order of invocation.
    pub fn add_bean_post_processor(&self, processor: Arc<dyn BeanPostProcessor>) {
        debug!(processor = processor.name(), "Added bean post-processor");
        self.processors.add(processor);
    }

    /// Always fails: method interception is not supported.
    ///
    /// # Errors
    /// [`ContainerError::UnsupportedCapability`], whatever the container's
    /// state and whether or not `name` is registered.
    pub fn register_interceptor(&self, name: &str, interceptor: Arc<dyn MethodInterceptor>) -> Result<()> {
        warn!(bean = %name, interceptor = interceptor.name(), "Rejected method interceptor");
        Err(ContainerError::UnsupportedCapability {
            capability: INTERCEPTION,
            name: name.to_string(),
        })
    }

    /// Runs a [`DefinitionSource`] against this container.
    ///
    /// # Errors
    /// Whatever the source returns, typically the first
    /// [`ContainerError::DuplicateRegistration`].
    pub fn add_source(&self, source: &dyn DefinitionSource) -> Result<()> {
        debug!(source = source.name(), "Registering definition source");
        source.register(self)
    }

    // ── Retrieval ──

    /// Returns the bean named `name` as `T`.
    ///
    /// # Errors
    /// Any error of [`get_bean_any`](Self::get_bean_any), or
    /// [`ContainerError::TypeMismatch`] if the bean is not a `T`. A
    /// mismatched singleton is still cached.
    pub fn get_bean<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>> {
        self.get_bean_any(name)?
            .downcast::<T>()
            .map_err(|bean| ContainerError::TypeMismatch {
                name: name.to_string(),
                expected: type_name::<T>(),
                actual: bean.type_name(),
            })
    }

    /// Returns the bean named `name`, whatever its type.
    ///
    /// # Errors
    /// - [`ContainerError::DefinitionNotFound`]
    /// - [`ContainerError::NonInstantiableType`]
    /// - [`ContainerError::UnsupportedConstructorShape`]
    /// - [`ContainerError::BeanCreationFailure`]
    /// - [`ContainerError::InjectionFailure`]
    /// - [`ContainerError::LifecycleInvocationFailure`]
    /// - [`ContainerError::CyclicDependency`]
    ///
    /// A failed call caches nothing and can be retried.
    pub fn get_bean_any(&self, name: &str) -> Result<Bean> {
        trace!(bean = %name, "Retrieving bean");
        self.retrieve(name, None)
    }

    fn retrieve(&self, name: &str, parent: Option<&ResolutionPath<'_>>) -> Result<Bean> {
        if let Some(bean) = self.singletons.get(name) {
            return Ok(bean);
        }

        let definition = self.registry.get(name).ok_or_else(|| {
            ContainerError::DefinitionNotFound(DefinitionNotFoundError {
                name: name.to_string(),
                required_by: parent.map(|p| p.name.to_string()),
                suggestions: suggest_similar(name, &self.registry.names(), MAX_SUGGESTIONS),
            })
        })?;

        if let Some(parent) = parent.filter(|p| p.contains(name)) {
            let chain = parent.chain_to(name);
            warn!(cycle = ?chain, "Cyclic dependency detected");
            return Err(ContainerError::CyclicDependency(CyclicDependencyError { chain }));
        }

        let path = ResolutionPath { name, parent };

        if !definition.is_singleton() {
            return self.materialize(name, &definition, &path);
        }

        match self.settings.singleton_creation {
            SingletonCreation::Racy => {
                let bean = self.materialize(name, &definition, &path)?;
                self.singletons.insert(name, bean.clone());
                info!(bean = %name, type_name = bean.type_name(), "Created singleton");
                Ok(bean)
            }
            SingletonCreation::Exclusive => self.singletons.get_or_try_init(name, || {
                let bean = self.materialize(name, &definition, &path)?;
                info!(bean = %name, type_name = bean.type_name(), "Created singleton");
                Ok(bean)
            }),
        }
    }

    /// Builds a new bean from `definition`, running the configured stages.
    fn materialize(&self, name: &str, definition: &BeanDefinition, path: &ResolutionPath<'_>) -> Result<Bean> {
        let class = definition.bean_class();

        if !self.settings.pipeline.wires_lifecycle() {
            let instance = instantiate(name, class)?;
            return Ok(Bean::from_boxed(instance, class.type_key()));
        }

        if let Some(bean) = self.processors.before_instantiation(class.type_key(), name) {
            return Ok(bean);
        }

        let mut instance = instantiate(name, class)?;
        let resolver = ContainerResolver { container: self, path };
        inject(name, class, &mut *instance, &resolver)?;

        let bean = Bean::from_boxed(instance, class.type_key());
        let mut bean = self.processors.before_initialization(bean, name);
        invoke_init(name, definition, &mut bean)?;
        Ok(self.processors.after_initialization(bean, name))
    }

    // ── Validation ──

    /// Checks the declared dependency graph without building anything.
    ///
    /// # Errors
    /// - [`ContainerError::DefinitionNotFound`]: an injection point names
    ///   an unregistered bean; `required_by` names the bean declaring it
    /// - [`ContainerError::CyclicDependency`]: injection points form a cycle
    #[instrument(skip(self))]
    pub fn validate(&self) -> Result<()> {
        let edges: BTreeMap<String, Vec<String>> = self
            .registry
            .snapshot()
            .into_iter()
            .map(|(name, definition)| {
                let dependencies = definition
                    .bean_class()
                    .dependency_names()
                    .map(str::to_string)
                    .collect();
                (name, dependencies)
            })
            .collect();

        GraphValidator::new(edges).validate()
    }

    // ── Introspection ──

    pub fn contains_bean_definition(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    pub fn bean_definition(&self, name: &str) -> Option<Arc<BeanDefinition>> {
        self.registry.get(name)
    }

    /// Registered names, sorted.
    pub fn bean_definition_names(&self) -> Vec<String> {
        self.registry.names()
    }

    pub fn bean_definition_count(&self) -> usize {
        self.registry.len()
    }

    /// Whether `name` is registered with singleton scope.
    ///
    /// # Errors
    /// [`ContainerError::DefinitionNotFound`] if `name` is not registered.
    pub fn is_singleton(&self, name: &str) -> Result<bool> {
        self.registry
            .get(name)
            .map(|d| d.is_singleton())
            .ok_or_else(|| {
                ContainerError::DefinitionNotFound(DefinitionNotFoundError {
                    name: name.to_string(),
                    required_by: None,
                    suggestions: suggest_similar(name, &self.registry.names(), MAX_SUGGESTIONS),
                })
            })
    }

    pub fn post_processor_count(&self) -> usize {
        self.processors.len()
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl DefinitionRegistry for Container {
    fn register_bean_definition(&self, name: &str, definition: BeanDefinition) -> Result<()> {
        Container::register_bean_definition(self, name, definition)
    }

    fn add_bean_post_processor(&self, processor: Arc<dyn BeanPostProcessor>) {
        Container::add_bean_post_processor(self, processor);
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("settings", &self.settings)
            .field("definitions", &self.registry.len())
            .field("singletons", &self.singletons.len())
            .field("processors", &self.processors)
            .finish()
    }
}

// ============================================================
// Resolution path
// ============================================================

/// Names being built on the current call stack, innermost first.
struct ResolutionPath<'a> {
    name: &'a str,
    parent: Option<&'a ResolutionPath<'a>>,
}

impl ResolutionPath<'_> {
    fn contains(&self, name: &str) -> bool {
        self.name == name || self.parent.is_some_and(|p| p.contains(name))
    }

    /// Outermost-first names from where `name` was first entered, ending
    /// with `name` again.
    fn chain_to(&self, name: &str) -> Vec<String> {
        let mut reversed = Vec::new();
        let mut current = Some(self);
        while let Some(step) = current {
            reversed.push(step.name.to_string());
            if step.name == name {
                break;
            }
            current = step.parent;
        }
        reversed.reverse();
        reversed.push(name.to_string());
        reversed
    }
}

/// Feeds injection lookups back into the container on the same path.
struct ContainerResolver<'a> {
    container: &'a Container,
    path: &'a ResolutionPath<'a>,
}

impl BeanResolver for ContainerResolver<'_> {
    fn resolve_bean(&self, name: &str) -> Result<Bean> {
        self.container.retrieve(name, Some(self.path))
    }
}

// ============================================================
// Prelude
// ============================================================

pub mod prelude {
    pub use super::{Container, ContainerBuilder};
    pub use crate::bean::Bean;
    pub use crate::descriptor::{BeanClass, BeanClassBuilder, BeanDefinition, TypeKind};
    pub use crate::error::{ContainerError, Result};
    pub use crate::inject::BeanResolver;
    pub use crate::interceptor::MethodInterceptor;
    pub use crate::key::TypeKey;
    pub use crate::processor::BeanPostProcessor;
    pub use crate::provider::{DefinitionRegistry, DefinitionSource};
    pub use crate::scope::Scope;
    pub use crate::settings::{ContainerSettings, Pipeline, SingletonCreation};
}

// ============================================================
// Tests
// ============================================================
