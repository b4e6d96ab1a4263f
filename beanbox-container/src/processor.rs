//! Bean post-processors and the pipeline that runs them.
//!
//! A [`BeanPostProcessor`] sees every bean the container materializes, at
//! three points:
//!
//! | hook | when | effect of `Some(bean)` | effect of `None` |
//! |---|---|---|---|
//! | `before_instantiation` | before the constructor | becomes the bean; nothing else runs | ask the next processor |
//! | `before_initialization` | after injection, before the init method | replaces the running value | ends the chain |
//! | `after_initialization` | after the init method | replaces the running value | ends the chain |
//!
//! Processors run in registration order. There is no priority and no
//! de-duplication; adding the same processor twice runs it twice.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::trace;

use crate::bean::Bean;
use crate::key::TypeKey;

/// Hooks into bean creation.
///
/// Every hook has a default, so implementors override only what they need.
/// The initialization hooks default to passing the bean through, which
/// keeps the chain going.
///
/// # Examples
/// ```
/// use beanbox_container::prelude::*;
///
/// struct Tracer;
///
/// impl BeanPostProcessor for Tracer {
///     fn after_initialization(&self, bean: &Bean, name: &str) -> Option<Bean> {
///         println!("ready: {name}");
///         Some(bean.clone())
///     }
/// }
/// ```
pub trait BeanPostProcessor: Send + Sync {
    /// Offers a ready-made bean in place of normal construction.
    ///
    /// Returning `Some` skips instantiation, injection, the init method and
    /// both initialization hooks for this retrieval.
    fn before_instantiation(&self, _bean_type: TypeKey, _name: &str) -> Option<Bean> {
        None
    }

    /// Runs after injection, before the init method.
    ///
    /// Returning a different bean than the one given means the init method
    /// runs on the replacement.
    fn before_initialization(&self, bean: &Bean, _name: &str) -> Option<Bean> {
        Some(bean.clone())
    }

    /// Runs after the init method.
    fn after_initialization(&self, bean: &Bean, _name: &str) -> Option<Bean> {
        Some(bean.clone())
    }

    /// Name for logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Append-only, ordered list of processors.
///
/// Readers take a snapshot, so no lock is held while a hook runs and
/// processors added mid-retrieval only affect later retrievals.
#[derive(Default)]
pub(crate) struct PostProcessors {
    processors: RwLock<Vec<Arc<dyn BeanPostProcessor>>>,
}

impl PostProcessors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, processor: Arc<dyn BeanPostProcessor>) {
        self.processors.write().push(processor);
    }

    pub fn len(&self) -> usize {
        self.processors.read().len()
    }

    pub fn snapshot(&self) -> Vec<Arc<dyn BeanPostProcessor>> {
        self.processors.read().clone()
    }

    /// First non-`None` answer wins; later processors are not asked.
    pub fn before_instantiation(&self, bean_type: TypeKey, name: &str) -> Option<Bean> {
        self.snapshot().iter().find_map(|p| {
            let bean = p.before_instantiation(bean_type, name);
            if bean.is_some() {
                trace!(bean = %name, processor = p.name(), "Instantiation short-circuited");
            }
            bean
        })
    }

    pub fn before_initialization(&self, bean: Bean, name: &str) -> Bean {
        Self::chain(self.snapshot(), bean, name, "before_initialization", |p, b, n| {
            p.before_initialization(b, n)
        })
    }

    pub fn after_initialization(&self, bean: Bean, name: &str) -> Bean {
        Self::chain(self.snapshot(), bean, name, "after_initialization", |p, b, n| {
            p.after_initialization(b, n)
        })
    }

    /// Threads `bean` through each processor until one returns `None`.
    fn chain(
        processors: Vec<Arc<dyn BeanPostProcessor>>,
        bean: Bean,
        name: &str,
        hook: &'static str,
        apply: impl Fn(&dyn BeanPostProcessor, &Bean, &str) -> Option<Bean>,
    ) -> Bean {
        let mut current = bean;
        for processor in &processors {
            match apply(processor.as_ref(), &current, name) {
                Some(next) => current = next,
                None => {
                    trace!(bean = %name, processor = processor.name(), hook, "Processor chain ended early");
                    break;
                }
            }
        }
        current
    }
}

impl std::fmt::Debug for PostProcessors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.snapshot();
        let names: Vec<&str> = snapshot.iter().map(|p| p.name()).collect();
        f.debug_list().entries(names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Debug, PartialEq)]
    struct Label(&'static str);

    struct Relabel(&'static str);

    impl BeanPostProcessor for Relabel {
        fn before_initialization(&self, _bean: &Bean, _name: &str) -> Option<Bean> {
            Some(Bean::new(Label(self.0)))
        }

        fn after_initialization(&self, _bean: &Bean, _name: &str) -> Option<Bean> {
            Some(Bean::new(Label(self.0)))
        }
    }

    struct Stop;

    impl BeanPostProcessor for Stop {
        fn before_initialization(&self, _bean: &Bean, _name: &str) -> Option<Bean> {
            None
        }

        fn after_initialization(&self, _bean: &Bean, _name: &str) -> Option<Bean> {
            None
        }
    }

    struct Supply {
        label: &'static str,
        asked: Mutex<usize>,
    }

    impl BeanPostProcessor for Supply {
        fn before_instantiation(&self, _bean_type: TypeKey, _name: &str) -> Option<Bean> {
            *self.asked.lock() += 1;
            Some(Bean::new(Label(self.label)))
        }
    }

    struct PassThrough;

    impl BeanPostProcessor for PassThrough {}

    fn label(bean: &Bean) -> &'static str {
        bean.downcast_ref::<Label>().unwrap().0
    }

    #[test]
    fn empty_pipeline_is_identity() {
        let processors = PostProcessors::new();
        let bean = Bean::new(Label("raw"));

        assert!(Bean::ptr_eq(&processors.before_initialization(bean.clone(), "x"), &bean));
        assert!(Bean::ptr_eq(&processors.after_initialization(bean.clone(), "x"), &bean));
        assert!(processors.before_instantiation(TypeKey::of::<Label>(), "x").is_none());
    }

    #[test]
    fn default_hooks_pass_through() {
        let processors = PostProcessors::new();
        processors.add(Arc::new(PassThrough));
        let bean = Bean::new(Label("raw"));

        assert!(Bean::ptr_eq(&processors.before_initialization(bean.clone(), "x"), &bean));
        assert!(processors.before_instantiation(TypeKey::of::<Label>(), "x").is_none());
    }

    #[test]
    fn last_replacement_wins() {
        let processors = PostProcessors::new();
        processors.add(Arc::new(Relabel("first")));
        processors.add(Arc::new(Relabel("second")));

        let out = processors.after_initialization(Bean::new(Label("raw")), "x");
        assert_eq!(label(&out), "second");
    }

    #[test]
    fn none_ends_chain_keeping_last_value() {
        let processors = PostProcessors::new();
        processors.add(Arc::new(Relabel("kept")));
        processors.add(Arc::new(Stop));
        processors.add(Arc::new(Relabel("never")));

        let out = processors.before_initialization(Bean::new(Label("raw")), "x");
        assert_eq!(label(&out), "kept");
    }

    #[test]
    fn none_first_keeps_input() {
        let processors = PostProcessors::new();
        processors.add(Arc::new(Stop));
        processors.add(Arc::new(Relabel("never")));

        let bean = Bean::new(Label("raw"));
        let out = processors.after_initialization(bean.clone(), "x");
        assert!(Bean::ptr_eq(&out, &bean));
    }

    #[test]
    fn first_supplier_short_circuits() {
        let first = Arc::new(Supply { label: "first", asked: Mutex::new(0) });
        let second = Arc::new(Supply { label: "second", asked: Mutex::new(0) });

        let processors = PostProcessors::new();
        processors.add(Arc::new(PassThrough));
        processors.add(first.clone());
        processors.add(second.clone());

        let bean = processors.before_instantiation(TypeKey::of::<Label>(), "x").unwrap();
        assert_eq!(label(&bean), "first");
        assert_eq!(*first.asked.lock(), 1);
        assert_eq!(*second.asked.lock(), 0);
    }

    #[test]
    fn duplicates_are_kept_in_order() {
        let processors = PostProcessors::new();
        let shared: Arc<dyn BeanPostProcessor> = Arc::new(PassThrough);
        processors.add(Arc::clone(&shared));
        processors.add(shared);

        assert_eq!(processors.len(), 2);
        assert!(format!("{processors:?}").contains("PassThrough"));
    }
}
