//! Descriptor store: one definition per logical bean name.
//!
//! Names are unique for the lifetime of the store: there is no update or
//! removal, and a second registration under a taken name is rejected
//! without touching the stored definition.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

use crate::descriptor::BeanDefinition;
use crate::error::{ContainerError, DuplicateRegistrationError, Result};

/// Concurrent map from logical name to definition.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    definitions: DashMap<String, Arc<BeanDefinition>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `definition` under `name`.
    ///
    /// The existence check and the insert happen under the same shard lock,
    /// so two racing registrations of one name cannot both succeed.
    ///
    /// # Errors
    /// [`ContainerError::DuplicateRegistration`] if the name is taken.
    pub fn register(&self, name: &str, definition: BeanDefinition) -> Result<()> {
        match self.definitions.entry(name.to_string()) {
            Entry::Occupied(existing) => Err(ContainerError::DuplicateRegistration(
                DuplicateRegistrationError {
                    name: name.to_string(),
                    existing_type: existing.get().type_key().type_name(),
                },
            )),
            Entry::Vacant(slot) => {
                debug!(
                    bean = %name,
                    type_name = definition.type_key().type_name(),
                    scope = %definition.scope(),
                    "Registered bean definition"
                );
                slot.insert(Arc::new(definition));
                Ok(())
            }
        }
    }

    /// Looks up a definition. The shard lock is released before returning.
    pub fn get(&self, name: &str) -> Option<Arc<BeanDefinition>> {
        self.definitions.get(name).map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// All registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.definitions.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Point-in-time copy of every definition, sorted by name.
    pub fn snapshot(&self) -> Vec<(String, Arc<BeanDefinition>)> {
        let mut all: Vec<_> = self
            .definitions
            .iter()
            .map(|e| (e.key().clone(), Arc::clone(e.value())))
            .collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::BeanClass;

    #[derive(Default)]
    struct Database;

    #[derive(Default)]
    struct Cache;

    #[test]
    fn register_and_get() {
        let registry = Registry::new();
        registry
            .register("database", BeanDefinition::new(BeanClass::of_default::<Database>()))
            .unwrap();

        assert!(registry.contains("database"));
        assert!(registry.get("database").unwrap().type_key().is::<Database>());
        assert!(registry.get("cache").is_none());
    }

    #[test]
    fn duplicate_is_rejected_and_first_kept() {
        let registry = Registry::new();
        registry
            .register("x", BeanDefinition::new(BeanClass::of_default::<Database>()))
            .unwrap();

        let err = registry
            .register("x", BeanDefinition::prototype(BeanClass::of_default::<Cache>()))
            .unwrap_err();

        match err {
            ContainerError::DuplicateRegistration(e) => {
                assert_eq!(e.name, "x");
                assert!(e.existing_type.ends_with("Database"));
            }
            other => panic!("Expected DuplicateRegistration, got: {other:?}"),
        }

        let kept = registry.get("x").unwrap();
        assert!(kept.type_key().is::<Database>());
        assert!(kept.is_singleton());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn names_are_sorted() {
        let registry = Registry::new();
        for name in ["zeta", "alpha", "mid"] {
            registry
                .register(name, BeanDefinition::new(BeanClass::of_default::<Cache>()))
                .unwrap();
        }
        assert_eq!(registry.names(), vec!["alpha", "mid", "zeta"]);
        assert_eq!(registry.snapshot()[0].0, "alpha");
    }

    #[test]
    fn racing_registrations_admit_one() {
        let registry = Registry::new();
        let wins = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    s.spawn(|| {
                        registry
                            .register("shared", BeanDefinition::new(BeanClass::of_default::<Cache>()))
                            .is_ok()
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .filter(|won| *won)
                .count()
        });

        assert_eq!(wins, 1);
        assert_eq!(registry.len(), 1);
    }
}
