//! Singleton cache.
//!
//! Holds at most one materialized bean per name. Entries are never
//! removed. Two write paths exist, matching [`SingletonCreation`]:
//! - [`SingletonCache::insert`]: last write wins, no coordination
//! - [`SingletonCache::get_or_try_init`]: a per-name `OnceCell` gate, so
//!   only one materialization per name can succeed
//!
//! [`SingletonCreation`]: crate::settings::SingletonCreation

use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::OnceCell;
use tracing::{debug, trace};

use crate::bean::Bean;
use crate::error::Result;

#[derive(Debug, Default)]
pub(crate) struct SingletonCache {
    instances: DashMap<String, Bean>,
    gates: DashMap<String, Arc<OnceCell<Bean>>>,
}

impl SingletonCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<Bean> {
        let bean = self.instances.get(name).map(|entry| entry.value().clone());
        if bean.is_some() {
            trace!(bean = %name, "Singleton cache hit");
        }
        bean
    }

    /// Unconditional insert. A concurrent builder of the same name may
    /// overwrite this entry; whichever write lands last is what later
    /// lookups see.
    pub fn insert(&self, name: &str, bean: Bean) {
        if let Some(previous) = self.instances.insert(name.to_string(), bean) {
            debug!(
                bean = %name,
                discarded = ?previous,
                "Concurrent creation replaced a cached singleton"
            );
        } else {
            debug!(bean = %name, "Cached singleton");
        }
    }

    /// Runs `create` at most once successfully per name.
    ///
    /// Other callers for the same name block until the first one finishes.
    /// If `create` fails the gate stays empty and the next caller retries.
    /// `create` must not re-enter this method for the same name on the same
    /// thread.
    pub fn get_or_try_init(&self, name: &str, create: impl FnOnce() -> Result<Bean>) -> Result<Bean> {
        let gate = self.gate(name);
        let bean = gate.get_or_try_init(create)?.clone();
        self.instances
            .entry(name.to_string())
            .or_insert_with(|| bean.clone());
        Ok(bean)
    }

    /// Clones the gate out so no shard lock is held while building.
    fn gate(&self, name: &str) -> Arc<OnceCell<Bean>> {
        Arc::clone(self.gates.entry(name.to_string()).or_default().value())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.instances.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }
}
