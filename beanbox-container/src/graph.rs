//! Static validation of the declared dependency graph.
//!
//! Walks the injection points of every registered definition, by logical
//! name, and reports the first problem found:
//! - a dependency name with no definition
//! - a cycle through injection points
//!
//! Validation is optional. `get_bean` detects the same problems lazily, one
//! retrieval at a time; this check finds them all up front without building
//! anything.

use std::collections::{BTreeMap, HashSet};

use beanbox_support::rendering::suggest_similar;
use tracing::{debug, instrument, warn};

use crate::error::{ContainerError, CyclicDependencyError, DefinitionNotFoundError};

const MAX_SUGGESTIONS: usize = 3;

/// Depth-first validator over name → dependency names.
pub(crate) struct GraphValidator {
    /// Each bean's declared dependencies, in declaration order.
    edges: BTreeMap<String, Vec<String>>,
    visiting: HashSet<String>,
    validated: HashSet<String>,
    path: Vec<String>,
}

impl GraphValidator {
    pub fn new(edges: BTreeMap<String, Vec<String>>) -> Self {
        Self {
            edges,
            visiting: HashSet::new(),
            validated: HashSet::new(),
            path: Vec::new(),
        }
    }

    /// Validates every bean, in name order.
    ///
    /// # Errors
    /// - [`ContainerError::DefinitionNotFound`] with `required_by` set
    /// - [`ContainerError::CyclicDependency`] with the offending chain
    #[instrument(skip(self), name = "graph_validation", fields(beans = self.edges.len()))]
    pub fn validate(&mut self) -> Result<(), ContainerError> {
        let names: Vec<String> = self.edges.keys().cloned().collect();

        for name in &names {
            self.visit(name)?;
        }

        debug!("Dependency graph validation passed");
        Ok(())
    }

    fn visit(&mut self, name: &str) -> Result<(), ContainerError> {
        if self.validated.contains(name) {
            return Ok(());
        }

        if self.visiting.contains(name) {
            let start = self.path.iter().position(|n| n == name).unwrap_or(0);
            let mut chain = self.path[start..].to_vec();
            chain.push(name.to_string());

            warn!(cycle = ?chain, "Cyclic dependency declared");
            return Err(ContainerError::CyclicDependency(CyclicDependencyError { chain }));
        }

        let Some(dependencies) = self.edges.get(name).cloned() else {
            let known: Vec<&String> = self.edges.keys().collect();
            return Err(ContainerError::DefinitionNotFound(DefinitionNotFoundError {
                name: name.to_string(),
                required_by: self.path.last().cloned(),
                suggestions: suggest_similar(name, &known, MAX_SUGGESTIONS),
            }));
        };

        self.visiting.insert(name.to_string());
        self.path.push(name.to_string());

        for dependency in &dependencies {
            self.visit(dependency)?;
        }

        self.path.pop();
        self.visiting.remove(name);
        self.validated.insert(name.to_string());
        Ok(())
    }
}
