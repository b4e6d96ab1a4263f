//! Bean scopes.
//!
//! A scope decides whether a materialized bean is remembered:
//! - [`Scope::Singleton`]: built once, cached, shared by every caller
//! - [`Scope::Prototype`]: built fresh on every retrieval, never cached

use std::fmt;

/// Lifetime of the instances produced for one bean definition.
///
/// # Examples
/// ```
/// use beanbox_container::scope::Scope;
///
/// assert!(Scope::Singleton.is_singleton());
/// assert!(!Scope::Prototype.is_singleton());
/// assert_eq!(Scope::default(), Scope::Singleton);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Scope {
    /// One instance per container.
    ///
    /// Created on first retrieval and cached for the lifetime of the
    /// container. Every later retrieval returns the same instance.
    #[default]
    Singleton,

    /// A new instance on every retrieval.
    Prototype,
}

impl Scope {
    /// Returns `true` if instances of this scope are cached.
    #[inline]
    pub fn is_singleton(&self) -> bool {
        matches!(self, Scope::Singleton)
    }

    /// Maps the descriptor's singleton flag onto a scope.
    #[inline]
    pub fn from_singleton_flag(singleton: bool) -> Self {
        if singleton {
            Scope::Singleton
        } else {
            Scope::Prototype
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Singleton => write!(f, "singleton"),
            Scope::Prototype => write!(f, "prototype"),
        }
    }
}
