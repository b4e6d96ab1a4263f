//! Core container implementation for beanbox.

pub mod bean;
mod cache;
pub mod container;
pub mod descriptor;
pub mod error;
mod graph;
pub mod inject;
mod instantiate;
pub mod interceptor;
pub mod key;
mod lifecycle;
pub mod processor;
pub mod provider;
mod registry;
pub mod scope;
pub mod settings;

pub use bean::Bean;
pub use container::{Container, ContainerBuilder, prelude};
pub use descriptor::{BeanClass, BeanClassBuilder, BeanDefinition, TypeKind};
pub use error::{ContainerError, Result};
pub use key::TypeKey;
pub use scope::Scope;
