//! # beanbox
//!
//! A small IoC container for named beans: register definitions, retrieve
//! singletons or prototypes by name, hook into creation with
//! post-processors.
//!
//! Definitions can be written by hand against
//! [`Container`](beanbox_container::Container), or derived with
//! `#[derive(Component)]` and discovered by an [`ApplicationContext`]:
//!
//! ```ignore
//! use std::sync::Arc;
//! use beanbox::{ApplicationContext, Component};
//!
//! #[derive(Default, Component)]
//! pub struct UserRepository;
//!
//! #[derive(Default, Component)]
//! pub struct UserService {
//!     #[autowired]
//!     user_repository: Option<Arc<UserRepository>>,
//! }
//!
//! let context = ApplicationContext::scan(module_path!())?;
//! let service: Arc<UserService> = context.get_bean("userService")?;
//! ```

extern crate self as beanbox;

pub mod component;
pub mod config;
pub mod context;

pub use beanbox_container::prelude::*;
pub use beanbox_container::{bean, container, descriptor, error, inject, interceptor, key, processor, provider, scope, settings};
pub use beanbox_macros::Component;
pub use beanbox_support::{logging, rendering};

pub use component::{BeanComponent, Component, ComponentScan, PostProcessorComponent};
pub use config::{AppConfig, ConfigError};
pub use context::{ApplicationContext, ContextError};

#[doc(hidden)]
pub use inventory;
