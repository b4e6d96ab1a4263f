//! Procedural macros for beanbox.

mod component;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Derives `BeanComponent` and registers the type for component scanning.
///
/// ```ignore
/// #[derive(Default, Component)]
/// #[component(name = "userService", prototype, init = "start")]
/// pub struct UserService {
///     #[autowired]
///     user_repository: Option<Arc<UserRepository>>,
///     #[autowired(name = "auditLog")]
///     audit: Option<Arc<AuditLog>>,
/// }
/// ```
///
/// Struct options, all optional:
/// - `name`: bean name, default the type name in lower camel case
/// - `prototype`: a new instance per retrieval instead of a singleton
/// - `init`: a `&mut self` method to run after injection, returning `()`
///   or `Result<(), E>`
///
/// `#[autowired]` fields must be `Option<Arc<T>>`; the dependency name is
/// the field name unless `name` is given. The type must implement
/// `Default`, which is used as its zero-argument constructor.
#[proc_macro_derive(Component, attributes(component, autowired))]
pub fn derive_component(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    component::expand(&input)
        .unwrap_or_else(|err| err.write_errors())
        .into()
}
