//! Instantiation engine.
//!
//! Turns a bean class into a fresh, unwired instance. Only zero-argument
//! construction is supported.

use std::any::Any;

use tracing::trace;

use crate::descriptor::BeanClass;
use crate::error::{ContainerError, Result, UnsupportedConstructorError};

/// Builds a new instance of `class` for the bean `name`.
///
/// # Errors
/// - [`ContainerError::NonInstantiableType`]: interface, primitive or array;
///   constructors are not looked at
/// - [`ContainerError::UnsupportedConstructorShape`]: no zero-argument
///   constructor, whatever else is declared
/// - [`ContainerError::BeanCreationFailure`]: the constructor failed
pub(crate) fn instantiate(name: &str, class: &BeanClass) -> Result<Box<dyn Any + Send + Sync>> {
    if !class.kind().is_instantiable() {
        return Err(ContainerError::NonInstantiableType {
            name: name.to_string(),
            type_name: class.type_name(),
            kind: class.kind(),
        });
    }

    let constructor = class
        .constructors()
        .iter()
        .find_map(|c| c.zero_arg_invoker())
        .ok_or_else(|| {
            ContainerError::UnsupportedConstructorShape(UnsupportedConstructorError {
                name: name.to_string(),
                type_name: class.type_name(),
                declared: class
                    .constructors()
                    .iter()
                    .map(|c| c.signature(class.type_key()))
                    .collect(),
            })
        })?;

    trace!(bean = %name, type_name = class.type_name(), "Invoking zero-argument constructor");

    constructor().map_err(|source| ContainerError::BeanCreationFailure {
        name: name.to_string(),
        type_name: class.type_name(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default, PartialEq)]
    struct Widget {
        size: u32,
    }

    #[test]
    fn zero_arg_constructor_is_used() {
        let class = BeanClass::builder::<Widget>()
            .declared_constructor(&["u32"])
            .constructor(|| Widget { size: 3 })
            .build();

        let instance = instantiate("widget", &class).unwrap();
        assert_eq!(instance.downcast_ref::<Widget>(), Some(&Widget { size: 3 }));
    }

    #[test]
    fn non_class_kinds_are_rejected_before_construction() {
        trait Gadget {}

        for class in [
            BeanClass::interface::<dyn Gadget>(),
            BeanClass::primitive::<u32>(),
            BeanClass::array::<[Widget; 2]>(),
        ] {
            match instantiate("thing", &class) {
                Err(ContainerError::NonInstantiableType { name, kind, .. }) => {
                    assert_eq!(name, "thing");
                    assert_eq!(kind, class.kind());
                }
                other => panic!("Expected NonInstantiableType, got: {other:?}"),
            }
        }
    }

    #[test]
    fn parameterised_constructors_only_is_unsupported() {
        let class = BeanClass::builder::<Widget>()
            .declared_constructor(&["u32"])
            .declared_constructor(&["u32", "u32"])
            .build();

        match instantiate("widget", &class) {
            Err(ContainerError::UnsupportedConstructorShape(e)) => {
                assert_eq!(e.declared, vec!["Widget(u32)", "Widget(u32, u32)"]);
            }
            other => panic!("Expected UnsupportedConstructorShape, got: {other:?}"),
        }
    }

    #[test]
    fn no_constructor_is_unsupported() {
        let class = BeanClass::builder::<Widget>().build();
        assert!(matches!(
            instantiate("widget", &class),
            Err(ContainerError::UnsupportedConstructorShape(e)) if e.declared.is_empty()
        ));
    }

    #[test]
    fn constructor_error_is_wrapped() {
        let class = BeanClass::builder::<Widget>()
            .try_constructor(|| Err::<Widget, _>("disk full"))
            .build();

        match instantiate("widget", &class) {
            Err(ContainerError::BeanCreationFailure { name, source, .. }) => {
                assert_eq!(name, "widget");
                assert_eq!(source.to_string(), "disk full");
            }
            other => panic!("Expected BeanCreationFailure, got: {other:?}"),
        }
    }

    #[test]
    fn each_call_builds_a_new_instance() {
        let calls = Arc::new(AtomicUsize::new(0));
        let class = BeanClass::builder::<Widget>()
            .constructor({
                let calls = Arc::clone(&calls);
                move || Widget {
                    size: calls.fetch_add(1, Ordering::SeqCst) as u32,
                }
            })
            .build();

        let a = instantiate("w", &class).unwrap();
        let b = instantiate("w", &class).unwrap();
        assert_eq!(a.downcast_ref::<Widget>().unwrap().size, 0);
        assert_eq!(b.downcast_ref::<Widget>().unwrap().size, 1);
    }
}
