//! Injection engine.
//!
//! Fills a fresh instance's injection points by resolving each dependency
//! by logical name through a [`BeanResolver`]. Injection is one level deep:
//! the resolver materializes dependencies through the normal retrieval
//! path, which injects them in turn.

use std::any::Any;

use tracing::trace;

use crate::bean::Bean;
use crate::descriptor::BeanClass;
use crate::error::{BoxError, ContainerError, Result};

/// Resolves beans by logical name.
///
/// This is what the injection engine sees of the container. Keeping it a
/// trait lets the engine be driven without a full container, and lets the
/// container thread per-call resolution state through it.
pub trait BeanResolver {
    fn resolve_bean(&self, name: &str) -> Result<Bean>;
}

/// Injects every declared dependency into `instance`.
///
/// Points are processed in declaration order and the first failure stops
/// the run.
///
/// # Errors
/// [`ContainerError::InjectionFailure`] wrapping the lookup, type or
/// assignment error. A [`ContainerError::CyclicDependency`] from the lookup
/// is passed through unwrapped.
pub(crate) fn inject(
    name: &str,
    class: &BeanClass,
    instance: &mut (dyn Any + Send + Sync),
    resolver: &dyn BeanResolver,
) -> Result<()> {
    for point in class.injection_points() {
        trace!(
            bean = %name,
            attribute = point.attribute(),
            dependency = point.dependency(),
            "Injecting dependency"
        );

        let wrap = |source: BoxError| ContainerError::InjectionFailure {
            bean: name.to_string(),
            attribute: point.attribute(),
            source,
        };

        let dependency = match resolver.resolve_bean(point.dependency()) {
            Ok(bean) => bean,
            Err(cycle @ ContainerError::CyclicDependency(_)) => return Err(cycle),
            Err(other) => return Err(wrap(Box::new(other))),
        };

        if dependency.type_key() != point.dependency_type() {
            return Err(wrap(Box::new(ContainerError::TypeMismatch {
                name: point.dependency().to_string(),
                expected: point.dependency_type().type_name(),
                actual: dependency.type_name(),
            })));
        }

        point.assign(instance, dependency).map_err(wrap)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CyclicDependencyError, DefinitionNotFoundError};
    use std::collections::HashMap;
    use std::error::Error as _;
    use std::sync::Arc;

    #[derive(Default)]
    struct Checkout {
        cart: Option<Arc<Cart>>,
        prices: Option<Arc<PriceList>>,
    }

    struct Cart;
    struct PriceList;

    struct MapResolver(HashMap<&'static str, Bean>);

    impl BeanResolver for MapResolver {
        fn resolve_bean(&self, name: &str) -> Result<Bean> {
            if name == "loop" {
                return Err(ContainerError::CyclicDependency(CyclicDependencyError {
                    chain: vec!["loop".into(), "loop".into()],
                }));
            }
            self.0.get(name).cloned().ok_or_else(|| {
                ContainerError::DefinitionNotFound(DefinitionNotFoundError {
                    name: name.to_string(),
                    required_by: None,
                    suggestions: vec![],
                })
            })
        }
    }

    fn checkout_class(prices_name: &'static str) -> BeanClass {
        BeanClass::builder::<Checkout>()
            .constructor(Checkout::default)
            .inject("cart", |c: &mut Checkout, cart: Arc<Cart>| c.cart = Some(cart))
            .inject_named("prices", prices_name, |c: &mut Checkout, p: Arc<PriceList>| {
                c.prices = Some(p)
            })
            .build()
    }

    fn resolver() -> MapResolver {
        MapResolver(HashMap::from([
            ("cart", Bean::new(Cart)),
            ("priceList", Bean::new(PriceList)),
            ("wrongType", Bean::new(42u32)),
        ]))
    }

    #[test]
    fn injects_all_points_by_name() {
        let class = checkout_class("priceList");
        let mut instance: Box<dyn Any + Send + Sync> = Box::new(Checkout::default());

        inject("checkout", &class, &mut *instance, &resolver()).unwrap();

        let checkout = instance.downcast_ref::<Checkout>().unwrap();
        assert!(checkout.cart.is_some());
        assert!(checkout.prices.is_some());
    }

    #[test]
    fn missing_dependency_names_attribute_and_bean() {
        let class = checkout_class("nowhere");
        let mut instance: Box<dyn Any + Send + Sync> = Box::new(Checkout::default());

        let err = inject("checkout", &class, &mut *instance, &resolver()).unwrap_err();
        match &err {
            ContainerError::InjectionFailure { bean, attribute, source } => {
                assert_eq!(bean, "checkout");
                assert_eq!(*attribute, "prices");
                let cause = source.downcast_ref::<ContainerError>().unwrap();
                assert!(cause.is_not_found("nowhere"));
            }
            other => panic!("Expected InjectionFailure, got: {other:?}"),
        }
        assert!(err.source().is_some());
    }

    #[test]
    fn wrong_dependency_type_is_injection_failure() {
        let class = checkout_class("wrongType");
        let mut instance: Box<dyn Any + Send + Sync> = Box::new(Checkout::default());

        let err = inject("checkout", &class, &mut *instance, &resolver()).unwrap_err();
        match err {
            ContainerError::InjectionFailure { source, .. } => {
                assert!(matches!(
                    source.downcast_ref::<ContainerError>(),
                    Some(ContainerError::TypeMismatch { name, .. }) if name == "wrongType"
                ));
            }
            other => panic!("Expected InjectionFailure, got: {other:?}"),
        }
    }

    #[test]
    fn cycles_pass_through_unwrapped() {
        let class = checkout_class("loop");
        let mut instance: Box<dyn Any + Send + Sync> = Box::new(Checkout::default());

        let err = inject("checkout", &class, &mut *instance, &resolver()).unwrap_err();
        assert!(matches!(err, ContainerError::CyclicDependency(_)));
    }
}
