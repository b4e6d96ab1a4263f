//! Init method invocation.

use tracing::trace;

use crate::bean::Bean;
use crate::descriptor::BeanDefinition;
use crate::error::{BoxError, ContainerError, Result};

/// Runs the definition's init method on `bean`, if it names one.
///
/// The routine needs exclusive access, so `bean` must be the only handle
/// to its instance at this point.
///
/// # Errors
/// [`ContainerError::LifecycleInvocationFailure`] when the routine is not
/// declared, the instance is still shared, the instance is not of the
/// declared type (a processor replaced it) or the routine fails.
pub(crate) fn invoke_init(name: &str, definition: &BeanDefinition, bean: &mut Bean) -> Result<()> {
    let Some(method) = definition.init_method() else {
        return Ok(());
    };

    let fail = |source: BoxError| ContainerError::LifecycleInvocationFailure {
        bean: name.to_string(),
        method: method.to_string(),
        source,
    };

    let routine = definition.bean_class().routine(method).ok_or_else(|| {
        fail(format!("{} declares no routine named '{method}'", definition.type_key().short_name()).into())
    })?;

    let instance = bean
        .get_mut()
        .ok_or_else(|| fail("instance is shared with another holder".into()))?;

    trace!(bean = %name, method, "Invoking init method");
    routine.invoke(instance).map_err(fail)
}
