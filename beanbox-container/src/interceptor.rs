//! Method interception.
//!
//! [`MethodInterceptor`] is a reserved extension point. The container
//! accepts the call to register one and always refuses it with
//! [`ContainerError::UnsupportedCapability`](crate::error::ContainerError::UnsupportedCapability);
//! no proxying or call interception exists.

/// Marker for something that would intercept method calls on beans.
pub trait MethodInterceptor: Send + Sync {
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Capability name reported when registration is refused.
pub const INTERCEPTION: &str = "Method interception";
