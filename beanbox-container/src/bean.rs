//! Materialized bean handles.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::key::TypeKey;

/// A shared, type-erased bean instance.
///
/// Cloning a `Bean` clones the handle, not the instance. Two handles are
/// the same bean when [`Bean::ptr_eq`] holds.
#[derive(Clone)]
pub struct Bean {
    instance: Arc<dyn Any + Send + Sync>,
    type_key: TypeKey,
}

impl Bean {
    /// Wraps a value in a new bean.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    /// Wraps an existing shared value without copying it.
    pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self {
            instance: value,
            type_key: TypeKey::of::<T>(),
        }
    }

    /// Wraps a freshly built, type-erased value whose type is `type_key`.
    pub(crate) fn from_boxed(value: Box<dyn Any + Send + Sync>, type_key: TypeKey) -> Self {
        Self {
            instance: Arc::from(value),
            type_key,
        }
    }

    /// Type of the wrapped value.
    #[inline]
    pub fn type_key(&self) -> TypeKey {
        self.type_key
    }

    /// Name of the wrapped value's type.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_key.type_name()
    }

    /// Returns `true` if the wrapped value is a `T`.
    #[inline]
    pub fn is<T: Any>(&self) -> bool {
        self.type_key.is::<T>()
    }

    /// Borrows the value as `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.instance.downcast_ref::<T>()
    }

    /// Converts into a typed handle, giving the bean back on mismatch.
    pub fn downcast<T: Any + Send + Sync>(self) -> Result<Arc<T>, Bean> {
        let type_key = self.type_key;
        self.instance
            .downcast::<T>()
            .map_err(|instance| Bean { instance, type_key })
    }

    /// Mutable access, only while this handle is the sole owner.
    pub(crate) fn get_mut(&mut self) -> Option<&mut (dyn Any + Send + Sync)> {
        Arc::get_mut(&mut self.instance)
    }

    /// Returns `true` if both handles point at the same instance.
    pub fn ptr_eq(a: &Bean, b: &Bean) -> bool {
        Arc::ptr_eq(&a.instance, &b.instance)
    }
}

impl fmt::Debug for Bean {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bean")
            .field("type", &self.type_key.type_name())
            .field("ptr", &Arc::as_ptr(&self.instance).cast::<()>())
            .finish()
    }
}
