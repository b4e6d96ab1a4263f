//! Bean definitions and the type metadata they point at.
//!
//! Rust has no runtime reflection, so everything the container needs to
//! know about a type is declared up front in a [`BeanClass`]: its kind,
//! its constructors, the attributes to inject and the named zero-argument
//! routines an init method can refer to. A [`BeanDefinition`] pairs a class
//! with a scope and an optional init method name.
//!
//! # Examples
//! ```
//! use std::sync::Arc;
//! use beanbox_container::descriptor::{BeanClass, BeanDefinition};
//!
//! #[derive(Default)]
//! struct UserRepository;
//!
//! #[derive(Default)]
//! struct UserService {
//!     repository: Option<Arc<UserRepository>>,
//!     ready: bool,
//! }
//!
//! let class = BeanClass::builder::<UserService>()
//!     .constructor(UserService::default)
//!     .inject("userRepository", |svc: &mut UserService, repo: Arc<UserRepository>| {
//!         svc.repository = Some(repo);
//!     })
//!     .method("start", |svc: &mut UserService| svc.ready = true)
//!     .build();
//!
//! let definition = BeanDefinition::singleton(class).with_init_method("start");
//! assert_eq!(definition.init_method(), Some("start"));
//! assert_eq!(definition.bean_class().injection_points().len(), 1);
//! ```

use std::any::{Any, type_name};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use beanbox_support::rendering::shorten_type_name;

use crate::bean::Bean;
use crate::error::BoxError;
use crate::key::TypeKey;
use crate::scope::Scope;

pub(crate) type ConstructorFn =
    Arc<dyn Fn() -> Result<Box<dyn Any + Send + Sync>, BoxError> + Send + Sync>;

pub(crate) type SetterFn =
    Arc<dyn Fn(&mut (dyn Any + Send + Sync), Bean) -> Result<(), BoxError> + Send + Sync>;

pub(crate) type RoutineFn =
    Arc<dyn Fn(&mut (dyn Any + Send + Sync)) -> Result<(), BoxError> + Send + Sync>;

/// What sort of type a [`BeanClass`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// A concrete struct or enum.
    Class,
    /// A trait object type.
    Interface,
    /// A scalar such as `i32` or `bool`.
    Primitive,
    /// A fixed-size array or slice.
    Array,
}

impl TypeKind {
    /// Only classes can be constructed.
    #[inline]
    pub fn is_instantiable(&self) -> bool {
        matches!(self, TypeKind::Class)
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeKind::Class => write!(f, "a class type"),
            TypeKind::Interface => write!(f, "an interface type"),
            TypeKind::Primitive => write!(f, "a primitive type"),
            TypeKind::Array => write!(f, "an array type"),
        }
    }
}

/// A declared constructor.
///
/// Only zero-argument constructors carry an invoker. Parameterised shapes
/// are recorded so diagnostics can list them.
#[derive(Clone)]
pub struct Constructor {
    parameters: Vec<&'static str>,
    invoke: Option<ConstructorFn>,
}

impl Constructor {
    /// Number of parameters.
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    /// Parameter type names, in order.
    pub fn parameters(&self) -> &[&'static str] {
        &self.parameters
    }

    /// Renders the shape, e.g. `Pool(String, u32)`.
    pub fn signature(&self, owner: TypeKey) -> String {
        let params: Vec<String> = self.parameters.iter().map(|p| shorten_type_name(p)).collect();
        format!("{}({})", owner.short_name(), params.join(", "))
    }

    pub(crate) fn zero_arg_invoker(&self) -> Option<&ConstructorFn> {
        if self.parameters.is_empty() {
            self.invoke.as_ref()
        } else {
            None
        }
    }
}

/// An attribute to fill from another bean, looked up by logical name.
#[derive(Clone)]
pub struct InjectionPoint {
    attribute: &'static str,
    dependency: String,
    dependency_type: TypeKey,
    setter: SetterFn,
}

impl InjectionPoint {
    /// Attribute (field) name on the owning type.
    pub fn attribute(&self) -> &'static str {
        self.attribute
    }

    /// Logical name of the bean to inject.
    pub fn dependency(&self) -> &str {
        &self.dependency
    }

    /// Type the resolved bean must have.
    pub fn dependency_type(&self) -> TypeKey {
        self.dependency_type
    }

    /// Renders the point as `attribute: Type <- name`.
    pub fn describe(&self) -> String {
        format!(
            "{}: {} <- {}",
            self.attribute,
            shorten_type_name(self.dependency_type.type_name()),
            self.dependency
        )
    }

    pub(crate) fn assign(&self, target: &mut (dyn Any + Send + Sync), dependency: Bean) -> Result<(), BoxError> {
        (self.setter)(target, dependency)
    }
}

impl fmt::Debug for InjectionPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InjectionPoint")
            .field("attribute", &self.attribute)
            .field("dependency", &self.dependency)
            .field("type", &self.dependency_type)
            .finish()
    }
}

/// A named zero-argument routine callable as an init method.
#[derive(Clone)]
pub struct Routine {
    name: &'static str,
    invoke: RoutineFn,
}

impl Routine {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn invoke(&self, receiver: &mut (dyn Any + Send + Sync)) -> Result<(), BoxError> {
        (self.invoke)(receiver)
    }
}

/// Result types an init routine may return.
///
/// Implemented for `()` and for `Result<(), E>` with any error convertible
/// into a boxed error, so routines can be infallible or not.
pub trait InitOutcome {
    fn into_result(self) -> Result<(), BoxError>;
}

impl InitOutcome for () {
    fn into_result(self) -> Result<(), BoxError> {
        Ok(())
    }
}

impl<E: Into<BoxError>> InitOutcome for Result<(), E> {
    fn into_result(self) -> Result<(), BoxError> {
        self.map_err(Into::into)
    }
}

/// Type metadata for one bean type.
#[derive(Clone)]
pub struct BeanClass {
    type_key: TypeKey,
    kind: TypeKind,
    constructors: Vec<Constructor>,
    injection_points: Vec<InjectionPoint>,
    routines: Vec<Routine>,
}

impl BeanClass {
    /// Starts describing a concrete type `T`.
    pub fn builder<T: Any + Send + Sync>() -> BeanClassBuilder<T> {
        BeanClassBuilder {
            class: Self::bare(TypeKey::of::<T>(), TypeKind::Class),
            _marker: PhantomData,
        }
    }

    /// A class whose only constructor is `T::default`.
    pub fn of_default<T: Any + Send + Sync + Default>() -> Self {
        Self::builder::<T>().constructor(T::default).build()
    }

    /// Describes a trait object type. Never instantiable.
    pub fn interface<T: ?Sized + 'static>() -> Self {
        Self::bare(TypeKey::of::<T>(), TypeKind::Interface)
    }

    /// Describes a primitive type. Never instantiable.
    pub fn primitive<T: 'static>() -> Self {
        Self::bare(TypeKey::of::<T>(), TypeKind::Primitive)
    }

    /// Describes an array or slice type. Never instantiable.
    pub fn array<T: ?Sized + 'static>() -> Self {
        Self::bare(TypeKey::of::<T>(), TypeKind::Array)
    }

    fn bare(type_key: TypeKey, kind: TypeKind) -> Self {
        Self {
            type_key,
            kind,
            constructors: Vec::new(),
            injection_points: Vec::new(),
            routines: Vec::new(),
        }
    }

    pub fn type_key(&self) -> TypeKey {
        self.type_key
    }

    pub fn type_name(&self) -> &'static str {
        self.type_key.type_name()
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn constructors(&self) -> &[Constructor] {
        &self.constructors
    }

    /// Injection points in declaration order.
    pub fn injection_points(&self) -> &[InjectionPoint] {
        &self.injection_points
    }

    /// Looks up a zero-argument routine by name.
    pub fn routine(&self, name: &str) -> Option<&Routine> {
        self.routines.iter().find(|r| r.name == name)
    }

    /// Logical names this type depends on, in declaration order.
    pub fn dependency_names(&self) -> impl Iterator<Item = &str> {
        self.injection_points.iter().map(InjectionPoint::dependency)
    }
}

impl fmt::Debug for BeanClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let constructors: Vec<String> = self
            .constructors
            .iter()
            .map(|c| c.signature(self.type_key))
            .collect();
        let injection_points: Vec<String> = self.injection_points.iter().map(InjectionPoint::describe).collect();
        let routines: Vec<&str> = self.routines.iter().map(|r| r.name).collect();

        f.debug_struct("BeanClass")
            .field("type", &self.type_key.type_name())
            .field("kind", &self.kind)
            .field("constructors", &constructors)
            .field("injection_points", &injection_points)
            .field("routines", &routines)
            .finish()
    }
}

/// Typed builder for a [`BeanClass`] of `T`.
///
/// The closures receive `&mut T` directly; the builder erases them so the
/// container can call them on type-erased instances.
pub struct BeanClassBuilder<T> {
    class: BeanClass,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Any + Send + Sync> BeanClassBuilder<T> {
    /// Declares an infallible zero-argument constructor.
    pub fn constructor(self, ctor: impl Fn() -> T + Send + Sync + 'static) -> Self {
        self.try_constructor(move || Ok::<T, BoxError>(ctor()))
    }

    /// Declares a fallible zero-argument constructor.
    pub fn try_constructor<E: Into<BoxError>>(
        mut self,
        ctor: impl Fn() -> Result<T, E> + Send + Sync + 'static,
    ) -> Self {
        let invoke: ConstructorFn = Arc::new(move || {
            ctor()
                .map(|value| Box::new(value) as Box<dyn Any + Send + Sync>)
                .map_err(Into::into)
        });
        self.class.constructors.push(Constructor {
            parameters: Vec::new(),
            invoke: Some(invoke),
        });
        self
    }

    /// Records a constructor that takes parameters.
    ///
    /// The container never calls these; they only show up in
    /// diagnostics when no zero-argument constructor exists.
    pub fn declared_constructor(mut self, parameters: &[&'static str]) -> Self {
        self.class.constructors.push(Constructor {
            parameters: parameters.to_vec(),
            invoke: None,
        });
        self
    }

    /// Injects the bean named `attribute` into that attribute.
    pub fn inject<D: Any + Send + Sync>(
        self,
        attribute: &'static str,
        setter: impl Fn(&mut T, Arc<D>) + Send + Sync + 'static,
    ) -> Self {
        self.inject_named(attribute, attribute, setter)
    }

    /// Injects the bean named `dependency` into `attribute`.
    pub fn inject_named<D: Any + Send + Sync>(
        mut self,
        attribute: &'static str,
        dependency: impl Into<String>,
        setter: impl Fn(&mut T, Arc<D>) + Send + Sync + 'static,
    ) -> Self {
        let setter: SetterFn = Arc::new(move |target: &mut (dyn Any + Send + Sync), bean: Bean| {
            let target = target
                .downcast_mut::<T>()
                .ok_or_else(|| receiver_mismatch::<T>())?;
            let dependency = bean.downcast::<D>().map_err(|bean| -> BoxError {
                format!(
                    "expected {}, found {}",
                    shorten_type_name(type_name::<D>()),
                    shorten_type_name(bean.type_name()),
                )
                .into()
            })?;
            setter(target, dependency);
            Ok(())
        });

        self.class.injection_points.push(InjectionPoint {
            attribute,
            dependency: dependency.into(),
            dependency_type: TypeKey::of::<D>(),
            setter,
        });
        self
    }

    /// Declares a named zero-argument routine usable as an init method.
    pub fn method<R: InitOutcome>(
        mut self,
        name: &'static str,
        routine: impl Fn(&mut T) -> R + Send + Sync + 'static,
    ) -> Self {
        let invoke: RoutineFn = Arc::new(move |receiver: &mut (dyn Any + Send + Sync)| {
            let receiver = receiver
                .downcast_mut::<T>()
                .ok_or_else(|| receiver_mismatch::<T>())?;
            routine(receiver).into_result()
        });
        self.class.routines.push(Routine { name, invoke });
        self
    }

    pub fn build(self) -> BeanClass {
        self.class
    }
}

fn receiver_mismatch<T>() -> BoxError {
    format!("receiver is not a {}", shorten_type_name(type_name::<T>())).into()
}

/// Registered metadata describing how to build and configure one bean.
///
/// Immutable once registered; the container shares it behind an `Arc`.
#[derive(Clone)]
pub struct BeanDefinition {
    class: Arc<BeanClass>,
    scope: Scope,
    init_method: Option<String>,
}

impl BeanDefinition {
    /// A singleton definition for `class`.
    pub fn new(class: impl Into<Arc<BeanClass>>) -> Self {
        Self {
            class: class.into(),
            scope: Scope::Singleton,
            init_method: None,
        }
    }

    pub fn singleton(class: impl Into<Arc<BeanClass>>) -> Self {
        Self::new(class)
    }

    pub fn prototype(class: impl Into<Arc<BeanClass>>) -> Self {
        Self::new(class).with_scope(Scope::Prototype)
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// Names the routine to run after injection.
    pub fn with_init_method(mut self, name: impl Into<String>) -> Self {
        self.init_method = Some(name.into());
        self
    }

    pub fn bean_class(&self) -> &BeanClass {
        &self.class
    }

    pub fn type_key(&self) -> TypeKey {
        self.class.type_key()
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn is_singleton(&self) -> bool {
        self.scope.is_singleton()
    }

    pub fn init_method(&self) -> Option<&str> {
        self.init_method.as_deref()
    }
}

impl fmt::Debug for BeanDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeanDefinition")
            .field("type", &self.class.type_name())
            .field("scope", &self.scope)
            .field("init_method", &self.init_method)
            .finish()
    }
}
