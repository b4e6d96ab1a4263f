//! Error types for container operations.
//!
//! Every failure is its own variant so callers can branch on the kind.
//! Kinds that wrap a lower-level cause keep it as [`std::error::Error::source`].

use std::fmt;

use beanbox_support::rendering::{render_chain, shorten_type_name};

use crate::descriptor::TypeKind;

/// Boxed cause carried by the wrapping error kinds.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for all container operations.
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    /// A definition is already registered under this name.
    #[error("{}", .0)]
    DuplicateRegistration(DuplicateRegistrationError),

    /// No definition is registered under the requested name.
    #[error("{}", .0)]
    DefinitionNotFound(DefinitionNotFoundError),

    /// The bean exists but is not of the requested type.
    #[error("Bean '{name}' is a {}, not a {}", shorten_type_name(.actual), shorten_type_name(.expected))]
    TypeMismatch {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// Interfaces, primitives and arrays cannot be instantiated.
    #[error("Cannot instantiate bean '{name}': {} is {kind}", shorten_type_name(.type_name))]
    NonInstantiableType {
        name: String,
        type_name: &'static str,
        kind: TypeKind,
    },

    /// The type has no zero-argument constructor.
    #[error("{}", .0)]
    UnsupportedConstructorShape(UnsupportedConstructorError),

    /// The zero-argument constructor returned an error.
    #[error("Failed to create bean '{name}' ({}): {source}", shorten_type_name(.type_name))]
    BeanCreationFailure {
        name: String,
        type_name: &'static str,
        #[source]
        source: BoxError,
    },

    /// Resolving or assigning an injectable attribute failed.
    #[error("Failed to inject '{attribute}' into bean '{bean}': {source}")]
    InjectionFailure {
        bean: String,
        attribute: &'static str,
        #[source]
        source: BoxError,
    },

    /// The init routine was missing or failed.
    #[error("Failed to invoke init method '{method}' on bean '{bean}': {source}")]
    LifecycleInvocationFailure {
        bean: String,
        method: String,
        #[source]
        source: BoxError,
    },

    /// Reserved extension point that this container does not implement.
    #[error("{capability} is not supported by this container (requested for '{name}')")]
    UnsupportedCapability {
        capability: &'static str,
        name: String,
    },

    /// A bean depends on itself through its injection points.
    #[error("{}", .0)]
    CyclicDependency(CyclicDependencyError),
}

impl ContainerError {
    /// Returns `true` for [`ContainerError::DefinitionNotFound`] on `name`.
    pub fn is_not_found(&self, name: &str) -> bool {
        matches!(self, ContainerError::DefinitionNotFound(e) if e.name == name)
    }
}

/// Error when a name is registered twice.
#[derive(Debug)]
pub struct DuplicateRegistrationError {
    pub name: String,
    /// Type of the definition that stays registered.
    pub existing_type: &'static str,
}

impl fmt::Display for DuplicateRegistrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Bean name '{}' is already registered (type {})",
            self.name,
            shorten_type_name(self.existing_type),
        )?;
        write!(f, "\n  Hint: Definitions cannot be replaced; pick a distinct bean name")
    }
}

/// Error when no definition exists for a name.
#[derive(Debug)]
pub struct DefinitionNotFoundError {
    /// The requested logical name
    pub name: String,
    /// The bean whose injection point asked for it, if any
    pub required_by: Option<String>,
    /// Registered names that look similar
    pub suggestions: Vec<String>,
}

impl fmt::Display for DefinitionNotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "No bean definition named '{}'", self.name)?;

        if let Some(ref parent) = self.required_by {
            write!(f, "\n  Required by: {parent}")?;
        }

        if !self.suggestions.is_empty() {
            write!(f, "\n  Did you mean one of:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n    - {suggestion}")?;
            }
        }

        Ok(())
    }
}

/// Error when no zero-argument constructor exists.
#[derive(Debug)]
pub struct UnsupportedConstructorError {
    pub name: String,
    pub type_name: &'static str,
    /// Rendered signatures of the constructors that were declared.
    pub declared: Vec<String>,
}

impl fmt::Display for UnsupportedConstructorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Cannot instantiate bean '{}': {} has no zero-argument constructor",
            self.name,
            shorten_type_name(self.type_name),
        )?;

        if self.declared.is_empty() {
            write!(f, "\n  No constructors are declared")?;
        } else {
            write!(f, "\n  Declared constructors:")?;
            for signature in &self.declared {
                write!(f, "\n    - {signature}")?;
            }
        }

        write!(f, "\n  Hint: Only zero-argument construction is supported; wire the rest through injection points")
    }
}

/// Error when a resolution path revisits a bean.
#[derive(Debug)]
pub struct CyclicDependencyError {
    /// Names along the path, first and last entries equal.
    /// Example: ["a", "b", "a"]
    pub chain: Vec<String>,
}

impl fmt::Display for CyclicDependencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cyclic dependency detected:\n  {}", render_chain(&self.chain))?;
        write!(
            f,
            "\n  Hint: Break the cycle by moving one dependency into a post-processor or an init method"
        )
    }
}

/// Convenient Result type for container operations.
pub type Result<T> = std::result::Result<T, ContainerError>;
