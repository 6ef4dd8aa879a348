use std::fmt;

use crate::version::Requirement;

/// An already active version collides with a new activation or requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictError {
    /// A different version of an active package was explicitly activated.
    AlreadyActivated { requested: String, active: String },
    /// An activated specification depends on a package whose active
    /// version does not satisfy the dependency.
    Dependency {
        dependent: String,
        active: String,
        name: String,
        requirement: Requirement,
    },
    /// An explicit requirement is not met by the active version.
    Requirement {
        name: String,
        requirement: Requirement,
        active: String,
    },
}

impl fmt::Display for ConflictError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictError::AlreadyActivated { requested, active } => {
                write!(f, "can't activate {}, already activated {}", requested, active)
            }
            ConflictError::Dependency {
                dependent,
                active,
                name,
                requirement,
            } => write!(
                f,
                "unable to activate {}, because {} conflicts with {} ({})",
                dependent, active, name, requirement
            ),
            ConflictError::Requirement {
                name,
                requirement,
                active,
            } => write!(
                f,
                "can't activate {} ({}), already activated {}",
                name, requirement, active
            ),
        }
    }
}

impl std::error::Error for ConflictError {}

/// Errors raised while activating specifications or reconciling a load request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationError {
    Conflict(ConflictError),
    /// Two or more distinct package names claim the requested path.
    AmbiguousProvider { path: String, names: Vec<String> },
    /// A pending package has no installed candidate compatible with the active set.
    Unsatisfiable { name: String },
}

impl ActivationError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, ActivationError::Conflict(_))
    }
}

impl fmt::Display for ActivationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivationError::Conflict(conflict) => fmt::Display::fmt(conflict, f),
            ActivationError::AmbiguousProvider { path, names } => {
                write!(f, "{} found in multiple gems: {}", path, names.join(", "))
            }
            ActivationError::Unsatisfiable { name } => {
                write!(f, "unable to find a version of '{}' to activate", name)
            }
        }
    }
}

impl std::error::Error for ActivationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ActivationError::Conflict(conflict) => Some(conflict),
            _ => None,
        }
    }
}

impl From<ConflictError> for ActivationError {
    fn from(value: ConflictError) -> Self {
        ActivationError::Conflict(value)
    }
}
