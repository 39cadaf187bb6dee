//! Error handling types

use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the Feature Block Composer
#[derive(Error, Debug)]
pub enum Error {
    /// Two provider declarations share a name
    #[error("Duplicate provider: {name}")]
    DuplicateProvider {
        /// The name declared more than once
        name: String,
    },

    /// A provider declaration redefines a built-in name
    #[error("Reserved provider name: {name}")]
    ReservedProvider {
        /// The built-in name the declaration tried to redefine
        name: String,
    },

    /// A dependency name matches neither a registry provider nor a built-in
    #[error("Unknown dependency: {name}")]
    UnknownDependency {
        /// The unresolvable name
        name: String,
        /// The provider that declared the dependency, when known
        requested_by: Option<String>,
    },

    /// The dependency graph contains a cycle
    #[error("Cyclic dependency involving: {}", names.join(", "))]
    CyclicDependency {
        /// The provider names participating in the cycle
        names: Vec<String>,
    },

    /// Invalid argument provided to a composer operation
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument
        message: String,
    },

    /// Provider-defined failure raised from a provider function
    #[error("Provider error: {message}")]
    Provider {
        /// Description of the provider failure
        message: String,
    },
}

// Basic error creation methods
impl Error {
    /// Create a duplicate provider error
    pub fn duplicate_provider<S: Into<String>>(name: S) -> Self {
        Self::DuplicateProvider { name: name.into() }
    }

    /// Create a reserved provider name error
    pub fn reserved_provider<S: Into<String>>(name: S) -> Self {
        Self::ReservedProvider { name: name.into() }
    }

    /// Create an unknown dependency error
    pub fn unknown_dependency<S: Into<String>>(name: S) -> Self {
        Self::UnknownDependency {
            name: name.into(),
            requested_by: None,
        }
    }

    /// Create an unknown dependency error attributed to a declaring provider
    pub fn unknown_dependency_for<S: Into<String>, P: Into<String>>(name: S, requested_by: P) -> Self {
        Self::UnknownDependency {
            name: name.into(),
            requested_by: Some(requested_by.into()),
        }
    }

    /// Create a cyclic dependency error
    pub fn cyclic_dependency(names: Vec<String>) -> Self {
        Self::CyclicDependency { names }
    }

    /// Create an invalid argument error
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a provider failure error
    pub fn provider<S: Into<String>>(message: S) -> Self {
        Self::Provider {
            message: message.into(),
        }
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Self::Provider {
            message: s.to_string(),
        }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Self::Provider { message: s }
    }
}
