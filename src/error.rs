//! # Store Error Types
//!
//! Structured error handling for the content store using thiserror.
//!
//! Configuration-time failures (`InvalidArgument`) are fatal to the build step.
//! A missing type mapping is not an error inside the registry itself; it only
//! becomes [`StoreError::NoMapping`] once an operation needs a handler and
//! there is none.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("No mapping registered for type {type_name}")]
    NoMapping { type_name: String },

    #[error("Cursor returned by content provider is null")]
    NullCursor,

    #[error("Content resolver error: {operation}: {message}")]
    Transport { operation: String, message: String },

    #[error("Resolver for type {type_name} failed: {source}")]
    Handler {
        type_name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Execution error: {message}")]
    Execution { message: String },
}

impl StoreError {
    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a missing type mapping error
    pub fn no_mapping(type_name: impl Into<String>) -> Self {
        Self::NoMapping {
            type_name: type_name.into(),
        }
    }

    /// Create a content resolver (transport) error
    pub fn transport(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Wrap a failure raised by a Put/Get/Delete resolver
    pub fn handler(type_name: impl Into<String>, source: anyhow::Error) -> Self {
        Self::Handler {
            type_name: type_name.into(),
            source,
        }
    }

    /// Convert a resolver failure, keeping store errors raised inside the
    /// resolver (e.g. a null cursor) as they are
    pub fn from_handler(type_name: impl Into<String>, err: anyhow::Error) -> Self {
        match err.downcast::<StoreError>() {
            Ok(store_error) => store_error,
            Err(other) => Self::handler(type_name, other),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an execution error
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution {
            message: message.into(),
        }
    }

    /// Returns true for errors raised while building the store or its mappings
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument { .. } | Self::NoMapping { .. } | Self::Configuration { .. }
        )
    }
}

impl From<config::ConfigError> for StoreError {
    fn from(err: config::ConfigError) -> Self {
        Self::configuration(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
