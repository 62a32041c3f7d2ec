//! # Error Types
//!
//! Purpose: Give every failure in URL resolution and client registration a
//! distinct, matchable variant, while passing collaborator errors through
//! untouched.

use thiserror::Error;

/// Result type for the resolver and the registry.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors surfaced by URL resolution and client registration.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A recognized query option's value failed its declared coercion.
    #[error("invalid value for `{option}` in connection URL")]
    InvalidOptionValue { option: String },

    /// A host spec's port segment is not a valid port number.
    #[error("invalid endpoint `{spec}` in connection URL")]
    InvalidEndpoint { spec: String },

    /// A sentinel URL carried no resolvable service name.
    #[error("sentinel connection URL requires a service_name")]
    MissingServiceName,

    /// `get_client` was called before any successful `init_from_*`.
    #[error("shared client not initialized, call one of the init_from_* functions first")]
    NotInitialized,

    /// Error raised by the underlying redis client or sentinel; never
    /// wrapped or reinterpreted here.
    #[error(transparent)]
    Redis(#[from] redis::RedisError),
}
