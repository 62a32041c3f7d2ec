//! # redis-registry
//!
//! Purpose: Resolve Redis connection URLs for direct and sentinel-mediated
//! topologies, and hold exactly one shared `redis::Client` per process.
//!
//! ## Design Principles
//! 1. **Pure Resolution**: URL parsing performs zero network I/O.
//! 2. **Single Slot**: At most one shared client exists at any time; reads
//!    never observe a torn value and never block each other.
//! 3. **Overrides Win**: Caller overrides and environment variables are
//!    applied after URL-derived values.
//! 4. **Opaque Collaborators**: The wire protocol and master/replica
//!    discovery belong to the `redis` crate; its errors pass through
//!    unmodified.

mod error;
mod options;
mod registry;
mod resolver;

pub use error::{RegistryError, RegistryResult};
pub use options::{ConnectionOptions, OptionValue};
pub use registry::{
    get_client, init_from_redis, init_from_sentinel, init_from_url, SentinelBackend,
    AUTH_ENV_VAR, SENTINEL_SCHEME, URL_ENV_VAR,
};
pub use resolver::{
    parse_sentinel_url, parse_url, Endpoint, ParsedUrl, SentinelUrl, DEFAULT_SENTINEL_PORT,
};
