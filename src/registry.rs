//! # Shared Client Registry
//!
//! Purpose: Convert resolved connection parameters into exactly one shared
//! `redis::Client` per process and expose retrieval.
//!
//! ## Design Principles
//! 1. **Single Slot**: One process-wide register, `Empty` until the first
//!    `init_from_*`, then `Holding` forever; a later init replaces the value.
//! 2. **Cheap Reads**: Readers share an `RwLock` read guard and clone an
//!    `Arc`; they never observe a partially-constructed client.
//! 3. **Environment Wins**: `REDISCLI_URL` and `REDISCLI_AUTH` take
//!    precedence over caller-supplied arguments.
//! 4. **Opaque Collaborators**: Master/replica resolution and the wire
//!    protocol belong to the redis crate; its errors pass through unmodified.

use std::env;
use std::sync::{Arc, RwLock};

use redis::sentinel::{Sentinel, SentinelNodeConnectionInfo};
use redis::{Client, ConnectionAddr, ConnectionInfo, IntoConnectionInfo, RedisConnectionInfo};
use tracing::{debug, info, warn};

use crate::error::{RegistryError, RegistryResult};
use crate::options::{ConnectionOptions, OptionValue};
use crate::resolver::{parse_sentinel_url, split_url, SentinelUrl};

/// Environment variable that replaces the URL passed to [`init_from_url`].
pub const URL_ENV_VAR: &str = "REDISCLI_URL";

/// Environment variable that injects/overrides the `password` option.
pub const AUTH_ENV_VAR: &str = "REDISCLI_AUTH";

/// URL scheme selecting the sentinel-mediated topology.
pub const SENTINEL_SCHEME: &str = "redis+sentinel";

// The single-slot register. Never transitions back to None once set.
static SHARED_CLIENT: RwLock<Option<Arc<Client>>> = RwLock::new(None);

/// Returns the shared client registered by the last `init_from_*` call.
///
/// Fails with [`RegistryError::NotInitialized`] when no client has ever been
/// registered in this process; never initializes implicitly.
pub fn get_client() -> RegistryResult<Arc<Client>> {
    let slot = SHARED_CLIENT.read().expect("client slot poisoned");
    slot.clone().ok_or(RegistryError::NotInitialized)
}

/// Registers `client` as the shared client, unconditionally replacing any
/// prior value. Liveness is not checked; connectivity surfaces lazily on the
/// first command.
pub fn init_from_redis(client: Client) {
    let mut slot = SHARED_CLIENT.write().expect("client slot poisoned");
    *slot = Some(Arc::new(client));
    info!("registered shared redis client");
}

/// Sentinel collaborator seam: resolves a service name into a concrete
/// client for either the writable master or a read-only replica.
pub trait SentinelBackend {
    /// Resolves the current master endpoint for `service_name`.
    fn master_for(
        &mut self,
        service_name: &str,
        options: &ConnectionOptions,
    ) -> RegistryResult<Client>;

    /// Resolves a replica endpoint for `service_name`.
    fn replica_for(
        &mut self,
        service_name: &str,
        options: &ConnectionOptions,
    ) -> RegistryResult<Client>;
}

impl SentinelBackend for Sentinel {
    fn master_for(
        &mut self,
        service_name: &str,
        options: &ConnectionOptions,
    ) -> RegistryResult<Client> {
        let node = node_connection_info(options)?;
        Ok(Sentinel::master_for(self, service_name, Some(&node))?)
    }

    fn replica_for(
        &mut self,
        service_name: &str,
        options: &ConnectionOptions,
    ) -> RegistryResult<Client> {
        let node = node_connection_info(options)?;
        Ok(Sentinel::replica_for(self, service_name, Some(&node))?)
    }
}

/// Resolves a master or replica client through `backend` and registers it.
///
/// A `readonly` option (default false) selects replica resolution; every
/// other option is forwarded to the backend as a target-connection option.
/// Backend errors, e.g. an unknown service name, propagate unmodified.
pub fn init_from_sentinel<B: SentinelBackend>(
    mut backend: B,
    service_name: &str,
    mut options: ConnectionOptions,
) -> RegistryResult<()> {
    let readonly = options
        .remove("readonly")
        .and_then(|value| value.as_bool())
        .unwrap_or(false);
    debug!(service_name, readonly, "resolving endpoint through sentinel");

    let client = if readonly {
        backend.replica_for(service_name, &options)?
    } else {
        backend.master_for(service_name, &options)?
    };
    init_from_redis(client);
    Ok(())
}

/// Resolves `url` and registers the shared client.
///
/// A non-empty [`URL_ENV_VAR`] replaces `url` entirely; [`AUTH_ENV_VAR`] is
/// written into `overrides` as `password`. Overrides are applied after
/// URL-derived values and therefore win.
///
/// The `redis+sentinel` scheme resolves a master (or, with `readonly=true`
/// in the URL query, a replica) through the sentinel endpoint list; override
/// `username`/`password` apply to the sentinel connections themselves. Any
/// other scheme is handed to the redis crate for re-parsing, with override
/// `username`/`password`/`db` applied on top, and registered directly.
pub fn init_from_url(url: &str, overrides: ConnectionOptions) -> RegistryResult<()> {
    let mut overrides = overrides;

    let env_url = env::var(URL_ENV_VAR).ok().filter(|value| !value.is_empty());
    let url = match env_url.as_deref() {
        Some(env_url) => {
            warn!(url = env_url, "connection URL overridden by environment");
            env_url
        }
        None => url,
    };

    if let Some(auth) = env::var(AUTH_ENV_VAR).ok().filter(|value| !value.is_empty()) {
        overrides.set("password", OptionValue::Str(auth));
    }

    if split_url(url).scheme == SENTINEL_SCHEME {
        let SentinelUrl {
            endpoints,
            mut options,
        } = parse_sentinel_url(url)?;

        let service_name = match options.remove("service_name") {
            Some(OptionValue::Str(name)) => name,
            _ => return Err(RegistryError::MissingServiceName),
        };
        debug!(
            service_name = service_name.as_str(),
            sentinels = endpoints.len(),
            "initializing sentinel-mediated client"
        );

        // Overrides at this level configure the connections to the
        // sentinels, not to the resolved target store.
        let sentinel_nodes: Vec<ConnectionInfo> = endpoints
            .iter()
            .map(|endpoint| ConnectionInfo {
                addr: ConnectionAddr::Tcp(endpoint.host.clone(), endpoint.port),
                redis: RedisConnectionInfo {
                    username: overrides.str_value("username").map(str::to_string),
                    password: overrides.str_value("password").map(str::to_string),
                    ..Default::default()
                },
            })
            .collect();
        let sentinel = Sentinel::build(sentinel_nodes)?;

        init_from_sentinel(sentinel, &service_name, options)
    } else {
        // The redis crate re-parses the full URL string itself; the
        // resolver is not invoked a second time on this path.
        let mut connection_info = url.into_connection_info()?;
        apply_overrides(&mut connection_info.redis, &overrides)?;
        let client = Client::open(connection_info)?;
        init_from_redis(client);
        Ok(())
    }
}

/// Applies override options onto a redis connection descriptor. Only the
/// options the descriptor can represent are forwarded.
fn apply_overrides(
    connection_info: &mut RedisConnectionInfo,
    options: &ConnectionOptions,
) -> RegistryResult<()> {
    if let Some(db) = options.get("db") {
        connection_info.db = db_index(db)?;
    }
    if let Some(username) = options.str_value("username") {
        connection_info.username = Some(username.to_string());
    }
    if let Some(password) = options.str_value("password") {
        connection_info.password = Some(password.to_string());
    }
    Ok(())
}

fn node_connection_info(options: &ConnectionOptions) -> RegistryResult<SentinelNodeConnectionInfo> {
    let mut redis_info = RedisConnectionInfo::default();
    apply_overrides(&mut redis_info, options)?;
    Ok(SentinelNodeConnectionInfo {
        tls_mode: None,
        redis_connection_info: Some(redis_info),
    })
}

/// A db option lifted from a URL path arrives as a string; the collaborator
/// needs an index, so interpretation happens at this boundary.
fn db_index(value: &OptionValue) -> RegistryResult<i64> {
    match value {
        OptionValue::Int(db) => Ok(*db),
        OptionValue::Str(raw) => raw.parse().map_err(|_| RegistryError::InvalidOptionValue {
            option: "db".to_string(),
        }),
        _ => Err(RegistryError::InvalidOptionValue {
            option: "db".to_string(),
        }),
    }
}
