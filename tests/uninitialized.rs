//! The shared-client slot is process-global, so the before-any-init behavior
//! gets its own test binary: nothing else in this process may populate it.

use redis_registry::{get_client, RegistryError};

#[test]
fn get_client_before_any_init_fails() {
    let err = get_client().expect_err("no client registered");
    assert!(matches!(err, RegistryError::NotInitialized));
}
