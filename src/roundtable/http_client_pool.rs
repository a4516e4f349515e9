//! HTTP Client Pool for maintaining persistent connections.
//!
//! A session makes one request per turn, up to a hundred in a row, against the same
//! endpoint. Keeping a single `reqwest::Client` per base URL lets those requests reuse the
//! pooled connection instead of paying DNS and TLS setup on every turn.
//!
//! Entries are keyed by base URL *and* the optional request timeout, since the timeout is
//! baked into the client at build time.

use lazy_static::lazy_static;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use crate::client_wrapper::ClientError;

type PoolKey = (String, Option<Duration>);

lazy_static! {
    /// Global cache of HTTP clients indexed by base URL and timeout.
    static ref CLIENT_POOL: Mutex<HashMap<PoolKey, reqwest::Client>> = Mutex::new(HashMap::new());
}

/// Creates or retrieves a shared HTTP client for the given base URL.
///
/// When `timeout` is set it bounds the whole request (connect + response body); a request
/// exceeding it fails as a transport error.
pub fn get_or_create_client(
    base_url: &str,
    timeout: Option<Duration>,
) -> Result<reqwest::Client, ClientError> {
    let key = (base_url.to_string(), timeout);
    let mut pool = CLIENT_POOL
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());

    if let Some(client) = pool.get(&key) {
        return Ok(client.clone());
    }

    let client = create_pooled_client(timeout)?;
    pool.insert(key, client.clone());
    Ok(client)
}

/// Builds a client tuned for a long-lived sequential session:
/// - `pool_idle_timeout(90s)` keeps the connection across pacing delays
/// - `tcp_keepalive(60s)` prevents idle drops between slow turns
/// - `connect_timeout(30s)` bounds connection setup even without a request timeout
fn create_pooled_client(timeout: Option<Duration>) -> Result<reqwest::Client, ClientError> {
    let mut builder = reqwest::ClientBuilder::new()
        .pool_max_idle_per_host(4)
        .pool_idle_timeout(Some(Duration::from_secs(90)))
        .tcp_keepalive(Some(Duration::from_secs(60)))
        .connect_timeout(Duration::from_secs(30));

    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }

    builder
        .build()
        .map_err(|e| ClientError::Configuration(format!("failed to build HTTP client: {}", e)))
}
