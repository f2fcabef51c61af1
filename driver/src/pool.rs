//! Wraps [`ydb_gax::conn::Pool`] with YDB-specific reconciliation: discovery
//! hands the pool a fresh endpoint list, and the pool adds what's new and
//! removes what's no longer advertised (section 4.3).

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use ydb_gax::conn::{AcquireOptions, Pool, PoolError};

use crate::config::SecureOptions;
use crate::endpoint::{Connection, Endpoint};

pub struct DriverPool {
    inner: Pool<Connection>,
    secure_options: Arc<SecureOptions>,
}

impl DriverPool {
    pub fn new() -> Self {
        Self::with_secure_options(SecureOptions::default())
    }

    pub fn with_secure_options(secure_options: SecureOptions) -> Self {
        Self { inner: Pool::new(), secure_options: Arc::new(secure_options) }
    }

    /// Seeds the pool with a single endpoint, used before the first
    /// discovery reconciliation completes (or permanently, when discovery is
    /// disabled and the URI endpoint is used directly).
    pub fn seed(&self, endpoint: Endpoint) {
        self.inner.add(Connection::new(endpoint, self.secure_options.clone()));
    }

    /// Adds newly advertised endpoints and removes ones no longer present,
    /// per section 4.3 ("add new endpoints, remove stale ones").
    pub fn reconcile(&self, endpoints: Vec<Endpoint>) {
        let fresh: HashSet<u32> = endpoints.iter().map(|e| e.node_id).collect();
        for node_id in self.inner.node_ids() {
            if !fresh.contains(&node_id) {
                self.inner.remove(node_id);
            }
        }
        for endpoint in endpoints {
            self.inner.add(Connection::new(endpoint, self.secure_options.clone()));
        }
    }

    pub fn acquire(&self, options: &AcquireOptions) -> Result<Connection, PoolError> {
        self.inner.acquire(options)
    }

    pub fn pessimize(&self, node_id: u32, duration: Duration) {
        self.inner.pessimize(node_id, duration);
    }

    pub fn set_local_dc(&self, location: impl Into<String>) {
        self.inner.set_local_dc(location);
    }

    pub fn local_dc(&self) -> Option<String> {
        self.inner.local_dc()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl Default for DriverPool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ydb_gax::conn::Connection as _;

    fn endpoint(node_id: u32, location: &str) -> Endpoint {
        Endpoint {
            node_id,
            address: "localhost".to_string(),
            port: 2136,
            location: location.to_string(),
            ssl: false,
            ssl_target_name_override: None,
        }
    }

    #[test]
    fn reconcile_adds_and_removes() {
        let pool = DriverPool::new();
        pool.seed(endpoint(1, "vla"));
        pool.reconcile(vec![endpoint(1, "vla"), endpoint(2, "sas")]);
        assert_eq!(pool.len(), 2);
        pool.reconcile(vec![endpoint(2, "sas")]);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.acquire(&AcquireOptions::default()).unwrap().node_id(), 2);
    }
}
