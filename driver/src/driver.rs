//! The process-wide coordinator (section 4.4): owns the pool, the
//! credentials provider, the discovery loop, and the token-refresh loop, and
//! hands out typed RPC clients decorated with the auth/database middleware.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{Notify, RwLock};
use tokio::task::JoinHandle;
use tonic::service::interceptor::InterceptedService;
use tonic::transport::Channel;

use ydb_auth::CredentialsProvider;
use ydb_gax::cancel::CancellationToken;
use ydb_gax::conn::AcquireOptions;
use ydb_proto::discovery::discovery_service_client::DiscoveryServiceClient;
use ydb_proto::topic::topic_service_client::TopicServiceClient;

use crate::config::DriverConfig;
use crate::connstr::ConnectionString;
use crate::endpoint::Endpoint;
use crate::error::DriverError;
use crate::middleware::AuthInterceptor;
use crate::pool::DriverPool;

/// The process-wide YDB driver. Cheap to clone (every field is an `Arc`);
/// clones share the same pool, background loops, and token cache.
#[derive(Clone)]
pub struct Driver {
    database: String,
    pool: Arc<DriverPool>,
    creds: Arc<dyn CredentialsProvider>,
    config: DriverConfig,
    current_token: Arc<RwLock<Option<String>>>,
    ready_flag: Arc<AtomicBool>,
    ready_notify: Arc<Notify>,
    cancel: CancellationToken,
    background: Arc<Background>,
}

struct Background {
    discovery: Option<JoinHandle<()>>,
    token_refresh: JoinHandle<()>,
}

impl Drop for Background {
    fn drop(&mut self) {
        if let Some(h) = &self.discovery {
            h.abort();
        }
        self.token_refresh.abort();
    }
}

impl Driver {
    /// Parses `connection_string`, seeds the pool with the URI endpoint, and
    /// spawns the discovery and token-refresh loops per section 4.4.
    pub async fn connect(
        connection_string: &str,
        creds: Arc<dyn CredentialsProvider>,
        config: DriverConfig,
    ) -> Result<Self, DriverError> {
        let parsed = ConnectionString::parse(connection_string)?;
        let pool = Arc::new(DriverPool::new());
        pool.seed(Endpoint {
            node_id: 0,
            address: parsed.host.clone(),
            port: parsed.port,
            location: String::new(),
            ssl: parsed.ssl,
            ssl_target_name_override: None,
        });
        if let Some(dc) = &config.local_dc {
            pool.set_local_dc(dc.clone());
        }

        let cancel = CancellationToken::new();
        let ready_flag = Arc::new(AtomicBool::new(!config.enable_discovery));
        let ready_notify = Arc::new(Notify::new());
        let current_token = Arc::new(RwLock::new(None));

        let discovery = if config.enable_discovery {
            Some(Self::spawn_discovery_loop(
                pool.clone(),
                parsed.database.clone(),
                config.clone(),
                ready_flag.clone(),
                ready_notify.clone(),
                cancel.clone(),
            ))
        } else {
            ready_notify.notify_waiters();
            None
        };

        let token_refresh =
            Self::spawn_token_refresh_loop(creds.clone(), config.clone(), current_token.clone(), cancel.clone());

        Ok(Self {
            database: parsed.database,
            pool,
            creds,
            config,
            current_token,
            ready_flag,
            ready_notify,
            cancel,
            background: Arc::new(Background { discovery, token_refresh }),
        })
    }

    fn spawn_discovery_loop(
        pool: Arc<DriverPool>,
        database: String,
        config: DriverConfig,
        ready_flag: Arc<AtomicBool>,
        ready_notify: Arc<Notify>,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let discovery = crate::discovery::Discovery::new(pool.clone(), database, config.local_dc_probe_timeout);
            loop {
                let outcome = async {
                    let conn = pool.acquire(&AcquireOptions { allow_fallback: true, ..Default::default() })?;
                    let channel = conn.channel().await?;
                    discovery.run_once(channel).await
                }
                .await;

                match outcome {
                    Ok(count) if count > 0 => {
                        if !ready_flag.swap(true, Ordering::SeqCst) {
                            ready_notify.notify_waiters();
                        }
                    }
                    Ok(_) => tracing::debug!("discovery returned zero endpoints"),
                    Err(err) => tracing::warn!(error = %err, "discovery reconciliation failed"),
                }

                tokio::select! {
                    _ = cancel.cancelled() => return,
                    _ = tokio::time::sleep(config.discovery_interval) => {}
                }
            }
        })
    }

    fn spawn_token_refresh_loop(
        creds: Arc<dyn CredentialsProvider>,
        config: DriverConfig,
        current_token: Arc<RwLock<Option<String>>>,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                match creds.get_token(false, &cancel).await {
                    Ok(token) => *current_token.write().await = Some(token.value),
                    Err(err) => tracing::warn!(error = %err, "token refresh failed"),
                }
                tokio::select! {
                    _ = cancel.cancelled() => return,
                    _ = tokio::time::sleep(config.token_refresh_interval) => {}
                }
            }
        })
    }

    /// Resolves once the first discovery reconciliation has completed and
    /// the pool has at least one usable connection (or immediately, when
    /// discovery is disabled).
    pub async fn ready(&self, cancel: &CancellationToken) {
        if self.ready_flag.load(Ordering::SeqCst) {
            return;
        }
        tokio::select! {
            _ = cancel.cancelled() => {}
            _ = self.ready_notify.notified() => {}
        }
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn pool(&self) -> &Arc<DriverPool> {
        &self.pool
    }

    async fn interceptor(&self) -> AuthInterceptor {
        let token = self.current_token.read().await.clone();
        AuthInterceptor::new(self.database.clone(), token)
    }

    async fn channel(&self, options: &AcquireOptions) -> Result<Channel, DriverError> {
        let conn = self.pool.acquire(options)?;
        conn.channel().await
    }

    /// Builds a [`TopicServiceClient`] decorated with the database/auth-ticket
    /// middleware, acquiring its transport from the pool per `options`.
    pub async fn topic_client(
        &self,
        options: &AcquireOptions,
    ) -> Result<TopicServiceClient<InterceptedService<Channel, AuthInterceptor>>, DriverError> {
        let channel = self.channel(options).await?;
        let interceptor = self.interceptor().await;
        Ok(TopicServiceClient::with_interceptor(channel, interceptor))
    }

    /// Builds a [`DiscoveryServiceClient`] decorated the same way, for
    /// callers that need to query discovery directly rather than through the
    /// background loop.
    pub async fn discovery_client(
        &self,
        options: &AcquireOptions,
    ) -> Result<DiscoveryServiceClient<InterceptedService<Channel, AuthInterceptor>>, DriverError> {
        let channel = self.channel(options).await?;
        let interceptor = self.interceptor().await;
        Ok(DiscoveryServiceClient::with_interceptor(channel, interceptor))
    }

    /// Halts discovery and token refresh and releases the driver's pool
    /// reference. Channels already handed out to live clients remain valid
    /// until those clients are dropped.
    pub fn close(&self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ydb_auth::StaticCredentials;

    #[tokio::test]
    async fn connect_without_discovery_is_immediately_ready() {
        let config = DriverConfig { enable_discovery: false, ..Default::default() };
        let driver = Driver::connect("grpc://localhost:2136/local", Arc::new(StaticCredentials::new("t")), config)
            .await
            .unwrap();
        let cancel = CancellationToken::new();
        // Must not block: discovery is disabled so readiness is pre-set.
        tokio::time::timeout(std::time::Duration::from_millis(100), driver.ready(&cancel))
            .await
            .expect("ready() should resolve immediately without discovery");
        driver.close();
    }

    #[tokio::test]
    async fn close_cancels_background_loops() {
        let config = DriverConfig { enable_discovery: false, ..Default::default() };
        let driver = Driver::connect("grpc://localhost:2136/local", Arc::new(StaticCredentials::new("t")), config)
            .await
            .unwrap();
        driver.close();
        assert!(driver.cancel.is_cancelled());
    }
}
