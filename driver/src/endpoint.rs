//! [`Endpoint`] and [`Connection`] from section 3: endpoints are immutable
//! discovery facts, connections are lazy wrappers that open at most one gRPC
//! channel on first use.

use std::fmt::Debug;
use std::sync::Arc;

use tokio::sync::OnceCell;
use tonic::transport::{Certificate, Channel, ClientTlsConfig, Endpoint as TonicEndpoint, Identity};

use crate::config::SecureOptions;
use crate::error::DriverError;

/// Server-advertised endpoint, created by discovery, immutable thereafter.
#[derive(Clone, Debug, PartialEq)]
pub struct Endpoint {
    pub node_id: u32,
    pub address: String,
    pub port: u16,
    pub location: String,
    pub ssl: bool,
    pub ssl_target_name_override: Option<String>,
}

impl Endpoint {
    fn uri(&self) -> String {
        format!("{}://{}:{}", if self.ssl { "https" } else { "http" }, self.address, self.port)
    }
}

/// A lazy wrapper over one [`Endpoint`]: the underlying gRPC channel is
/// created on first use and shared by every subsequent acquire, matching
/// section 3's "owns at most one gRPC channel, created on first use".
/// Pessimization lives in [`ydb_gax::conn::Pool`], not here.
#[derive(Clone, Debug)]
pub struct Connection {
    endpoint: Endpoint,
    secure_options: Arc<SecureOptions>,
    channel: Arc<OnceCell<Channel>>,
}

impl Connection {
    pub fn new(endpoint: Endpoint, secure_options: Arc<SecureOptions>) -> Self {
        Self { endpoint, secure_options, channel: Arc::new(OnceCell::new()) }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Returns the shared channel, connecting lazily on first call.
    pub async fn channel(&self) -> Result<Channel, DriverError> {
        self.channel
            .get_or_try_init(|| async {
                let mut endpoint = TonicEndpoint::from_shared(self.endpoint.uri()).map_err(DriverError::Transport)?;
                if self.endpoint.ssl {
                    let domain = self
                        .endpoint
                        .ssl_target_name_override
                        .clone()
                        .unwrap_or_else(|| self.endpoint.address.clone());
                    let mut tls = ClientTlsConfig::new().with_webpki_roots().domain_name(domain);
                    if let Some(ca) = &self.secure_options.ca_certificate {
                        tls = tls.ca_certificate(Certificate::from_pem(ca));
                    }
                    if let (Some(cert), Some(key)) =
                        (&self.secure_options.client_certificate, &self.secure_options.client_key)
                    {
                        tls = tls.identity(Identity::from_pem(cert, key));
                    }
                    endpoint = endpoint.tls_config(tls)?;
                }
                endpoint.connect().await.map_err(DriverError::Transport)
            })
            .await
            .map(|channel| channel.clone())
    }
}

impl ydb_gax::conn::Connection for Connection {
    fn node_id(&self) -> u32 {
        self.endpoint.node_id
    }

    fn location(&self) -> &str {
        &self.endpoint.location
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn uri_reflects_ssl_flag() {
        let mut e = endpoint(1, "dc1");
        assert_eq!(e.uri(), "http://localhost:2136");
        e.ssl = true;
        assert_eq!(e.uri(), "https://localhost:2136");
    }

    #[test]
    fn connection_exposes_endpoint_identity() {
        use ydb_gax::conn::Connection as _;
        let conn = Connection::new(endpoint(7, "sas"), Arc::new(SecureOptions::default()));
        assert_eq!(conn.node_id(), 7);
        assert_eq!(conn.location(), "sas");
    }
}
