//! Periodic `ListEndpoints` polling and local-DC detection (section 4.3).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::FuturesUnordered;
use futures_util::StreamExt;
use rand::seq::SliceRandom;
use tokio::net::TcpStream;
use tonic::transport::Channel;

use ydb_proto::discovery::discovery_service_client::DiscoveryServiceClient;
use ydb_proto::discovery::ListEndpointsRequest;
use ydb_proto::issue::StatusCode;

use crate::endpoint::Endpoint;
use crate::error::DriverError;
use crate::pool::DriverPool;

/// How many endpoints per location to race during local-DC detection
/// (section 4.3: "sample up to 5 per group").
const LOCAL_DC_SAMPLE_SIZE: usize = 5;

pub struct Discovery {
    pool: Arc<DriverPool>,
    database: String,
    probe_timeout: Duration,
}

impl Discovery {
    pub fn new(pool: Arc<DriverPool>, database: String, probe_timeout: Duration) -> Self {
        Self { pool, database, probe_timeout }
    }

    /// Calls `ListEndpoints` over `channel`, reconciles the pool with the
    /// result, and re-detects the local DC when more than one location is
    /// present. Returns the endpoint count after reconciliation so callers
    /// can judge whether the pool is now usable.
    pub async fn run_once(&self, channel: Channel) -> Result<usize, DriverError> {
        let endpoints = self.list_endpoints(channel).await?;
        let count = endpoints.len();

        let mut by_location: HashMap<&str, Vec<&Endpoint>> = HashMap::new();
        for e in &endpoints {
            by_location.entry(e.location.as_str()).or_default().push(e);
        }

        self.pool.reconcile(endpoints.clone());

        if by_location.len() == 1 {
            let location = by_location.keys().next().unwrap().to_string();
            self.pool.set_local_dc(location);
        } else if by_location.len() > 1 {
            if let Some(location) = self.detect_local_dc(&by_location).await {
                self.pool.set_local_dc(location);
            }
        }

        Ok(count)
    }

    async fn list_endpoints(&self, channel: Channel) -> Result<Vec<Endpoint>, DriverError> {
        let mut client = DiscoveryServiceClient::new(channel);
        let request = ListEndpointsRequest {
            database: self.database.clone(),
            service: vec!["table".to_string(), "topic".to_string()],
        };
        let response = client.list_endpoints(request).await.map_err(DriverError::Discovery)?.into_inner();

        if let Some(op) = &response.operation {
            if op.status != StatusCode::Success as i32 {
                return Err(DriverError::Discovery(tonic::Status::unknown(format!(
                    "ListEndpoints returned non-success status {}",
                    op.status
                ))));
            }
        }

        let result = response.result.ok_or_else(|| {
            DriverError::Discovery(tonic::Status::unknown("ListEndpoints response carried no result"))
        })?;

        Ok(result
            .endpoints
            .into_iter()
            .map(|e| Endpoint {
                node_id: e.node_id,
                address: e.address,
                port: e.port as u16,
                location: e.location,
                ssl: e.ssl,
                ssl_target_name_override: None,
            })
            .collect())
    }

    /// Races TCP connects to up to [`LOCAL_DC_SAMPLE_SIZE`] endpoints per
    /// location; the location of the first successful connect wins. Returns
    /// `None` if every probe fails (section 4.3: "if all fail, leave
    /// local-DC unset").
    async fn detect_local_dc(&self, by_location: &HashMap<&str, Vec<&Endpoint>>) -> Option<String> {
        let mut rng = rand::thread_rng();
        let mut probes = FuturesUnordered::new();

        for (location, endpoints) in by_location {
            let mut sample: Vec<&&Endpoint> = endpoints.iter().collect();
            sample.shuffle(&mut rng);
            for endpoint in sample.into_iter().take(LOCAL_DC_SAMPLE_SIZE) {
                let location = location.to_string();
                let addr = format!("{}:{}", endpoint.address, endpoint.port);
                let timeout = self.probe_timeout;
                probes.push(async move {
                    let result = tokio::time::timeout(timeout, TcpStream::connect(&addr)).await;
                    match result {
                        Ok(Ok(_)) => Some(location),
                        _ => None,
                    }
                });
            }
        }

        while let Some(result) = probes.next().await {
            if result.is_some() {
                return result;
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn local_dc_detection_picks_first_successful_connect() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            loop {
                if listener.accept().await.is_err() {
                    break;
                }
            }
        });

        let reachable = Endpoint {
            node_id: 1,
            address: addr.ip().to_string(),
            port: addr.port(),
            location: "vla".to_string(),
            ssl: false,
            ssl_target_name_override: None,
        };
        let unreachable = Endpoint {
            node_id: 2,
            address: "240.0.0.1".to_string(),
            port: 65535,
            location: "sas".to_string(),
            ssl: false,
            ssl_target_name_override: None,
        };

        let mut by_location: HashMap<&str, Vec<&Endpoint>> = HashMap::new();
        by_location.insert("vla", vec![&reachable]);
        by_location.insert("sas", vec![&unreachable]);

        let pool = Arc::new(DriverPool::new());
        let discovery = Discovery::new(pool, "/local".to_string(), Duration::from_millis(300));
        let winner = discovery.detect_local_dc(&by_location).await;
        assert_eq!(winner, Some("vla".to_string()));
    }

    #[tokio::test]
    async fn local_dc_detection_returns_none_when_everything_fails() {
        let unreachable = Endpoint {
            node_id: 1,
            address: "240.0.0.1".to_string(),
            port: 65535,
            location: "sas".to_string(),
            ssl: false,
            ssl_target_name_override: None,
        };
        let mut by_location: HashMap<&str, Vec<&Endpoint>> = HashMap::new();
        by_location.insert("sas", vec![&unreachable]);

        let pool = Arc::new(DriverPool::new());
        let discovery = Discovery::new(pool, "/local".to_string(), Duration::from_millis(200));
        assert_eq!(discovery.detect_local_dc(&by_location).await, None);
    }
}
