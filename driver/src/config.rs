use std::time::Duration;

/// TLS material passed to the channel factory, as opposed to the URI (section
/// 6: "TLS options ... are passed as structured configuration, not in the
/// URI").
#[derive(Clone, Debug, Default)]
pub struct SecureOptions {
    pub ca_certificate: Option<Vec<u8>>,
    pub client_certificate: Option<Vec<u8>>,
    pub client_key: Option<Vec<u8>>,
}

/// The recognized `ydb.sdk.*` configuration keys from section 6, one struct
/// per tunable surface the way the corpus's `ClientConfig`/`SessionConfig`
/// structs carry their settings.
#[derive(Clone, Debug)]
pub struct DriverConfig {
    pub enable_discovery: bool,
    pub token_timeout: Duration,
    pub discovery_interval: Duration,
    pub local_dc: Option<String>,
    pub secure_options: SecureOptions,
    /// How often the background loop forces a token refresh (section 4.4:
    /// "the periodic token refresh (default every 60s)").
    pub token_refresh_interval: Duration,
    /// Timeout for the local-DC TCP connect race (section 4.3, default 5s).
    pub local_dc_probe_timeout: Duration,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            enable_discovery: true,
            token_timeout: Duration::from_millis(10_000),
            discovery_interval: Duration::from_millis(60_000),
            local_dc: None,
            secure_options: SecureOptions::default(),
            token_refresh_interval: Duration::from_secs(60),
            local_dc_probe_timeout: Duration::from_secs(5),
        }
    }
}
