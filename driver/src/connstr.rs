//! Parses the `grpc[s]://host[:port][/database][?database=…]` connection
//! string form from section 6. TLS material itself (CA, cert, key) is never
//! part of the URI — it travels as [`crate::config::SecureOptions`].

use crate::error::DriverError;

const DEFAULT_TLS_PORT: u16 = 2135;
const DEFAULT_PLAIN_PORT: u16 = 2136;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectionString {
    pub ssl: bool,
    pub host: String,
    pub port: u16,
    pub database: String,
}

impl ConnectionString {
    /// Parses `input` per section 6: the scheme (`grpc` vs `grpcs`) selects
    /// TLS, the path segment supplies the database if non-empty, otherwise
    /// the `database` query parameter is used, and the port defaults to
    /// 2135 (TLS) or 2136 (plaintext) when absent.
    pub fn parse(input: &str) -> Result<Self, DriverError> {
        let url = url::Url::parse(input).map_err(|_| DriverError::InvalidConnectionString {
            input: input.to_string(),
            reason: "not a valid URI",
        })?;

        let ssl = match url.scheme() {
            "grpc" => false,
            "grpcs" => true,
            _ => {
                return Err(DriverError::InvalidConnectionString {
                    input: input.to_string(),
                    reason: "scheme must be grpc or grpcs",
                })
            }
        };

        let host = url
            .host_str()
            .ok_or(DriverError::InvalidConnectionString {
                input: input.to_string(),
                reason: "missing host",
            })?
            .to_string();

        let port = url.port().unwrap_or(if ssl { DEFAULT_TLS_PORT } else { DEFAULT_PLAIN_PORT });

        let path_database = url.path().trim_start_matches('/');
        let database = if !path_database.is_empty() {
            path_database.to_string()
        } else {
            url.query_pairs()
                .find(|(k, _)| k == "database")
                .map(|(_, v)| v.to_string())
                .ok_or(DriverError::InvalidConnectionString {
                    input: input.to_string(),
                    reason: "no database in path or query string",
                })?
        };

        Ok(Self { ssl, host, port, database })
    }

    pub fn endpoint_uri(&self) -> String {
        format!("{}://{}:{}", if self.ssl { "https" } else { "http" }, self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_database_from_path() {
        let cs = ConnectionString::parse("grpcs://ydb.example.com:2135/my/db").unwrap();
        assert!(cs.ssl);
        assert_eq!(cs.host, "ydb.example.com");
        assert_eq!(cs.port, 2135);
        assert_eq!(cs.database, "my/db");
    }

    #[test]
    fn parses_database_from_query_when_path_empty() {
        let cs = ConnectionString::parse("grpc://localhost?database=/local").unwrap();
        assert!(!cs.ssl);
        assert_eq!(cs.database, "/local");
    }

    #[test]
    fn path_database_wins_over_query() {
        let cs = ConnectionString::parse("grpc://localhost/path-db?database=/query-db").unwrap();
        assert_eq!(cs.database, "path-db");
    }

    #[test]
    fn defaults_port_by_scheme() {
        let tls = ConnectionString::parse("grpcs://host/db").unwrap();
        assert_eq!(tls.port, 2135);
        let plain = ConnectionString::parse("grpc://host/db").unwrap();
        assert_eq!(plain.port, 2136);
    }

    #[test]
    fn explicit_port_overrides_default() {
        let cs = ConnectionString::parse("grpc://host:2222/db").unwrap();
        assert_eq!(cs.port, 2222);
    }

    #[test]
    fn rejects_unknown_scheme() {
        assert!(matches!(
            ConnectionString::parse("http://host/db"),
            Err(DriverError::InvalidConnectionString { .. })
        ));
    }

    #[test]
    fn rejects_missing_database() {
        assert!(matches!(
            ConnectionString::parse("grpc://host"),
            Err(DriverError::InvalidConnectionString { .. })
        ));
    }
}
