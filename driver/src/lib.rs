//! Connection pool, discovery/local-DC detection, and the process-wide
//! driver (section 4.2, 4.3, 4.4). A `Driver` owns a [`pool::DriverPool`],
//! a background discovery loop, a credentials provider, and a token-refresh
//! loop, and hands out typed RPC clients decorated with the database name
//! and auth-ticket middleware.

pub mod config;
pub mod connstr;
pub mod discovery;
pub mod driver;
pub mod endpoint;
pub mod error;
pub mod middleware;
pub mod pool;

pub use config::{DriverConfig, SecureOptions};
pub use connstr::ConnectionString;
pub use driver::Driver;
pub use endpoint::{Connection, Endpoint};
pub use error::DriverError;
