/// Errors the driver's own collaborators raise, as opposed to a YDB
/// operation error (`ydb_gax::status::YdbError`) surfaced through an RPC.
#[derive(thiserror::Error, Debug)]
pub enum DriverError {
    #[error("no connection matches the requested preferences")]
    NoMatchingConnection,

    #[error("retry budget exhausted after {attempts} attempt(s)")]
    BudgetExhausted { attempts: u32 },

    #[error("invalid connection string {input:?}: {reason}")]
    InvalidConnectionString { input: String, reason: &'static str },

    #[error("discovery failed: {0}")]
    Discovery(#[source] tonic::Status),

    #[error("failed to connect: {0}")]
    Transport(#[from] tonic::transport::Error),

    #[error("credentials error: {0}")]
    Auth(#[from] ydb_auth::Error),

    #[error("driver is closed")]
    Closed,
}

impl From<ydb_gax::conn::PoolError> for DriverError {
    fn from(_: ydb_gax::conn::PoolError) -> Self {
        DriverError::NoMatchingConnection
    }
}
