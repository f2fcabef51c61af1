//! The per-call middleware section 4.4 describes: "injects the database
//! name, attaches the current auth token as `x-ydb-auth-ticket`".

use http::HeaderValue;
use tonic::service::Interceptor;
use tonic::Status;

const DATABASE_HEADER: &str = "x-ydb-database";
const AUTH_HEADER: &str = "x-ydb-auth-ticket";

#[derive(Clone, Debug)]
pub struct AuthInterceptor {
    database: String,
    token: Option<String>,
}

impl AuthInterceptor {
    pub fn new(database: String, token: Option<String>) -> Self {
        Self { database, token }
    }
}

impl Interceptor for AuthInterceptor {
    fn call(&mut self, mut request: tonic::Request<()>) -> Result<tonic::Request<()>, Status> {
        let metadata = request.metadata_mut();
        let db = HeaderValue::from_str(&self.database)
            .map_err(|e| Status::invalid_argument(format!("invalid database name: {e}")))?;
        metadata.insert(DATABASE_HEADER, db);

        if let Some(token) = &self.token {
            let value = HeaderValue::from_str(token).map_err(|e| Status::invalid_argument(format!("invalid token: {e}")))?;
            metadata.insert(AUTH_HEADER, value);
        }

        Ok(request)
    }
}
