#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("no credentials available: {0}")]
    NotFound(String),

    #[error("environment variable {0} is not set")]
    MissingEnvVar(&'static str),

    #[error("token fetch timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("token fetch was cancelled")]
    Cancelled,

    #[error("token poisoned: {0}")]
    Poisoned(String),
}
