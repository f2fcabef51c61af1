pub mod error;
pub mod providers;
pub mod token;

pub use error::Error;
pub use providers::{CachingCredentials, CredentialsProvider, EnvCredentials, StaticCredentials};
pub use token::Token;
