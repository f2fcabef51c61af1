use std::sync::RwLock;

use async_trait::async_trait;
use tokio::sync::Mutex;
use ydb_gax::cancel::CancellationToken;

use crate::error::Error;
use crate::token::Token;

/// The driver-configuration `credentialsProvider` surface: `getToken(force,
/// cancel) -> token`. `force` bypasses any cache the implementation keeps;
/// `cancel` aborts an in-flight fetch.
#[async_trait]
pub trait CredentialsProvider: Send + Sync + std::fmt::Debug {
    async fn get_token(&self, force: bool, cancel: &CancellationToken) -> Result<Token, Error>;
}

/// Always returns the same fixed token. Useful for tests and for static
/// deployment secrets.
#[derive(Debug)]
pub struct StaticCredentials {
    token: Token,
}

impl StaticCredentials {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            token: Token::new(value),
        }
    }
}

#[async_trait]
impl CredentialsProvider for StaticCredentials {
    async fn get_token(&self, _force: bool, _cancel: &CancellationToken) -> Result<Token, Error> {
        Ok(self.token.clone())
    }
}

/// Reads the token fresh from an environment variable on every call. No
/// caching of its own — wrap it in [`CachingCredentials`] if the variable
/// is expensive to resolve.
#[derive(Debug)]
pub struct EnvCredentials {
    var: &'static str,
}

impl EnvCredentials {
    pub fn new(var: &'static str) -> Self {
        Self { var }
    }
}

#[async_trait]
impl CredentialsProvider for EnvCredentials {
    async fn get_token(&self, _force: bool, _cancel: &CancellationToken) -> Result<Token, Error> {
        let value = std::env::var(self.var).map_err(|_| Error::MissingEnvVar(self.var))?;
        Ok(Token::new(value))
    }
}

/// Wraps another provider with single-flight caching: concurrent callers
/// that observe an invalid cached token block on one shared refresh rather
/// than each issuing their own fetch.
#[derive(Debug)]
pub struct CachingCredentials<P> {
    target: P,
    current: RwLock<Option<Token>>,
    refresh_guard: Mutex<()>,
}

impl<P> CachingCredentials<P>
where
    P: CredentialsProvider,
{
    pub fn new(target: P) -> Self {
        Self {
            target,
            current: RwLock::new(None),
            refresh_guard: Mutex::new(()),
        }
    }

    fn cached_if_valid(&self) -> Option<Token> {
        let guard = self.current.read().ok()?;
        let token = guard.as_ref()?;
        token.valid().then(|| token.clone())
    }
}

#[async_trait]
impl<P> CredentialsProvider for CachingCredentials<P>
where
    P: CredentialsProvider,
{
    async fn get_token(&self, force: bool, cancel: &CancellationToken) -> Result<Token, Error> {
        if !force {
            if let Some(token) = self.cached_if_valid() {
                return Ok(token);
            }
        }

        // Only one task refreshes at a time; everyone else waits here and
        // then re-checks the cache before giving up and fetching again.
        let _permit = tokio::select! {
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            guard = self.refresh_guard.lock() => guard,
        };

        if !force {
            if let Some(token) = self.cached_if_valid() {
                return Ok(token);
            }
        }

        let token = self.target.get_token(force, cancel).await?;
        tracing::debug!(expiry = ?token.expiry, "refreshed auth token");
        *self
            .current
            .write()
            .map_err(|e| Error::Poisoned(e.to_string()))? = Some(token.clone());
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[derive(Debug)]
    struct CountingProvider {
        calls: Arc<AtomicU32>,
    }

    #[async_trait]
    impl CredentialsProvider for CountingProvider {
        async fn get_token(&self, _force: bool, _cancel: &CancellationToken) -> Result<Token, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Token::new("t"))
        }
    }

    #[tokio::test]
    async fn static_credentials_return_fixed_token() {
        let creds = StaticCredentials::new("abc");
        let token = creds.get_token(false, &CancellationToken::new()).await.unwrap();
        assert_eq!(token.value, "abc");
    }

    #[tokio::test]
    async fn caching_credentials_reuse_valid_token() {
        let calls = Arc::new(AtomicU32::new(0));
        let caching = CachingCredentials::new(CountingProvider { calls: calls.clone() });
        let cancel = CancellationToken::new();
        caching.get_token(false, &cancel).await.unwrap();
        caching.get_token(false, &cancel).await.unwrap();
        caching.get_token(false, &cancel).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn caching_credentials_force_refresh_bypasses_cache() {
        let calls = Arc::new(AtomicU32::new(0));
        let caching = CachingCredentials::new(CountingProvider { calls: calls.clone() });
        let cancel = CancellationToken::new();
        caching.get_token(false, &cancel).await.unwrap();
        caching.get_token(true, &cancel).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn env_credentials_surface_missing_var() {
        let creds = EnvCredentials::new("YDB_RUST_SDK_TEST_DOES_NOT_EXIST");
        let result = creds.get_token(false, &CancellationToken::new()).await;
        assert!(matches!(result, Err(Error::MissingEnvVar(_))));
    }

    // Mutates process-wide environment state, so it must not interleave with
    // any other test touching the same variable.
    #[tokio::test]
    #[serial_test::serial]
    async fn env_credentials_reads_value() {
        std::env::set_var("YDB_RUST_SDK_TEST_TOKEN", "secret-value");
        let creds = EnvCredentials::new("YDB_RUST_SDK_TEST_TOKEN");
        let token = creds.get_token(false, &CancellationToken::new()).await.unwrap();
        assert_eq!(token.value, "secret-value");
        std::env::remove_var("YDB_RUST_SDK_TEST_TOKEN");
    }
}
