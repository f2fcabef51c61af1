use tokio_util::sync::CancellationToken as InternalCancellationToken;

/// Wraps `tokio_util::sync::CancellationToken` so callers depend on
/// `ydb_gax` rather than pulling `tokio-util` directly into every crate.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    inner: InternalCancellationToken,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self {
            inner: InternalCancellationToken::new(),
        }
    }

    /// A token which is cancelled whenever `self` (or any ancestor) is cancelled.
    /// If `self` is already cancelled, the child is returned already-cancelled.
    pub fn child_token(&self) -> CancellationToken {
        Self {
            inner: self.inner.child_token(),
        }
    }

    pub fn cancel(&self) {
        self.inner.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.is_cancelled()
    }

    pub async fn cancelled(&self) {
        self.inner.cancelled().await
    }
}
