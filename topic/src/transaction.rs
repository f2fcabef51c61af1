//! The opaque transaction handle from section 3: `{sessionId,
//! transactionId, onCommit(fn), onRollback(fn)}`. Topic readers/writers
//! bind to one by registering pre-commit and rollback hooks; the host
//! transaction (table session machinery) is out of scope for this
//! subsystem and is represented here only by the surface it exposes to us.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::TopicError;

type Hook = Box<dyn Fn() -> Pin<Box<dyn Future<Output = Result<(), TopicError>> + Send>> + Send + Sync>;

/// A handle to a host-managed transaction. Readers/writers register
/// `on_commit`/`on_rollback` hooks here; the transaction owner is
/// responsible for invoking [`Transaction::run_commit_hooks`] just before
/// issuing its own commit RPC, and [`Transaction::run_rollback_hooks`] if
/// it rolls back instead.
pub struct Transaction {
    pub session_id: String,
    pub transaction_id: String,
    commit_hooks: Mutex<Vec<Hook>>,
    rollback_hooks: Mutex<Vec<Hook>>,
}

impl Transaction {
    pub fn new(session_id: impl Into<String>, transaction_id: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            session_id: session_id.into(),
            transaction_id: transaction_id.into(),
            commit_hooks: Mutex::new(Vec::new()),
            rollback_hooks: Mutex::new(Vec::new()),
        })
    }

    pub async fn on_commit<F, Fut>(&self, hook: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), TopicError>> + Send + 'static,
    {
        self.commit_hooks.lock().await.push(Box::new(move || Box::pin(hook())));
    }

    pub async fn on_rollback<F, Fut>(&self, hook: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), TopicError>> + Send + 'static,
    {
        self.rollback_hooks.lock().await.push(Box::new(move || Box::pin(hook())));
    }

    /// Invoked by the transaction owner just before its own commit RPC.
    /// Runs every registered hook in registration order, stopping at the
    /// first failure (a reader's `UpdateOffsetsInTransaction` failing
    /// should abort the whole commit).
    pub async fn run_commit_hooks(&self) -> Result<(), TopicError> {
        for hook in self.commit_hooks.lock().await.iter() {
            hook().await?;
        }
        Ok(())
    }

    /// Invoked by the transaction owner on rollback. Best-effort: every
    /// hook runs even if an earlier one fails, since rollback cleanup
    /// (cancelling controllers) must not be skipped.
    pub async fn run_rollback_hooks(&self) {
        for hook in self.rollback_hooks.lock().await.iter() {
            if let Err(err) = hook().await {
                tracing::warn!(error = %err, "rollback hook failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn commit_hooks_run_in_order() {
        let tx = Transaction::new("sess", "tx1");
        let calls = Arc::new(AtomicU32::new(0));
        let c1 = calls.clone();
        tx.on_commit(move || {
            let c1 = c1.clone();
            async move {
                c1.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        })
        .await;
        let c2 = calls.clone();
        tx.on_commit(move || {
            let c2 = c2.clone();
            async move {
                assert_eq!(c2.load(Ordering::SeqCst), 1);
                c2.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        })
        .await;
        tx.run_commit_hooks().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn rollback_hooks_all_run_even_if_one_fails() {
        let tx = Transaction::new("sess", "tx1");
        let calls = Arc::new(AtomicU32::new(0));
        tx.on_rollback(|| async { Err(TopicError::Cancelled) }).await;
        let c = calls.clone();
        tx.on_rollback(move || {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        })
        .await;
        tx.run_rollback_hooks().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
