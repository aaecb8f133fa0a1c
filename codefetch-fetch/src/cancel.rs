//! Cooperative cancellation for in-flight retrievals.

use std::sync::Arc;
use tokio::sync::watch;

/// A cloneable cancellation signal.
///
/// All clones observe the same flag. Once cancelled a token stays
/// cancelled.
#[derive(Debug, Clone)]
pub struct CancelToken {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelToken {
    /// Creates a token that has not fired.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Fires the token, waking every waiter.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// Returns true once the token has fired.
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Completes when the token fires. Never completes otherwise.
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        if rx.wait_for(|cancelled| *cancelled).await.is_err() {
            // Sender is owned by `self`, so this is unreachable in practice.
            std::future::pending::<()>().await;
        }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}
