//! Cancellation signalling for in-flight page requests.
//!
//! A [`CancelHandle`]/[`CancelToken`] pair connects a caller to the detail
//! fetches spawned on its behalf. Tokens are cheap to clone; every clone
//! observes the same signal.

use tokio::sync::watch;

/// Create a connected cancellation pair.
pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelToken { rx })
}

/// Caller-held handle that triggers cancellation.
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Signal every holder of the paired token.
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

/// Cancellation signal observed by fetch tasks.
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    /// A token that can never fire.
    pub fn never() -> Self {
        let (tx, rx) = watch::channel(false);
        drop(tx);
        CancelToken { rx }
    }

    /// Check the signal without waiting.
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once cancellation fires.
    ///
    /// Never resolves if the paired handle is dropped without cancelling.
    pub async fn cancelled(&mut self) {
        loop {
            if *self.rx.borrow_and_update() {
                return;
            }
            if self.rx.changed().await.is_err() {
                // Handle dropped without cancelling; nothing left to wait on.
                std::future::pending::<()>().await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_cancel_fires() {
        let (handle, mut token) = cancel_pair();
        assert!(!token.is_cancelled());

        handle.cancel();
        assert!(token.is_cancelled());
        token.cancelled().await;
    }

    #[tokio::test]
    async fn test_clones_observe_signal() {
        let (handle, token) = cancel_pair();
        let mut cloned = token.clone();

        handle.cancel();
        cloned.cancelled().await;
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_never_does_not_fire() {
        let mut token = CancelToken::never();
        assert!(!token.is_cancelled());

        let fired = tokio::time::timeout(Duration::from_millis(20), token.cancelled()).await;
        assert!(fired.is_err());
    }
}
