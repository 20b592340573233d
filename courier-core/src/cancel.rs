//! Cooperative cancellation helpers.
//!
//! The mediator threads one [`CancellationToken`] by reference through every
//! filter and handler of a dispatch. It never polls the token itself: steps
//! that care about cancellation check it and return [`Canceled`].

use crate::error::Canceled;
use std::future::Future;

pub use tokio_util::sync::CancellationToken;

/// Extension methods for [`CancellationToken`].
pub trait CancellationExt {
    /// Fail with [`Canceled`] if the token already fired.
    fn ensure_active(&self) -> Result<(), Canceled>;

    /// Run `future` until it completes or the token fires, whichever is first.
    fn guard<F>(&self, future: F) -> impl Future<Output = Result<F::Output, Canceled>> + Send
    where
        F: Future + Send,
        F::Output: Send;
}

impl CancellationExt for CancellationToken {
    fn ensure_active(&self) -> Result<(), Canceled> {
        if self.is_cancelled() {
            Err(Canceled)
        } else {
            Ok(())
        }
    }

    async fn guard<F>(&self, future: F) -> Result<F::Output, Canceled>
    where
        F: Future + Send,
        F::Output: Send,
    {
        self.run_until_cancelled(future).await.ok_or(Canceled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_ensure_active() {
        let token = CancellationToken::new();
        assert!(token.ensure_active().is_ok());

        token.cancel();
        assert_eq!(token.ensure_active(), Err(Canceled));
    }

    #[tokio::test]
    async fn test_guard_completes() {
        let token = CancellationToken::new();
        assert_eq!(token.guard(async { 7 }).await, Ok(7));
    }

    #[tokio::test]
    async fn test_guard_observes_cancellation() {
        let token = CancellationToken::new();
        let trigger = token.clone();

        let result = token
            .guard(async {
                trigger.cancel();
                tokio::time::sleep(Duration::from_secs(30)).await;
            })
            .await;

        assert_eq!(result, Err(Canceled));
    }
}
