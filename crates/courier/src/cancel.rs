//! Cancelable single-assignment futures.
//!
//! [`cancelable`] returns a [`CancelableFuture`] for the caller and a
//! [`Settler`] for whoever produces the value. The first settlement wins:
//! later `resolve`/`reject`/`cancel` calls are no-ops. Cancelling also fires
//! the [`CancellationToken`] handed to the transport so in-flight work can stop.
//!
//! Clones of a future share one cell, so every clone observes the same outcome.

use crate::error::RequestError;
use futures::future::BoxFuture;
use std::fmt;
use std::future::IntoFuture;
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// State of a [`CancelableFuture`].
#[derive(Debug, Clone)]
pub enum Settlement<T> {
    Pending,
    Resolved(T),
    Rejected(RequestError),
}

impl<T> Settlement<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, Settlement::Pending)
    }
}

type Cell<T> = Arc<watch::Sender<Settlement<T>>>;

/// Returns true if this call settled the cell.
fn settle<T>(cell: &watch::Sender<Settlement<T>>, outcome: Settlement<T>) -> bool {
    cell.send_if_modified(move |current| {
        if current.is_pending() {
            *current = outcome;
            true
        } else {
            false
        }
    })
}

/// Create a pending future and the handle that settles it.
pub fn cancelable<T>() -> (CancelableFuture<T>, Settler<T>) {
    let (tx, _rx) = watch::channel(Settlement::Pending);
    let cell = Arc::new(tx);
    let signal = CancellationToken::new();
    (
        CancelableFuture {
            cell: Arc::clone(&cell),
            signal: signal.clone(),
        },
        Settler { cell, signal },
    )
}

/// Asynchronous result with explicit cancellation.
///
/// Await it directly (it implements [`IntoFuture`]) or call
/// [`result`](Self::result) to wait without consuming it.
pub struct CancelableFuture<T> {
    cell: Cell<T>,
    signal: CancellationToken,
}

impl<T> CancelableFuture<T> {
    /// A future that is already resolved.
    pub fn resolved(value: T) -> Self {
        let (future, settler) = cancelable();
        settler.resolve(value);
        future
    }

    /// A future that is already rejected.
    pub fn rejected(error: RequestError) -> Self {
        let (future, settler) = cancelable();
        settler.reject(error);
        future
    }

    /// Signal abort to the transport and reject with [`RequestError::Canceled`].
    ///
    /// Idempotent. Has no effect on the outcome once the future has settled.
    pub fn cancel(&self) {
        self.signal.cancel();
        if settle(&self.cell, Settlement::Rejected(RequestError::Canceled)) {
            debug!("Request canceled before it settled");
        }
    }

    pub fn is_settled(&self) -> bool {
        !self.cell.borrow().is_pending()
    }

    /// Abort signal shared with the transport.
    pub fn signal(&self) -> &CancellationToken {
        &self.signal
    }
}

impl<T: Clone> CancelableFuture<T> {
    /// Snapshot of the current state without waiting.
    pub fn peek(&self) -> Settlement<T> {
        self.cell.borrow().clone()
    }

    /// Wait for settlement.
    pub async fn result(&self) -> Result<T, RequestError> {
        let mut rx = self.cell.subscribe();
        let settled = match rx.wait_for(|s| !s.is_pending()).await {
            Ok(state) => (*state).clone(),
            Err(_) => return Err(RequestError::Abandoned),
        };
        match settled {
            Settlement::Resolved(value) => Ok(value),
            Settlement::Rejected(error) => Err(error),
            Settlement::Pending => Err(RequestError::Abandoned),
        }
    }
}

impl<T> Clone for CancelableFuture<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
            signal: self.signal.clone(),
        }
    }
}

impl<T> fmt::Debug for CancelableFuture<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelableFuture")
            .field("settled", &self.is_settled())
            .field("canceled", &self.signal.is_cancelled())
            .finish()
    }
}

impl<T> IntoFuture for CancelableFuture<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Output = Result<T, RequestError>;
    type IntoFuture = BoxFuture<'static, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move { self.result().await })
    }
}

/// Producer side of a [`CancelableFuture`].
///
/// Dropping a settler that never settled rejects with
/// [`RequestError::Abandoned`].
pub struct Settler<T> {
    cell: Cell<T>,
    signal: CancellationToken,
}

impl<T> Settler<T> {
    pub fn resolve(&self, value: T) -> bool {
        settle(&self.cell, Settlement::Resolved(value))
    }

    pub fn reject(&self, error: RequestError) -> bool {
        settle(&self.cell, Settlement::Rejected(error))
    }

    pub fn is_settled(&self) -> bool {
        !self.cell.borrow().is_pending()
    }

    pub fn signal(&self) -> &CancellationToken {
        &self.signal
    }
}

impl<T> Drop for Settler<T> {
    fn drop(&mut self) {
        settle(&self.cell, Settlement::Rejected(RequestError::Abandoned));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_resolve() {
        let (future, settler) = cancelable::<u32>();
        assert!(!future.is_settled());
        assert!(settler.resolve(7));
        assert_eq!(future.await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_first_settlement_wins() {
        let (future, settler) = cancelable::<u32>();
        assert!(settler.resolve(1));
        assert!(!settler.resolve(2));
        assert!(!settler.reject(RequestError::Abandoned));
        assert_eq!(future.result().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_cancel_after_resolve_keeps_value() {
        let (future, settler) = cancelable::<&'static str>();
        settler.resolve("done");
        future.cancel();
        assert_eq!(future.result().await.unwrap(), "done");
        // The abort signal still fires
        assert!(settler.signal().is_cancelled());
    }

    #[tokio::test]
    async fn test_cancel_before_settlement() {
        let (future, settler) = cancelable::<u32>();
        future.cancel();
        future.cancel();

        assert!(settler.signal().is_cancelled());
        assert!(future.is_settled());
        assert!(!settler.resolve(5));
        assert!(future.result().await.unwrap_err().is_canceled());
    }

    #[tokio::test]
    async fn test_dropped_settler_rejects() {
        let (future, settler) = cancelable::<u32>();
        drop(settler);
        assert!(matches!(future.await, Err(RequestError::Abandoned)));
    }

    #[tokio::test]
    async fn test_clones_share_outcome() {
        let (future, settler) = cancelable::<u32>();
        let other = future.clone();

        let waiter = tokio::spawn(async move { other.await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        settler.resolve(42);

        assert_eq!(waiter.await.unwrap().unwrap(), 42);
        assert!(matches!(future.peek(), Settlement::Resolved(42)));
    }

    #[tokio::test]
    async fn test_ready_constructors() {
        assert_eq!(CancelableFuture::resolved(3).await.unwrap(), 3);
        let rejected = CancelableFuture::<u32>::rejected(RequestError::Encode("x".into()));
        assert!(matches!(rejected.await, Err(RequestError::Encode(_))));
    }
}
