//! Simulated responses for mocked calls.
//!
//! A mocked call never reaches the transport or the interceptors. It waits a
//! random delay within [`MOCK_DELAY_MS`] and resolves with whatever the
//! override function returns.

use crate::cancel::Settler;
use crate::template::Params;
use rand::Rng;
use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Bounds of the simulated latency, in milliseconds.
pub const MOCK_DELAY_MS: RangeInclusive<u64> = 50..=550;

/// Deterministic substitute for a real response.
pub type MockFn<T> = Arc<dyn Fn(Params) -> T + Send + Sync>;

pub fn mock_delay() -> Duration {
    Duration::from_millis(rand::thread_rng().gen_range(MOCK_DELAY_MS))
}

/// Resolve `settler` with `fake(params)` after a simulated delay.
///
/// Cancelling the future during the delay skips the override entirely.
pub(crate) fn spawn_mock<T>(settler: Settler<T>, fake: MockFn<T>, params: Params)
where
    T: Send + Sync + 'static,
{
    let delay = mock_delay();
    debug!("Mocking response in {}ms", delay.as_millis());

    tokio::spawn(async move {
        tokio::select! {
            biased;
            _ = settler.signal().cancelled() => {}
            _ = tokio::time::sleep(delay) => {
                settler.resolve(fake(params));
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::cancelable;
    use crate::error::RequestError;
    use serde_json::json;
    use std::time::Instant;

    #[test]
    fn test_mock_delay_in_range() {
        for _ in 0..100 {
            let delay = mock_delay().as_millis() as u64;
            assert!(MOCK_DELAY_MS.contains(&delay), "delay {delay} out of range");
        }
    }

    #[tokio::test]
    async fn test_spawn_mock_resolves_with_override() {
        let (future, settler) = cancelable::<serde_json::Value>();
        let mut params = Params::new();
        params.insert("id".into(), json!(3));

        let start = Instant::now();
        spawn_mock(settler, Arc::new(|p: Params| json!({"echo": p})), params);

        let value = future.await.unwrap();
        let elapsed = start.elapsed();
        assert_eq!(value, json!({"echo": {"id": 3}}));
        assert!(elapsed >= Duration::from_millis(50));
        assert!(elapsed < Duration::from_millis(1500));
    }

    #[tokio::test]
    async fn test_cancel_during_delay() {
        let (future, settler) = cancelable::<u32>();
        spawn_mock(settler, Arc::new(|_: Params| 1), Params::new());
        future.cancel();
        assert!(matches!(future.await, Err(RequestError::Canceled)));
    }
}
