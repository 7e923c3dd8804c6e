//! Debounce and throttle wrappers for UI-driven callbacks (search boxes,
//! scroll handlers, filter changes).

use std::sync::Arc;
use std::time::Duration;

use campaign_core::config::TimingConfig;
use campaign_core::CampaignResult;
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

type Callback<A> = Arc<dyn Fn(A) + Send + Sync>;

struct DebounceState<A> {
    callback: Callback<A>,
    wait: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

/// Runs the callback once `wait` has elapsed with no further calls, using
/// the arguments of the most recent call.
pub struct Debouncer<A> {
    state: Arc<DebounceState<A>>,
    runtime: Handle,
}

impl<A: Send + 'static> Debouncer<A> {
    /// Must be created inside a Tokio runtime; the timer tasks run on it.
    pub fn new<F>(wait: Duration, callback: F) -> CampaignResult<Self>
    where
        F: Fn(A) + Send + Sync + 'static,
    {
        let runtime = Handle::try_current()
            .map_err(|e| anyhow::anyhow!("debouncer needs a tokio runtime: {e}"))?;
        Ok(Self {
            state: Arc::new(DebounceState {
                callback: Arc::new(callback),
                wait,
                pending: Mutex::new(None),
            }),
            runtime,
        })
    }

    /// Debouncer using `timing.debounce_ms`.
    pub fn from_config<F>(config: &TimingConfig, callback: F) -> CampaignResult<Self>
    where
        F: Fn(A) + Send + Sync + 'static,
    {
        Self::new(Duration::from_millis(config.debounce_ms), callback)
    }

    /// Restart the timer with `args`; any pending invocation is dropped.
    pub fn call(&self, args: A) {
        let mut pending = self.state.pending.lock();
        if let Some(previous) = pending.take() {
            previous.abort();
        }

        let callback = Arc::clone(&self.state.callback);
        let wait = self.state.wait;
        *pending = Some(self.runtime.spawn(async move {
            tokio::time::sleep(wait).await;
            debug!(wait_ms = wait.as_millis() as u64, "Debounced call fired");
            metrics::counter!("web_sdk.debounce_fired").increment(1);
            callback(args);
        }));
    }

    pub fn cancel(&self) {
        if let Some(previous) = self.state.pending.lock().take() {
            previous.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.state
            .pending
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl<A> Drop for Debouncer<A> {
    fn drop(&mut self) {
        if let Some(previous) = self.state.pending.lock().take() {
            previous.abort();
        }
    }
}

/// Leading-edge throttle: runs the callback immediately, then ignores
/// calls until `limit` has elapsed since the last run.
pub struct Throttler<A> {
    callback: Callback<A>,
    limit: Duration,
    last_run: Mutex<Option<Instant>>,
}

impl<A> Throttler<A> {
    pub fn new<F>(limit: Duration, callback: F) -> Self
    where
        F: Fn(A) + Send + Sync + 'static,
    {
        Self {
            callback: Arc::new(callback),
            limit,
            last_run: Mutex::new(None),
        }
    }

    pub fn from_config<F>(config: &TimingConfig, callback: F) -> Self
    where
        F: Fn(A) + Send + Sync + 'static,
    {
        Self::new(Duration::from_millis(config.throttle_ms), callback)
    }

    /// Returns `true` when the callback ran.
    pub fn call(&self, args: A) -> bool {
        let now = Instant::now();
        {
            let mut last_run = self.last_run.lock();
            if let Some(last) = *last_run {
                if now.duration_since(last) < self.limit {
                    debug!("Throttled call dropped");
                    metrics::counter!("web_sdk.throttle_dropped").increment(1);
                    return false;
                }
            }
            *last_run = Some(now);
        }
        (self.callback)(args);
        true
    }

    pub fn reset(&self) {
        *self.last_run.lock() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campaign_core::CampaignError;

    fn recorder() -> (Arc<Mutex<Vec<u32>>>, impl Fn(u32) + Send + Sync + 'static) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&calls);
        (calls, move |v| sink.lock().push(v))
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_collapses_burst() {
        let (calls, callback) = recorder();
        let debouncer = Debouncer::new(Duration::from_millis(100), callback).unwrap();

        debouncer.call(1);
        tokio::time::sleep(Duration::from_millis(20)).await;
        debouncer.call(2);
        tokio::time::sleep(Duration::from_millis(20)).await;
        debouncer.call(3);
        assert!(debouncer.is_pending());
        assert!(calls.lock().is_empty());

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(*calls.lock(), vec![3]);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_separate_bursts_fire_separately() {
        let (calls, callback) = recorder();
        let debouncer = Debouncer::new(Duration::from_millis(100), callback).unwrap();

        debouncer.call(1);
        tokio::time::sleep(Duration::from_millis(150)).await;
        debouncer.call(2);
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(*calls.lock(), vec![1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_cancel() {
        let (calls, callback) = recorder();
        let debouncer = Debouncer::new(Duration::from_millis(100), callback).unwrap();

        debouncer.call(1);
        debouncer.cancel();
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(calls.lock().is_empty());
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_debouncer_requires_runtime() {
        let err = Debouncer::new(Duration::from_millis(10), |_: u32| {}).err();
        assert!(matches!(err, Some(CampaignError::Internal(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_throttle_drops_calls_inside_window() {
        let (calls, callback) = recorder();
        let throttler = Throttler::new(Duration::from_millis(100), callback);

        assert!(throttler.call(1));
        assert!(!throttler.call(2));
        assert!(!throttler.call(3));
        assert_eq!(*calls.lock(), vec![1]);

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(throttler.call(4));
        assert_eq!(*calls.lock(), vec![1, 4]);

        // The window restarts at the call that ran.
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!throttler.call(5));
        assert_eq!(*calls.lock(), vec![1, 4]);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(throttler.call(6));
        assert_eq!(*calls.lock(), vec![1, 4, 6]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_from_config_uses_configured_waits() {
        let config = TimingConfig {
            debounce_ms: 50,
            throttle_ms: 500,
        };
        let (calls, callback) = recorder();
        let debouncer = Debouncer::from_config(&config, callback).unwrap();
        debouncer.call(7);
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(*calls.lock(), vec![7]);

        let (calls, callback) = recorder();
        let throttler = Throttler::from_config(&config, callback);
        assert!(throttler.call(1));
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!throttler.call(2));
        assert_eq!(*calls.lock(), vec![1]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_throttle_reset() {
        let (calls, callback) = recorder();
        let throttler = Throttler::new(Duration::from_millis(100), callback);

        assert!(throttler.call(1));
        throttler.reset();
        assert!(throttler.call(2));
        assert_eq!(*calls.lock(), vec![1, 2]);
    }
}
