//! Background maintenance task shared by the time-aware structures.
//!
//! TTL caches, sliding buffers, timed buffers and the leaky bucket all run a periodic job
//! against their own state: expiring entries, compacting windows, draining queued
//! requests. The job runs as a task on the ambient tokio runtime and holds only a weak
//! reference to the state it maintains, so dropping the structure ends the task even if
//! the [`Sweeper`] handle leaks.
//!
//! Foreground operations never depend on a sweep having run. When a structure is built
//! outside a tokio runtime no task is spawned and the structure simply relies on its
//! read-path freshness checks.

use std::sync::Weak;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, trace};

/// Shortest interval a sweeper will tick at.
pub const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(1);

/// Longest interval a sweeper will tick at.
pub const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Handle to a running background sweep.
///
/// The task stops when this handle is dropped.
#[derive(Debug)]
pub struct Sweeper {
    name: &'static str,
    interval: Duration,
    shutdown_tx: watch::Sender<bool>,
}

impl Sweeper {
    /// Spawn a periodic job against `target`.
    ///
    /// Returns `None` when called outside a tokio runtime.
    pub(crate) fn spawn<S, F>(
        name: &'static str,
        interval: Duration,
        target: Weak<S>,
        job: F,
    ) -> Option<Self>
    where
        S: Send + Sync + 'static,
        F: Fn(&S) + Send + 'static,
    {
        let Ok(handle) = Handle::try_current() else {
            debug!(sweeper = name, "No tokio runtime, background sweep disabled");
            return None;
        };

        let interval = interval.clamp(MIN_SWEEP_INTERVAL, MAX_SWEEP_INTERVAL);
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        handle.spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let Some(state) = target.upgrade() else {
                            trace!(sweeper = name, "Target dropped");
                            break;
                        };
                        job(&state);
                    }
                    result = shutdown_rx.changed() => {
                        if result.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }

            debug!(sweeper = name, "Background sweep stopped");
        });

        debug!(sweeper = name, interval_ms = interval.as_millis() as u64, "Background sweep started");

        Some(Self {
            name,
            interval,
            shutdown_tx,
        })
    }

    /// Name of the structure this sweeper maintains.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Tick interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Signal the task to stop.
    ///
    /// Called automatically on drop.
    pub fn stop(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_no_runtime_returns_none() {
        let state = Arc::new(AtomicUsize::new(0));
        let sweeper = Sweeper::spawn("test", Duration::from_millis(5), Arc::downgrade(&state), |s| {
            s.fetch_add(1, Ordering::Relaxed);
        });
        assert!(sweeper.is_none());
    }

    #[tokio::test]
    async fn test_sweeper_ticks() {
        let state = Arc::new(AtomicUsize::new(0));
        let sweeper = Sweeper::spawn("test", Duration::from_millis(5), Arc::downgrade(&state), |s| {
            s.fetch_add(1, Ordering::Relaxed);
        })
        .unwrap();

        assert_eq!(sweeper.name(), "test");
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(state.load(Ordering::Relaxed) >= 2);
    }

    #[tokio::test]
    async fn test_sweeper_stops_on_drop() {
        let state = Arc::new(AtomicUsize::new(0));
        let sweeper = Sweeper::spawn("test", Duration::from_millis(5), Arc::downgrade(&state), |s| {
            s.fetch_add(1, Ordering::Relaxed);
        })
        .unwrap();

        tokio::time::sleep(Duration::from_millis(30)).await;
        drop(sweeper);
        tokio::time::sleep(Duration::from_millis(10)).await;

        let seen = state.load(Ordering::Relaxed);
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(state.load(Ordering::Relaxed), seen);
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        let _guard = rt.enter();

        let state = Arc::new(AtomicUsize::new(0));
        let sweeper = Sweeper::spawn("test", Duration::ZERO, Arc::downgrade(&state), |_| {}).unwrap();
        assert_eq!(sweeper.interval(), MIN_SWEEP_INTERVAL);

        let sweeper = Sweeper::spawn("test", Duration::MAX, Arc::downgrade(&state), |_| {}).unwrap();
        assert_eq!(sweeper.interval(), MAX_SWEEP_INTERVAL);
    }
}
