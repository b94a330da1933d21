//! One-shot readiness signal for the host bridge
//!
//! The host announces itself either by an explicit notification or simply
//! by becoming visible, which a bounded poll detects. Both paths resolve the
//! same one-shot signal, consumed exactly once by [`ReadyWaiter::wait`].

use crate::error::{BridgeError, BridgeResult};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

/// How the bridge became ready
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyVia {
    /// The host sent the ready notification
    Event,
    /// The probe saw the host on a polling tick
    Poll,
}

/// Polling fallback settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Time between probes
    pub interval: Duration,
    /// Probes before giving up (at least one is always made)
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(50),
            max_attempts: 100,
        }
    }
}

/// Sending half: fires the signal; clones share it, first call wins
#[derive(Debug, Clone)]
pub struct ReadyNotifier {
    tx: Arc<Mutex<Option<oneshot::Sender<()>>>>,
}

impl ReadyNotifier {
    /// Fires the signal
    ///
    /// Returns true only for the call that actually fired it.
    pub fn notify(&self) -> bool {
        let sender = self
            .tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match sender {
            Some(tx) => tx.send(()).is_ok(),
            None => false,
        }
    }
}

/// Receiving half, consumed by waiting
#[derive(Debug)]
pub struct ReadyWaiter {
    rx: oneshot::Receiver<()>,
}

/// Creates a linked notifier/waiter pair
#[must_use]
pub fn readiness() -> (ReadyNotifier, ReadyWaiter) {
    let (tx, rx) = oneshot::channel();
    (
        ReadyNotifier {
            tx: Arc::new(Mutex::new(Some(tx))),
        },
        ReadyWaiter { rx },
    )
}

impl ReadyWaiter {
    /// Waits for the notification only
    pub async fn wait_event(self) -> BridgeResult<()> {
        self.rx.await.map_err(|_| BridgeError::Closed)
    }

    /// Waits for the notification, probing on every polling tick
    ///
    /// The first probe runs one interval after the call. Dropping every
    /// notifier does not end the wait; polling continues until the attempt
    /// budget is spent.
    pub async fn wait<F>(self, mut probe: F, policy: PollPolicy) -> BridgeResult<ReadyVia>
    where
        F: FnMut() -> bool,
    {
        let mut rx = self.rx;
        let mut notifier_gone = false;
        let max_attempts = policy.max_attempts.max(1);
        let mut attempts = 0;
        let mut ticker = interval_at(Instant::now() + policy.interval, policy.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                res = &mut rx, if !notifier_gone => {
                    if res.is_ok() {
                        debug!("host bridge ready (event)");
                        return Ok(ReadyVia::Event);
                    }
                    notifier_gone = true;
                }
                _ = ticker.tick() => {
                    attempts += 1;
                    if probe() {
                        debug!(attempts, "host bridge ready (poll)");
                        return Ok(ReadyVia::Poll);
                    }
                    if attempts >= max_attempts {
                        return Err(BridgeError::Timeout { attempts });
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_event_resolves() {
        let (notifier, waiter) = readiness();
        assert!(notifier.notify());
        let via = waiter.wait(|| false, PollPolicy::default()).await;
        assert_eq!(via, Ok(ReadyVia::Event));
    }

    #[tokio::test(start_paused = true)]
    async fn test_notify_fires_once() {
        let (notifier, _waiter) = readiness();
        let other = notifier.clone();
        assert!(notifier.notify());
        assert!(!other.notify());
        assert!(!notifier.notify());
    }

    #[tokio::test(start_paused = true)]
    async fn test_event_from_task() {
        let (notifier, waiter) = readiness();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(120)).await;
            notifier.notify();
        });
        let via = waiter.wait(|| false, PollPolicy::default()).await;
        assert_eq!(via, Ok(ReadyVia::Event));
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_fallback() {
        let (_notifier, waiter) = readiness();
        let probes = AtomicU32::new(0);
        let via = waiter
            .wait(
                || probes.fetch_add(1, Ordering::SeqCst) >= 2,
                PollPolicy::default(),
            )
            .await;
        assert_eq!(via, Ok(ReadyVia::Poll));
        assert_eq!(probes.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_after_budget() {
        let (_notifier, waiter) = readiness();
        let policy = PollPolicy {
            interval: Duration::from_millis(10),
            max_attempts: 5,
        };
        let err = waiter.wait(|| false, policy).await.unwrap_err();
        assert_eq!(err, BridgeError::Timeout { attempts: 5 });
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_notifier_keeps_polling() {
        let (notifier, waiter) = readiness();
        drop(notifier);
        let policy = PollPolicy {
            interval: Duration::from_millis(10),
            max_attempts: 3,
        };
        let err = waiter.wait(|| false, policy).await.unwrap_err();
        assert_eq!(err, BridgeError::Timeout { attempts: 3 });
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_attempts_still_probes_once() {
        let (_notifier, waiter) = readiness();
        let policy = PollPolicy {
            interval: Duration::from_millis(10),
            max_attempts: 0,
        };
        assert_eq!(waiter.wait(|| true, policy).await, Ok(ReadyVia::Poll));
    }

    #[tokio::test]
    async fn test_wait_event_closed() {
        let (notifier, waiter) = readiness();
        drop(notifier);
        assert_eq!(waiter.wait_event().await, Err(BridgeError::Closed));
    }

    #[tokio::test]
    async fn test_wait_event_ok() {
        let (notifier, waiter) = readiness();
        notifier.notify();
        assert_eq!(waiter.wait_event().await, Ok(()));
    }
}
