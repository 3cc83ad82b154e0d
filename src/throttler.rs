//! Converts an arbitrarily fast stream of calls into a stream of dispatches
//! separated by at least a minimum interval, keeping only the most recent
//! suppressed call (trailing-edge throttling with single-slot coalescing).
use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::debug;

use crate::errors::CheckError;
use crate::freshness::{Stamp, Token};

/// Wraps a dispatch function behind a minimum interval.
///
/// The first call after construction, or after a cooling window has elapsed
/// with nothing pending, runs the dispatch function immediately, before
/// `invoke` returns. Calls arriving while the window is open overwrite a
/// single pending slot (last write wins) and mark the outstanding dispatch
/// as superseded through the shared [`Token`]. When the window expires with
/// a pending payload, that payload is dispatched and the window re-arms;
/// otherwise the window closes and the next call is immediate again.
///
/// The dispatch function is expected to start its asynchronous work and
/// return; the throttler never awaits it. The internal mutex is only held
/// across synchronous state transitions, so the dispatch function may call
/// `invoke` again from its completion path without deadlocking.
pub struct Throttler<T> {
    inner: Arc<Inner<T>>,
}

struct Inner<T> {
    interval: Duration,
    token: Token,
    dispatch: Box<dyn Fn(Stamp, T) + Send + Sync>,
    state: Mutex<State<T>>,
}

struct State<T> {
    cooling: bool,
    pending: Option<T>,
}

impl<T> Clone for Throttler<T> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<T: Send + 'static> Throttler<T> {
    pub fn new<F>(interval: Duration, dispatch: F) -> Result<Self, CheckError>
    where
        F: Fn(Stamp, T) + Send + Sync + 'static,
    {
        if interval.is_zero() {
            return Err(CheckError::BadInterval);
        }
        Ok(Self {
            inner: Arc::new(Inner {
                interval,
                token: Token::new(),
                dispatch: Box::new(dispatch),
                state: Mutex::new(State { cooling: false, pending: None }),
            }),
        })
    }

    /// Handles one call: dispatches it immediately when idle, or coalesces
    /// it into the pending slot while a cooling window is open.
    ///
    /// Must be called from within a tokio runtime, as an immediate dispatch
    /// spawns the timer task that keeps the window open.
    pub fn invoke(&self, payload: T) {
        let stamp = {
            let mut state = self.inner.state.lock().unwrap();
            if state.cooling {
                if state.pending.replace(payload).is_some() {
                    debug!("coalesced a call that was still pending");
                }
                // The outstanding dispatch is no longer the latest word
                self.inner.token.supersede();
                return;
            }
            state.cooling = true;
            self.inner.token.stamp()
        };
        (self.inner.dispatch)(stamp, payload);
        self.hold();
    }

    /// Keeps the cooling window open: at each expiry, the latest buffered
    /// call (if any) is dispatched and the window re-arms; a window that
    /// elapses with nothing pending closes for good.
    fn hold(&self) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(inner.interval).await;
                // The stamp must be captured in the same critical section as
                // the slot is emptied, or a call racing with the expiry could
                // leave an older payload holding a fresh stamp
                let dispatched = {
                    let mut state = inner.state.lock().unwrap();
                    match state.pending.take() {
                        Some(payload) => Some((inner.token.stamp(), payload)),
                        None => {
                            state.cooling = false;
                            None
                        }
                    }
                };
                match dispatched {
                    Some((stamp, payload)) => {
                        debug!("window expired with a pending call, dispatching it");
                        (inner.dispatch)(stamp, payload);
                    }
                    None => {
                        debug!("window closed");
                        break;
                    }
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use tokio::time::Instant;

    use super::*;

    const INTERVAL: Duration = Duration::from_secs(3);

    /// A throttler that records every dispatched payload
    fn recording() -> (Throttler<&'static str>, Arc<Mutex<Vec<&'static str>>>) {
        let log = Arc::new(Mutex::new(vec![]));
        let sink = Arc::clone(&log);
        let throttler = Throttler::new(INTERVAL, move |_stamp, payload| {
            sink.lock().unwrap().push(payload);
        })
        .unwrap();
        (throttler, log)
    }

    #[test]
    fn zero_interval_is_rejected() {
        let result = Throttler::new(Duration::ZERO, |_stamp, _payload: ()| {});
        assert!(matches!(result, Err(CheckError::BadInterval)));
    }

    #[tokio::test(start_paused = true)]
    async fn first_call_is_dispatched_before_invoke_returns() {
        let (throttler, log) = recording();
        throttler.invoke("a");
        assert_eq!(*log.lock().unwrap(), vec!["a"]);
    }

    #[tokio::test(start_paused = true)]
    async fn burst_keeps_only_the_first_and_last_call() {
        let (throttler, log) = recording();
        throttler.invoke("k1");
        throttler.invoke("k2");
        throttler.invoke("k3");
        tokio::time::sleep(INTERVAL + Duration::from_millis(1)).await;
        assert_eq!(*log.lock().unwrap(), vec!["k1", "k3"]);
    }

    #[tokio::test(start_paused = true)]
    async fn window_closes_after_an_idle_interval() {
        let (throttler, log) = recording();
        throttler.invoke("a");
        tokio::time::sleep(INTERVAL + Duration::from_millis(1)).await;
        // The window elapsed with nothing pending; this call is immediate
        throttler.invoke("b");
        assert_eq!(*log.lock().unwrap(), vec!["a", "b"]);
    }

    #[tokio::test(start_paused = true)]
    async fn continuous_activity_keeps_redispatching_at_each_boundary() {
        let (throttler, log) = recording();
        throttler.invoke("a");
        for payload in ["b", "c", "d"] {
            // One call per window, each should survive to its own boundary
            tokio::time::sleep(Duration::from_millis(10)).await;
            throttler.invoke(payload);
            tokio::time::sleep(INTERVAL).await;
        }
        assert_eq!(*log.lock().unwrap(), vec!["a", "b", "c", "d"]);
    }

    #[tokio::test(start_paused = true)]
    async fn dispatches_are_separated_by_at_least_the_interval() {
        let times = Arc::new(Mutex::new(vec![]));
        let sink = Arc::clone(&times);
        let throttler = Throttler::new(INTERVAL, move |_stamp, _payload: u32| {
            sink.lock().unwrap().push(Instant::now());
        })
        .unwrap();
        throttler.invoke(1);
        tokio::time::sleep(Duration::from_millis(5)).await;
        throttler.invoke(2);
        tokio::time::sleep(INTERVAL * 2).await;
        let times = times.lock().unwrap();
        assert_eq!(times.len(), 2);
        assert!(times[1] - times[0] >= INTERVAL);
    }

    #[tokio::test(start_paused = true)]
    async fn buffered_calls_supersede_the_outstanding_dispatch() {
        let stamps = Arc::new(Mutex::new(vec![]));
        let sink = Arc::clone(&stamps);
        let throttler = Throttler::new(INTERVAL, move |stamp, _payload: &str| {
            sink.lock().unwrap().push(stamp);
        })
        .unwrap();
        throttler.invoke("old");
        throttler.invoke("new");
        tokio::time::sleep(INTERVAL + Duration::from_millis(1)).await;
        let stamps = stamps.lock().unwrap();
        assert_eq!(stamps.len(), 2);
        assert!(stamps[0].superseded(), "the first dispatch was overtaken");
        assert!(!stamps[1].superseded(), "the trailing dispatch is current");
    }

    #[tokio::test(start_paused = true)]
    async fn a_new_window_supersedes_dispatches_from_the_previous_one() {
        let stamps = Arc::new(Mutex::new(vec![]));
        let sink = Arc::clone(&stamps);
        let throttler = Throttler::new(INTERVAL, move |stamp, _payload: &str| {
            sink.lock().unwrap().push(stamp);
        })
        .unwrap();
        throttler.invoke("old");
        // The window closes idle; "old" may still be in flight at this point
        tokio::time::sleep(INTERVAL + Duration::from_millis(1)).await;
        throttler.invoke("new");
        let stamps = stamps.lock().unwrap();
        assert_eq!(stamps.len(), 2);
        assert!(stamps[0].superseded(), "the earlier dispatch lost authority");
        assert!(!stamps[1].superseded(), "the new dispatch has the last word");
    }

    #[tokio::test(start_paused = true)]
    async fn reentrant_invoke_from_the_dispatch_path_is_coalesced() {
        let log: Arc<Mutex<Vec<u32>>> = Arc::new(Mutex::new(vec![]));
        let slot: Arc<Mutex<Option<Throttler<u32>>>> = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&log);
        let reentry = Arc::clone(&slot);
        let throttler = Throttler::new(INTERVAL, move |_stamp, payload: u32| {
            sink.lock().unwrap().push(payload);
            if payload < 10 {
                let throttler = reentry.lock().unwrap().clone().unwrap();
                throttler.invoke(payload + 1);
            }
        })
        .unwrap();
        *slot.lock().unwrap() = Some(throttler.clone());
        throttler.invoke(1);
        // 1 runs immediately and re-submits 2, which must wait for the boundary
        assert_eq!(*log.lock().unwrap(), vec![1]);
        tokio::time::sleep(INTERVAL + Duration::from_millis(1)).await;
        assert_eq!(*log.lock().unwrap(), vec![1, 2]);
    }
}
