//! Connectivity monitor: tracks binary network reachability and notifies
//! subscribers once per transition edge.
//!
//! Reachability reports come in through `set_online` (the platform
//! adapter's job); subscribers get a callback on each change, never on
//! no-op re-reports. Subscriptions follow a scoped acquisition/release
//! pattern: dropping the returned watch guarantees no further callbacks.

use log::{debug, info};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Edge-triggered observer over the device's online/offline state.
pub struct ConnectivityMonitor {
    state_tx: watch::Sender<bool>,
}

impl ConnectivityMonitor {
    /// Creates a monitor seeded with the sampled platform state. The
    /// initial state is taken from the caller, never assumed online.
    pub fn new(initial_online: bool) -> Self {
        let (state_tx, _) = watch::channel(initial_online);
        Self { state_tx }
    }

    /// Reports the current reachability. Re-reporting the same state is a
    /// no-op and wakes no subscriber.
    pub fn set_online(&self, online: bool) {
        let changed = self.state_tx.send_if_modified(|state| {
            if *state != online {
                *state = online;
                true
            } else {
                false
            }
        });
        if changed {
            info!(
                "Connectivity changed: {}",
                if online { "online" } else { "offline" }
            );
        }
    }

    /// Current reachability as last reported.
    pub fn is_online(&self) -> bool {
        *self.state_tx.borrow()
    }

    /// Registers `callback` to run once per transition edge. The current
    /// state is sampled at registration so the first invocation is a real
    /// edge relative to it. Callbacks stop when the returned watch is
    /// stopped or dropped.
    pub fn subscribe<F>(&self, callback: F) -> ConnectivityWatch
    where
        F: Fn(bool) + Send + 'static,
    {
        let mut rx = self.state_tx.subscribe();
        // Baseline for edge detection; also marks the value as seen.
        let mut last = *rx.borrow_and_update();
        debug!("Connectivity subscription registered (online={})", last);

        let task = tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let online = *rx.borrow_and_update();
                if online != last {
                    last = online;
                    callback(online);
                }
            }
            debug!("Connectivity subscription task stopped");
        });

        ConnectivityWatch { task }
    }
}

/// Handle owning a connectivity subscription. Dropping it deregisters the
/// callback; no invocations fire afterward.
pub struct ConnectivityWatch {
    task: JoinHandle<()>,
}

impl ConnectivityWatch {
    /// Explicitly deregisters the subscription.
    pub fn stop(self) {
        // Drop runs the abort.
    }
}

impl Drop for ConnectivityWatch {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use super::*;

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn callback_fires_once_per_edge() {
        let monitor = ConnectivityMonitor::new(true);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let watch = monitor.subscribe(move |online| sink.lock().unwrap().push(online));

        monitor.set_online(true); // no-op re-report
        monitor.set_online(false);
        settle().await;
        monitor.set_online(true);
        settle().await;

        assert_eq!(*seen.lock().unwrap(), vec![false, true]);
        watch.stop();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn initial_state_is_sampled_not_assumed() {
        let monitor = ConnectivityMonitor::new(false);
        assert!(!monitor.is_online());

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _watch = monitor.subscribe(move |online| sink.lock().unwrap().push(online));

        // Re-reporting the sampled state is not a transition.
        monitor.set_online(false);
        settle().await;
        assert!(seen.lock().unwrap().is_empty());

        monitor.set_online(true);
        settle().await;
        assert_eq!(*seen.lock().unwrap(), vec![true]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn no_callbacks_after_stop() {
        let monitor = ConnectivityMonitor::new(true);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let watch = monitor.subscribe(move |online| sink.lock().unwrap().push(online));

        watch.stop();
        settle().await;

        monitor.set_online(false);
        settle().await;
        assert!(seen.lock().unwrap().is_empty());
    }
}
