//! Cancelable debounce timer
//!
//! A single-slot timer keyed on the value captured at arm time. Re-arming
//! aborts the pending task and restarts the window (last value wins);
//! cancelling or dropping the timer aborts it so nothing fires into a
//! torn-down flow.

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

pub struct DebounceTimer<K> {
    delay: Duration,
    armed: Option<(K, JoinHandle<()>)>,
}

impl<K> DebounceTimer<K>
where
    K: Clone + Send + 'static,
{
    pub fn new(delay: Duration) -> Self {
        Self { delay, armed: None }
    }

    /// (Re)start the window for `key`
    ///
    /// `on_fire` runs with the armed key once the delay elapses without
    /// another `arm` or `cancel`. Must be called within a tokio runtime.
    pub fn arm<F, Fut>(&mut self, key: K, on_fire: F)
    where
        F: FnOnce(K) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if self.cancel() {
            debug!("Debounce window restarted");
        }

        let delay = self.delay;
        let fired = key.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            on_fire(fired).await;
        });

        self.armed = Some((key, handle));
    }

    /// Abort the pending window; returns whether one was still pending
    pub fn cancel(&mut self) -> bool {
        match self.armed.take() {
            Some((_, handle)) => {
                let pending = !handle.is_finished();
                handle.abort();
                pending
            }
            None => false,
        }
    }

    /// Forget the armed key without aborting
    ///
    /// Called from the fire callback itself, where aborting would cancel the
    /// running callback.
    pub(crate) fn disarm(&mut self) -> Option<K> {
        self.armed.take().map(|(key, _)| key)
    }

    pub fn is_pending(&self) -> bool {
        self.armed
            .as_ref()
            .map(|(_, handle)| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Key captured when the timer was last armed
    pub fn armed_key(&self) -> Option<&K> {
        self.armed.as_ref().map(|(key, _)| key)
    }
}

impl<K> Drop for DebounceTimer<K> {
    fn drop(&mut self) {
        if let Some((_, handle)) = self.armed.take() {
            handle.abort();
        }
    }
}
