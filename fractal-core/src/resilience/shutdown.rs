//! A shutdown flag observed cooperatively by every pipeline stage between
//! operations (`spec.md` §5). SIGINT/SIGTERM wire into `shutdown()`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Clone)]
pub struct ShutdownSignal {
    running: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self { running: Arc::new(AtomicBool::new(true)), notify: Arc::new(Notify::new()) }
    }

    pub fn is_shutting_down(&self) -> bool {
        !self.running.load(Ordering::Acquire)
    }

    /// Flip to shutting-down and wake every stage currently waiting on
    /// `notified()`.
    pub fn shutdown(&self) {
        self.running.store(false, Ordering::Release);
        self.notify.notify_waiters();
    }

    /// Resolves once `shutdown()` has been called, for use in
    /// `tokio::select!` alongside a stage's normal receive.
    pub async fn notified(&self) {
        self.notify.notified().await
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_running() {
        let signal = ShutdownSignal::new();
        assert!(!signal.is_shutting_down());
    }

    #[test]
    fn shutdown_flips_flag() {
        let signal = ShutdownSignal::new();
        signal.shutdown();
        assert!(signal.is_shutting_down());
    }

    #[tokio::test]
    async fn notified_resolves_after_shutdown() {
        let signal = ShutdownSignal::new();
        let waiter = signal.clone();
        let handle = tokio::spawn(async move {
            waiter.notified().await;
        });
        tokio::task::yield_now().await;
        signal.shutdown();
        handle.await.unwrap();
    }
}
