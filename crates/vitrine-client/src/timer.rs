//! Cancelable one-shot timers.
//!
//! Every delayed action of the gallery (search debounce, load-more cooldown,
//! scroll-trigger delay, scroll restoration) goes through a
//! [`ScheduledTask`] slot owned by the component that scheduled it. A slot
//! holds at most one pending task: scheduling again replaces it, and dropping
//! the slot aborts whatever is still pending.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;

#[derive(Debug, Default)]
pub struct ScheduledTask {
    pending: Option<JoinHandle<()>>,
}

impl ScheduledTask {
    pub fn new() -> Self {
        Self { pending: None }
    }

    /// Run `action` after `delay`, cancelling any previously scheduled one.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&mut self, delay: Duration, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            action.await;
        }));
    }

    /// Abort the pending task. Returns `true` if one was still waiting.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn fires_after_delay() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut task = ScheduledTask::new();

        let h = hits.clone();
        task.schedule(Duration::from_millis(100), async move {
            h.fetch_add(1, Ordering::SeqCst);
        });
        assert!(task.is_pending());

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(!task.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn rescheduling_replaces_the_pending_task() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut task = ScheduledTask::new();

        for _ in 0..5 {
            let h = hits.clone();
            task.schedule(Duration::from_millis(100), async move {
                h.fetch_add(1, Ordering::SeqCst);
            });
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_cancels() {
        let hits = Arc::new(AtomicUsize::new(0));
        {
            let mut task = ScheduledTask::new();
            let h = hits.clone();
            task.schedule(Duration::from_millis(10), async move {
                h.fetch_add(1, Ordering::SeqCst);
            });
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }
}
