//! Cancellable request slots
//!
//! A [`TaskSlot`] runs at most one task at a time. Spawning a new task aborts
//! the previous one, and dropping the slot aborts whatever is still running,
//! so a slow response can never land after its owner has gone away.

use std::future::Future;
use tokio::task::{JoinError, JoinHandle};

/// Owner of at most one in-flight task
#[derive(Debug)]
pub struct TaskSlot<T> {
    handle: Option<JoinHandle<T>>,
}

impl<T> Default for TaskSlot<T> {
    fn default() -> Self {
        Self { handle: None }
    }
}

impl<T: Send + 'static> TaskSlot<T> {
    /// Create an empty slot
    pub fn new() -> Self {
        Self { handle: None }
    }

    /// Start `future`, aborting the task it replaces
    pub fn spawn<F>(&mut self, future: F)
    where
        F: Future<Output = T> + Send + 'static,
    {
        if self.cancel() {
            log::debug!("Superseded an in-flight request");
        }
        self.handle = Some(tokio::spawn(future));
    }

    /// Abort the running task. Returns whether one was still running.
    pub fn cancel(&mut self) -> bool {
        match self.handle.take() {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                true
            }
            _ => false,
        }
    }

    /// Whether a task is still running
    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Wait for the current task.
    ///
    /// Returns `None` when the slot is empty; a cancelled task yields a
    /// `JoinError`.
    pub async fn join(&mut self) -> Option<Result<T, JoinError>> {
        // Awaiting by reference keeps the task owned by the slot if this
        // future is dropped early.
        let handle = self.handle.as_mut()?;
        let result = handle.await;
        self.handle = None;
        Some(result)
    }
}

impl<T> Drop for TaskSlot<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_spawn_supersedes_previous_task() {
        let first_finished = Arc::new(AtomicBool::new(false));
        let mut slot = TaskSlot::new();

        slot.spawn({
            let first_finished = first_finished.clone();
            async move {
                tokio::time::sleep(Duration::from_millis(200)).await;
                first_finished.store(true, Ordering::SeqCst);
                1
            }
        });
        assert!(slot.is_running());

        slot.spawn(async { 2 });
        assert_eq!(slot.join().await.unwrap().unwrap(), 2);

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(!first_finished.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_drop_aborts_task() {
        let finished = Arc::new(AtomicBool::new(false));

        {
            let mut slot = TaskSlot::new();
            slot.spawn({
                let finished = finished.clone();
                async move {
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    finished.store(true, Ordering::SeqCst);
                }
            });
        }

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!finished.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_cancel_and_join() {
        let mut slot: TaskSlot<()> = TaskSlot::new();
        assert!(slot.join().await.is_none());
        assert!(!slot.cancel());

        slot.spawn(std::future::pending());
        assert!(slot.cancel());
        assert!(!slot.is_running());
    }
}
