//! Bounded FIFO of pending discovery URLs
//!
//! The queue is shared by a fixed number of consumers which both pop URLs and
//! push the links they find. It supports:
//! - `pop` that waits while the queue is empty
//! - `push` that waits while the queue is full
//! - an idempotent `abort` that cancels every current and future wait
//!
//! When every consumer is waiting in `pop` on an empty queue nobody is left to
//! push, so the queue aborts itself.

use parking_lot::Mutex;
use std::collections::VecDeque;
use thiserror::Error;
use tokio::sync::Notify;

/// Returned by queue operations once the queue has been aborted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("URL queue cancelled")]
pub struct QueueCancelled;

#[derive(Debug, Default)]
struct QueueState {
    items: VecDeque<String>,
    idle_consumers: usize,
    blocked_pushers: usize,
    aborted: bool,
}

/// Bounded multi-consumer URL queue with cancellation
///
/// Waiting tasks park on a single [`Notify`]; every state change wakes all of
/// them and each rechecks the state under the lock. A pending `pop` or `push`
/// future must be driven to completion, not dropped.
#[derive(Debug)]
pub struct UrlQueue {
    state: Mutex<QueueState>,
    changed: Notify,
    capacity: usize,
    consumers: usize,
}

impl UrlQueue {
    /// Creates a queue holding at most `capacity` URLs for `consumers` workers
    ///
    /// Both values are raised to at least one.
    pub fn new(capacity: usize, consumers: usize) -> Self {
        Self {
            state: Mutex::new(QueueState::default()),
            changed: Notify::new(),
            capacity: capacity.max(1),
            consumers: consumers.max(1),
        }
    }

    /// Takes the oldest URL, waiting while the queue is empty
    ///
    /// Returns [`QueueCancelled`] once the queue is aborted, including when the
    /// calling consumer is the last one to go idle on an empty queue.
    pub async fn pop(&self) -> Result<String, QueueCancelled> {
        let mut idle = false;

        loop {
            let notified = self.changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = self.state.lock();
                if state.aborted {
                    if idle {
                        state.idle_consumers -= 1;
                    }
                    return Err(QueueCancelled);
                }

                if let Some(url) = state.items.pop_front() {
                    if idle {
                        state.idle_consumers -= 1;
                    }
                    drop(state);
                    // Wake pushers waiting for space
                    self.changed.notify_waiters();
                    return Ok(url);
                }

                if !idle {
                    state.idle_consumers += 1;
                    idle = true;
                }

                if state.idle_consumers >= self.consumers {
                    state.idle_consumers -= 1;
                    state.aborted = true;
                    drop(state);
                    tracing::debug!("URL queue exhausted with every consumer idle");
                    self.changed.notify_waiters();
                    return Err(QueueCancelled);
                }
            }

            notified.await;
        }
    }

    /// Appends a URL, waiting while the queue is full
    ///
    /// If waiting would leave every consumer blocked in `push`, the URL is
    /// admitted over capacity instead. Returns [`QueueCancelled`] if the queue
    /// has been aborted; the URL is then dropped.
    pub async fn push(&self, url: String) -> Result<(), QueueCancelled> {
        let mut blocked = false;

        loop {
            let notified = self.changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = self.state.lock();
                if state.aborted {
                    if blocked {
                        state.blocked_pushers -= 1;
                    }
                    return Err(QueueCancelled);
                }

                let others_blocked = state.blocked_pushers - usize::from(blocked);
                let stalled = others_blocked + 1 >= self.consumers;

                if state.items.len() < self.capacity || stalled {
                    if blocked {
                        state.blocked_pushers -= 1;
                    }
                    state.items.push_back(url);
                    drop(state);
                    self.changed.notify_waiters();
                    return Ok(());
                }

                if !blocked {
                    state.blocked_pushers += 1;
                    blocked = true;
                }
            }

            notified.await;
        }
    }

    /// Cancels the queue, waking every waiting task
    ///
    /// Safe to call any number of times from any task. Returns true only for
    /// the call that actually aborted the queue.
    pub fn abort(&self) -> bool {
        let first = {
            let mut state = self.state.lock();
            !std::mem::replace(&mut state.aborted, true)
        };
        self.changed.notify_waiters();
        first
    }

    pub fn is_aborted(&self) -> bool {
        self.state.lock().aborted
    }

    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_fifo_order() {
        let queue = UrlQueue::new(8, 2);
        for url in ["a", "b", "c"] {
            queue.push(url.to_string()).await.unwrap();
        }

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.pop().await.unwrap(), "a");
        assert_eq!(queue.pop().await.unwrap(), "b");
        assert_eq!(queue.pop().await.unwrap(), "c");
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn test_abort_unblocks_waiting_pop() {
        let queue = Arc::new(UrlQueue::new(8, 4));

        let waiter = {
            let queue = Arc::clone(&queue);
            tokio::spawn(async move { queue.pop().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        assert!(queue.abort());
        assert_eq!(waiter.await.unwrap(), Err(QueueCancelled));
    }

    #[tokio::test]
    async fn test_abort_is_idempotent() {
        let queue = UrlQueue::new(8, 2);
        assert!(queue.abort());
        assert!(!queue.abort());
        assert!(!queue.abort());
        assert!(queue.is_aborted());
    }

    #[tokio::test]
    async fn test_operations_after_abort_are_cancelled() {
        let queue = UrlQueue::new(8, 2);
        queue.push("a".to_string()).await.unwrap();
        queue.abort();

        assert_eq!(queue.pop().await, Err(QueueCancelled));
        assert_eq!(queue.push("b".to_string()).await, Err(QueueCancelled));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_abort_calls() {
        let queue = Arc::new(UrlQueue::new(8, 8));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let queue = Arc::clone(&queue);
            handles.push(tokio::spawn(async move { queue.abort() }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn test_waiting_pop_receives_push() {
        let queue = Arc::new(UrlQueue::new(8, 2));

        let waiter = {
            let queue = Arc::clone(&queue);
            tokio::spawn(async move { queue.pop().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        queue.push("late".to_string()).await.unwrap();
        assert_eq!(waiter.await.unwrap().unwrap(), "late");
        assert!(!queue.is_aborted());
    }

    #[tokio::test]
    async fn test_single_consumer_exhaustion() {
        let queue = UrlQueue::new(8, 1);
        assert_eq!(queue.pop().await, Err(QueueCancelled));
        assert!(queue.is_aborted());
    }

    #[tokio::test]
    async fn test_exhaustion_when_all_consumers_idle() {
        let queue = Arc::new(UrlQueue::new(8, 2));

        let first = {
            let queue = Arc::clone(&queue);
            tokio::spawn(async move { queue.pop().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!queue.is_aborted());

        // The second idle consumer cancels the queue and releases the first
        assert_eq!(queue.pop().await, Err(QueueCancelled));
        assert_eq!(first.await.unwrap(), Err(QueueCancelled));
    }

    #[tokio::test]
    async fn test_push_waits_for_space() {
        let queue = Arc::new(UrlQueue::new(1, 2));
        queue.push("a".to_string()).await.unwrap();

        let pusher = {
            let queue = Arc::clone(&queue);
            tokio::spawn(async move { queue.push("b".to_string()).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!pusher.is_finished());
        assert_eq!(queue.len(), 1);

        assert_eq!(queue.pop().await.unwrap(), "a");
        pusher.await.unwrap().unwrap();
        assert_eq!(queue.pop().await.unwrap(), "b");
    }

    #[tokio::test]
    async fn test_single_consumer_push_never_blocks() {
        let queue = UrlQueue::new(1, 1);
        queue.push("a".to_string()).await.unwrap();
        queue.push("b".to_string()).await.unwrap();
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.capacity(), 1);
    }
}
