//! Concurrency-bounded fan-out with ordered fan-in, and the process-wide
//! gate every browser session passes through.

use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::future::join_all;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Caps live browser sessions across every caller of one engine: single
/// scrapes, batches and concurrent API requests alike.
///
/// The cap can be changed at any time. Raising it frees slots immediately.
/// Lowering it removes idle slots first; slots currently in use are retired
/// as their holders finish, so the number of live sessions converges on the
/// new cap without interrupting anyone.
#[derive(Debug)]
pub struct BrowserGate {
    permits: Arc<Semaphore>,
    limit: AtomicUsize,
    /// Slots still to retire after a shrink.
    owed: Arc<AtomicUsize>,
}

impl BrowserGate {
    pub fn new(limit: NonZeroUsize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(limit.get())),
            limit: AtomicUsize::new(limit.get()),
            owed: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn limit(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.limit.load(Ordering::SeqCst)).unwrap_or(NonZeroUsize::MIN)
    }

    /// Returns the previous cap.
    pub fn set_limit(&self, limit: NonZeroUsize) -> NonZeroUsize {
        let previous = self.limit.swap(limit.get(), Ordering::SeqCst);
        let target = limit.get();
        if target > previous {
            let grow = target - previous;
            let cancelled = take_up_to(&self.owed, grow);
            self.permits.add_permits(grow - cancelled);
        } else if target < previous {
            let shrink = previous - target;
            let forgotten = self.permits.forget_permits(shrink);
            self.owed.fetch_add(shrink - forgotten, Ordering::SeqCst);
        }
        NonZeroUsize::new(previous).unwrap_or(NonZeroUsize::MIN)
    }

    /// Wait for a free slot. The slot is returned when the [`BrowserSlot`]
    /// is dropped.
    pub async fn acquire(&self) -> BrowserSlot {
        BrowserSlot {
            // The semaphore is never closed, so acquisition only fails in theory.
            permit: Arc::clone(&self.permits).acquire_owned().await.ok(),
            owed: Arc::clone(&self.owed),
        }
    }

    /// Slots free right now.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }
}

fn take_up_to(counter: &AtomicUsize, n: usize) -> usize {
    match counter.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |owed| Some(owed - owed.min(n))) {
        Ok(owed) | Err(owed) => owed.min(n),
    }
}

/// One occupied [`BrowserGate`] slot.
#[derive(Debug)]
pub struct BrowserSlot {
    permit: Option<OwnedSemaphorePermit>,
    owed: Arc<AtomicUsize>,
}

impl Drop for BrowserSlot {
    fn drop(&mut self) {
        if let Some(permit) = self.permit.take()
            && take_up_to(&self.owed, 1) == 1
        {
            permit.forget();
        }
    }
}

/// Runs one pipeline per input with at most `limit` of them past the gate at
/// any moment. Results come back in input order no matter which pipeline
/// finishes first. Pipelines are expected to turn their own failures into
/// values; the scheduler never cancels a sibling.
#[derive(Debug, Clone)]
pub struct BatchScheduler {
    permits: Arc<Semaphore>,
    limit: NonZeroUsize,
}

impl BatchScheduler {
    pub fn new(limit: NonZeroUsize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(limit.get())),
            limit,
        }
    }

    pub fn limit(&self) -> NonZeroUsize {
        self.limit
    }

    pub async fn run<I, F, Fut>(&self, items: I, pipeline: F) -> Vec<Fut::Output>
    where
        I: IntoIterator,
        F: Fn(I::Item) -> Fut,
        Fut: Future,
    {
        let tasks = items.into_iter().map(|item| {
            let permits = Arc::clone(&self.permits);
            let task = pipeline(item);
            async move {
                // The semaphore is never closed, so acquisition only fails in theory.
                let _permit = permits.acquire_owned().await.ok();
                task.await
            }
        });
        join_all(tasks).await
    }
}
