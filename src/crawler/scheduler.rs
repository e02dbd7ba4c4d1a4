//! Rate control and the bounded worker pool
//!
//! This module handles:
//! - Per-slot request spacing ([`Throttle`])
//! - Draining a queue of work items with a fixed number of workers
//!   ([`WorkerPool`]), each worker throttling itself
//! - Stopping promptly when the run is cancelled
//!
//! The sequential path (landing page and listing pages) owns a single
//! throttle; each enrichment worker owns its own, so the aggregate request
//! rate is bounded by `workers / min_interval`.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Enforces a minimum interval between requests from one slot
#[derive(Debug)]
pub struct Throttle {
    min_interval: Duration,
    last_request: Option<Instant>,
}

impl Throttle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: None,
        }
    }

    /// Calculates the time until the next request may be made
    ///
    /// Returns None if a request can be made now.
    pub fn time_until_ready(&self, now: Instant) -> Option<Duration> {
        let last = self.last_request?;
        let elapsed = now.saturating_duration_since(last);
        if elapsed < self.min_interval {
            Some(self.min_interval - elapsed)
        } else {
            None
        }
    }

    /// Waits until the slot may issue a request, then records it
    ///
    /// Returns false without recording anything if `cancel` fires first.
    pub async fn ready(&mut self, cancel: &CancellationToken) -> bool {
        if cancel.is_cancelled() {
            return false;
        }

        if let Some(wait) = self.time_until_ready(Instant::now()) {
            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                _ = cancel.cancelled() => return false,
            }
        }

        self.last_request = Some(Instant::now());
        true
    }
}

/// A fixed-size pool of self-throttling workers
///
/// All workers run as futures on the calling task; suspension only happens
/// inside the work function and the throttle wait.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    size: usize,
    min_interval: Duration,
}

impl WorkerPool {
    /// Creates a pool; a size of zero is treated as one
    pub fn new(size: usize, min_interval: Duration) -> Self {
        Self {
            size: size.max(1),
            min_interval,
        }
    }

    /// Runs `work` on every item and returns the outputs in item order
    ///
    /// Items are handed to workers in queue order, but outputs are placed by
    /// the item's original index regardless of completion order. A `None`
    /// slot means the item was never started because `cancel` fired.
    pub async fn run<T, O, F, Fut>(
        &self,
        items: Vec<T>,
        cancel: &CancellationToken,
        work: F,
    ) -> Vec<Option<O>>
    where
        F: Fn(T) -> Fut,
        Fut: Future<Output = O>,
    {
        let total = items.len();
        let queue = Mutex::new(items.into_iter().enumerate().collect::<VecDeque<_>>());
        let work = &work;
        let queue = &queue;

        let workers = (0..self.size.min(total)).map(|worker| {
            let mut throttle = Throttle::new(self.min_interval);
            async move {
                let mut done = Vec::new();
                loop {
                    let next = queue
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .pop_front();
                    let Some((index, item)) = next else {
                        break;
                    };
                    if !throttle.ready(cancel).await {
                        tracing::debug!("Worker {} stopping on cancellation", worker);
                        break;
                    }
                    done.push((index, work(item).await));
                }
                done
            }
        });

        let mut slots: Vec<Option<O>> = (0..total).map(|_| None).collect();
        for (index, output) in futures::future::join_all(workers).await.into_iter().flatten() {
            slots[index] = Some(output);
        }
        slots
    }
}
