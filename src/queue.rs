//! The bounded lane queue.
//!
//! Single producer (a reader's decoder), single consumer (a batcher), plus
//! the supervisor as an out-of-band third party that head-drops under
//! saturation. [`crossbeam_queue::ArrayQueue`] already gives us a
//! lock-free bounded ring buffer safe for exactly this kind of concurrent
//! access; we layer a [`tokio::sync::Notify`] on top so the consumer can
//! `await` new data instead of spinning.

use crossbeam_queue::ArrayQueue;
use tokio::sync::Notify;

pub struct LaneQueue<T> {
    inner: ArrayQueue<T>,
    notify: Notify,
}

impl<T> LaneQueue<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: ArrayQueue::new(capacity),
            notify: Notify::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Non-blocking producer-side offer. Returns `false` (and drops `item`)
    /// if the lane is full — the decoder must never block the socket read
    /// loop on a full lane.
    pub fn offer(&self, item: T) -> bool {
        match self.inner.push(item) {
            Ok(()) => {
                self.notify.notify_one();
                true
            }
            Err(_rejected) => false,
        }
    }

    /// Non-blocking pop, for callers that already know data is present or
    /// that would rather poll than await.
    pub fn try_recv(&self) -> Option<T> {
        self.inner.pop()
    }

    /// Waits for and pops the next item. Cancel-safe: if the returned
    /// future is dropped (e.g. a `select!` branch losing the race), no
    /// item is lost — it simply stays in the queue for the next call.
    pub async fn recv(&self) -> T {
        loop {
            if let Some(item) = self.inner.pop() {
                return item;
            }
            let notified = self.notify.notified();
            if let Some(item) = self.inner.pop() {
                return item;
            }
            notified.await;
        }
    }

    /// Drops up to `n` oldest entries from the head. Stops early if the
    /// queue drains first. This is the shedder's only mutation path; the
    /// producer/consumer invariants above are untouched by it.
    pub fn drop_head(&self, n: usize) -> usize {
        let mut dropped = 0;
        for _ in 0..n {
            if self.inner.pop().is_some() {
                dropped += 1;
            } else {
                break;
            }
        }
        dropped
    }
}
