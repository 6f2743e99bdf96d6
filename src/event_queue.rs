//! The bounded in-memory buffer of pending envelopes. [`EventQueue`] serializes all mutation
//! through a single mutex so enqueues, drains, and requeues observe a total order.
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::envelope::Envelope;

/// A concurrency-safe, bounded queue of pending [`Envelope`]s.
///
/// The queue owns the overflow policy: once it reaches the hard cap, the next
/// enqueue clears the whole queue before appending. An oversized batch would
/// be rejected by the collector's payload-size limits anyway, so once
/// saturated it is cheaper to drop and recover than to compound the backlog.
///
/// Callers never hold a live reference to a pending envelope: enqueueing
/// moves it in, and a flush moves the whole batch out.
#[derive(Debug)]
pub struct EventQueue {
    flush_at: usize,
    max_queue_size: usize,
    events: Mutex<VecDeque<Envelope>>,
}

impl EventQueue {
    pub fn new(flush_at: usize, max_queue_size: usize) -> EventQueue {
        EventQueue {
            flush_at: flush_at.max(1),
            max_queue_size,
            events: Mutex::new(VecDeque::new()),
        }
    }

    /// Appends an envelope to the tail of the queue, applying the overflow
    /// policy first.
    ///
    /// Returns `true` if the queue has reached the flush threshold and a
    /// flush should be requested.
    pub fn enqueue(&self, envelope: Envelope) -> bool {
        let mut events = self
            .events
            .lock()
            .expect("thread holding event queue lock should not panic");

        if events.len() >= self.max_queue_size {
            log::debug!(target: "beacon", count = events.len(); "event queue overflow, dropping all pending events");
            events.clear();
        }

        events.push_back(envelope);

        events.len() >= self.flush_at
    }

    /// Atomically removes and returns the entire queue contents as a batch,
    /// leaving the queue empty.
    pub fn drain_for_flush(&self) -> Vec<Envelope> {
        let mut events = self
            .events
            .lock()
            .expect("thread holding event queue lock should not panic");

        events.drain(..).collect()
    }

    /// Prepends a previously drained batch back onto the queue, ahead of
    /// anything enqueued since. The failed batch is older, so it is ordered
    /// first.
    ///
    /// This is a best-effort retry: if the process exits before the next
    /// successful flush, the requeued batch is lost.
    pub fn requeue_front(&self, batch: Vec<Envelope>) {
        let mut events = self
            .events
            .lock()
            .expect("thread holding event queue lock should not panic");

        for envelope in batch.into_iter().rev() {
            events.push_front(envelope);
        }
    }

    pub fn len(&self) -> usize {
        self.events
            .lock()
            .expect("thread holding event queue lock should not panic")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
