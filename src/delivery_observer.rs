/// The outcome of one delivery attempt for a drained batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum DeliveryOutcome {
    /// The collector received the batch and returned a success status.
    Delivered {
        /// Number of envelopes in the batch.
        count: usize,
    },
    /// The collector received the batch but returned a non-success status.
    /// The batch is dropped and never retried.
    Rejected {
        /// HTTP status returned by the collector.
        status: u16,
        /// Number of envelopes in the batch.
        count: usize,
    },
    /// The transport failed before any response was received. The batch has
    /// been requeued ahead of newer events for one more delivery cycle.
    Requeued {
        /// Number of envelopes in the batch.
        count: usize,
    },
    /// The batch could not be serialized and was dropped.
    Dropped {
        /// Number of envelopes in the batch.
        count: usize,
    },
}

/// A trait for observing delivery attempts.
///
/// Event recording is fire-and-forget: no delivery failure is ever surfaced
/// to `track`/`identify` callers, and by default failed batches disappear
/// with only a log line. Hosts that want metrics on delivery health can
/// register an observer; it does not change delivery behavior.
///
/// ```no_run
/// # use beacon::ClientConfig;
/// let config = ClientConfig::from_api_key("api-key").delivery_observer(|outcome| {
///     println!("{:?}", outcome);
/// });
/// ```
///
/// Observers are called from the flusher thread and should not block or
/// panic; anything slow belongs on the host's own worker.
pub trait DeliveryObserver {
    /// Called after every delivery attempt with its outcome.
    fn on_delivery(&self, outcome: DeliveryOutcome);
}

pub(crate) struct NoopDeliveryObserver;
impl DeliveryObserver for NoopDeliveryObserver {
    fn on_delivery(&self, _outcome: DeliveryOutcome) {}
}

impl<T: Fn(DeliveryOutcome)> DeliveryObserver for T {
    fn on_delivery(&self, outcome: DeliveryOutcome) {
        self(outcome);
    }
}
