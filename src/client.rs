use std::path::PathBuf;
use std::sync::Arc;

use url::Url;

use crate::config::ClientConfig;
use crate::envelope::Envelope;
use crate::event_delivery::EventDelivery;
use crate::event_queue::EventQueue;
use crate::flusher_thread::{FlusherThread, FlusherThreadConfig};
use crate::identity::IdentityStore;
use crate::lifecycle::LifecyclePhase;
use crate::properties::Properties;
use crate::{Error, Result};

/// A client for the Beacon collector.
///
/// In order to create a client instance, first create [`ClientConfig`].
///
/// The client is an explicitly constructed object: the host application owns
/// it and passes it (or an `Arc` of it) to call sites. There is no process
/// global, so tests and multi-tenant hosts can run several independent
/// clients side by side. Constructing a client replaces nothing implicitly;
/// re-initializing the SDK means dropping the previous client (which cancels
/// its flush scheduler) and building a new one.
///
/// Recording methods are fire-and-forget by design: best-effort telemetry
/// must never break the host application. They serialize queue access through
/// one lock, post flush work to a background thread, and never block on
/// network I/O or return an error.
///
/// # Examples
/// ```no_run
/// # use beacon::{Client, ClientConfig, Properties};
/// # fn main() -> beacon::Result<()> {
/// let client = ClientConfig::from_api_key("api-key").to_client()?;
/// client.identify("u1", Properties::new());
/// client.track("Signup Completed", [("plan".to_owned(), "pro".into())].into_iter().collect());
/// client.shutdown()?;
/// # Ok(())
/// # }
/// ```
pub struct Client {
    queue: Arc<EventQueue>,
    identity: IdentityStore,
    context: Arc<Properties>,
    flusher: FlusherThread,
}

impl Client {
    /// Create a new `Client` using the specified configuration.
    ///
    /// The context provider is consulted once here; its result is attached to
    /// every envelope this client produces.
    ///
    /// # Errors
    ///
    /// This is the one fail-fast seam of the SDK:
    /// - [`Error::EmptyApiKey`] if the credential is missing.
    /// - [`Error::InvalidIngestionUrl`] if the endpoint does not parse.
    /// - [`Error::Io`] if the flusher thread failed to start.
    /// - [`Error::Network`] if the HTTP client could not be constructed.
    pub fn new(config: ClientConfig) -> Result<Client> {
        if config.api_key.is_empty() {
            return Err(Error::EmptyApiKey);
        }
        let ingestion_url =
            Url::parse(&config.ingestion_url).map_err(Error::InvalidIngestionUrl)?;

        let identity = IdentityStore::open(identity_path(config.data_dir));
        let context = Arc::new(config.context_provider.context());
        let queue = Arc::new(EventQueue::new(config.flush_at, config.max_queue_size));

        let delivery =
            EventDelivery::new(ingestion_url, config.api_key, config.delivery_observer)?;
        let flusher = FlusherThread::start(FlusherThreadConfig {
            queue: Arc::clone(&queue),
            delivery,
            interval: config.flush_interval,
        })?;

        Ok(Client {
            queue,
            identity,
            context,
            flusher,
        })
    }

    /// Record a behavioral event.
    ///
    /// ```no_run
    /// # fn test(client: &beacon::Client) {
    /// client.track("Checkout Started", [("step".to_owned(), 1.into())].into_iter().collect());
    /// # }
    /// ```
    pub fn track(&self, event_name: impl Into<String>, properties: Properties) {
        self.enqueue(Envelope::track(
            self.identity.snapshot(),
            Some(Arc::clone(&self.context)),
            event_name,
            properties,
        ));
    }

    /// Associate this installation with a user id.
    ///
    /// The user id is persisted before the identify event is constructed, so
    /// the anonymous-id linkage is established atomically from the caller's
    /// perspective, and every subsequent envelope (across restarts) carries
    /// the id until `identify` is called again.
    pub fn identify(&self, user_id: impl Into<String>, traits: Properties) {
        let identity = self.identity.set_user_id(user_id);
        self.enqueue(Envelope::identify(
            identity,
            Some(Arc::clone(&self.context)),
            traits,
        ));
    }

    /// Record the well-known track event for an application lifecycle
    /// transition. See [`LifecyclePhase`] for the subscription model.
    pub fn notify_lifecycle(&self, phase: LifecyclePhase) {
        self.track(phase.event_name(), Properties::new());
    }

    /// Request delivery of everything currently queued.
    ///
    /// The flush runs on the background flusher thread; this call never
    /// blocks and returns before delivery completes. A no-op if the queue is
    /// empty.
    pub fn flush(&self) {
        self.flusher.request_flush();
    }

    /// Stop the client after a final delivery attempt for anything still
    /// queued, and wait for the flusher thread to exit.
    ///
    /// Dropping the client without calling `shutdown` also stops the flusher
    /// thread, but without the final flush and without waiting for it.
    ///
    /// # Errors
    ///
    /// - [`Error::FlusherThreadPanicked`] if the flusher thread panicked.
    pub fn shutdown(self) -> Result<()> {
        self.flusher.shutdown()
    }

    fn enqueue(&self, envelope: Envelope) {
        if self.queue.enqueue(envelope) {
            self.flusher.request_flush();
        }
    }
}

fn identity_path(data_dir: Option<PathBuf>) -> PathBuf {
    data_dir
        .unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("beacon")
        })
        .join("identity.json")
}
