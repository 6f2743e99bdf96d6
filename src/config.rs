use std::path::PathBuf;
use std::time::Duration;

use crate::context::{ContextProvider, SystemContext};
use crate::delivery_observer::{DeliveryObserver, NoopDeliveryObserver};
use crate::flusher_thread::FlusherThreadConfig;
use crate::{Client, Result};

/// Configuration for [`Client`].
///
/// # Examples
/// ```no_run
/// # use beacon::ClientConfig;
/// # fn main() -> beacon::Result<()> {
/// let client = ClientConfig::from_api_key("api-key")
///     .flush_at(10)
///     .flush_interval(std::time::Duration::from_secs(10))
///     .to_client()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientConfig {
    pub(crate) api_key: String,
    pub(crate) ingestion_url: String,
    pub(crate) flush_at: usize,
    pub(crate) flush_interval: Duration,
    pub(crate) max_queue_size: usize,
    pub(crate) data_dir: Option<PathBuf>,
    pub(crate) context_provider: Box<dyn ContextProvider>,
    pub(crate) delivery_observer: Box<dyn DeliveryObserver + Send + Sync>,
}

impl ClientConfig {
    /// Default ingestion URL for event delivery.
    pub const DEFAULT_INGESTION_URL: &'static str = "https://ingest.beacon.cloud/v1/batch";

    /// Default value for [`ClientConfig::flush_at`].
    pub const DEFAULT_FLUSH_AT: usize = 20;

    /// Default value for [`ClientConfig::max_queue_size`].
    pub const DEFAULT_MAX_QUEUE_SIZE: usize = 100;

    /// Create a default Beacon configuration using the specified API key.
    ///
    /// ```
    /// # use beacon::ClientConfig;
    /// ClientConfig::from_api_key("api-key");
    /// ```
    pub fn from_api_key(api_key: impl Into<String>) -> Self {
        ClientConfig {
            api_key: api_key.into(),
            ingestion_url: ClientConfig::DEFAULT_INGESTION_URL.to_owned(),
            flush_at: ClientConfig::DEFAULT_FLUSH_AT,
            flush_interval: FlusherThreadConfig::DEFAULT_FLUSH_INTERVAL,
            max_queue_size: ClientConfig::DEFAULT_MAX_QUEUE_SIZE,
            data_dir: None,
            context_provider: Box::new(SystemContext),
            delivery_observer: Box::new(NoopDeliveryObserver),
        }
    }

    /// Override the ingestion URL events are delivered to. Clients should use
    /// the default setting in most cases.
    pub fn ingestion_url(mut self, ingestion_url: impl Into<String>) -> Self {
        self.ingestion_url = ingestion_url.into();
        self
    }

    /// Number of queued events that triggers a flush without waiting for the
    /// interval.
    pub fn flush_at(mut self, flush_at: usize) -> Self {
        self.flush_at = flush_at;
        self
    }

    /// Interval between scheduled flushes. Low-traffic sessions deliver
    /// within this bound even when the queue never reaches
    /// [`ClientConfig::flush_at`].
    pub fn flush_interval(mut self, flush_interval: Duration) -> Self {
        self.flush_interval = flush_interval;
        self
    }

    /// Hard cap on the pending queue. Reaching it drops all pending events in
    /// favor of newer ones.
    pub fn max_queue_size(mut self, max_queue_size: usize) -> Self {
        self.max_queue_size = max_queue_size;
        self
    }

    /// Directory for SDK state (the persisted identity). Defaults to a
    /// `beacon` directory under the platform's local data directory.
    pub fn data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(data_dir.into());
        self
    }

    /// Replace the default context provider. The provider is consulted once,
    /// at client construction.
    pub fn context_provider(mut self, context_provider: impl ContextProvider + 'static) -> Self {
        self.context_provider = Box::new(context_provider);
        self
    }

    /// Register an observer for delivery outcomes.
    ///
    /// ```
    /// # use beacon::ClientConfig;
    /// let config = ClientConfig::from_api_key("api-key").delivery_observer(|outcome| {
    ///     println!("{:?}", outcome);
    /// });
    /// ```
    pub fn delivery_observer(
        mut self,
        delivery_observer: impl DeliveryObserver + Send + Sync + 'static,
    ) -> Self {
        self.delivery_observer = Box::new(delivery_observer);
        self
    }

    /// Create a new [`Client`] using the specified configuration.
    ///
    /// ```no_run
    /// # use beacon::{Client, ClientConfig};
    /// let client: Client = ClientConfig::from_api_key("api-key").to_client().unwrap();
    /// ```
    pub fn to_client(self) -> Result<Client> {
        Client::new(self)
    }
}
