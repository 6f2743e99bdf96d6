//! The delivery pipeline: turns a drained batch into one POST against the collector and
//! interprets the outcome.
use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use url::Url;

use crate::delivery_observer::{DeliveryObserver, DeliveryOutcome};
use crate::envelope::Envelope;
use crate::event_queue::EventQueue;
use crate::Result;

/// Name of the request header carrying the SDK credential.
const API_KEY_HEADER: &str = "apiKey";

/// Hard cap on one delivery attempt. A hung request would otherwise stall the
/// flusher thread past the next scheduled flush.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Wire format of the delivery POST body.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchPayload<'a> {
    sent_at: String,
    batch: &'a [Envelope],
}

/// Delivers drained batches to the collector.
///
/// A batch counts as delivered once the transport completes, whatever the
/// HTTP status: a server-rejected batch (bad payload, auth failure) would
/// never succeed on retry and must not be retried forever. Only a
/// transport-level failure (no response at all) requeues the batch, and only
/// ahead of anything enqueued since, so chronological order survives the
/// retry.
pub struct EventDelivery {
    // Client holds a connection pool internally, so we're reusing the client between requests.
    client: reqwest::blocking::Client,
    ingestion_url: Url,
    api_key: String,
    observer: Box<dyn DeliveryObserver + Send + Sync>,
}

impl EventDelivery {
    pub fn new(
        ingestion_url: Url,
        api_key: String,
        observer: Box<dyn DeliveryObserver + Send + Sync>,
    ) -> Result<EventDelivery> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(EventDelivery {
            client,
            ingestion_url,
            api_key,
            observer,
        })
    }

    /// Drains the queue and attempts delivery of the resulting batch.
    ///
    /// No-op if the queue is empty. All flushes run on the flusher thread, so
    /// at most one batch is ever in flight.
    pub fn flush(&self, queue: &EventQueue) {
        let batch = queue.drain_for_flush();
        if batch.is_empty() {
            return;
        }

        let payload = BatchPayload {
            sent_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            batch: &batch,
        };
        let body = match serde_json::to_vec(&payload) {
            Ok(body) => body,
            Err(err) => {
                // Unrecoverable: the same encode failure would recur on retry.
                log::warn!(target: "beacon", "dropping batch that failed to serialize: {:?}", err);
                self.observer.on_delivery(DeliveryOutcome::Dropped {
                    count: batch.len(),
                });
                return;
            }
        };

        log::debug!(target: "beacon", count = batch.len(); "delivering batch");
        let response = self
            .client
            .post(self.ingestion_url.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(API_KEY_HEADER, self.api_key.as_str())
            .body(body)
            .send();

        match response {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    log::debug!(target: "beacon", count = batch.len(); "batch delivered");
                    self.observer.on_delivery(DeliveryOutcome::Delivered {
                        count: batch.len(),
                    });
                } else {
                    log::warn!(target: "beacon", "collector rejected batch with status {}, dropping it", status);
                    self.observer.on_delivery(DeliveryOutcome::Rejected {
                        status: status.as_u16(),
                        count: batch.len(),
                    });
                }
            }
            Err(err) => {
                // No response at all, e.g. connectivity loss, DNS failure, or
                // timeout. Transient, so the batch gets one more delivery
                // cycle ahead of anything enqueued since.
                log::warn!(target: "beacon", "transport failure, requeueing batch: {:?}", err);
                let count = batch.len();
                queue.requeue_front(batch);
                self.observer.on_delivery(DeliveryOutcome::Requeued { count });
            }
        }
    }
}
