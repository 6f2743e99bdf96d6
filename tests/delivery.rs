//! End-to-end delivery tests against a local capture collector.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use beacon::event_delivery::EventDelivery;
use beacon::event_queue::EventQueue;
use beacon::{Client, ClientConfig, DeliveryOutcome, Envelope, Identity, Properties};

const OK: &str = "HTTP/1.1 200 OK\r\ncontent-length: 0\r\nconnection: close\r\n\r\n";
const BAD_REQUEST: &str = "HTTP/1.1 400 Bad Request\r\ncontent-length: 0\r\nconnection: close\r\n\r\n";

/// A minimal HTTP collector that records every POST body it receives and
/// answers with a fixed status.
struct CaptureCollector {
    url: String,
    requests: Arc<Mutex<Vec<serde_json::Value>>>,
}

impl CaptureCollector {
    fn start(status_line: &'static str) -> CaptureCollector {
        let _ = env_logger::builder().is_test(true).try_init();

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/v1/batch", listener.local_addr().unwrap());
        let requests: Arc<Mutex<Vec<serde_json::Value>>> = Arc::default();

        let sink = Arc::clone(&requests);
        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                if let Some(body) = answer(stream, status_line) {
                    sink.lock().unwrap().push(body);
                }
            }
        });

        CaptureCollector { url, requests }
    }

    fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn wait_for_requests(&self, count: usize) -> Vec<serde_json::Value> {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            {
                let requests = self.requests.lock().unwrap();
                if requests.len() >= count {
                    return requests.clone();
                }
            }
            assert!(
                Instant::now() < deadline,
                "collector did not receive {count} request(s) in time"
            );
            std::thread::sleep(Duration::from_millis(10));
        }
    }
}

/// Reads one HTTP request, writes `status_line` back, and returns the parsed
/// JSON body.
fn answer(mut stream: TcpStream, status_line: &str) -> Option<serde_json::Value> {
    let mut reader = BufReader::new(stream.try_clone().ok()?);

    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).ok()?;
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some(value) = line.to_ascii_lowercase().strip_prefix("content-length:") {
            content_length = value.trim().parse().ok()?;
        }
    }

    let mut body = vec![0; content_length];
    reader.read_exact(&mut body).ok()?;
    let _ = stream.write_all(status_line.as_bytes());

    serde_json::from_slice(&body).ok()
}

fn event_names(request: &serde_json::Value) -> Vec<String> {
    request["batch"]
        .as_array()
        .unwrap()
        .iter()
        .map(|envelope| envelope["event"].as_str().unwrap_or_default().to_owned())
        .collect()
}

fn client_for(collector: &CaptureCollector, dir: &tempfile::TempDir, flush_at: usize) -> Client {
    ClientConfig::from_api_key("test-api-key")
        .ingestion_url(&collector.url)
        .flush_at(flush_at)
        .flush_interval(Duration::from_secs(3600))
        .data_dir(dir.path())
        .to_client()
        .unwrap()
}

#[test]
fn size_trigger_then_manual_flush() {
    let collector = CaptureCollector::start(OK);
    let dir = tempfile::tempdir().unwrap();
    let client = client_for(&collector, &dir, 2);

    // Reaching flush_at delivers exactly one batch with both events in call
    // order.
    client.track("a", Properties::new());
    client.track("b", Properties::new());
    let requests = collector.wait_for_requests(1);
    assert_eq!(event_names(&requests[0]), ["a", "b"]);

    // Below the threshold nothing is delivered until a manual flush.
    client.track("c", Properties::new());
    std::thread::sleep(Duration::from_millis(200));
    assert_eq!(collector.request_count(), 1);

    client.flush();
    let requests = collector.wait_for_requests(2);
    assert_eq!(event_names(&requests[1]), ["c"]);

    client.shutdown().unwrap();
    assert_eq!(collector.request_count(), 2);
}

#[test]
fn delivered_payload_matches_the_wire_format() {
    let collector = CaptureCollector::start(OK);
    let dir = tempfile::tempdir().unwrap();
    let client = client_for(&collector, &dir, usize::MAX);

    client.track(
        "Checkout Started",
        [("step".to_owned(), 1.into())].into_iter().collect(),
    );
    client.flush();

    let request = collector.wait_for_requests(1).remove(0);
    assert!(request["sentAt"].is_string());

    let envelope = &request["batch"][0];
    assert_eq!(envelope["type"], "track");
    assert_eq!(envelope["event"], "Checkout Started");
    assert_eq!(envelope["properties"]["step"], 1);
    assert!(envelope["anonymousId"].is_string());
    assert!(envelope["messageId"].is_string());
    assert!(envelope["originalTimestamp"].is_string());
    assert_eq!(envelope["context"]["library"]["name"], "beacon");
}

#[test]
fn identify_links_the_user_id_for_subsequent_events() {
    let collector = CaptureCollector::start(OK);
    let dir = tempfile::tempdir().unwrap();
    let client = client_for(&collector, &dir, usize::MAX);

    client.identify(
        "u1",
        [("plan".to_owned(), "pro".into())].into_iter().collect(),
    );
    client.track("After Login", Properties::new());
    client.flush();

    let request = collector.wait_for_requests(1).remove(0);
    let batch = request["batch"].as_array().unwrap();
    assert_eq!(batch[0]["type"], "identify");
    assert_eq!(batch[0]["traits"]["plan"], "pro");
    assert_eq!(batch[0]["userId"], "u1");
    assert!(batch[0].get("event").is_none());
    assert_eq!(batch[1]["type"], "track");
    assert_eq!(batch[1]["userId"], "u1");
    assert_eq!(batch[1]["anonymousId"], batch[0]["anonymousId"]);
}

#[test]
fn single_thread_call_order_is_preserved_across_batches() {
    let collector = CaptureCollector::start(OK);
    let dir = tempfile::tempdir().unwrap();
    let client = client_for(&collector, &dir, usize::MAX);

    for name in ["one", "two", "three", "four", "five"] {
        client.track(name, Properties::new());
    }
    client.flush();

    let requests = collector.wait_for_requests(1);
    assert_eq!(
        event_names(&requests[0]),
        ["one", "two", "three", "four", "five"]
    );
}

#[test]
fn server_rejection_is_never_retried() {
    let collector = CaptureCollector::start(BAD_REQUEST);
    let dir = tempfile::tempdir().unwrap();
    let client = client_for(&collector, &dir, 2);

    client.track("a", Properties::new());
    client.track("b", Properties::new());
    collector.wait_for_requests(1);

    // The rejected batch is dropped: the next flush carries only what was
    // enqueued afterwards.
    client.track("c", Properties::new());
    client.flush();

    let requests = collector.wait_for_requests(2);
    assert_eq!(event_names(&requests[1]), ["c"]);
}

#[test]
fn transport_failure_requeues_ahead_of_newer_events() {
    let identity = Identity {
        anonymous_id: "anon".to_owned(),
        user_id: None,
    };
    let queue = EventQueue::new(usize::MAX, 100);
    let first = Envelope::track(identity.clone(), None, "a", Properties::new());
    let first_message_id = first.message_id.clone();
    queue.enqueue(first);
    queue.enqueue(Envelope::track(identity.clone(), None, "b", Properties::new()));

    // Port 1 is never listening: the whole batch fails at the transport level
    // and is requeued.
    let outcomes = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&outcomes);
    let unreachable = EventDelivery::new(
        url::Url::parse("http://127.0.0.1:1/v1/batch").unwrap(),
        "test-api-key".to_owned(),
        Box::new(move |outcome: DeliveryOutcome| sink.lock().unwrap().push(outcome)),
    )
    .unwrap();
    unreachable.flush(&queue);
    assert_eq!(
        *outcomes.lock().unwrap(),
        [DeliveryOutcome::Requeued { count: 2 }]
    );

    queue.enqueue(Envelope::track(identity, None, "c", Properties::new()));

    // The next successful flush delivers the failed batch first, in original
    // order, with the original message ids.
    let collector = CaptureCollector::start(OK);
    let reachable = EventDelivery::new(
        url::Url::parse(&collector.url).unwrap(),
        "test-api-key".to_owned(),
        Box::new(|_: DeliveryOutcome| {}),
    )
    .unwrap();
    reachable.flush(&queue);

    let request = collector.wait_for_requests(1).remove(0);
    assert_eq!(event_names(&request), ["a", "b", "c"]);
    assert_eq!(request["batch"][0]["messageId"], first_message_id.as_str());
}

#[test]
fn scheduled_flush_delivers_low_traffic_sessions() {
    let collector = CaptureCollector::start(OK);
    let dir = tempfile::tempdir().unwrap();
    let client = ClientConfig::from_api_key("test-api-key")
        .ingestion_url(&collector.url)
        .flush_at(usize::MAX)
        .flush_interval(Duration::from_millis(100))
        .data_dir(dir.path())
        .to_client()
        .unwrap();

    // One event, far below the size threshold; only the timer can deliver it.
    client.track("heartbeat", Properties::new());

    let requests = collector.wait_for_requests(1);
    assert_eq!(event_names(&requests[0]), ["heartbeat"]);
}
