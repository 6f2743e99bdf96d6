//! The Rust SDK for Beacon: best-effort, batched telemetry delivered to the Beacon collector.
//!
//! # Overview
//!
//! The SDK revolves around an explicitly constructed [`Client`] that records identification and
//! behavioral events and delivers them in the background. Create one from a [`ClientConfig`], own
//! it in your application, and pass it to call sites; there is no process-wide singleton, so
//! multiple independent clients (and tests) can coexist.
//!
//! Recording is fire-and-forget. [`Client::track`] and [`Client::identify`] stamp the call into an
//! envelope, append it to a bounded in-memory queue, and return; they never block on network I/O
//! and never return an error. Batches are delivered when the queue reaches the configured size
//! threshold, when the flush interval elapses, or on a manual [`Client::flush`] — whichever comes
//! first. A batch that fails at the transport level is requeued once ahead of newer events; a
//! batch the collector rejects is dropped, since retrying it would never succeed.
//!
//! # Building blocks
//!
//! The crate is organized as a set of building blocks, all driven by `Client`:
//!
//! [`event_queue::EventQueue`] is the concurrency-safe, bounded buffer of pending envelopes. It
//! owns the overflow policy and serializes all mutation through a single lock, so enqueues,
//! drains, and requeues observe a total order.
//!
//! [`event_delivery::EventDelivery`] turns a drained batch into one POST against the collector
//! and interprets the outcome: transport failure requeues, anything else is final.
//!
//! [`flusher_thread::FlusherThread`] is the cancellable scheduler: one background thread that
//! flushes on a fixed interval and on demand. Size-triggered and manual flushes post onto it
//! instead of flushing inline, so callers are never stalled by a slow collector.
//!
//! [`IdentityStore`] persists the per-installation anonymous id (generated once, kept forever)
//! and the user id set by `identify`.
//!
//! [`ContextProvider`] supplies the static context bundle attached to every envelope;
//! [`DeliveryObserver`] is an optional hook for delivery outcomes, for hosts that want metrics on
//! telemetry health.
//!
//! # Lifecycle events
//!
//! The SDK contains no platform notification code. Hosts forward their platform's application
//! state transitions through [`Client::notify_lifecycle`] using [`LifecyclePhase`], which records
//! the corresponding well-known track event.
//!
//! # Error Handling
//!
//! Errors are represented by the [`Error`] enum and only surface from client construction and
//! [`Client::shutdown`]. Everything after construction is best-effort by design: delivery
//! failures are logged (and optionally observed) but never propagate to recording call sites.
//!
//! # Logging
//!
//! The package uses the [`log`](https://docs.rs/log/latest/log/) crate for logging messages under
//! the `beacon` target. Consider integrating a `log`-compatible logger implementation for better
//! visibility into SDK operations.

#![warn(rustdoc::missing_crate_level_docs)]

pub mod event_delivery;
pub mod event_queue;
pub mod flusher_thread;

mod client;
mod config;
mod context;
mod delivery_observer;
mod envelope;
mod error;
mod identity;
mod lifecycle;
mod properties;

pub use client::Client;
pub use config::ClientConfig;
pub use context::{ContextProvider, SystemContext};
pub use delivery_observer::{DeliveryObserver, DeliveryOutcome};
pub use envelope::{Envelope, EventKind};
pub use error::{Error, Result};
pub use identity::{Identity, IdentityStore};
pub use lifecycle::LifecyclePhase;
pub use properties::{Properties, PropertyValue};
