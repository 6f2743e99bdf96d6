//! A background flusher thread that delivers pending events at a fixed interval and on demand.
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{RecvTimeoutError, SyncSender},
        Arc,
    },
    time::Duration,
};

use crate::event_delivery::EventDelivery;
use crate::event_queue::EventQueue;
use crate::{Error, Result};

/// Configuration for [`FlusherThread`].
pub struct FlusherThreadConfig {
    /// The queue to drain.
    pub queue: Arc<EventQueue>,
    /// The delivery pipeline to flush through.
    pub delivery: EventDelivery,
    /// Interval between scheduled flushes, independent of queue occupancy, so
    /// that low-traffic sessions still deliver within a bounded time.
    ///
    /// Defaults to [`FlusherThreadConfig::DEFAULT_FLUSH_INTERVAL`].
    pub interval: Duration,
}

impl FlusherThreadConfig {
    /// Default value for [`FlusherThreadConfig::interval`].
    pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(30);
}

/// The flush scheduler and single delivery worker.
///
/// All flushes — scheduled, size-triggered, and manual — execute on this one
/// thread, so a burst of concurrent `track` calls cannot each flush inline on
/// its caller's thread, and at most one batch is ever in flight.
///
/// Dropping the handle disconnects the wake channel and the thread exits on
/// its own; no in-flight network call is forcibly cancelled. Re-initializing
/// the SDK therefore deterministically replaces the previous scheduler:
/// dropping the old client cancels its thread before (or while) the new one
/// starts.
pub struct FlusherThread {
    join_handle: std::thread::JoinHandle<()>,

    /// Used to wake the flusher thread for a size-triggered or manual flush.
    wake_sender: SyncSender<()>,

    stop_flag: Arc<AtomicBool>,
}

impl FlusherThread {
    /// Starts the flusher thread.
    ///
    /// # Errors
    ///
    /// Returns an IO Error if the flusher thread failed to start.
    pub fn start(config: FlusherThreadConfig) -> std::io::Result<FlusherThread> {
        // Using `sync_channel` here as it makes `wake_sender` `Sync` (shareable between
        // threads). Buffer size of 1 is enough: a wake means "flush soon", and while one is
        // pending any further wake would flush the same events, so `try_send()` silently
        // dropping extras is exactly the coalescing we want.
        let (wake_sender, wake_receiver) = std::sync::mpsc::sync_channel::<()>(1);

        let stop_flag = Arc::new(AtomicBool::new(false));

        let join_handle = {
            let stop_flag = Arc::clone(&stop_flag);
            std::thread::Builder::new()
                .name("beacon-flusher".to_owned())
                .spawn(move || {
                    let FlusherThreadConfig {
                        queue,
                        delivery,
                        interval,
                    } = config;

                    loop {
                        match wake_receiver.recv_timeout(interval) {
                            // A wake is a size-triggered or manual flush request; a timeout
                            // is the scheduled flush. Both drain the same way.
                            Ok(()) | Err(RecvTimeoutError::Timeout) => {
                                let stopping = stop_flag.load(Ordering::Acquire);
                                if stopping {
                                    log::debug!(target: "beacon", "flusher thread stopping after a final flush");
                                }
                                delivery.flush(&queue);
                                if stopping {
                                    return;
                                }
                            }
                            Err(RecvTimeoutError::Disconnected) => {
                                // The owning client was dropped. Plain cancellation: whatever
                                // is still queued is lost, matching the no-persistence
                                // guarantee.
                                log::debug!(target: "beacon", "flusher thread received disconnected");
                                return;
                            }
                        }
                    }
                })?
        };

        Ok(FlusherThread {
            join_handle,
            wake_sender,
            stop_flag,
        })
    }

    /// Request a flush on the flusher thread.
    ///
    /// Never blocks and never flushes inline. If a wake is already pending,
    /// this request coalesces into it.
    pub fn request_flush(&self) {
        // Error means the buffer is full (a wake is already pending, which covers this
        // request) or the thread exited; neither needs handling.
        let _ = self.wake_sender.try_send(());
    }

    /// Stop the flusher thread after one final flush attempt.
    ///
    /// This function does not wait for the thread to actually stop.
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::Release);
        // If the buffer is full, a wake is already pending and the thread will observe the
        // stop flag when it fires.
        let _ = self.wake_sender.try_send(());
    }

    /// Stop the flusher thread and block waiting for it to exit.
    ///
    /// If you don't need to wait for the thread to exit, use
    /// [`FlusherThread::stop`] instead.
    ///
    /// # Errors
    ///
    /// - [`Error::FlusherThreadPanicked`] if the thread has panicked.
    pub fn shutdown(self) -> Result<()> {
        // Send stop signal in case it wasn't sent before.
        self.stop();

        self.join_handle
            .join()
            .map_err(|_| Error::FlusherThreadPanicked)?;

        Ok(())
    }
}
