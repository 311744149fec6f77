//! Market data publisher.
//!
//! Decouples the matching thread from slow market-data consumers with a
//! bounded lock-free ring. The matching thread is the only producer; a
//! single consumer thread drains the ring and delivers to a user callback.
//! `publish_trade` never blocks: on a full ring the event is dropped and
//! counted.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_queue::ArrayQueue;
use tickmatch_types::constants::DEFAULT_PUBLISHER_QUEUE_CAPACITY;
use tickmatch_types::TradeEvent;
use tracing::debug;

const EMPTY_POLL_SLEEP: Duration = Duration::from_micros(10);

/// Wait-free trade feed over a bounded power-of-two ring.
pub struct MarketDataPublisher {
    queue: Arc<ArrayQueue<TradeEvent>>,
    running: Arc<AtomicBool>,
    events_published: AtomicU64,
    events_dropped: AtomicU64,
    consumer: Option<JoinHandle<()>>,
}

impl MarketDataPublisher {
    /// `capacity` is rounded up to the next power of two.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(2).next_power_of_two();
        Self {
            queue: Arc::new(ArrayQueue::new(capacity)),
            running: Arc::new(AtomicBool::new(false)),
            events_published: AtomicU64::new(0),
            events_dropped: AtomicU64::new(0),
            consumer: None,
        }
    }

    /// Spawn the consumer thread. No-op if already running.
    pub fn start<F>(&mut self, mut callback: F)
    where
        F: FnMut(TradeEvent) + Send + 'static,
    {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }

        let queue = Arc::clone(&self.queue);
        let running = Arc::clone(&self.running);

        self.consumer = Some(std::thread::spawn(move || {
            while running.load(Ordering::Acquire) {
                match queue.pop() {
                    Some(event) => callback(event),
                    None => std::thread::sleep(EMPTY_POLL_SLEEP),
                }
            }
            // Drain whatever the producer managed to enqueue before stop.
            while let Some(event) = queue.pop() {
                callback(event);
            }
            debug!("market data consumer drained and stopped");
        }));
    }

    /// Stop the consumer, draining the ring first. No-op if not running.
    pub fn stop(&mut self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Some(handle) = self.consumer.take() {
            let _ = handle.join();
        }
    }

    /// Enqueue a trade for the consumer. Returns `false` (and counts a
    /// drop) when the publisher is stopped or the ring is full.
    pub fn publish_trade(&self, event: &TradeEvent) -> bool {
        if !self.running.load(Ordering::Acquire) {
            self.events_dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        }
        if self.queue.push(event.clone()).is_err() {
            self.events_dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        }
        self.events_published.fetch_add(1, Ordering::Relaxed);
        true
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn events_dropped(&self) -> u64 {
        self.events_dropped.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }
}

impl Default for MarketDataPublisher {
    fn default() -> Self {
        Self::new(DEFAULT_PUBLISHER_QUEUE_CAPACITY)
    }
}

impl Drop for MarketDataPublisher {
    fn drop(&mut self) {
        self.stop();
    }
}
