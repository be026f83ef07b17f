//! Lock-Free Ring Buffer for Pointer Samples
//!
//! This module implements a lock-free SPSC (Single Producer, Single Consumer)
//! ring buffer connecting a pointer source to the trial pipeline.
//!
//! Architecture:
//! - Producer (pointer source thread): never blocks, pushes samples at the
//!   source's cadence, drops on overflow
//! - Consumer (trial feed loop): drains in batches and forwards to the
//!   controller
//!
//! The design uses the `rtrb` crate for the core ring buffer implementation,
//! with sequence numbering and drop/occupancy statistics layered on top.

use super::types::PointerSample;
use rtrb::{Consumer, Producer, RingBuffer};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Default ring buffer capacity (must be power of 2)
pub const DEFAULT_CAPACITY: usize = 4096;

/// Lock-free ring buffer for pointer samples
pub struct SampleRingBuffer {
    producer: Option<Producer<PointerSample>>,
    consumer: Option<Consumer<PointerSample>>,
    /// Sequence counter for sample ordering
    sequence: AtomicU64,
    stats: Arc<RingBufferStats>,
    capacity: usize,
}

/// Ring buffer statistics for monitoring
#[derive(Debug, Default)]
pub struct RingBufferStats {
    /// Total samples pushed
    pub samples_pushed: AtomicU64,
    /// Samples dropped due to full buffer
    pub samples_dropped: AtomicU64,
    /// Samples successfully consumed
    pub samples_consumed: AtomicU64,
    /// Peak buffer occupancy
    pub peak_occupancy: AtomicU64,
}

impl SampleRingBuffer {
    /// Create a new ring buffer with default capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a new ring buffer with specified capacity
    ///
    /// # Panics
    /// Panics if capacity is not a power of 2
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(
            capacity.is_power_of_two(),
            "Ring buffer capacity must be a power of 2"
        );

        let (producer, consumer) = RingBuffer::new(capacity);

        Self {
            producer: Some(producer),
            consumer: Some(consumer),
            sequence: AtomicU64::new(0),
            stats: Arc::new(RingBufferStats::default()),
            capacity,
        }
    }

    /// Split the ring buffer into producer and consumer halves.
    ///
    /// Called once to hand the producer to the pointer source and the
    /// consumer to the trial feed loop.
    pub fn split(mut self) -> (SampleProducer, SampleConsumer) {
        let producer = self.producer.take().expect("Producer already taken");
        let consumer = self.consumer.take().expect("Consumer already taken");

        (
            SampleProducer {
                inner: producer,
                sequence: Arc::new(self.sequence),
                stats: Arc::clone(&self.stats),
                capacity: self.capacity,
            },
            SampleConsumer {
                inner: consumer,
                stats: Arc::clone(&self.stats),
            },
        )
    }

    /// Get statistics
    pub fn stats(&self) -> Arc<RingBufferStats> {
        Arc::clone(&self.stats)
    }
}

impl Default for SampleRingBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Producer half of the ring buffer (for the pointer source thread)
pub struct SampleProducer {
    inner: Producer<PointerSample>,
    sequence: Arc<AtomicU64>,
    stats: Arc<RingBufferStats>,
    capacity: usize,
}

impl SampleProducer {
    /// Push a sample into the ring buffer.
    ///
    /// Lock-free, never blocks. If the buffer is full, the sample is dropped
    /// and the drop counter is incremented. The producer stamps the sample's
    /// sequence number.
    ///
    /// Returns true if the sample was pushed, false if dropped.
    #[inline]
    pub fn push(&mut self, mut sample: PointerSample) -> bool {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        sample.sequence = sequence;

        match self.inner.push(sample) {
            Ok(()) => {
                self.stats.samples_pushed.fetch_add(1, Ordering::Relaxed);

                // Update peak occupancy
                let occupied = self.capacity - self.inner.slots();
                let mut peak = self.stats.peak_occupancy.load(Ordering::Relaxed);
                while occupied as u64 > peak {
                    match self.stats.peak_occupancy.compare_exchange_weak(
                        peak,
                        occupied as u64,
                        Ordering::Relaxed,
                        Ordering::Relaxed,
                    ) {
                        Ok(_) => break,
                        Err(p) => peak = p,
                    }
                }

                true
            }
            Err(_) => {
                self.stats.samples_dropped.fetch_add(1, Ordering::Relaxed);
                // Roll back sequence number so consumed sequences stay dense
                self.sequence.fetch_sub(1, Ordering::Relaxed);
                false
            }
        }
    }

    /// Check available slots without pushing
    #[inline]
    pub fn available_slots(&self) -> usize {
        self.inner.slots()
    }

    /// Check if buffer is full
    #[inline]
    pub fn is_full(&self) -> bool {
        self.inner.is_full()
    }

    /// Get current sequence number
    #[inline]
    pub fn sequence(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }
}

/// Consumer half of the ring buffer (for the trial feed loop)
pub struct SampleConsumer {
    inner: Consumer<PointerSample>,
    stats: Arc<RingBufferStats>,
}

impl SampleConsumer {
    /// Pop a sample from the ring buffer.
    #[inline]
    pub fn pop(&mut self) -> Option<PointerSample> {
        match self.inner.pop() {
            Ok(sample) => {
                self.stats.samples_consumed.fetch_add(1, Ordering::Relaxed);
                Some(sample)
            }
            Err(_) => None,
        }
    }

    /// Peek at the next sample without removing it
    #[inline]
    pub fn peek(&self) -> Option<&PointerSample> {
        self.inner.peek().ok()
    }

    /// Check if there are samples available
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Get number of available samples
    #[inline]
    pub fn available(&self) -> usize {
        self.inner.slots()
    }

    /// Pop multiple samples at once (batch processing)
    pub fn pop_batch(&mut self, max_count: usize) -> Vec<PointerSample> {
        let mut batch = Vec::with_capacity(max_count);
        for _ in 0..max_count {
            if let Some(sample) = self.pop() {
                batch.push(sample);
            } else {
                break;
            }
        }
        batch
    }
}
