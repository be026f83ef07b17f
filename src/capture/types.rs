//! Core types for sample capture
//!
//! Defines the fundamental data structures used throughout the sampling
//! pipeline: screen-space geometry, raw pointer samples, and the cancellation
//! token the capture loops poll.

use crate::time::clock::Timestamp;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A 2D point in screen or frame coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangular region, as reported by the face/eye detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Region {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Region {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Center of the region. Eye regions are reported relative to their
    /// enclosing face region, so centers stay on the detector's own axis.
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Raw pointer-movement sample as delivered by a pointer source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerSample {
    /// Monotonic capture timestamp
    pub timestamp: Timestamp,
    /// Screen x coordinate
    pub x: f64,
    /// Screen y coordinate
    pub y: f64,
    /// Sequence number assigned by the transport producer
    pub sequence: u64,
}

impl PointerSample {
    /// Create a new sample. The sequence number is assigned when the sample
    /// enters the transport.
    pub fn new(x: f64, y: f64, timestamp: Timestamp) -> Self {
        Self {
            timestamp,
            x,
            y,
            sequence: 0,
        }
    }

    /// Sample position as a point.
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Cooperative cancellation token shared between a trial and its sampling
/// loops. Cloning shares the underlying flag; cancelling is one-way.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    /// Signal cancellation. Idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Checked by capture loops on every iteration.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
