//! Monotonic timebase
//!
//! Provides nanosecond-precision timestamps against a process-local anchor.
//! Raw tick values are captured on the hot sampling path and converted to
//! human-readable units lazily. The anchor is initialized once on first use,
//! so ordering is consistent across the pointer, camera, and timer threads.

use std::sync::OnceLock;
use std::time::Instant;

/// Global clock anchor, initialized once at startup.
static ANCHOR: OnceLock<Instant> = OnceLock::new();

/// Process-local monotonic clock.
///
/// This struct provides:
/// - Nanosecond precision timestamps
/// - Monotonic guarantees (time never goes backward)
/// - Zero-overhead storage (raw nanosecond ticks, no conversion on capture)
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock;

impl MonotonicClock {
    /// Anchor the clock. Optional; the first timestamp capture anchors it
    /// implicitly. Calling this at startup keeps early timestamps small.
    pub fn init() {
        ANCHOR.get_or_init(Instant::now);
    }

    /// Nanoseconds elapsed since the anchor.
    #[inline]
    pub fn now_nanos() -> u64 {
        let anchor = ANCHOR.get_or_init(Instant::now);
        anchor.elapsed().as_nanos() as u64
    }
}

/// A timestamp wrapper storing raw nanosecond ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Create a timestamp from raw nanosecond ticks.
    #[inline]
    pub const fn from_nanos(nanos: u64) -> Self {
        Self(nanos)
    }

    /// Create a timestamp from seconds on the clock's own axis.
    /// Negative inputs clamp to zero.
    #[inline]
    pub fn from_secs_f64(secs: f64) -> Self {
        Self((secs.max(0.0) * 1_000_000_000.0) as u64)
    }

    /// Capture the current timestamp.
    #[inline]
    pub fn now() -> Self {
        Self(MonotonicClock::now_nanos())
    }

    /// Raw nanosecond tick value.
    #[inline]
    pub const fn as_nanos(&self) -> u64 {
        self.0
    }

    /// Convert to milliseconds.
    #[inline]
    pub const fn as_millis(&self) -> u64 {
        self.0 / 1_000_000
    }

    /// Calculate the duration since another timestamp. Saturates to zero
    /// when `earlier` is not actually earlier.
    #[inline]
    pub fn duration_since(&self, earlier: Timestamp) -> Duration {
        Duration::from_nanos(self.0.saturating_sub(earlier.0))
    }

    /// Check if this timestamp is strictly after another.
    #[inline]
    pub fn is_after(&self, other: Timestamp) -> bool {
        self.0 > other.0
    }
}

impl serde::Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Serialize as raw ticks for maximum precision
        serializer.serialize_u64(self.0)
    }
}

impl<'de> serde::Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let nanos = u64::deserialize(deserializer)?;
        Ok(Timestamp(nanos))
    }
}

/// A duration wrapper using raw nanosecond ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Duration(u64);

impl Duration {
    /// Create a duration from nanoseconds.
    #[inline]
    pub const fn from_nanos(nanos: u64) -> Self {
        Self(nanos)
    }

    /// Create a duration from milliseconds.
    #[inline]
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis * 1_000_000)
    }

    /// Create a duration from whole seconds.
    #[inline]
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs * 1_000_000_000)
    }

    /// Create a duration from fractional seconds. Negative inputs clamp
    /// to zero.
    #[inline]
    pub fn from_secs_f64(secs: f64) -> Self {
        Self((secs.max(0.0) * 1_000_000_000.0) as u64)
    }

    /// Raw nanosecond tick count.
    #[inline]
    pub const fn as_nanos(&self) -> u64 {
        self.0
    }

    /// Convert to milliseconds.
    #[inline]
    pub const fn as_millis(&self) -> u64 {
        self.0 / 1_000_000
    }

    /// Convert to seconds as f64.
    #[inline]
    pub fn as_secs_f64(&self) -> f64 {
        self.0 as f64 / 1_000_000_000.0
    }

    /// Convert to a std duration for sleep/wait APIs.
    #[inline]
    pub const fn as_std(&self) -> std::time::Duration {
        std::time::Duration::from_nanos(self.0)
    }

    /// Zero duration.
    pub const ZERO: Duration = Duration(0);
}

impl serde::Serialize for Duration {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Serialize as raw ticks for maximum precision
        serializer.serialize_u64(self.0)
    }
}

impl<'de> serde::Deserialize<'de> for Duration {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let nanos = u64::deserialize(deserializer)?;
        Ok(Duration(nanos))
    }
}

impl std::ops::Add for Duration {
    type Output = Duration;

    fn add(self, rhs: Self) -> Self::Output {
        Duration(self.0.saturating_add(rhs.0))
    }
}

impl std::ops::Sub for Duration {
    type Output = Duration;

    fn sub(self, rhs: Self) -> Self::Output {
        Duration(self.0.saturating_sub(rhs.0))
    }
}
