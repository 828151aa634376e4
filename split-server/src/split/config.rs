//! Scan configuration for the split-ticket engine.

use std::time::Duration;

/// Hard upper bound on split points; options grow as `2^n`.
pub const MAX_SPLIT_POINTS: usize = 16;

/// Configuration parameters for one split scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Maximum number of pricing calls in flight at once.
    pub max_concurrent: usize,

    /// Timeout for a single pricing call (seconds).
    /// A call that takes longer leaves its segment unpriced.
    pub call_timeout_secs: u64,

    /// How far a returned alternative's departure may drift from the
    /// segment's own departure and still count as the same train (seconds).
    pub departure_tolerance_secs: i64,

    /// Maximum number of split points considered, never more than
    /// [`MAX_SPLIT_POINTS`]. Segment queries grow quadratically with this.
    pub max_split_points: usize,
}

impl ScanConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(
        max_concurrent: usize,
        call_timeout_secs: u64,
        departure_tolerance_secs: i64,
        max_split_points: usize,
    ) -> Self {
        Self {
            max_concurrent,
            call_timeout_secs,
            departure_tolerance_secs,
            max_split_points,
        }
    }

    /// The split-point cap, clamped to [`MAX_SPLIT_POINTS`].
    pub fn split_point_limit(&self) -> usize {
        self.max_split_points.min(MAX_SPLIT_POINTS)
    }

    /// Returns the per-call timeout as a Duration.
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    /// Returns the departure tolerance as a chrono Duration.
    pub fn departure_tolerance(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.departure_tolerance_secs)
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 3,
            call_timeout_secs: 20,
            departure_tolerance_secs: 60,
            max_split_points: 8,
        }
    }
}
