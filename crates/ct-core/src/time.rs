//! Event time.
//!
//! Simulation events are stamped with seconds since midnight of the
//! simulated day.  Values past 24 h are legal (tours running over midnight)
//! and are displayed as `25:30:00` rather than wrapped.

use std::fmt;

/// Seconds since simulation midnight.
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EventTime(pub f64);

impl EventTime {
    pub const ZERO: EventTime = EventTime(0.0);

    #[inline]
    pub fn seconds(self) -> f64 {
        self.0
    }

    /// Split into whole `(hours, minutes, seconds)`.  Fractions are dropped;
    /// negative times clamp to zero.
    pub fn hms(self) -> (u64, u32, u32) {
        let total = self.0.max(0.0) as u64;
        let hours = total / 3_600;
        let minutes = ((total % 3_600) / 60) as u32;
        let seconds = (total % 60) as u32;
        (hours, minutes, seconds)
    }
}

impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (h, m, s) = self.hms();
        write!(f, "{h:02}:{m:02}:{s:02}")
    }
}
