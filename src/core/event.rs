use std::fmt::{Debug, Formatter};

use chrono::{DateTime, Utc};

use crate::ops::Interval;

/// Utility-announced peak event.
#[must_use]
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct PeakEvent {
    /// Inclusive.
    pub begin: DateTime<Utc>,

    /// Inclusive.
    pub end: DateTime<Utc>,
}

impl Debug for PeakEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}..={:?}", self.begin, self.end)
    }
}

impl PeakEvent {
    pub const fn new(begin: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { begin, end }
    }

    pub const fn interval(self) -> Interval {
        Interval { min: self.begin, max: self.end }
    }
}
