//! Daily period windows in local wall-clock time, independent of any date.

use chrono::{NaiveDate, NaiveDateTime};
use derive_more::Display;
use serde::Deserialize;

use crate::core::period::PeriodType;

#[derive(Copy, Clone, Debug, Display, Eq, PartialEq, Hash, Deserialize)]
pub enum ScheduleTag {
    #[display("AM")]
    #[serde(rename = "AM")]
    Am,

    #[display("PM")]
    #[serde(rename = "PM")]
    Pm,
}

/// Hour and minute of a day, ordered chronologically.
#[derive(Copy, Clone, Debug, Display, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[display("{hour:02}:{minute:02}")]
pub struct TimeOfDay {
    pub hour: u32,
    pub minute: u32,
}

impl TimeOfDay {
    pub const MIDNIGHT: Self = Self::new(0, 0);

    pub const fn new(hour: u32, minute: u32) -> Self {
        assert!(hour < 24, "hour must be within 0..=23");
        assert!(minute < 60, "minute must be within 0..=59");
        Self { hour, minute }
    }

    /// Project the time onto the specific date, with zero seconds.
    #[must_use]
    pub fn on(self, date: NaiveDate) -> Option<NaiveDateTime> {
        date.and_hms_opt(self.hour, self.minute, 0)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PeriodDefinition {
    pub tag: ScheduleTag,
    pub begin: TimeOfDay,

    /// Midnight means the end of the day, when used as an upper bound.
    pub end: TimeOfDay,
}

impl PeriodDefinition {
    const fn new(tag: ScheduleTag, begin: (u32, u32), end: (u32, u32)) -> Self {
        Self { tag, begin: TimeOfDay::new(begin.0, begin.1), end: TimeOfDay::new(end.0, end.1) }
    }
}

const PEAK: [PeriodDefinition; 2] = [
    PeriodDefinition::new(ScheduleTag::Am, (6, 0), (9, 0)),
    PeriodDefinition::new(ScheduleTag::Pm, (16, 0), (20, 0)),
];

const PRE_PEAK: [PeriodDefinition; 2] = [
    PeriodDefinition::new(ScheduleTag::Am, (0, 0), (6, 0)),
    PeriodDefinition::new(ScheduleTag::Pm, (10, 0), (16, 0)),
];

/// The AM window is the evening lead-in to the next morning's peak.
const PRE_PRE_PEAK: [PeriodDefinition; 2] = [
    PeriodDefinition::new(ScheduleTag::Am, (21, 0), (0, 0)),
    PeriodDefinition::new(ScheduleTag::Pm, (7, 0), (10, 0)),
];

#[must_use]
pub const fn definitions_for(period: PeriodType) -> [PeriodDefinition; 2] {
    match period {
        PeriodType::Peak => PEAK,
        PeriodType::PrePeak => PRE_PEAK,
        PeriodType::PrePrePeak => PRE_PRE_PEAK,
    }
}
