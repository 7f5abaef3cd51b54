//! Winter peak program season.

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::{
    core::calendar::{local_date, localize},
    ops::Interval,
};

/// Month and day the season starts at, 00:00:00 local.
const START: (u32, u32) = (12, 1);

/// Month and day the season ends at, 23:59:59 local of the next year.
///
/// April has 30 days, the day overflows into May 1.
const END: (u32, u32) = (4, 31);

/// Season window containing, or following, the local date of the instant.
#[must_use]
pub fn window(now: DateTime<Utc>, timezone: Tz) -> Option<Interval> {
    let today = local_date(now, timezone);
    let winter_year = if today.month() >= START.0 { today.year() } else { today.year() - 1 };
    let start = overflowing_date(winter_year, START)?.and_hms_opt(0, 0, 0)?;
    let end = overflowing_date(winter_year + 1, END)?.and_hms_opt(23, 59, 59)?;
    Some(Interval::from_std(localize(start, timezone)?..=localize(end, timezone)?))
}

#[must_use]
pub fn contains(now: DateTime<Utc>, timezone: Tz) -> bool {
    window(now, timezone).is_some_and(|window| window.contains(now))
}

/// Build the date letting the day overflow into the following month.
fn overflowing_date(year: i32, (month, day): (u32, u32)) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)?.checked_add_days(Days::new(u64::from(day) - 1))
}
