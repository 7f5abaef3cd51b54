//! Daily re-evaluation marks.

use chrono::{DateTime, Days, TimeDelta, Utc};
use chrono_tz::Tz;
use itertools::Itertools;

use crate::core::{
    calendar::{local_date, localize},
    definition::{TimeOfDay, definitions_for},
    period::PeriodType,
};

/// Every distinct boundary of every period definition, in chronological order.
#[must_use]
pub fn extract_trigger_times() -> Vec<TimeOfDay> {
    PeriodType::PRECEDENCE
        .into_iter()
        .flat_map(definitions_for)
        .flat_map(|definition| [definition.begin, definition.end])
        .sorted()
        .dedup()
        .collect()
}

/// Daily cron expression firing at the time.
#[must_use]
pub fn cron_expression(time: TimeOfDay) -> String {
    format!("{} {} * * *", time.minute, time.hour)
}

/// Earliest trigger instant strictly after `now`.
///
/// `triggers` must be sorted. Each trigger fires `delay` after the mark, so that inclusive
/// boundaries get evaluated on the side of the period that has just started.
#[must_use]
pub fn next_trigger_after(
    now: DateTime<Utc>,
    timezone: Tz,
    triggers: &[TimeOfDay],
    delay: TimeDelta,
) -> Option<DateTime<Utc>> {
    let today = local_date(now, timezone);
    (0..=2)
        .filter_map(|n_days| today.checked_add_days(Days::new(n_days)))
        .flat_map(|date| triggers.iter().filter_map(move |trigger| trigger.on(date)))
        .filter_map(|naive| localize(naive, timezone))
        .map(|instant| instant + delay)
        .find(|instant| *instant > now)
}
