use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Calendar date of the instant in the local civil calendar.
#[must_use]
pub fn local_date(instant: DateTime<Utc>, timezone: Tz) -> NaiveDate {
    instant.with_timezone(&timezone).date_naive()
}

/// Resolve the local wall-clock time into an absolute instant.
///
/// Ambiguous times resolve to the earliest mapping, non-existent ones to `None`.
#[must_use]
pub fn localize(naive: NaiveDateTime, timezone: Tz) -> Option<DateTime<Utc>> {
    timezone.from_local_datetime(&naive).earliest().map(|local| local.with_timezone(&Utc))
}
