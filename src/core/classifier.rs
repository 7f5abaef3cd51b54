use chrono::{DateTime, TimeDelta, Utc};
use chrono_tz::Tz;
use enumset::EnumSet;

use crate::{
    core::{
        calendar::{local_date, localize},
        definition::{PeriodDefinition, TimeOfDay, definitions_for},
        event::PeakEvent,
        period::PeriodType,
        season,
    },
    ops::Interval,
    prelude::*,
};

/// Maximum distance between a lead-in window and the peak event it leads into.
pub const ANCHOR_WINDOW: TimeDelta = TimeDelta::hours(12);

#[must_use]
#[derive(Copy, Clone, Debug)]
pub struct Classifier {
    timezone: Tz,
}

impl Classifier {
    pub const fn new(timezone: Tz) -> Self {
        Self { timezone }
    }

    /// Period the instant belongs to, if any.
    ///
    /// Periods never overlap here: the first matching period in precedence order wins.
    #[must_use]
    pub fn classify(&self, now: DateTime<Utc>, events: &[PeakEvent]) -> Option<PeriodType> {
        if !season::contains(now, self.timezone) {
            debug!(%now, "out of season");
            return None;
        }
        let period =
            PeriodType::PRECEDENCE.into_iter().find(|period| self.matches(now, events, *period));
        debug!(%now, n_events = events.len(), ?period, "classified");
        period
    }

    #[must_use]
    pub fn is_within_period(
        &self,
        now: DateTime<Utc>,
        events: &[PeakEvent],
        period: PeriodType,
    ) -> bool {
        self.classify(now, events) == Some(period)
    }

    /// All periods whose own windows match the instant, ignoring the precedence.
    #[must_use]
    pub fn raw_matches(&self, now: DateTime<Utc>, events: &[PeakEvent]) -> EnumSet<PeriodType> {
        if !season::contains(now, self.timezone) {
            return EnumSet::empty();
        }
        PeriodType::PRECEDENCE
            .into_iter()
            .filter(|period| self.matches(now, events, *period))
            .collect()
    }

    fn matches(&self, now: DateTime<Utc>, events: &[PeakEvent], period: PeriodType) -> bool {
        match period {
            PeriodType::Peak => events.iter().any(|event| event.interval().contains(now)),
            PeriodType::PrePeak | PeriodType::PrePrePeak => definitions_for(period)
                .into_iter()
                .filter_map(|definition| self.actualize(now, definition))
                .filter(|window| window.contains(now))
                .any(|window| events.iter().any(|event| is_anchored(window, event))),
        }
    }

    /// Project the definition onto the local calendar date of the instant.
    ///
    /// A window ending at midnight ends at the start of the next day.
    #[must_use]
    pub fn actualize(&self, now: DateTime<Utc>, definition: PeriodDefinition) -> Option<Interval> {
        let date = local_date(now, self.timezone);
        let lower = definition.begin.on(date)?;
        let upper = if definition.end == TimeOfDay::MIDNIGHT {
            TimeOfDay::MIDNIGHT.on(date.succ_opt()?)?
        } else {
            definition.end.on(date)?
        };
        Some(Interval::from_std(localize(lower, self.timezone)?..=localize(upper, self.timezone)?))
    }
}

/// Whether the window plausibly leads into the event.
fn is_anchored(window: Interval, event: &PeakEvent) -> bool {
    (window.min < event.begin)
        && (event.begin - window.min <= ANCHOR_WINDOW)
        && (window.max <= event.end)
        && (event.end - window.max <= ANCHOR_WINDOW)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use chrono_tz::America::New_York;

    use super::{PeriodType::*, *};

    const CLASSIFIER: Classifier = Classifier::new(New_York);

    fn at(rfc3339: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(rfc3339).unwrap().with_timezone(&Utc)
    }

    fn event(begin: &str, end: &str) -> PeakEvent {
        PeakEvent::new(at(begin), at(end))
    }

    /// Five CPC-D events of January 2025.
    fn sample_events() -> Vec<PeakEvent> {
        vec![
            event("2025-01-16T11:00:00+00:00", "2025-01-16T14:00:00+00:00"), // 6–9 AM
            event("2025-01-20T21:00:00+00:00", "2025-01-21T01:00:00+00:00"), // 4–8 PM
            event("2025-01-22T11:00:00+00:00", "2025-01-22T14:00:00+00:00"), // 6–9 AM
            event("2025-01-22T21:00:00+00:00", "2025-01-23T01:00:00+00:00"), // 4–8 PM
            event("2025-01-23T11:00:00+00:00", "2025-01-23T14:00:00+00:00"), // 6–9 AM
        ]
    }

    fn assert_verdicts(events: &[PeakEvent], cases: &[(&str, Option<PeriodType>)]) {
        for (now, expected) in cases {
            let now = at(now);
            assert_eq!(CLASSIFIER.classify(now, events), *expected, "{now}");
            for period in PeriodType::PRECEDENCE {
                assert_eq!(
                    CLASSIFIER.is_within_period(now, events, period),
                    *expected == Some(period),
                    "{now} {period}",
                );
            }
        }
    }

    #[test]
    fn peak_pm_ok() {
        assert_verdicts(
            &sample_events(),
            &[
                ("2025-01-20T16:00:00-05:00", Some(Peak)),
                ("2025-01-20T17:00:00-05:00", Some(Peak)),
                ("2025-01-20T20:00:00-05:00", Some(Peak)),
            ],
        );
    }

    #[test]
    fn peak_end_is_inclusive_to_the_millisecond() {
        let events = [event("2025-01-20T21:00:00Z", "2025-01-21T01:00:00Z")];
        let now = at("2025-01-20T20:00:00.000-05:00");
        assert!(CLASSIFIER.is_within_period(now, &events, Peak));
        assert!(!CLASSIFIER.is_within_period(now + Duration::milliseconds(1), &events, Peak));
    }

    #[test]
    fn peak_am_single_event_ok() {
        let events = [event("2025-01-16T11:00:00+00:00", "2025-01-16T14:00:00+00:00")];
        assert_verdicts(
            &events,
            &[
                ("2025-01-16T06:00:00-05:00", Some(Peak)),
                ("2025-01-16T07:00:00-05:00", Some(Peak)),
                ("2025-01-16T09:00:00-05:00", Some(Peak)),
            ],
        );
    }

    #[test]
    fn peak_suppresses_lead_in_periods() {
        assert_verdicts(&sample_events(), &[("2025-01-22T07:00:00-05:00", Some(Peak))]);
        assert_eq!(
            CLASSIFIER.raw_matches(at("2025-01-22T07:00:00-05:00"), &sample_events()),
            Peak | PrePrePeak,
        );
    }

    #[test]
    fn pre_peak_suppresses_pre_pre_peak() {
        let now = at("2025-01-22T10:00:00-05:00");
        assert_eq!(CLASSIFIER.raw_matches(now, &sample_events()), PrePeak | PrePrePeak);
        assert_eq!(CLASSIFIER.classify(now, &sample_events()), Some(PrePeak));
    }

    #[test]
    fn hourly_timeline_ok() {
        assert_verdicts(
            &sample_events(),
            &[
                ("2025-01-21T23:00:00-05:00", Some(PrePrePeak)),
                ("2025-01-22T00:00:00-05:00", Some(PrePeak)),
                ("2025-01-22T01:00:00-05:00", Some(PrePeak)),
                ("2025-01-22T02:00:00-05:00", Some(PrePeak)),
                ("2025-01-22T03:00:00-05:00", Some(PrePeak)),
                ("2025-01-22T04:00:00-05:00", Some(PrePeak)),
                ("2025-01-22T05:00:00-05:00", Some(PrePeak)),
                ("2025-01-22T06:00:00-05:00", Some(Peak)),
                ("2025-01-22T07:00:00-05:00", Some(Peak)),
                ("2025-01-22T08:00:00-05:00", Some(Peak)),
                ("2025-01-22T09:00:00-05:00", Some(Peak)),
                ("2025-01-22T10:00:00-05:00", Some(PrePeak)),
                ("2025-01-22T11:00:00-05:00", Some(PrePeak)),
                ("2025-01-22T12:00:00-05:00", Some(PrePeak)),
                ("2025-01-22T13:00:00-05:00", Some(PrePeak)),
                ("2025-01-22T14:00:00-05:00", Some(PrePeak)),
                ("2025-01-22T15:00:00-05:00", Some(PrePeak)),
                ("2025-01-22T16:00:00-05:00", Some(Peak)),
                ("2025-01-22T17:00:00-05:00", Some(Peak)),
                ("2025-01-22T18:00:00-05:00", Some(Peak)),
                ("2025-01-22T19:00:00-05:00", Some(Peak)),
                ("2025-01-22T20:00:00-05:00", Some(Peak)),
                ("2025-01-22T21:00:00-05:00", Some(PrePrePeak)),
                ("2025-01-22T22:00:00-05:00", Some(PrePrePeak)),
                ("2025-01-22T23:00:00-05:00", Some(PrePrePeak)),
                ("2025-01-23T00:00:00-05:00", Some(PrePeak)),
            ],
        );
    }

    #[test]
    fn minute_boundaries_ok() {
        assert_verdicts(
            &sample_events(),
            &[
                ("2025-01-22T06:01:00-05:00", Some(Peak)),
                ("2025-01-22T08:59:00-05:00", Some(Peak)),
                ("2025-01-22T09:01:00-05:00", Some(PrePrePeak)),
                ("2025-01-22T09:59:00-05:00", Some(PrePrePeak)),
                ("2025-01-22T10:01:00-05:00", Some(PrePeak)),
                ("2025-01-22T13:59:00-05:00", Some(PrePeak)),
                ("2025-01-22T14:01:00-05:00", Some(PrePeak)),
                ("2025-01-22T15:59:00-05:00", Some(PrePeak)),
                ("2025-01-22T16:01:00-05:00", Some(Peak)),
                ("2025-01-22T19:59:00-05:00", Some(Peak)),
                ("2025-01-22T20:01:00-05:00", None),
            ],
        );
    }

    #[test]
    fn millisecond_boundaries_ok() {
        assert_verdicts(
            &sample_events(),
            &[
                ("2025-01-22T05:59:59.000-05:00", Some(PrePeak)),
                ("2025-01-22T05:59:59.001-05:00", Some(PrePeak)),
                ("2025-01-22T05:59:59.999-05:00", Some(PrePeak)),
                ("2025-01-22T06:00:00.000-05:00", Some(Peak)),
                ("2025-01-22T06:00:00.001-05:00", Some(Peak)),
                ("2025-01-22T06:00:00.999-05:00", Some(Peak)),
                ("2025-01-22T08:59:59.999-05:00", Some(Peak)),
                ("2025-01-22T09:00:00.000-05:00", Some(Peak)),
                ("2025-01-22T09:00:00.001-05:00", Some(PrePrePeak)),
                ("2025-01-22T09:00:00.999-05:00", Some(PrePrePeak)),
            ],
        );
    }

    #[test]
    fn lead_in_without_nearby_event_is_not_reported() {
        assert_verdicts(
            &sample_events(),
            &[
                // The only event on 1/20 starts at 4 PM, more than 12 hours later:
                ("2025-01-20T05:00:00-05:00", None),
                ("2025-01-20T08:00:00-05:00", Some(PrePrePeak)),
                ("2025-01-20T15:00:00-05:00", Some(PrePeak)),
                // No events on 1/21 at all, only the evening lead-in to 1/22:
                ("2025-01-21T10:00:00-05:00", None),
                ("2025-01-21T22:00:00-05:00", Some(PrePrePeak)),
                // Morning-only day, nothing leads into an afternoon peak:
                ("2025-01-23T09:30:00-05:00", None),
            ],
        );
    }

    #[test]
    fn out_of_season_is_never_reported() {
        let events = [event("2025-06-16T20:00:00Z", "2025-06-17T00:00:00Z")];
        for now in ["2025-06-16T12:00:00-04:00", "2025-06-16T17:00:00-04:00"] {
            let now = at(now);
            assert!(CLASSIFIER.raw_matches(now, &events).is_empty(), "{now}");
            assert_eq!(CLASSIFIER.classify(now, &events), None, "{now}");
        }
    }

    #[test]
    fn empty_events_are_never_reported() {
        let start = at("2025-01-22T00:00:00-05:00");
        for minutes in (0..24 * 60).step_by(15) {
            assert_eq!(CLASSIFIER.classify(start + Duration::minutes(minutes), &[]), None);
        }
    }

    #[test]
    fn at_most_one_period_at_a_time() {
        let events = sample_events();
        let start = at("2025-01-15T00:00:00-05:00");
        for minutes in (0..9 * 24 * 60).step_by(5) {
            let now = start + Duration::minutes(minutes);
            let n_active = PeriodType::PRECEDENCE
                .into_iter()
                .filter(|period| CLASSIFIER.is_within_period(now, &events, *period))
                .count();
            assert!(n_active <= 1, "{now}");
        }
    }

    #[test]
    fn actualize_midnight_end_rolls_over() {
        let [evening, _] = definitions_for(PrePrePeak);
        let window = CLASSIFIER.actualize(at("2025-01-22T22:00:00-05:00"), evening).unwrap();
        assert_eq!(window.min, New_York.with_ymd_and_hms(2025, 1, 22, 21, 0, 0).unwrap());
        assert_eq!(window.max, New_York.with_ymd_and_hms(2025, 1, 23, 0, 0, 0).unwrap());
    }

    #[test]
    fn actualize_uses_local_date() {
        let [_, afternoon] = definitions_for(PrePeak);

        // Still January 20 in Montréal:
        let window = CLASSIFIER.actualize(at("2025-01-21T03:00:00Z"), afternoon).unwrap();
        assert_eq!(window.min, New_York.with_ymd_and_hms(2025, 1, 20, 10, 0, 0).unwrap());
        assert_eq!(window.max, New_York.with_ymd_and_hms(2025, 1, 20, 16, 0, 0).unwrap());
    }
}
