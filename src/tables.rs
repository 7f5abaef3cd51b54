use chrono::{DateTime, TimeDelta, Utc};
use chrono_tz::Tz;
use comfy_table::{Attribute, Cell, Color, Table, modifiers, presets};

use crate::core::{
    classifier::Classifier,
    definition::{TimeOfDay, definitions_for},
    event::PeakEvent,
    period::PeriodType,
    trigger::{cron_expression, next_trigger_after},
};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
        .enforce_styling();
    table
}

pub fn build_events_table(events: &[PeakEvent], timezone: Tz) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Date", "Begin", "End", "Duration"]);
    for event in events {
        let begin = event.begin.with_timezone(&timezone);
        let end = event.end.with_timezone(&timezone);
        table.add_row(vec![
            Cell::new(begin.format("%a %b %d")).add_attribute(Attribute::Dim),
            Cell::new(begin.format("%H:%M")),
            Cell::new(end.format("%H:%M")),
            Cell::new(humantime::format_duration(
                (event.end - event.begin).to_std().unwrap_or_default(),
            ))
            .add_attribute(Attribute::Dim),
        ]);
    }
    table
}

pub fn build_verdicts_table(
    classifier: &Classifier,
    now: DateTime<Utc>,
    events: &[PeakEvent],
) -> Table {
    let raw_matches = classifier.raw_matches(now, events);
    let mut table = new_table();
    table.set_header(vec!["Period", "Windows", "Raw match", "Active"]);
    for period in PeriodType::PRECEDENCE {
        let windows = definitions_for(period)
            .map(|definition| format!("{} {}–{}", definition.tag, definition.begin, definition.end))
            .join(", ");
        let is_active = classifier.is_within_period(now, events, period);
        table.add_row(vec![
            Cell::new(period),
            Cell::new(windows).add_attribute(Attribute::Dim),
            Cell::new(if raw_matches.contains(period) { "yes" } else { "no" }),
            Cell::new(if is_active { "ON" } else { "OFF" }).fg(if is_active {
                Color::Red
            } else {
                Color::Green
            }),
        ]);
    }
    table
}

pub fn build_triggers_table(triggers: &[TimeOfDay], now: DateTime<Utc>, timezone: Tz) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Time", "Cron", "Next"]);
    for trigger in triggers {
        let next = next_trigger_after(now, timezone, &[*trigger], TimeDelta::zero());
        table.add_row(vec![
            Cell::new(trigger),
            Cell::new(cron_expression(*trigger)).add_attribute(Attribute::Dim),
            Cell::new(next.map_or_else(String::new, |next| {
                next.with_timezone(&timezone).format("%a %b %d %H:%M %Z").to_string()
            })),
        ]);
    }
    table
}
