mod check;
mod providers;
mod schedule;
mod watch;

use chrono_tz::Tz;
use clap::{Parser, Subcommand};

use crate::cli::{check::CheckArgs, schedule::ScheduleArgs, watch::WatchArgs};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the daily trigger times.
    #[clap(name = "schedule")]
    Schedule(ScheduleArgs),

    /// Fetch the events once and print the verdict for every period.
    #[clap(name = "check")]
    Check(Box<CheckArgs>),

    /// Main command: keep the period switches up to date.
    #[clap(name = "watch")]
    Watch(Box<WatchArgs>),
}

#[derive(Copy, Clone, Parser)]
pub struct TimezoneArgs {
    /// Local timezone of the peak schedule.
    #[clap(
        long,
        env = "TIMEZONE",
        default_value = "America/New_York",
        value_parser = parse_timezone
    )]
    pub timezone: Tz,
}

fn parse_timezone(value: &str) -> Result<Tz, String> {
    value.parse::<Tz>().map_err(|error| error.to_string())
}
