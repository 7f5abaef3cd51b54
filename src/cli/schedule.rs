use clap::Parser;

use crate::{
    cli::TimezoneArgs,
    core::{
        clock::{Clock, SystemClock},
        trigger::extract_trigger_times,
    },
    tables::build_triggers_table,
};

#[derive(Parser)]
pub struct ScheduleArgs {
    #[clap(flatten)]
    pub timezone: TimezoneArgs,
}

impl ScheduleArgs {
    pub fn run(&self) {
        let triggers = extract_trigger_times();
        println!("{}", build_triggers_table(&triggers, SystemClock.now(), self.timezone.timezone));
    }
}
