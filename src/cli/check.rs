use std::sync::Arc;

use chrono::{DateTime, Utc};
use clap::Parser;

use crate::{
    cli::{TimezoneArgs, providers::ProviderArgs},
    core::{
        classifier::Classifier,
        clock::{Clock, FixedClock, SystemClock},
    },
    prelude::*,
    tables::{build_events_table, build_verdicts_table},
};

#[derive(Parser)]
pub struct CheckArgs {
    /// Evaluate at this instant instead of now, for example: `2025-01-22T06:00:00-05:00`.
    #[clap(long)]
    pub at: Option<DateTime<Utc>>,

    #[clap(flatten)]
    pub timezone: TimezoneArgs,

    #[clap(flatten)]
    pub providers: ProviderArgs,
}

impl CheckArgs {
    fn clock(&self) -> Arc<dyn Clock> {
        match self.at {
            Some(at) => Arc::new(FixedClock(at)),
            None => Arc::new(SystemClock),
        }
    }

    #[instrument(skip_all)]
    pub async fn run(&self) -> Result {
        let timezone = self.timezone.timezone;
        let clock = self.clock();
        let now = clock.now();
        let events = self.providers.fallback_chain(timezone, &clock)?.retrieve_events().await;
        println!("{}", build_events_table(&events, timezone));

        let classifier = Classifier::new(timezone);
        println!("{}", build_verdicts_table(&classifier, now, &events));
        info!(
            now = %now.with_timezone(&timezone),
            period = ?classifier.classify(now, &events),
            "classified",
        );
        Ok(())
    }
}
