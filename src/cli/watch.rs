use std::{sync::Arc, time::Duration};

use bon::Builder;
use chrono::TimeDelta;
use chrono_tz::Tz;
use clap::Parser;
use enumset::EnumSet;
use tokio::{signal, time::sleep};

use crate::{
    api::provider::FallbackChain,
    cli::{TimezoneArgs, providers::ProviderArgs},
    core::{
        classifier::Classifier,
        clock::{Clock, SystemClock},
        period::PeriodType,
        switch::{Switches, Transition},
        trigger::{extract_trigger_times, next_trigger_after},
    },
    prelude::*,
};

#[derive(Parser)]
pub struct WatchArgs {
    /// Switches to drive.
    #[clap(
        long,
        env = "SWITCHES",
        value_delimiter = ',',
        num_args = 1..,
        default_value = "peak,pre-peak,pre-pre-peak",
    )]
    switches: Vec<PeriodType>,

    /// Pause between consecutive switch transitions.
    #[clap(long, env = "TRANSITION_PAUSE", default_value = "10ms")]
    transition_pause: humantime::Duration,

    /// Delay after each trigger mark before the re-evaluation.
    #[clap(long, env = "TRIGGER_DELAY", default_value = "1s")]
    trigger_delay: humantime::Duration,

    #[clap(flatten)]
    timezone: TimezoneArgs,

    #[clap(flatten)]
    providers: ProviderArgs,
}

impl WatchArgs {
    #[must_use]
    pub fn switches(&self) -> EnumSet<PeriodType> {
        self.switches.iter().copied().collect()
    }

    pub async fn run(&self) -> Result {
        let timezone = self.timezone.timezone;
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        Watcher::builder()
            .chain(self.providers.fallback_chain(timezone, &clock)?)
            .clock(clock)
            .classifier(Classifier::new(timezone))
            .timezone(timezone)
            .driven(self.switches())
            .transition_pause(self.transition_pause)
            .trigger_delay(TimeDelta::from_std(self.trigger_delay.into())?)
            .build()
            .run()
            .await
    }
}

#[derive(Builder)]
struct Watcher {
    chain: FallbackChain,
    clock: Arc<dyn Clock>,
    classifier: Classifier,
    timezone: Tz,

    /// Switches which get turned on and off, the others stay off.
    driven: EnumSet<PeriodType>,

    #[builder(into)]
    transition_pause: Duration,

    trigger_delay: TimeDelta,

    #[builder(skip)]
    switches: Switches,
}

impl Watcher {
    async fn run(mut self) -> Result {
        let triggers = extract_trigger_times();
        info!(n_triggers = triggers.len(), driven = ?self.driven, "starting…");
        self.update().await;

        let terminated = terminated();
        tokio::pin!(terminated);

        loop {
            let now = self.clock.now();
            let next = next_trigger_after(now, self.timezone, &triggers, self.trigger_delay)
                .context("there is no upcoming trigger")?;
            let duration = (next - now).to_std()?;
            info!(next = %next.with_timezone(&self.timezone), "sleeping…");
            tokio::select! {
                () = sleep(duration) => {
                    self.update().await;
                }
                result = &mut terminated => {
                    result?;
                    info!("terminating…");
                    return Ok(());
                }
            }
        }
    }

    /// Fetch the events, classify the current instant, and switch accordingly.
    ///
    /// Returns the applied transitions.
    #[instrument(skip_all)]
    async fn update(&mut self) -> Vec<Transition> {
        let events = self.chain.retrieve_events().await;
        let now = self.clock.now();
        let target: EnumSet<PeriodType> = self
            .driven
            .iter()
            .filter(|period| self.classifier.is_within_period(now, &events, *period))
            .collect();
        info!(now = %now.with_timezone(&self.timezone), on = ?target, "updating…");

        let transitions = self.switches.plan(target);
        for (index, transition) in transitions.iter().enumerate() {
            if index != 0 {
                sleep(self.transition_pause).await;
            }
            info!(%transition, "switching");
            self.switches.apply(*transition);
        }
        debug!(on = ?self.switches.on(), "updated");
        transitions
    }
}

/// Resolves on Ctrl-C, or SIGTERM where available.
async fn terminated() -> Result {
    #[cfg(unix)]
    {
        let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())?;
        tokio::select! {
            result = signal::ctrl_c() => result?,
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    signal::ctrl_c().await?;
    Ok(())
}
