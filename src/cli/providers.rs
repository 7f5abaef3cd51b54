use std::{sync::Arc, time::Duration};

use chrono::TimeDelta;
use chrono_tz::Tz;
use clap::{Parser, ValueEnum};
use reqwest::Url;

use crate::{
    api::{
        hydro_quebec,
        neviweb::{self, Credentials},
        provider::{FallbackChain, PeakDataProvider},
    },
    core::clock::Clock,
    prelude::*,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum ProviderKind {
    /// Hydro-Québec open data portal.
    HydroQuebec,

    /// Sinopé Neviweb demand-response program.
    Neviweb,
}

#[derive(Parser)]
pub struct ProviderArgs {
    /// Peak data providers, tried in order until one returns any events.
    #[clap(
        long,
        env = "PROVIDERS",
        value_delimiter = ',',
        num_args = 1..,
        default_value = "hydro-quebec",
    )]
    pub providers: Vec<ProviderKind>,

    #[clap(flatten)]
    pub hydro_quebec: HydroQuebecArgs,

    #[clap(flatten)]
    pub neviweb: NeviwebArgs,
}

impl ProviderArgs {
    pub fn fallback_chain(&self, timezone: Tz, clock: &Arc<dyn Clock>) -> Result<FallbackChain> {
        self.providers
            .iter()
            .map(|kind| -> Result<Box<dyn PeakDataProvider>> {
                match kind {
                    ProviderKind::HydroQuebec => Ok(Box::new(self.hydro_quebec.new_client()?)),
                    ProviderKind::Neviweb => {
                        Ok(Box::new(self.neviweb.new_client(timezone, Arc::clone(clock))?))
                    }
                }
            })
            .collect()
    }
}

#[derive(Parser)]
pub struct HydroQuebecArgs {
    #[clap(
        long = "hydro-quebec-base-url",
        env = "HYDRO_QUEBEC_BASE_URL",
        default_value = "https://donnees.hydroquebec.com"
    )]
    pub hydro_quebec_base_url: Url,

    /// Rate offer whose events are fetched.
    #[clap(long = "hydro-quebec-offer", env = "HYDRO_QUEBEC_OFFER", default_value = "CPC-D")]
    pub offer: String,

    /// Number of most recent events to fetch.
    #[clap(long = "hydro-quebec-limit", env = "HYDRO_QUEBEC_LIMIT", default_value = "5")]
    pub limit: u32,
}

impl HydroQuebecArgs {
    pub fn new_client(&self) -> Result<hydro_quebec::Api> {
        hydro_quebec::Api::new(self.hydro_quebec_base_url.clone(), self.offer.clone(), self.limit)
    }
}

#[derive(Parser)]
pub struct NeviwebArgs {
    #[clap(
        long = "neviweb-base-url",
        env = "NEVIWEB_BASE_URL",
        default_value = "https://neviweb.com"
    )]
    pub neviweb_base_url: Url,

    #[clap(long = "neviweb-username", env = "NEVIWEB_USERNAME")]
    pub username: Option<String>,

    #[clap(long = "neviweb-password", env = "NEVIWEB_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    #[clap(long = "neviweb-participant-id", env = "NEVIWEB_PARTICIPANT_ID", default_value = "11689")]
    pub participant_id: u64,

    #[clap(long = "neviweb-program-id", env = "NEVIWEB_PROGRAM_ID", default_value = "4")]
    pub program_id: u32,

    /// Events are requested from this long ago until this long ahead.
    #[clap(long = "neviweb-lookaround", env = "NEVIWEB_LOOKAROUND", default_value = "2days")]
    pub lookaround: humantime::Duration,
}

impl NeviwebArgs {
    fn credentials(&self) -> Option<Credentials> {
        Some(Credentials { username: self.username.clone()?, password: self.password.clone()? })
    }

    pub fn new_client(&self, timezone: Tz, clock: Arc<dyn Clock>) -> Result<neviweb::Api> {
        neviweb::Api::builder()
            .base_url(self.neviweb_base_url.clone())
            .maybe_credentials(self.credentials())
            .participant_id(self.participant_id)
            .program_id(self.program_id)
            .lookaround(TimeDelta::from_std(Duration::from(self.lookaround))?)
            .timezone(timezone)
            .clock(clock)
            .build()
    }
}
