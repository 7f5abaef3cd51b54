//! [Hydro-Québec open data](https://donnees.hydroquebec.com/explore/dataset/evenements-pointe) client.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::{
    api::provider::PeakDataProvider,
    core::{definition::ScheduleTag, event::PeakEvent},
    prelude::*,
};

const RECORDS_PATH: &str = "api/explore/v2.1/catalog/datasets/evenements-pointe/records";

pub struct Api {
    client: Client,
    base_url: Url,
    offer: String,
    limit: u32,
}

impl Api {
    pub fn new(base_url: Url, offer: String, limit: u32) -> Result<Self> {
        let client = Client::builder()
            .user_agent("hydro-peak")
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client, base_url, offer, limit })
    }

    /// Most recent events of the offer, latest first.
    #[instrument(skip_all, fields(offer = %self.offer, limit = self.limit))]
    pub async fn get_records(&self) -> Result<Vec<Record>> {
        info!("fetching…");
        let url = self.base_url.join(RECORDS_PATH)?;
        let records = self
            .client
            .get(url)
            .query(&[
                ("where", format!(r#"offre = "{}""#, self.offer)),
                ("order_by", "datedebut desc".to_owned()),
                ("limit", self.limit.to_string()),
            ])
            .send()
            .await
            .context("failed to request the peak events")?
            .error_for_status()
            .context("peak events request failed")?
            .json::<Response>()
            .await
            .context("failed to deserialize the peak events")?
            .results;
        for record in &records {
            debug!(?record.tag, %record.begin, %record.end, %record.offer, "record");
        }
        info!(n_records = records.len(), "fetched");
        Ok(records)
    }
}

#[async_trait]
impl PeakDataProvider for Api {
    fn name(&self) -> &'static str {
        "hydro-quebec"
    }

    async fn retrieve_events(&mut self) -> Result<Vec<PeakEvent>> {
        Ok(self.get_records().await?.into_iter().map(PeakEvent::from).collect())
    }
}

#[derive(Deserialize)]
struct Response {
    #[serde(default)]
    results: Vec<Record>,
}

#[must_use]
#[derive(Debug, Deserialize)]
pub struct Record {
    #[serde(rename = "offre")]
    pub offer: String,

    #[serde(rename = "datedebut")]
    pub begin: DateTime<Utc>,

    #[serde(rename = "datefin")]
    pub end: DateTime<Utc>,

    #[serde(rename = "plagehoraire")]
    pub tag: Option<ScheduleTag>,
}

impl From<Record> for PeakEvent {
    fn from(record: Record) -> Self {
        Self::new(record.begin, record.end)
    }
}
