//! [Neviweb](https://neviweb.com) (Sinopé) demand-response events client.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use bon::bon;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeDelta, Utc};
use chrono_tz::Tz;
use http::{HeaderMap, HeaderValue, StatusCode, header};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::{
    api::provider::PeakDataProvider,
    core::{calendar::localize, clock::Clock, event::PeakEvent},
    prelude::*,
};

/// Event start is reported without an offset, and two hours too early.
const START_CORRECTION: TimeDelta = TimeDelta::hours(2);

pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Open session, if any.
#[derive(Default)]
struct Session(Option<String>);

impl Session {
    const fn is_open(&self) -> bool {
        self.0.is_some()
    }

    fn id(&self) -> &str {
        self.0.as_deref().unwrap_or_default()
    }
}

pub struct Api {
    client: Client,
    base_url: Url,
    credentials: Option<Credentials>,
    participant_id: u64,
    program_id: u32,

    /// Events are requested from this long ago until this long ahead.
    lookaround: TimeDelta,

    /// Interprets end times which come without an offset.
    timezone: Tz,

    clock: Arc<dyn Clock>,
    session: Session,
}

#[bon]
impl Api {
    #[builder]
    pub fn new(
        base_url: Url,
        credentials: Option<Credentials>,
        participant_id: u64,
        program_id: u32,
        lookaround: TimeDelta,
        timezone: Tz,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.append(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers.append(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .user_agent("hydro-peak")
            .timeout(Duration::from_secs(15))
            .default_headers(headers)
            .build()?;
        Ok(Self {
            client,
            base_url,
            credentials,
            participant_id,
            program_id,
            lookaround,
            timezone,
            clock,
            session: Session::default(),
        })
    }
}

impl Api {
    #[instrument(skip_all)]
    async fn login(&mut self) -> Result {
        #[derive(Serialize)]
        struct LoginRequest<'a> {
            username: &'a str,
            password: &'a str,
            interface: &'static str,

            #[serde(rename = "stayConnected")]
            stay_connected: u8,
        }

        #[derive(Deserialize)]
        struct LoginResponse {
            session: Option<String>,
        }

        self.session = Session::default();
        let Some(credentials) = &self.credentials else {
            bail!("Neviweb credentials are missing");
        };

        info!(username = %credentials.username, "logging in…");
        let request = LoginRequest {
            username: &credentials.username,
            password: &credentials.password,
            interface: "neviweb",
            stay_connected: 1,
        };
        let session = self
            .client
            .post(self.base_url.join("api/login")?)
            .json(&request)
            .send()
            .await
            .context("failed to request the login")?
            .error_for_status()
            .context("login failed")?
            .json::<LoginResponse>()
            .await
            .context("failed to deserialize the login response")?
            .session
            .context("the login response contains no session")?;
        self.session = Session(Some(session));
        info!("logged in");
        Ok(())
    }

    fn events_url(&self, now: DateTime<Utc>) -> Result<Url> {
        let mut url = self
            .base_url
            .join(&format!("api/program-participants/{}/events", self.participant_id))?;
        url.query_pairs_mut()
            .append_pair("embed", "phases")
            .append_pair(
                "from",
                &(now - self.lookaround).to_rfc3339_opts(SecondsFormat::Millis, true),
            )
            .append_pair("to", &(now + self.lookaround).to_rfc3339_opts(SecondsFormat::Millis, true))
            .append_pair("program$id", &self.program_id.to_string());
        Ok(url)
    }

    /// Fetch the raw events.
    ///
    /// An unsuccessful response status yields `None`, any other failure is an error.
    /// A rejected session gets closed, so that the next call logs in again.
    #[instrument(skip_all, level = "debug")]
    async fn get_items(&mut self, url: &Url) -> Result<Option<Vec<Item>>> {
        let response = self
            .client
            .get(url.clone())
            .header("session-id", self.session.id())
            .send()
            .await
            .context("failed to request the events")?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(%status, %body, "failed to fetch the events");
            if (status == StatusCode::UNAUTHORIZED) || (status == StatusCode::FORBIDDEN) {
                self.session = Session::default();
            }
            return Ok(None);
        }
        let items =
            response.json::<Vec<Item>>().await.context("failed to deserialize the events")?;
        debug!(participant_id = self.participant_id, n_items = items.len(), "fetched");
        Ok(Some(items))
    }
}

#[async_trait]
impl PeakDataProvider for Api {
    fn name(&self) -> &'static str {
        "neviweb"
    }

    #[instrument(skip_all)]
    async fn retrieve_events(&mut self) -> Result<Vec<PeakEvent>> {
        if !self.session.is_open()
            && let Err(error) = self.login().await
        {
            error!("failed to log in: {error:#}");
            return Ok(Vec::new());
        }

        let url = self.events_url(self.clock.now())?;
        let items = match self.get_items(&url).await {
            Ok(items) => items,
            Err(error) => {
                info!("the session may have expired, logging in again: {error:#}");
                if let Err(error) = self.login().await {
                    error!("failed to log in: {error:#}");
                    return Ok(Vec::new());
                }
                self.get_items(&url).await.unwrap_or_else(|error| {
                    error!("failed to fetch the events: {error:#}");
                    None
                })
            }
        };

        items
            .unwrap_or_default()
            .into_iter()
            .map(|item| item.try_into_event(self.timezone))
            .collect()
    }
}

#[derive(Deserialize)]
struct Item {
    #[serde(rename = "startDateTime")]
    start: String,

    #[serde(rename = "endDateTime")]
    end: String,
}

impl Item {
    fn try_into_event(self, timezone: Tz) -> Result<PeakEvent> {
        Ok(PeakEvent::new(parse_start(&self.start)?, parse_end(&self.end, timezone)?))
    }
}

/// Parse the start time, which comes as `2025-12-03 09:00:00` instead of `2025-12-03T11:00:00Z`.
fn parse_start(value: &str) -> Result<DateTime<Utc>> {
    if let Ok(start) = DateTime::parse_from_rfc3339(value) {
        return Ok(start.with_timezone(&Utc));
    }
    Ok(parse_naive(value)?.and_utc() + START_CORRECTION)
}

/// Parse the end time, which is correct as reported.
fn parse_end(value: &str, timezone: Tz) -> Result<DateTime<Utc>> {
    if let Ok(end) = DateTime::parse_from_rfc3339(value) {
        return Ok(end.with_timezone(&Utc));
    }
    localize(parse_naive(value)?, timezone)
        .with_context(|| format!("`{value}` does not exist in {timezone}"))
}

fn parse_naive(value: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f"))
        .with_context(|| format!("invalid date and time: `{value}`"))
}
