use async_trait::async_trait;

use crate::{core::event::PeakEvent, prelude::*};

#[async_trait]
pub trait PeakDataProvider: Send {
    fn name(&self) -> &'static str;

    async fn retrieve_events(&mut self) -> Result<Vec<PeakEvent>>;
}

/// Providers tried in order until one of them returns any events.
#[must_use]
pub struct FallbackChain(Vec<Box<dyn PeakDataProvider>>);

impl FromIterator<Box<dyn PeakDataProvider>> for FallbackChain {
    fn from_iter<T: IntoIterator<Item = Box<dyn PeakDataProvider>>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl FallbackChain {
    /// Never fails: errors are logged and yield no events.
    #[instrument(skip_all)]
    pub async fn retrieve_events(&mut self) -> Vec<PeakEvent> {
        for provider in &mut self.0 {
            let name = provider.name();
            match provider.retrieve_events().await {
                Ok(events) if events.is_empty() => {
                    warn!(provider = name, "no events, falling back");
                }
                Ok(events) => {
                    info!(provider = name, n_events = events.len(), "retrieved");
                    return events;
                }
                Err(error) => {
                    error!(provider = name, "failed to retrieve the events: {error:#}");
                }
            }
        }
        warn!("none of the providers returned any events");
        Vec::new()
    }
}
