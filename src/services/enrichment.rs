use std::sync::Arc;

use chrono::Utc;

use crate::{
    models::{ExternalEvent, ExternalStatus},
    services::providers::SkyFeed,
};

/// Result of asking the live feed for extra events
///
/// Feed failures never escape as errors; they end up as `Unavailable`
/// and the caller carries on with model output only.
#[derive(Debug, Clone, PartialEq)]
pub enum Enrichment {
    NotRequested,
    Unavailable(String),
    Fetched(Vec<ExternalEvent>),
}

impl Enrichment {
    pub fn status(&self) -> ExternalStatus {
        match self {
            Enrichment::NotRequested => ExternalStatus::NotRequested,
            Enrichment::Unavailable(_) => ExternalStatus::Unavailable,
            Enrichment::Fetched(_) => ExternalStatus::Fetched,
        }
    }

    pub fn events(&self) -> &[ExternalEvent] {
        match self {
            Enrichment::Fetched(events) => events,
            _ => &[],
        }
    }
}

/// Pulls live events from a feed, absorbing any failure
#[derive(Clone)]
pub struct Enricher {
    feed: Arc<dyn SkyFeed>,
}

impl Enricher {
    pub fn new(feed: Arc<dyn SkyFeed>) -> Self {
        Self { feed }
    }

    /// Fetches the picture of the day and today's near-Earth objects
    ///
    /// The two sources are queried concurrently and degrade independently:
    /// one failing source still leaves the other's events. Only when both
    /// fail is the outcome `Unavailable`.
    pub async fn fetch(&self) -> Enrichment {
        let today = Utc::now().format("%Y-%m-%d").to_string();
        let (apod, objects) = tokio::join!(
            self.feed.picture_of_the_day(),
            self.feed.near_earth_objects(&today)
        );

        let mut events = Vec::new();
        let mut failures = Vec::new();

        match apod {
            Ok(Some(event)) => events.push(event),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(feed = self.feed.name(), error = %e, "Picture of the day unavailable");
                failures.push(format!("picture of the day: {}", e));
            }
        }

        match objects {
            Ok(found) => events.extend(found),
            Err(e) => {
                tracing::warn!(feed = self.feed.name(), error = %e, "Near-Earth objects unavailable");
                failures.push(format!("near-Earth objects: {}", e));
            }
        }

        if failures.len() == 2 {
            return Enrichment::Unavailable(failures.join("; "));
        }

        tracing::debug!(feed = self.feed.name(), count = events.len(), "Live events fetched");
        Enrichment::Fetched(events)
    }

    /// Like [`Enricher::fetch`], skipped entirely when not requested
    pub async fn fetch_if(&self, requested: bool) -> Enrichment {
        if requested {
            self.fetch().await
        } else {
            Enrichment::NotRequested
        }
    }
}
