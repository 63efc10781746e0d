use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

use crate::{
    error::{AppError, AppResult},
    models::SpaceEvent,
};

/// Read-only event table loaded once at startup
///
/// Rows keep their file order; that order is the tie-break wherever
/// rows are ranked.
#[derive(Debug, Clone)]
pub struct EventStore {
    events: Vec<SpaceEvent>,
}

/// Query filters for event listings
///
/// Text filters match case-insensitively; thresholds are inclusive.
/// Blank values and numbers that do not parse count as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventFilter {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub event_type: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub time_of_day: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub min_popularity: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub max_duration: Option<u32>,
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.trim().is_empty()))
}

fn lenient_number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: std::str::FromStr,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.trim().parse().ok()))
}

impl EventFilter {
    pub fn is_empty(&self) -> bool {
        self == &EventFilter::default()
    }

    /// Stable string form used as a cache key
    pub fn canonical(&self) -> String {
        fn part<T: std::fmt::Display>(name: &str, value: &Option<T>) -> String {
            match value {
                Some(v) => format!("{}={}", name, v.to_string().trim().to_lowercase()),
                None => format!("{}=", name),
            }
        }

        [
            part("event_type", &self.event_type),
            part("location", &self.location),
            part("time_of_day", &self.time_of_day),
            part("min_popularity", &self.min_popularity),
            part("max_duration", &self.max_duration),
        ]
        .join("&")
    }

    pub fn matches(&self, event: &SpaceEvent) -> bool {
        fn same(filter: &Option<String>, value: &str) -> bool {
            filter
                .as_deref()
                .map_or(true, |f| f.trim().eq_ignore_ascii_case(value))
        }

        same(&self.event_type, &event.event_type)
            && same(&self.location, &event.location)
            && same(&self.time_of_day, event.time_of_day.as_str())
            && self.min_popularity.map_or(true, |min| event.popularity_score >= min)
            && self.max_duration.map_or(true, |max| event.duration <= max)
    }
}

/// Aggregate figures over the whole table
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StoreSummary {
    pub total_events: usize,
    pub event_types: usize,
    pub locations: usize,
    pub avg_popularity: f64,
    pub avg_duration: f64,
}

impl EventStore {
    /// Loads and validates the event table from a JSON array on disk
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let events: Vec<SpaceEvent> = serde_json::from_str(&raw)?;
        let store = Self::from_events(events)?;

        tracing::info!(
            path = %path.display(),
            events = store.len(),
            "Event table loaded"
        );

        Ok(store)
    }

    /// Builds a store from records, rejecting any row that breaks the invariants
    pub fn from_events(events: Vec<SpaceEvent>) -> AppResult<Self> {
        for (index, event) in events.iter().enumerate() {
            validate_event(event)
                .map_err(|reason| AppError::InvalidInput(format!("Event #{}: {}", index, reason)))?;
        }

        Ok(Self { events })
    }

    pub fn all(&self) -> &[SpaceEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Returns the rows matching `filter`, in table order
    pub fn filter(&self, filter: &EventFilter) -> Vec<&SpaceEvent> {
        self.events.iter().filter(|e| filter.matches(e)).collect()
    }

    /// The `n` most popular rows, highest first; equal scores keep table order
    pub fn top_by_popularity(&self, n: usize) -> Vec<&SpaceEvent> {
        let mut ranked: Vec<&SpaceEvent> = self.events.iter().collect();
        // sort_by is stable
        ranked.sort_by(|a, b| b.popularity_score.total_cmp(&a.popularity_score));
        ranked.truncate(n);
        ranked
    }

    /// Distinct event types, sorted
    pub fn event_types(&self) -> Vec<String> {
        self.distinct(|e| &e.event_type)
    }

    /// Distinct locations, sorted
    pub fn locations(&self) -> Vec<String> {
        self.distinct(|e| &e.location)
    }

    pub fn summary(&self) -> StoreSummary {
        let count = self.events.len();
        let (popularity, duration) = self
            .events
            .iter()
            .fold((0.0, 0.0), |(p, d), e| (p + e.popularity_score, d + f64::from(e.duration)));

        let mean = |total: f64| if count == 0 { 0.0 } else { total / count as f64 };

        StoreSummary {
            total_events: count,
            event_types: self.event_types().len(),
            locations: self.locations().len(),
            avg_popularity: mean(popularity),
            avg_duration: mean(duration),
        }
    }

    fn distinct<F>(&self, field: F) -> Vec<String>
    where
        F: Fn(&SpaceEvent) -> &String,
    {
        self.events
            .iter()
            .map(|e| field(e).clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

fn validate_event(event: &SpaceEvent) -> Result<(), String> {
    if event.event_type.trim().is_empty() {
        return Err("event_type must be a non-empty string".to_string());
    }
    if event.location.trim().is_empty() {
        return Err("location must be a non-empty string".to_string());
    }
    if event.duration == 0 {
        return Err("duration must be positive".to_string());
    }
    if !(0.0..=10.0).contains(&event.popularity_score) {
        return Err(format!(
            "popularity_score {} is outside [0, 10]",
            event.popularity_score
        ));
    }
    Ok(())
}
