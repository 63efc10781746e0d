use serde::Serialize;

use super::{EventInsights, ExternalEvent, SpaceEvent, TimeOfDay, UserPreference};

/// Source label for rows scored by the classifier
pub const MODEL_SOURCE: &str = "Trained Model";
/// Source label for the popularity fallback drawn from the event table
pub const CATALOG_SOURCE: &str = "Event Catalog";

/// Synthetic row fed to the classifier for one (duration, popularity) pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateRow {
    pub event_type: String,
    pub location: String,
    pub time_of_day: TimeOfDay,
    pub duration: u32,
    pub popularity_score: f64,
}

/// Classifier output for one row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub liked: bool,
    /// Probability of the positive class, 0 to 1
    pub like_probability: f64,
}

/// Extra fields carried by recommendations that come from a live feed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiveDetails {
    pub title: String,
    pub description: String,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub velocity_kmh: Option<String>,
}

/// A single entry of the `/recommend` response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub event_type: String,
    pub location: String,
    pub time_of_day: String,
    pub duration: u32,
    pub popularity_score: f64,
    /// 0 or 1
    pub predicted_like: u8,
    pub like_probability: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_score: Option<f64>,
    pub reason: String,
    pub source: String,
    #[serde(flatten)]
    pub insights: EventInsights,
    #[serde(flatten)]
    pub live: Option<LiveDetails>,
}

impl Recommendation {
    /// Wraps a classifier-scored candidate; scores and reason are filled by ranking
    pub fn from_candidate(row: &CandidateRow, prediction: Prediction) -> Self {
        Self {
            event_type: row.event_type.clone(),
            location: row.location.clone(),
            time_of_day: row.time_of_day.to_string(),
            duration: row.duration,
            popularity_score: row.popularity_score,
            predicted_like: u8::from(prediction.liked),
            like_probability: prediction.like_probability,
            similarity_score: None,
            final_score: None,
            reason: String::new(),
            source: MODEL_SOURCE.to_string(),
            insights: EventInsights::derive(&row.event_type, row.duration, row.popularity_score),
            live: None,
        }
    }

    /// Wraps a real event picked by the popularity fallback
    pub fn from_catalog(event: &SpaceEvent) -> Self {
        Self {
            event_type: event.event_type.clone(),
            location: event.location.clone(),
            time_of_day: event.time_of_day.to_string(),
            duration: event.duration,
            popularity_score: event.popularity_score,
            predicted_like: 0,
            like_probability: 0.0,
            similarity_score: None,
            final_score: None,
            reason: String::new(),
            source: CATALOG_SOURCE.to_string(),
            insights: EventInsights::derive(&event.event_type, event.duration, event.popularity_score),
            live: None,
        }
    }

    pub fn is_live(&self) -> bool {
        self.live.is_some()
    }
}

impl From<&ExternalEvent> for Recommendation {
    fn from(event: &ExternalEvent) -> Self {
        Self {
            event_type: event.event_type.clone(),
            location: event.location.clone(),
            time_of_day: event.time_of_day.clone(),
            duration: event.duration,
            popularity_score: event.popularity_score,
            predicted_like: 1,
            like_probability: 0.9,
            similarity_score: None,
            final_score: None,
            reason: "Live data".to_string(),
            source: event.source.clone(),
            insights: EventInsights::derive(&event.event_type, event.duration, event.popularity_score),
            live: Some(LiveDetails {
                title: event.title.clone(),
                description: event.description.clone(),
                date: event.date.clone(),
                image_url: event.image_url.clone(),
                distance_km: event.distance_km.clone(),
                velocity_kmh: event.velocity_kmh.clone(),
            }),
        }
    }
}

/// Outcome of the live-feed step, reported alongside recommendations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExternalStatus {
    NotRequested,
    Unavailable,
    Fetched,
}

/// Body of a successful `/recommend` response
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationResponse {
    pub user_preferences: UserPreference,
    pub recommendations: Vec<Recommendation>,
    pub total_recommendations: usize,
    pub external_events_included: usize,
    pub external_status: ExternalStatus,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}
