use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};

use super::AppState;
use crate::{
    cache::CacheKey,
    cached,
    error::{AppError, AppResult},
    models::{EventListing, ExternalEvent, ExternalStatus, RecommendationResponse, UserPreference},
    services::{event_store::StoreSummary, EventFilter, FeedbackRecord},
};

// Response types

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model_loaded: bool,
    pub events_loaded: bool,
    pub events_count: usize,
    pub cache_size: usize,
    pub external_feed_key: &'static str,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct EventsResponse {
    pub total_events: usize,
    pub events: Vec<EventListing>,
    pub filters_applied: EventFilter,
}

#[derive(Debug, Serialize)]
pub struct ValidationResponse {
    pub valid: bool,
    pub errors: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ExternalEventsResponse {
    pub events: Vec<ExternalEvent>,
    pub total_events: usize,
    pub status: ExternalStatus,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub cache_size: usize,
    #[serde(flatten)]
    pub summary: StoreSummary,
    pub started_at: DateTime<Utc>,
}

/// Unwraps a JSON body, turning any body rejection into a 400
fn json_body(body: Result<Json<Value>, JsonRejection>) -> AppResult<Value> {
    body.map(|Json(value)| value)
        .map_err(|rejection| AppError::InvalidInput(rejection.body_text()))
}

// Handlers

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let store = state.store();
    let external_feed_key = if state.inner.config.uses_demo_key() {
        "using_demo_key"
    } else {
        "configured"
    };

    Json(HealthResponse {
        status: "healthy",
        // the process does not serve without a model
        model_loaded: true,
        events_loaded: !store.is_empty(),
        events_count: store.len(),
        cache_size: state.inner.cache.size(),
        external_feed_key,
        timestamp: Utc::now(),
    })
}

/// Recommends events for a preference
///
/// The body is validated in full before the classifier runs; every
/// problem is reported in one 400 response. Live feed items are only
/// merged in when the body sets `include_external: true`; an absent flag
/// keeps the request independent of the external feed.
pub async fn recommend(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<RecommendationResponse>> {
    let body = json_body(body)?;
    let preference = UserPreference::parse(&body).map_err(AppError::Validation)?;

    let response = state.inner.recommender.recommend(preference).await?;
    Ok(Json(response))
}

/// Validates a preference without scoring it
pub async fn validate(body: Result<Json<Value>, JsonRejection>) -> AppResult<Json<ValidationResponse>> {
    let body = json_body(body)?;
    let errors = match UserPreference::parse(&body) {
        Ok(_) => Vec::new(),
        Err(errors) => errors,
    };

    Ok(Json(ValidationResponse {
        valid: errors.is_empty(),
        errors,
    }))
}

/// Records user feedback on a recommendation
pub async fn feedback(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<Value>> {
    let body = json_body(body)?;
    let record = FeedbackRecord::from_request(&body)?;
    state.inner.feedback.append(&record).await?;

    Ok(Json(json!({
        "message": "Feedback recorded successfully",
        "session_id": record.session_id,
    })))
}

/// Lists events, optionally filtered; results are cached per filter set
pub async fn list_events(
    State(state): State<AppState>,
    query: Result<Query<EventFilter>, QueryRejection>,
) -> AppResult<Json<EventsResponse>> {
    let Query(filter) = query.map_err(|rejection| AppError::InvalidInput(rejection.body_text()))?;
    let events = filtered_listings(&state, &filter).await?;

    Ok(Json(EventsResponse {
        total_events: events.len(),
        events,
        filters_applied: filter,
    }))
}

async fn filtered_listings(state: &AppState, filter: &EventFilter) -> AppResult<Vec<EventListing>> {
    let key = CacheKey::EventQuery(filter.canonical());

    cached!(state.inner.cache, key, state.inner.config.cache_ttl(), async {
        Ok::<_, AppError>(
            state
                .store()
                .filter(filter)
                .into_iter()
                .map(EventListing::from)
                .collect::<Vec<_>>(),
        )
    })
}

pub async fn event_types(State(state): State<AppState>) -> Json<Value> {
    let event_types = state.store().event_types();
    Json(json!({ "count": event_types.len(), "event_types": event_types }))
}

pub async fn locations(State(state): State<AppState>) -> Json<Value> {
    let locations = state.store().locations();
    Json(json!({ "count": locations.len(), "locations": locations }))
}

/// Live feed items, independent of any preference
pub async fn external_events(State(state): State<AppState>) -> Json<ExternalEventsResponse> {
    let enrichment = state.inner.recommender.enricher().fetch().await;
    let events = enrichment.events().to_vec();

    Json(ExternalEventsResponse {
        total_events: events.len(),
        events,
        status: enrichment.status(),
        timestamp: Utc::now(),
    })
}

pub async fn model_info(State(state): State<AppState>) -> Json<Value> {
    let info = state.inner.recommender.classifier().info();
    let store = state.store();

    Json(json!({
        "model_type": info.model_type,
        "feature_names": info.feature_names,
        "trained_on": info.trained_on,
        "event_types": store.event_types(),
        "locations": store.locations(),
    }))
}

pub async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        cache_size: state.inner.cache.size(),
        summary: state.store().summary(),
        started_at: state.inner.started_at,
    })
}
