use std::sync::Arc;

use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::{Recommendation, RecommendationResponse, UserPreference},
    services::{
        candidates::generate_candidates,
        classifier::Classifier,
        enrichment::Enricher,
        event_store::EventStore,
        ranking::{rank, MAX_RECOMMENDATIONS},
    },
};

/// Live items appended after the ranked ones, before the final cut
const MAX_LIVE_ITEMS: usize = 2;

/// Produces recommendations for a validated preference
///
/// Holds the read-only model and event table plus the live-feed enricher.
/// Cloning is cheap; every field is shared.
#[derive(Clone)]
pub struct Recommender {
    classifier: Arc<dyn Classifier>,
    store: Arc<EventStore>,
    enricher: Enricher,
}

impl Recommender {
    pub fn new(classifier: Arc<dyn Classifier>, store: Arc<EventStore>, enricher: Enricher) -> Self {
        Self {
            classifier,
            store,
            enricher,
        }
    }

    /// Runs the full pipeline for one request
    ///
    /// 1. Expand the preference into the candidate grid
    /// 2. Score every row with the classifier
    /// 3. Rank (or fall back to popular events)
    /// 4. Optionally append live feed items, then cut back to the maximum
    ///
    /// A classifier failure aborts the request; a feed failure does not.
    pub async fn recommend(&self, preference: UserPreference) -> AppResult<RecommendationResponse> {
        let candidates = generate_candidates(&preference);
        let predictions = self.classifier.predict(&candidates)?;

        if predictions.len() != candidates.len() {
            return Err(AppError::Classifier(format!(
                "Expected {} predictions, got {}",
                candidates.len(),
                predictions.len()
            )));
        }

        let mut recommendations = rank(&preference, &candidates, &predictions, &self.store);

        let enrichment = self.enricher.fetch_if(preference.include_external).await;
        recommendations.extend(
            enrichment
                .events()
                .iter()
                .take(MAX_LIVE_ITEMS)
                .map(Recommendation::from),
        );
        recommendations.truncate(MAX_RECOMMENDATIONS);

        let external_events_included = recommendations.iter().filter(|r| r.is_live()).count();

        tracing::info!(
            event_type = %preference.event_type,
            location = %preference.location,
            time_of_day = %preference.time_of_day,
            count = recommendations.len(),
            external = external_events_included,
            "Recommendations generated"
        );

        Ok(RecommendationResponse {
            user_preferences: preference,
            total_recommendations: recommendations.len(),
            recommendations,
            external_events_included,
            external_status: enrichment.status(),
            timestamp: Utc::now(),
        })
    }

    pub fn classifier(&self) -> &Arc<dyn Classifier> {
        &self.classifier
    }

    pub fn store(&self) -> &Arc<EventStore> {
        &self.store
    }

    pub fn enricher(&self) -> &Enricher {
        &self.enricher
    }
}
