use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{
    cache::Cache,
    config::Config,
    services::{Classifier, Enricher, EventStore, FeedbackLog, Recommender, SkyFeed},
};

/// Shared application state
///
/// Everything here is read-only after startup except the result cache and
/// the feedback log, which handle their own synchronisation.
#[derive(Clone)]
pub struct AppState {
    pub inner: Arc<AppStateInner>,
}

pub struct AppStateInner {
    pub config: Config,
    pub recommender: Recommender,
    pub cache: Cache,
    pub feedback: FeedbackLog,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        config: Config,
        classifier: Arc<dyn Classifier>,
        store: Arc<EventStore>,
        feed: Arc<dyn SkyFeed>,
        cache: Cache,
    ) -> Self {
        let recommender = Recommender::new(classifier, store, Enricher::new(feed));
        let feedback = FeedbackLog::new(&config.feedback_log_path);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                recommender,
                cache,
                feedback,
                started_at: Utc::now(),
            }),
        }
    }

    pub fn store(&self) -> &EventStore {
        self.inner.recommender.store()
    }
}
