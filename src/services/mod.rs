pub mod candidates;
pub mod classifier;
pub mod enrichment;
pub mod event_store;
pub mod feedback;
pub mod providers;
pub mod ranking;
pub mod recommendations;

pub use classifier::{Classifier, DecisionTreeClassifier};
pub use enrichment::{Enricher, Enrichment};
pub use event_store::{EventFilter, EventStore};
pub use feedback::{FeedbackLog, FeedbackRecord};
pub use providers::{NasaFeed, SkyFeed};
pub use recommendations::Recommender;
