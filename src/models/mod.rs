mod event;
mod external;
mod preferences;
mod recommendation;

pub use event::{format_duration, EventInsights, EventListing, SpaceEvent, TimeOfDay};
pub use external::{ApiApod, ApiNearEarthObject, ApiNeoFeed, ExternalEvent};
pub use preferences::{UserPreference, VALID_EVENT_TYPES, VALID_LOCATIONS};
pub use recommendation::{
    CandidateRow, ExternalStatus, LiveDetails, Prediction, Recommendation,
    RecommendationResponse, CATALOG_SOURCE, MODEL_SOURCE,
};
