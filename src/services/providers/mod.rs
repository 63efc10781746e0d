/// Live sky-event feed abstraction
///
/// A feed supplies the two kinds of live items merged into recommendations:
/// the picture of the day and the near-Earth objects passing on a date.
/// Each call is independent so callers can degrade one source without
/// losing the other.
use crate::{error::AppResult, models::ExternalEvent};

pub mod nasa;

pub use nasa::NasaFeed;

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SkyFeed: Send + Sync {
    /// Picture of the day, if the feed published one
    async fn picture_of_the_day(&self) -> AppResult<Option<ExternalEvent>>;

    /// Near-Earth objects approaching on `date` (`YYYY-MM-DD`), at most three
    async fn near_earth_objects(&self, date: &str) -> AppResult<Vec<ExternalEvent>>;

    /// Feed name for logging
    fn name(&self) -> &'static str;
}
