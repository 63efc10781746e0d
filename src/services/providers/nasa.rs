/// NASA open API feed
///
/// API Flow:
/// 1. Picture of the day: /planetary/apod?count=1 → array with one entry
/// 2. Near-Earth objects: /neo/rest/v1/feed?start_date=d&end_date=d → objects grouped by date
///
/// Both responses are cached per calendar date.
use std::time::Duration;

use chrono::Utc;
use reqwest::Client as HttpClient;

use crate::{
    cache::{Cache, CacheKey},
    cached,
    error::{AppError, AppResult},
    models::{ApiApod, ApiNeoFeed, ExternalEvent},
    services::providers::SkyFeed,
};

const MAX_NEAR_EARTH_OBJECTS: usize = 3;
const UNKNOWN: &str = "Unknown";

#[derive(Clone)]
pub struct NasaFeed {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    cache: Cache,
    cache_ttl: Duration,
}

impl NasaFeed {
    /// Creates a feed whose outbound calls are each bounded by `timeout`
    pub fn new(
        cache: Cache,
        api_key: String,
        api_url: String,
        timeout: Duration,
        cache_ttl: Duration,
    ) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            cache,
            cache_ttl,
        })
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> AppResult<T> {
        let url = format!("{}{}", self.api_url, path);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(query)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "NASA API returned status {} for {}: {}",
                status, path, body
            )));
        }

        Ok(response.json().await?)
    }

    async fn fetch_apod(&self, today: &str) -> AppResult<Option<ExternalEvent>> {
        let entries: Vec<ApiApod> = self.get("/planetary/apod", &[("count", "1")]).await?;
        let event = entries.into_iter().next().map(|apod| map_apod(apod, today));

        tracing::info!(found = event.is_some(), "Fetched picture of the day");

        Ok(event)
    }

    async fn fetch_near_earth_objects(&self, date: &str) -> AppResult<Vec<ExternalEvent>> {
        let feed: ApiNeoFeed = self
            .get(
                "/neo/rest/v1/feed",
                &[("start_date", date), ("end_date", date)],
            )
            .await?;
        let events = map_neo_feed(feed, date);

        tracing::info!(date = %date, count = events.len(), "Fetched near-Earth objects");

        Ok(events)
    }
}

#[async_trait::async_trait]
impl SkyFeed for NasaFeed {
    async fn picture_of_the_day(&self) -> AppResult<Option<ExternalEvent>> {
        let today = Utc::now().format("%Y-%m-%d").to_string();
        let key = CacheKey::PictureOfTheDay(today.clone());

        cached!(self.cache, key, self.cache_ttl, self.fetch_apod(&today))
    }

    async fn near_earth_objects(&self, date: &str) -> AppResult<Vec<ExternalEvent>> {
        let key = CacheKey::NearEarthObjects(date.to_string());

        cached!(
            self.cache,
            key,
            self.cache_ttl,
            self.fetch_near_earth_objects(date)
        )
    }

    fn name(&self) -> &'static str {
        "nasa"
    }
}

/// Maps one APOD entry; missing fields get placeholder text
pub fn map_apod(apod: ApiApod, today: &str) -> ExternalEvent {
    ExternalEvent {
        event_type: "nasa_apod".to_string(),
        title: apod
            .title
            .unwrap_or_else(|| "Astronomy Picture of the Day".to_string()),
        description: apod
            .explanation
            .unwrap_or_else(|| "Daily space image from NASA".to_string()),
        date: apod.date.unwrap_or_else(|| today.to_string()),
        image_url: apod.url,
        distance_km: None,
        velocity_kmh: None,
        source: "NASA APOD".to_string(),
        popularity_score: 9.0,
        duration: 60,
        time_of_day: "any".to_string(),
        location: "Global".to_string(),
    }
}

/// Maps the first three objects listed under `date`
pub fn map_neo_feed(feed: ApiNeoFeed, date: &str) -> Vec<ExternalEvent> {
    let Some(objects) = feed.near_earth_objects.get(date) else {
        return Vec::new();
    };

    objects
        .iter()
        .take(MAX_NEAR_EARTH_OBJECTS)
        .map(|object| ExternalEvent {
            event_type: "near_earth_asteroid".to_string(),
            title: format!(
                "Asteroid {}",
                object.name.as_deref().unwrap_or(UNKNOWN)
            ),
            description: "Near-Earth asteroid passing by today".to_string(),
            date: date.to_string(),
            image_url: None,
            distance_km: Some(object.miss_distance_km().unwrap_or_else(|| UNKNOWN.to_string())),
            velocity_kmh: Some(object.velocity_kmh().unwrap_or_else(|| UNKNOWN.to_string())),
            source: "NASA NEO".to_string(),
            popularity_score: 8.5,
            duration: 120,
            time_of_day: "night".to_string(),
            location: "Global".to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_apod_fills_placeholders() {
        let apod: ApiApod = serde_json::from_str(r#"{"url": "https://apod.nasa.gov/x.jpg"}"#).unwrap();
        let event = map_apod(apod, "2026-10-18");

        assert_eq!(event.event_type, "nasa_apod");
        assert_eq!(event.title, "Astronomy Picture of the Day");
        assert_eq!(event.date, "2026-10-18");
        assert_eq!(event.image_url.as_deref(), Some("https://apod.nasa.gov/x.jpg"));
        assert_eq!(event.popularity_score, 9.0);
        assert_eq!(event.duration, 60);
        assert_eq!(event.time_of_day, "any");
    }

    #[test]
    fn test_map_neo_feed_caps_at_three() {
        let feed: ApiNeoFeed = serde_json::from_str(
            r#"{"near_earth_objects": {
                "2026-10-18": [
                    {"name": "(A)", "close_approach_data": [{
                        "miss_distance": {"kilometers": "1000.5"},
                        "relative_velocity": {"kilometers_per_hour": "42000.1"}
                    }]},
                    {"name": "(B)"},
                    {},
                    {"name": "(D)"}
                ],
                "2026-10-19": [{"name": "(E)"}]
            }}"#,
        )
        .unwrap();

        let events = map_neo_feed(feed, "2026-10-18");
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].title, "Asteroid (A)");
        assert_eq!(events[0].distance_km.as_deref(), Some("1000.5"));
        assert_eq!(events[0].velocity_kmh.as_deref(), Some("42000.1"));
        assert_eq!(events[1].distance_km.as_deref(), Some("Unknown"));
        assert_eq!(events[2].title, "Asteroid Unknown");
        assert!(events.iter().all(|e| e.source == "NASA NEO" && e.time_of_day == "night"));
    }

    #[test]
    fn test_map_neo_feed_other_date_is_empty() {
        let feed: ApiNeoFeed =
            serde_json::from_str(r#"{"near_earth_objects": {"2026-10-19": [{"name": "(E)"}]}}"#).unwrap();
        assert!(map_neo_feed(feed, "2026-10-18").is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_feed_returns_error_and_caches_nothing() {
        let cache = Cache::new();
        let feed = NasaFeed::new(
            cache.clone(),
            "DEMO_KEY".to_string(),
            "http://127.0.0.1:1/".to_string(),
            Duration::from_secs(1),
            Duration::from_secs(60),
        )
        .unwrap();

        assert!(feed.near_earth_objects("2026-10-18").await.is_err());
        assert!(feed.picture_of_the_day().await.is_err());
        assert_eq!(cache.size(), 0);
    }

    #[tokio::test]
    async fn test_cached_objects_skip_the_network() {
        let cache = Cache::new();
        let cached = vec![map_apod(serde_json::from_str("{}").unwrap(), "2026-10-18")];
        cache.set(
            &CacheKey::NearEarthObjects("2026-10-18".to_string()),
            &cached,
            Duration::from_secs(60),
        );

        let feed = NasaFeed::new(
            cache,
            "DEMO_KEY".to_string(),
            "http://127.0.0.1:1".to_string(),
            Duration::from_secs(1),
            Duration::from_secs(60),
        )
        .unwrap();

        let events = feed.near_earth_objects("2026-10-18").await.unwrap();
        assert_eq!(events, cached);
    }
}
