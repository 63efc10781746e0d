use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Event taken from a live third-party feed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExternalEvent {
    pub event_type: String,
    pub title: String,
    pub description: String,
    /// `YYYY-MM-DD`
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub velocity_kmh: Option<String>,
    pub source: String,
    pub popularity_score: f64,
    pub duration: u32,
    pub time_of_day: String,
    pub location: String,
}

// ============================================================================
// NASA API Types
// ============================================================================

/// One entry of the APOD response (`/planetary/apod?count=1` returns an array)
#[derive(Debug, Clone, Deserialize)]
pub struct ApiApod {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// NeoWs feed response, objects grouped by date
#[derive(Debug, Clone, Deserialize)]
pub struct ApiNeoFeed {
    #[serde(default)]
    pub near_earth_objects: HashMap<String, Vec<ApiNearEarthObject>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiNearEarthObject {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub close_approach_data: Vec<ApiCloseApproach>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiCloseApproach {
    #[serde(default)]
    pub miss_distance: Option<ApiMissDistance>,
    #[serde(default)]
    pub relative_velocity: Option<ApiRelativeVelocity>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiMissDistance {
    #[serde(default)]
    pub kilometers: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiRelativeVelocity {
    #[serde(default)]
    pub kilometers_per_hour: Option<String>,
}

impl ApiNearEarthObject {
    fn first_approach(&self) -> Option<&ApiCloseApproach> {
        self.close_approach_data.first()
    }

    pub fn miss_distance_km(&self) -> Option<String> {
        self.first_approach()
            .and_then(|a| a.miss_distance.as_ref())
            .and_then(|d| d.kilometers.clone())
    }

    pub fn velocity_kmh(&self) -> Option<String> {
        self.first_approach()
            .and_then(|a| a.relative_velocity.as_ref())
            .and_then(|v| v.kilometers_per_hour.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neo_feed_parses_sparse_payload() {
        let payload = r#"{
            "element_count": 2,
            "near_earth_objects": {
                "2026-10-18": [
                    {
                        "name": "(2026 TX1)",
                        "close_approach_data": [{
                            "miss_distance": { "kilometers": "4512345.12" },
                            "relative_velocity": { "kilometers_per_hour": "53210.4" }
                        }]
                    },
                    { "name": "(2019 AB)" }
                ]
            }
        }"#;

        let feed: ApiNeoFeed = serde_json::from_str(payload).unwrap();
        let objects = &feed.near_earth_objects["2026-10-18"];
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0].miss_distance_km(), Some("4512345.12".to_string()));
        assert_eq!(objects[0].velocity_kmh(), Some("53210.4".to_string()));
        assert_eq!(objects[1].miss_distance_km(), None);
    }

    #[test]
    fn test_apod_array_parses() {
        let payload = r#"[{"title": "M31", "date": "2026-10-18", "media_type": "image"}]"#;
        let entries: Vec<ApiApod> = serde_json::from_str(payload).unwrap();
        assert_eq!(entries[0].title.as_deref(), Some("M31"));
        assert_eq!(entries[0].explanation, None);
    }
}
