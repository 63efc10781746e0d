use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Part of the day an event can be watched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Day,
    Night,
}

impl TimeOfDay {
    pub const ALL: [TimeOfDay; 2] = [TimeOfDay::Day, TimeOfDay::Night];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOfDay::Day => "day",
            TimeOfDay::Night => "night",
        }
    }

    /// Case-insensitive parse of `day` / `night`
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "day" => Some(TimeOfDay::Day),
            "night" => Some(TimeOfDay::Night),
            _ => None,
        }
    }
}

impl Display for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A space-viewing event from the event table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpaceEvent {
    pub event_type: String,
    pub location: String,
    pub time_of_day: TimeOfDay,
    /// Minutes
    pub duration: u32,
    /// 0 to 10
    pub popularity_score: f64,
}

/// Derived presentation fields shared by listed events and recommendations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventInsights {
    pub duration_formatted: String,
    pub popularity_category: String,
    pub difficulty: String,
}

impl EventInsights {
    pub fn derive(event_type: &str, duration: u32, popularity_score: f64) -> Self {
        Self {
            duration_formatted: format_duration(duration),
            popularity_category: popularity_category(popularity_score).to_string(),
            difficulty: difficulty(event_type, duration).to_string(),
        }
    }
}

/// Listing shape for `/events`: the record plus its insights
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventListing {
    #[serde(flatten)]
    pub event: SpaceEvent,
    #[serde(flatten)]
    pub insights: EventInsights,
}

impl From<&SpaceEvent> for EventListing {
    fn from(event: &SpaceEvent) -> Self {
        Self {
            insights: EventInsights::derive(&event.event_type, event.duration, event.popularity_score),
            event: event.clone(),
        }
    }
}

pub fn format_duration(minutes: u32) -> String {
    let (hours, rest) = (minutes / 60, minutes % 60);
    match hours {
        0 => format!("{} minutes", minutes),
        1 => format!("1 hour {} minutes", rest),
        _ => format!("{} hours {} minutes", hours, rest),
    }
}

fn popularity_category(score: f64) -> &'static str {
    if score >= 9.0 {
        "Very Popular"
    } else if score >= 8.0 {
        "Popular"
    } else if score >= 7.0 {
        "Moderately Popular"
    } else {
        "Less Popular"
    }
}

fn difficulty(event_type: &str, duration: u32) -> &'static str {
    let event_type = event_type.to_lowercase();
    if duration <= 60 || event_type == "rocket launch" {
        "Easy"
    } else if duration <= 180 || event_type == "meteor shower" || event_type == "star party" {
        "Moderate"
    } else {
        "Advanced"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_of_day_parse_is_case_insensitive() {
        assert_eq!(TimeOfDay::parse(" Night "), Some(TimeOfDay::Night));
        assert_eq!(TimeOfDay::parse("DAY"), Some(TimeOfDay::Day));
        assert_eq!(TimeOfDay::parse("dusk"), None);
    }

    #[test]
    fn test_time_of_day_serde_lowercase() {
        let json = serde_json::to_string(&TimeOfDay::Night).unwrap();
        assert_eq!(json, r#""night""#);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(45), "45 minutes");
        assert_eq!(format_duration(90), "1 hour 30 minutes");
        assert_eq!(format_duration(180), "3 hours 0 minutes");
    }

    #[test]
    fn test_insights_categories() {
        let insights = EventInsights::derive("meteor shower", 240, 9.2);
        assert_eq!(insights.popularity_category, "Very Popular");
        assert_eq!(insights.difficulty, "Moderate");

        let insights = EventInsights::derive("solar eclipse", 240, 6.5);
        assert_eq!(insights.popularity_category, "Less Popular");
        assert_eq!(insights.difficulty, "Advanced");

        let insights = EventInsights::derive("Rocket Launch", 300, 7.1);
        assert_eq!(insights.popularity_category, "Moderately Popular");
        assert_eq!(insights.difficulty, "Easy");
    }

    #[test]
    fn test_listing_flattens_fields() {
        let event = SpaceEvent {
            event_type: "star party".to_string(),
            location: "Iceland".to_string(),
            time_of_day: TimeOfDay::Night,
            duration: 120,
            popularity_score: 8.1,
        };
        let value = serde_json::to_value(EventListing::from(&event)).unwrap();
        assert_eq!(value["location"], "Iceland");
        assert_eq!(value["duration_formatted"], "2 hours 0 minutes");
        assert_eq!(value["popularity_category"], "Popular");
    }
}
