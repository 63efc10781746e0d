use serde::Serialize;
use serde_json::{Map, Value};

use super::TimeOfDay;

/// Event types a preference may name
pub const VALID_EVENT_TYPES: [&str; 8] = [
    "meteor shower",
    "solar eclipse",
    "lunar eclipse",
    "rocket launch",
    "comet viewing",
    "aurora borealis",
    "planetary conjunction",
    "star party",
];

/// Locations a preference may name, in their canonical spelling
pub const VALID_LOCATIONS: [&str; 13] = [
    "USA",
    "Canada",
    "Europe",
    "Asia",
    "Australia",
    "Africa",
    "South America",
    "Russia",
    "India",
    "Norway",
    "Sweden",
    "Finland",
    "Iceland",
];

const REQUIRED_FIELDS: [&str; 3] = ["event_type", "location", "time_of_day"];
const OPTIONAL_FIELDS: [&str; 3] = ["include_external", "min_popularity", "max_duration"];

/// Validated viewing preferences for a single request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserPreference {
    /// Lower-cased, one of [`VALID_EVENT_TYPES`]
    pub event_type: String,
    /// Canonical spelling from [`VALID_LOCATIONS`]
    pub location: String,
    pub time_of_day: TimeOfDay,
    pub include_external: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_popularity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_duration: Option<u32>,
}

impl UserPreference {
    /// Builds a preference from the three required fields
    pub fn new(event_type: &str, location: &str, time_of_day: TimeOfDay) -> Self {
        Self {
            event_type: event_type.trim().to_lowercase(),
            location: canonical_location(location).unwrap_or(location).to_string(),
            time_of_day,
            include_external: false,
            min_popularity: None,
            max_duration: None,
        }
    }

    /// Parses and validates a loosely typed request body.
    ///
    /// Every problem is collected so the caller can report them together.
    /// Unknown keys are rejected.
    pub fn parse(input: &Value) -> Result<Self, Vec<String>> {
        let Some(fields) = input.as_object() else {
            return Err(vec!["Request body must be a JSON object".to_string()]);
        };

        let mut errors = Vec::new();

        for key in fields.keys() {
            if !REQUIRED_FIELDS.contains(&key.as_str()) && !OPTIONAL_FIELDS.contains(&key.as_str()) {
                errors.push(format!("Unknown field: {}", key));
            }
        }

        let event_type = required_string(fields, "event_type", &mut errors).and_then(|value| {
            let value = value.to_lowercase();
            if VALID_EVENT_TYPES.contains(&value.as_str()) {
                Some(value)
            } else {
                errors.push(format!(
                    "Invalid event_type. Must be one of: {}",
                    VALID_EVENT_TYPES.join(", ")
                ));
                None
            }
        });

        let location = required_string(fields, "location", &mut errors).and_then(|value| {
            match canonical_location(&value) {
                Some(canonical) => Some(canonical.to_string()),
                None => {
                    errors.push(format!(
                        "Invalid location. Must be one of: {}",
                        VALID_LOCATIONS.join(", ")
                    ));
                    None
                }
            }
        });

        let time_of_day = required_string(fields, "time_of_day", &mut errors).and_then(|value| {
            let parsed = TimeOfDay::parse(&value);
            if parsed.is_none() {
                errors.push("Invalid time_of_day. Must be one of: day, night".to_string());
            }
            parsed
        });

        let include_external = match fields.get("include_external") {
            None => false,
            Some(Value::Bool(flag)) => *flag,
            Some(_) => {
                errors.push("include_external must be a boolean".to_string());
                false
            }
        };

        let min_popularity = match fields.get("min_popularity") {
            None => None,
            Some(value) => match value.as_f64() {
                Some(min) if (0.0..=10.0).contains(&min) => Some(min),
                Some(_) => {
                    errors.push("min_popularity must be between 0 and 10".to_string());
                    None
                }
                None => {
                    errors.push("min_popularity must be a number".to_string());
                    None
                }
            },
        };

        let max_duration = match fields.get("max_duration") {
            None => None,
            Some(value) => match value.as_i64() {
                Some(max) if max > 0 => match u32::try_from(max) {
                    Ok(max) => Some(max),
                    Err(_) => {
                        errors.push("max_duration is too large".to_string());
                        None
                    }
                },
                Some(_) => {
                    errors.push("max_duration must be positive".to_string());
                    None
                }
                None => {
                    errors.push("max_duration must be an integer".to_string());
                    None
                }
            },
        };

        match (event_type, location, time_of_day) {
            (Some(event_type), Some(location), Some(time_of_day)) if errors.is_empty() => {
                Ok(Self {
                    event_type,
                    location,
                    time_of_day,
                    include_external,
                    min_popularity,
                    max_duration,
                })
            }
            _ => Err(errors),
        }
    }

    /// Duration the similarity score measures closeness against.
    ///
    /// Preferences carry no target duration, so an absent cap counts as zero.
    pub fn reference_duration(&self) -> u32 {
        self.max_duration.unwrap_or(0)
    }
}

fn required_string(fields: &Map<String, Value>, name: &str, errors: &mut Vec<String>) -> Option<String> {
    match fields.get(name) {
        None => {
            errors.push(format!("Missing required field: {}", name));
            None
        }
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(_) => {
            errors.push(format!("Invalid {}: must be a non-empty string", name));
            None
        }
    }
}

fn canonical_location(value: &str) -> Option<&'static str> {
    let value = value.trim();
    VALID_LOCATIONS
        .iter()
        .copied()
        .find(|location| location.eq_ignore_ascii_case(value))
}
