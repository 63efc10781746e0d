use serde::Deserialize;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path to the exported classifier (JSON decision tree)
    #[serde(default = "default_model_path")]
    pub model_path: String,

    /// Path to the event table (JSON array of event records)
    #[serde(default = "default_events_path")]
    pub events_path: String,

    /// NASA open API key
    #[serde(default = "default_nasa_api_key")]
    pub nasa_api_key: String,

    /// NASA open API base URL
    #[serde(default = "default_nasa_api_url")]
    pub nasa_api_url: String,

    /// Upper bound for each outbound feed call
    #[serde(default = "default_external_timeout_secs")]
    pub external_timeout_secs: u64,

    /// Expiry window for cached results
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Allowed CORS origins, comma separated; `*` allows any
    #[serde(default = "default_cors_origins")]
    pub cors_origins: String,

    /// JSON-lines file that receives user feedback
    #[serde(default = "default_feedback_log_path")]
    pub feedback_log_path: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_model_path() -> String {
    "data/space_events_model.json".to_string()
}

fn default_events_path() -> String {
    "data/events_data.json".to_string()
}

fn default_nasa_api_key() -> String {
    "DEMO_KEY".to_string()
}

fn default_nasa_api_url() -> String {
    "https://api.nasa.gov".to_string()
}

fn default_external_timeout_secs() -> u64 {
    10
}

fn default_cache_ttl_secs() -> u64 {
    300
}

fn default_cors_origins() -> String {
    "*".to_string()
}

fn default_feedback_log_path() -> String {
    "user_feedback.jsonl".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            model_path: default_model_path(),
            events_path: default_events_path(),
            nasa_api_key: default_nasa_api_key(),
            nasa_api_url: default_nasa_api_url(),
            external_timeout_secs: default_external_timeout_secs(),
            cache_ttl_secs: default_cache_ttl_secs(),
            cors_origins: default_cors_origins(),
            feedback_log_path: default_feedback_log_path(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn external_timeout(&self) -> Duration {
        Duration::from_secs(self.external_timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Parsed CORS origins; `None` means any origin is allowed
    pub fn allowed_origins(&self) -> Option<Vec<String>> {
        let origins: Vec<String> = self
            .cors_origins
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect();

        if origins.is_empty() || origins.iter().any(|o| o == "*") {
            None
        } else {
            Some(origins)
        }
    }

    pub fn uses_demo_key(&self) -> bool {
        self.nasa_api_key == "DEMO_KEY"
    }
}
