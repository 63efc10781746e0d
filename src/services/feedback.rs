use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::{fs::OpenOptions, io::AsyncWriteExt, sync::Mutex};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

const REQUIRED_FIELDS: [&str; 3] = ["user_preferences", "selected_event", "feedback"];

/// One line of the feedback log
#[derive(Debug, Clone, Serialize)]
pub struct FeedbackRecord {
    pub timestamp: DateTime<Utc>,
    pub user_preferences: Value,
    pub recommendations_shown: usize,
    pub selected_event: Value,
    pub feedback: Value,
    pub session_id: String,
}

impl FeedbackRecord {
    /// Builds a record from a request body, listing every missing field
    pub fn from_request(body: &Value) -> AppResult<Self> {
        let Some(object) = body.as_object() else {
            return Err(AppError::Validation(vec![
                "Request body must be a JSON object".to_string(),
            ]));
        };

        let missing: Vec<String> = REQUIRED_FIELDS
            .iter()
            .filter(|field| object.get(**field).map_or(true, Value::is_null))
            .map(|field| format!("Missing required field: {}", field))
            .collect();
        if !missing.is_empty() {
            return Err(AppError::Validation(missing));
        }

        let recommendations_shown = object
            .get("recommendations_shown")
            .and_then(Value::as_array)
            .map_or(0, Vec::len);

        Ok(Self {
            timestamp: Utc::now(),
            user_preferences: object["user_preferences"].clone(),
            recommendations_shown,
            selected_event: object["selected_event"].clone(),
            feedback: object["feedback"].clone(),
            session_id: short_session_id(),
        })
    }
}

fn short_session_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

/// Append-only JSON-lines feedback log
///
/// Writes are serialised through a mutex so concurrent requests never
/// interleave partial lines.
pub struct FeedbackLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FeedbackLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub async fn append(&self, record: &FeedbackRecord) -> AppResult<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let _guard = self.lock.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        tracing::info!(session_id = %record.session_id, "Feedback recorded");

        Ok(())
    }
}
