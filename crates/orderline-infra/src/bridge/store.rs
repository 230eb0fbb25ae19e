//! Local session record, keyed by the fixed client identifier.
//!
//! The bridge keeps the WhatsApp credentials for an instance. Locally we
//! keep just enough to find that instance again after a restart (its name
//! and per-instance token), stored as `{dir}/{client_id}.json`. A present
//! record means "reuse the existing instance"; no record means "create one".

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use orderline_types::error::ConfigError;

/// What we remember about a bridge instance between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub client_id: String,
    /// Per-instance token issued by the bridge on create, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_token: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn new(client_id: impl Into<String>, instance_token: Option<String>) -> Self {
        Self {
            client_id: client_id.into(),
            instance_token,
            created_at: Utc::now(),
        }
    }
}

/// JSON file store for [`SessionRecord`]s.
#[derive(Debug, Clone)]
pub struct SessionRecordStore {
    dir: PathBuf,
}

impl SessionRecordStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, client_id: &str) -> PathBuf {
        let safe: String = client_id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{safe}.json"))
    }

    /// Load the record for `client_id`, or `None` if there is none yet.
    pub async fn load(&self, client_id: &str) -> Result<Option<SessionRecord>, ConfigError> {
        let path = self.path_for(client_id);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| ConfigError::Parse(format!("{}: {e}", path.display())))
    }

    pub async fn save(&self, record: &SessionRecord) -> Result<(), ConfigError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let json = serde_json::to_string_pretty(record)
            .map_err(|e| ConfigError::Parse(e.to_string()))?;
        let path = self.path_for(&record.client_id);
        tokio::fs::write(&path, json).await?;
        tracing::debug!(path = %path.display(), "Saved session record");
        Ok(())
    }

    /// Forget the record so the next start creates a fresh instance.
    pub async fn remove(&self, client_id: &str) -> Result<(), ConfigError> {
        match tokio::fs::remove_file(self.path_for(client_id)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
