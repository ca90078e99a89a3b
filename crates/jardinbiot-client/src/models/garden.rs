use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A garden as returned by `/api/gardens/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Garden {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub specimen_count: Option<i64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Garden {
    pub fn display_specimen_count(&self) -> String {
        match self.specimen_count {
            Some(1) => "1 specimen".to_string(),
            Some(count) => format!("{} specimens", count),
            None => "No specimens recorded".to_string(),
        }
    }
}

/// Body for creating or updating a garden.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GardenPayload {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}
