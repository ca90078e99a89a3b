use serde::{Deserialize, Serialize};

/// A plant species or variety from the shared catalog (`/api/organisms/`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organism {
    pub id: i64,
    pub common_name: String,
    #[serde(default)]
    pub scientific_name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub family: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub watering_interval_days: Option<u32>,
    #[serde(default)]
    pub sun_exposure: Option<String>,
    #[serde(default)]
    pub hardiness_zone: Option<String>,
}

impl Organism {
    /// Common name with the scientific name appended when known.
    pub fn display_name(&self) -> String {
        match self.scientific_name {
            Some(ref scientific) if !scientific.is_empty() => {
                format!("{} ({})", self.common_name, scientific)
            }
            _ => self.common_name.clone(),
        }
    }
}

/// Body for adding an organism to the catalog.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OrganismPayload {
    pub common_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scientific_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watering_interval_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sun_exposure: Option<String>,
}

/// Filters for the organism catalog listing.
#[derive(Debug, Clone, Default)]
pub struct OrganismQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub page: Option<u32>,
}
