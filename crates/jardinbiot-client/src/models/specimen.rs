use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::Organism;

/// A specimen: one plant growing in one garden (`/api/specimens/`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Specimen {
    pub id: i64,
    pub garden: i64,
    pub organism: i64,
    /// Expanded organism record, present on detail responses.
    #[serde(default)]
    pub organism_detail: Option<Organism>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub planted_on: Option<NaiveDate>,
    #[serde(default)]
    pub last_watered_on: Option<NaiveDate>,
    #[serde(default)]
    pub health: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    /// URL of the uploaded photo, if any.
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Specimen {
    /// The user's label when set, else the organism name, else a generic
    /// fallback.
    pub fn display_label(&self) -> String {
        if let Some(ref label) = self.label {
            if !label.is_empty() {
                return label.clone();
            }
        }
        match self.organism_detail {
            Some(ref organism) => organism.display_name(),
            None => format!("Specimen #{}", self.id),
        }
    }
}

/// Body for creating a specimen.
#[derive(Debug, Clone, Serialize)]
pub struct SpecimenPayload {
    pub garden: i64,
    pub organism: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub planted_on: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Partial update for a specimen; unset fields keep their server value.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SpecimenPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub garden: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_watered_on: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// An image to attach to a specimen.
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}
