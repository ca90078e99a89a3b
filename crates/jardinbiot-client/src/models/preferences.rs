use serde::{Deserialize, Serialize};

/// Per-user settings (`/api/me/preferences/`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preferences {
    /// "metric" or "imperial".
    #[serde(default)]
    pub units: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    /// Local time of day reminders are delivered, "HH:MM".
    #[serde(default)]
    pub reminder_time: Option<String>,
    #[serde(default)]
    pub notify_weather_alerts: Option<bool>,
    #[serde(default)]
    pub notify_watering_reminders: Option<bool>,
    #[serde(default)]
    pub hardiness_zone: Option<String>,
}

/// Partial preferences update; unset fields keep their server value.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PreferencesPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify_weather_alerts: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify_watering_reminders: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hardiness_zone: Option<String>,
}
