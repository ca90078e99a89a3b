use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A weather alert affecting one of the user's gardens
/// (`/api/weather-alerts/`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherAlert {
    pub id: i64,
    #[serde(default)]
    pub garden: Option<i64>,
    /// Alert kind, e.g. "frost", "heatwave", "storm".
    pub kind: String,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
}

impl WeatherAlert {
    /// Whether the alert window covers the given instant. A missing bound
    /// is treated as open on that side.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        let started = self.starts_at.map(|t| t <= now).unwrap_or(true);
        let ended = self.ends_at.map(|t| t < now).unwrap_or(false);
        started && !ended
    }
}

/// An upcoming care task (`/api/reminders/upcoming/`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reminder {
    pub id: i64,
    pub specimen: i64,
    #[serde(default)]
    pub specimen_label: Option<String>,
    /// Care action, e.g. "water", "fertilize", "repot".
    pub action: String,
    #[serde(default)]
    pub due_on: Option<NaiveDate>,
    #[serde(default)]
    pub overdue: Option<bool>,
}

impl Reminder {
    pub fn is_due_by(&self, date: NaiveDate) -> bool {
        self.due_on.map(|due| due <= date).unwrap_or(false)
    }

    /// One-line description for list rendering.
    pub fn describe(&self) -> String {
        let subject = self
            .specimen_label
            .clone()
            .unwrap_or_else(|| format!("specimen #{}", self.specimen));
        match self.due_on {
            Some(due) => format!("{} {} by {}", self.action, subject, due),
            None => format!("{} {}", self.action, subject),
        }
    }
}
