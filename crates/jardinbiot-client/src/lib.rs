//! JardinBiot API client
//!
//! A Rust client library for the JardinBiot gardening tracker backend,
//! with keychain credential storage, automatic JWT refresh with
//! single-flight deduplication, and typed endpoint calls for gardens,
//! specimens, the organism catalog, preferences, alerts, and reminders.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{ApiClient, ApiError, ApiRequest, FormData, Page, Result};
pub use auth::{KeyringTokenStore, MemoryTokenStore, TokenPair, TokenStore};
pub use config::ClientConfig;
pub use models::{
    Garden, GardenPayload, Organism, OrganismPayload, OrganismQuery, PhotoUpload, Preferences,
    PreferencesPatch, Reminder, Specimen, SpecimenPatch, SpecimenPayload, WeatherAlert,
};
