//! Wire models for JardinBiot entities.
//!
//! The backend serializes snake_case JSON, so field names map directly.
//! Everything the server may omit or null is an `Option` with a serde
//! default, keeping older or partial server responses parseable.
//!
//! - `Garden`: a physical growing area owned by the user
//! - `Organism`: a catalog entry for a species/variety
//! - `Specimen`: one plant of an organism growing in a garden
//! - `Preferences`: per-user settings
//! - `WeatherAlert`, `Reminder`: pushed care information

pub mod alert;
pub mod garden;
pub mod organism;
pub mod preferences;
pub mod specimen;

pub use alert::{Reminder, WeatherAlert};
pub use garden::{Garden, GardenPayload};
pub use organism::{Organism, OrganismPayload, OrganismQuery};
pub use preferences::{Preferences, PreferencesPatch};
pub use specimen::{PhotoUpload, Specimen, SpecimenPatch, SpecimenPayload};
