//! Layered settings for the Columbus client.
//!
//! Each settings section is a plain `Default + Serialize + Deserialize`
//! struct. Only the difference against `Default` is written to disk, so
//! changing a default in code reaches every user who never touched that key.

mod errors;
mod store;

pub use errors::SettingsError;
pub use store::{SettingsStore, SettingsStoreBuilder};

/// A named section inside the settings file.
pub trait Settings: Send + Sync + 'static {
    /// Top-level key of the section in the RON file.
    const SECTION: &'static str;

    fn name() -> &'static str {
        Self::SECTION
    }
}
