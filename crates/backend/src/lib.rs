//! Concrete collaborators behind the `applicant` traits.
//!
//! - [`memory::MemoryBackend`]: everything in process, optionally snapshotted
//!   to a JSON file. Used by tests and by the `local` mode.
//! - [`rest::RestBackend`]: the managed backend over HTTPS (Identity Toolkit
//!   for accounts, Firestore REST for records).

pub mod config;
pub mod error;
pub mod memory;
pub mod rest;

pub use config::{API_KEY_ENV, Backend, BackendMode, BackendSettings};
pub use error::BackendError;
pub use memory::MemoryBackend;
pub use rest::RestBackend;
