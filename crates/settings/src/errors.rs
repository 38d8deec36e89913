use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ron error: {0}")]
    Ron(#[from] ron::Error),

    #[error("settings file {path} is not valid RON: {message}")]
    Parse { path: String, message: String },

    #[error("section not registered")]
    NotRegistered,

    #[error("section already registered: {0}")]
    AlreadyRegistered(&'static str),

    #[error("invalid settings: {0}")]
    Invalid(&'static str),

    #[error("settings lock poisoned")]
    Poisoned,
}
