use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("backend.project_id is not set")]
    MissingProject,

    #[error("backend.api_key is not set (configure it or export COLUMBUS_API_KEY)")]
    MissingApiKey,

    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("local store {path} is not valid JSON: {source}")]
    Snapshot {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
