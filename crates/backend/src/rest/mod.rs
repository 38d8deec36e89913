//! Client for the managed backend's REST API.
//!
//! Accounts go through the Identity Toolkit (`accounts:signUp`,
//! `accounts:signInWithPassword`), records through Firestore's `documents`
//! resource. The id token of the signed-in account is kept here and sent as
//! the bearer token of every record call.

mod auth;
mod firestore;

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use tokio::sync::RwLock;

use crate::config::BackendSettings;
use crate::error::BackendError;

pub struct RestBackend {
    http: Client,
    api_key: String,
    identity_endpoint: String,
    token_endpoint: String,
    documents_url: String,
    token: RwLock<Option<String>>,
}

impl RestBackend {
    pub fn new(settings: &BackendSettings) -> Result<Self, BackendError> {
        if settings.project_id.trim().is_empty() {
            return Err(BackendError::MissingProject);
        }
        if settings.api_key.trim().is_empty() {
            return Err(BackendError::MissingApiKey);
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            api_key: settings.api_key.clone(),
            identity_endpoint: trim_slash(&settings.identity_endpoint),
            token_endpoint: trim_slash(&settings.token_endpoint),
            documents_url: format!(
                "{}/projects/{}/databases/{}/documents",
                trim_slash(&settings.firestore_endpoint),
                settings.project_id,
                settings.database
            ),
            token: RwLock::new(None),
        })
    }

    /// Attach the API key and, when signed in, the bearer token.
    async fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.query(&[("key", self.api_key.as_str())]);
        match self.token.read().await.as_deref() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn set_token(&self, token: Option<String>) {
        *self.token.write().await = token;
    }
}

fn trim_slash(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}
