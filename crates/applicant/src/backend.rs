//! Seams to the managed backend: an identity provider and a document store.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{AuthError, StoreError};
use crate::field::{FieldValue, Fields};

/// An authenticated principal as issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub uid: String,
    pub email: String,
    /// Bearer token for the record store, when the provider issues one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl Identity {
    pub fn new(uid: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: email.into(),
            token: None,
            refresh_token: None,
        }
    }
}

/// A stored record: its id within the collection and its flat fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Text value of a field, if present and textual.
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.fields.get(key) {
            Some(FieldValue::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// Text value of a field, empty when absent.
    pub fn text_or_empty(&self, key: &str) -> String {
        self.text(key).unwrap_or_default().to_string()
    }
}

/// Conjunction of equality filters. An empty query matches every record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    filters: Vec<(String, FieldValue)>,
}

impl Query {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.filters.push((key.into(), value.into()));
        self
    }

    pub fn filters(&self) -> &[(String, FieldValue)] {
        &self.filters
    }

    pub fn matches(&self, fields: &Fields) -> bool {
        self.filters
            .iter()
            .all(|(key, expected)| fields.get(key) == Some(expected))
    }
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, AuthError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError>;

    async fn sign_out(&self, identity: &Identity) -> Result<(), AuthError>;

    /// Re-activate an identity persisted by an earlier run.
    ///
    /// Providers with short-lived tokens exchange the refresh token here.
    async fn resume(&self, identity: Identity) -> Result<Identity, AuthError> {
        Ok(identity)
    }
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// `Ok(None)` when the record does not exist.
    async fn get_record(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Create or replace the record with the given id.
    async fn put_record(&self, collection: &str, id: &str, fields: Fields)
    -> Result<(), StoreError>;

    /// Overwrite only the given fields of an existing record; the others are kept.
    async fn update_record(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<(), StoreError>;

    async fn query_records(&self, collection: &str, query: &Query)
    -> Result<Vec<Document>, StoreError>;

    /// Create a record under a store-assigned id and return that id.
    async fn create_record(&self, collection: &str, fields: Fields) -> Result<String, StoreError>;
}
