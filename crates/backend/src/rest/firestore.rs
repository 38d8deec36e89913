use applicant::{Document, FieldValue, Fields, Query, RecordStore, StoreError};
use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde_json::{Map, Value, json};
use tracing::{debug, warn};

use super::RestBackend;

fn encode_value(value: &FieldValue) -> Value {
    match value {
        FieldValue::Flag(flag) => json!({ "booleanValue": flag }),
        FieldValue::Text(text) => json!({ "stringValue": text }),
    }
}

/// Typed Firestore value to a flat field. Nulls, maps, arrays and
/// references have no flat counterpart and are skipped.
fn decode_value(value: &Value) -> Option<FieldValue> {
    let object = value.as_object()?;
    let (kind, inner) = object.iter().next()?;
    match kind.as_str() {
        "stringValue" | "timestampValue" | "integerValue" => {
            inner.as_str().map(|text| FieldValue::Text(text.to_string()))
        }
        "booleanValue" => inner.as_bool().map(FieldValue::Flag),
        "doubleValue" => inner.as_f64().map(|n| FieldValue::Text(n.to_string())),
        _ => None,
    }
}

pub(crate) fn encode_fields(fields: &Fields) -> Value {
    let encoded: Map<String, Value> = fields
        .iter()
        .map(|(key, value)| (key.clone(), encode_value(value)))
        .collect();
    json!({ "fields": encoded })
}

/// Decode a document resource; the id is the last segment of its `name`.
pub(crate) fn decode_document(body: &Value) -> Result<Document, StoreError> {
    let name = body["name"].as_str().ok_or_else(|| StoreError::Malformed {
        id: String::new(),
        message: "document without a name".into(),
    })?;
    let id = name.rsplit('/').next().unwrap_or(name).to_string();
    let fields = body["fields"]
        .as_object()
        .map(|fields| {
            fields
                .iter()
                .filter_map(|(key, value)| decode_value(value).map(|v| (key.clone(), v)))
                .collect()
        })
        .unwrap_or_default();
    Ok(Document::new(id, fields))
}

pub(crate) fn structured_query(collection: &str, query: &Query) -> Value {
    let mut filters: Vec<Value> = query
        .filters()
        .iter()
        .map(|(key, value)| {
            json!({
                "fieldFilter": {
                    "field": { "fieldPath": key },
                    "op": "EQUAL",
                    "value": encode_value(value),
                }
            })
        })
        .collect();

    let mut structured = json!({ "from": [{ "collectionId": collection }] });
    let filter = match filters.len() {
        0 => None,
        1 => filters.pop(),
        _ => Some(json!({ "compositeFilter": { "op": "AND", "filters": filters } })),
    };
    if let Some(filter) = filter {
        structured["where"] = filter;
    }
    json!({ "structuredQuery": structured })
}

/// Query parameters for a PATCH that touches only `fields` and fails on a
/// missing document.
pub(crate) fn update_params(fields: &Fields) -> Vec<(&'static str, String)> {
    let mut params: Vec<_> = fields
        .keys()
        .map(|key| ("updateMask.fieldPaths", key.clone()))
        .collect();
    params.push(("currentDocument.exists", "true".to_string()));
    params
}

fn transport(err: reqwest::Error) -> StoreError {
    StoreError::Network(err.to_string())
}

async fn checked(response: Response) -> Result<Value, StoreError> {
    let status = response.status();
    let body: Value = response.json().await.map_err(transport)?;
    if status.is_success() {
        return Ok(body);
    }
    let message = body["error"]["message"]
        .as_str()
        .unwrap_or(status.as_str())
        .to_string();
    debug!(%status, %message, "record call rejected");
    Err(StoreError::Unknown(message))
}

impl RestBackend {
    fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{collection}/{id}", self.documents_url)
    }
}

#[async_trait]
impl RecordStore for RestBackend {
    async fn get_record(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let request = self.http.get(self.document_url(collection, id));
        let response = self.authorized(request).await.send().await.map_err(transport)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body = checked(response).await?;
        decode_document(&body).map(Some)
    }

    async fn put_record(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<(), StoreError> {
        let request = self
            .http
            .patch(self.document_url(collection, id))
            .json(&encode_fields(&fields));
        let response = self.authorized(request).await.send().await.map_err(|err| {
            warn!(collection, id, error = %err, "record store unreachable");
            transport(err)
        })?;
        checked(response).await.map(|_| ())
    }

    async fn update_record(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<(), StoreError> {
        let request = self
            .http
            .patch(self.document_url(collection, id))
            .query(&update_params(&fields))
            .json(&encode_fields(&fields));
        let response = self.authorized(request).await.send().await.map_err(|err| {
            warn!(collection, id, error = %err, "record store unreachable");
            transport(err)
        })?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }
        checked(response).await.map(|_| ())
    }

    async fn query_records(
        &self,
        collection: &str,
        query: &Query,
    ) -> Result<Vec<Document>, StoreError> {
        let request = self
            .http
            .post(format!("{}:runQuery", self.documents_url))
            .json(&structured_query(collection, query));
        let response = self.authorized(request).await.send().await.map_err(transport)?;
        let body = checked(response).await?;

        // One entry per result; an empty result set is a single entry without `document`.
        body.as_array()
            .into_iter()
            .flatten()
            .filter_map(|entry| entry.get("document"))
            .map(decode_document)
            .collect()
    }

    async fn create_record(&self, collection: &str, fields: Fields) -> Result<String, StoreError> {
        let request = self
            .http
            .post(format!("{}/{collection}", self.documents_url))
            .json(&encode_fields(&fields));
        let response = self.authorized(request).await.send().await.map_err(|err| {
            warn!(collection, error = %err, "record store unreachable");
            transport(err)
        })?;
        let body = checked(response).await?;
        decode_document(&body).map(|document| document.id)
    }
}
