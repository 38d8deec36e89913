use std::fmt;
use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use tracing::{info, warn};

use crate::backend::{Document, Identity, RecordStore};
use crate::collections::Collections;
use crate::error::StoreError;
use crate::field::{FieldValue, Fields};
use crate::forms::ApplicationForm;

const STATUS_KEY: &str = "status";
const SUBMITTED_AT_KEY: &str = "submittedAt";
const OWNER_KEY: &str = "userId";
const VARIANT_KEY: &str = "variant";

/// Review status of a submission. Anything but pending is set by staff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplicationStatus {
    Pending,
    Other(String),
}

impl ApplicationStatus {
    pub const PENDING_LABEL: &'static str = "В ожидании";

    pub fn from_label(label: &str) -> Self {
        match label {
            Self::PENDING_LABEL | "Pending" => ApplicationStatus::Pending,
            other => ApplicationStatus::Other(other.to_string()),
        }
    }

    /// Label as stored and shown.
    pub fn label(&self) -> &str {
        match self {
            ApplicationStatus::Pending => Self::PENDING_LABEL,
            ApplicationStatus::Other(label) => label,
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A stored wizard submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRecord {
    pub owner: String,
    pub status: ApplicationStatus,
    /// RFC 3339; missing on records created outside this client.
    pub submitted_at: Option<String>,
    pub variant: Option<String>,
    /// The form snapshot.
    pub fields: Fields,
}

impl SubmissionRecord {
    pub fn new<F: ApplicationForm>(owner: &Identity, form: &F, submitted_at: String) -> Self {
        Self {
            owner: owner.uid.clone(),
            status: ApplicationStatus::Pending,
            submitted_at: Some(submitted_at),
            variant: Some(F::VARIANT.to_string()),
            fields: form.to_fields(),
        }
    }

    pub fn from_document(document: Document) -> Result<Self, StoreError> {
        let status = document
            .text(STATUS_KEY)
            .map(ApplicationStatus::from_label)
            .ok_or_else(|| StoreError::Malformed {
                id: document.id.clone(),
                message: "submission without status".into(),
            })?;
        let submitted_at = document.text(SUBMITTED_AT_KEY).map(str::to_string);
        let variant = document.text(VARIANT_KEY).map(str::to_string);
        let owner = document
            .text(OWNER_KEY)
            .map(str::to_string)
            .unwrap_or_else(|| document.id.clone());

        let mut fields = document.fields;
        for key in [STATUS_KEY, SUBMITTED_AT_KEY, OWNER_KEY, VARIANT_KEY] {
            fields.remove(key);
        }

        Ok(Self {
            owner,
            status,
            submitted_at,
            variant,
            fields,
        })
    }

    pub fn to_fields(&self) -> Fields {
        let mut fields = self.fields.clone();
        fields.insert(STATUS_KEY.into(), self.status.label().into());
        fields.insert(OWNER_KEY.into(), self.owner.as_str().into());
        if let Some(at) = &self.submitted_at {
            fields.insert(SUBMITTED_AT_KEY.into(), at.as_str().into());
        }
        if let Some(variant) = &self.variant {
            fields.insert(VARIANT_KEY.into(), FieldValue::Text(variant.clone()));
        }
        fields
    }
}

/// Result of the terminal write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created(ApplicationStatus),
    /// A record already existed; nothing was written.
    Duplicate(ApplicationStatus),
}

impl SubmitOutcome {
    pub fn status(&self) -> &ApplicationStatus {
        match self {
            SubmitOutcome::Created(status) | SubmitOutcome::Duplicate(status) => status,
        }
    }
}

/// Reads and writes wizard submissions (`applicants/{uid}`).
#[derive(Clone)]
pub struct Applications {
    store: Arc<dyn RecordStore>,
    collection: String,
}

impl Applications {
    pub fn new(store: Arc<dyn RecordStore>, collections: &Collections) -> Self {
        Self {
            store,
            collection: collections.applicants.clone(),
        }
    }

    pub async fn find(&self, identity: &Identity) -> Result<Option<SubmissionRecord>, StoreError> {
        match self.store.get_record(&self.collection, &identity.uid).await {
            Ok(Some(document)) => SubmissionRecord::from_document(document).map(Some),
            Ok(None) => Ok(None),
            Err(err) => {
                warn!(uid = %identity.uid, error = %err, "failed to read submission");
                Err(err)
            }
        }
    }

    /// Write the submission unless one already exists for the identity.
    ///
    /// The existence check and the write are two separate calls. Two clients
    /// racing past the check both write, and the later write wins.
    pub async fn submit<F: ApplicationForm>(
        &self,
        identity: &Identity,
        form: &F,
    ) -> Result<SubmitOutcome, StoreError> {
        if let Some(existing) = self.find(identity).await? {
            info!(uid = %identity.uid, status = %existing.status, "submission already exists");
            return Ok(SubmitOutcome::Duplicate(existing.status));
        }

        let submitted_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let record = SubmissionRecord::new(identity, form, submitted_at);
        if let Err(err) = self
            .store
            .put_record(&self.collection, &identity.uid, record.to_fields())
            .await
        {
            warn!(uid = %identity.uid, error = %err, "failed to write submission");
            return Err(err);
        }

        info!(uid = %identity.uid, variant = F::VARIANT, "submission created");
        Ok(SubmitOutcome::Created(record.status))
    }
}
