use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use applicant::{
    AuthError, Document, Fields, Identity, IdentityProvider, Query, RecordStore, StoreError,
};
use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use async_trait::async_trait;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::BackendError;

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Account {
    uid: String,
    hash: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Snapshot {
    /// Keyed by email.
    accounts: BTreeMap<String, Account>,
    collections: BTreeMap<String, BTreeMap<String, Fields>>,
}

/// Identity provider and record store in one process.
///
/// With a snapshot path every mutation is written through to a JSON file
/// (temp file + rename), so the local mode survives restarts. A mutation
/// becomes visible only after its snapshot has been written.
pub struct MemoryBackend {
    state: RwLock<Snapshot>,
    snapshot: Option<PathBuf>,
    offline: AtomicBool,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    /// Purely in memory.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(Snapshot::default()),
            snapshot: None,
            offline: AtomicBool::new(false),
        }
    }

    /// Backed by a snapshot file; loads it when it exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, BackendError> {
        let path = path.as_ref().to_path_buf();
        let state = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            serde_json::from_str(&content).map_err(|source| BackendError::Snapshot {
                path: path.display().to_string(),
                source,
            })?
        } else {
            Snapshot::default()
        };
        debug!(path = %path.display(), "local store opened");
        Ok(Self {
            state: RwLock::new(state),
            snapshot: Some(path),
            offline: AtomicBool::new(false),
        })
    }

    /// Make every call fail with a network error until switched back.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Insert or replace a record directly, bypassing the offline switch.
    pub async fn seed(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        self.commit(|next| next.insert_record(collection, id, fields))
            .await
    }

    /// Number of records in a collection.
    pub async fn count(&self, collection: &str) -> usize {
        self.state
            .read()
            .await
            .collections
            .get(collection)
            .map_or(0, BTreeMap::len)
    }

    fn check_online(&self) -> Result<(), String> {
        if self.offline.load(Ordering::SeqCst) {
            return Err("local backend is offline".to_string());
        }
        Ok(())
    }

    /// Apply `change` to a copy of the state, write the copy, then swap it in.
    async fn commit<F>(&self, change: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut Snapshot),
    {
        let mut state = self.state.write().await;
        let mut next = state.clone();
        change(&mut next);
        self.persist(&next).await?;
        *state = next;
        Ok(())
    }

    async fn persist(&self, state: &Snapshot) -> Result<(), StoreError> {
        let Some(path) = &self.snapshot else {
            return Ok(());
        };
        let json =
            serde_json::to_vec_pretty(state).map_err(|err| StoreError::Unknown(err.to_string()))?;
        let tmp = path.with_extension("tmp");
        let write = async {
            if let Some(dir) = path.parent() {
                tokio::fs::create_dir_all(dir).await?;
            }
            tokio::fs::write(&tmp, json).await?;
            tokio::fs::rename(&tmp, path).await
        };
        write.await.map_err(|err| {
            warn!(path = %path.display(), error = %err, "failed to write local store");
            StoreError::Unknown(err.to_string())
        })
    }
}

impl Snapshot {
    fn insert_record(&mut self, collection: &str, id: &str, fields: Fields) {
        self.collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), fields);
    }
}

fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| AuthError::Unknown(format!("failed to hash password: {err}")))
}

fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed =
        PasswordHash::new(hash).map_err(|err| AuthError::Unknown(format!("invalid stored hash: {err}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[async_trait]
impl IdentityProvider for MemoryBackend {
    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        self.check_online().map_err(AuthError::Network)?;
        if !email.contains('@') {
            return Err(AuthError::InvalidEmail);
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword);
        }

        let mut state = self.state.write().await;
        if state.accounts.contains_key(email) {
            return Err(AuthError::EmailInUse);
        }
        let account = Account {
            uid: Uuid::new_v4().simple().to_string(),
            hash: hash_password(password)?,
        };
        let identity = Identity::new(account.uid.clone(), email);
        let mut next = state.clone();
        next.accounts.insert(email.to_string(), account);
        self.persist(&next)
            .await
            .map_err(|err| AuthError::Unknown(err.to_string()))?;
        *state = next;
        debug!(uid = %identity.uid, "local account created");
        Ok(identity)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        self.check_online().map_err(AuthError::Network)?;
        if !email.contains('@') {
            return Err(AuthError::InvalidEmail);
        }
        let state = self.state.read().await;
        let account = state.accounts.get(email).ok_or(AuthError::NotFound)?;
        if !verify_password(password, &account.hash)? {
            return Err(AuthError::WrongPassword);
        }
        Ok(Identity::new(account.uid.clone(), email))
    }

    async fn sign_out(&self, _identity: &Identity) -> Result<(), AuthError> {
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryBackend {
    async fn get_record(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        self.check_online().map_err(StoreError::Network)?;
        let state = self.state.read().await;
        Ok(state
            .collections
            .get(collection)
            .and_then(|records| records.get(id))
            .map(|fields| Document::new(id, fields.clone())))
    }

    async fn put_record(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<(), StoreError> {
        self.check_online().map_err(StoreError::Network)?;
        self.commit(|next| next.insert_record(collection, id, fields))
            .await
    }

    async fn update_record(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<(), StoreError> {
        self.check_online().map_err(StoreError::Network)?;
        let mut state = self.state.write().await;
        let mut next = state.clone();
        let Some(existing) = next
            .collections
            .get_mut(collection)
            .and_then(|records| records.get_mut(id))
        else {
            return Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        };
        existing.extend(fields);
        self.persist(&next).await?;
        *state = next;
        Ok(())
    }

    async fn query_records(
        &self,
        collection: &str,
        query: &Query,
    ) -> Result<Vec<Document>, StoreError> {
        self.check_online().map_err(StoreError::Network)?;
        let state = self.state.read().await;
        Ok(state
            .collections
            .get(collection)
            .into_iter()
            .flatten()
            .filter(|(_, fields)| query.matches(fields))
            .map(|(id, fields)| Document::new(id.clone(), fields.clone()))
            .collect())
    }

    async fn create_record(&self, collection: &str, fields: Fields) -> Result<String, StoreError> {
        self.check_online().map_err(StoreError::Network)?;
        let id = Uuid::new_v4().simple().to_string();
        self.commit(|next| next.insert_record(collection, &id, fields))
            .await?;
        Ok(id)
    }
}
