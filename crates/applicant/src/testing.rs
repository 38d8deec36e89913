//! In-process collaborators for unit tests.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::backend::{Document, Identity, IdentityProvider, Query, RecordStore};
use crate::error::{AuthError, StoreError};
use crate::field::Fields;

#[derive(Default)]
pub struct FakeStore {
    collections: Mutex<BTreeMap<String, BTreeMap<String, Fields>>>,
    reads: AtomicUsize,
    writes: AtomicUsize,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl FakeStore {
    pub fn insert(&self, collection: &str, id: &str, fields: Fields) {
        self.collections
            .lock()
            .unwrap()
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), fields);
    }

    pub fn count(&self, collection: &str) -> usize {
        self.collections
            .lock()
            .unwrap()
            .get(collection)
            .map_or(0, BTreeMap::len)
    }

    pub fn fields(&self, collection: &str, id: &str) -> Option<Fields> {
        self.collections
            .lock()
            .unwrap()
            .get(collection)
            .and_then(|c| c.get(id).cloned())
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_read(&self) -> Result<(), StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Network("read failed".into()));
        }
        Ok(())
    }

    fn check_write(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Network("write failed".into()));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl RecordStore for FakeStore {
    async fn get_record(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        self.check_read()?;
        Ok(self
            .fields(collection, id)
            .map(|fields| Document::new(id, fields)))
    }

    async fn put_record(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<(), StoreError> {
        self.check_write()?;
        self.insert(collection, id, fields);
        Ok(())
    }

    async fn update_record(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<(), StoreError> {
        self.check_write()?;
        let mut collections = self.collections.lock().unwrap();
        let existing = collections
            .get_mut(collection)
            .and_then(|records| records.get_mut(id))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;
        existing.extend(fields);
        Ok(())
    }

    async fn query_records(
        &self,
        collection: &str,
        query: &Query,
    ) -> Result<Vec<Document>, StoreError> {
        self.check_read()?;
        let collections = self.collections.lock().unwrap();
        Ok(collections
            .get(collection)
            .into_iter()
            .flatten()
            .filter(|(_, fields)| query.matches(fields))
            .map(|(id, fields)| Document::new(id.clone(), fields.clone()))
            .collect())
    }

    async fn create_record(&self, collection: &str, fields: Fields) -> Result<String, StoreError> {
        self.check_write()?;
        let id = format!("doc-{}", self.writes());
        self.insert(collection, &id, fields);
        Ok(id)
    }
}

/// Accepts any password of six or more characters; one account per email.
#[derive(Default)]
pub struct FakeIdentity {
    accounts: Mutex<BTreeMap<String, (String, String)>>,
    signed_out: AtomicUsize,
}

impl FakeIdentity {
    pub fn sign_outs(&self) -> usize {
        self.signed_out.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        if password.len() < 6 {
            return Err(AuthError::WeakPassword);
        }
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.contains_key(email) {
            return Err(AuthError::EmailInUse);
        }
        let uid = format!("uid-{}", accounts.len() + 1);
        accounts.insert(email.to_string(), (uid.clone(), password.to_string()));
        Ok(Identity::new(uid, email))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let accounts = self.accounts.lock().unwrap();
        match accounts.get(email) {
            None => Err(AuthError::NotFound),
            Some((_, stored)) if stored != password => Err(AuthError::WrongPassword),
            Some((uid, _)) => Ok(Identity::new(uid.clone(), email)),
        }
    }

    async fn sign_out(&self, _identity: &Identity) -> Result<(), AuthError> {
        self.signed_out.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
