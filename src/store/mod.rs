//! Dual persistence layer: a remote structured store with a local
//! key-value fallback.
//!
//! Writes go to the remote store first and degrade to a local bucket
//! when it is unavailable; every write reports which side took it via
//! [`Provenance`]. Reads always reconcile both sides: merged by id with
//! the remote copy winning conflicts, newest first. The two datasets can drift
//! while offline, but a reconciled read never hides either side.

pub mod local;
pub mod remote;

pub use local::LocalStore;
pub use remote::{HttpRemoteStore, MockRemote, RemoteStore};

use std::collections::HashSet;
use std::marker::PhantomData;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Remote store unavailable: {0}")]
    Unavailable(String),

    #[error("Remote store error {status}: {body}")]
    Backend { status: u16, body: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Local store error: {0}")]
    Local(#[from] rusqlite::Error),

    #[error("Local store migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("Local store lock poisoned")]
    LockPoisoned,
}

/// Which side of the store split actually persisted a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Remote,
    Local,
}

/// A record that can live in a [`Collection`].
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// Remote collection name; also the local bucket prefix.
    const COLLECTION: &'static str;

    fn id(&self) -> Uuid;
    fn owner_id(&self) -> &str;
    fn created_at(&self) -> DateTime<Utc>;
}

/// One record collection spanning the remote store and the local
/// fallback buckets.
pub struct Collection<T: Record> {
    remote: Arc<dyn RemoteStore>,
    local: Arc<LocalStore>,
    _record: PhantomData<T>,
}

impl<T: Record> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            remote: Arc::clone(&self.remote),
            local: Arc::clone(&self.local),
            _record: PhantomData,
        }
    }
}

impl<T: Record> Collection<T> {
    pub fn new(remote: Arc<dyn RemoteStore>, local: Arc<LocalStore>) -> Self {
        Self {
            remote,
            local,
            _record: PhantomData,
        }
    }

    fn bucket_key(owner_id: &str) -> String {
        format!("{}_{owner_id}", T::COLLECTION)
    }

    /// List the owner's records, newest first, reconciling both sides.
    /// Remote unavailability degrades to the local bucket alone.
    pub async fn list(&self, owner_id: &str) -> Result<Vec<T>, StoreError> {
        let remote = match self.remote.list(T::COLLECTION, owner_id).await {
            Ok(values) => values
                .into_iter()
                .map(serde_json::from_value)
                .collect::<Result<Vec<T>, _>>()?,
            Err(err) => {
                tracing::warn!(collection = T::COLLECTION, %err, "remote list failed, reading local bucket only");
                Vec::new()
            }
        };

        let local = self.read_bucket(owner_id)?;

        let remote_ids: HashSet<Uuid> = remote.iter().map(Record::id).collect();
        let mut merged = remote;
        merged.extend(local.into_iter().filter(|r| !remote_ids.contains(&r.id())));
        merged.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(merged)
    }

    /// Find one record by id within the owner's reconciled list.
    pub async fn get(&self, owner_id: &str, id: Uuid) -> Result<Option<T>, StoreError> {
        Ok(self.list(owner_id).await?.into_iter().find(|r| r.id() == id))
    }

    /// Create a record: remote first, local bucket on remote failure.
    pub async fn create(&self, record: &T) -> Result<Provenance, StoreError> {
        let value = serde_json::to_value(record)?;
        match self.remote.create(T::COLLECTION, &value).await {
            Ok(()) => Ok(Provenance::Remote),
            Err(err) => {
                tracing::warn!(collection = T::COLLECTION, %err, "remote create failed, writing local bucket");
                let mut bucket = self.read_bucket(record.owner_id())?;
                bucket.push(record.clone());
                self.write_bucket(record.owner_id(), &bucket)?;
                Ok(Provenance::Local)
            }
        }
    }

    /// Full-record replace. The remote path updates by id; the fallback
    /// path replaces the record in the bucket, or appends it so the
    /// write survives until the next reconciled read.
    pub async fn update(&self, record: &T) -> Result<Provenance, StoreError> {
        let value = serde_json::to_value(record)?;
        match self
            .remote
            .update(T::COLLECTION, &record.id().to_string(), &value)
            .await
        {
            Ok(()) => Ok(Provenance::Remote),
            Err(err) => {
                tracing::warn!(collection = T::COLLECTION, %err, "remote update failed, writing local bucket");
                let mut bucket = self.read_bucket(record.owner_id())?;
                match bucket.iter_mut().find(|r| r.id() == record.id()) {
                    Some(slot) => *slot = record.clone(),
                    None => bucket.push(record.clone()),
                }
                self.write_bucket(record.owner_id(), &bucket)?;
                Ok(Provenance::Local)
            }
        }
    }

    /// Delete by id from both sides. Unknown ids are a no-op.
    pub async fn delete(&self, owner_id: &str, id: Uuid) -> Result<(), StoreError> {
        if let Err(err) = self.remote.delete(T::COLLECTION, &id.to_string()).await {
            tracing::warn!(collection = T::COLLECTION, %err, "remote delete failed, removing from local bucket only");
        }
        let mut bucket = self.read_bucket(owner_id)?;
        let before = bucket.len();
        bucket.retain(|r| r.id() != id);
        if bucket.len() != before {
            self.write_bucket(owner_id, &bucket)?;
        }
        Ok(())
    }

    fn read_bucket(&self, owner_id: &str) -> Result<Vec<T>, StoreError> {
        match self.local.get(&Self::bucket_key(owner_id))? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    fn write_bucket(&self, owner_id: &str, records: &[T]) -> Result<(), StoreError> {
        let raw = serde_json::to_string(records)?;
        self.local.set(&Self::bucket_key(owner_id), &raw)?;
        Ok(())
    }
}
