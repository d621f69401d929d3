//! Remote structured-store client.
//!
//! The backend exposes per-collection CRUD over HTTP. Records travel as
//! raw JSON values so one client serves every collection; typed
//! encoding/decoding happens in [`super::Collection`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::StoreError;

#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// List the owner's records in the collection, unordered.
    async fn list(&self, collection: &str, owner_id: &str) -> Result<Vec<Value>, StoreError>;

    async fn create(&self, collection: &str, record: &Value) -> Result<(), StoreError>;

    /// Full-record replace by id.
    async fn update(&self, collection: &str, id: &str, record: &Value) -> Result<(), StoreError>;

    /// Must be a no-op for unknown ids.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;
}

/// HTTP implementation against the backend structured store.
pub struct HttpRemoteStore {
    base_url: String,
    client: reqwest::Client,
}

impl HttpRemoteStore {
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn map_transport(&self, err: reqwest::Error) -> StoreError {
        if err.is_connect() || err.is_timeout() {
            StoreError::Unavailable(self.base_url.clone())
        } else {
            StoreError::Unavailable(err.to_string())
        }
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Backend {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn list(&self, collection: &str, owner_id: &str) -> Result<Vec<Value>, StoreError> {
        let url = format!("{}/db/{collection}", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("userId", owner_id)])
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;
        let response = Self::check(response).await?;
        response
            .json::<Vec<Value>>()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }

    async fn create(&self, collection: &str, record: &Value) -> Result<(), StoreError> {
        let url = format!("{}/db/{collection}", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(record)
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;
        Self::check(response).await?;
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, record: &Value) -> Result<(), StoreError> {
        let url = format!("{}/db/{collection}/{id}", self.base_url);
        let response = self
            .client
            .put(&url)
            .json(record)
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;
        Self::check(response).await?;
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let url = format!("{}/db/{collection}/{id}", self.base_url);
        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;
        // Unknown ids are a no-op, not an error.
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(());
        }
        Self::check(response).await?;
        Ok(())
    }
}

/// In-memory remote store with a switchable offline flag, used to test
/// the fallback path without a backend.
pub struct MockRemote {
    collections: Mutex<HashMap<String, Vec<Value>>>,
    offline: AtomicBool,
}

impl MockRemote {
    pub fn new() -> Self {
        Self {
            collections: Mutex::new(HashMap::new()),
            offline: AtomicBool::new(false),
        }
    }

    /// While offline, every call fails with `StoreError::Unavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn guard(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("mock remote offline".into()));
        }
        Ok(())
    }
}

impl Default for MockRemote {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteStore for MockRemote {
    async fn list(&self, collection: &str, owner_id: &str) -> Result<Vec<Value>, StoreError> {
        self.guard()?;
        let collections = self.collections.lock().expect("mock remote lock poisoned");
        Ok(collections
            .get(collection)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| r["userId"] == owner_id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn create(&self, collection: &str, record: &Value) -> Result<(), StoreError> {
        self.guard()?;
        let mut collections = self.collections.lock().expect("mock remote lock poisoned");
        collections
            .entry(collection.to_string())
            .or_default()
            .push(record.clone());
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, record: &Value) -> Result<(), StoreError> {
        self.guard()?;
        let mut collections = self.collections.lock().expect("mock remote lock poisoned");
        if let Some(records) = collections.get_mut(collection) {
            if let Some(slot) = records.iter_mut().find(|r| r["id"] == id) {
                *slot = record.clone();
            }
        }
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.guard()?;
        let mut collections = self.collections.lock().expect("mock remote lock poisoned");
        if let Some(records) = collections.get_mut(collection) {
            records.retain(|r| r["id"] != id);
        }
        Ok(())
    }
}
