//! In-memory [`ObjectStore`] for unit tests

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use async_trait::async_trait;
use vekit_core::{Error, Result};

use crate::store::{Acl, ObjectStore, PutObjectOutput, PutOptions, StorageClass};

#[derive(Debug, Default)]
struct State {
    buckets: BTreeSet<String>,
    objects: BTreeMap<(String, String), Vec<u8>>,
    acls: BTreeMap<(String, String), Acl>,
    head_calls: usize,
    create_calls: usize,
}

/// Buckets and objects kept in a map; puts to keys containing a configured
/// marker fail with a 500
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    fail_keys_containing: Vec<String>,
    head_error: Option<u16>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bucket(self, bucket: &str) -> Self {
        self.lock().buckets.insert(bucket.to_string());
        self
    }

    /// Fail every put whose key contains `marker`
    pub fn failing_on(mut self, marker: &str) -> Self {
        self.fail_keys_containing.push(marker.to_string());
        self
    }

    /// Make `head_bucket` fail with `status`
    pub fn head_failing_with(mut self, status: u16) -> Self {
        self.head_error = Some(status);
        self
    }

    pub fn has_bucket(&self, bucket: &str) -> bool {
        self.lock().buckets.contains(bucket)
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.lock()
            .objects
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    /// Seed an object directly, bypassing failure injection
    pub fn insert_object(&self, bucket: &str, key: &str, body: Vec<u8>) {
        let mut state = self.lock();
        state.buckets.insert(bucket.to_string());
        state
            .objects
            .insert((bucket.to_string(), key.to_string()), body);
    }

    pub fn acl(&self, bucket: &str, key: &str) -> Option<Acl> {
        self.lock()
            .acls
            .get(&(bucket.to_string(), key.to_string()))
            .copied()
    }

    pub fn keys(&self, bucket: &str) -> Vec<String> {
        self.lock()
            .objects
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, k)| k.clone())
            .collect()
    }

    pub fn head_calls(&self) -> usize {
        self.lock().head_calls
    }

    pub fn create_calls(&self) -> usize {
        self.lock().create_calls
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn head_bucket(&self, bucket: &str) -> Result<()> {
        let mut state = self.lock();
        state.head_calls += 1;

        if let Some(status) = self.head_error {
            return Err(Error::storage_status(status, None, "head failed"));
        }
        if state.buckets.contains(bucket) {
            Ok(())
        } else {
            Err(Error::storage_status(404, Some("NoSuchBucket".to_string()), bucket))
        }
    }

    async fn create_bucket(&self, bucket: &str, _acl: Acl, _class: StorageClass) -> Result<()> {
        let mut state = self.lock();
        state.create_calls += 1;
        state.buckets.insert(bucket.to_string());
        Ok(())
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        options: &PutOptions,
    ) -> Result<PutObjectOutput> {
        if self.fail_keys_containing.iter().any(|m| key.contains(m)) {
            return Err(Error::storage_status(500, Some("InternalError".to_string()), key));
        }

        let mut state = self.lock();
        if !state.buckets.contains(bucket) {
            return Err(Error::storage_status(404, Some("NoSuchBucket".to_string()), bucket));
        }

        let id = (bucket.to_string(), key.to_string());
        if let Some(acl) = options.acl {
            state.acls.insert(id.clone(), acl);
        }
        state.objects.insert(id, body);
        Ok(PutObjectOutput {
            etag: Some(format!("\"{}\"", key.len())),
        })
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        self.object(bucket, key)
            .ok_or_else(|| Error::storage_status(404, Some("NoSuchKey".to_string()), key))
    }

    fn presign_get(&self, bucket: &str, key: &str, expires_secs: u64) -> Result<String> {
        Ok(format!(
            "memory://{}/{}?X-Tos-Expires={}",
            bucket, key, expires_secs
        ))
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        format!("memory://{}/{}", bucket, key)
    }
}
