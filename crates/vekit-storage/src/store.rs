//! Object-store abstraction

use std::path::Path;

use async_trait::async_trait;
use vekit_core::Result;

/// Canned bucket/object ACLs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acl {
    Private,
    PublicRead,
}

impl Acl {
    pub fn as_header(&self) -> &'static str {
        match self {
            Acl::Private => "private",
            Acl::PublicRead => "public-read",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageClass {
    Standard,
}

impl StorageClass {
    pub fn as_header(&self) -> &'static str {
        match self {
            StorageClass::Standard => "STANDARD",
        }
    }
}

/// Optional object attributes for a put
#[derive(Debug, Clone, Default)]
pub struct PutOptions {
    pub acl: Option<Acl>,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PutObjectOutput {
    pub etag: Option<String>,
}

/// Bucket and object operations the uploader needs
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// `Err` with status 404 when the bucket does not exist
    async fn head_bucket(&self, bucket: &str) -> Result<()>;

    async fn create_bucket(&self, bucket: &str, acl: Acl, class: StorageClass) -> Result<()>;

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        options: &PutOptions,
    ) -> Result<PutObjectOutput>;

    async fn put_object_from_file(
        &self,
        bucket: &str,
        key: &str,
        path: &Path,
    ) -> Result<PutObjectOutput> {
        let body = tokio::fs::read(path).await?;
        self.put_object(bucket, key, body, &PutOptions::default())
            .await
    }

    /// Whole object body; `Err` with status 404 when the key is missing
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;

    /// GET-scoped URL valid for `expires_secs`
    fn presign_get(&self, bucket: &str, key: &str, expires_secs: u64) -> Result<String>;

    /// Unsigned URL, readable only for public objects
    fn public_url(&self, bucket: &str, key: &str) -> String;
}

/// Create the bucket if a head check reports it missing
///
/// Any failure other than not-found is returned unchanged.
pub async fn ensure_bucket<S: ObjectStore + ?Sized>(store: &S, bucket: &str) -> Result<()> {
    match store.head_bucket(bucket).await {
        Ok(()) => {
            tracing::info!(bucket, "bucket already exists");
            Ok(())
        }
        Err(e) if e.status() == Some(404) => {
            tracing::info!(bucket, "bucket does not exist, creating");
            store
                .create_bucket(bucket, Acl::Private, StorageClass::Standard)
                .await?;
            tracing::info!(bucket, "bucket created");
            Ok(())
        }
        Err(e) => Err(e),
    }
}
