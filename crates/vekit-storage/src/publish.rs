//! Publishing generated frontend snippets as public objects

use time::OffsetDateTime;
use vekit_core::{Error, ObjectKey, Result};

use crate::store::{Acl, ObjectStore, PutOptions, ensure_bucket};
use crate::uploader::validate_bucket;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Html,
    Css,
    Js,
}

impl ContentKind {
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "html" => Ok(Self::Html),
            "css" => Ok(Self::Css),
            "js" => Ok(Self::Js),
            other => Err(Error::Validation(format!(
                "Unsupported code type: {}, only html, css, js are supported",
                other
            ))),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Css => "css",
            Self::Js => "js",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Html => "text/html; charset=utf-8",
            Self::Css => "text/css; charset=utf-8",
            Self::Js => "application/javascript; charset=utf-8",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub object_key: String,
    pub url: String,
}

pub struct Publisher<S: ObjectStore> {
    store: S,
}

impl<S: ObjectStore> Publisher<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Store `content` under `frontend/{ts}_{id}.{ext}` with a public-read ACL
    pub async fn publish(&self, bucket: &str, content: &[u8], kind: ContentKind) -> Result<Published> {
        validate_bucket(bucket)?;

        let id = uuid::Uuid::new_v4().simple().to_string();
        let object_key = ObjectKey::for_frontend(
            OffsetDateTime::now_utc().unix_timestamp(),
            &id[..8],
            kind.extension(),
        );

        ensure_bucket(&self.store, bucket).await?;

        let options = PutOptions {
            acl: Some(Acl::PublicRead),
            content_type: Some(kind.content_type().to_string()),
        };
        self.store
            .put_object(bucket, &object_key, content.to_vec(), &options)
            .await?;

        let url = self.store.public_url(bucket, &object_key);
        tracing::info!(bucket, key = %object_key, url = %url, "content published");

        Ok(Published { object_key, url })
    }
}
