//! TOS HTTP client

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, Response, Url};
use serde::Deserialize;
use time::OffsetDateTime;
use vekit_core::{Credential, Error, Result};

use crate::signer::{CanonicalRequest, Signer, SigningTime, canonical_query, encode_path, sha256_hex};
use crate::store::{Acl, ObjectStore, PutObjectOutput, PutOptions, StorageClass};

/// Where and how to reach the object store
#[derive(Debug, Clone)]
pub struct TosConfig {
    /// Host (`tos-cn-beijing.volces.com`) or base URL (`http://127.0.0.1:9000`)
    pub endpoint: String,
    pub region: String,
    /// `{endpoint}/{bucket}/{key}` instead of `{bucket}.{endpoint}/{key}`
    pub path_style: bool,
    pub timeout: Duration,
}

impl TosConfig {
    pub fn new(endpoint: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            region: region.into(),
            path_style: false,
            timeout: Duration::from_secs(60),
        }
    }

    pub fn with_path_style(mut self, path_style: bool) -> Self {
        self.path_style = path_style;
        self
    }
}

/// Error body returned by the service
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ServiceError {
    code: Option<String>,
    message: Option<String>,
}

/// Resolved request address
struct Target {
    url: Url,
    host: String,
    uri: String,
}

/// Signed client for one set of credentials; dropped at the end of the
/// operation that created it
pub struct TosClient {
    http: reqwest::Client,
    signer: Signer,
    base: Url,
    path_style: bool,
}

impl TosClient {
    pub fn new(config: &TosConfig, credential: Credential) -> Result<Self> {
        let endpoint = if config.endpoint.contains("://") {
            config.endpoint.clone()
        } else {
            format!("https://{}", config.endpoint)
        };
        let base = Url::parse(&endpoint).map_err(|e| {
            Error::Configuration(format!("Invalid TOS endpoint '{}': {}", config.endpoint, e))
        })?;
        if base.host_str().is_none() {
            return Err(Error::Configuration(format!(
                "TOS endpoint has no host: {}",
                config.endpoint
            )));
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!("vekit/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::storage(format!("Failed to create HTTP client: {}", e)))?;

        tracing::debug!(endpoint = %base, region = %config.region, "storage client opened");

        Ok(Self {
            http,
            signer: Signer::new(credential, config.region.clone()),
            base,
            path_style: config.path_style,
        })
    }

    fn base_host(&self) -> String {
        let host = self.base.host_str().unwrap_or_default();
        match self.base.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        }
    }

    fn target(&self, bucket: &str, key: Option<&str>) -> Result<Target> {
        let key_path = key.map(encode_path).unwrap_or_default();
        let (host, uri) = if self.path_style {
            let uri = match key {
                Some(_) => format!("/{}/{}", bucket, key_path),
                None => format!("/{}", bucket),
            };
            (self.base_host(), uri)
        } else {
            (
                format!("{}.{}", bucket, self.base_host()),
                format!("/{}", key_path),
            )
        };

        let url = Url::parse(&format!("{}://{}{}", self.base.scheme(), host, uri))
            .map_err(|e| Error::storage(format!("Invalid object URL: {}", e)))?;

        Ok(Target { url, host, uri })
    }

    async fn send(
        &self,
        method: Method,
        bucket: &str,
        key: Option<&str>,
        extra_headers: BTreeMap<String, String>,
        body: Vec<u8>,
    ) -> Result<Response> {
        let target = self.target(bucket, key)?;
        let time = SigningTime::new(OffsetDateTime::now_utc())?;
        let payload_hash = sha256_hex(&body);

        let mut headers = extra_headers;
        headers.insert("host".to_string(), target.host.clone());
        headers.insert("x-tos-date".to_string(), time.stamp.clone());
        headers.insert("x-tos-content-sha256".to_string(), payload_hash.clone());
        if let Some(token) = &self.signer.credential().session_token {
            headers.insert("x-tos-security-token".to_string(), token.clone());
        }

        let canonical = CanonicalRequest {
            method: method.as_str(),
            uri: &target.uri,
            query: &[],
            headers: &headers,
            payload_hash: &payload_hash,
        };
        let authorization = self.signer.authorization(&canonical, &time);

        let mut header_map = HeaderMap::new();
        for (name, value) in headers.iter().filter(|(name, _)| name.as_str() != "host") {
            header_map.insert(header_name(name)?, header_value(value)?);
        }
        header_map.insert(reqwest::header::AUTHORIZATION, header_value(&authorization)?);

        let response = self
            .http
            .request(method, target.url)
            .headers(header_map)
            .body(body)
            .send()
            .await
            .map_err(|e| Error::storage(format!("Request failed: {}", e)))?;

        check_status(response).await
    }
}

impl Drop for TosClient {
    fn drop(&mut self) {
        tracing::debug!(endpoint = %self.base, "storage client closed");
    }
}

#[async_trait]
impl ObjectStore for TosClient {
    async fn head_bucket(&self, bucket: &str) -> Result<()> {
        self.send(Method::HEAD, bucket, None, BTreeMap::new(), Vec::new())
            .await?;
        Ok(())
    }

    async fn create_bucket(&self, bucket: &str, acl: Acl, class: StorageClass) -> Result<()> {
        let headers = BTreeMap::from([
            ("x-tos-acl".to_string(), acl.as_header().to_string()),
            ("x-tos-storage-class".to_string(), class.as_header().to_string()),
        ]);
        self.send(Method::PUT, bucket, None, headers, Vec::new())
            .await?;
        Ok(())
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        options: &PutOptions,
    ) -> Result<PutObjectOutput> {
        let mut headers = BTreeMap::new();
        if let Some(acl) = options.acl {
            headers.insert("x-tos-acl".to_string(), acl.as_header().to_string());
        }
        if let Some(content_type) = &options.content_type {
            headers.insert("content-type".to_string(), content_type.clone());
        }

        let response = self
            .send(Method::PUT, bucket, Some(key), headers, body)
            .await?;
        let etag = response
            .headers()
            .get(reqwest::header::ETAG)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        Ok(PutObjectOutput { etag })
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let response = self
            .send(Method::GET, bucket, Some(key), BTreeMap::new(), Vec::new())
            .await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::storage(format!("Failed to read object body: {}", e)))?;
        Ok(body.to_vec())
    }

    fn presign_get(&self, bucket: &str, key: &str, expires_secs: u64) -> Result<String> {
        let target = self.target(bucket, Some(key))?;
        let time = SigningTime::new(OffsetDateTime::now_utc())?;
        let query = self
            .signer
            .presign_query("GET", &target.host, &target.uri, expires_secs, &time);

        Ok(format!(
            "{}://{}{}?{}",
            self.base.scheme(),
            target.host,
            target.uri,
            canonical_query(&query)
        ))
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        match self.target(bucket, Some(key)) {
            Ok(target) => target.url.to_string(),
            Err(_) => format!("{}://{}.{}/{}", self.base.scheme(), bucket, self.base_host(), key),
        }
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let reason = status.canonical_reason().unwrap_or("unknown status").to_string();
    let body = response.text().await.unwrap_or_default();
    let parsed: Option<ServiceError> = serde_json::from_str(&body).ok();

    let (code, message) = match parsed {
        Some(err) => (err.code, err.message.unwrap_or(reason)),
        None if body.trim().is_empty() => (None, reason),
        None => (None, body),
    };

    Err(Error::storage_status(status.as_u16(), code, message))
}

fn header_name(name: &str) -> Result<HeaderName> {
    HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| Error::storage(format!("Invalid header name '{}': {}", name, e)))
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| Error::storage(format!("Invalid header value: {}", e)))
}
