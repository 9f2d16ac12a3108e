//! TOS V4 request signing (`TOS4-HMAC-SHA256`)
//!
//! Same construction as AWS SigV4 with a `tos` service scope and `x-tos-*`
//! header names. Used both for header-authorized API calls and for
//! query-string presigned URLs.

use std::collections::BTreeMap;

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};
use vekit_core::{Credential, Error, Result};

type HmacSha256 = Hmac<Sha256>;

pub const ALGORITHM: &str = "TOS4-HMAC-SHA256";
pub const UNSIGNED_PAYLOAD: &str = "UNSIGNED-PAYLOAD";
const SERVICE: &str = "tos";
const TERMINATOR: &str = "request";

/// Hex SHA-256 of a request body
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Percent-encode a path, keeping `/` separators
pub fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// The request fields covered by a signature
pub struct CanonicalRequest<'a> {
    pub method: &'a str,
    /// Already percent-encoded
    pub uri: &'a str,
    pub query: &'a [(String, String)],
    /// Lowercase header names
    pub headers: &'a BTreeMap<String, String>,
    pub payload_hash: &'a str,
}

impl CanonicalRequest<'_> {
    pub fn signed_headers(&self) -> String {
        self.headers.keys().cloned().collect::<Vec<_>>().join(";")
    }

    pub fn render(&self) -> String {
        let headers: String = self
            .headers
            .iter()
            .map(|(name, value)| format!("{}:{}\n", name, value.trim()))
            .collect();

        format!(
            "{}\n{}\n{}\n{}\n{}\n{}",
            self.method,
            self.uri,
            canonical_query(self.query),
            headers,
            self.signed_headers(),
            self.payload_hash
        )
    }
}

/// Sorted, percent-encoded `k=v&...` form
pub fn canonical_query(query: &[(String, String)]) -> String {
    let mut encoded: Vec<(String, String)> = query
        .iter()
        .map(|(k, v)| {
            (
                urlencoding::encode(k).into_owned(),
                urlencoding::encode(v).into_owned(),
            )
        })
        .collect();
    encoded.sort();

    encoded
        .into_iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

/// Request timestamp in the two renderings the scheme needs
#[derive(Debug, Clone)]
pub struct SigningTime {
    /// `YYYYMMDDTHHMMSSZ`
    pub stamp: String,
    /// `YYYYMMDD`
    pub date: String,
}

impl SigningTime {
    pub fn new(now: OffsetDateTime) -> Result<Self> {
        let now = now.to_offset(UtcOffset::UTC);
        let stamp = now
            .format(format_description!(
                "[year][month][day]T[hour][minute][second]Z"
            ))
            .map_err(|e| Error::storage(format!("Failed to format signing time: {}", e)))?;
        let date = stamp[..8].to_string();
        Ok(Self { stamp, date })
    }
}

pub struct Signer {
    credential: Credential,
    region: String,
}

impl Signer {
    pub fn new(credential: Credential, region: impl Into<String>) -> Self {
        Self {
            credential,
            region: region.into(),
        }
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    fn scope(&self, time: &SigningTime) -> String {
        format!("{}/{}/{}/{}", time.date, self.region, SERVICE, TERMINATOR)
    }

    fn signing_key(&self, time: &SigningTime) -> Vec<u8> {
        let k_date = hmac(self.credential.secret_key.as_bytes(), &time.date);
        let k_region = hmac(&k_date, &self.region);
        let k_service = hmac(&k_region, SERVICE);
        hmac(&k_service, TERMINATOR)
    }

    /// Hex signature over a canonical request
    pub fn signature(&self, request: &CanonicalRequest<'_>, time: &SigningTime) -> String {
        let string_to_sign = format!(
            "{}\n{}\n{}\n{}",
            ALGORITHM,
            time.stamp,
            self.scope(time),
            sha256_hex(request.render().as_bytes())
        );
        hex::encode(hmac(&self.signing_key(time), &string_to_sign))
    }

    /// `Authorization` header value; `request.headers` must already carry
    /// `x-tos-date` and `x-tos-content-sha256`
    pub fn authorization(&self, request: &CanonicalRequest<'_>, time: &SigningTime) -> String {
        format!(
            "{} Credential={}/{}, SignedHeaders={}, Signature={}",
            ALGORITHM,
            self.credential.access_key,
            self.scope(time),
            request.signed_headers(),
            self.signature(request, time)
        )
    }

    /// Query parameters for a presigned URL, signature included
    pub fn presign_query(
        &self,
        method: &str,
        host: &str,
        uri: &str,
        expires_secs: u64,
        time: &SigningTime,
    ) -> Vec<(String, String)> {
        let mut query = vec![
            ("X-Tos-Algorithm".to_string(), ALGORITHM.to_string()),
            (
                "X-Tos-Credential".to_string(),
                format!("{}/{}", self.credential.access_key, self.scope(time)),
            ),
            ("X-Tos-Date".to_string(), time.stamp.clone()),
            ("X-Tos-Expires".to_string(), expires_secs.to_string()),
            ("X-Tos-SignedHeaders".to_string(), "host".to_string()),
        ];
        if let Some(token) = &self.credential.session_token {
            query.push(("X-Tos-Security-Token".to_string(), token.clone()));
        }

        let headers = BTreeMap::from([("host".to_string(), host.to_string())]);
        let request = CanonicalRequest {
            method,
            uri,
            query: &query,
            headers: &headers,
            payload_hash: UNSIGNED_PAYLOAD,
        };
        let signature = self.signature(&request, time);
        query.push(("X-Tos-Signature".to_string(), signature));
        query
    }
}

fn hmac(key: &[u8], data: &str) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(data.as_bytes());
    mac.finalize().into_bytes().to_vec()
}
