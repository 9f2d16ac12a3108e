//! Environment snapshot, read once at startup

pub const ACCESS_KEY_VAR: &str = "VOLCENGINE_ACCESS_KEY";
pub const SECRET_KEY_VAR: &str = "VOLCENGINE_SECRET_KEY";
pub const SESSION_ID_VAR: &str = "TOOL_USER_SESSION_ID";
pub const BUCKET_VAR: &str = "DATABASE_TOS_BUCKET";
pub const REGION_VAR: &str = "DATABASE_TOS_REGION";
pub const FALLBACK_REGION_VAR: &str = "REGION";
pub const ENDPOINT_VAR: &str = "DATABASE_TOS_ENDPOINT";
pub const PROVIDER_VAR: &str = "CLOUD_PROVIDER";

/// Environment variables vekit reacts to; empty values count as unset
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeEnv {
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub session_id: Option<String>,
    pub bucket: Option<String>,
    pub region: Option<String>,
    pub endpoint: Option<String>,
    pub provider: Option<String>,
}

impl RuntimeEnv {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            access_key: get(ACCESS_KEY_VAR),
            secret_key: get(SECRET_KEY_VAR),
            session_id: get(SESSION_ID_VAR),
            bucket: get(BUCKET_VAR),
            region: get(REGION_VAR).or_else(|| get(FALLBACK_REGION_VAR)),
            endpoint: get(ENDPOINT_VAR),
            provider: get(PROVIDER_VAR),
        }
    }
}
