use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

mod env;

pub use env::RuntimeEnv;

// ============================================================================
// Config file (config.toml)
// ============================================================================

/// Configuration for vekit
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub download: DownloadConfig,

    #[serde(default)]
    pub redaction: RedactionConfig,

    #[serde(default)]
    pub guardrail: GuardrailConfig,
}

/// Which cloud hosts the object store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CloudProvider {
    #[default]
    Volcengine,
    Byteplus,
}

impl CloudProvider {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "volcengine" => Some(Self::Volcengine),
            "byteplus" => Some(Self::Byteplus),
            _ => None,
        }
    }

    /// Second-level domain of the TOS endpoints
    pub fn domain(&self) -> &'static str {
        match self {
            Self::Volcengine => "volces.com",
            Self::Byteplus => "bytepluses.com",
        }
    }

    pub fn default_region(&self) -> &'static str {
        match self {
            Self::Volcengine => "cn-beijing",
            Self::Byteplus => "cn-hongkong",
        }
    }

    pub fn endpoint(&self, region: &str) -> String {
        format!("tos-{}.{}", region, self.domain())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub provider: CloudProvider,

    /// Defaults to the provider's region
    #[serde(default)]
    pub region: Option<String>,

    /// Host or base URL; defaults to `tos-{region}.{domain}`
    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default)]
    pub bucket: Option<String>,

    #[serde(default = "default_expires")]
    pub expires_secs: u64,

    #[serde(default = "default_iam_credential_path")]
    pub iam_credential_path: PathBuf,

    /// Address buckets as `{endpoint}/{bucket}` instead of `{bucket}.{endpoint}`
    #[serde(default)]
    pub path_style: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    #[serde(default = "default_save_dir")]
    pub save_dir: PathBuf,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RedactionConfig {
    /// Custom rules, applied in order; empty means the built-in PII rules
    #[serde(default)]
    pub rules: Vec<RuleDefinition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDefinition {
    pub name: String,
    pub pattern: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardrailConfig {
    #[serde(default = "default_blocked_words")]
    pub blocked_words: Vec<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: CloudProvider::default(),
            region: None,
            endpoint: None,
            bucket: None,
            expires_secs: default_expires(),
            iam_credential_path: default_iam_credential_path(),
            path_style: false,
        }
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            save_dir: default_save_dir(),
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for GuardrailConfig {
    fn default() -> Self {
        Self {
            blocked_words: default_blocked_words(),
        }
    }
}

fn default_expires() -> u64 {
    604_800
}

fn default_iam_credential_path() -> PathBuf {
    PathBuf::from("/var/run/secrets/iam/credential")
}

fn default_save_dir() -> PathBuf {
    PathBuf::from("/tmp")
}

fn default_timeout() -> u64 {
    30
}

fn default_blocked_words() -> Vec<String> {
    vec![
        "zanghua".to_string(),
        "minganci".to_string(),
        "bukexiangdeshi".to_string(),
    ]
}

// ============================================================================
// Resolved storage settings (config file + environment)
// ============================================================================

/// Storage settings after applying environment overrides
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageSettings {
    pub provider: CloudProvider,
    pub region: String,
    pub endpoint: String,
    pub bucket: Option<String>,
    pub expires_secs: u64,
    pub iam_credential_path: PathBuf,
    pub path_style: bool,
}

impl Config {
    /// Load config from default location or create default if not found
    pub fn load() -> anyhow::Result<Self> {
        Self::load_or_init(&Self::config_path())
    }

    /// Load `path`, or write and return the defaults when it does not exist
    ///
    /// Failing to write the default file is not an error: the defaults are
    /// still returned.
    pub fn load_or_init(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            return Self::load_from(path);
        }

        let config = Config::default();
        if let Err(e) = config.save_to(path) {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "could not write default config, using built-in defaults"
            );
        }
        Ok(config)
    }

    /// Load config from an explicit path
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config {}", path.display()))?;
        Ok(())
    }

    /// Get config file path
    pub fn config_path() -> PathBuf {
        if let Some(dirs) = directories::ProjectDirs::from("com", "vekit", "vekit") {
            dirs.config_dir().join("config.toml")
        } else {
            PathBuf::from("~/.vekit/config.toml")
        }
    }

    /// Merge environment overrides into the storage section
    ///
    /// Environment wins over the file; the provider's defaults fill the rest.
    pub fn storage_settings(&self, env: &RuntimeEnv) -> anyhow::Result<StorageSettings> {
        let provider = match env.provider.as_deref() {
            Some(value) => CloudProvider::parse(value)
                .ok_or_else(|| anyhow::anyhow!("Unknown cloud provider: {}", value))?,
            None => self.storage.provider,
        };

        let region = env
            .region
            .clone()
            .or_else(|| self.storage.region.clone())
            .unwrap_or_else(|| provider.default_region().to_string());

        let endpoint = env
            .endpoint
            .clone()
            .or_else(|| self.storage.endpoint.clone())
            .unwrap_or_else(|| provider.endpoint(&region));

        Ok(StorageSettings {
            provider,
            region,
            endpoint,
            bucket: env.bucket.clone().or_else(|| self.storage.bucket.clone()),
            expires_secs: self.storage.expires_secs,
            iam_credential_path: self.storage.iam_credential_path.clone(),
            path_style: self.storage.path_style,
        })
    }

    /// Custom redaction rules as ordered `(name, pattern)` pairs
    pub fn redaction_patterns(&self) -> Vec<(String, String)> {
        self.redaction
            .rules
            .iter()
            .map(|r| (r.name.clone(), r.pattern.clone()))
            .collect()
    }
}

impl RuntimeEnv {
    /// Snapshot selected variables from an in-memory map
    pub fn from_map(vars: &HashMap<String, String>) -> Self {
        Self::from_lookup(|key| vars.get(key).cloned())
    }
}
