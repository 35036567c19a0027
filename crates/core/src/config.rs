//! Configuration management
//!
//! Settings are layered: the TOML file provides a `PartialSyncConfig`,
//! command-line overrides are merged on top, and `resolve` validates the
//! result into an immutable `SyncConfig`. Validation happens before any
//! storage client is created.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::root::RootSpec;

/// Environment variable overriding the configuration directory
pub const CONFIG_DIR_ENV: &str = "BFS_CONFIG_DIR";

/// Name of the configuration file inside the configuration directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

const DEFAULT_CONCURRENCY: usize = 1;
const DEFAULT_MAX_ATTEMPTS: u32 = 3;

const TEMPLATE: &str = r#"# bucket-folder-sync configuration

# Listings and folder creates in flight at once (1 = sequential)
concurrency = 1

# Attempts per request, applied by the S3 client's standard retry mode
max_attempts = 3

[source]
# Bucket the folders are copied from
bucket = ""
# AWS CLI profile for the source bucket (omit to use the default chain)
# profile = "prod"
# region = "us-east-1"
# endpoint = "http://localhost:9000"
# path_style = true
# Folder discovery starts here; the name must end with "/"
# root = { custom = true, name = "Test/" }

[destination]
# Bucket the folders are copied to
bucket = ""
# profile = "dev"
# root = { custom = true, name = "Test/" }
"#;

/// Connection and scope settings for one side of a sync
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketEndpoint {
    pub bucket: String,

    /// Named AWS CLI profile; `None` uses the default credential chain
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Custom endpoint for S3-compatible servers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    #[serde(default)]
    pub path_style: bool,

    #[serde(default)]
    pub root: RootSpec,
}

impl BucketEndpoint {
    /// Endpoint for `bucket` at its root with default credentials
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            profile: None,
            region: None,
            endpoint: None,
            path_style: false,
            root: RootSpec::bucket(),
        }
    }

    /// `bucket/root` for display
    pub fn location(&self) -> String {
        format!("{}/{}", self.bucket, self.root.name())
    }
}

/// One side of a sync as read from a file or the command line
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartialBucketEndpoint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_style: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<RootSpec>,
}

impl PartialBucketEndpoint {
    /// Overlay `overrides` on top of `self`; set fields in `overrides` win
    pub fn merge(self, overrides: PartialBucketEndpoint) -> Self {
        Self {
            bucket: overrides.bucket.or(self.bucket),
            profile: overrides.profile.or(self.profile),
            region: overrides.region.or(self.region),
            endpoint: overrides.endpoint.or(self.endpoint),
            path_style: overrides.path_style.or(self.path_style),
            root: overrides.root.or(self.root),
        }
    }

    /// Validate into a `BucketEndpoint`. `side` names the side in errors.
    pub fn resolve(self, side: &str) -> Result<BucketEndpoint> {
        let bucket = self
            .bucket
            .filter(|b| !b.trim().is_empty())
            .ok_or_else(|| Error::Config(format!("{side} bucket name is not set")))?;

        if bucket.contains('/') {
            return Err(Error::Config(format!(
                "{side} bucket name '{bucket}' must not contain '/'"
            )));
        }

        let endpoint = self.endpoint.filter(|e| !e.is_empty());
        if let Some(endpoint) = &endpoint {
            validate_endpoint(side, endpoint)?;
        }

        Ok(BucketEndpoint {
            bucket,
            profile: self.profile.filter(|p| !p.is_empty()),
            region: self.region.filter(|r| !r.is_empty()),
            endpoint,
            path_style: self.path_style.unwrap_or(false),
            root: self.root.unwrap_or_default(),
        })
    }
}

fn validate_endpoint(side: &str, endpoint: &str) -> Result<()> {
    let url = url::Url::parse(endpoint)
        .map_err(|e| Error::Config(format!("{side} endpoint '{endpoint}' is invalid: {e}")))?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(Error::Config(format!(
            "{side} endpoint '{endpoint}' has unsupported scheme '{scheme}'"
        ))),
    }
}

/// The configuration file and command-line layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartialSyncConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,
    #[serde(default)]
    pub source: PartialBucketEndpoint,
    #[serde(default)]
    pub destination: PartialBucketEndpoint,
}

impl PartialSyncConfig {
    /// Overlay `overrides` on top of `self`
    pub fn merge(self, overrides: PartialSyncConfig) -> Self {
        Self {
            concurrency: overrides.concurrency.or(self.concurrency),
            max_attempts: overrides.max_attempts.or(self.max_attempts),
            source: self.source.merge(overrides.source),
            destination: self.destination.merge(overrides.destination),
        }
    }

    /// Validate into an immutable `SyncConfig`
    pub fn resolve(self) -> Result<SyncConfig> {
        let concurrency = self.concurrency.unwrap_or(DEFAULT_CONCURRENCY);
        if concurrency == 0 {
            return Err(Error::Config("concurrency must be at least 1".to_string()));
        }

        let max_attempts = self.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS);
        if max_attempts == 0 {
            return Err(Error::Config("max_attempts must be at least 1".to_string()));
        }

        Ok(SyncConfig {
            source: self.source.resolve("source")?,
            destination: self.destination.resolve("destination")?,
            concurrency,
            max_attempts,
        })
    }
}

/// Validated settings for a sync run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    pub concurrency: usize,
    pub max_attempts: u32,
    pub source: BucketEndpoint,
    pub destination: BucketEndpoint,
}

impl SyncConfig {
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Locates, reads and initializes the configuration file
#[derive(Debug, Clone)]
pub struct ConfigManager {
    path: PathBuf,
    explicit: bool,
}

impl ConfigManager {
    /// Use `$BFS_CONFIG_DIR/config.toml`, falling back to the platform
    /// configuration directory
    pub fn new() -> Result<Self> {
        let dir = match std::env::var_os(CONFIG_DIR_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => dirs::config_dir()
                .map(|d| d.join("bucket-folder-sync"))
                .ok_or_else(|| {
                    Error::Config("Could not determine configuration directory".to_string())
                })?,
        };

        Ok(Self::from_dir(dir))
    }

    /// Use `config.toml` inside `dir`; a missing file is not an error
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(CONFIG_FILE_NAME),
            explicit: false,
        }
    }

    /// Use exactly `path`; a missing file is an error
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            explicit: true,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the file layer
    pub fn load(&self) -> Result<PartialSyncConfig> {
        if !self.path.exists() {
            if self.explicit {
                return Err(Error::Config(format!(
                    "config file not found: {}",
                    self.path.display()
                )));
            }
            tracing::debug!(path = %self.path.display(), "No config file, using defaults");
            return Ok(PartialSyncConfig::default());
        }

        let content = std::fs::read_to_string(&self.path)?;
        let config = toml::from_str(&content)?;
        tracing::debug!(path = %self.path.display(), "Loaded config file");
        Ok(config)
    }

    /// Write a commented template. Refuses to replace an existing file
    /// unless `force` is set.
    pub fn init(&self, force: bool) -> Result<()> {
        if self.path.exists() && !force {
            return Err(Error::Config(format!(
                "config file already exists: {}",
                self.path.display()
            )));
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, TEMPLATE)?;
        Ok(())
    }
}
