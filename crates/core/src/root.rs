//! Root specification
//!
//! A root scopes folder discovery and folder creation for one side of a sync.
//! Folder sets are compared in root-relative coordinates; writes land in
//! absolute bucket coordinates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The subtree of a bucket a sync side operates on.
///
/// `name` is non-empty if and only if `is_custom_root` is set, and when
/// non-empty it is a folder path ending in `/`. Instances that break this
/// cannot be constructed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawRoot", into = "RawRoot")]
pub struct RootSpec {
    is_custom_root: bool,
    name: String,
}

/// Shape of a root in configuration files: `{ custom = true, name = "Test/" }`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RawRoot {
    #[serde(default)]
    custom: bool,
    #[serde(default)]
    name: String,
}

impl RootSpec {
    /// The whole bucket
    pub fn bucket() -> Self {
        Self::default()
    }

    /// Validating constructor
    pub fn new(is_custom_root: bool, name: impl Into<String>) -> Result<Self> {
        let name = name.into();

        match (is_custom_root, name.is_empty()) {
            (true, true) => {
                return Err(Error::Config(
                    "custom root is enabled but no root name is set".to_string(),
                ));
            }
            (false, false) => {
                return Err(Error::Config(format!(
                    "root name '{name}' is set but custom root is disabled"
                )));
            }
            _ => {}
        }

        if !name.is_empty() {
            if !name.ends_with('/') {
                return Err(Error::Config(format!(
                    "root name '{name}' must end with '/'"
                )));
            }
            if name.starts_with('/') {
                return Err(Error::Config(format!(
                    "root name '{name}' must not start with '/'"
                )));
            }
        }

        Ok(Self {
            is_custom_root,
            name,
        })
    }

    /// Custom root at `name`
    pub fn custom(name: impl Into<String>) -> Result<Self> {
        Self::new(true, name)
    }

    pub fn is_custom_root(&self) -> bool {
        self.is_custom_root
    }

    /// Root prefix, `""` for the bucket root
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Express a discovered key relative to this root
    pub fn relative(&self, absolute: &str) -> String {
        if self.is_custom_root {
            absolute
                .strip_prefix(self.name.as_str())
                .unwrap_or(absolute)
                .to_string()
        } else {
            absolute.to_string()
        }
    }

    /// Absolute key to write for a root-relative folder path
    pub fn write_target(&self, relative: &str) -> String {
        if self.is_custom_root {
            format!("{}{relative}", self.name)
        } else {
            relative.to_string()
        }
    }
}

impl TryFrom<RawRoot> for RootSpec {
    type Error = Error;

    fn try_from(raw: RawRoot) -> Result<Self> {
        RootSpec::new(raw.custom, raw.name)
    }
}

impl From<RootSpec> for RawRoot {
    fn from(root: RootSpec) -> Self {
        Self {
            custom: root.is_custom_root,
            name: root.name,
        }
    }
}

/// Parses a command-line root: empty selects the bucket root, anything else
/// is a custom root.
impl FromStr for RootSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            Ok(Self::bucket())
        } else {
            Self::custom(s)
        }
    }
}

impl fmt::Display for RootSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_custom_root {
            write!(f, "{}", self.name)
        } else {
            write!(f, "<bucket root>")
        }
    }
}
