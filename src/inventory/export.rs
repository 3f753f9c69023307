//! Inventory export file parsing.
//!
//! Discovery tools hand over their findings as a JSON or YAML export with a
//! `schemaVersion` field and a `resources` array. Versions older than the
//! minimum are rejected; missing or newer versions only warn so callers can
//! proceed at their own risk.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::DiscoveredResource;

/// Schema versions this parser was written against.
pub const SUPPORTED_SCHEMA_VERSIONS: &[&str] = &["1.0.0", "1.0", "1"];

/// Minimum accepted schema version.
pub const MINIMUM_SCHEMA_VERSION: (u32, u32, u32) = (1, 0, 0);

/// Root structure of an inventory export file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryExport {
    #[serde(default)]
    pub schema_version: Option<String>,
    pub resources: Vec<DiscoveredResource>,
}

impl InventoryExport {
    /// Load an export from disk, choosing the parser by file extension.
    pub fn load(path: &Path) -> ExportResult<Self> {
        let content = fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "json" => Self::from_json(&content),
            "yaml" | "yml" => Self::from_yaml(&content),
            other => Err(ExportError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn from_json(content: &str) -> ExportResult<Self> {
        let export: Self = serde_json::from_str(content)?;
        export.check_schema()?;
        Ok(export)
    }

    pub fn from_yaml(content: &str) -> ExportResult<Self> {
        let export: Self = serde_yaml::from_str(content)?;
        export.check_schema()?;
        Ok(export)
    }

    fn check_schema(&self) -> ExportResult<()> {
        match validate_schema_version(self.schema_version.as_deref()) {
            SchemaVersionStatus::TooOld(v) => Err(ExportError::SchemaTooOld(v)),
            _ => Ok(()),
        }
    }

    /// Non-fatal validation outcome, surfaced to the user as a warning.
    pub fn schema_warning(&self) -> Option<String> {
        match validate_schema_version(self.schema_version.as_deref()) {
            SchemaVersionStatus::Missing => {
                Some("export has no schema version; assuming a compatible format".to_string())
            }
            SchemaVersionStatus::Newer(v) => Some(format!(
                "export schema version {} is newer than supported; some fields may be ignored",
                v
            )),
            SchemaVersionStatus::Invalid(v) => {
                Some(format!("export schema version '{}' is not a valid version", v))
            }
            _ => None,
        }
    }
}

/// Result of schema version validation.
#[derive(Debug, PartialEq, Eq)]
pub enum SchemaVersionStatus {
    Valid,
    Missing,
    Newer(String),
    TooOld(String),
    Invalid(String),
}

fn parse_semver(version: &str) -> Option<(u32, u32, u32)> {
    let parts: Vec<&str> = version.split('.').collect();

    let major = parts.first()?.parse().ok()?;
    let minor = parts.get(1).and_then(|s| s.parse().ok()).unwrap_or(0);
    let patch = parts.get(2).and_then(|s| s.parse().ok()).unwrap_or(0);

    Some((major, minor, patch))
}

/// Validate the schema version of an inventory export.
pub fn validate_schema_version(version: Option<&str>) -> SchemaVersionStatus {
    let version = match version {
        None => return SchemaVersionStatus::Missing,
        Some(v) => v.trim(),
    };

    if version.is_empty() {
        return SchemaVersionStatus::Missing;
    }

    let parsed = match parse_semver(version) {
        None => return SchemaVersionStatus::Invalid(version.to_string()),
        Some(v) => v,
    };

    if parsed < MINIMUM_SCHEMA_VERSION {
        return SchemaVersionStatus::TooOld(version.to_string());
    }

    if SUPPORTED_SCHEMA_VERSIONS.contains(&version) {
        return SchemaVersionStatus::Valid;
    }

    SchemaVersionStatus::Newer(version.to_string())
}

/// Errors when reading or parsing an inventory export.
#[derive(Debug)]
pub enum ExportError {
    Io(std::io::Error),
    Json(String),
    Yaml(String),
    /// File extension is neither JSON nor YAML.
    UnsupportedFormat(String),
    /// Schema version predates the minimum this parser understands.
    SchemaTooOld(String),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Io(err) => write!(f, "I/O error: {}", err),
            ExportError::Json(msg) => write!(f, "Failed to parse JSON export: {}", msg),
            ExportError::Yaml(msg) => write!(f, "Failed to parse YAML export: {}", msg),
            ExportError::UnsupportedFormat(ext) => {
                write!(
                    f,
                    "Unsupported export format '{}' (expected .json, .yaml or .yml)",
                    ext
                )
            }
            ExportError::SchemaTooOld(version) => {
                write!(
                    f,
                    "Export schema version {} is older than the minimum supported ({}.{}.{})",
                    version,
                    MINIMUM_SCHEMA_VERSION.0,
                    MINIMUM_SCHEMA_VERSION.1,
                    MINIMUM_SCHEMA_VERSION.2
                )
            }
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        ExportError::Io(err)
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        ExportError::Json(err.to_string())
    }
}

impl From<serde_yaml::Error> for ExportError {
    fn from(err: serde_yaml::Error) -> Self {
        ExportError::Yaml(err.to_string())
    }
}

/// Result type for export parsing.
pub type ExportResult<T> = Result<T, ExportError>;
