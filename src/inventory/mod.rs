//! Discovered-resource input model.
//!
//! Resources arrive from an external discovery subsystem as generic records
//! in the `provider:service:resource` type-tag convention. This module holds
//! the immutable input model and the export-file parsing around it.

pub mod export;

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::generator::types::sanitize_tf_name;

pub use export::{validate_schema_version, ExportError, InventoryExport, SchemaVersionStatus};

/// A discovered cloud resource, produced externally and treated as
/// immutable input. `properties` is the mapper's only source of
/// resource-specific data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveredResource {
    /// Provider-native identifier (e.g. `i-0abc123`, an instance name).
    pub id: String,
    /// Source type tag in `provider:service:resource` form.
    #[serde(rename = "type")]
    pub resource_type: String,
    /// Display name; falls back to `id` when absent.
    #[serde(default)]
    pub name: Option<String>,
    /// Globally unique external identifier (ARN or self-link).
    #[serde(default)]
    pub arn: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    /// Sorted so rendered tag maps are deterministic.
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    /// Free-form, provider-shaped key/value data.
    #[serde(default)]
    pub properties: HashMap<String, serde_json::Value>,
    /// Related resource identifiers. Preserved but unused by the generator.
    #[serde(default)]
    pub relationships: Vec<String>,
    #[serde(default)]
    pub discovered_at: Option<DateTime<Utc>>,
}

impl DiscoveredResource {
    pub fn new(id: impl Into<String>, resource_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            resource_type: resource_type.into(),
            name: None,
            arn: None,
            region: None,
            tags: BTreeMap::new(),
            properties: HashMap::new(),
            relationships: Vec::new(),
            discovered_at: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_arn(mut self, arn: impl Into<String>) -> Self {
        self.arn = Some(arn.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    /// Display name, defaulting to the native id.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    /// Terraform-local identifier derived from the display name.
    pub fn tf_name(&self) -> String {
        sanitize_tf_name(self.display_name())
    }

    /// The provider key (first segment of the type tag).
    pub fn provider_key(&self) -> &str {
        self.resource_type
            .split(':')
            .next()
            .unwrap_or(&self.resource_type)
    }

    pub fn string_property(&self, key: &str) -> Option<String> {
        self.properties
            .get(key)
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    }

    pub fn number_property(&self, key: &str) -> Option<f64> {
        self.properties.get(key).and_then(|v| v.as_f64())
    }

    pub fn bool_property(&self, key: &str) -> Option<bool> {
        self.properties.get(key).and_then(|v| v.as_bool())
    }

    pub fn array_property(&self, key: &str) -> Option<&Vec<serde_json::Value>> {
        self.properties.get(key).and_then(|v| v.as_array())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_and_accessors() {
        let resource = DiscoveredResource::new("i-0abc", "aws:ec2:instance")
            .with_name("web-server")
            .with_region("us-east-1")
            .with_arn("arn:aws:ec2:us-east-1:123:instance/i-0abc")
            .with_tag("Environment", "production")
            .with_property("instanceType", json!("t3.micro"))
            .with_property("ebsOptimized", json!(true))
            .with_property("coreCount", json!(2));

        assert_eq!(resource.display_name(), "web-server");
        assert_eq!(resource.tf_name(), "web_server");
        assert_eq!(resource.provider_key(), "aws");
        assert_eq!(
            resource.string_property("instanceType"),
            Some("t3.micro".to_string())
        );
        assert_eq!(resource.bool_property("ebsOptimized"), Some(true));
        assert_eq!(resource.number_property("coreCount"), Some(2.0));
        assert!(resource.string_property("missing").is_none());
    }

    #[test]
    fn test_display_name_defaults_to_id() {
        let resource = DiscoveredResource::new("vpc-123", "aws:ec2:vpc");
        assert_eq!(resource.display_name(), "vpc-123");
        assert_eq!(resource.tf_name(), "vpc_123");
    }

    #[test]
    fn test_deserializes_minimal_record() {
        let json = r#"{"id": "vpc-1", "type": "aws:ec2:vpc"}"#;
        let resource: DiscoveredResource = serde_json::from_str(json).unwrap();

        assert_eq!(resource.id, "vpc-1");
        assert_eq!(resource.resource_type, "aws:ec2:vpc");
        assert!(resource.name.is_none());
        assert!(resource.tags.is_empty());
    }

    #[test]
    fn test_deserializes_camel_case_fields() {
        let json = r#"{
            "id": "i-1",
            "type": "aws:ec2:instance",
            "discoveredAt": "2024-05-01T12:00:00Z",
            "properties": {"imageId": "ami-1"}
        }"#;
        let resource: DiscoveredResource = serde_json::from_str(json).unwrap();

        assert!(resource.discovered_at.is_some());
        assert_eq!(resource.string_property("imageId"), Some("ami-1".to_string()));
    }
}
