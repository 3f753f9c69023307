//! Per-resource-type mappers and their registry.
//!
//! A mapper converts one discovered resource into a Terraform resource
//! block, derives the provider's import identifier, and proposes commonly
//! useful outputs. The registry is a string-keyed table from source type
//! tags (`provider:service:resource`) to mapper implementations, built once
//! at startup and consulted per resource.

pub mod aws;
pub mod gcp;

use std::collections::HashMap;

use super::context::MappingContext;
use super::types::{TerraformOutput, TerraformResource, TerraformValue};
use crate::inventory::DiscoveredResource;

/// Converts one discovered resource of a fixed source type.
///
/// Mappers are pure with respect to a single resource: unmapped and
/// unmappable resources are accumulated by the orchestrator, not here.
pub trait ResourceMapper: Send + Sync {
    /// Source type tag this mapper handles.
    fn source_type(&self) -> &'static str;

    /// Terraform resource type this mapper emits.
    fn target_type(&self) -> &'static str;

    /// Convert the resource. `None` means this particular instance cannot be
    /// safely represented (missing mandatory properties).
    fn map(
        &self,
        resource: &DiscoveredResource,
        context: &mut MappingContext,
    ) -> Option<TerraformResource>;

    /// The provider's import-command identifier for this resource.
    fn import_id(&self, resource: &DiscoveredResource) -> String {
        resource.id.clone()
    }

    /// Commonly useful outputs for this resource type.
    fn suggested_outputs(&self, _resource: &DiscoveredResource) -> Vec<TerraformOutput> {
        Vec::new()
    }
}

/// Lookup table from source type tag to mapper, preserving registration
/// order for listings.
pub struct MapperRegistry {
    mappers: HashMap<&'static str, Box<dyn ResourceMapper>>,
    order: Vec<&'static str>,
}

impl MapperRegistry {
    pub fn new() -> Self {
        Self {
            mappers: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Registry with all built-in mappers.
    pub fn with_builtin_mappers() -> Self {
        let mut registry = Self::new();
        aws::register_all(&mut registry);
        gcp::register_all(&mut registry);
        registry
    }

    pub fn register(&mut self, mapper: Box<dyn ResourceMapper>) {
        let source_type = mapper.source_type();
        if self.mappers.insert(source_type, mapper).is_none() {
            self.order.push(source_type);
        }
    }

    pub fn get(&self, source_type: &str) -> Option<&dyn ResourceMapper> {
        self.mappers.get(source_type).map(|m| m.as_ref())
    }

    pub fn has(&self, source_type: &str) -> bool {
        self.mappers.contains_key(source_type)
    }

    /// All mappers in registration order.
    pub fn all(&self) -> Vec<&dyn ResourceMapper> {
        self.order
            .iter()
            .filter_map(|t| self.mappers.get(t).map(|m| m.as_ref()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.mappers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappers.is_empty()
    }
}

impl Default for MapperRegistry {
    fn default() -> Self {
        Self::with_builtin_mappers()
    }
}

/// Tags as an ordered map value; `None` when the resource has no tags so the
/// attribute is omitted instead of rendered empty.
pub(crate) fn tags_value(resource: &DiscoveredResource) -> Option<TerraformValue> {
    if resource.tags.is_empty() {
        return None;
    }
    Some(TerraformValue::Map(
        resource
            .tags
            .iter()
            .map(|(k, v)| (k.clone(), TerraformValue::string(v.clone())))
            .collect(),
    ))
}

/// Provenance comment placed above a generated block.
pub(crate) fn source_comment(resource: &DiscoveredResource) -> String {
    format!("Imported from {} {}", resource.resource_type, resource.id)
}
