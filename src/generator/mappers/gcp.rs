//! GCP resource mappers.
//!
//! GCP resources cross-reference each other by self-link, so mappers pass
//! self-links through the context's reference resolution. Zonal and regional
//! import identifiers need the project id; when the export does not carry
//! one, a `PROJECT_ID` placeholder is emitted for the user to fill in.

use super::{source_comment, tags_value, MapperRegistry, ResourceMapper};
use crate::generator::context::MappingContext;
use crate::generator::types::{
    Lifecycle, TerraformOutput, TerraformResource, TerraformValue,
};
use crate::inventory::DiscoveredResource;

/// Register every GCP mapper.
pub fn register_all(registry: &mut MapperRegistry) {
    registry.register(Box::new(ComputeInstanceMapper));
    registry.register(Box::new(NetworkMapper));
    registry.register(Box::new(SubnetworkMapper));
    registry.register(Box::new(StorageBucketMapper));
    registry.register(Box::new(SqlInstanceMapper));
}

fn project_of(resource: &DiscoveredResource) -> String {
    resource
        .string_property("project")
        .unwrap_or_else(|| "PROJECT_ID".to_string())
}

/// `gcp:compute:instance` -> `google_compute_instance`.
pub struct ComputeInstanceMapper;

impl ResourceMapper for ComputeInstanceMapper {
    fn source_type(&self) -> &'static str {
        "gcp:compute:instance"
    }

    fn target_type(&self) -> &'static str {
        "google_compute_instance"
    }

    fn map(
        &self,
        resource: &DiscoveredResource,
        context: &mut MappingContext,
    ) -> Option<TerraformResource> {
        let machine_type = resource.string_property("machineType")?;

        let boot_disk = resource.string_property("bootImage").map(|image| {
            TerraformValue::Block(vec![(
                "initialize_params".to_string(),
                TerraformValue::Block(vec![(
                    "image".to_string(),
                    TerraformValue::string(image),
                )]),
            )])
        });

        // Only the primary interface is represented; additional interfaces
        // need manual follow-up after import.
        let network_interface = resource
            .array_property("networkInterfaces")
            .and_then(|interfaces| interfaces.first())
            .and_then(|interface| interface.as_object())
            .map(|interface| {
                let mut entries = Vec::new();
                if let Some(network) = interface.get("network").and_then(|v| v.as_str()) {
                    entries.push((
                        "network".to_string(),
                        context.reference_or_literal(network),
                    ));
                }
                if let Some(subnetwork) = interface.get("subnetwork").and_then(|v| v.as_str())
                {
                    entries.push((
                        "subnetwork".to_string(),
                        context.reference_or_literal(subnetwork),
                    ));
                }
                TerraformValue::Block(entries)
            });

        Some(
            TerraformResource::new(self.target_type(), resource.tf_name())
                .with_comment(source_comment(resource))
                .with_attribute("name", TerraformValue::string(resource.display_name()))
                .with_attribute("machine_type", TerraformValue::string(machine_type))
                .with_optional_attribute(
                    "zone",
                    resource.string_property("zone").map(TerraformValue::String),
                )
                .with_optional_attribute("labels", tags_value(resource))
                .with_optional_attribute("boot_disk", boot_disk)
                .with_optional_attribute("network_interface", network_interface)
                // Image references resolve to concrete disk sources after
                // import and would otherwise plan a replacement.
                .with_lifecycle(Lifecycle::ignoring(&["boot_disk"])),
        )
    }

    fn import_id(&self, resource: &DiscoveredResource) -> String {
        let zone = resource
            .string_property("zone")
            .unwrap_or_else(|| "ZONE".to_string());
        format!(
            "{}/{}/{}",
            project_of(resource),
            zone,
            resource.display_name()
        )
    }

    fn suggested_outputs(&self, resource: &DiscoveredResource) -> Vec<TerraformOutput> {
        vec![TerraformOutput::new(
            format!("{}_self_link", resource.tf_name()),
            TerraformValue::reference(format!(
                "{}.{}.self_link",
                self.target_type(),
                resource.tf_name()
            )),
        )
        .with_description("Self link of the instance")]
    }
}

/// `gcp:compute:network` -> `google_compute_network`. Networks import by name.
pub struct NetworkMapper;

impl ResourceMapper for NetworkMapper {
    fn source_type(&self) -> &'static str {
        "gcp:compute:network"
    }

    fn target_type(&self) -> &'static str {
        "google_compute_network"
    }

    fn map(
        &self,
        resource: &DiscoveredResource,
        _context: &mut MappingContext,
    ) -> Option<TerraformResource> {
        Some(
            TerraformResource::new(self.target_type(), resource.tf_name())
                .with_comment(source_comment(resource))
                .with_attribute("name", TerraformValue::string(resource.display_name()))
                .with_optional_attribute(
                    "auto_create_subnetworks",
                    resource
                        .bool_property("autoCreateSubnetworks")
                        .map(TerraformValue::Bool),
                )
                .with_optional_attribute(
                    "description",
                    resource.string_property("description").map(TerraformValue::String),
                ),
        )
    }

    fn import_id(&self, resource: &DiscoveredResource) -> String {
        resource.display_name().to_string()
    }
}

/// `gcp:compute:subnetwork` -> `google_compute_subnetwork`.
pub struct SubnetworkMapper;

impl ResourceMapper for SubnetworkMapper {
    fn source_type(&self) -> &'static str {
        "gcp:compute:subnetwork"
    }

    fn target_type(&self) -> &'static str {
        "google_compute_subnetwork"
    }

    fn map(
        &self,
        resource: &DiscoveredResource,
        context: &mut MappingContext,
    ) -> Option<TerraformResource> {
        let cidr = resource.string_property("ipCidrRange")?;
        let network = resource
            .string_property("network")
            .map(|link| context.reference_or_literal(&link))?;

        Some(
            TerraformResource::new(self.target_type(), resource.tf_name())
                .with_comment(source_comment(resource))
                .with_attribute("name", TerraformValue::string(resource.display_name()))
                .with_attribute("network", network)
                .with_attribute("ip_cidr_range", TerraformValue::string(cidr))
                .with_optional_attribute(
                    "region",
                    resource.region.clone().map(TerraformValue::String),
                ),
        )
    }

    fn import_id(&self, resource: &DiscoveredResource) -> String {
        let region = resource
            .region
            .clone()
            .unwrap_or_else(|| "REGION".to_string());
        format!(
            "{}/{}/{}",
            project_of(resource),
            region,
            resource.display_name()
        )
    }
}

/// `gcp:storage:bucket` -> `google_storage_bucket`. Buckets import by name.
pub struct StorageBucketMapper;

impl ResourceMapper for StorageBucketMapper {
    fn source_type(&self) -> &'static str {
        "gcp:storage:bucket"
    }

    fn target_type(&self) -> &'static str {
        "google_storage_bucket"
    }

    fn map(
        &self,
        resource: &DiscoveredResource,
        _context: &mut MappingContext,
    ) -> Option<TerraformResource> {
        let location = resource
            .string_property("location")
            .or_else(|| resource.region.clone())?;

        Some(
            TerraformResource::new(self.target_type(), resource.tf_name())
                .with_comment(source_comment(resource))
                .with_attribute("name", TerraformValue::string(resource.id.clone()))
                .with_attribute("location", TerraformValue::string(location))
                .with_optional_attribute(
                    "storage_class",
                    resource.string_property("storageClass").map(TerraformValue::String),
                )
                .with_optional_attribute(
                    "uniform_bucket_level_access",
                    resource
                        .bool_property("uniformBucketLevelAccess")
                        .map(TerraformValue::Bool),
                )
                .with_optional_attribute("labels", tags_value(resource)),
        )
    }
}

/// `gcp:sql:instance` -> `google_sql_database_instance`.
pub struct SqlInstanceMapper;

impl ResourceMapper for SqlInstanceMapper {
    fn source_type(&self) -> &'static str {
        "gcp:sql:instance"
    }

    fn target_type(&self) -> &'static str {
        "google_sql_database_instance"
    }

    fn map(
        &self,
        resource: &DiscoveredResource,
        context: &mut MappingContext,
    ) -> Option<TerraformResource> {
        let database_version = resource.string_property("databaseVersion")?;

        let settings = resource.string_property("tier").map(|tier| {
            TerraformValue::Block(vec![("tier".to_string(), TerraformValue::string(tier))])
        });
        let root_password = resource.string_property("rootPassword").map(|literal| {
            context.mark_sensitive(
                &format!("{}_root_password", resource.tf_name()),
                &literal,
                "Root password for the SQL instance",
            )
        });

        Some(
            TerraformResource::new(self.target_type(), resource.tf_name())
                .with_comment(source_comment(resource))
                .with_attribute("name", TerraformValue::string(resource.display_name()))
                .with_attribute(
                    "database_version",
                    TerraformValue::string(database_version),
                )
                .with_optional_attribute(
                    "region",
                    resource.region.clone().map(TerraformValue::String),
                )
                .with_optional_attribute("root_password", root_password)
                .with_optional_attribute("settings", settings)
                .with_lifecycle(Lifecycle::ignoring(&["root_password"])),
        )
    }

    fn import_id(&self, resource: &DiscoveredResource) -> String {
        format!("{}/{}", project_of(resource), resource.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx() -> MappingContext {
        MappingContext::new()
    }

    #[test]
    fn test_compute_instance_minimal() {
        let resource = DiscoveredResource::new("web-1", "gcp:compute:instance")
            .with_property("machineType", json!("e2-medium"))
            .with_property("zone", json!("us-central1-a"))
            .with_property("project", json!("my-project"));

        let mapper = ComputeInstanceMapper;
        let mapped = mapper.map(&resource, &mut ctx()).unwrap();

        assert_eq!(mapped.resource_type, "google_compute_instance");
        assert_eq!(mapper.import_id(&resource), "my-project/us-central1-a/web-1");
    }

    #[test]
    fn test_compute_instance_import_id_placeholders() {
        let resource = DiscoveredResource::new("web-1", "gcp:compute:instance")
            .with_property("machineType", json!("e2-medium"));

        assert_eq!(
            ComputeInstanceMapper.import_id(&resource),
            "PROJECT_ID/ZONE/web-1"
        );
    }

    #[test]
    fn test_compute_instance_uses_first_network_interface() {
        let mut context = ctx();
        let network = TerraformResource::new("google_compute_network", "main");
        context.register_resource(
            &network,
            ["https://www.googleapis.com/compute/v1/projects/p/global/networks/main"],
        );

        let resource = DiscoveredResource::new("web-1", "gcp:compute:instance")
            .with_property("machineType", json!("e2-medium"))
            .with_property(
                "networkInterfaces",
                json!([
                    {"network": "https://www.googleapis.com/compute/v1/projects/p/global/networks/main"},
                    {"network": "ignored-secondary"}
                ]),
            );

        let mapped = ComputeInstanceMapper.map(&resource, &mut context).unwrap();
        let interface = mapped
            .attributes
            .iter()
            .find(|(name, _)| name == "network_interface")
            .unwrap();

        match &interface.1 {
            TerraformValue::Block(entries) => {
                assert_eq!(entries.len(), 1);
                assert_eq!(
                    entries[0].1,
                    TerraformValue::reference("google_compute_network.main.id")
                );
            }
            other => panic!("expected block, got {:?}", other),
        }
    }

    #[test]
    fn test_subnetwork_requires_cidr_and_network() {
        let resource = DiscoveredResource::new("private", "gcp:compute:subnetwork")
            .with_property("ipCidrRange", json!("10.0.0.0/20"));
        assert!(SubnetworkMapper.map(&resource, &mut ctx()).is_none());

        let resource = resource
            .with_region("us-central1")
            .with_property("network", json!("projects/p/global/networks/main"))
            .with_property("project", json!("p"));
        let mapped = SubnetworkMapper.map(&resource, &mut ctx()).unwrap();
        assert_eq!(mapped.resource_type, "google_compute_subnetwork");
        assert_eq!(
            SubnetworkMapper.import_id(&resource),
            "p/us-central1/private"
        );
    }

    #[test]
    fn test_storage_bucket_requires_location() {
        let resource = DiscoveredResource::new("assets", "gcp:storage:bucket");
        assert!(StorageBucketMapper.map(&resource, &mut ctx()).is_none());

        let resource = resource.with_property("location", json!("US"));
        let mapped = StorageBucketMapper.map(&resource, &mut ctx()).unwrap();
        assert_eq!(
            mapped.attributes[0],
            ("name".to_string(), TerraformValue::string("assets"))
        );
    }

    #[test]
    fn test_sql_instance_routes_root_password() {
        let mut context = ctx();
        let resource = DiscoveredResource::new("primary-db", "gcp:sql:instance")
            .with_property("databaseVersion", json!("POSTGRES_15"))
            .with_property("tier", json!("db-f1-micro"))
            .with_property("rootPassword", json!("hunter2"));

        let mapped = SqlInstanceMapper.map(&resource, &mut context).unwrap();
        let password = mapped
            .attributes
            .iter()
            .find(|(name, _)| name == "root_password")
            .unwrap();

        assert_eq!(
            password.1,
            TerraformValue::reference("var.primary_db_root_password")
        );
        assert_eq!(context.sensitive_values().len(), 1);
    }
}
