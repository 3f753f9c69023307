//! AWS resource mappers.
//!
//! Mapping policy: identity and name fields copy verbatim, absent source
//! properties are omitted rather than rendered as empty placeholders, and
//! attributes known to drift out-of-band (AMIs, generated code hashes,
//! credentials) land in `lifecycle.ignore_changes`. Credential-bearing
//! properties are routed through the context's sensitive-value store.

use serde_json::Value;

use super::{source_comment, tags_value, MapperRegistry, ResourceMapper};
use crate::generator::context::MappingContext;
use crate::generator::types::{
    Lifecycle, TerraformOutput, TerraformResource, TerraformValue,
};
use crate::inventory::DiscoveredResource;

/// Register every AWS mapper.
pub fn register_all(registry: &mut MapperRegistry) {
    registry.register(Box::new(InstanceMapper));
    registry.register(Box::new(VpcMapper));
    registry.register(Box::new(SubnetMapper));
    registry.register(Box::new(SecurityGroupMapper));
    registry.register(Box::new(S3BucketMapper));
    registry.register(Box::new(DbInstanceMapper));
    registry.register(Box::new(LambdaFunctionMapper));
    registry.register(Box::new(IamRoleMapper));
    registry.register(Box::new(DynamoDbTableMapper));
    registry.register(Box::new(SqsQueueMapper));
}

/// `aws:ec2:instance` -> `aws_instance`.
pub struct InstanceMapper;

impl ResourceMapper for InstanceMapper {
    fn source_type(&self) -> &'static str {
        "aws:ec2:instance"
    }

    fn target_type(&self) -> &'static str {
        "aws_instance"
    }

    fn map(
        &self,
        resource: &DiscoveredResource,
        context: &mut MappingContext,
    ) -> Option<TerraformResource> {
        let ami = resource.string_property("imageId")?;
        let instance_type = resource.string_property("instanceType")?;

        let subnet = resource
            .string_property("subnetId")
            .map(|id| context.reference_or_literal(&id));
        let security_groups = resource.array_property("securityGroupIds").map(|ids| {
            TerraformValue::List(
                ids.iter()
                    .filter_map(|v| v.as_str())
                    .map(|id| context.reference_or_literal(id))
                    .collect(),
            )
        });
        let root_volume = resource.number_property("rootVolumeSize").map(|size| {
            TerraformValue::Block(vec![(
                "volume_size".to_string(),
                TerraformValue::number(size),
            )])
        });

        Some(
            TerraformResource::new(self.target_type(), resource.tf_name())
                .with_comment(source_comment(resource))
                .with_attribute("ami", TerraformValue::string(ami))
                .with_attribute("instance_type", TerraformValue::string(instance_type))
                .with_optional_attribute("subnet_id", subnet)
                .with_optional_attribute("vpc_security_group_ids", security_groups)
                .with_optional_attribute(
                    "key_name",
                    resource.string_property("keyName").map(TerraformValue::String),
                )
                .with_optional_attribute("tags", tags_value(resource))
                .with_optional_attribute("root_block_device", root_volume)
                // AMIs are rotated out-of-band; re-applying must not replace
                // the instance.
                .with_lifecycle(Lifecycle::ignoring(&["ami"])),
        )
    }

    fn suggested_outputs(&self, resource: &DiscoveredResource) -> Vec<TerraformOutput> {
        let address = format!("{}.{}", self.target_type(), resource.tf_name());
        vec![
            TerraformOutput::new(
                format!("{}_private_ip", resource.tf_name()),
                TerraformValue::reference(format!("{}.private_ip", address)),
            )
            .with_description("Private IP of the instance"),
            TerraformOutput::new(
                format!("{}_public_ip", resource.tf_name()),
                TerraformValue::reference(format!("{}.public_ip", address)),
            )
            .with_description("Public IP of the instance"),
        ]
    }
}

/// `aws:ec2:vpc` -> `aws_vpc`.
pub struct VpcMapper;

impl ResourceMapper for VpcMapper {
    fn source_type(&self) -> &'static str {
        "aws:ec2:vpc"
    }

    fn target_type(&self) -> &'static str {
        "aws_vpc"
    }

    fn map(
        &self,
        resource: &DiscoveredResource,
        _context: &mut MappingContext,
    ) -> Option<TerraformResource> {
        let cidr = resource.string_property("cidrBlock")?;

        Some(
            TerraformResource::new(self.target_type(), resource.tf_name())
                .with_comment(source_comment(resource))
                .with_attribute("cidr_block", TerraformValue::string(cidr))
                .with_optional_attribute(
                    "enable_dns_support",
                    resource.bool_property("enableDnsSupport").map(TerraformValue::Bool),
                )
                .with_optional_attribute(
                    "enable_dns_hostnames",
                    resource
                        .bool_property("enableDnsHostnames")
                        .map(TerraformValue::Bool),
                )
                .with_optional_attribute("tags", tags_value(resource)),
        )
    }

    fn suggested_outputs(&self, resource: &DiscoveredResource) -> Vec<TerraformOutput> {
        vec![TerraformOutput::new(
            format!("{}_vpc_id", resource.tf_name()),
            TerraformValue::reference(format!(
                "{}.{}.id",
                self.target_type(),
                resource.tf_name()
            )),
        )
        .with_description("VPC identifier")]
    }
}

/// `aws:ec2:subnet` -> `aws_subnet`.
pub struct SubnetMapper;

impl ResourceMapper for SubnetMapper {
    fn source_type(&self) -> &'static str {
        "aws:ec2:subnet"
    }

    fn target_type(&self) -> &'static str {
        "aws_subnet"
    }

    fn map(
        &self,
        resource: &DiscoveredResource,
        context: &mut MappingContext,
    ) -> Option<TerraformResource> {
        let cidr = resource.string_property("cidrBlock")?;
        let vpc = resource
            .string_property("vpcId")
            .map(|id| context.reference_or_literal(&id))?;

        Some(
            TerraformResource::new(self.target_type(), resource.tf_name())
                .with_comment(source_comment(resource))
                .with_attribute("vpc_id", vpc)
                .with_attribute("cidr_block", TerraformValue::string(cidr))
                .with_optional_attribute(
                    "availability_zone",
                    resource
                        .string_property("availabilityZone")
                        .map(TerraformValue::String),
                )
                .with_optional_attribute("tags", tags_value(resource)),
        )
    }
}

/// `aws:ec2:security-group` -> `aws_security_group`.
pub struct SecurityGroupMapper;

impl SecurityGroupMapper {
    /// Translate one source rule object into the target's block shape.
    fn rule_block(rule: &Value) -> Option<TerraformValue> {
        let obj = rule.as_object()?;
        let mut entries = Vec::new();

        if let Some(port) = obj.get("fromPort").and_then(|v| v.as_f64()) {
            entries.push(("from_port".to_string(), TerraformValue::number(port)));
        }
        if let Some(port) = obj.get("toPort").and_then(|v| v.as_f64()) {
            entries.push(("to_port".to_string(), TerraformValue::number(port)));
        }
        if let Some(protocol) = obj.get("protocol").and_then(|v| v.as_str()) {
            entries.push(("protocol".to_string(), TerraformValue::string(protocol)));
        }
        if let Some(cidrs) = obj.get("cidrBlocks").and_then(|v| v.as_array()) {
            entries.push((
                "cidr_blocks".to_string(),
                TerraformValue::List(
                    cidrs
                        .iter()
                        .filter_map(|c| c.as_str())
                        .map(TerraformValue::string)
                        .collect(),
                ),
            ));
        }

        if entries.is_empty() {
            None
        } else {
            Some(TerraformValue::Block(entries))
        }
    }

    fn rule_blocks(resource: &DiscoveredResource, key: &str) -> Option<TerraformValue> {
        let rules: Vec<TerraformValue> = resource
            .array_property(key)?
            .iter()
            .filter_map(Self::rule_block)
            .collect();
        if rules.is_empty() {
            None
        } else {
            Some(TerraformValue::List(rules))
        }
    }
}

impl ResourceMapper for SecurityGroupMapper {
    fn source_type(&self) -> &'static str {
        "aws:ec2:security-group"
    }

    fn target_type(&self) -> &'static str {
        "aws_security_group"
    }

    fn map(
        &self,
        resource: &DiscoveredResource,
        context: &mut MappingContext,
    ) -> Option<TerraformResource> {
        let name = resource
            .string_property("groupName")
            .unwrap_or_else(|| resource.display_name().to_string());
        let vpc = resource
            .string_property("vpcId")
            .map(|id| context.reference_or_literal(&id));

        Some(
            TerraformResource::new(self.target_type(), resource.tf_name())
                .with_comment(source_comment(resource))
                .with_attribute("name", TerraformValue::string(name))
                .with_optional_attribute(
                    "description",
                    resource.string_property("description").map(TerraformValue::String),
                )
                .with_optional_attribute("vpc_id", vpc)
                .with_optional_attribute("tags", tags_value(resource))
                .with_optional_attribute("ingress", Self::rule_blocks(resource, "ingressRules"))
                .with_optional_attribute("egress", Self::rule_blocks(resource, "egressRules")),
        )
    }
}

/// `aws:s3:bucket` -> `aws_s3_bucket`. Buckets import by name.
pub struct S3BucketMapper;

impl ResourceMapper for S3BucketMapper {
    fn source_type(&self) -> &'static str {
        "aws:s3:bucket"
    }

    fn target_type(&self) -> &'static str {
        "aws_s3_bucket"
    }

    fn map(
        &self,
        resource: &DiscoveredResource,
        _context: &mut MappingContext,
    ) -> Option<TerraformResource> {
        Some(
            TerraformResource::new(self.target_type(), resource.tf_name())
                .with_comment(source_comment(resource))
                .with_attribute("bucket", TerraformValue::string(resource.id.clone()))
                .with_optional_attribute(
                    "force_destroy",
                    resource.bool_property("forceDestroy").map(TerraformValue::Bool),
                )
                .with_optional_attribute("tags", tags_value(resource)),
        )
    }

    fn suggested_outputs(&self, resource: &DiscoveredResource) -> Vec<TerraformOutput> {
        vec![TerraformOutput::new(
            format!("{}_bucket_arn", resource.tf_name()),
            TerraformValue::reference(format!(
                "{}.{}.arn",
                self.target_type(),
                resource.tf_name()
            )),
        )
        .with_description("ARN of the bucket")]
    }
}

/// `aws:rds:instance` -> `aws_db_instance`.
///
/// The master password is never written as a literal; it becomes a sensitive
/// variable reference and the literal goes to the side value store.
pub struct DbInstanceMapper;

impl ResourceMapper for DbInstanceMapper {
    fn source_type(&self) -> &'static str {
        "aws:rds:instance"
    }

    fn target_type(&self) -> &'static str {
        "aws_db_instance"
    }

    fn map(
        &self,
        resource: &DiscoveredResource,
        context: &mut MappingContext,
    ) -> Option<TerraformResource> {
        let engine = resource.string_property("engine")?;
        let instance_class = resource.string_property("instanceClass")?;

        let password = resource.string_property("masterPassword").map(|literal| {
            context.mark_sensitive(
                &format!("{}_master_password", resource.tf_name()),
                &literal,
                "Master password for the database instance",
            )
        });

        Some(
            TerraformResource::new(self.target_type(), resource.tf_name())
                .with_comment(source_comment(resource))
                .with_attribute("identifier", TerraformValue::string(resource.id.clone()))
                .with_attribute("engine", TerraformValue::string(engine))
                .with_attribute("instance_class", TerraformValue::string(instance_class))
                .with_optional_attribute(
                    "engine_version",
                    resource.string_property("engineVersion").map(TerraformValue::String),
                )
                .with_optional_attribute(
                    "allocated_storage",
                    resource
                        .number_property("allocatedStorage")
                        .map(TerraformValue::Number),
                )
                .with_optional_attribute(
                    "db_name",
                    resource.string_property("dbName").map(TerraformValue::String),
                )
                .with_optional_attribute(
                    "username",
                    resource
                        .string_property("masterUsername")
                        .map(TerraformValue::String),
                )
                .with_optional_attribute("password", password)
                .with_optional_attribute(
                    "multi_az",
                    resource.bool_property("multiAz").map(TerraformValue::Bool),
                )
                .with_optional_attribute("tags", tags_value(resource))
                // The provider cannot read passwords back from the API.
                .with_lifecycle(Lifecycle::ignoring(&["password"])),
        )
    }

    fn suggested_outputs(&self, resource: &DiscoveredResource) -> Vec<TerraformOutput> {
        vec![TerraformOutput::new(
            format!("{}_endpoint", resource.tf_name()),
            TerraformValue::reference(format!(
                "{}.{}.endpoint",
                self.target_type(),
                resource.tf_name()
            )),
        )
        .with_description("Connection endpoint of the database instance")]
    }
}

/// `aws:lambda:function` -> `aws_lambda_function`.
pub struct LambdaFunctionMapper;

impl ResourceMapper for LambdaFunctionMapper {
    fn source_type(&self) -> &'static str {
        "aws:lambda:function"
    }

    fn target_type(&self) -> &'static str {
        "aws_lambda_function"
    }

    fn map(
        &self,
        resource: &DiscoveredResource,
        context: &mut MappingContext,
    ) -> Option<TerraformResource> {
        let function_name = resource
            .string_property("functionName")
            .unwrap_or_else(|| resource.display_name().to_string());
        let role = resource
            .string_property("role")
            .map(|id| context.reference_or_literal(&id));
        let environment = resource
            .properties
            .get("environment")
            .and_then(|v| v.as_object())
            .filter(|env| !env.is_empty())
            .map(|env| {
                let mut entries: Vec<(String, TerraformValue)> = env
                    .iter()
                    .map(|(k, v)| {
                        (
                            k.clone(),
                            TerraformValue::string(v.as_str().unwrap_or_default()),
                        )
                    })
                    .collect();
                entries.sort_by(|a, b| a.0.cmp(&b.0));
                TerraformValue::Block(vec![(
                    "variables".to_string(),
                    TerraformValue::Map(entries),
                )])
            });

        Some(
            TerraformResource::new(self.target_type(), resource.tf_name())
                .with_comment(source_comment(resource))
                .with_attribute("function_name", TerraformValue::string(function_name))
                .with_optional_attribute("role", role)
                .with_optional_attribute(
                    "runtime",
                    resource.string_property("runtime").map(TerraformValue::String),
                )
                .with_optional_attribute(
                    "handler",
                    resource.string_property("handler").map(TerraformValue::String),
                )
                .with_optional_attribute(
                    "memory_size",
                    resource.number_property("memorySize").map(TerraformValue::Number),
                )
                .with_optional_attribute(
                    "timeout",
                    resource.number_property("timeout").map(TerraformValue::Number),
                )
                .with_optional_attribute("tags", tags_value(resource))
                .with_optional_attribute("environment", environment)
                // Deployment pipelines update code outside of Terraform.
                .with_lifecycle(Lifecycle::ignoring(&["filename", "source_code_hash"])),
        )
    }

    fn import_id(&self, resource: &DiscoveredResource) -> String {
        resource
            .string_property("functionName")
            .unwrap_or_else(|| resource.id.clone())
    }
}

/// `aws:iam:role` -> `aws_iam_role`. Roles import by name.
pub struct IamRoleMapper;

impl ResourceMapper for IamRoleMapper {
    fn source_type(&self) -> &'static str {
        "aws:iam:role"
    }

    fn target_type(&self) -> &'static str {
        "aws_iam_role"
    }

    fn map(
        &self,
        resource: &DiscoveredResource,
        _context: &mut MappingContext,
    ) -> Option<TerraformResource> {
        // A role without its trust policy cannot be represented.
        let assume_role_policy = resource.string_property("assumeRolePolicy")?;

        Some(
            TerraformResource::new(self.target_type(), resource.tf_name())
                .with_comment(source_comment(resource))
                .with_attribute("name", TerraformValue::string(resource.display_name()))
                .with_attribute(
                    "assume_role_policy",
                    TerraformValue::string(assume_role_policy),
                )
                .with_optional_attribute(
                    "description",
                    resource.string_property("description").map(TerraformValue::String),
                )
                .with_optional_attribute(
                    "path",
                    resource.string_property("path").map(TerraformValue::String),
                )
                .with_optional_attribute(
                    "max_session_duration",
                    resource
                        .number_property("maxSessionDuration")
                        .map(TerraformValue::Number),
                )
                .with_optional_attribute("tags", tags_value(resource)),
        )
    }

    fn import_id(&self, resource: &DiscoveredResource) -> String {
        resource.display_name().to_string()
    }
}

/// `aws:dynamodb:table` -> `aws_dynamodb_table`.
pub struct DynamoDbTableMapper;

impl ResourceMapper for DynamoDbTableMapper {
    fn source_type(&self) -> &'static str {
        "aws:dynamodb:table"
    }

    fn target_type(&self) -> &'static str {
        "aws_dynamodb_table"
    }

    fn map(
        &self,
        resource: &DiscoveredResource,
        _context: &mut MappingContext,
    ) -> Option<TerraformResource> {
        let hash_key = resource.string_property("hashKey")?;

        let attributes = resource.array_property("attributes").map(|attrs| {
            TerraformValue::List(
                attrs
                    .iter()
                    .filter_map(|a| {
                        let obj = a.as_object()?;
                        Some(TerraformValue::Block(vec![
                            (
                                "name".to_string(),
                                TerraformValue::string(obj.get("name")?.as_str()?),
                            ),
                            (
                                "type".to_string(),
                                TerraformValue::string(obj.get("type")?.as_str()?),
                            ),
                        ]))
                    })
                    .collect(),
            )
        });

        Some(
            TerraformResource::new(self.target_type(), resource.tf_name())
                .with_comment(source_comment(resource))
                .with_attribute("name", TerraformValue::string(resource.id.clone()))
                .with_optional_attribute(
                    "billing_mode",
                    resource.string_property("billingMode").map(TerraformValue::String),
                )
                .with_attribute("hash_key", TerraformValue::string(hash_key))
                .with_optional_attribute(
                    "range_key",
                    resource.string_property("rangeKey").map(TerraformValue::String),
                )
                .with_optional_attribute("tags", tags_value(resource))
                .with_optional_attribute("attribute", attributes),
        )
    }
}

/// `aws:sqs:queue` -> `aws_sqs_queue`. Queues import by URL.
pub struct SqsQueueMapper;

impl ResourceMapper for SqsQueueMapper {
    fn source_type(&self) -> &'static str {
        "aws:sqs:queue"
    }

    fn target_type(&self) -> &'static str {
        "aws_sqs_queue"
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
                    "visibility_timeout_seconds",
                    resource
                        .number_property("visibilityTimeout")
                        .map(TerraformValue::Number),
                )
                .with_optional_attribute(
                    "delay_seconds",
                    resource.number_property("delaySeconds").map(TerraformValue::Number),
                )
                .with_optional_attribute(
                    "fifo_queue",
                    resource.bool_property("fifoQueue").map(TerraformValue::Bool),
                )
                .with_optional_attribute("tags", tags_value(resource)),
        )
    }

    fn import_id(&self, resource: &DiscoveredResource) -> String {
        resource
            .string_property("url")
            .unwrap_or_else(|| resource.id.clone())
    }

    fn suggested_outputs(&self, resource: &DiscoveredResource) -> Vec<TerraformOutput> {
        vec![TerraformOutput::new(
            format!("{}_queue_url", resource.tf_name()),
            TerraformValue::reference(format!(
                "{}.{}.url",
                self.target_type(),
                resource.tf_name()
            )),
        )
        .with_description("URL of the queue")]
    }
}
