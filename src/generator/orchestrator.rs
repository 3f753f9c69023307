//! Drives a full generation run: mapping, file assembly, import plumbing.
//!
//! The orchestrator walks the discovered resources in input order, consults
//! the registry for each, and assembles the mapped blocks into a bundle of
//! rendered files. Mapping failures are collected, never fatal: one exotic
//! resource must not sink the rest of the inventory. Generation itself has
//! no error path; I/O stays with the caller.

use std::collections::{BTreeMap, HashMap};

use super::context::MappingContext;
use super::formatter::{
    render, ProviderConfig, RequiredProvider, TerraformFile, TerraformSettings,
};
use super::mappers::MapperRegistry;
use super::types::{
    provider_requirement, ProviderRequirement, TerraformImport, TerraformOutput,
    TerraformResource, TerraformValue, TerraformVariable, VariableType,
};
use crate::inventory::DiscoveredResource;

const DEFAULT_AWS_REGION: &str = "us-east-1";
const DEFAULT_GCP_REGION: &str = "us-central1";

/// Tuning knobs for a generation run.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Emit everything into one `main.tf` instead of per-service files.
    pub single_file: bool,
    /// Emit `import {}` blocks (Terraform >= 1.5).
    pub import_blocks: bool,
    /// Emit a `terraform import` shell script.
    pub import_script: bool,
    /// `required_version` constraint for the settings block.
    pub required_version: String,
    /// Overrides the per-provider default version constraint.
    pub provider_version: Option<String>,
    /// Region for the provider blocks; falls back to the first discovered
    /// region, then to a per-provider default.
    pub default_region: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            single_file: false,
            import_blocks: true,
            import_script: true,
            required_version: ">= 1.5.0".to_string(),
            provider_version: None,
            default_region: None,
        }
    }
}

/// Why a discovered resource produced no block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnmappedReason {
    /// No mapper is registered for the source type.
    UnknownType,
    /// A mapper exists but mandatory properties were missing.
    MissingProperties,
}

impl std::fmt::Display for UnmappedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnmappedReason::UnknownType => write!(f, "no mapping for this resource type"),
            UnmappedReason::MissingProperties => {
                write!(f, "missing properties required for a safe mapping")
            }
        }
    }
}

/// A resource left out of the generated configuration.
#[derive(Debug, Clone)]
pub struct UnmappedResource {
    pub id: String,
    pub resource_type: String,
    pub reason: UnmappedReason,
}

/// Aggregate counters for one run.
#[derive(Debug, Clone, Default)]
pub struct GenerationSummary {
    pub total: usize,
    pub mapped: usize,
    pub unmapped: usize,
    /// Service bucket -> mapped resource count, sorted by bucket name.
    pub resources_by_service: BTreeMap<String, usize>,
    pub variable_count: usize,
    pub output_count: usize,
    pub import_count: usize,
}

/// Everything one generation run produced.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    /// File name -> rendered content, in emission order.
    pub files: Vec<(String, String)>,
    pub unmapped: Vec<UnmappedResource>,
    pub imports: Vec<TerraformImport>,
    /// Rendered import shell script, when enabled and non-empty.
    pub import_script: Option<String>,
    /// Variable name -> literal secret, for the caller's side file. Never
    /// part of `files`.
    pub sensitive_values: Vec<(String, String)>,
    pub summary: GenerationSummary,
}

/// Orchestrates mapping and file assembly for one inventory.
pub struct ConfigGenerator {
    config: GeneratorConfig,
    registry: MapperRegistry,
}

impl ConfigGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            registry: MapperRegistry::with_builtin_mappers(),
        }
    }

    pub fn with_registry(config: GeneratorConfig, registry: MapperRegistry) -> Self {
        Self { config, registry }
    }

    pub fn registry(&self) -> &MapperRegistry {
        &self.registry
    }

    /// Run the full pipeline over the discovered resources.
    ///
    /// Cross-resource references resolve against resources mapped earlier in
    /// the input, so dependency-ordered inventories produce the richest
    /// output.
    pub fn generate(&self, resources: &[DiscoveredResource]) -> GenerationResult {
        let mut context = MappingContext::new();
        let mut unmapped = Vec::new();
        let mut imports = Vec::new();
        let mut outputs: Vec<TerraformOutput> = Vec::new();
        let mut bucket_order: Vec<&'static str> = Vec::new();
        let mut buckets: HashMap<&'static str, Vec<TerraformResource>> = HashMap::new();
        let mut providers: BTreeMap<&'static str, ProviderRequirement> = BTreeMap::new();

        for resource in resources {
            let Some(mapper) = self.registry.get(&resource.resource_type) else {
                unmapped.push(UnmappedResource {
                    id: resource.id.clone(),
                    resource_type: resource.resource_type.clone(),
                    reason: UnmappedReason::UnknownType,
                });
                continue;
            };

            let Some(block) = mapper.map(resource, &mut context) else {
                unmapped.push(UnmappedResource {
                    id: resource.id.clone(),
                    resource_type: resource.resource_type.clone(),
                    reason: UnmappedReason::MissingProperties,
                });
                continue;
            };

            if let Some(requirement) = provider_requirement(resource.provider_key()) {
                providers.entry(requirement.name).or_insert(requirement);
            }

            context.register_resource(
                &block,
                [resource.arn.as_deref().unwrap_or(""), resource.id.as_str()],
            );
            imports.push(TerraformImport::new(
                block.address(),
                mapper.import_id(resource),
            ));
            outputs.extend(mapper.suggested_outputs(resource));

            let bucket = service_bucket(&block.resource_type);
            if !buckets.contains_key(bucket) {
                bucket_order.push(bucket);
            }
            buckets.entry(bucket).or_default().push(block);
        }

        let variables: Vec<TerraformVariable> = context.variables().to_vec();
        let region = self.resolve_region(resources);

        let summary = GenerationSummary {
            total: resources.len(),
            mapped: resources.len() - unmapped.len(),
            unmapped: unmapped.len(),
            resources_by_service: bucket_order
                .iter()
                .map(|b| (b.to_string(), buckets[b].len()))
                .collect(),
            variable_count: variables.len(),
            output_count: outputs.len(),
            import_count: imports.len(),
        };

        let files = if self.config.single_file {
            self.assemble_single_file(&providers, region.as_deref(), variables, &bucket_order, buckets, &imports, outputs)
        } else {
            self.assemble_split_files(&providers, region.as_deref(), variables, &bucket_order, buckets, &imports, outputs)
        };

        let import_script = if self.config.import_script && !imports.is_empty() {
            Some(render_import_script(&imports))
        } else {
            None
        };

        GenerationResult {
            files,
            unmapped,
            imports,
            import_script,
            sensitive_values: context.sensitive_values().to_vec(),
            summary,
        }
    }

    /// The configured region, else the first discovered one. Per-provider
    /// fallbacks apply when the inventory carries no region at all.
    fn resolve_region(&self, resources: &[DiscoveredResource]) -> Option<String> {
        self.config
            .default_region
            .clone()
            .or_else(|| resources.iter().find_map(|r| r.region.clone()))
    }

    fn required_providers(
        &self,
        providers: &BTreeMap<&'static str, ProviderRequirement>,
    ) -> Vec<RequiredProvider> {
        providers
            .values()
            .map(|requirement| RequiredProvider {
                name: requirement.name.to_string(),
                source: requirement.source.to_string(),
                version: self
                    .config
                    .provider_version
                    .clone()
                    .unwrap_or_else(|| requirement.version.to_string()),
            })
            .collect()
    }

    /// The `terraform {}` settings plus provider blocks, each wired to its
    /// own defaulted region variable.
    fn provider_sections(
        &self,
        providers: &BTreeMap<&'static str, ProviderRequirement>,
        region: Option<&str>,
        file: &mut TerraformFile,
    ) {
        file.settings = Some(TerraformSettings {
            required_version: Some(self.config.required_version.clone()),
            required_providers: self.required_providers(providers),
        });

        if providers.contains_key("aws") {
            file.variables.push(
                TerraformVariable::new("aws_region")
                    .with_type(VariableType::String)
                    .with_description("AWS region for all resources")
                    .with_default(TerraformValue::string(
                        region.unwrap_or(DEFAULT_AWS_REGION),
                    )),
            );
            file.providers.push(ProviderConfig {
                name: "aws".to_string(),
                alias: None,
                attributes: vec![(
                    "region".to_string(),
                    TerraformValue::reference("var.aws_region"),
                )],
            });
        }
        if providers.contains_key("google") {
            file.variables.push(
                TerraformVariable::new("gcp_region")
                    .with_type(VariableType::String)
                    .with_description("GCP region for all resources")
                    .with_default(TerraformValue::string(
                        region.unwrap_or(DEFAULT_GCP_REGION),
                    )),
            );
            file.providers.push(ProviderConfig {
                name: "google".to_string(),
                alias: None,
                attributes: vec![(
                    "region".to_string(),
                    TerraformValue::reference("var.gcp_region"),
                )],
            });
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble_split_files(
        &self,
        providers: &BTreeMap<&'static str, ProviderRequirement>,
        region: Option<&str>,
        variables: Vec<TerraformVariable>,
        bucket_order: &[&'static str],
        mut buckets: HashMap<&'static str, Vec<TerraformResource>>,
        imports: &[TerraformImport],
        outputs: Vec<TerraformOutput>,
    ) -> Vec<(String, String)> {
        let mut files = Vec::new();

        let mut providers_file = TerraformFile {
            header: Some(file_header("Provider requirements and configuration.")),
            ..TerraformFile::default()
        };
        self.provider_sections(providers, region, &mut providers_file);
        files.push(("providers.tf".to_string(), render(&providers_file)));

        // Outputs live next to the resources they reference.
        let mut outputs_by_bucket: HashMap<&'static str, Vec<TerraformOutput>> = HashMap::new();
        let mut orphan_outputs = Vec::new();
        for output in outputs {
            match output.referenced_type() {
                Some(resource_type) => {
                    let bucket = service_bucket(resource_type);
                    outputs_by_bucket.entry(bucket).or_default().push(output);
                }
                None => orphan_outputs.push(output),
            }
        }

        for bucket in bucket_order {
            let file = TerraformFile {
                header: Some(file_header(&bucket_title(bucket))),
                resources: buckets.remove(bucket).unwrap_or_default(),
                outputs: outputs_by_bucket.remove(bucket).unwrap_or_default(),
                ..TerraformFile::default()
            };
            files.push((format!("{}.tf", bucket), render(&file)));
        }

        if !variables.is_empty() || !orphan_outputs.is_empty() {
            let tfvars = if variables.is_empty() {
                None
            } else {
                Some(render_tfvars_example(&variables))
            };
            let file = TerraformFile {
                header: Some(file_header("Input variables.")),
                variables,
                outputs: orphan_outputs,
                ..TerraformFile::default()
            };
            files.push(("variables.tf".to_string(), render(&file)));
            if let Some(tfvars) = tfvars {
                files.push(("terraform.tfvars.example".to_string(), tfvars));
            }
        }

        if self.config.import_blocks && !imports.is_empty() {
            let file = TerraformFile {
                header: Some(file_header(
                    "Import bindings for existing infrastructure.\n\
                     Remove after the first successful apply.",
                )),
                imports: imports.to_vec(),
                ..TerraformFile::default()
            };
            files.push(("imports.tf".to_string(), render(&file)));
        }

        files
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble_single_file(
        &self,
        providers: &BTreeMap<&'static str, ProviderRequirement>,
        region: Option<&str>,
        variables: Vec<TerraformVariable>,
        bucket_order: &[&'static str],
        mut buckets: HashMap<&'static str, Vec<TerraformResource>>,
        imports: &[TerraformImport],
        outputs: Vec<TerraformOutput>,
    ) -> Vec<(String, String)> {
        let mut file = TerraformFile {
            header: Some(file_header("Complete generated configuration.")),
            ..TerraformFile::default()
        };
        self.provider_sections(providers, region, &mut file);

        let tfvars = if variables.is_empty() {
            None
        } else {
            Some(render_tfvars_example(&variables))
        };
        file.variables.extend(variables);
        if self.config.import_blocks {
            file.imports = imports.to_vec();
        }
        for bucket in bucket_order {
            file.resources.extend(buckets.remove(bucket).unwrap_or_default());
        }
        file.outputs = outputs;

        let mut files = vec![("main.tf".to_string(), render(&file))];
        if let Some(tfvars) = tfvars {
            files.push(("terraform.tfvars.example".to_string(), tfvars));
        }
        files
    }
}

impl Default for ConfigGenerator {
    fn default() -> Self {
        Self::new(GeneratorConfig::default())
    }
}

/// File bucket for a Terraform resource type.
pub fn service_bucket(resource_type: &str) -> &'static str {
    match resource_type {
        "aws_instance" | "google_compute_instance" => "compute",
        "aws_vpc" | "aws_subnet" | "aws_security_group" | "google_compute_network"
        | "google_compute_subnetwork" => "network",
        "aws_s3_bucket" | "google_storage_bucket" => "storage",
        "aws_db_instance" | "aws_dynamodb_table" | "google_sql_database_instance" => "database",
        "aws_lambda_function" => "serverless",
        "aws_iam_role" => "iam",
        "aws_sqs_queue" => "messaging",
        _ => "resources",
    }
}

fn bucket_title(bucket: &str) -> String {
    match bucket {
        "iam" => "IAM resources.".to_string(),
        "resources" => "Other resources.".to_string(),
        other => {
            let mut chars = other.chars();
            match chars.next() {
                Some(first) => {
                    format!("{}{} resources.", first.to_ascii_uppercase(), chars.as_str())
                }
                None => "Resources.".to_string(),
            }
        }
    }
}

fn file_header(description: &str) -> String {
    format!(
        "{}\n\nGenerated by tfadopt. Review before applying.",
        description
    )
}

/// Escape a string for interpolation inside double quotes in a shell script.
pub fn shell_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | '"' | '$' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Render the `terraform import` fallback script.
fn render_import_script(imports: &[TerraformImport]) -> String {
    let mut out = String::from(
        "#!/usr/bin/env bash\n\
         # Imports discovered resources into the Terraform state.\n\
         # Run from the directory containing the generated configuration.\n\
         # Set TF_BIN=tofu to use OpenTofu.\n\
         set -u\n\
         \n\
         TF_BIN=\"${TF_BIN:-terraform}\"\n\
         \n\
         if [ ! -d \".terraform\" ]; then\n\
         \x20\x20\"$TF_BIN\" init\n\
         fi\n\
         \n",
    );

    for import in imports {
        out.push_str(&format!(
            "\"$TF_BIN\" import \"{}\" \"{}\" || echo \"Warning: failed to import {}\"\n",
            shell_escape(&import.to),
            shell_escape(&import.id),
            shell_escape(&import.to)
        ));
    }

    out
}

/// Render the example variable-values file. Sensitive variables get a
/// `CHANGE_ME` placeholder; the real literals never appear here.
fn render_tfvars_example(variables: &[TerraformVariable]) -> String {
    let mut out = String::from(
        "# Example variable values.\n\
         # Copy to terraform.tfvars and replace the placeholders.\n\
         \n",
    );
    for variable in variables {
        out.push_str(&format!(
            "{} = {}\n",
            variable.name,
            tfvars_placeholder(variable)
        ));
    }
    out
}

fn tfvars_placeholder(variable: &TerraformVariable) -> String {
    if variable.sensitive {
        return "\"CHANGE_ME\"".to_string();
    }
    match &variable.default {
        Some(TerraformValue::String(s)) => format!("\"{}\"", s),
        Some(TerraformValue::Number(n)) => {
            if n.fract() == 0.0 {
                format!("{}", *n as i64)
            } else {
                n.to_string()
            }
        }
        Some(TerraformValue::Bool(b)) => b.to_string(),
        _ => match variable.var_type {
            Some(VariableType::Number) => "0".to_string(),
            Some(VariableType::Bool) => "false".to_string(),
            Some(VariableType::List) => "[]".to_string(),
            Some(VariableType::Map) => "{}".to_string(),
            _ => "\"\"".to_string(),
        },
    }
}
