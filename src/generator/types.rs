//! Shared data model for generated Terraform/OpenTofu configuration.
//!
//! Everything the generator emits is built from these types: a recursive
//! [`TerraformValue`] tree, resource/variable/output/import declarations, and
//! the provider metadata used for `required_providers` blocks.

use serde::Serialize;

/// A value inside a Terraform configuration block.
///
/// `Reference` and `Expression` carry raw HCL and are never quoted by the
/// formatter. `Block` is an attribute group rendered as `name { ... }`; a
/// `List` of blocks renders one block per element under the same name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TerraformValue {
    String(String),
    Number(f64),
    Bool(bool),
    Null,
    List(Vec<TerraformValue>),
    /// Ordered map; insertion order is the output order.
    Map(Vec<(String, TerraformValue)>),
    /// Raw reference like `aws_vpc.main.id`.
    Reference(String),
    /// Opaque interpolation or expression, emitted verbatim.
    Expression(String),
    /// Nested attribute group, e.g. `network_interface { ... }`.
    Block(Vec<(String, TerraformValue)>),
}

impl TerraformValue {
    pub fn string(value: impl Into<String>) -> Self {
        TerraformValue::String(value.into())
    }

    pub fn number(value: f64) -> Self {
        TerraformValue::Number(value)
    }

    pub fn reference(value: impl Into<String>) -> Self {
        TerraformValue::Reference(value.into())
    }

    pub fn expression(value: impl Into<String>) -> Self {
        TerraformValue::Expression(value.into())
    }

    /// Single-token values (the inline-collection candidates).
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            TerraformValue::String(_)
                | TerraformValue::Number(_)
                | TerraformValue::Bool(_)
                | TerraformValue::Reference(_)
                | TerraformValue::Expression(_)
        )
    }

    /// Rendered as a `name { ... }` group rather than `name = value`.
    pub fn is_block_like(&self) -> bool {
        match self {
            TerraformValue::Block(_) => true,
            TerraformValue::List(items) => {
                !items.is_empty() && items.iter().all(|i| matches!(i, TerraformValue::Block(_)))
            }
            _ => false,
        }
    }
}

/// Convert a free-form JSON property value into a Terraform value.
pub fn json_to_value(value: &serde_json::Value) -> TerraformValue {
    match value {
        serde_json::Value::Null => TerraformValue::Null,
        serde_json::Value::Bool(b) => TerraformValue::Bool(*b),
        serde_json::Value::Number(n) => TerraformValue::Number(n.as_f64().unwrap_or(0.0)),
        serde_json::Value::String(s) => TerraformValue::String(s.clone()),
        serde_json::Value::Array(items) => {
            TerraformValue::List(items.iter().map(json_to_value).collect())
        }
        serde_json::Value::Object(map) => TerraformValue::Map(
            map.iter()
                .map(|(k, v)| (k.clone(), json_to_value(v)))
                .collect(),
        ),
    }
}

/// Which attributes a `lifecycle` block ignores.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum IgnoreChanges {
    All,
    Attributes(Vec<String>),
}

/// A resource `lifecycle` block.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Lifecycle {
    pub ignore_changes: Option<IgnoreChanges>,
    pub create_before_destroy: Option<bool>,
    pub prevent_destroy: Option<bool>,
    pub replace_triggered_by: Vec<String>,
}

impl Lifecycle {
    /// Lifecycle that only ignores the given attributes.
    pub fn ignoring(attributes: &[&str]) -> Self {
        Self {
            ignore_changes: Some(IgnoreChanges::Attributes(
                attributes.iter().map(|a| a.to_string()).collect(),
            )),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ignore_changes.is_none()
            && self.create_before_destroy.is_none()
            && self.prevent_destroy.is_none()
            && self.replace_triggered_by.is_empty()
    }
}

/// One generated `resource` block.
#[derive(Debug, Clone, Serialize)]
pub struct TerraformResource {
    pub resource_type: String,
    pub name: String,
    /// Ordered attributes; the formatter keeps simple attributes in this
    /// order and moves block-valued ones after them.
    pub attributes: Vec<(String, TerraformValue)>,
    pub lifecycle: Option<Lifecycle>,
    pub depends_on: Vec<String>,
    pub provider: Option<String>,
    pub count: Option<TerraformValue>,
    pub for_each: Option<TerraformValue>,
    /// Comment emitted above the block (source resource provenance).
    pub comment: Option<String>,
}

impl TerraformResource {
    pub fn new(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            name: name.into(),
            attributes: Vec::new(),
            lifecycle: None,
            depends_on: Vec::new(),
            provider: None,
            count: None,
            for_each: None,
            comment: None,
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: TerraformValue) -> Self {
        self.attributes.push((name.into(), value));
        self
    }

    /// Add the attribute only when a value is present. Absent source data is
    /// omitted rather than rendered as an empty placeholder.
    pub fn with_optional_attribute(
        mut self,
        name: impl Into<String>,
        value: Option<TerraformValue>,
    ) -> Self {
        if let Some(value) = value {
            self.attributes.push((name.into(), value));
        }
        self
    }

    pub fn with_lifecycle(mut self, lifecycle: Lifecycle) -> Self {
        if !lifecycle.is_empty() {
            self.lifecycle = Some(lifecycle);
        }
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_depends_on(mut self, reference: impl Into<String>) -> Self {
        self.depends_on.push(reference.into());
        self
    }

    /// The block address, `type.name`.
    pub fn address(&self) -> String {
        format!("{}.{}", self.resource_type, self.name)
    }
}

/// Advisory variable type for `variable` blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VariableType {
    String,
    Number,
    Bool,
    List,
    Map,
}

impl VariableType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VariableType::String => "string",
            VariableType::Number => "number",
            VariableType::Bool => "bool",
            VariableType::List => "list(string)",
            VariableType::Map => "map(string)",
        }
    }
}

/// A `validation` entry inside a variable block.
#[derive(Debug, Clone, Serialize)]
pub struct VariableValidation {
    pub condition: String,
    pub error_message: String,
}

/// One generated `variable` block.
#[derive(Debug, Clone, Serialize)]
pub struct TerraformVariable {
    pub name: String,
    pub var_type: Option<VariableType>,
    pub description: Option<String>,
    pub default: Option<TerraformValue>,
    pub sensitive: bool,
    pub nullable: Option<bool>,
    pub validation: Vec<VariableValidation>,
}

impl TerraformVariable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            var_type: None,
            description: None,
            default: None,
            sensitive: false,
            nullable: None,
            validation: Vec::new(),
        }
    }

    pub fn with_type(mut self, var_type: VariableType) -> Self {
        self.var_type = Some(var_type);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_default(mut self, default: TerraformValue) -> Self {
        self.default = Some(default);
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }
}

/// One generated `output` block.
#[derive(Debug, Clone, Serialize)]
pub struct TerraformOutput {
    pub name: String,
    /// A `Reference` or `Expression` value.
    pub value: TerraformValue,
    pub description: Option<String>,
    pub sensitive: bool,
    pub depends_on: Vec<String>,
}

impl TerraformOutput {
    pub fn new(name: impl Into<String>, value: TerraformValue) -> Self {
        Self {
            name: name.into(),
            value,
            description: None,
            sensitive: false,
            depends_on: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The `type` prefix of the referenced block, used to co-locate outputs
    /// with their resources when organizing files by service.
    pub fn referenced_type(&self) -> Option<&str> {
        let raw = match &self.value {
            TerraformValue::Reference(r) => r.as_str(),
            TerraformValue::Expression(e) => e.as_str(),
            _ => return None,
        };
        raw.split('.').next().filter(|t| !t.is_empty())
    }
}

/// One `import` directive binding a real resource to a block address.
#[derive(Debug, Clone, Serialize)]
pub struct TerraformImport {
    /// Block reference, `type.name`.
    pub to: String,
    /// Provider-native import identifier.
    pub id: String,
    pub provider: Option<String>,
}

impl TerraformImport {
    pub fn new(to: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            id: id.into(),
            provider: None,
        }
    }
}

/// A `data` source block. Rendered like a resource, without lifecycle.
#[derive(Debug, Clone, Serialize)]
pub struct TerraformData {
    pub data_type: String,
    pub name: String,
    pub attributes: Vec<(String, TerraformValue)>,
}

/// Terraform provider metadata for `required_providers` blocks.
#[derive(Debug, Clone, Copy)]
pub struct ProviderRequirement {
    /// Provider name inside the block (e.g. "aws", "google").
    pub name: &'static str,
    /// Registry source (e.g. "hashicorp/aws").
    pub source: &'static str,
    /// Default version constraint.
    pub version: &'static str,
}

/// Look up provider metadata by the inventory provider key (the first
/// segment of a `provider:service:resource` type tag).
pub fn provider_requirement(provider: &str) -> Option<ProviderRequirement> {
    match provider {
        "aws" => Some(ProviderRequirement {
            name: "aws",
            source: "hashicorp/aws",
            version: "~> 5.0",
        }),
        "gcp" | "google" => Some(ProviderRequirement {
            name: "google",
            source: "hashicorp/google",
            version: "~> 5.0",
        }),
        "azure" | "azurerm" => Some(ProviderRequirement {
            name: "azurerm",
            source: "hashicorp/azurerm",
            version: "~> 3.0",
        }),
        _ => None,
    }
}

/// Sanitize a string into a valid Terraform identifier: lowercase,
/// non-alphanumeric runs collapse to a single underscore.
pub fn sanitize_tf_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_underscore = false;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_underscore && !out.is_empty() {
                out.push('_');
            }
            pending_underscore = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_underscore = true;
        }
    }

    if out.is_empty() {
        return "resource".to_string();
    }

    if out.chars().next().unwrap().is_ascii_digit() {
        format!("r_{}", out)
    } else {
        out
    }
}
