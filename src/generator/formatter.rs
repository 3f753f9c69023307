//! Renders the structured block model into Terraform/OpenTofu text.
//!
//! The formatter is a pure function of its input tree: sections render in a
//! fixed canonical order and are joined with blank lines, so output is
//! deterministic and diff-friendly. It performs no semantic validation and
//! has no error path.

use lazy_static::lazy_static;
use regex::Regex;

use super::types::{
    IgnoreChanges, Lifecycle, TerraformData, TerraformImport, TerraformOutput, TerraformResource,
    TerraformValue, TerraformVariable,
};

const INDENT: &str = "  ";
const HEREDOC_SENTINEL: &str = "EOT";

lazy_static! {
    /// Dotted identifier chains like `aws_vpc.main.id`, `var.region` or
    /// `module.net.subnet_ids[0]` are emitted unquoted. Every segment must
    /// start with a letter or underscore (or be the `*` splat), so version
    /// strings like `python3.12` stay quoted.
    static ref BARE_REFERENCE: Regex =
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_-]*(\.([A-Za-z_][A-Za-z0-9_-]*(\[[^\]]*\])?|\*))+$")
            .unwrap();
}

/// Formatter knobs. Only the line-width budget for inline collections is
/// configurable; the default matches the generated-file house style.
#[derive(Debug, Clone)]
pub struct FormatOptions {
    pub line_width: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self { line_width: 80 }
    }
}

impl FormatOptions {
    /// Budget for a single-line collection, leaving room for trailing
    /// context (attribute name, equals sign).
    fn inline_budget(&self) -> usize {
        self.line_width.saturating_sub(10)
    }
}

/// One entry of a `required_providers` block.
#[derive(Debug, Clone)]
pub struct RequiredProvider {
    pub name: String,
    pub source: String,
    pub version: String,
}

/// The top-level `terraform { ... }` settings block.
#[derive(Debug, Clone, Default)]
pub struct TerraformSettings {
    pub required_version: Option<String>,
    pub required_providers: Vec<RequiredProvider>,
}

/// A `provider` configuration block.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub name: String,
    pub alias: Option<String>,
    pub attributes: Vec<(String, TerraformValue)>,
}

/// Ordered aggregate of the optional sections of one output file.
#[derive(Debug, Clone, Default)]
pub struct TerraformFile {
    /// Comment lines emitted at the top of the file.
    pub header: Option<String>,
    pub settings: Option<TerraformSettings>,
    pub providers: Vec<ProviderConfig>,
    pub variables: Vec<TerraformVariable>,
    pub locals: Vec<(String, TerraformValue)>,
    pub data_sources: Vec<TerraformData>,
    pub imports: Vec<TerraformImport>,
    pub resources: Vec<TerraformResource>,
    pub outputs: Vec<TerraformOutput>,
}

impl TerraformFile {
    pub fn is_empty(&self) -> bool {
        self.settings.is_none()
            && self.providers.is_empty()
            && self.variables.is_empty()
            && self.locals.is_empty()
            && self.data_sources.is_empty()
            && self.imports.is_empty()
            && self.resources.is_empty()
            && self.outputs.is_empty()
    }
}

/// Render a file with default options.
pub fn render(file: &TerraformFile) -> String {
    render_with(file, &FormatOptions::default())
}

/// Render a file; sections appear in canonical order, blank-line separated.
pub fn render_with(file: &TerraformFile, options: &FormatOptions) -> String {
    let mut sections: Vec<String> = Vec::new();

    if let Some(header) = &file.header {
        sections.push(
            header
                .lines()
                .map(|l| {
                    if l.is_empty() {
                        "#".to_string()
                    } else {
                        format!("# {}", l)
                    }
                })
                .collect::<Vec<_>>()
                .join("\n"),
        );
    }

    if let Some(settings) = &file.settings {
        sections.push(format_settings(settings));
    }

    for provider in &file.providers {
        sections.push(format_provider(provider, options));
    }

    for variable in &file.variables {
        sections.push(format_variable(variable, options));
    }

    if !file.locals.is_empty() {
        sections.push(format_locals(&file.locals, options));
    }

    for data in &file.data_sources {
        sections.push(format_data(data, options));
    }

    for import in &file.imports {
        sections.push(format_import(import));
    }

    for resource in &file.resources {
        sections.push(format_resource(resource, options));
    }

    for output in &file.outputs {
        sections.push(format_output(output, options));
    }

    let mut text = sections.join("\n\n");
    text.push('\n');
    text
}

fn indent_str(level: usize) -> String {
    INDENT.repeat(level)
}

fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}

/// Whether a string should be emitted without quotes.
fn is_bare_expression(s: &str) -> bool {
    if s.contains('\n') {
        return false;
    }
    s.starts_with("${") || BARE_REFERENCE.is_match(s)
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Render a value at the given indent level. The indent is only used for
/// multi-line forms (heredocs, long collections, nested blocks).
fn format_value(value: &TerraformValue, level: usize, options: &FormatOptions) -> String {
    match value {
        TerraformValue::String(s) => format_string(s, level),
        TerraformValue::Number(n) => format_number(*n),
        TerraformValue::Bool(b) => b.to_string(),
        TerraformValue::Null => "null".to_string(),
        TerraformValue::Reference(r) => r.clone(),
        TerraformValue::Expression(e) => e.clone(),
        TerraformValue::List(items) => format_list(items, level, options),
        TerraformValue::Map(entries) => format_map(entries, level, options),
        // A block in value position has no `name = value` form; coerce to
        // the map rendering so output stays well-formed.
        TerraformValue::Block(entries) => format_map(entries, level, options),
    }
}

fn format_string(s: &str, level: usize) -> String {
    if s.contains("${") && s.contains('\n') {
        return format_heredoc(s, level);
    }
    if is_bare_expression(s) {
        return s.to_string();
    }
    format!("\"{}\"", escape_string(s))
}

fn format_heredoc(s: &str, level: usize) -> String {
    let body_indent = indent_str(level + 1);
    let mut out = format!("<<-{}\n", HEREDOC_SENTINEL);
    for line in s.lines() {
        out.push_str(&body_indent);
        out.push_str(line);
        out.push('\n');
    }
    out.push_str(&indent_str(level));
    out.push_str(HEREDOC_SENTINEL);
    out
}

/// Scalar that renders as a single token. Strings that would become
/// heredocs must not end up inside an inline collection.
fn is_inline_candidate(value: &TerraformValue) -> bool {
    if let TerraformValue::String(s) = value {
        if s.contains("${") && s.contains('\n') {
            return false;
        }
    }
    value.is_scalar()
}

fn format_list(items: &[TerraformValue], level: usize, options: &FormatOptions) -> String {
    if items.is_empty() {
        return "[]".to_string();
    }

    let all_scalar = items.iter().all(is_inline_candidate);
    if all_scalar && items.len() <= 5 {
        let rendered: Vec<String> = items
            .iter()
            .map(|i| format_value(i, level, options))
            .collect();
        let inline = format!("[{}]", rendered.join(", "));
        if inline.len() <= options.inline_budget() {
            return inline;
        }
    }

    let inner = indent_str(level + 1);
    let mut out = String::from("[\n");
    for item in items {
        out.push_str(&inner);
        out.push_str(&format_value(item, level + 1, options));
        out.push_str(",\n");
    }
    out.push_str(&indent_str(level));
    out.push(']');
    out
}

fn format_map_key(key: &str) -> String {
    let valid = !key.is_empty()
        && key
            .chars()
            .next()
            .map(|c| c.is_ascii_alphabetic() || c == '_')
            .unwrap_or(false)
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        key.to_string()
    } else {
        format!("\"{}\"", escape_string(key))
    }
}

fn format_map(
    entries: &[(String, TerraformValue)],
    level: usize,
    options: &FormatOptions,
) -> String {
    if entries.is_empty() {
        return "{}".to_string();
    }

    let all_scalar = entries.iter().all(|(_, v)| is_inline_candidate(v));
    if all_scalar && entries.len() <= 3 {
        let rendered: Vec<String> = entries
            .iter()
            .map(|(k, v)| format!("{} = {}", format_map_key(k), format_value(v, level, options)))
            .collect();
        let inline = format!("{{ {} }}", rendered.join(", "));
        if inline.len() <= options.inline_budget() {
            return inline;
        }
    }

    let inner = indent_str(level + 1);
    let mut out = String::from("{\n");
    for (key, value) in entries {
        out.push_str(&inner);
        out.push_str(&format_map_key(key));
        out.push_str(" = ");
        out.push_str(&format_value(value, level + 1, options));
        out.push('\n');
    }
    out.push_str(&indent_str(level));
    out.push('}');
    out
}

/// Render the attributes of a block: simple attributes first in caller
/// order, then block-valued attributes, each preceded by a blank line.
fn format_attributes(
    attributes: &[(String, TerraformValue)],
    level: usize,
    options: &FormatOptions,
) -> String {
    let ind = indent_str(level);
    let mut out = String::new();

    for (name, value) in attributes.iter().filter(|(_, v)| !v.is_block_like()) {
        out.push_str(&ind);
        out.push_str(name);
        out.push_str(" = ");
        out.push_str(&format_value(value, level, options));
        out.push('\n');
    }

    for (name, value) in attributes.iter().filter(|(_, v)| v.is_block_like()) {
        if !out.is_empty() {
            out.push('\n');
        }
        match value {
            TerraformValue::Block(entries) => {
                out.push_str(&format_nested_block(name, entries, level, options));
            }
            TerraformValue::List(items) => {
                // One block per element, reusing the attribute name.
                for (i, item) in items.iter().enumerate() {
                    if let TerraformValue::Block(entries) = item {
                        if i > 0 {
                            out.push('\n');
                        }
                        out.push_str(&format_nested_block(name, entries, level, options));
                    }
                }
            }
            _ => unreachable!("is_block_like covers only Block and List"),
        }
    }

    out
}

fn format_nested_block(
    name: &str,
    entries: &[(String, TerraformValue)],
    level: usize,
    options: &FormatOptions,
) -> String {
    let ind = indent_str(level);
    if entries.is_empty() {
        return format!("{}{} {{}}\n", ind, name);
    }
    let mut out = format!("{}{} {{\n", ind, name);
    out.push_str(&format_attributes(entries, level + 1, options));
    out.push_str(&ind);
    out.push_str("}\n");
    out
}

fn format_settings(settings: &TerraformSettings) -> String {
    let mut out = String::from("terraform {\n");

    if let Some(version) = &settings.required_version {
        out.push_str(&format!("  required_version = \"{}\"\n", escape_string(version)));
    }

    if !settings.required_providers.is_empty() {
        if settings.required_version.is_some() {
            out.push('\n');
        }
        out.push_str("  required_providers {\n");
        for provider in &settings.required_providers {
            out.push_str(&format!("    {} = {{\n", provider.name));
            out.push_str(&format!("      source  = \"{}\"\n", escape_string(&provider.source)));
            out.push_str(&format!("      version = \"{}\"\n", escape_string(&provider.version)));
            out.push_str("    }\n");
        }
        out.push_str("  }\n");
    }

    out.push('}');
    out
}

fn format_provider(provider: &ProviderConfig, options: &FormatOptions) -> String {
    let mut out = format!("provider \"{}\" {{\n", provider.name);
    if let Some(alias) = &provider.alias {
        out.push_str(&format!("  alias = \"{}\"\n", alias));
    }
    out.push_str(&format_attributes(&provider.attributes, 1, options));
    out.push('}');
    out
}

fn format_variable(variable: &TerraformVariable, options: &FormatOptions) -> String {
    let mut out = format!("variable \"{}\" {{\n", variable.name);

    if let Some(description) = &variable.description {
        out.push_str(&format!("  description = \"{}\"\n", escape_string(description)));
    }
    if let Some(var_type) = &variable.var_type {
        out.push_str(&format!("  type = {}\n", var_type.as_str()));
    }
    if let Some(default) = &variable.default {
        out.push_str(&format!("  default = {}\n", format_value(default, 1, options)));
    }
    if variable.sensitive {
        out.push_str("  sensitive = true\n");
    }
    if let Some(nullable) = variable.nullable {
        out.push_str(&format!("  nullable = {}\n", nullable));
    }
    for validation in &variable.validation {
        out.push_str("\n  validation {\n");
        out.push_str(&format!("    condition     = {}\n", validation.condition));
        out.push_str(&format!(
            "    error_message = \"{}\"\n",
            escape_string(&validation.error_message)
        ));
        out.push_str("  }\n");
    }

    out.push('}');
    out
}

fn format_locals(locals: &[(String, TerraformValue)], options: &FormatOptions) -> String {
    let mut out = String::from("locals {\n");
    for (name, value) in locals {
        out.push_str(&format!("  {} = {}\n", name, format_value(value, 1, options)));
    }
    out.push('}');
    out
}

fn format_data(data: &TerraformData, options: &FormatOptions) -> String {
    let mut out = format!("data \"{}\" \"{}\" {{\n", data.data_type, data.name);
    out.push_str(&format_attributes(&data.attributes, 1, options));
    out.push('}');
    out
}

fn format_import(import: &TerraformImport) -> String {
    let mut out = String::from("import {\n");
    out.push_str(&format!("  to = {}\n", import.to));
    out.push_str(&format!("  id = \"{}\"\n", escape_string(&import.id)));
    if let Some(provider) = &import.provider {
        out.push_str(&format!("  provider = {}\n", provider));
    }
    out.push('}');
    out
}

fn format_resource(resource: &TerraformResource, options: &FormatOptions) -> String {
    let mut out = String::new();

    if let Some(comment) = &resource.comment {
        for line in comment.lines() {
            out.push_str(&format!("# {}\n", line));
        }
    }

    out.push_str(&format!(
        "resource \"{}\" \"{}\" {{\n",
        resource.resource_type, resource.name
    ));

    let mut body = String::new();

    // Meta-arguments come first.
    if let Some(provider) = &resource.provider {
        body.push_str(&format!("  provider = {}\n", provider));
    }
    if let Some(count) = &resource.count {
        body.push_str(&format!("  count = {}\n", format_value(count, 1, options)));
    }
    if let Some(for_each) = &resource.for_each {
        body.push_str(&format!("  for_each = {}\n", format_value(for_each, 1, options)));
    }
    if !body.is_empty() && !resource.attributes.is_empty() {
        body.push('\n');
    }

    body.push_str(&format_attributes(&resource.attributes, 1, options));

    if let Some(lifecycle) = &resource.lifecycle {
        if !body.is_empty() {
            body.push('\n');
        }
        body.push_str(&format_lifecycle(lifecycle, options));
    }

    if !resource.depends_on.is_empty() {
        if !body.is_empty() {
            body.push('\n');
        }
        let refs: Vec<TerraformValue> = resource
            .depends_on
            .iter()
            .map(|r| TerraformValue::reference(r.clone()))
            .collect();
        body.push_str(&format!(
            "  depends_on = {}\n",
            format_list(&refs, 1, options)
        ));
    }

    out.push_str(&body);
    out.push('}');
    out
}

fn format_lifecycle(lifecycle: &Lifecycle, options: &FormatOptions) -> String {
    let mut out = String::from("  lifecycle {\n");

    if let Some(ignore) = &lifecycle.ignore_changes {
        match ignore {
            IgnoreChanges::All => out.push_str("    ignore_changes = all\n"),
            IgnoreChanges::Attributes(attrs) => {
                let refs: Vec<TerraformValue> = attrs
                    .iter()
                    .map(|a| TerraformValue::reference(a.clone()))
                    .collect();
                out.push_str(&format!(
                    "    ignore_changes = {}\n",
                    format_list(&refs, 2, options)
                ));
            }
        }
    }
    if let Some(cbd) = lifecycle.create_before_destroy {
        out.push_str(&format!("    create_before_destroy = {}\n", cbd));
    }
    if let Some(pd) = lifecycle.prevent_destroy {
        out.push_str(&format!("    prevent_destroy = {}\n", pd));
    }
    if !lifecycle.replace_triggered_by.is_empty() {
        let refs: Vec<TerraformValue> = lifecycle
            .replace_triggered_by
            .iter()
            .map(|r| TerraformValue::reference(r.clone()))
            .collect();
        out.push_str(&format!(
            "    replace_triggered_by = {}\n",
            format_list(&refs, 2, options)
        ));
    }

    out.push_str("  }\n");
    out
}

fn format_output(output: &TerraformOutput, options: &FormatOptions) -> String {
    let mut out = format!("output \"{}\" {{\n", output.name);

    if let Some(description) = &output.description {
        out.push_str(&format!("  description = \"{}\"\n", escape_string(description)));
    }
    out.push_str(&format!(
        "  value = {}\n",
        format_value(&output.value, 1, options)
    ));
    if output.sensitive {
        out.push_str("  sensitive = true\n");
    }
    if !output.depends_on.is_empty() {
        let refs: Vec<TerraformValue> = output
            .depends_on
            .iter()
            .map(|r| TerraformValue::reference(r.clone()))
            .collect();
        out.push_str(&format!(
            "  depends_on = {}\n",
            format_list(&refs, 1, options)
        ));
    }

    out.push('}');
    out
}
