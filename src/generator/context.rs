//! Per-run mutable state shared across mapper invocations.
//!
//! One `MappingContext` is created per generation run, so concurrent runs
//! never interfere. It tracks already-mapped resources for cross-resource
//! referencing, de-duplicates variable names, and routes sensitive literals
//! into a side value store instead of the generated text.

use std::collections::{HashMap, HashSet};

use super::types::{sanitize_tf_name, TerraformResource, TerraformValue, TerraformVariable};

#[derive(Debug, Default)]
pub struct MappingContext {
    /// Registered block addresses (`type.name`).
    addresses: HashSet<String>,
    /// External identifier (ARN/self-link/native id) -> block address.
    by_external_id: HashMap<String, String>,
    variables: Vec<TerraformVariable>,
    variable_names: HashSet<String>,
    /// Variable name -> literal secret, kept out of all generated files.
    sensitive_values: Vec<(String, String)>,
}

impl MappingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a mapped resource under its block address and under every
    /// external identifier the source resource carried.
    pub fn register_resource<'a>(
        &mut self,
        resource: &TerraformResource,
        external_ids: impl IntoIterator<Item = &'a str>,
    ) {
        let address = resource.address();
        for id in external_ids {
            if !id.is_empty() {
                self.by_external_id
                    .entry(id.to_string())
                    .or_insert_with(|| address.clone());
            }
        }
        self.addresses.insert(address);
    }

    pub fn has_resource(&self, address: &str) -> bool {
        self.addresses.contains(address)
    }

    /// Resolve a previously registered resource to a `type.name.id`
    /// reference. Returns `None` for unknown identifiers; the context never
    /// looks ahead, so resolution depends on input ordering.
    pub fn resource_reference(&self, external_id: &str) -> Option<TerraformValue> {
        self.by_external_id
            .get(external_id)
            .map(|address| TerraformValue::reference(format!("{}.id", address)))
    }

    /// The referenced value when the target resource was part of this run,
    /// otherwise the literal identifier.
    pub fn reference_or_literal(&self, external_id: &str) -> TerraformValue {
        self.resource_reference(external_id)
            .unwrap_or_else(|| TerraformValue::string(external_id))
    }

    /// Register a variable, de-duplicating its name with a numeric suffix on
    /// collision. Returns the name actually assigned.
    pub fn add_variable(&mut self, mut variable: TerraformVariable) -> String {
        let base = sanitize_tf_name(&variable.name);
        let mut assigned = base.clone();
        let mut suffix = 0;
        while self.variable_names.contains(&assigned) {
            suffix += 1;
            assigned = format!("{}_{}", base, suffix);
        }

        variable.name = assigned.clone();
        self.variable_names.insert(assigned.clone());
        self.variables.push(variable);
        assigned
    }

    /// Replace a literal secret with a sensitive variable. The literal goes
    /// into the side value store only; the returned `var.<name>` reference
    /// is what the mapper embeds.
    pub fn mark_sensitive(
        &mut self,
        key: &str,
        literal: &str,
        description: &str,
    ) -> TerraformValue {
        let variable = TerraformVariable::new(key)
            .with_type(super::types::VariableType::String)
            .with_description(description)
            .sensitive();
        let name = self.add_variable(variable);
        self.sensitive_values.push((name.clone(), literal.to_string()));
        TerraformValue::reference(format!("var.{}", name))
    }

    pub fn variables(&self) -> &[TerraformVariable] {
        &self.variables
    }

    pub fn sensitive_values(&self) -> &[(String, String)] {
        &self.sensitive_values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_resolve_reference() {
        let mut ctx = MappingContext::new();
        let vpc = TerraformResource::new("aws_vpc", "main");
        ctx.register_resource(&vpc, ["arn:aws:ec2:us-east-1:123:vpc/vpc-1", "vpc-1"]);

        assert!(ctx.has_resource("aws_vpc.main"));
        assert_eq!(
            ctx.resource_reference("vpc-1"),
            Some(TerraformValue::reference("aws_vpc.main.id"))
        );
        assert_eq!(
            ctx.resource_reference("arn:aws:ec2:us-east-1:123:vpc/vpc-1"),
            Some(TerraformValue::reference("aws_vpc.main.id"))
        );
    }

    #[test]
    fn test_unregistered_lookup_returns_none() {
        let ctx = MappingContext::new();
        assert!(ctx.resource_reference("vpc-unknown").is_none());
        assert_eq!(
            ctx.reference_or_literal("vpc-unknown"),
            TerraformValue::string("vpc-unknown")
        );
    }

    #[test]
    fn test_variable_name_deduplication() {
        let mut ctx = MappingContext::new();
        let a = ctx.add_variable(TerraformVariable::new("db_password"));
        let b = ctx.add_variable(TerraformVariable::new("db_password"));
        let c = ctx.add_variable(TerraformVariable::new("db_password"));

        assert_eq!(a, "db_password");
        assert_eq!(b, "db_password_1");
        assert_eq!(c, "db_password_2");
        assert_eq!(ctx.variables().len(), 3);
    }

    #[test]
    fn test_variable_name_sanitized() {
        let mut ctx = MappingContext::new();
        let name = ctx.add_variable(TerraformVariable::new("Master Password!"));
        assert_eq!(name, "master_password");
    }

    #[test]
    fn test_mark_sensitive_returns_var_reference() {
        let mut ctx = MappingContext::new();
        let value = ctx.mark_sensitive("db_master_password", "hunter2", "RDS master password");

        assert_eq!(value, TerraformValue::reference("var.db_master_password"));
        assert_eq!(
            ctx.sensitive_values(),
            &[("db_master_password".to_string(), "hunter2".to_string())]
        );

        let variable = &ctx.variables()[0];
        assert!(variable.sensitive);
        assert_eq!(variable.name, "db_master_password");
        // The literal never ends up in the variable itself.
        assert!(variable.default.is_none());
    }
}
