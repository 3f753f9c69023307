use anyhow::Result;

use crate::generator::MapperRegistry;
use crate::output;

/// Handles the 'types' command - lists the supported resource type mappings
pub struct TypesCommand;

impl TypesCommand {
    /// Execute the types command
    pub fn execute() -> Result<()> {
        let registry = MapperRegistry::with_builtin_mappers();

        output::section("Supported resource types");
        output::table_header(&["Source type", "Terraform type"]);
        for mapper in registry.all() {
            output::table_row(&[mapper.source_type(), mapper.target_type()]);
        }

        output::blank();
        output::dimmed(&format!("{} mappings", registry.len()));

        Ok(())
    }
}
