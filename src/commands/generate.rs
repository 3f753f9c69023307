use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::generator::{ConfigGenerator, GenerationResult, GeneratorConfig};
use crate::inventory::InventoryExport;
use crate::output;

/// Handles the 'generate' command - turns an inventory export into a
/// Terraform configuration bundle
pub struct GenerateCommand;

/// Resolved command-line options for one generate run.
pub struct GenerateOptions {
    pub export_file: PathBuf,
    pub output_dir: PathBuf,
    pub single_file: bool,
    pub import_blocks: bool,
    pub import_script: bool,
    pub region: Option<String>,
}

impl GenerateCommand {
    /// Execute the generate command
    pub fn execute(options: &GenerateOptions) -> Result<()> {
        let export = InventoryExport::load(&options.export_file).with_context(|| {
            format!(
                "Failed to load inventory export '{}'",
                options.export_file.display()
            )
        })?;

        if let Some(warning) = export.schema_warning() {
            output::warning(&warning);
        }

        output::section("Generating configuration");
        output::key_value("Export", &options.export_file.display().to_string());
        output::key_value("Resources", &export.resources.len().to_string());

        let config = GeneratorConfig {
            single_file: options.single_file,
            import_blocks: options.import_blocks,
            import_script: options.import_script,
            default_region: options.region.clone(),
            ..GeneratorConfig::default()
        };
        let generator = ConfigGenerator::new(config);
        let result = generator.generate(&export.resources);

        let written = write_bundle(&options.output_dir, &result)?;

        output::blank();
        for path in &written {
            output::path(&path.display().to_string());
        }

        if !result.sensitive_values.is_empty() {
            output::blank();
            output::warning(
                "secrets.auto.tfvars contains discovered credentials; add it to .gitignore and do not commit it",
            );
        }

        Self::print_summary(&result);
        Self::print_unmapped(&result);

        output::blank();
        output::success_with_details(
            "Configuration generated",
            &format!("({} files)", written.len()),
        );

        let mut steps = vec![
            format!("cd {}", options.output_dir.display()),
            "terraform init".to_string(),
        ];
        if result.import_script.is_some() {
            steps.push("./import.sh".to_string());
        }
        steps.push("terraform plan".to_string());
        output::next_steps(&steps);

        Ok(())
    }

    fn print_summary(result: &GenerationResult) {
        let summary = &result.summary;

        output::subsection("Summary");
        output::key_value("Total resources", &summary.total.to_string());
        output::key_value("Mapped", &summary.mapped.to_string());
        output::key_value("Unmapped", &summary.unmapped.to_string());
        for (service, count) in &summary.resources_by_service {
            output::key_value(&format!("  {}", service), &count.to_string());
        }
        if summary.variable_count > 0 {
            output::key_value("Variables", &summary.variable_count.to_string());
        }
        if summary.output_count > 0 {
            output::key_value("Outputs", &summary.output_count.to_string());
        }
        if summary.import_count > 0 {
            output::key_value("Imports", &summary.import_count.to_string());
        }
    }

    fn print_unmapped(result: &GenerationResult) {
        if result.unmapped.is_empty() {
            return;
        }

        output::subsection("Not mapped");
        for unmapped in &result.unmapped {
            output::list_item(&format!(
                "{} ({}): {}",
                unmapped.id, unmapped.resource_type, unmapped.reason
            ));
        }
    }
}

/// Write the generated bundle to disk and return the written paths.
///
/// The import script is made executable; sensitive literals go to a
/// separate `secrets.auto.tfvars` that is never part of the rendered
/// configuration files.
pub fn write_bundle(dir: &Path, result: &GenerationResult) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory '{}'", dir.display()))?;

    let mut written = Vec::new();
    for (name, content) in &result.files {
        let path = dir.join(name);
        fs::write(&path, content)
            .with_context(|| format!("Failed to write '{}'", path.display()))?;
        written.push(path);
    }

    if let Some(script) = &result.import_script {
        let path = dir.join("import.sh");
        fs::write(&path, script)
            .with_context(|| format!("Failed to write '{}'", path.display()))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
        }
        written.push(path);
    }

    if !result.sensitive_values.is_empty() {
        let path = dir.join("secrets.auto.tfvars");
        fs::write(&path, render_secrets_file(&result.sensitive_values))
            .with_context(|| format!("Failed to write '{}'", path.display()))?;
        written.push(path);
    }

    Ok(written)
}

fn render_secrets_file(values: &[(String, String)]) -> String {
    let mut out = String::from(
        "# Discovered credentials. DO NOT COMMIT THIS FILE.\n\
         # Add secrets.auto.tfvars to .gitignore.\n\
         \n",
    );
    for (name, literal) in values {
        out.push_str(&format!("{} = \"{}\"\n", name, tfvars_quote(literal)));
    }
    out
}

fn tfvars_quote(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::DiscoveredResource;
    use serde_json::json;
    use tempfile::tempdir;

    fn generate(resources: &[DiscoveredResource]) -> GenerationResult {
        ConfigGenerator::default().generate(resources)
    }

    #[test]
    fn test_write_bundle_creates_files() {
        let dir = tempdir().unwrap();
        let resources = vec![DiscoveredResource::new("vpc-1", "aws:ec2:vpc")
            .with_name("main")
            .with_property("cidrBlock", json!("10.0.0.0/16"))];
        let result = generate(&resources);

        let written = write_bundle(dir.path(), &result).unwrap();

        assert!(written.iter().any(|p| p.ends_with("providers.tf")));
        assert!(written.iter().any(|p| p.ends_with("network.tf")));
        assert!(written.iter().any(|p| p.ends_with("import.sh")));
        for path in &written {
            assert!(path.exists());
        }
    }

    #[test]
    fn test_import_script_is_executable() {
        let dir = tempdir().unwrap();
        let resources = vec![DiscoveredResource::new("vpc-1", "aws:ec2:vpc")
            .with_property("cidrBlock", json!("10.0.0.0/16"))];
        let result = generate(&resources);

        write_bundle(dir.path(), &result).unwrap();

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(dir.path().join("import.sh"))
                .unwrap()
                .permissions()
                .mode();
            assert_eq!(mode & 0o111, 0o111);
        }
    }

    #[test]
    fn test_secrets_file_holds_literal_and_config_does_not() {
        let dir = tempdir().unwrap();
        let resources = vec![DiscoveredResource::new("prod-db", "aws:rds:instance")
            .with_property("engine", json!("postgres"))
            .with_property("instanceClass", json!("db.t3.medium"))
            .with_property("masterPassword", json!("hunter2"))];
        let result = generate(&resources);

        write_bundle(dir.path(), &result).unwrap();

        let secrets = fs::read_to_string(dir.path().join("secrets.auto.tfvars")).unwrap();
        assert!(secrets.contains("prod_db_master_password = \"hunter2\""));

        let database = fs::read_to_string(dir.path().join("database.tf")).unwrap();
        assert!(!database.contains("hunter2"));
    }

    #[test]
    fn test_secrets_literals_are_quoted() {
        assert_eq!(tfvars_quote("plain"), "plain");
        assert_eq!(tfvars_quote("p\"w\\d"), "p\\\"w\\\\d");
    }
}
