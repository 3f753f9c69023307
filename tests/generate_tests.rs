//! Integration tests for the tfadopt CLI
//!
//! These tests run the binary end-to-end against inventory export files.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::tempdir;

/// Get the path to the tfadopt binary
fn tfadopt_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // Remove test executable name
    path.pop(); // Remove deps directory

    path.push("tfadopt");

    if cfg!(windows) {
        path.set_extension("exe");
    }

    path
}

/// Run tfadopt and return output
fn run_tfadopt(args: &[&str]) -> std::process::Output {
    Command::new(tfadopt_binary())
        .args(args)
        .env("NO_COLOR", "1")
        .output()
        .expect("Failed to execute tfadopt")
}

fn write_export(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("export.json");
    fs::write(&path, content).unwrap();
    path
}

fn generate(dir: &Path, export: &str, extra_args: &[&str]) -> std::process::Output {
    let export_path = write_export(dir, export);
    let out_dir = dir.join("generated");
    let mut args = vec![
        "generate".to_string(),
        export_path.display().to_string(),
        "--output-dir".to_string(),
        out_dir.display().to_string(),
    ];
    args.extend(extra_args.iter().map(|a| a.to_string()));
    let arg_refs: Vec<&str> = args.iter().map(|a| a.as_str()).collect();
    run_tfadopt(&arg_refs)
}

fn read_generated(dir: &Path, name: &str) -> String {
    fs::read_to_string(dir.join("generated").join(name))
        .unwrap_or_else(|e| panic!("missing generated/{}: {}", name, e))
}

const MIXED_AWS_EXPORT: &str = r#"{
  "schemaVersion": "1.0.0",
  "resources": [
    {
      "id": "vpc-0a1",
      "type": "aws:ec2:vpc",
      "name": "main",
      "region": "us-west-2",
      "tags": {"Environment": "production"},
      "properties": {"cidrBlock": "10.0.0.0/16", "enableDnsSupport": true}
    },
    {
      "id": "subnet-0b2",
      "type": "aws:ec2:subnet",
      "name": "private-a",
      "properties": {"cidrBlock": "10.0.1.0/24", "vpcId": "vpc-0a1", "availabilityZone": "us-west-2a"}
    },
    {
      "id": "sg-0c3",
      "type": "aws:ec2:security-group",
      "name": "web-sg",
      "properties": {
        "groupName": "web-sg",
        "vpcId": "vpc-0a1",
        "ingressRules": [
          {"fromPort": 443, "toPort": 443, "protocol": "tcp", "cidrBlocks": ["0.0.0.0/0"]}
        ]
      }
    },
    {
      "id": "i-0d4",
      "type": "aws:ec2:instance",
      "name": "web-1",
      "properties": {
        "imageId": "ami-12345",
        "instanceType": "t3.micro",
        "subnetId": "subnet-0b2",
        "securityGroupIds": ["sg-0c3"]
      }
    },
    {
      "id": "company-assets",
      "type": "aws:s3:bucket",
      "name": "company-assets"
    },
    {
      "id": "prod-db",
      "type": "aws:rds:instance",
      "name": "prod-db",
      "properties": {
        "engine": "postgres",
        "instanceClass": "db.t3.medium",
        "masterUsername": "admin",
        "masterPassword": "s3cret-literal"
      }
    }
  ]
}"#;

#[test]
fn test_version_and_help() {
    let output = run_tfadopt(&["--version"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("tfadopt"));

    let output = run_tfadopt(&["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage:"));
    assert!(stdout.contains("generate"));
    assert!(stdout.contains("types"));
}

#[test]
fn test_types_lists_mappings() {
    let output = run_tfadopt(&["types"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("aws:ec2:instance"));
    assert!(stdout.contains("aws_instance"));
    assert!(stdout.contains("gcp:compute:instance"));
    assert!(stdout.contains("google_compute_instance"));
}

#[test]
fn test_mixed_aws_inventory() {
    let dir = tempdir().unwrap();
    let output = generate(dir.path(), MIXED_AWS_EXPORT, &[]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let providers = read_generated(dir.path(), "providers.tf");
    assert!(providers.contains("required_version = \">= 1.5.0\""));
    assert!(providers.contains("source  = \"hashicorp/aws\""));
    assert!(providers.contains("default = \"us-west-2\""));

    // Cross references resolve to block addresses, not raw ids.
    let network = read_generated(dir.path(), "network.tf");
    assert!(network.contains("resource \"aws_vpc\" \"main\""));
    assert!(network.contains("vpc_id = aws_vpc.main.id"));
    assert!(network.contains("ingress {"));

    let compute = read_generated(dir.path(), "compute.tf");
    assert!(compute.contains("subnet_id = aws_subnet.private_a.id"));
    assert!(compute.contains("vpc_security_group_ids = [aws_security_group.web_sg.id]"));
    assert!(compute.contains("ignore_changes = [ami]"));

    let storage = read_generated(dir.path(), "storage.tf");
    assert!(storage.contains("resource \"aws_s3_bucket\" \"company_assets\""));

    // The password literal appears only in the secrets side file.
    let database = read_generated(dir.path(), "database.tf");
    assert!(database.contains("password = var.prod_db_master_password"));
    assert!(!database.contains("s3cret-literal"));

    let variables = read_generated(dir.path(), "variables.tf");
    assert!(variables.contains("variable \"prod_db_master_password\""));
    assert!(variables.contains("sensitive = true"));
    assert!(!variables.contains("s3cret-literal"));

    let tfvars = read_generated(dir.path(), "terraform.tfvars.example");
    assert!(tfvars.contains("prod_db_master_password = \"CHANGE_ME\""));
    assert!(!tfvars.contains("s3cret-literal"));

    let secrets = read_generated(dir.path(), "secrets.auto.tfvars");
    assert!(secrets.contains("prod_db_master_password = \"s3cret-literal\""));

    // Import plumbing covers every mapped resource.
    let imports = read_generated(dir.path(), "imports.tf");
    for (to, id) in [
        ("aws_vpc.main", "vpc-0a1"),
        ("aws_subnet.private_a", "subnet-0b2"),
        ("aws_security_group.web_sg", "sg-0c3"),
        ("aws_instance.web_1", "i-0d4"),
        ("aws_s3_bucket.company_assets", "company-assets"),
        ("aws_db_instance.prod_db", "prod-db"),
    ] {
        assert!(imports.contains(&format!("to = {}", to)), "missing {}", to);
        assert!(imports.contains(&format!("id = \"{}\"", id)), "missing {}", id);
    }

    let script = read_generated(dir.path(), "import.sh");
    assert!(script.starts_with("#!/usr/bin/env bash"));
    assert!(script.contains(
        "\"$TF_BIN\" import \"aws_vpc.main\" \"vpc-0a1\" || echo \"Warning: failed to import aws_vpc.main\""
    ));
}

#[test]
fn test_empty_inventory_emits_only_provider_file() {
    let dir = tempdir().unwrap();
    let output = generate(
        dir.path(),
        r#"{"schemaVersion": "1.0.0", "resources": []}"#,
        &[],
    );
    assert!(output.status.success());

    let generated = dir.path().join("generated");
    let mut names: Vec<String> = fs::read_dir(&generated)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    assert_eq!(names, vec!["providers.tf"]);
}

#[test]
fn test_unknown_types_reported_not_fatal() {
    let dir = tempdir().unwrap();
    let export = r#"{
      "schemaVersion": "1.0.0",
      "resources": [
        {"id": "vpc-1", "type": "aws:ec2:vpc", "properties": {"cidrBlock": "10.0.0.0/16"}},
        {"id": "cluster-1", "type": "aws:eks:cluster"},
        {"id": "i-2", "type": "aws:ec2:instance"}
      ]
    }"#;
    let output = generate(dir.path(), export, &[]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("cluster-1"));
    assert!(stdout.contains("no mapping for this resource type"));
    assert!(stdout.contains("missing properties"));

    // The mappable resource still made it out.
    let network = read_generated(dir.path(), "network.tf");
    assert!(network.contains("resource \"aws_vpc\" \"vpc_1\""));
}

#[test]
fn test_gcp_inventory() {
    let dir = tempdir().unwrap();
    let export = r#"{
      "schemaVersion": "1.0.0",
      "resources": [
        {
          "id": "projects/p/global/networks/shared",
          "type": "gcp:compute:network",
          "name": "shared",
          "arn": "https://www.googleapis.com/compute/v1/projects/p/global/networks/shared",
          "properties": {"autoCreateSubnetworks": false}
        },
        {
          "id": "web-1",
          "type": "gcp:compute:instance",
          "name": "web-1",
          "properties": {
            "machineType": "e2-medium",
            "zone": "us-central1-a",
            "project": "p",
            "networkInterfaces": [
              {"network": "https://www.googleapis.com/compute/v1/projects/p/global/networks/shared"}
            ]
          }
        }
      ]
    }"#;
    let output = generate(dir.path(), export, &[]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let providers = read_generated(dir.path(), "providers.tf");
    assert!(providers.contains("source  = \"hashicorp/google\""));
    assert!(providers.contains("provider \"google\""));
    assert!(providers.contains("variable \"gcp_region\""));
    assert!(providers.contains("region = var.gcp_region"));

    let compute = read_generated(dir.path(), "compute.tf");
    assert!(compute.contains("resource \"google_compute_instance\" \"web_1\""));
    assert!(compute.contains("network = google_compute_network.shared.id"));

    let imports = read_generated(dir.path(), "imports.tf");
    assert!(imports.contains("id = \"p/us-central1-a/web-1\""));
}

#[test]
fn test_generation_is_byte_identical_across_runs() {
    let dir_a = tempdir().unwrap();
    let dir_b = tempdir().unwrap();
    assert!(generate(dir_a.path(), MIXED_AWS_EXPORT, &[]).status.success());
    assert!(generate(dir_b.path(), MIXED_AWS_EXPORT, &[]).status.success());

    let mut names: Vec<String> = fs::read_dir(dir_a.path().join("generated"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    assert!(!names.is_empty());

    for name in names {
        assert_eq!(
            read_generated(dir_a.path(), &name),
            read_generated(dir_b.path(), &name),
            "file {} differs between runs",
            name
        );
    }
}

#[test]
fn test_large_inventory_one_file_per_service_family() {
    // 50 resources across four service families: the bundle holds exactly
    // one file per represented family and one import per resource.
    let mut resources = Vec::new();
    for i in 0..10 {
        resources.push(serde_json::json!({
            "id": format!("vpc-{:02}", i),
            "type": "aws:ec2:vpc",
            "name": format!("net-{:02}", i),
            "properties": {"cidrBlock": format!("10.{}.0.0/16", i)}
        }));
    }
    for i in 0..20 {
        resources.push(serde_json::json!({
            "id": format!("i-{:03}", i),
            "type": "aws:ec2:instance",
            "name": format!("node-{:03}", i),
            "properties": {"imageId": "ami-12345", "instanceType": "t3.micro"}
        }));
    }
    for i in 0..10 {
        resources.push(serde_json::json!({
            "id": format!("bucket-{:02}", i),
            "type": "aws:s3:bucket"
        }));
    }
    for i in 0..10 {
        resources.push(serde_json::json!({
            "id": format!("queue-{:02}", i),
            "type": "aws:sqs:queue"
        }));
    }
    assert_eq!(resources.len(), 50);
    let export = serde_json::json!({
        "schemaVersion": "1.0.0",
        "resources": resources
    })
    .to_string();

    let dir = tempdir().unwrap();
    let output = generate(dir.path(), &export, &[]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let mut names: Vec<String> = fs::read_dir(dir.path().join("generated"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "compute.tf",
            "import.sh",
            "imports.tf",
            "messaging.tf",
            "network.tf",
            "providers.tf",
            "storage.tf",
        ]
    );

    let imports = read_generated(dir.path(), "imports.tf");
    assert_eq!(imports.matches("import {").count(), 50);

    let script = read_generated(dir.path(), "import.sh");
    assert_eq!(script.matches("\"$TF_BIN\" import ").count(), 50);

    let compute = read_generated(dir.path(), "compute.tf");
    assert_eq!(compute.matches("resource \"aws_instance\"").count(), 20);
}

#[test]
fn test_single_file_flag() {
    let dir = tempdir().unwrap();
    let output = generate(dir.path(), MIXED_AWS_EXPORT, &["--single-file"]);
    assert!(output.status.success());

    let main = read_generated(dir.path(), "main.tf");
    assert!(main.contains("terraform {"));
    assert!(main.contains("resource \"aws_vpc\" \"main\""));
    assert!(main.contains("resource \"aws_db_instance\" \"prod_db\""));
    assert!(main.contains("import {"));
    assert!(!dir.path().join("generated").join("network.tf").exists());
}

#[test]
fn test_no_import_flags() {
    let dir = tempdir().unwrap();
    let output = generate(
        dir.path(),
        MIXED_AWS_EXPORT,
        &["--no-import-blocks", "--no-import-script"],
    );
    assert!(output.status.success());

    let generated = dir.path().join("generated");
    assert!(!generated.join("imports.tf").exists());
    assert!(!generated.join("import.sh").exists());
    assert!(generated.join("network.tf").exists());
}

#[test]
fn test_yaml_export_and_schema_warning() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("export.yaml");
    fs::write(
        &path,
        "resources:\n  - id: vpc-1\n    type: aws:ec2:vpc\n    properties:\n      cidrBlock: 10.0.0.0/16\n",
    )
    .unwrap();
    let out_dir = dir.path().join("generated");

    let output = run_tfadopt(&[
        "generate",
        path.to_str().unwrap(),
        "--output-dir",
        out_dir.to_str().unwrap(),
    ]);
    assert!(output.status.success());

    // Missing schema version warns but does not fail.
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("no schema version"));
    assert!(out_dir.join("network.tf").exists());
}

#[test]
fn test_too_old_schema_fails() {
    let dir = tempdir().unwrap();
    let output = generate(
        dir.path(),
        r#"{"schemaVersion": "0.9.0", "resources": []}"#,
        &[],
    );
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("schema version"));
}

#[test]
fn test_region_flag_overrides_discovered_region() {
    let dir = tempdir().unwrap();
    let output = generate(dir.path(), MIXED_AWS_EXPORT, &["--region", "eu-central-1"]);
    assert!(output.status.success());

    let providers = read_generated(dir.path(), "providers.tf");
    assert!(providers.contains("default = \"eu-central-1\""));
}
