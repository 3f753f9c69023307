mod commands;
mod generator;
mod inventory;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{GenerateCommand, GenerateOptions, TypesCommand};

#[derive(Parser)]
#[command(name = "tfadopt")]
#[command(about = "Generates Terraform/OpenTofu configuration for existing cloud resources", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a configuration bundle from an inventory export
    Generate {
        /// Inventory export file (.json, .yaml or .yml)
        export_file: PathBuf,

        /// Directory for the generated files
        #[arg(short, long, default_value = "./generated")]
        output_dir: PathBuf,

        /// Emit a single main.tf instead of per-service files
        #[arg(long)]
        single_file: bool,

        /// Skip import {} blocks (for Terraform older than 1.5)
        #[arg(long)]
        no_import_blocks: bool,

        /// Skip the import.sh fallback script
        #[arg(long)]
        no_import_script: bool,

        /// Provider region (defaults to the first discovered region)
        #[arg(long, env = "TFADOPT_REGION")]
        region: Option<String>,
    },

    /// List the supported resource type mappings
    Types,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            export_file,
            output_dir,
            single_file,
            no_import_blocks,
            no_import_script,
            region,
        } => {
            GenerateCommand::execute(&GenerateOptions {
                export_file,
                output_dir,
                single_file,
                import_blocks: !no_import_blocks,
                import_script: !no_import_script,
                region,
            })?;
        }
        Commands::Types => {
            TypesCommand::execute()?;
        }
    }

    Ok(())
}
