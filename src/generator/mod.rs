//! Terraform/OpenTofu configuration generation.
//!
//! The pipeline: discovered resources go through per-type mappers
//! ([`mappers`]) that build a structured block model ([`types`]), sharing
//! per-run state through a [`context::MappingContext`]; the
//! [`orchestrator`] assembles the blocks into files and the [`formatter`]
//! renders them as text.

pub mod context;
pub mod formatter;
pub mod mappers;
pub mod orchestrator;
pub mod types;

pub use context::MappingContext;
pub use formatter::{render, FormatOptions, TerraformFile};
pub use mappers::{MapperRegistry, ResourceMapper};
pub use orchestrator::{
    ConfigGenerator, GenerationResult, GenerationSummary, GeneratorConfig, UnmappedReason,
    UnmappedResource,
};
pub use types::{
    sanitize_tf_name, Lifecycle, TerraformImport, TerraformOutput, TerraformResource,
    TerraformValue, TerraformVariable,
};
