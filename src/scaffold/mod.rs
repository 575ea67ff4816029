// file: src/scaffold/mod.rs
// description: project generator: variants, templates, hooks
// reference: internal module structure

pub mod files;
pub mod generator;
pub mod hooks;
pub mod template;
pub mod variant;

pub use generator::{GeneratedProject, ScaffoldOptions, ScaffoldPlan, generate, slugify};
pub use template::TemplateEngine;
pub use variant::{TemplateVariant, VariantConfig};
