// file: src/scaffold/variant.rs
// description: template variants and their resolved feature sets
// reference: preset table mirrored by the pre-generation summary

use crate::error::{RefServeError, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Preset selection for generated projects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateVariant {
    /// Clean slate for production servers, no demo code.
    Minimal,
    /// Recommended setup with trace attribution enabled.
    Standard,
    /// All examples included for learning.
    Full,
    /// Feature set chosen through individual flags.
    Custom,
}

impl TemplateVariant {
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "minimal" => Ok(TemplateVariant::Minimal),
            "standard" => Ok(TemplateVariant::Standard),
            "full" => Ok(TemplateVariant::Full),
            "custom" => Ok(TemplateVariant::Custom),
            other => Err(RefServeError::Validation(format!(
                "Unknown template variant: {}",
                other
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateVariant::Minimal => "minimal",
            TemplateVariant::Standard => "standard",
            TemplateVariant::Full => "full",
            TemplateVariant::Custom => "custom",
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            TemplateVariant::Minimal => "Minimal: clean slate for production servers",
            TemplateVariant::Standard => "Standard: recommended setup with observability",
            TemplateVariant::Full => "Full: all examples included for learning",
            TemplateVariant::Custom => "Custom: feature set chosen through flags",
        }
    }
}

/// Concrete feature switches applied to the rendered files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantConfig {
    pub demo_tools: bool,
    pub secret_tools: bool,
    pub trace: bool,
}

impl VariantConfig {
    /// Resolve a variant to its feature set. For `Custom` the caller's
    /// flags are used; for presets they are ignored.
    pub fn resolve(variant: TemplateVariant, custom: VariantConfig) -> Self {
        match variant {
            TemplateVariant::Minimal => VariantConfig {
                demo_tools: false,
                secret_tools: false,
                trace: false,
            },
            TemplateVariant::Standard => VariantConfig {
                demo_tools: false,
                secret_tools: false,
                trace: true,
            },
            TemplateVariant::Full => VariantConfig {
                demo_tools: true,
                secret_tools: true,
                trace: true,
            },
            TemplateVariant::Custom => custom,
        }
    }
}

impl Default for VariantConfig {
    fn default() -> Self {
        Self {
            demo_tools: false,
            secret_tools: false,
            trace: true,
        }
    }
}
