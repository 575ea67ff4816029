// file: src/scaffold/generator.rs
// description: renders a new server project from the built-in templates
// reference: pre-generation banner, file rendering, post-generation setup

use crate::config::ScaffoldConfig;
use crate::error::{RefServeError, Result};
use crate::scaffold::files::project_files;
use crate::scaffold::hooks;
use crate::scaffold::template::TemplateEngine;
use crate::scaffold::variant::{TemplateVariant, VariantConfig};
use crate::utils::telemetry::OperationTimer;
use crate::utils::validation::Validator;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

/// Caller-supplied generation options.
#[derive(Debug, Clone)]
pub struct ScaffoldOptions {
    pub name: String,
    pub output_dir: PathBuf,
    pub variant: TemplateVariant,
    /// Feature flags applied when the variant is `Custom`.
    pub custom: VariantConfig,
    pub description: Option<String>,
    pub author: Option<String>,
    pub force: bool,
    pub skip_install: bool,
    pub no_git: bool,
    pub create_remote: bool,
}

/// Resolved generation plan shared with the hooks.
#[derive(Debug, Clone)]
pub struct ScaffoldPlan {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub author: String,
    pub variant: TemplateVariant,
    pub features: VariantConfig,
    pub skip_install: bool,
    pub no_git: bool,
    pub create_remote: bool,
}

/// Result of a completed generation.
#[derive(Debug)]
pub struct GeneratedProject {
    pub project_dir: PathBuf,
    pub files: Vec<PathBuf>,
    pub warnings: Vec<String>,
}

/// Derive a project slug from a display name: lowercased, whitespace
/// collapsed to '-', everything else passed through for validation.
pub fn slugify(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

pub fn generate(options: ScaffoldOptions, config: &ScaffoldConfig) -> Result<GeneratedProject> {
    let timer = OperationTimer::new("scaffold");

    let slug = slugify(&options.name);
    Validator::validate_project_slug(&slug)?;

    let features = VariantConfig::resolve(options.variant, options.custom);
    let plan = ScaffoldPlan {
        name: options.name.clone(),
        slug: slug.clone(),
        description: options
            .description
            .unwrap_or_else(|| format!("{} - an MCP server with reference caching", options.name)),
        author: options
            .author
            .unwrap_or_else(|| config.default_author.clone()),
        variant: options.variant,
        features,
        skip_install: options.skip_install,
        no_git: options.no_git,
        create_remote: options.create_remote,
    };

    let project_dir = options.output_dir.join(&plan.slug);
    if project_dir.exists() && !options.force {
        return Err(RefServeError::Scaffold(format!(
            "target directory already exists: {} (use --force to overwrite)",
            project_dir.display()
        )));
    }

    hooks::pre_generate(&plan);

    let engine = TemplateEngine::new()
        .with_value("project_slug", &plan.slug)
        .with_value("project_name", &plan.name)
        .with_value("description", &plan.description)
        .with_value("author", &plan.author)
        .with_value("variant", plan.variant.as_str())
        .with_flag("demo_tools", features.demo_tools)
        .with_flag("secret_tools", features.secret_tools)
        .with_flag("trace", features.trace)
        .with_flag("no_trace", !features.trace);

    fs::create_dir_all(&project_dir)?;

    let mut written = Vec::new();
    for file in project_files() {
        if let Some(flag) = file.requires {
            let enabled = match flag {
                "demo_tools" => features.demo_tools,
                "secret_tools" => features.secret_tools,
                "trace" => features.trace,
                other => {
                    return Err(RefServeError::Scaffold(format!(
                        "template file '{}' gated on unknown flag '{}'",
                        file.path, other
                    )));
                }
            };
            if !enabled {
                debug!(path = %file.path, flag = %flag, "skipping gated template file");
                continue;
            }
        }

        let rendered = engine.render(file.contents)?;
        let target = project_dir.join(file.path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, rendered)?;
        info!("Rendered {}", target.display());
        written.push(target);
    }

    let warnings = hooks::post_generate(&plan, &project_dir, config)?;
    hooks::print_summary(&plan, &warnings);
    timer.finish();

    Ok(GeneratedProject {
        project_dir,
        files: written,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn quiet_config() -> ScaffoldConfig {
        ScaffoldConfig {
            default_variant: "standard".to_string(),
            default_author: "Tester".to_string(),
            critical_fetch: false,
            critical_git_init: false,
        }
    }

    fn options(name: &str, output: &TempDir, variant: TemplateVariant) -> ScaffoldOptions {
        ScaffoldOptions {
            name: name.to_string(),
            output_dir: output.path().to_path_buf(),
            variant,
            custom: VariantConfig::default(),
            description: None,
            author: None,
            force: false,
            skip_install: true,
            no_git: true,
            create_remote: false,
        }
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("My Server"), "my-server");
        assert_eq!(slugify("  spaced   name "), "spaced-name");
        assert_eq!(slugify("already-fine"), "already-fine");
    }

    #[test]
    fn test_generate_full_variant_writes_all_files() {
        let output = TempDir::new().unwrap();
        let project = generate(
            options("Demo Server", &output, TemplateVariant::Full),
            &quiet_config(),
        )
        .unwrap();

        let dir = &project.project_dir;
        assert!(dir.join("Cargo.toml").exists());
        assert!(dir.join("src/main.rs").exists());
        assert!(dir.join("config/default.toml").exists());
        assert!(dir.join("README.md").exists());
        assert!(dir.join(".env.example").exists());

        let cargo = fs::read_to_string(dir.join("Cargo.toml")).unwrap();
        assert!(cargo.contains("name = \"demo-server\""));
        assert!(cargo.contains("refserve"));

        let readme = fs::read_to_string(dir.join("README.md")).unwrap();
        assert!(readme.contains("# Demo Server"));
        assert!(readme.contains("Demo tools"));
        assert!(readme.contains("Private computation"));
    }

    #[test]
    fn test_generate_minimal_variant_omits_gated_content() {
        let output = TempDir::new().unwrap();
        let project = generate(
            options("Plain Server", &output, TemplateVariant::Minimal),
            &quiet_config(),
        )
        .unwrap();

        let dir = &project.project_dir;
        assert!(!dir.join(".env.example").exists());

        let readme = fs::read_to_string(dir.join("README.md")).unwrap();
        assert!(!readme.contains("Demo tools"));
        assert!(!readme.contains("Trace attribution"));

        let config = fs::read_to_string(dir.join("config/default.toml")).unwrap();
        assert!(config.contains("disabled = true"));
    }

    #[test]
    fn test_generate_custom_variant_honors_flags() {
        let output = TempDir::new().unwrap();
        let mut opts = options("Custom Server", &output, TemplateVariant::Custom);
        opts.custom = VariantConfig {
            demo_tools: true,
            secret_tools: false,
            trace: false,
        };

        let project = generate(opts, &quiet_config()).unwrap();
        let readme = fs::read_to_string(project.project_dir.join("README.md")).unwrap();
        assert!(readme.contains("Demo tools"));
        assert!(!readme.contains("Private computation"));
        assert!(!project.project_dir.join(".env.example").exists());
    }

    #[test]
    fn test_generate_rejects_invalid_name() {
        let output = TempDir::new().unwrap();
        let err = generate(
            options("123 bad", &output, TemplateVariant::Minimal),
            &quiet_config(),
        )
        .unwrap_err();
        assert!(matches!(err, RefServeError::Validation(_)));
    }

    #[test]
    fn test_generate_refuses_existing_directory_without_force() {
        let output = TempDir::new().unwrap();
        fs::create_dir_all(output.path().join("taken")).unwrap();

        let err = generate(
            options("Taken", &output, TemplateVariant::Minimal),
            &quiet_config(),
        )
        .unwrap_err();
        assert!(matches!(err, RefServeError::Scaffold(_)));

        let mut opts = options("Taken", &output, TemplateVariant::Minimal);
        opts.force = true;
        assert!(generate(opts, &quiet_config()).is_ok());
    }

    #[test]
    fn test_generated_main_gates_log_lines_by_variant() {
        let output = TempDir::new().unwrap();
        let project = generate(
            options("Gated", &output, TemplateVariant::Standard),
            &quiet_config(),
        )
        .unwrap();

        let main_rs = fs::read_to_string(project.project_dir.join("src/main.rs")).unwrap();
        assert!(main_rs.contains("Trace attribution"));
        assert!(!main_rs.contains("Demo tools enabled"));
        assert!(!main_rs.contains("Secret tools enabled"));
    }
}
