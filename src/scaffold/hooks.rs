// file: src/scaffold/hooks.rs
// description: pre- and post-generation hooks around project rendering
// reference: external tool failures become warnings unless marked critical

use crate::config::ScaffoldConfig;
use crate::error::{RefServeError, Result};
use crate::scaffold::generator::ScaffoldPlan;
use crate::utils::logging::{format_error, format_info, format_success, format_warning};
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;

/// True when `program --version` runs successfully.
pub fn command_exists(program: &str) -> bool {
    Command::new(program)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|status| status.success())
}

/// Run one setup step. Failures are collected as warnings and the
/// step reports `false`; critical steps abort with an error instead.
pub fn run_step(
    program: &str,
    args: &[&str],
    cwd: &Path,
    description: &str,
    critical: bool,
    warnings: &mut Vec<String>,
) -> Result<bool> {
    println!("→ {}...", description);
    debug!(program = %program, ?args, "running setup step");

    let output = match Command::new(program).args(args).current_dir(cwd).output() {
        Ok(output) => output,
        Err(err) => {
            println!("  {}", format_error(&format!("Command not found: {}", program)));
            if critical {
                return Err(RefServeError::CommandFailed {
                    command: program.to_string(),
                    message: err.to_string(),
                });
            }
            warnings.push(format!(
                "{} not found. Install it and run '{}' manually.",
                program,
                std::iter::once(program)
                    .chain(args.iter().copied())
                    .collect::<Vec<_>>()
                    .join(" ")
            ));
            return Ok(false);
        }
    };

    if output.status.success() {
        println!("  {}", format_success(&format!("{} complete", description)));
        return Ok(true);
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let message = stderr.trim().lines().last().unwrap_or("unknown error").to_string();
    println!(
        "  {}",
        format_error(&format!("{} failed: {}", description, message))
    );

    if critical {
        return Err(RefServeError::CommandFailed {
            command: format!("{} {}", program, args.join(" ")),
            message,
        });
    }

    warnings.push(format!("{} failed: {}", description, message));
    Ok(false)
}

/// Print the variant banner before any file is written. Never fails
/// generation on its own.
pub fn pre_generate(plan: &ScaffoldPlan) {
    let line = "=".repeat(60);
    println!();
    println!("{}", line);
    println!(
        "  Creating '{}' with {} variant",
        plan.name,
        plan.variant.as_str().to_uppercase()
    );
    println!("{}", line);
    println!();
    println!("  Configuration:");
    println!("    demo tools:    {}", yes_no(plan.features.demo_tools));
    println!("    secret tools:  {}", yes_no(plan.features.secret_tools));
    println!("    trace:         {}", yes_no(plan.features.trace));
    println!();
    println!("  {}", format_info(plan.variant.describe()));
    println!();
    println!("{}", "-".repeat(60));
    println!();
}

/// Ordered setup steps after the files are on disk. Returns collected
/// warnings; critical failures abort with an error.
pub fn post_generate(
    plan: &ScaffoldPlan,
    project_dir: &Path,
    config: &ScaffoldConfig,
) -> Result<Vec<String>> {
    let mut warnings = Vec::new();

    // Dependency fetch
    if plan.skip_install {
        println!("→ Fetching dependencies... skipped (--skip-install)");
    } else if command_exists("cargo") {
        run_step(
            "cargo",
            &["fetch"],
            project_dir,
            "Fetching dependencies",
            config.critical_fetch,
            &mut warnings,
        )?;
    } else {
        println!("→ Fetching dependencies...");
        println!(
            "  {}",
            format_error("cargo not found - skipping dependency fetch")
        );
        if config.critical_fetch {
            return Err(RefServeError::CommandFailed {
                command: "cargo".to_string(),
                message: "cargo not found; install Rust via https://rustup.rs".to_string(),
            });
        }
        warnings.push("cargo not found. Install Rust via https://rustup.rs".to_string());
    }

    // Git init and initial commit
    let mut git_ready = false;
    if plan.no_git {
        println!("→ Initializing Git repository... skipped (--no-git)");
    } else if command_exists("git") {
        if project_dir.join(".git").exists() {
            println!("→ Initializing Git repository...");
            println!(
                "  {}",
                format_info("Git repository already initialized in this directory")
            );
            git_ready = true;
        } else {
            git_ready = run_step(
                "git",
                &["init"],
                project_dir,
                "Initializing Git repository",
                config.critical_git_init,
                &mut warnings,
            )?;
        }
    } else {
        println!("→ Initializing Git repository...");
        println!("  {}", format_error("git not found - skipping git initialization"));
        if config.critical_git_init {
            return Err(RefServeError::CommandFailed {
                command: "git".to_string(),
                message: "git not found; install it to use version control".to_string(),
            });
        }
        warnings.push("git not found. Install it to use version control.".to_string());
    }

    if git_ready {
        if run_step(
            "git",
            &["add", "."],
            project_dir,
            "Staging files",
            false,
            &mut warnings,
        )? {
            run_step(
                "git",
                &[
                    "commit",
                    "-m",
                    &format!("Initial commit for {}", plan.slug),
                ],
                project_dir,
                "Creating initial commit",
                false,
                &mut warnings,
            )?;
        }

        // Remote creation is opt-in and never critical.
        if plan.create_remote {
            if command_exists("gh") {
                run_step(
                    "gh",
                    &["repo", "create", &plan.slug, "--private", "--source", "."],
                    project_dir,
                    "Creating remote repository",
                    false,
                    &mut warnings,
                )?;
            } else {
                println!("→ Creating remote repository...");
                println!("  {}", format_error("gh not found - skipping remote creation"));
                warnings.push(
                    "gh not found. Install the GitHub CLI to create remote repositories."
                        .to_string(),
                );
            }
        }
    }

    Ok(warnings)
}

/// Closing summary: warnings first, then next steps.
pub fn print_summary(plan: &ScaffoldPlan, warnings: &[String]) {
    let line = "=".repeat(70);
    println!();
    println!("{}", line);
    println!("{}", format_success(&format!("Project '{}' created successfully!", plan.name)));
    println!("{}", line);
    println!();

    if !warnings.is_empty() {
        println!("{}", format_warning("Warnings:"));
        for warning in warnings {
            println!("   - {}", warning);
        }
        println!();
    }

    println!("Next steps:");
    println!("  1. cd {}", plan.slug);
    println!("  2. cargo test                 # Run tests");
    println!("  3. cargo run -- --transport stdio   # Start the server");
    if plan.features.trace {
        println!("  4. cp .env.example .env       # Configure trace attribution");
    }
    println!();
    println!("Documentation:");
    println!("  - README.md           Getting started guide");
    println!();
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_command_exists_for_missing_binary() {
        assert!(!command_exists("definitely-not-a-real-binary-1234"));
    }

    #[test]
    fn test_run_step_missing_binary_warns_when_not_critical() {
        let dir = TempDir::new().unwrap();
        let mut warnings = Vec::new();

        let ok = run_step(
            "definitely-not-a-real-binary-1234",
            &["--flag"],
            dir.path(),
            "Doing nothing",
            false,
            &mut warnings,
        )
        .unwrap();

        assert!(!ok);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("definitely-not-a-real-binary-1234"));
    }

    #[test]
    fn test_run_step_missing_binary_aborts_when_critical() {
        let dir = TempDir::new().unwrap();
        let mut warnings = Vec::new();

        let err = run_step(
            "definitely-not-a-real-binary-1234",
            &[],
            dir.path(),
            "Doing nothing",
            true,
            &mut warnings,
        )
        .unwrap_err();

        assert!(matches!(err, RefServeError::CommandFailed { .. }));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_run_step_failure_collects_warning() {
        let dir = TempDir::new().unwrap();
        let mut warnings = Vec::new();

        // `false` exists on unix and always fails.
        let ok = run_step("false", &[], dir.path(), "Failing step", false, &mut warnings).unwrap();

        assert!(!ok);
        assert_eq!(warnings.len(), 1);
    }
}
