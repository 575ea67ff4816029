// file: src/main.rs
// description: commandline application entry point with command handling
// reference: application bootstrap and orchestration

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;
use refserve::scaffold::hooks::command_exists;
use refserve::scaffold::{ScaffoldOptions, TemplateVariant, VariantConfig, generate};
use refserve::trace::{TraceBackend, flush_traces};
use refserve::utils::logging::{format_success, format_warning};
use refserve::{Config, RefServeMcp};
use rmcp::ServiceExt;
use rmcp::transport::sse_server::SseServer;
use rmcp::transport::stdio;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "refserve")]
#[command(version = "0.1.0")]
#[command(about = "Reference-caching MCP tool server with trace attribution", long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config/default.toml"
    )]
    config: PathBuf,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the MCP server
    Serve {
        /// Transport mode: stdio (Claude Desktop / Zed) or sse (web clients)
        #[arg(long)]
        transport: Option<String>,

        /// Host for the sse transport
        #[arg(long)]
        host: Option<String>,

        /// Port for the sse transport
        #[arg(long)]
        port: Option<u16>,
    },

    /// Generate a new server project from the built-in templates
    Scaffold {
        /// Project name (the directory slug is derived from it)
        #[arg(long)]
        name: String,

        /// Template variant; presets ignore the individual flags below
        #[arg(long, value_enum)]
        variant: Option<TemplateVariant>,

        /// Include demo tools (custom variant)
        #[arg(long, action = ArgAction::SetTrue)]
        demo_tools: bool,

        /// Include secret/private-computation tools (custom variant)
        #[arg(long, action = ArgAction::SetTrue)]
        secret_tools: bool,

        /// Include trace attribution setup (custom variant)
        #[arg(long, action = ArgAction::SetTrue)]
        trace: bool,

        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        author: Option<String>,

        /// Overwrite an existing target directory
        #[arg(long, action = ArgAction::SetTrue)]
        force: bool,

        /// Skip dependency fetching
        #[arg(long, action = ArgAction::SetTrue)]
        skip_install: bool,

        /// Skip git initialization and the initial commit
        #[arg(long, action = ArgAction::SetTrue)]
        no_git: bool,

        /// Create a private remote repository with the GitHub CLI
        #[arg(long, action = ArgAction::SetTrue)]
        create_remote: bool,
    },

    /// Report availability of external tools and the trace backend
    Doctor,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Over stdio the protocol owns stdout; logs must go to stderr.
    let stdio_serve = match &cli.command {
        Commands::Serve { transport, .. } => {
            transport.as_deref().map(|t| t == "stdio").unwrap_or(true)
        }
        _ => false,
    };
    refserve::utils::logging::init_logger(cli.color, cli.verbose, stdio_serve);

    info!("Refserve MCP server");
    info!("Loading configuration from: {}", cli.config.display());

    let config = if cli.config.exists() {
        Config::load(Some(cli.config.as_path())).context("Failed to load configuration")?
    } else {
        warn!(
            "Config file {} not found, using default configuration",
            cli.config.display()
        );
        Config::load(None).unwrap_or_else(|e| {
            warn!("Falling back to built-in defaults: {}", e);
            Config::default_config()
        })
    };

    match cli.command {
        Commands::Serve {
            transport,
            host,
            port,
        } => {
            cmd_serve(&config, transport, host, port).await?;
        }
        Commands::Scaffold {
            name,
            variant,
            demo_tools,
            secret_tools,
            trace,
            output,
            description,
            author,
            force,
            skip_install,
            no_git,
            create_remote,
        } => {
            cmd_scaffold(
                &config,
                ScaffoldArgs {
                    name,
                    variant,
                    demo_tools,
                    secret_tools,
                    trace,
                    output,
                    description,
                    author,
                    force,
                    skip_install,
                    no_git,
                    create_remote,
                },
            )?;
        }
        Commands::Doctor => {
            cmd_doctor(&config);
        }
    }

    Ok(())
}

async fn cmd_serve(
    config: &Config,
    transport: Option<String>,
    host: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    let transport = transport.unwrap_or_else(|| config.server.transport.clone());
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);

    info!("Starting MCP server (transport: {})", transport);

    let service = RefServeMcp::new(config.clone()).context("Failed to build MCP service")?;

    info!("MCP server ready. Available tools:");
    for name in service.tool_names() {
        info!("  - {}", name);
    }

    let backend = service.cache().backend();
    info!(
        "Trace attribution: {}",
        if backend.is_enabled() {
            "enabled"
        } else {
            "disabled"
        }
    );
    info!("Context propagation: user_id, session_id, metadata");
    info!("Use enable_test_context to simulate different users");

    match transport.as_str() {
        "stdio" => {
            let running = service
                .serve(stdio())
                .await
                .context("Failed to start stdio transport")?;
            running.waiting().await?;
        }
        "sse" => {
            let addr: SocketAddr = format!("{}:{}", host, port)
                .parse()
                .with_context(|| format!("Invalid bind address {}:{}", host, port))?;
            info!("Serving MCP over SSE on {}", addr);

            let ct = SseServer::serve(addr)
                .await
                .context("Failed to start SSE transport")?
                .with_service(move || service.clone());

            tokio::signal::ctrl_c().await?;
            ct.cancel();
        }
        other => {
            anyhow::bail!("Unsupported transport: {} (expected stdio or sse)", other);
        }
    }

    // Make sure span data is on disk before exit.
    flush_traces();
    Ok(())
}

struct ScaffoldArgs {
    name: String,
    variant: Option<TemplateVariant>,
    demo_tools: bool,
    secret_tools: bool,
    trace: bool,
    output: PathBuf,
    description: Option<String>,
    author: Option<String>,
    force: bool,
    skip_install: bool,
    no_git: bool,
    create_remote: bool,
}

fn cmd_scaffold(config: &Config, args: ScaffoldArgs) -> Result<()> {
    let variant = match args.variant {
        Some(variant) => variant,
        None => TemplateVariant::parse(&config.scaffold.default_variant)
            .context("Invalid scaffold.default_variant in configuration")?,
    };

    let project = generate(
        ScaffoldOptions {
            name: args.name,
            output_dir: args.output,
            variant,
            custom: VariantConfig {
                demo_tools: args.demo_tools,
                secret_tools: args.secret_tools,
                trace: args.trace,
            },
            description: args.description,
            author: args.author,
            force: args.force,
            skip_install: args.skip_install,
            no_git: args.no_git,
            create_remote: args.create_remote,
        },
        &config.scaffold,
    )
    .context("Project generation failed")?;

    info!(
        "Generated {} files in {}",
        project.files.len(),
        project.project_dir.display()
    );

    Ok(())
}

fn cmd_doctor(config: &Config) {
    println!("{}", "Refserve doctor".bold());
    println!();

    let tools = [
        ("cargo", "install Rust via https://rustup.rs"),
        ("git", "install git to use version control"),
        ("gh", "install the GitHub CLI to create remote repositories"),
    ];

    for (tool, hint) in tools {
        if command_exists(tool) {
            println!("{}", format_success(&format!("{} available", tool)));
        } else {
            println!(
                "{}",
                format_warning(&format!("{} not found ({})", tool, hint))
            );
        }
    }

    println!();
    let backend = TraceBackend::from_env(config.trace.disabled);
    if backend.is_enabled() {
        println!("{}", format_success("trace attribution enabled"));
    } else {
        println!("{}", format_warning(&backend.status_message()));
    }
    println!("  host: {}", backend.host);
    println!("  public key set: {}", backend.public_key_set);
    println!("  secret key set: {}", backend.secret_key_set);
}
