// file: src/scaffold/files.rs
// description: built-in file templates for generated server projects
// reference: rendered through the template engine, one entry per output file

/// One output file of a generated project. `requires` names a variant
/// flag; when unset the file is omitted entirely.
pub struct TemplateFile {
    pub path: &'static str,
    pub contents: &'static str,
    pub requires: Option<&'static str>,
}

pub fn project_files() -> Vec<TemplateFile> {
    vec![
        TemplateFile {
            path: "Cargo.toml",
            contents: CARGO_TOML,
            requires: None,
        },
        TemplateFile {
            path: "src/main.rs",
            contents: MAIN_RS,
            requires: None,
        },
        TemplateFile {
            path: "config/default.toml",
            contents: CONFIG_TOML,
            requires: None,
        },
        TemplateFile {
            path: "README.md",
            contents: README_MD,
            requires: None,
        },
        TemplateFile {
            path: ".gitignore",
            contents: GITIGNORE,
            requires: None,
        },
        TemplateFile {
            path: ".env.example",
            contents: ENV_EXAMPLE,
            requires: Some("trace"),
        },
    ]
}

const CARGO_TOML: &str = r##"[package]
name = "{{project_slug}}"
version = "0.1.0"
authors = ["{{author}}"]
edition = "2024"
description = "{{description}}"

[dependencies]
anyhow = "1.0"
clap = { version = "4.5", features = ["derive", "env"] }
refserve = "0.1"
rmcp = { version = "0.4", features = ["transport-sse-server"] }
tokio = { version = "1", features = ["full"] }
tracing = "0.1"
"##;

const MAIN_RS: &str = r##"// {{project_name}} - {{description}}

use anyhow::{Context, Result};
use clap::Parser;
use refserve::{Config, RefServeMcp};
use rmcp::ServiceExt;
use rmcp::transport::sse_server::SseServer;
use rmcp::transport::stdio;
use tracing::info;

#[derive(Parser)]
#[command(name = "{{project_slug}}")]
#[command(about = "{{description}}", long_about = None)]
struct Cli {
    /// Transport mode: stdio (Claude Desktop / Zed) or sse (web clients)
    #[arg(long, default_value = "stdio")]
    transport: String,

    /// Host for the sse transport
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port for the sse transport
    #[arg(long, default_value_t = 8000)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    refserve::utils::logging::init_logger(true, false, cli.transport == "stdio");

    let mut config = Config::load(None).unwrap_or_else(|_| Config::default_config());
    config.server.name = "{{project_slug}}".to_string();
{{#if trace}}
    info!("Trace attribution: set LANGFUSE_PUBLIC_KEY / LANGFUSE_SECRET_KEY to enable");
{{/if}}
{{#if demo_tools}}
    info!("Demo tools enabled: hello, generate_items");
{{/if}}
{{#if secret_tools}}
    info!("Secret tools enabled: store_secret, compute_with_secret");
{{/if}}

    let service = RefServeMcp::new(config).context("Failed to build MCP service")?;

    match cli.transport.as_str() {
        "stdio" => {
            let running = service.serve(stdio()).await?;
            running.waiting().await?;
        }
        "sse" => {
            let addr = format!("{}:{}", cli.host, cli.port).parse()?;
            info!("Serving MCP over SSE on {}", addr);
            let ct = SseServer::serve(addr)
                .await?
                .with_service(move || service.clone());
            tokio::signal::ctrl_c().await?;
            ct.cancel();
        }
        other => anyhow::bail!("Unsupported transport: {}", other),
    }

    refserve::trace::flush_traces();
    Ok(())
}
"##;

const CONFIG_TOML: &str = r##"[server]
name = "{{project_slug}}"
transport = "stdio"
host = "127.0.0.1"
port = 8000

[cache]
default_ttl_secs = 3600
preview_max_size = 64
preview_strategy = "sample"
public_namespace = "public"

[trace]
{{#if trace}}
disabled = false
{{/if}}
{{#if no_trace}}
disabled = true
{{/if}}
tags = ["{{project_slug}}"]

[scaffold]
default_variant = "standard"
default_author = "{{author}}"
critical_fetch = true
critical_git_init = true
"##;

const README_MD: &str = r##"# {{project_name}}

{{description}}

Generated with the refserve {{variant}} variant.

## Running

```bash
cargo run -- --transport stdio
cargo run -- --transport sse --port 8000
```

## Claude Desktop

Add to your `claude_desktop_config.json`:

```json
{
    "mcpServers": {
        "{{project_slug}}": {
            "command": "cargo",
            "args": ["run", "--quiet", "--"]
        }
    }
}
```
{{#if trace}}

## Trace attribution

Set the backend credentials before starting the server:

```bash
export LANGFUSE_PUBLIC_KEY="pk-lf-..."
export LANGFUSE_SECRET_KEY="sk-lf-..."
```

Use the `enable_test_context` and `set_test_context` tools to simulate
different users and sessions.
{{/if}}
{{#if demo_tools}}

## Demo tools

- `hello` greets by name.
- `generate_items` produces a list; large results come back as a
  `ref_id` plus preview. Walk them with `get_cached_result`.
{{/if}}
{{#if secret_tools}}

## Private computation

- `store_secret` keeps a value agents can use but never read.
- `compute_with_secret` runs the computation server-side.
{{/if}}
"##;

const GITIGNORE: &str = r##"/target
.env
"##;

const ENV_EXAMPLE: &str = r##"# Trace attribution backend ({{project_name}})
LANGFUSE_PUBLIC_KEY=pk-lf-...
LANGFUSE_SECRET_KEY=sk-lf-...
LANGFUSE_HOST=https://cloud.langfuse.com
"##;
