use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use mcp_tool_bridge::{
    adapters::stdio::{StdioOptions, build_servers},
    app::catalog::ToolCatalog,
    domain::server::{ToolServer, ToolServerConfig},
    infra::{
        config::{AgentProfile, AppConfig},
        metrics,
    },
    shared::utils::parse_command,
};
use std::{path::PathBuf, sync::Arc};
use tracing_subscriber::{EnvFilter, fmt};

/// Expose the tools of MCP servers as strict function tools.
#[derive(Debug, Parser)]
#[command(name = "mcp-tool-bridge", version)]
struct Cli {
    /// Agent profile JSON carrying `mcpServers` and `secrets`.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Stdio server command line, e.g. "npx @playwright/mcp@latest". Repeatable.
    #[arg(long = "stdio", value_name = "CMD ARGS")]
    stdio: Vec<String>,
    /// Convert input schemas to strict form.
    #[arg(long, conflicts_with = "lax")]
    strict: bool,
    /// Keep input schemas as advertised.
    #[arg(long)]
    lax: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the function definitions of every discovered tool.
    List,
    /// Invoke one tool and print its observation.
    Call {
        tool: String,
        /// Arguments as a JSON object; empty means none.
        #[arg(default_value = "")]
        args: String,
    },
    /// Run discovery and print Prometheus metrics.
    Metrics,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // stdout carries results only
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load()?;
    let strict = if cli.strict {
        true
    } else if cli.lax {
        false
    } else {
        config.strict_schemas()
    };
    let options = StdioOptions {
        cache_tools_list: config.cache_tools_list(),
        handshake_timeout: config.handshake_timeout(),
    };

    let servers = build_servers(&server_configs(&cli, &config)?, &options);
    let handles: Vec<Arc<dyn ToolServer>> = servers
        .iter()
        .map(|server| server.clone() as Arc<dyn ToolServer>)
        .collect();
    let catalog = ToolCatalog::collect(&handles, strict).await;

    let outcome = run(cli.command, &catalog).await;
    for server in &servers {
        server.shutdown().await;
    }
    outcome
}

fn server_configs(cli: &Cli, config: &AppConfig) -> Result<Vec<ToolServerConfig>> {
    let mut configs = Vec::new();
    if let Some(path) = cli.config.clone().or_else(|| config.agent_profile_path()) {
        let profile = AgentProfile::from_file(&path)?;
        configs.extend(
            profile
                .server_configs()
                .with_context(|| format!("agent profile {}", path.display()))?,
        );
    }
    for (index, line) in cli.stdio.iter().enumerate() {
        let (program, args) = parse_command(line)?;
        configs.push(ToolServerConfig::new(
            program,
            args,
            format!("stdio-{}", index + 1),
        ));
    }
    if configs.is_empty() {
        bail!("no tool servers configured; pass --config FILE or --stdio \"CMD ARGS\"");
    }
    Ok(configs)
}

async fn run(command: Command, catalog: &ToolCatalog) -> Result<()> {
    match command {
        Command::List => {
            ensure_discovered(catalog)?;
            println!("{}", serde_json::to_string_pretty(&catalog.listing())?);
        }
        Command::Call { tool, args } => {
            ensure_discovered(catalog)?;
            let function = catalog
                .find(&tool)
                .ok_or_else(|| anyhow!("tool '{tool}' not found"))?;
            println!("{}", function.invoke(&args).await);
        }
        Command::Metrics => {
            for failure in catalog.failures() {
                eprintln!("{failure}");
            }
            print!("{}", metrics::render()?);
        }
    }
    Ok(())
}

/// Fails when no server produced tools and at least one listing failed.
fn ensure_discovered(catalog: &ToolCatalog) -> Result<()> {
    if !catalog.is_empty() || catalog.failures().is_empty() {
        return Ok(());
    }
    let reasons: Vec<String> = catalog.failures().iter().map(ToString::to_string).collect();
    Err(anyhow!(reasons.join("; ")))
}
