//! toolbridge - tool-execution bridge for conversational agents

mod config;
mod gateway;
mod logger;
mod providers;
mod tools;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use providers::NoExternalTools;
use tools::{SimulationInput, SimulationTool, ToolRegistry};

#[derive(Parser, Debug)]
#[command(name = "toolbridge")]
#[command(about = "Schemas and dispatch for agent-callable tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[arg(short, long, global = true)]
    debug: bool,
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a default config file
    Onboard {
        #[arg(long)]
        force: bool,
    },
    /// Show configuration and tool status
    Status,
    /// Print tool definitions as JSON
    Tools,
    /// Invoke one tool and print its result as JSON
    Call {
        name: String,
        /// Tool arguments as a JSON object
        #[arg(short, long, default_value = "{}")]
        args: String,
        /// Print the text handed back to the model instead of JSON
        #[arg(long)]
        text: bool,
    },
    /// Run the campaign simulation directly
    Simulate {
        #[arg(long)]
        budget: f64,
        #[arg(long, value_delimiter = ',')]
        channels: Vec<String>,
        #[arg(long, default_value = "none")]
        promotion_type: String,
        #[arg(long, default_value = "")]
        campaign_name: String,
        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Serve tool definitions and calls over HTTP
    Gateway,
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_level = if cli.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    logger::init(log_level, cli.log_json)?;

    match cli.command {
        Commands::Onboard { force } => onboard(force),
        Commands::Status => status_cmd(),
        Commands::Tools => tools_cmd(),
        Commands::Call { name, args, text } => call_cmd(&name, &args, text),
        Commands::Simulate {
            budget,
            channels,
            promotion_type,
            campaign_name,
            seed,
        } => simulate_cmd(
            SimulationInput {
                campaign_name,
                budget,
                channels,
                promotion_type,
            },
            seed,
        ),
        Commands::Gateway => gateway_cmd(),
        Commands::Version => {
            println!("toolbridge {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn load_registry() -> Result<(config::Config, ToolRegistry)> {
    let config_path = config::get_config_path()?;
    let config = config::load_config(&config_path)?;
    let registry = ToolRegistry::with_web_config(&config.tools.web, Arc::new(NoExternalTools));
    Ok((config, registry))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn onboard(force: bool) -> Result<()> {
    let config_path = config::get_config_path()?;

    if config_path.exists() && !force {
        println!(
            "Config already exists at {}. Re-run with --force to overwrite.",
            config_path.display()
        );
        return Ok(());
    }

    config::save_config(&config_path, &config::Config::default())?;

    println!("✓ Config written to {}", config_path.display());
    println!("\nNext steps:");
    println!("  1. Set SERPAPI_KEY (or tools.web.serpapi.apiKey) to enable live search");
    println!("  2. List tools: toolbridge tools");
    Ok(())
}

fn status_cmd() -> Result<()> {
    let config_path = config::get_config_path()?;
    let (config, registry) = load_registry()?;

    println!("toolbridge Status");
    println!("Version: {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!(
        "Config: {} {}",
        config_path.display(),
        if config_path.exists() { "✓" } else { "(defaults)" }
    );
    println!(
        "SerpAPI key: {}",
        if config.tools.web.serpapi.credential().is_some() {
            "✓"
        } else {
            "not set (search falls back to plain links)"
        }
    );
    println!("SerpAPI endpoint: {}", config.tools.web.serpapi.base_url);
    println!(
        "Gateway: {}:{}",
        config.gateway.host, config.gateway.port
    );
    println!(
        "Tools: {} local ({})",
        registry.len(),
        registry.list_names().join(", ")
    );
    Ok(())
}

fn tools_cmd() -> Result<()> {
    let (_, registry) = load_registry()?;
    let runtime = tokio::runtime::Runtime::new()?;
    let defs = runtime.block_on(registry.get_tool_definitions())?;
    print_json(&defs)
}

fn call_cmd(name: &str, raw_args: &str, text: bool) -> Result<()> {
    let args: HashMap<String, Value> =
        serde_json::from_str(raw_args).context("--args must be a JSON object")?;
    let (_, registry) = load_registry()?;
    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(registry.execute(name, &args));
    if text {
        println!("{}", result.to_llm_text());
        return Ok(());
    }
    print_json(&result)
}

fn simulate_cmd(input: SimulationInput, seed: Option<u64>) -> Result<()> {
    let tool = match seed {
        Some(seed) => SimulationTool::with_seed(seed),
        None => SimulationTool::new(),
    };
    print_json(&tool.run(&input))
}

fn gateway_cmd() -> Result<()> {
    let (config, registry) = load_registry()?;
    let registry = Arc::new(registry);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        let server =
            gateway::GatewayServer::new(&config.gateway.host, config.gateway.port, registry);
        let addr = server.start().await?;
        println!("✓ Gateway started on http://{}", addr);
        println!("  GET  /tools        tool definitions");
        println!("  POST /tools/call   {{\"name\", \"arguments\"}}");
        println!("  POST /tools/batch  {{\"calls\": [...]}}");
        println!("Press Ctrl+C to stop");

        tokio::signal::ctrl_c().await?;
        println!("\nShutting down...");
        server.stop().await?;
        println!("✓ Gateway stopped");
        Ok::<(), anyhow::Error>(())
    })?;

    Ok(())
}
