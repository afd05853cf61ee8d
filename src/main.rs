use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use funcloop::agent::{Conversation, render_system_prompt, weather_query};
use funcloop::llm::{OllamaClient, StdoutSink};
use funcloop::tools::{ToolRegistry, WeatherTool};

mod cli;
mod config;

use cli::Cli;
use cli::commands::Commands;
use config::Config;

fn setup_logging(config: &Config) -> Result<()> {
    let level = config.log_level.as_deref().unwrap_or("info");

    // RUST_LOG takes precedence over the configured level
    env_logger::Builder::new()
        .parse_filters(level)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .try_init()
        .context("Failed to initialize logger")?;

    info!("Logging initialized at level {}", level);
    Ok(())
}

fn build_registry(config: &Config) -> Result<ToolRegistry> {
    let backend = config.weather_backend().context("Failed to configure weather tool")?;
    let registry = ToolRegistry::new().with_tool(Box::new(WeatherTool::new(backend)))?;
    Ok(registry)
}

async fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    let registry = build_registry(config)?;

    match &cli.command {
        Some(Commands::Tools) => {
            println!("{}", serde_json::to_string_pretty(&registry.list())?);
            Ok(())
        }
        Some(Commands::Prompt) => {
            println!("{}", render_system_prompt(&registry)?);
            Ok(())
        }
        None => run_conversation(cli, config, registry).await,
    }
}

async fn run_conversation(cli: &Cli, config: &Config, registry: ToolRegistry) -> Result<()> {
    let llm = Arc::new(OllamaClient::new(config.ollama_config()).context("Failed to create Ollama client")?);

    let mut conversation =
        Conversation::new(llm, Arc::new(registry), config.loop_config()).with_verbose(cli.is_verbose());
    if config.llm.stream {
        conversation = conversation.with_sink(Arc::new(StdoutSink));
    }

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupted, cancelling conversation");
            trigger.cancel();
        }
    });

    let query = cli.query.clone().unwrap_or_else(|| weather_query(&cli.location));
    info!("Query: {}", query);

    let outcome = conversation.run(query, &cancel).await.context("Conversation failed")?;

    if config.llm.stream {
        println!();
    }
    println!("{} {}", "Final response:".green().bold(), outcome.answer);
    info!("Finished after {} turns", outcome.turns);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    cli.apply_overrides(&mut config);

    setup_logging(&config).context("Failed to setup logging")?;

    run_application(&cli, &config).await.context("Application failed")?;

    Ok(())
}
