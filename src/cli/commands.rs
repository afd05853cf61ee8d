//! CLI command definitions using clap.
//!
//! With no subcommand the tool loop runs against the configured model.
//! - tools: print the tool enumeration sent to the model
//! - prompt: print the rendered system prompt

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;

/// Funcloop - prompt-driven tool calling against an Ollama model
#[derive(Parser, Debug)]
#[command(name = "funcloop")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Model name
    #[arg(short, long)]
    pub model: Option<String>,

    /// Ollama server URL
    #[arg(short, long)]
    pub url: Option<String>,

    /// Location for the default weather question
    #[arg(short, long, default_value = "Beijing")]
    pub location: String,

    /// Question to ask instead of the weather question
    #[arg(short, long)]
    pub query: Option<String>,

    /// Retry budget for the conversation
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Sampling temperature
    #[arg(short, long)]
    pub temperature: Option<f32>,

    /// Stream model output to stdout as it is generated
    #[arg(short, long)]
    pub stream: bool,

    /// Log request and response bodies
    #[arg(short, long)]
    pub wirelog: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Layer command line flags over the loaded configuration
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(model) = &self.model {
            config.llm.model = model.clone();
        }
        if let Some(url) = &self.url {
            config.llm.url = url.clone();
        }
        if let Some(max_retries) = self.max_retries {
            config.agent.max_retries = max_retries;
        }
        if let Some(temperature) = self.temperature {
            config.llm.temperature = Some(temperature);
        }
        if self.stream {
            config.llm.stream = true;
        }
        if self.wirelog {
            config.llm.wirelog = true;
        }
        if self.verbose {
            config.log_level = Some("debug".to_string());
        }
    }
}

/// Main subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Print the registered tools as JSON
    Tools,

    /// Print the system prompt sent to the model
    Prompt,
}
