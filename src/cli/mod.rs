//! CLI module for Switchyard
//!
//! Inspection commands over the configured providers:
//! - `classify`: infer the task type of a prompt
//! - `route`: show the routing decision for a prompt
//! - `chain`: show the fallback chain behind a primary provider
//! - `detect`: probe local model runtimes
//! - `health`: probe a provider endpoint
//! - `config`: print the effective configuration (keys redacted)

use crate::config::{load_config, AppConfig};
use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

pub mod probe;
pub mod route;

/// Budget-aware LLM provider routing
#[derive(Parser, Debug)]
#[command(name = "switchyard")]
#[command(about = "Budget-aware LLM routing with cascading fallback")]
#[command(version)]
pub struct Cli {
    /// Extra configuration file layered over config/
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Infer the task type of a prompt
    Classify {
        /// Prompt text
        prompt: String,
    },
    /// Show where a prompt would be routed
    Route {
        /// Prompt text
        prompt: String,
        /// Task type instead of classifying the prompt
        #[arg(long)]
        task: Option<String>,
        /// Force a provider
        #[arg(long)]
        provider: Option<String>,
        /// cost_optimized or quality_optimized
        #[arg(long)]
        strategy: Option<String>,
    },
    /// Show the fallback chain behind a primary provider
    Chain {
        /// Primary provider
        primary: String,
        /// Probe local runtimes and add their models
        #[arg(long)]
        detect: bool,
    },
    /// Probe local model runtimes
    Detect,
    /// Probe a provider endpoint
    Health {
        /// Provider identifier
        provider: String,
        /// URL to probe instead of the well-known one
        #[arg(long)]
        base_url: Option<String>,
    },
    /// Print the effective configuration
    Config,
}

/// Output settings shared by the commands
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub json: bool,
}

impl Output {
    /// Print `value` as pretty JSON, or the text rendering otherwise
    pub fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce() -> String) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            println!("{}", text());
        }
        Ok(())
    }
}

/// Run the CLI command
pub async fn run(cli: Cli) -> Result<()> {
    let out = Output { json: cli.json };

    let Some(command) = cli.command else {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        cmd.print_help()?;
        println!();
        return Ok(());
    };

    let path = cli.config.as_deref();

    match command {
        Commands::Classify { prompt } => route::classify(out, &prompt),
        Commands::Route {
            prompt,
            task,
            provider,
            strategy,
        } => route::route(
            out,
            &load_config(path)?,
            &prompt,
            task.as_deref(),
            provider.as_deref(),
            strategy.as_deref(),
        ),
        Commands::Chain { primary, detect } => {
            route::chain(out, &load_config(path)?, &primary, detect).await
        }
        Commands::Detect => probe::detect(out, &load_config(path)?).await,
        Commands::Health { provider, base_url } => {
            probe::health(out, &load_config(path)?, &provider, base_url.as_deref()).await
        }
        Commands::Config => show_config(out, &load_config(path)?),
    }
}

fn show_config(out: Output, config: &AppConfig) -> Result<()> {
    let redacted = config.redacted();
    if out.json {
        println!("{}", serde_json::to_string_pretty(&redacted)?);
    } else {
        println!("{}", toml::to_string_pretty(&redacted)?);
    }
    Ok(())
}
