use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use goal_breaker::config::{Config, LlmProvider};
use goal_breaker::decomposition::GoalDecomposer;
use goal_breaker::llm;
use goal_breaker::persistence::GoalStore;
use goal_breaker::server;
use goal_breaker::server::types::validate_goal_text;

#[derive(Parser)]
#[command(name = "goal-breaker")]
#[command(about = "Break vague goals into five actionable steps with AI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Address to bind (overrides config)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Break down a single goal and print the result as JSON
    Breakdown {
        /// The goal to break down
        goal: String,
    },
    /// Configure goal-breaker
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
        /// Set provider (gemini, openai, ollama)
        #[arg(long)]
        provider: Option<LlmProvider>,
        /// Set API key
        #[arg(long)]
        api_key: Option<String>,
        /// Set model
        #[arg(long)]
        model: Option<String>,
    },
    /// Drop all stored goals and recreate the database schema
    ResetDb,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "goal_breaker=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { host, port } => {
            let mut config = Config::load()?;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            server::start_server(config).await?;
        }
        Commands::Breakdown { goal } => {
            run_breakdown(&goal).await?;
        }
        Commands::Config {
            show,
            provider,
            api_key,
            model,
        } => {
            handle_config(show, provider, api_key, model)?;
        }
        Commands::ResetDb => {
            reset_db().await?;
        }
    }

    Ok(())
}

async fn run_breakdown(goal: &str) -> Result<()> {
    validate_goal_text(goal).map_err(|e| anyhow::anyhow!(e))?;

    let config = Config::load()?;
    let client = llm::create_client(&config)?;
    let decomposer = GoalDecomposer::new(client, Duration::from_secs(config.llm.timeout_secs));

    let breakdown = match decomposer.try_decompose(goal).await {
        Ok(breakdown) => breakdown,
        Err(e) => {
            eprintln!("Warning: {} (showing the generic fallback plan)", e);
            goal_breaker::decomposition::GoalBreakdown::fallback()
        }
    };

    println!("{}", serde_json::to_string_pretty(&breakdown)?);
    Ok(())
}

fn handle_config(
    show: bool,
    provider: Option<LlmProvider>,
    api_key: Option<String>,
    model: Option<String>,
) -> Result<()> {
    let mut config = Config::load()?;
    let mut changed = false;

    if let Some(provider) = provider {
        config.set_provider(provider);
        println!("Provider set to {:?} (model {})", provider, config.llm.model);
        changed = true;
    }

    if let Some(key) = api_key {
        config.llm.api_key = Some(key);
        println!("API key updated");
        changed = true;
    }

    if let Some(m) = model {
        config.llm.model = m.clone();
        println!("Model set to: {}", m);
        changed = true;
    }

    if changed {
        config.save()?;
        println!("Configuration saved to {}", Config::config_path()?.display());
    }

    if show || !changed {
        let mut shown = config.clone();
        if shown.llm.api_key.is_some() {
            shown.llm.api_key = Some("********".to_string());
        }
        println!("Current configuration:");
        println!("{}", toml::to_string_pretty(&shown)?);
    }

    Ok(())
}

async fn reset_db() -> Result<()> {
    let config = Config::load()?;
    let store = GoalStore::open(&config.database)
        .await
        .context("Failed to open goal database")?;

    println!("Dropping all tables...");
    store.reset().await?;
    println!("Database reset complete. Tables recreated with the current schema.");

    Ok(())
}
