use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wingman_cli::backend::HttpBackend;
use wingman_cli::commands::Wingman;
use wingman_cli::config::Config;
use wingman_cli::credentials::{CredentialResolver, SetupFlow};
use wingman_cli::editor::FileEditor;
use wingman_cli::interaction::TerminalInteraction;
use wingman_cli::presenter::TerminalPresenter;
use wingman_cli::runner::CodeRunner;
use wingman_cli::secrets::FileSecretStore;
use wingman_cli::status::StatusIndicator;

#[derive(Parser)]
#[command(name = "wingman")]
#[command(author, version, about = "Wingman - your personal AI debugger", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk through the selected code step by step
    Ask {
        /// Source file to explain
        file: PathBuf,

        /// First line of the selection (1-indexed)
        #[arg(long)]
        from: Option<usize>,

        /// Last line of the selection (inclusive)
        #[arg(long)]
        to: Option<usize>,
    },

    /// Generate test cases for the selected code
    Testcases {
        /// Source file to generate tests for
        file: PathBuf,

        /// First line of the selection (1-indexed)
        #[arg(long)]
        from: Option<usize>,

        /// Last line of the selection (inclusive)
        #[arg(long)]
        to: Option<usize>,
    },

    /// Run the file and explain any error it produces
    Explain {
        /// Source file to run (.py or .cpp)
        file: PathBuf,
    },

    /// Run the file and suggest a fix for a described problem
    Fix {
        /// Source file to run (.py or .cpp)
        file: PathBuf,
    },

    /// Choose the LLM provider
    SetProvider,

    /// Choose the model for the current provider
    SetModel,

    /// Store the API key for the current provider
    SetApiKey,

    /// Delete all stored configuration
    Reset,
}

fn selection_range(from: Option<usize>, to: Option<usize>) -> Option<(usize, usize)> {
    match (from, to) {
        (Some(from), Some(to)) => Some((from, to)),
        (Some(from), None) => Some((from, usize::MAX)),
        _ => None,
    }
}

fn build_wingman(config: &Config, file: Option<PathBuf>, range: Option<(usize, usize)>) -> Result<Wingman> {
    let store = Arc::new(FileSecretStore::open_default()?);
    let interaction = Arc::new(TerminalInteraction::new());
    let setup = Arc::new(SetupFlow::new(store.clone(), interaction.clone()));

    let resolver = CredentialResolver::new(
        store,
        setup.clone(),
        config.resolver.attempts,
        Duration::from_millis(config.resolver.retry_delay_ms),
    );
    let runner = CodeRunner::new(
        Duration::from_secs(config.runner.timeout_secs),
        interaction.clone(),
    );

    // Without a file argument there is no active document; the handlers
    // report that themselves.
    let editor = Arc::new(FileEditor::new(
        file.unwrap_or_else(|| PathBuf::from("")),
        range,
    ));

    Ok(Wingman::new(
        StatusIndicator::new(),
        editor,
        interaction,
        Arc::new(TerminalPresenter::new()),
        resolver,
        runner,
        Arc::new(HttpBackend::new(config.backend.base_url.clone())),
        setup,
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "wingman_cli=debug"
    } else {
        "wingman_cli=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::load()?;

    match cli.command {
        Commands::Ask { file, from, to } => {
            let wingman = build_wingman(&config, Some(file), selection_range(from, to))?;
            wingman.ask().await;
        }
        Commands::Testcases { file, from, to } => {
            let wingman = build_wingman(&config, Some(file), selection_range(from, to))?;
            wingman.generate_testcases().await;
        }
        Commands::Explain { file } => {
            let wingman = build_wingman(&config, Some(file), None)?;
            wingman.explain_errors().await;
        }
        Commands::Fix { file } => {
            let wingman = build_wingman(&config, Some(file), None)?;
            wingman.suggest_fixes().await;
        }
        Commands::SetProvider => {
            build_wingman(&config, None, None)?.set_provider().await;
        }
        Commands::SetModel => {
            build_wingman(&config, None, None)?.set_model().await;
        }
        Commands::SetApiKey => {
            build_wingman(&config, None, None)?.set_api_key().await;
        }
        Commands::Reset => {
            build_wingman(&config, None, None)?.reset().await;
        }
    }

    Ok(())
}
