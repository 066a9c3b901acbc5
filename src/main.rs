//! frage - ask a local Ollama model questions from the terminal.
//!
//! Reads questions line by line, sends each one to the model with an
//! instruction to answer in JSON, and prints the reply pretty-printed when it
//! is valid JSON.

mod config;
mod error;
mod llm;
mod repl;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::Config;
use llm::ollama::OllamaFactory;
use std::process::Command as ProcessCommand;
use tokio::io::BufReader;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "frage")]
#[command(author, version, about = "Ask a local Ollama model questions from the terminal")]
#[command(long_about = "Ask a local Ollama model questions from the terminal.\n\nWithout a QUESTION an interactive session starts; type 'exit' or 'quit' to leave.")]
struct Cli {
    /// Ask a single question and exit
    #[arg(value_name = "QUESTION")]
    question: Option<String>,

    /// Override the model name
    #[arg(short = 'm', long, value_name = "MODEL")]
    model: Option<String>,

    /// Override the Ollama host URL
    #[arg(long, value_name = "URL")]
    host: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the effective configuration, or edit the file with --edit
    Config {
        /// Open the config file in $VISUAL / $EDITOR, creating it if missing
        #[arg(long)]
        edit: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    // Editing must work even when the current file does not parse.
    if let Some(Commands::Config { edit: true }) = cli.command {
        return edit_config();
    }

    let config = Config::load()
        .context("Failed to load configuration")?
        .with_overrides(cli.model, cli.host);

    match cli.command {
        Some(Commands::Config { .. }) => show_config(&config),
        None => handle_questions(cli.question, config).await,
    }
}

/// Log to stderr. `RUST_LOG` takes precedence over the error-only default.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("frage=error,reqwest=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Answer a single question, or run the interactive loop.
async fn handle_questions(question: Option<String>, config: Config) -> Result<()> {
    debug!("Using model {} at {}", config.model, config.host);

    let factory = OllamaFactory::from_config(&config);
    let mut stdout = std::io::stdout();

    match question {
        Some(question) => repl::answer_once(&mut stdout, &factory, &config.model, &question).await,
        None => {
            let stdin = BufReader::new(tokio::io::stdin());
            repl::run(stdin, &mut stdout, &factory, &config.model).await
        }
    }
}

/// Print where the config lives and the values a question would use.
fn show_config(config: &Config) -> Result<()> {
    let path = Config::config_path()?;
    if path.exists() {
        println!("# {}", path.display());
    } else {
        println!("# {} (not created yet; defaults shown)", path.display());
    }
    print!("{}", config.to_toml()?);
    Ok(())
}

/// Open the config file in the user's editor, writing defaults first if needed.
fn edit_config() -> Result<()> {
    let path = Config::config_path()?;
    if !path.exists() {
        Config::default().save_to(&path)?;
        eprintln!("Created default config at {}", path.display());
    }

    let (program, args) = config::editor_command(
        std::env::var("VISUAL").ok().as_deref(),
        std::env::var("EDITOR").ok().as_deref(),
    );
    let status = ProcessCommand::new(&program)
        .args(&args)
        .arg(&path)
        .status()
        .with_context(|| format!("Failed to launch editor: {}", program))?;

    if !status.success() {
        anyhow::bail!("Editor {} exited with {}", program, status);
    }
    Ok(())
}
