//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod say;

use std::error::Error;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::cli::say::run_say;
use crate::core::app::App;
use crate::core::attachment::AttachmentEncoder;
use crate::core::config::{Config, Settings, SettingsOverrides};
use crate::core::session::Orchestrator;
use crate::ui::chat_loop::run_chat;
use crate::utils::logging::LoggingState;

/// Exit code for configuration files that cannot be read or parsed.
pub const EXIT_CONFIG_ERROR: i32 = 2;

const LOG_FILTER_VARS: [&str; 2] = ["SENTIMENT_ORACLE_LOG", "RUST_LOG"];
const DEFAULT_TRACE_FILTER: &str = "sentiment_oracle=debug";

#[derive(Parser)]
#[command(name = "sentiment-oracle")]
#[command(about = "A terminal chat that reads the sentiment behind text, images and documents")]
#[command(
    long_about = "Sentiment Oracle is a full-screen terminal chat backed by Gemini. Every reply \
carries a sentiment reading (positive, negative or neutral) with a confidence gauge, and an \
optional DeepSeek advisor offers a second opinion on text.\n\n\
Environment Variables:\n\
  GEMINI_API_KEY         Gemini API key (API_KEY is used as a fallback)\n\
  DEEPSEEK_API_KEY       DeepSeek API key (optional, enables the advisor)\n\
  SENTIMENT_ORACLE_LOG   Diagnostic log filter (falls back to RUST_LOG)\n\n\
Controls:\n\
  Enter                  Send the message\n\
  Alt+Enter              New line\n\
  Ctrl+L                 Clear the conversation\n\
  Up/Down/PgUp/PgDn      Scroll through the transcript\n\
  Ctrl+C                 Quit the application\n\n\
Commands:\n\
  /attach <path>         Stage an image, PDF or text file\n\
  /detach                Drop the staged file\n\
  /clear                 Start over\n\
  /log [file]            Enable, pause or resume transcript logging\n\
  /help                  Show commands and keys"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Append the transcript to this file
    #[arg(short = 'l', long, global = true)]
    pub log: Option<String>,

    /// Write diagnostic logs to this file
    #[arg(long, global = true, value_name = "FILE")]
    pub trace_file: Option<PathBuf>,

    /// Gemini model for this run
    #[arg(long, global = true, value_name = "MODEL")]
    pub primary_model: Option<String>,

    /// DeepSeek model for this run
    #[arg(long, global = true, value_name = "MODEL")]
    pub secondary_model: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat,
    /// Send one message and print the reply
    Say {
        /// File to attach (image, PDF or plain text)
        #[arg(short = 'a', long, value_name = "PATH")]
        attach: Option<PathBuf>,
        /// Print the reply message as JSON
        #[arg(long)]
        json: bool,
        /// Message text
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },
    /// Show or edit the configuration file
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration (default)
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key to set
        key: String,
        /// Value to set for the key
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        value: Vec<String>,
    },
    /// Restore a configuration value to its default
    Unset {
        /// Configuration key to unset
        key: String,
    },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

fn env_filter(trace_file: Option<&Path>) -> Option<EnvFilter> {
    let from_env = LOG_FILTER_VARS
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|value| !value.trim().is_empty());

    match (from_env, trace_file) {
        (Some(filter), _) => Some(EnvFilter::new(filter)),
        (None, Some(_)) => Some(EnvFilter::new(DEFAULT_TRACE_FILTER)),
        (None, None) => None,
    }
}

/// Install the diagnostic subscriber. The chat view owns the terminal, so
/// without a trace file it only logs when `allow_stderr` is set.
fn init_tracing(trace_file: Option<&Path>, allow_stderr: bool) -> Result<(), Box<dyn Error>> {
    let Some(filter) = env_filter(trace_file) else {
        return Ok(());
    };

    let installed = match trace_file {
        Some(path) => {
            let file = File::create(path)?;
            tracing_subscriber::fmt()
                .with_writer(Mutex::new(file))
                .with_env_filter(filter)
                .with_ansi(false)
                .try_init()
        }
        None if allow_stderr => tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .try_init(),
        None => return Ok(()),
    };

    installed.map_err(|e| e.to_string().into())
}

fn load_config() -> Config {
    match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {e}");
            std::process::exit(EXIT_CONFIG_ERROR);
        }
    }
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let overrides = SettingsOverrides {
        primary_model: args.primary_model,
        secondary_model: args.secondary_model,
    };

    match args.command.unwrap_or(Commands::Chat) {
        Commands::Chat => {
            init_tracing(args.trace_file.as_deref(), false)?;
            let config = load_config();
            let settings = Settings::from_process_env(&config, &overrides);
            debug!(?settings, "starting chat");

            let orchestrator = Orchestrator::from_settings(&settings)?;
            let logging = LoggingState::new(args.log.map(PathBuf::from))?;
            let app = App::new(
                Arc::new(orchestrator),
                AttachmentEncoder::new(settings.max_attachment_bytes),
                logging,
                settings.primary.model.clone(),
            );
            run_chat(app).await
        }
        Commands::Say { attach, json, text } => {
            init_tracing(args.trace_file.as_deref(), true)?;
            let config = load_config();
            let settings = Settings::from_process_env(&config, &overrides);
            debug!(?settings, "running say");

            let code = run_say(text, attach, json, &settings, args.log).await?;
            if code != say::EXIT_RESOLVED {
                std::process::exit(code);
            }
            Ok(())
        }
        Commands::Config { action } => {
            let mut config = load_config();
            match action.unwrap_or(ConfigAction::Show) {
                ConfigAction::Show => {
                    if let Ok(path) = Config::get_config_path() {
                        println!("Config file: {}", path.display());
                    }
                    config.print_all(|name| std::env::var(name).ok());
                }
                ConfigAction::Set { key, value } => {
                    let value = value.join(" ");
                    if let Err(e) = config.set_value(&key, &value) {
                        eprintln!("❌ {e}");
                        std::process::exit(1);
                    }
                    config.save()?;
                    println!("✅ Set {key} to: {value}");
                }
                ConfigAction::Unset { key } => {
                    if let Err(e) = config.unset_value(&key) {
                        eprintln!("❌ {e}");
                        std::process::exit(1);
                    }
                    config.save()?;
                    println!("✅ Unset {key}");
                }
            }
            Ok(())
        }
    }
}
