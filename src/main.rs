// AI Text Detector CLI
// serve / train / predict / interactive / config

use ai_text_detector_lib::api::{self, AppState};
use ai_text_detector_lib::services::{
    analyze, run_menu, AiTextDetector, AppConfig, ConfigStore, MenuOptions,
};
use ai_text_detector_lib::{init_logging, mark_process_start, startup_elapsed_ms};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

/// Detect whether text was written by a human or generated by an AI model
#[derive(Parser, Debug)]
#[command(name = "ai-text-detector", version)]
#[command(after_help = "\
Examples:
  ai-text-detector                          Start the HTTP API (same as `serve`)
  ai-text-detector train --data data.csv    Train and save a model
  ai-text-detector predict \"some text\"      Classify one text
  ai-text-detector interactive              Operator menu")]
struct Cli {
    /// Config file (default: <config dir>/ai-text-detector/config.json)
    #[arg(long, global = true, env = "AITD_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the HTTP API
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
        #[arg(long)]
        model_dir: Option<PathBuf>,
    },

    /// Train on a labeled CSV (`text`, `generated`) and save the model
    Train {
        #[arg(long)]
        data: Option<PathBuf>,
        #[arg(long)]
        model_dir: Option<PathBuf>,
        /// Fraction held out for evaluation
        #[arg(long)]
        test_size: Option<f64>,
    },

    /// Classify a single text with a saved model
    Predict {
        text: String,
        #[arg(long)]
        model_dir: Option<PathBuf>,
        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Text menu: train, predict, exit
    Interactive {
        #[arg(long)]
        data: Option<PathBuf>,
        #[arg(long)]
        model_dir: Option<PathBuf>,
    },

    /// Inspect or create the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write a config file with default values
    Init {
        /// Overwrite an existing file (the old one is backed up)
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    mark_process_start();
    let cli = Cli::parse();

    let command = cli.command.unwrap_or(Commands::Serve {
        host: None,
        port: None,
        model_dir: None,
    });

    // Long-running commands log at info; one-shot commands keep the terminal quiet
    let level = match command {
        Commands::Serve { .. } | Commands::Train { .. } => "info",
        _ => "warn",
    };
    init_logging(level);
    info!(startup_ms = startup_elapsed_ms(), "logging.initialized");

    let store = match cli.config {
        Some(path) => ConfigStore::from_file(path),
        None => ConfigStore::open_default(),
    };
    let mut config = store.load().context("Failed to load config")?;
    config
        .apply_env_overrides()
        .context("Invalid environment override")?;

    match command {
        Commands::Serve {
            host,
            port,
            model_dir,
        } => {
            let host = host.unwrap_or(config.server.host);
            let port = port.unwrap_or(config.server.port);
            let model_dir = model_dir.unwrap_or(config.model_dir);
            run_server(host, port, model_dir)
        }
        Commands::Train {
            data,
            model_dir,
            test_size,
        } => {
            let data = data.unwrap_or(config.data_path);
            let model_dir = model_dir.unwrap_or(config.model_dir);
            let test_size = test_size.unwrap_or(config.test_size);

            let mut detector = AiTextDetector::with_config(config.detector);
            let report = detector
                .train_with_report(&data, test_size)
                .with_context(|| format!("Training on {} failed", data.display()))?;
            println!("{}", report);

            detector
                .save_model(&model_dir)
                .with_context(|| format!("Failed to save model to {}", model_dir.display()))?;
            println!("\n✅ Model saved to {}/", model_dir.display());
            Ok(())
        }
        Commands::Predict {
            text,
            model_dir,
            json,
        } => {
            if text.trim().is_empty() {
                bail!("Text cannot be empty");
            }
            let model_dir = model_dir.unwrap_or(config.model_dir);
            let detector = AiTextDetector::load(&model_dir)
                .with_context(|| format!("No usable model in {}/ (train first)", model_dir.display()))?;

            let result = analyze(&detector, &text)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!(
                    "→ {} | AI: {:.1}% | Human: {:.1}% | confidence: {}",
                    result.label,
                    result.ai_probability * 100.0,
                    result.human_probability * 100.0,
                    result.confidence
                );
            }
            Ok(())
        }
        Commands::Interactive { data, model_dir } => {
            let options = MenuOptions {
                data_path: data.unwrap_or(config.data_path),
                model_dir: model_dir.unwrap_or(config.model_dir),
                test_size: config.test_size,
            };
            let mut detector = AiTextDetector::with_config(config.detector);
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            run_menu(&mut detector, &options, &mut stdin.lock(), &mut stdout.lock())?;
            Ok(())
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => {
                println!("# {}", store.config_file().display());
                println!("{}", serde_json::to_string_pretty(&config)?);
                Ok(())
            }
            ConfigAction::Init { force } => {
                if store.exists() && !force {
                    bail!(
                        "{} already exists (use --force to overwrite)",
                        store.config_file().display()
                    );
                }
                store.save(&AppConfig::default())?;
                println!("✅ Wrote {}", store.config_file().display());
                Ok(())
            }
        },
    }
}

fn run_server(host: String, port: u16, model_dir: PathBuf) -> Result<()> {
    info!("[API] Model directory: {}", model_dir.display());
    let state = AppState::new(api::load_detector(&model_dir));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start tokio runtime")?;
    runtime
        .block_on(api::serve(&host, port, state))
        .with_context(|| format!("Server on {}:{} failed", host, port))?;

    info!("=== AI Text Detector Exited ===");
    Ok(())
}
