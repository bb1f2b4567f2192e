//! Bilingual - Interactive Arabic/English Translation
//!
//! Main entry point: serves the translation UI, or runs one-off translations
//! and pipeline checks from the command line.

use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Read;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tracing_appender::{non_blocking, rolling};

use bilingual::cli::{Args, Commands, ConfigAction};
use bilingual::config::Config;
use bilingual::controller::{Action, Controller, ViewState};
use bilingual::direction::Direction;
use bilingual::loader::PipelineLoader;
use bilingual::pipeline::OllamaPipelineFactory;
use bilingual::setup::SetupManager;
use bilingual::web::{self, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Setup logging to both console and file
    setup_logging(args.verbose)?;

    // Load configuration
    let mut config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            // Try to load config.toml from current directory first
            if std::path::Path::new("config.toml").exists() {
                info!("Found config.toml in current directory, loading...");
                Config::from_file("config.toml")?
            } else {
                Config::default()
            }
        }
    };

    match args.command {
        Commands::Config { action } => match action {
            ConfigAction::Init { output, force } => {
                if output.exists() && !force {
                    anyhow::bail!("{} already exists; use --force to overwrite", output.display());
                }
                Config::default().save_to_file(&output)?;
                println!("Wrote default configuration to {}", output.display());
            }
            ConfigAction::Show => {
                print!("{}", toml::to_string_pretty(&config)?);
            }
        },
        Commands::Serve { host, port, preload } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }

            let setup_manager = SetupManager::new(&config)?;
            setup_manager.initialize()?;
            setup_manager.check_endpoint().await;

            let controller = build_controller(&config);

            if preload {
                for direction in Direction::ALL {
                    if let Err(e) = controller.loader().load(direction).await {
                        warn!("Preloading {} failed, it will be retried on first use: {}", direction, e);
                    }
                }
            }

            info!("Starting {}", config.ui.page_title);
            let state = Arc::new(AppState::new(controller, config));
            web::serve(state).await?;
        }
        Commands::Translate { direction, text } => {
            let direction: Direction = direction.parse()?;
            let text = match text {
                Some(text) => text,
                None => {
                    let mut buffer = String::new();
                    std::io::stdin().read_to_string(&mut buffer)?;
                    buffer
                }
            };

            SetupManager::new(&config)?.initialize()?;
            let controller = build_controller(&config);

            let spinner = spinner("Loading translation model...");
            let view = controller
                .handle(&ViewState::new(direction), Action::Submit(text))
                .await;
            spinner.finish_and_clear();

            let translation = view.translation().map_err(|message| anyhow::anyhow!(message))?;
            println!("{}:\n{}\n", view.input_label(), translation.result.original.trim());
            println!("{}:\n{}\n", view.output_label(), translation.result.translated);
            println!("Processing time: {}", translation.elapsed_display());
            println!("Cleaned input text: {}", translation.result.cleaned);
        }
        Commands::Check => {
            SetupManager::new(&config)?.initialize()?;
            let controller = build_controller(&config);
            let mut failures = 0;

            println!("{:<8} {:<25} {:<10}", "Pipeline", "Model", "Status");
            println!("{}", "-".repeat(60));

            for direction in Direction::ALL {
                let spinner = spinner(&format!("Loading {} pipeline...", direction));
                let result = controller.loader().load(direction).await;
                spinner.finish_and_clear();

                let model = config.pipeline.models.for_direction(direction);
                match result {
                    Ok(_) => println!("{:<8} {:<25} {:<10}", direction.code(), model, "Ready"),
                    Err(e) => {
                        failures += 1;
                        println!("{:<8} {:<25} {:<10}", direction.code(), model, "Failed");
                        println!("         {}", e);
                    }
                }
            }

            if failures > 0 {
                anyhow::bail!("{} of {} pipelines failed to load", failures, Direction::ALL.len());
            }
        }
    }

    Ok(())
}

fn build_controller(config: &Config) -> Controller {
    let factory = Arc::new(OllamaPipelineFactory::new(config.pipeline.clone()));
    let loader = Arc::new(PipelineLoader::new(factory));
    Controller::new(loader)
}

fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

fn setup_logging(verbose: bool) -> Result<()> {
    // Create log directory
    let log_dir = std::env::current_dir()?.join(".bilingual").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "bilingual.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false); // No ANSI colors in file

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Logging initialized - console: {}, file: {}",
          log_level, log_dir.join("bilingual.log").display());

    Ok(())
}
