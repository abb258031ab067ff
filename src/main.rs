// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]
// Add other lints specific to this module that you want to allow but not auto-fix

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, error, info, warn};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use doclingo::app_config::{self, Config, ProviderConfig, ProviderKind};
use doclingo::AppError;
use doclingo::app_controller::Controller;

/// CLI Wrapper for ProviderKind to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliProvider {
    Gemini,
    #[value(name = "openrouter")]
    OpenRouter,
    Ollama,
    Vllm,
    #[value(name = "openai")]
    OpenAI,
}

impl From<CliProvider> for ProviderKind {
    fn from(cli_provider: CliProvider) -> Self {
        match cli_provider {
            CliProvider::Gemini => ProviderKind::Gemini,
            CliProvider::OpenRouter => ProviderKind::OpenRouter,
            CliProvider::Ollama => ProviderKind::Ollama,
            CliProvider::Vllm => ProviderKind::Vllm,
            CliProvider::OpenAI => ProviderKind::OpenAI,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate Word and PowerPoint documents (default command)
    Translate(TranslateArgs),

    /// Replace every font of a PowerPoint deck
    Fonts {
        /// Input .pptx file
        #[arg(value_name = "INPUT_FILE")]
        input: PathBuf,

        /// Typeface to apply to latin, east asian and complex script text
        #[arg(long)]
        font: String,

        /// Output file (defaults to <name>_font.pptx next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate shell completions for doclingo
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// Input document or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    #[command(flatten)]
    options: TranslateOptions,
}

#[derive(clap::Args, Debug, Clone)]
struct TranslateOptions {
    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliProvider>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// API key of the selected provider
    #[arg(long, env = "DOCLINGO_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Target language code or name (e.g., 'fr', 'de', 'Simplified Chinese')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// doclingo - Layout-preserving document translation with AI
///
/// Translates the text of Word and PowerPoint documents paragraph by paragraph
/// while keeping their formatting, using Gemini or any OpenAI-compatible provider.
#[derive(Parser, Debug)]
#[command(name = "doclingo")]
#[command(version)]
#[command(about = "AI-powered document translation tool")]
#[command(long_about = "doclingo translates .docx and .pptx documents with AI providers and keeps their layout.

EXAMPLES:
    doclingo report.docx                          # Translate using default config
    doclingo -f report.docx                       # Force overwrite existing files
    doclingo -p openai -m gpt-4o-mini deck.pptx   # Use specific provider and model
    doclingo -t de report.docx                    # Translate to German
    doclingo --log-level debug /documents/        # Process entire directory with debug logging
    doclingo fonts deck.pptx --font \"Noto Sans\"   # Replace every font of a deck
    doclingo completions bash > doclingo.bash     # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.

SUPPORTED PROVIDERS:
    gemini     - Google Gemini API (requires API key)
    openrouter - OpenRouter API (requires API key)
    ollama     - Local Ollama server (OpenAI-compatible on http://localhost:11434/v1)
    vllm       - Local vLLM server (OpenAI-compatible on http://localhost:8000/v1)
    openai     - OpenAI or any other OpenAI-compatible API")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input document or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    #[command(flatten)]
    options: TranslateOptions,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        // The filter lives in log::max_level so it can be raised after the config is read
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Marker for log level
    fn get_marker_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "✖",
            Level::Warn => "⚠",
            Level::Info => " ",
            Level::Debug => "·",
            Level::Trace => "…",
        }
    }

    // @returns: ANSI color for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let level = record.level();

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {} {}\x1B[0m",
                Self::get_color_for_level(level),
                now,
                Self::get_marker_for_level(level),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize the logger once with info level by default
    // The level is updated after loading the config
    if let Err(e) = CustomLogger::init(LevelFilter::Info) {
        eprintln!("Failed to initialize logger: {}", e);
        return ExitCode::FAILURE;
    }

    let cli = CommandLineOptions::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(AppError::from(e).exit_code())
        }
    }
}

async fn run(cli: CommandLineOptions) -> Result<()> {
    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "doclingo", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Fonts { input, font, output }) => {
            Controller::replace_fonts(&input, &font, output)?;
            Ok(())
        }
        Some(Commands::Translate(args)) => run_translate(args.input_path, args.options).await,
        None => {
            let input_path = cli
                .input_path
                .ok_or_else(|| anyhow!("INPUT_PATH is required when no subcommand is specified"))?;
            run_translate(input_path, cli.options).await
        }
    }
}

async fn run_translate(input_path: PathBuf, options: TranslateOptions) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let config = load_config(&options)?;

    // If log level was not set via command line, update it from config now
    if options.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    let controller = Controller::with_config(config)?;

    let cancel = controller.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling translation");
            cancel.cancel();
        }
    });

    if input_path.is_file() {
        controller.run(input_path, options.force_overwrite).await?;
    } else if input_path.is_dir() {
        let summary = controller.run_folder(input_path, options.force_overwrite).await?;
        if summary.errors > 0 {
            return Err(anyhow!("{} file(s) could not be translated", summary.errors));
        }
    } else {
        return Err(anyhow!("Input path does not exist: {:?}", input_path));
    }

    Ok(())
}

// Load the configuration file, creating a default one if missing, then apply CLI overrides
fn load_config(options: &TranslateOptions) -> Result<Config> {
    let config_path = Path::new(&options.config_path);

    let mut config = if config_path.exists() {
        Config::from_file(config_path)?
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path.display());

        let config = Config::default();
        config
            .save(config_path)
            .with_context(|| format!("Failed to write default config to file: {}", config_path.display()))?;
        config
    };

    if let Some(provider) = &options.provider {
        config.translation.provider = provider.clone().into();
    }

    let active = config.translation.provider;
    if (options.model.is_some() || options.api_key.is_some())
        && config.translation.get_provider_config(&active).is_none()
    {
        config.translation.available_providers.push(ProviderConfig::new(active));
    }
    if let Some(provider_config) = config.translation.get_provider_config_mut(&active) {
        if let Some(model) = &options.model {
            provider_config.model = Some(model.clone());
        }
        if let Some(api_key) = &options.api_key {
            provider_config.api_key = api_key.clone();
        }
    }

    if let Some(target_language) = &options.target_language {
        config.target_language = target_language.clone();
    }

    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    config.validate().context("Configuration validation failed")?;
    info!("Target language: {}", config.target_language);

    Ok(config)
}
