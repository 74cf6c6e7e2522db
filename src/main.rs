// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow, bail};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, error, info, warn};
use std::io::Write;
use std::path::{Path, PathBuf};

use subtrans::app_config::{self, Config, DEFAULT_CONFIG_FILE, Engine, OutputFormat};
use subtrans::app_controller::{CacheMode, Controller};
use subtrans::language_detector::language_name;

/// CLI Wrapper for Engine to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliEngine {
    Ollama,
    #[value(name = "openai")]
    OpenAI,
    #[value(name = "lmstudio")]
    LMStudio,
}

impl From<CliEngine> for Engine {
    fn from(cli_engine: CliEngine) -> Self {
        match cli_engine {
            CliEngine::Ollama => Engine::Ollama,
            CliEngine::OpenAI => Engine::OpenAI,
            CliEngine::LMStudio => Engine::LMStudio,
        }
    }
}

/// CLI Wrapper for OutputFormat to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliOutputFormat {
    Same,
    Srt,
    Ass,
    Vtt,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(cli_format: CliOutputFormat) -> Self {
        match cli_format {
            CliOutputFormat::Same => OutputFormat::Same,
            CliOutputFormat::Srt => OutputFormat::Srt,
            CliOutputFormat::Ass => OutputFormat::Ass,
            CliOutputFormat::Vtt => OutputFormat::Vtt,
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
    /// Translate a subtitle file or every subtitle file in a directory
    Translate(TranslateArgs),

    /// Detect the language of a subtitle file
    Detect {
        /// Subtitle file to inspect
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Inspect or maintain the translation cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Show or reset the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions for subtrans
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
enum CacheAction {
    /// Print cache statistics
    Stats,
    /// Remove single-use entries older than the configured age
    Clean {
        /// Age in days (defaults to cache_max_age_days)
        #[arg(long)]
        days: Option<u32>,
    },
    /// Remove every cached translation
    Clear,
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Overwrite the configuration file with defaults
    Reset,
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// Subtitle file or directory to translate
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output file (or output directory when INPUT is a directory)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Source language code (e.g. 'en'), or 'auto' to detect
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g. 'ar', 'fr')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Translation engine to use
    #[arg(short, long, value_enum)]
    engine: Option<CliEngine>,

    /// Model name for the selected engine
    #[arg(short, long)]
    model: Option<String>,

    /// API key for the openai engine
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Output subtitle format
    #[arg(long = "format", value_enum)]
    format: Option<CliOutputFormat>,

    /// Do not read or write the translation cache
    #[arg(long, conflicts_with = "memory_cache")]
    no_cache: bool,

    /// Cache translations in memory only for this run
    #[arg(long)]
    memory_cache: bool,

    /// Do not back up input files
    #[arg(long)]
    no_backup: bool,

    /// Number of files translated at once
    #[arg(short = 'j', long)]
    jobs: Option<usize>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force: bool,
}

/// subtrans - subtitle translation with local or remote language models
#[derive(Parser, Debug)]
#[command(name = "subtrans")]
#[command(version)]
#[command(about = "Translate SubRip, ASS and WebVTT subtitles")]
#[command(long_about = "subtrans translates subtitle files entry by entry, caching every translation.

EXAMPLES:
    subtrans translate movie.srt                   # Translate using the config defaults
    subtrans translate movie.srt -t fr -f          # Translate to French, overwrite output
    subtrans translate movies/ -j 4 --format vtt   # Translate a directory to WebVTT
    subtrans detect movie.ass                      # Detect the subtitle language
    subtrans cache clean --days 7                  # Drop single-use entries older than a week
    subtrans completions bash > subtrans.bash      # Generate bash completions

CONFIGURATION:
    Settings are read from subtrans.json by default. Missing keys take their
    defaults; if the file does not exist a default one is created.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
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
        log::set_boxed_logger(Box::new(CustomLogger::new(LevelFilter::Trace)))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour for log level
    fn color_for_level(level: Level) -> &'static str {
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
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Info until the config has been read
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();
    if let Some(level) = &cli.log_level {
        let level: app_config::LogLevel = level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let log_level_from_cli = cli.log_level.is_some();
    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "subtrans", &mut std::io::stdout());
            Ok(())
        }
        Commands::Config { action } => run_config(&cli.config, action),
        Commands::Translate(args) => run_translate(load_config(&cli.config, log_level_from_cli)?, args).await,
        Commands::Detect { file } => run_detect(load_config(&cli.config, log_level_from_cli)?, &file),
        Commands::Cache { action } => run_cache(load_config(&cli.config, log_level_from_cli)?, action).await,
    }
}

/// Load the configuration, creating a default file when there is none
fn load_config(path: &Path, log_level_from_cli: bool) -> Result<Config> {
    let config = if path.exists() {
        Config::load(path)
    } else {
        warn!("Config file not found at {:?}, creating default config.", path);
        let config = Config::default();
        if let Err(e) = config.save(path) {
            warn!("{}", e);
        }
        config
    };

    if !log_level_from_cli {
        log::set_max_level(config.log_level.to_level_filter());
    }
    Ok(config)
}

fn run_config(path: &Path, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = Config::load(path);
            println!("{}", serde_json::to_string_pretty(&config).context("Failed to serialize config")?);
        }
        ConfigAction::Reset => {
            let mut config = Config::load(path);
            config.reset_to_defaults();
            config.save(path)?;
            info!("Configuration reset to defaults in {:?}", path);
        }
    }
    Ok(())
}

async fn run_translate(mut config: Config, args: TranslateArgs) -> Result<()> {
    // Command line options override the config file
    if let Some(engine) = args.engine {
        config.translation_engine = engine.into();
    }
    if let Some(model) = args.model {
        config.set_engine_model(model);
    }
    if let Some(api_key) = args.api_key {
        config.openai_api_key = api_key;
    }
    if let Some(source_language) = args.source_language {
        config.default_source_language = source_language;
    }
    if let Some(target_language) = args.target_language {
        config.default_target_language = target_language;
    }
    if let Some(format) = args.format {
        config.output_format = format.into();
    }
    if let Some(jobs) = args.jobs {
        config.concurrent_files = jobs;
    }
    if args.no_backup {
        config.create_backup = false;
    }

    let cache_mode = if args.no_cache {
        CacheMode::Disabled
    } else if args.memory_cache {
        CacheMode::Memory
    } else if config.cache_enabled {
        CacheMode::Persistent
    } else {
        CacheMode::Disabled
    };

    if !args.input.exists() {
        bail!("Input path does not exist: {:?}", args.input);
    }

    let controller = Controller::with_config(config)?.with_cache_mode(cache_mode);
    controller.cancel_on_ctrl_c();

    let mut request = controller.default_request();
    request.force_overwrite = args.force;

    let report = controller.run(&args.input, args.output.as_deref(), &request).await?;

    for (path, e) in &report.failures {
        error!("{:?}: {}", path, e);
    }
    let snapshot = controller.stats().snapshot();
    println!("{}", snapshot);
    println!(
        "  Elapsed:            {}",
        Controller::format_duration(controller.stats().elapsed())
    );

    if report.cancelled {
        return Err(anyhow!("Translation cancelled"));
    }
    if !report.failures.is_empty() {
        return Err(anyhow!("{} file(s) failed to translate", report.failures.len()));
    }
    Ok(())
}

fn run_detect(config: Config, file: &Path) -> Result<()> {
    let controller = Controller::with_config(config)?;
    let (format, entries, detection) = controller.detect(file)?;

    println!("File:       {}", file.display());
    println!("Format:     {} ({} entries)", format.display_name(), entries);
    match detection.language {
        Some(code) => {
            println!("Language:   {} ({})", language_name(code), code);
            println!("Confidence: {:.2}", detection.confidence);
        }
        None => println!("Language:   unknown"),
    }
    Ok(())
}

async fn run_cache(config: Config, action: CacheAction) -> Result<()> {
    let controller = Controller::with_config(config)?.with_cache_mode(CacheMode::Persistent);

    match action {
        CacheAction::Stats => {
            let stats = controller.cache_stats().await?;
            println!("Entries:        {}", stats.total_entries);
            println!("Total uses:     {}", stats.total_usage);
            println!("Hit potential:  {:.1}%", stats.hit_potential);
            println!("Storage:        {} bytes", stats.storage_size_bytes);
            for (language, count) in &stats.per_target_language {
                println!("  {:<12} {}", language_name(language), count);
            }
        }
        CacheAction::Clean { days } => {
            let removed = controller.cache_clean(days).await?;
            println!("Removed {} unused cache entries", removed);
        }
        CacheAction::Clear => {
            controller.cache_clear().await?;
            println!("Translation cache cleared");
        }
    }
    Ok(())
}
