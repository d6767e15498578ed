#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;

use aisub::app_config::{self, Config};
use aisub::app_controller::{Controller, RunRequest};
use aisub::errors::AppError;
use aisub::file_utils::FileManager;
use aisub::providers::ProviderKind;
use aisub::subtitle_processor::SubtitleCollection;
use aisub::translation::page_count;

/// CLI Wrapper for ProviderKind to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliProvider {
    Primary,
    Google,
}

impl From<CliProvider> for ProviderKind {
    fn from(cli_provider: CliProvider) -> Self {
        match cli_provider {
            CliProvider::Primary => ProviderKind::Primary,
            CliProvider::Google => ProviderKind::Google,
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
    /// Translate a subtitle file, or every subtitle file in a directory
    Translate(TranslateArgs),

    /// Show how a subtitle file splits into pages
    Pages {
        /// Subtitle file to inspect
        #[arg(value_name = "INPUT_PATH")]
        input_path: PathBuf,

        /// Zero-based page to preview
        #[arg(long, default_value_t = 0)]
        page: usize,

        /// Configuration file path
        #[arg(short, long, default_value = "conf.json")]
        config_path: String,
    },

    /// Generate shell completions for aisub
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// Input subtitle file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// Target language code (e.g., 'zh', 'ja', 'zh-Hans')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Translate only this zero-based page
    #[arg(long)]
    page: Option<usize>,

    /// Output directory, defaults to the input's directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Also write a bilingual file (original above translation)
    #[arg(short, long)]
    bilingual: bool,

    /// Translation endpoint to use
    #[arg(short, long, value_enum)]
    provider: Option<CliProvider>,

    /// API key sent with every request
    #[arg(long, env = "AISUB_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Prompt template sent with every request
    #[arg(long)]
    prompt_template: Option<String>,

    /// Custom host for the upstream model API
    #[arg(long)]
    base_host: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,
}

/// aisub - batched subtitle translation
///
/// Splits subtitles into pages of ten cues and sends them to a translate
/// service one page at a time, retrying each page a few times.
#[derive(Parser, Debug)]
#[command(name = "aisub")]
#[command(version)]
#[command(about = "Batched subtitle translation")]
#[command(long_about = "aisub translates SRT, WebVTT, ASS and plain-text subtitles page by page.

EXAMPLES:
    aisub translate movie.srt                      # Translate using default config
    aisub translate -t ja movie.vtt                # Translate to Japanese
    aisub translate --page 2 movie.srt             # Translate only the third page
    aisub translate -b -o out/ movie.srt           # Also write a bilingual file
    aisub translate -p google /subs/               # Process a directory with the alternate endpoint
    aisub pages movie.srt                          # Show page count and the first page
    aisub completions bash > aisub.bash            # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
}

// @struct: Custom logger implementation, filtered by the global max level
struct CustomLogger;

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {:<5} {}\x1B[0m",
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
    // Info until the config says otherwise
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();
    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "aisub", &mut std::io::stdout());
            Ok(())
        }
        Commands::Pages { input_path, page, config_path } => Ok(run_pages(input_path, page, &config_path)?),
        Commands::Translate(args) => run_translate(args).await,
    }
}

fn load_config(config_path: &str) -> Result<Config> {
    let (config, created) = Config::load_or_create(config_path)?;
    if created {
        warn!("Config file not found at '{}', created a default one.", config_path);
    }
    Ok(config)
}

fn run_pages(input_path: PathBuf, page: usize, config_path: &str) -> Result<(), AppError> {
    let config = load_config(config_path)?;
    log::set_max_level(config.log_level.to_level_filter());

    let bytes = FileManager::read_bytes(&input_path)?;
    let collection = SubtitleCollection::from_bytes(
        FileManager::display_name(&input_path),
        &bytes,
        config.input.max_file_size,
    )?;

    let page_size = config.batching.page_size;
    let pages = page_count(collection.entries.len(), page_size);
    println!("{}: {} entries, {} pages of {}", collection.source_name, collection.entries.len(), pages, page_size);

    let preview = aisub::translation::select_page(&collection.entries, page, page_size);
    if preview.is_empty() {
        return Err(AppError::Unknown(format!("Page {} is out of range", page + 1)));
    }
    println!("-- page {} / {} --", page + 1, pages);
    print!("{}", aisub::subtitle_processor::to_srt_string(preview));
    Ok(())
}

async fn run_translate(options: TranslateArgs) -> Result<()> {
    if let Some(level) = &options.log_level {
        let level: app_config::LogLevel = level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = load_config(&options.config_path)?;

    // Command line wins over the file
    if let Some(target_language) = &options.target_language {
        config.target_language = target_language.clone();
    }
    if let Some(provider) = &options.provider {
        config.translation.provider = provider.clone().into();
    }
    if let Some(api_key) = &options.api_key {
        config.translation.api_key = api_key.clone();
    }
    if let Some(prompt_template) = &options.prompt_template {
        config.translation.prompt_template = prompt_template.clone();
    }
    if let Some(base_host) = &options.base_host {
        config.translation.base_host = base_host.clone();
    }
    if let Some(level) = &options.log_level {
        config.log_level = level.clone().into();
    }

    config.validate()?;
    log::set_max_level(config.log_level.to_level_filter());

    let input_path = options.input_path;
    let request = RunRequest {
        page: options.page,
        bilingual: options.bilingual,
        force_overwrite: options.force_overwrite,
    };

    info!("aisub: {} -> {} via {}", input_path.display(), config.target_language, config.translation.provider);
    let mut controller = Controller::with_config(config)?.with_progress(true);

    if FileManager::dir_exists(&input_path) {
        let output_dir = options.output_dir.unwrap_or_else(|| input_path.clone());
        controller.run_folder(&input_path, &output_dir, &request).await?;
    } else if FileManager::file_exists(&input_path) {
        let output_dir = options.output_dir.unwrap_or_else(|| {
            input_path
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."))
        });
        controller.run(&input_path, &output_dir, &request).await?;
    } else {
        return Err(anyhow!("Input path does not exist: {}", input_path.display()));
    }

    Ok(())
}
