use clap::Parser;
use where_iss::config::toml_config::{TomlConfig, DEFAULT_CONFIG_FILE};
use where_iss::core::Display;
use where_iss::utils::logger;
use where_iss::FileDisplay;

/// Wipe the panel and put it to rest, e.g. from a nightly cron job
#[derive(Parser)]
#[command(name = "clear-display")]
#[command(about = "Clear the e-paper display and put it to sleep")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: String,

    /// Override the display output directory
    #[arg(long)]
    output_dir: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    let config = match TomlConfig::load_or_default(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            std::process::exit(1);
        }
    };

    let output_dir = args
        .output_dir
        .unwrap_or_else(|| config.display.output_dir.clone());
    let mut display = FileDisplay::new(output_dir, config.display.width, config.display.height);

    let target_dir = display.output_dir().display().to_string();
    tracing::info!("🧹 Wiping {} clean...", target_dir);
    if let Err(e) = display.wipe() {
        tracing::error!("❌ {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code().max(1));
    }
    tracing::info!("💤 Gone to sleep. Good night.");
}
