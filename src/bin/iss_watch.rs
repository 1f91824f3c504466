use clap::Parser;
use std::time::Duration;
use where_iss::config::toml_config::DEFAULT_CONFIG_FILE;
use where_iss::utils::{logger, validation::Validate};
use where_iss::{MapPipeline, PrintEngine, TomlConfig, WatchLoop};

/// 定期重印 ISS 位置，結束時清空面板
#[derive(Parser)]
#[command(name = "iss-watch")]
#[command(about = "Refresh the ISS map on a fixed cadence, then wipe the display")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: String,

    /// Number of editions to print before clearing the display
    #[arg(short = 'n', long)]
    refreshes: Option<usize>,

    /// Seconds to wait between editions
    #[arg(short, long)]
    delay: Option<u64>,

    /// Save color, dithered and rejected tiles plus a report
    #[arg(long)]
    export: bool,

    /// Log per-phase CPU and memory usage
    #[arg(long)]
    monitor: bool,

    /// Emit JSON logs
    #[arg(long)]
    json_logs: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    logger::init_logger(args.verbose, args.json_logs);

    let mut config = match TomlConfig::load_or_default(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            std::process::exit(1);
        }
    };

    if let Some(refreshes) = args.refreshes {
        config.watch.max_refreshes = refreshes;
    }
    if let Some(delay) = args.delay {
        config.watch.refresh_delay_seconds = delay;
    }
    if args.export {
        config.export.enabled = true;
    }
    if args.monitor {
        config.monitoring.enabled = true;
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let max_refreshes = config.watch.max_refreshes;
    let delay = Duration::from_secs(config.watch.refresh_delay_seconds);
    let monitor_enabled = config.monitoring_enabled();

    tracing::info!(
        "👀 Watching the ISS: {} editions, {}s apart",
        max_refreshes,
        delay.as_secs()
    );

    let pipeline = match MapPipeline::from_config(config) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(e.exit_code().max(1));
        }
    };

    let watch = WatchLoop::new(
        PrintEngine::new_with_monitoring(pipeline, monitor_enabled),
        max_refreshes,
        delay,
    );

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Unable to listen for ctrl + c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    match watch.run_until(shutdown).await {
        Ok(summary) => {
            println!(
                "✅ {} printed, {} skipped, {} failed{}",
                summary.printed,
                summary.skipped,
                summary.failed,
                if summary.interrupted { " (interrupted)" } else { "" }
            );
        }
        Err(e) => {
            tracing::error!(
                "❌ Watch failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(e.exit_code().max(1));
        }
    }
}
