use clap::Parser;
use where_iss::config::toml_config::TomlConfig;
use where_iss::core::{ConfigProvider, Pipeline};
use where_iss::utils::{logger, validation::Validate};
use where_iss::{CliConfig, IssError, MapPipeline, PrintEngine, PrintOutcome};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_logger(cli.verbose, cli.json_logs);

    tracing::info!("Starting where-iss");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => fail(&e),
    };

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    display_config_summary(&config, &cli);

    let monitor_enabled = config.monitoring_enabled();
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let pipeline = match MapPipeline::from_config(config) {
        Ok(pipeline) => pipeline,
        Err(e) => fail(&e),
    };

    if cli.dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing is downloaded or printed");
        if let Err(e) = perform_dry_run(&pipeline).await {
            fail(&e);
        }
        return Ok(());
    }

    let engine = PrintEngine::new_with_monitoring(pipeline, monitor_enabled);

    tokio::select! {
        result = engine.run() => match result {
            Ok(PrintOutcome::Printed(report)) => {
                println!("✅ Printed zoom {} tile {}, {}", report.tile.zoom, report.tile.x, report.tile.y);
            }
            Ok(PrintOutcome::Skipped { attempts, .. }) => {
                println!("🌊 Nothing interesting after {} zoom levels; kept what's on screen", attempts);
            }
            Err(e) => fail(&e),
        },
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("ctrl + c: leaving the display as it is");
        }
    }

    Ok(())
}

fn fail(e: &IssError) -> ! {
    // 記錄詳細錯誤信息
    tracing::error!(
        "❌ Print failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    std::process::exit(e.exit_code().max(1));
}

fn display_config_summary(config: &TomlConfig, cli: &CliConfig) {
    let processing = config.processing();
    tracing::info!("📋 Configuration Summary:");
    tracing::info!("  ISS source: {}", config.iss_endpoint());
    tracing::info!(
        "  Zoom: {} down to {} (invert at {} and below)",
        processing.max_zoom,
        processing.min_zoom,
        processing.invert_zoom_level
    );
    tracing::info!(
        "  Contrast: {}, minimum foreground: {}%",
        processing.contrast,
        processing.min_foreground_percentage
    );
    tracing::info!(
        "  Display: {}x{} -> {}",
        config.display.width,
        config.display.height,
        config.display.output_dir
    );
    if config.export_images() {
        tracing::info!("  Exports: {}", config.export.path);
    }
    if cli.dry_run {
        tracing::info!("  🔍 DRY RUN MODE ENABLED");
    }
}

async fn perform_dry_run<S, C, D>(pipeline: &MapPipeline<S, C, D>) -> where_iss::Result<()>
where
    S: where_iss::core::Storage,
    C: ConfigProvider,
    D: where_iss::core::Display,
{
    let position = pipeline.locate().await?;

    println!("🔍 Dry Run Analysis:");
    println!("  Coordinates: {}, {}", position.latitude, position.longitude);
    for (tile, url) in pipeline.planned_tiles(&position) {
        println!("  zoom {:>2}: tile {}, {} -> {}", tile.zoom, tile.x, tile.y, url);
    }
    Ok(())
}
