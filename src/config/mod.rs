pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::config::toml_config::{TomlConfig, DEFAULT_CONFIG_FILE};
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "where-iss")]
#[command(about = "Print a satellite map of wherever the ISS is right now to an e-paper display")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Directory the display writes its frames to
    #[arg(long)]
    pub output_dir: Option<String>,

    /// Save color, dithered and rejected tiles plus a report
    #[arg(long)]
    pub export: bool,

    /// Override the export directory
    #[arg(long)]
    pub export_path: Option<String>,

    #[arg(long)]
    pub max_zoom: Option<u8>,

    #[arg(long)]
    pub min_zoom: Option<u8>,

    /// 1 = no change, 1.5 = modest, 2 = noticeable, 3 = extreme
    #[arg(long)]
    pub contrast: Option<f32>,

    /// Locate the ISS and log the tile URLs without downloading or printing
    #[arg(long)]
    pub dry_run: bool,

    /// Log per-phase CPU and memory usage
    #[arg(long)]
    pub monitor: bool,

    /// Emit JSON logs
    #[arg(long)]
    pub json_logs: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 載入配置檔並套用命令列覆蓋設定
    pub fn resolve(&self) -> Result<TomlConfig> {
        let mut config = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::load_or_default(DEFAULT_CONFIG_FILE)?,
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    pub fn apply_overrides(&self, config: &mut TomlConfig) {
        if let Some(output_dir) = &self.output_dir {
            config.display.output_dir = output_dir.clone();
        }
        if self.export {
            config.export.enabled = true;
        }
        if let Some(path) = &self.export_path {
            config.export.path = path.clone();
        }
        if let Some(max_zoom) = self.max_zoom {
            tracing::info!("🔧 Max zoom overridden to: {}", max_zoom);
            config.processing.max_zoom = max_zoom;
        }
        if let Some(min_zoom) = self.min_zoom {
            tracing::info!("🔧 Min zoom overridden to: {}", min_zoom);
            config.processing.min_zoom = min_zoom;
        }
        if let Some(contrast) = self.contrast {
            tracing::info!("🔧 Contrast overridden to: {}", contrast);
            config.processing.contrast = contrast;
        }
        if self.monitor {
            config.monitoring.enabled = true;
        }
    }
}
