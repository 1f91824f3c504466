use crate::adapters::http::DEFAULT_ISS_ENDPOINT;
use crate::core::tile::{template_needs_token, DEFAULT_TILE_ENDPOINT};
use crate::core::ConfigProvider;
use crate::domain::model::{DisplayLayout, ProcessingSettings};
use crate::utils::error::{IssError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const TOKEN_ENV_VAR: &str = "MAPBOX_ACCESS_TOKEN";
pub const DEFAULT_CONFIG_FILE: &str = "where-iss.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub source: SourceConfig,
    pub tiles: TilesConfig,
    pub processing: ProcessingSettings,
    pub display: DisplayConfig,
    pub export: ExportConfig,
    pub watch: WatchConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub endpoint: String,
    pub timeout_seconds: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ISS_ENDPOINT.to_string(),
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TilesConfig {
    pub endpoint: String,
    pub access_token: Option<String>,
}

impl Default for TilesConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_TILE_ENDPOINT.to_string(),
            access_token: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub width: u32,
    pub height: u32,
    pub map_width: u32,
    pub map_height: u32,
    pub x_offset: i32,
    pub y_offset: i32,
    pub output_dir: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        let layout = DisplayLayout::default();
        Self {
            width: layout.width,
            height: layout.height,
            map_width: layout.map_width,
            map_height: layout.map_height,
            x_offset: layout.x_offset,
            y_offset: layout.y_offset,
            output_dir: "./display".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub enabled: bool,
    pub path: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: "./exports".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub max_refreshes: usize,
    pub refresh_delay_seconds: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            max_refreshes: 4,
            refresh_delay_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(IssError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 檔案存在就載入，否則使用預設值
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            tracing::debug!(
                "No configuration file at {}, using defaults",
                path.as_ref().display()
            );
            Ok(Self::default())
        }
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| IssError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${MAPBOX_ACCESS_TOKEN})，未設定的保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| IssError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("source.endpoint", &self.source.endpoint)?;
        validation::validate_range("source.timeout_seconds", self.source.timeout_seconds, 1, 600)?;
        validation::validate_tile_template("tiles.endpoint", &self.tiles.endpoint)?;

        if template_needs_token(&self.tiles.endpoint) {
            let token = self.access_token();
            validation::validate_required_field("tiles.access_token", &token)?;
            if let Some(token) = token.as_deref() {
                validation::validate_non_empty_string("tiles.access_token", token)?;
                if token.starts_with("${") {
                    return Err(IssError::MissingConfigError {
                        field: token.trim_start_matches("${").trim_end_matches('}').to_string(),
                    });
                }
            }
        }

        let processing = &self.processing;
        validation::validate_zoom_range(processing.max_zoom, processing.min_zoom)?;
        validation::validate_positive("processing.contrast", processing.contrast)?;
        validation::validate_range(
            "processing.min_foreground_percentage",
            processing.min_foreground_percentage,
            0,
            100,
        )?;

        let display = &self.display;
        validation::validate_range("display.width", display.width, 1, 4096)?;
        validation::validate_range("display.height", display.height, 1, 4096)?;
        validation::validate_range("display.map_width", display.map_width, 1, display.width)?;
        validation::validate_range("display.map_height", display.map_height, 1, display.height)?;
        validation::validate_path("display.output_dir", &display.output_dir)?;

        if self.export.enabled {
            validation::validate_path("export.path", &self.export.path)?;
        }

        Ok(())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.enabled
    }

    pub fn refresh_delay(&self) -> Duration {
        Duration::from_secs(self.watch.refresh_delay_seconds)
    }
}

impl ConfigProvider for TomlConfig {
    fn iss_endpoint(&self) -> &str {
        &self.source.endpoint
    }

    fn tile_endpoint(&self) -> &str {
        &self.tiles.endpoint
    }

    /// 配置檔優先，其次是 MAPBOX_ACCESS_TOKEN 環境變數
    fn access_token(&self) -> Option<String> {
        self.tiles
            .access_token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .or_else(|| std::env::var(TOKEN_ENV_VAR).ok())
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.source.timeout_seconds)
    }

    fn processing(&self) -> ProcessingSettings {
        self.processing
    }

    fn layout(&self) -> DisplayLayout {
        DisplayLayout {
            width: self.display.width,
            height: self.display.height,
            map_width: self.display.map_width,
            map_height: self.display.map_height,
            x_offset: self.display.x_offset,
            y_offset: self.display.y_offset,
        }
    }

    fn export_images(&self) -> bool {
        self.export.enabled
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
