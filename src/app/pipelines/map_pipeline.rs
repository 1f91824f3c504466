use crate::adapters::display::FileDisplay;
use crate::adapters::http::MapClient;
use crate::config::cli::LocalStorage;
use crate::config::toml_config::TomlConfig;
use crate::core::tile::{redact_token, zoom_sequence};
use crate::core::{imaging, quality, ConfigProvider, Display, Pipeline, Storage};
use crate::domain::frame::FrameBuffer;
use crate::domain::model::{
    Composition, IssPosition, PrintReport, ProcessedTile, TileCoord, Verdict,
};
use crate::utils::error::{IssError, Result};
use chrono::Utc;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use std::sync::Arc;
use tokio::sync::Mutex;

/// 找 ISS、挑一張夠有趣的衛星圖磚、印到 e-paper 上
pub struct MapPipeline<S: Storage, C: ConfigProvider, D: Display> {
    storage: S,
    config: C,
    display: Arc<Mutex<D>>,
    client: MapClient,
}

impl<S: Storage, C: ConfigProvider, D: Display> MapPipeline<S, C, D> {
    pub fn new(storage: S, config: C, display: D) -> Result<Self> {
        let client = MapClient::new(config.request_timeout())?;
        Ok(Self {
            storage,
            config,
            display: Arc::new(Mutex::new(display)),
            client,
        })
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    /// 取回面板，主要給測試檢查畫面
    pub fn into_display(self) -> Result<D> {
        Arc::try_unwrap(self.display)
            .map(Mutex::into_inner)
            .map_err(|_| IssError::DisplayError {
                message: "the panel is still in use".to_string(),
            })
    }

    /// 面板驅動是阻塞 I/O，放到 blocking 執行緒上跑
    async fn with_panel<T, F>(&self, operation: F) -> Result<T>
    where
        F: FnOnce(&mut D) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let display = Arc::clone(&self.display);
        tokio::task::spawn_blocking(move || {
            let mut panel = display.blocking_lock();
            operation(&mut panel)
        })
        .await
        .map_err(|e| IssError::DisplayError {
            message: format!("display task failed: {}", e),
        })?
    }

    /// Tiles the zoom loop would request for a position, with the token
    /// redacted from each URL.
    pub fn planned_tiles(&self, position: &IssPosition) -> Vec<(TileCoord, String)> {
        let settings = self.config.processing();
        let token = self.config.access_token();

        zoom_sequence(settings.max_zoom, settings.min_zoom)
            .map(|zoom| {
                let tile = TileCoord::from_lat_lon(position.latitude, position.longitude, zoom);
                let url = tile.url(self.config.tile_endpoint(), token.as_deref());
                (tile, redact_token(&url, token.as_deref()))
            })
            .collect()
    }

    fn export_slug(position: &IssPosition) -> String {
        position.observed_at.format("%Y-%m-%d-%H-%M").to_string()
    }

    fn encode_png(image: DynamicImage) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        image.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)?;
        Ok(buffer)
    }

    async fn export_reject(&self, position: &IssPosition, tile: &ProcessedTile) -> Result<()> {
        let slug = Self::export_slug(position);
        let path = format!("{}/rejects/{}-zoom-{:02}.png", slug, slug, tile.tile.zoom);
        let dithered = imaging::dither(&tile.result);

        self.storage
            .write_file(&path, &Self::encode_png(DynamicImage::ImageLuma8(dithered))?)
            .await?;
        tracing::debug!("Saved rejected tile to {}", path);
        Ok(())
    }

    async fn export_accepted(
        &self,
        position: &IssPosition,
        tile: &ProcessedTile,
        report: &PrintReport,
    ) -> Result<()> {
        let slug = Self::export_slug(position);

        let dithered = Self::encode_png(DynamicImage::ImageLuma8(tile.dithered.clone()))?;
        self.storage
            .write_file(&format!("{}/{}-dithered.png", slug, slug), &dithered)
            .await?;

        let color = Self::encode_png(DynamicImage::ImageRgb8(tile.color.clone()))?;
        self.storage
            .write_file(&format!("{}/{}-color.png", slug, slug), &color)
            .await?;

        self.storage
            .write_file(&format!("{}/{}.txt", slug, slug), report.to_string().as_bytes())
            .await?;

        tracing::info!("📁 Exported images and report to {}/", slug);
        Ok(())
    }
}

impl MapPipeline<LocalStorage, TomlConfig, FileDisplay> {
    /// 以配置檔建立：匯出寫到 `export.path`，畫面寫到 `display.output_dir`
    pub fn from_config(config: TomlConfig) -> Result<Self> {
        let storage = LocalStorage::new(config.export.path.clone());
        let display = FileDisplay::new(
            config.display.output_dir.clone(),
            config.display.width,
            config.display.height,
        );
        Self::new(storage, config, display)
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, D: Display> Pipeline for MapPipeline<S, C, D> {
    async fn locate(&self) -> Result<IssPosition> {
        tracing::info!("🛰️ Querying ISS coordinates...");
        let position = self.client.fetch_position(self.config.iss_endpoint()).await?;
        tracing::info!(
            "Coordinates: {}, {}",
            position.latitude,
            position.longitude
        );
        Ok(position)
    }

    async fn compose(&self, position: &IssPosition) -> Result<Composition> {
        let settings = self.config.processing();
        let token = self.config.access_token();
        let mut attempts = 0;

        for zoom in zoom_sequence(settings.max_zoom, settings.min_zoom) {
            attempts += 1;
            tracing::info!("🗺️ Map zoom: {}", zoom);

            let tile = TileCoord::from_lat_lon(position.latitude, position.longitude, zoom);
            let url = tile.url(self.config.tile_endpoint(), token.as_deref());
            tracing::info!("Tile URL: {}", redact_token(&url, token.as_deref()));

            let color = self.client.fetch_tile(&tile, &url).await?;
            let processed = quality::process_tile(color, tile, url, &settings);
            tracing::info!(
                "Foreground: {}%, Background: {}%. Pixel range: {}",
                processed.stats.foreground_percentage,
                processed.stats.background_percentage,
                processed.stats.pixel_range
            );

            match processed.verdict {
                Verdict::Accepted => {
                    tracing::info!("✅ Looks good! Let's print.");
                    return Ok(Composition {
                        accepted: Some(processed),
                        attempts,
                    });
                }
                Verdict::Rejected(reason) => {
                    tracing::info!(
                        "Probably an uninteresting image ({}). Zooming out and trying again...",
                        reason
                    );
                    if self.config.export_images() {
                        self.export_reject(position, &processed).await?;
                    }
                }
            }
        }

        tracing::warn!(
            "Couldn't get a good map image at these coordinates despite being fully zoomed out. Keeping what's already on screen."
        );
        Ok(Composition {
            accepted: None,
            attempts,
        })
    }

    async fn publish(&self, position: &IssPosition, tile: ProcessedTile) -> Result<PrintReport> {
        let layout = self.config.layout();
        let map = imaging::resize(&tile.result, layout.map_width, layout.map_height);
        let canvas = imaging::compose_canvas(&layout, &map);
        let frame = FrameBuffer::pack(&canvas);

        let report = PrintReport {
            printed_at: Utc::now(),
            position: *position,
            tile: tile.tile,
            contrast: self.config.processing().contrast,
            stats: tile.stats,
            inverted: tile.inverted,
        };
        tracing::info!("\n{}", report);

        // 先匯出再更新面板，匯出失敗時畫面維持原狀
        if self.config.export_images() {
            self.export_accepted(position, &tile, &report).await?;
        }

        tracing::info!("🖨️ Updating display");
        self.with_panel(move |display| {
            if display.size() != (layout.width, layout.height) {
                return Err(IssError::DisplayError {
                    message: format!(
                        "layout is {}x{} but the panel is {}x{}",
                        layout.width,
                        layout.height,
                        display.size().0,
                        display.size().1
                    ),
                });
            }

            display.refresh(&frame)
        })
        .await?;

        tracing::info!("Finished printing. Enjoy.");
        Ok(report)
    }

    async fn retire(&self) -> Result<()> {
        tracing::info!("🧹 Wiping the display clean...");
        self.with_panel(|display| display.wipe()).await?;
        tracing::info!("💤 Gone to sleep. Good night.");
        Ok(())
    }
}
