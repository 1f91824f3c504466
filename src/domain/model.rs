use chrono::{DateTime, Utc};
use image::{GrayImage, RgbImage};
use serde::{Deserialize, Serialize};
use std::fmt;

/// ISS 在某一時刻的位置
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IssPosition {
    pub latitude: f64,
    pub longitude: f64,
    /// open-notify 回傳的 Unix 時間戳
    pub timestamp: Option<i64>,
    pub observed_at: DateTime<Utc>,
}

/// Slippy map 圖磚座標
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
    pub zoom: u8,
}

/// Histogram numbers of a contrast-enhanced tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileStats {
    pub foreground_percentage: u8,
    pub background_percentage: u8,
    pub min_luma: u8,
    pub max_luma: u8,
    pub pixel_range: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    SparseForeground { percentage: u8, minimum: u8 },
    NarrowPixelRange { range: u8, minimum: u8 },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::SparseForeground { percentage, minimum } => write!(
                f,
                "foreground {}% is not above the {}% minimum",
                percentage, minimum
            ),
            RejectReason::NarrowPixelRange { range, minimum } => {
                write!(f, "pixel range {} is not above the {} minimum", range, minimum)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Rejected(RejectReason),
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted)
    }
}

/// 通過或未通過品質檢查的圖磚，以及各版本的影像
#[derive(Debug, Clone)]
pub struct ProcessedTile {
    pub tile: TileCoord,
    pub url: String,
    pub color: RgbImage,
    /// 已增強對比，低縮放時已反相
    pub result: GrayImage,
    /// Dithered contrast-enhanced tile the histogram was taken from
    pub dithered: GrayImage,
    pub stats: TileStats,
    pub inverted: bool,
    pub verdict: Verdict,
}

/// 縮放重試迴圈的結果
#[derive(Debug, Clone)]
pub struct Composition {
    pub accepted: Option<ProcessedTile>,
    pub attempts: usize,
}

/// Image-processing knobs for one print
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingSettings {
    pub contrast: f32,
    pub min_foreground_percentage: u8,
    pub pixel_range_minimum: Option<u8>,
    pub max_zoom: u8,
    pub min_zoom: u8,
    pub invert_zoom_level: u8,
}

impl Default for ProcessingSettings {
    fn default() -> Self {
        Self {
            contrast: 3.0,
            min_foreground_percentage: 18,
            pixel_range_minimum: None,
            max_zoom: 10,
            min_zoom: 5,
            invert_zoom_level: 6,
        }
    }
}

/// 面板尺寸與地圖擺放位置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayLayout {
    pub width: u32,
    pub height: u32,
    pub map_width: u32,
    pub map_height: u32,
    pub x_offset: i32,
    pub y_offset: i32,
}

impl DisplayLayout {
    /// Top-left corner of the map on the canvas
    pub fn map_origin(&self) -> (i64, i64) {
        let x = self.x_offset as i64 + (self.width as i64 - self.map_width as i64) / 2;
        let y = self.y_offset as i64 + (self.height as i64 - self.map_height as i64) / 2;
        (x, y)
    }
}

impl Default for DisplayLayout {
    // Waveshare 7.5" V2 面板，地圖略小於畫面並往下移一點以對齊相框
    fn default() -> Self {
        Self {
            width: 800,
            height: 480,
            map_width: 360,
            map_height: 360,
            x_offset: 0,
            y_offset: 12,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PrintReport {
    pub printed_at: DateTime<Utc>,
    pub position: IssPosition,
    pub tile: TileCoord,
    pub contrast: f32,
    pub stats: TileStats,
    pub inverted: bool,
}

impl PrintReport {
    pub fn timestamp_nice(&self) -> String {
        self.printed_at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
    }
}

impl fmt::Display for PrintReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Printed at:\t{}\nCoordinates:\t{}, {}\nMap zoom:\t{}\nTile name:\t{}, {}\nContrast:\t{}\nForeground:\t{}%\nBackground:\t{}%\nPixel range:\t{}",
            self.timestamp_nice(),
            self.position.latitude,
            self.position.longitude,
            self.tile.zoom,
            self.tile.x,
            self.tile.y,
            self.contrast,
            self.stats.foreground_percentage,
            self.stats.background_percentage,
            self.stats.pixel_range
        )
    }
}

#[derive(Debug, Clone)]
pub enum PrintOutcome {
    Printed(PrintReport),
    /// 所有縮放等級都不夠有趣，保留畫面上原本的內容
    Skipped {
        position: IssPosition,
        attempts: usize,
    },
}
