use crate::core::imaging;
use crate::domain::model::{
    ProcessedTile, ProcessingSettings, RejectReason, TileCoord, TileStats, Verdict,
};
use image::{GrayImage, RgbImage};

/// 四捨五入到整數百分比
fn percentage(count: u32, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    (count as f64 * 100.0 / total as f64).round() as u8
}

/// 量測增強對比後的圖磚；回傳統計數字與 dither 後的版本
pub fn measure(sharp: &GrayImage) -> (TileStats, GrayImage) {
    let (min_luma, max_luma) = imaging::extrema(sharp);
    let dithered = imaging::dither(sharp);
    let bins = imaging::histogram(&dithered);
    let total = dithered.width() as u64 * dithered.height() as u64;

    let stats = TileStats {
        foreground_percentage: percentage(bins[255], total),
        background_percentage: percentage(bins[0], total),
        min_luma,
        max_luma,
        pixel_range: max_luma.saturating_sub(min_luma),
    };
    (stats, dithered)
}

/// 海洋在 e-paper 上很無聊；前景太少或亮度範圍太窄就拒絕
pub fn judge(stats: &TileStats, settings: &ProcessingSettings) -> Verdict {
    if stats.foreground_percentage <= settings.min_foreground_percentage {
        return Verdict::Rejected(RejectReason::SparseForeground {
            percentage: stats.foreground_percentage,
            minimum: settings.min_foreground_percentage,
        });
    }

    if let Some(minimum) = settings.pixel_range_minimum {
        if stats.pixel_range <= minimum {
            return Verdict::Rejected(RejectReason::NarrowPixelRange {
                range: stats.pixel_range,
                minimum,
            });
        }
    }

    Verdict::Accepted
}

/// Runs a decoded tile through luma, contrast, measurement, verdict and the
/// low-zoom inversion.
pub fn process_tile(
    color: RgbImage,
    tile: TileCoord,
    url: String,
    settings: &ProcessingSettings,
) -> ProcessedTile {
    let gray = imaging::to_luma(&color);
    let sharp = imaging::enhance_contrast(&gray, settings.contrast);
    let (stats, dithered) = measure(&sharp);
    let verdict = judge(&stats, settings);

    // 低縮放時海洋可見，反相讓海洋變白、陸地變黑
    let inverted = tile.zoom <= settings.invert_zoom_level;
    let result = if inverted {
        imaging::invert(&sharp)
    } else {
        sharp
    };

    ProcessedTile {
        tile,
        url,
        color,
        result,
        dithered,
        stats,
        inverted,
        verdict,
    }
}
