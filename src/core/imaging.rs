//! The handful of image transforms between a satellite tile and a 1-bit
//! e-paper frame.

use crate::domain::model::DisplayLayout;
use image::imageops::{self, BiLevel, FilterType};
use image::{GrayImage, Luma, RgbImage};

/// ITU-R 601-2 luma, in the same fixed point most imaging tools use
pub fn to_luma(color: &RgbImage) -> GrayImage {
    GrayImage::from_fn(color.width(), color.height(), |x, y| {
        let [r, g, b] = color.get_pixel(x, y).0;
        let luma = (r as u32 * 19595 + g as u32 * 38470 + b as u32 * 7471 + 0x8000) >> 16;
        Luma([luma as u8])
    })
}

pub fn mean_luma(gray: &GrayImage) -> u8 {
    let pixels = gray.as_raw();
    if pixels.is_empty() {
        return 0;
    }
    let sum: u64 = pixels.iter().map(|&p| p as u64).sum();
    (sum as f64 / pixels.len() as f64 + 0.5).floor().min(255.0) as u8
}

/// 以平均亮度為中心拉開對比。1.0 不變，3.0 已經相當極端
pub fn enhance_contrast(gray: &GrayImage, factor: f32) -> GrayImage {
    let mean = mean_luma(gray) as f32;
    let mut out = gray.clone();
    for pixel in out.pixels_mut() {
        let value = mean + factor * (pixel[0] as f32 - mean);
        pixel[0] = value.clamp(0.0, 255.0) as u8;
    }
    out
}

/// 最暗與最亮的像素值
pub fn extrema(gray: &GrayImage) -> (u8, u8) {
    gray.as_raw()
        .iter()
        .fold((u8::MAX, u8::MIN), |(lo, hi), &p| (lo.min(p), hi.max(p)))
}

pub fn histogram(gray: &GrayImage) -> [u32; 256] {
    let mut bins = [0u32; 256];
    for &p in gray.as_raw() {
        bins[p as usize] += 1;
    }
    bins
}

pub fn invert(gray: &GrayImage) -> GrayImage {
    let mut out = gray.clone();
    imageops::invert(&mut out);
    out
}

/// Floyd-Steinberg 誤差擴散，輸出只有 0 與 255。
///
/// Values above 127 become white and each diffused error is clamped to the
/// pixel range, so a lone 128 pixel is white.
pub fn dither(gray: &GrayImage) -> GrayImage {
    let mut out = gray.clone();
    imageops::dither(&mut out, &BiLevel);
    out
}

pub fn resize(gray: &GrayImage, width: u32, height: u32) -> GrayImage {
    if gray.dimensions() == (width, height) {
        return gray.clone();
    }
    imageops::resize(gray, width, height, FilterType::Lanczos3)
}

/// 白色畫布，地圖 dither 後貼在指定位置，超出畫布的部分裁掉
pub fn compose_canvas(layout: &DisplayLayout, map: &GrayImage) -> GrayImage {
    let mut canvas = GrayImage::from_pixel(layout.width, layout.height, Luma([255]));
    let dithered = dither(map);
    let (origin_x, origin_y) = layout.map_origin();

    for (x, y, pixel) in dithered.enumerate_pixels() {
        let cx = origin_x + x as i64;
        let cy = origin_y + y as i64;
        if cx < 0 || cy < 0 || cx >= layout.width as i64 || cy >= layout.height as i64 {
            continue;
        }
        canvas.put_pixel(cx as u32, cy as u32, *pixel);
    }
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn split_image(width: u32, height: u32, left: u8, right: u8) -> GrayImage {
        GrayImage::from_fn(width, height, |x, _| {
            if x < width / 2 {
                Luma([left])
            } else {
                Luma([right])
            }
        })
    }

    #[test]
    fn test_luma_weights() {
        let mut color = RgbImage::new(4, 1);
        color.put_pixel(0, 0, Rgb([255, 255, 255]));
        color.put_pixel(1, 0, Rgb([255, 0, 0]));
        color.put_pixel(2, 0, Rgb([0, 255, 0]));
        color.put_pixel(3, 0, Rgb([0, 0, 255]));

        let gray = to_luma(&color);
        assert_eq!(gray.as_raw(), &vec![255, 76, 150, 29]);
    }

    #[test]
    fn test_contrast_identity_and_stretch() {
        let gray = split_image(4, 1, 100, 156);
        assert_eq!(enhance_contrast(&gray, 1.0), gray);

        let sharp = enhance_contrast(&gray, 3.0);
        // mean is 128: 128 + 3 * (100 - 128) = 44, 128 + 3 * 28 = 212
        assert_eq!(sharp.as_raw(), &vec![44, 44, 212, 212]);
    }

    #[test]
    fn test_contrast_clamps() {
        let gray = split_image(2, 1, 0, 255);
        let sharp = enhance_contrast(&gray, 3.0);
        assert_eq!(sharp.as_raw(), &vec![0, 255]);
    }

    #[test]
    fn test_extrema_and_histogram() {
        let gray = GrayImage::from_raw(4, 1, vec![10, 200, 10, 37]).unwrap();
        assert_eq!(extrema(&gray), (10, 200));
        let bins = histogram(&gray);
        assert_eq!(bins[10], 2);
        assert_eq!(bins[200], 1);
        assert_eq!(bins.iter().sum::<u32>(), 4);
    }

    #[test]
    fn test_invert() {
        let gray = GrayImage::from_raw(3, 1, vec![0, 100, 255]).unwrap();
        assert_eq!(invert(&gray).as_raw(), &vec![255, 155, 0]);
    }

    #[test]
    fn test_dither_is_binary_and_preserves_tone() {
        let gray = GrayImage::from_pixel(64, 64, Luma([64]));
        let dithered = dither(&gray);

        assert!(dithered.as_raw().iter().all(|&p| p == 0 || p == 255));
        let white = histogram(&dithered)[255] as f64;
        let share = white / (64.0 * 64.0);
        assert!((share - 0.25).abs() < 0.03, "white share was {}", share);
    }

    #[test]
    fn test_dither_threshold() {
        let dark = GrayImage::from_pixel(1, 1, Luma([127]));
        let light = GrayImage::from_pixel(1, 1, Luma([128]));
        assert_eq!(dither(&dark).as_raw(), &vec![0]);
        assert_eq!(dither(&light).as_raw(), &vec![255]);
    }

    #[test]
    fn test_dither_keeps_pure_black_and_white() {
        let gray = split_image(8, 8, 0, 255);
        assert_eq!(dither(&gray), gray);
    }

    #[test]
    fn test_compose_canvas_places_map() {
        let layout = DisplayLayout {
            width: 20,
            height: 10,
            map_width: 4,
            map_height: 4,
            x_offset: 0,
            y_offset: 1,
        };
        let map = GrayImage::from_pixel(4, 4, Luma([0]));
        let canvas = compose_canvas(&layout, &map);

        assert_eq!(canvas.dimensions(), (20, 10));
        // origin is (8, 4)
        assert_eq!(canvas.get_pixel(8, 4)[0], 0);
        assert_eq!(canvas.get_pixel(11, 7)[0], 0);
        assert_eq!(canvas.get_pixel(7, 4)[0], 255);
        assert_eq!(canvas.get_pixel(8, 3)[0], 255);
        assert_eq!(histogram(&canvas)[0], 16);
    }

    #[test]
    fn test_compose_canvas_clips_overflow() {
        let layout = DisplayLayout {
            width: 4,
            height: 4,
            map_width: 8,
            map_height: 8,
            x_offset: 0,
            y_offset: 0,
        };
        let map = GrayImage::from_pixel(8, 8, Luma([0]));
        let canvas = compose_canvas(&layout, &map);
        assert_eq!(histogram(&canvas)[0], 16);
    }

    #[test]
    fn test_resize_same_size_is_noop() {
        let gray = split_image(6, 6, 0, 255);
        assert_eq!(resize(&gray, 6, 6), gray);
        assert_eq!(resize(&gray, 3, 2).dimensions(), (3, 2));
    }
}
