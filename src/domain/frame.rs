use crate::utils::error::{IssError, Result};
use image::{GrayImage, Luma};

/// 1-bit packed frame in the layout e-paper controllers expect.
///
/// Rows are padded to whole bytes, the most significant bit is the leftmost
/// pixel and a set bit means black ink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    bytes: Vec<u8>,
}

impl FrameBuffer {
    /// 全白畫面
    pub fn blank(width: u32, height: u32) -> Self {
        let len = Self::row_bytes(width) * height as usize;
        Self {
            width,
            height,
            bytes: vec![0x00; len],
        }
    }

    /// 將畫布打包，亮度低於 128 的像素視為黑色
    pub fn pack(canvas: &GrayImage) -> Self {
        let (width, height) = canvas.dimensions();
        let row_bytes = Self::row_bytes(width);
        let mut bytes = vec![0x00; row_bytes * height as usize];

        for (x, y, pixel) in canvas.enumerate_pixels() {
            if pixel[0] < 128 {
                let index = y as usize * row_bytes + (x / 8) as usize;
                bytes[index] |= 0x80 >> (x % 8);
            }
        }

        Self {
            width,
            height,
            bytes,
        }
    }

    pub fn from_bytes(width: u32, height: u32, bytes: Vec<u8>) -> Result<Self> {
        let expected = Self::row_bytes(width) * height as usize;
        if bytes.len() != expected {
            return Err(IssError::ValidationError {
                message: format!(
                    "frame of {}x{} needs {} bytes, got {}",
                    width,
                    height,
                    expected,
                    bytes.len()
                ),
            });
        }
        Ok(Self {
            width,
            height,
            bytes,
        })
    }

    pub fn row_bytes(width: u32) -> usize {
        width.div_ceil(8) as usize
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn is_black(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let index = y as usize * Self::row_bytes(self.width) + (x / 8) as usize;
        self.bytes[index] & (0x80 >> (x % 8)) != 0
    }

    pub fn black_pixels(&self) -> usize {
        (0..self.height)
            .flat_map(|y| (0..self.width).map(move |x| (x, y)))
            .filter(|&(x, y)| self.is_black(x, y))
            .count()
    }

    /// 轉回灰階影像，用於預覽
    pub fn to_image(&self) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| {
            if self.is_black(x, y) {
                Luma([0])
            } else {
                Luma([255])
            }
        })
    }
}
