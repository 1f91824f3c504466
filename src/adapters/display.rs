use crate::domain::frame::FrameBuffer;
use crate::domain::ports::Display;
use crate::utils::error::{IssError, Result};
use image::ImageFormat;
use std::fs;
use std::path::{Path, PathBuf};

pub const FRAME_FILE: &str = "frame.bin";
pub const PREVIEW_FILE: &str = "frame.png";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PanelState {
    Asleep,
    Awake,
}

/// 將畫面寫到磁碟的面板：`frame.bin` 是面板收到的原始位元組，`frame.png` 是預覽。
///
/// The state checks mirror the panel: after `sleep` it has to be woken with
/// `init` before it accepts another frame.
#[derive(Debug)]
pub struct FileDisplay {
    output_dir: PathBuf,
    width: u32,
    height: u32,
    state: PanelState,
    refreshes: usize,
}

impl FileDisplay {
    pub fn new(output_dir: impl Into<PathBuf>, width: u32, height: u32) -> Self {
        Self {
            output_dir: output_dir.into(),
            width,
            height,
            state: PanelState::Asleep,
            refreshes: 0,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn frame_path(&self) -> PathBuf {
        self.output_dir.join(FRAME_FILE)
    }

    pub fn is_awake(&self) -> bool {
        self.state == PanelState::Awake
    }

    /// 畫面刷新次數（含清除）
    pub fn refreshes(&self) -> usize {
        self.refreshes
    }

    /// 讀回目前顯示的畫面
    pub fn current_frame(&self) -> Result<FrameBuffer> {
        let bytes = fs::read(self.frame_path())?;
        FrameBuffer::from_bytes(self.width, self.height, bytes)
    }

    fn ensure_awake(&self, operation: &str) -> Result<()> {
        if self.state != PanelState::Awake {
            return Err(IssError::DisplayError {
                message: format!("cannot {} while the panel is asleep; call init first", operation),
            });
        }
        Ok(())
    }

    fn write_frame(&mut self, frame: &FrameBuffer) -> Result<()> {
        fs::create_dir_all(&self.output_dir)?;
        fs::write(self.frame_path(), frame.as_bytes())?;
        frame
            .to_image()
            .save_with_format(self.output_dir.join(PREVIEW_FILE), ImageFormat::Png)?;
        self.refreshes += 1;
        Ok(())
    }
}

impl Display for FileDisplay {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn init(&mut self) -> Result<()> {
        tracing::debug!("Initialising display at {}", self.output_dir.display());
        fs::create_dir_all(&self.output_dir)?;
        self.state = PanelState::Awake;
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.ensure_awake("clear")?;
        tracing::debug!("Clearing display");
        let blank = FrameBuffer::blank(self.width, self.height);
        self.write_frame(&blank)
    }

    fn show(&mut self, frame: &FrameBuffer) -> Result<()> {
        self.ensure_awake("show a frame")?;
        if (frame.width(), frame.height()) != (self.width, self.height) {
            return Err(IssError::DisplayError {
                message: format!(
                    "frame is {}x{} but the panel is {}x{}",
                    frame.width(),
                    frame.height(),
                    self.width,
                    self.height
                ),
            });
        }
        self.write_frame(frame)
    }

    fn sleep(&mut self) -> Result<()> {
        tracing::debug!("Putting display to sleep");
        self.state = PanelState::Asleep;
        Ok(())
    }
}
