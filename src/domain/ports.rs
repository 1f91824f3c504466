use crate::domain::frame::FrameBuffer;
use crate::domain::model::{
    Composition, DisplayLayout, IssPosition, PrintReport, ProcessedTile, ProcessingSettings,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn iss_endpoint(&self) -> &str;
    fn tile_endpoint(&self) -> &str;
    fn access_token(&self) -> Option<String>;
    fn request_timeout(&self) -> Duration;
    fn processing(&self) -> ProcessingSettings;
    fn layout(&self) -> DisplayLayout;
    fn export_images(&self) -> bool;
}

/// E-paper 面板。SPI 細節留給實作，這裡只描述面板生命週期
pub trait Display: Send + 'static {
    fn size(&self) -> (u32, u32);
    fn init(&mut self) -> Result<()>;
    fn clear(&mut self) -> Result<()>;
    fn show(&mut self, frame: &FrameBuffer) -> Result<()>;
    fn sleep(&mut self) -> Result<()>;

    /// 喚醒、清除、顯示新畫面，最後一定讓面板休眠；回傳第一個錯誤
    fn refresh(&mut self, frame: &FrameBuffer) -> Result<()> {
        let update = self
            .init()
            .and_then(|_| self.clear())
            .and_then(|_| self.show(frame));
        let slept = self.sleep();
        update.and(slept)
    }

    /// 清成全白後休眠，避免殘影
    fn wipe(&mut self) -> Result<()> {
        let cleared = self.init().and_then(|_| self.clear());
        let slept = self.sleep();
        cleared.and(slept)
    }
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn locate(&self) -> Result<IssPosition>;
    /// 由最大縮放等級往下試，直到圖磚通過品質檢查
    async fn compose(&self, position: &IssPosition) -> Result<Composition>;
    async fn publish(&self, position: &IssPosition, tile: ProcessedTile) -> Result<PrintReport>;
    /// 清空並讓面板休眠，避免殘影
    async fn retire(&self) -> Result<()>;
}
