use crate::core::Pipeline;
use crate::domain::model::PrintOutcome;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct PrintEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> PrintEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub fn into_pipeline(self) -> P {
        self.pipeline
    }

    /// 跑一次完整流程：定位、挑圖磚、列印
    pub async fn run(&self) -> Result<PrintOutcome> {
        tracing::info!("🚀 Kicking off at {}", chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC"));

        let position = self.pipeline.locate().await?;
        self.monitor.finish_phase("Locate");

        let composition = self.pipeline.compose(&position).await?;
        self.monitor.finish_phase("Compose");

        let outcome = match composition.accepted {
            Some(tile) => {
                let report = self.pipeline.publish(&position, tile).await?;
                self.monitor.finish_phase("Publish");
                PrintOutcome::Printed(report)
            }
            None => PrintOutcome::Skipped {
                position,
                attempts: composition.attempts,
            },
        };

        self.monitor.log_final_stats();
        Ok(outcome)
    }
}
