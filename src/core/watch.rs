use crate::core::engine::PrintEngine;
use crate::core::Pipeline;
use crate::domain::model::PrintOutcome;
use crate::utils::error::Result;
use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchSummary {
    pub printed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub interrupted: bool,
}

impl WatchSummary {
    pub fn editions(&self) -> usize {
        self.printed + self.skipped + self.failed
    }
}

/// 定期重印，最後清空面板避免殘影
pub struct WatchLoop<P: Pipeline> {
    engine: PrintEngine<P>,
    max_refreshes: usize,
    refresh_delay: Duration,
}

impl<P: Pipeline> WatchLoop<P> {
    pub fn new(engine: PrintEngine<P>, max_refreshes: usize, refresh_delay: Duration) -> Self {
        Self {
            engine,
            max_refreshes,
            refresh_delay,
        }
    }

    pub async fn run(&self) -> Result<WatchSummary> {
        self.run_until(std::future::pending()).await
    }

    /// 與 `run` 相同，但 `shutdown` 完成時提前結束（例如 Ctrl-C）
    pub async fn run_until<F>(&self, shutdown: F) -> Result<WatchSummary>
    where
        F: Future<Output = ()>,
    {
        let mut summary = WatchSummary::default();
        tokio::pin!(shutdown);

        for edition in 1..=self.max_refreshes {
            tokio::select! {
                outcome = self.engine.run() => {
                    match outcome {
                        Ok(PrintOutcome::Printed(_)) => summary.printed += 1,
                        Ok(PrintOutcome::Skipped { .. }) => summary.skipped += 1,
                        Err(e) => {
                            if e.is_retryable() {
                                tracing::warn!("⚠️ Edition #{} failed, trying again next edition: {}", edition, e);
                            } else {
                                tracing::error!("❌ Edition #{} failed: {}", edition, e);
                            }
                            summary.failed += 1;
                        }
                    }
                }
                _ = &mut shutdown => {
                    tracing::info!("Interrupted during edition #{}", edition);
                    summary.interrupted = true;
                    break;
                }
            }

            if edition == self.max_refreshes {
                tracing::info!(
                    "That #{} of #{} was the last one. I'm going to sleep...",
                    edition,
                    self.max_refreshes
                );
                break;
            }

            tracing::info!(
                "Printed edition #{} of #{}. Waiting {:?} before continuing...",
                edition,
                self.max_refreshes,
                self.refresh_delay
            );

            tokio::select! {
                _ = tokio::time::sleep(self.refresh_delay) => {}
                _ = &mut shutdown => {
                    tracing::info!("Interrupted while waiting");
                    summary.interrupted = true;
                    break;
                }
            }
        }

        self.engine.pipeline().retire().await?;
        Ok(summary)
    }
}
