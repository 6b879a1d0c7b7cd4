use crate::core::deadline::Deadline;
use crate::domain::ports::Handler;
use crate::utils::error::Result;
use std::time::Instant;

/// 包裝單次呼叫：記錄開始、結束、耗時與錯誤分類
pub struct StatsEngine<H: Handler> {
    handler: H,
}

impl<H: Handler> StatsEngine<H> {
    pub fn new(handler: H) -> Self {
        Self { handler }
    }

    pub async fn run(&self, input: H::Input, deadline: Deadline) -> Result<H::Output> {
        let started = Instant::now();
        tracing::info!("🚀 Starting {} invocation", self.handler.name());
        if let Some(remaining) = deadline.remaining() {
            tracing::debug!("Time remaining before deadline: {:?}", remaining);
        }

        match self.handler.handle(input, deadline).await {
            Ok(output) => {
                tracing::info!(
                    "✅ {} completed in {:?}",
                    self.handler.name(),
                    started.elapsed()
                );
                Ok(output)
            }
            Err(e) => {
                tracing::error!(
                    "❌ {} failed: {} (Category: {:?}, Severity: {:?})",
                    self.handler.name(),
                    e,
                    e.category(),
                    e.severity()
                );
                tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
                Err(e)
            }
        }
    }
}
