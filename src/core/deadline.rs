use crate::utils::error::{Result, StatsError};
use std::future::Future;
use std::time::{Duration, SystemTime};
use tokio::time::{timeout_at, Instant};

/// 呼叫端給定的截止時間。所有會阻塞的外部呼叫都透過 `guard` 執行
#[derive(Debug, Clone, Copy, Default)]
pub struct Deadline(Option<Instant>);

impl Deadline {
    pub fn none() -> Self {
        Self(None)
    }

    pub fn after(budget: Duration) -> Self {
        Self(Some(Instant::now() + budget))
    }

    /// 由 Lambda 的截止時間換算，並預留 `margin` 以便回傳結構化錯誤
    pub fn at_system_time(at: SystemTime, margin: Duration) -> Self {
        let remaining = at
            .duration_since(SystemTime::now())
            .unwrap_or(Duration::ZERO)
            .saturating_sub(margin);
        Self::after(remaining)
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.0
            .map(|at| at.saturating_duration_since(Instant::now()))
    }

    pub async fn guard<T, F>(self, operation: &str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match self.0 {
            None => fut.await,
            Some(at) => timeout_at(at, fut).await.map_err(|_| {
                tracing::error!("⏱️ {} did not finish before the deadline", operation);
                StatsError::Timeout {
                    operation: operation.to_string(),
                }
            })?,
        }
    }
}
