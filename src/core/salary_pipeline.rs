use crate::core::deadline::Deadline;
use crate::core::min_max::MinMaxReducer;
use crate::domain::model::SalaryRange;
use crate::domain::ports::{Handler, UserTable};
use crate::utils::error::Result;
use async_trait::async_trait;

/// users-stats: 讀取使用者資料 -> 求薪資最小值與最大值
pub struct SalaryPipeline<T: UserTable> {
    table: T,
}

impl<T: UserTable> SalaryPipeline<T> {
    pub fn new(table: T) -> Self {
        Self { table }
    }
}

#[async_trait]
impl<T: UserTable> Handler for SalaryPipeline<T> {
    type Input = ();
    type Output = SalaryRange;

    fn name(&self) -> &'static str {
        "users-stats"
    }

    async fn handle(&self, _input: (), deadline: Deadline) -> Result<SalaryRange> {
        tracing::info!("Reading user records from {}", self.table.name());

        let users = deadline
            .guard("users:fetch", self.table.fetch_users())
            .await
            .inspect_err(|e| {
                tracing::error!("Failed to read users from {}: {}", self.table.name(), e)
            })?;
        tracing::debug!("Fetched {} user records", users.len());

        let range = MinMaxReducer::new(self.table.name()).reduce(&users)?;

        tracing::info!(
            "Salary range for {}: min {}, max {}",
            self.table.name(),
            range.min_salary,
            range.max_salary
        );
        Ok(range)
    }
}
