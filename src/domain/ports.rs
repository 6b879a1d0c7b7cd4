use crate::core::deadline::Deadline;
use crate::domain::model::{ObjectLocator, UserRecord};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::pin::Pin;
use tokio::io::AsyncRead;

/// 物件內容串流，由 reducer 逐段讀取
pub type ObjectBody = Pin<Box<dyn AsyncRead + Send>>;

/// 物件儲存 (S3 或本地目錄)。找不到物件時必須回傳 `StatsError::ObjectNotFound`。
/// 回傳的串流不會整份載入記憶體
pub trait ObjectStore: Send + Sync {
    fn open_object(
        &self,
        locator: &ObjectLocator,
    ) -> impl std::future::Future<Output = Result<ObjectBody>> + Send;
}

/// 使用者資料表 (DynamoDB 或本地 JSON 檔)
pub trait UserTable: Send + Sync {
    fn fetch_users(&self) -> impl std::future::Future<Output = Result<Vec<UserRecord>>> + Send;

    /// 用於日誌與錯誤訊息
    fn name(&self) -> &str;
}

#[async_trait]
pub trait Handler: Send + Sync {
    type Input: Send;
    type Output: Send;

    fn name(&self) -> &'static str;

    async fn handle(&self, input: Self::Input, deadline: Deadline) -> Result<Self::Output>;
}
