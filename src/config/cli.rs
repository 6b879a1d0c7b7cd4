use crate::core::{ObjectBody, ObjectLocator, ObjectStore, UserRecord, UserTable};
use crate::utils::error::{Result, StatsError};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// 以本地目錄模擬 S3: `<base_path>/<bucket>/<key>`
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    base_path: PathBuf,
}

impl LocalObjectStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn path_for(&self, locator: &ObjectLocator) -> PathBuf {
        self.base_path.join(&locator.bucket).join(&locator.key)
    }
}

impl ObjectStore for LocalObjectStore {
    async fn open_object(&self, locator: &ObjectLocator) -> Result<ObjectBody> {
        let full_path = self.path_for(locator);
        tracing::debug!("Opening local object {}", full_path.display());

        let file = tokio::fs::File::open(&full_path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StatsError::ObjectNotFound {
                bucket: locator.bucket.clone(),
                key: locator.key.clone(),
            },
            _ => StatsError::FetchError {
                bucket: locator.bucket.clone(),
                key: locator.key.clone(),
                message: e.to_string(),
            },
        })?;

        Ok(Box::pin(file))
    }
}

/// 讀取 JSON 陣列格式的使用者資料檔
#[derive(Debug, Clone)]
pub struct JsonUserTable {
    path: PathBuf,
    name: String,
}

impl JsonUserTable {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let name = path.display().to_string();
        Self { path, name }
    }
}

impl UserTable for JsonUserTable {
    async fn fetch_users(&self) -> Result<Vec<UserRecord>> {
        let data = tokio::fs::read(&self.path).await?;
        let items: Vec<serde_json::Value> = serde_json::from_slice(&data)?;

        items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                serde_json::from_value::<UserRecord>(item).map_err(|e| StatsError::DecodeError {
                    field: format!("[{}]", index),
                    reason: e.to_string(),
                })
            })
            .collect()
    }

    fn name(&self) -> &str {
        &self.name
    }
}
