use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::error::{Result, StatsError};

/// S3 物件位置 (bucket + key)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectLocator {
    pub bucket: String,
    pub key: String,
}

impl ObjectLocator {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for ObjectLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

/// CSV 的一列資料，`row` 為從 1 開始的資料列編號 (不含標題列)。
/// 儲存原始位元組，只有 GPA 欄位需要是合法的 UTF-8
#[derive(Debug, Clone)]
pub struct GpaRecord {
    pub row: usize,
    pub cells: csv::ByteRecord,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunningAverage {
    pub sum: f64,
    pub count: u64,
}

impl RunningAverage {
    pub fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    pub fn finish(self, source_name: &str) -> Result<f64> {
        if self.count == 0 {
            return Err(StatsError::EmptyDataset {
                source_name: source_name.to_string(),
            });
        }
        Ok(self.sum / self.count as f64)
    }
}

/// 使用者識別碼。資料表中為數字，但也接受字串
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserId {
    Number(i64),
    Text(String),
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserId::Number(n) => write!(f, "{}", n),
            UserId::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub name: String,
    pub surname: String,
    pub position: String,
    pub salary: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryRange {
    pub min_salary: f64,
    pub max_salary: f64,
}

/// 取得使用者資料的方式
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RetrievalStrategy {
    /// 掃描整個資料表後在本地計算
    #[default]
    FullScan,
    /// 透過 salary 索引各查一筆最小值與最大值。
    /// 只有當所有記錄共用同一個索引分割鍵時結果才正確
    IndexedQuery {
        partition_key: String,
        partition_value: String,
    },
}
