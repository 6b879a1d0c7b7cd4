use crate::domain::model::ObjectLocator;
use crate::utils::error::{Result, StatsError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// S3 object-created 通知。只保留我們需要的欄位
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Event {
    #[serde(rename = "Records", default)]
    pub records: Vec<S3EventRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3EventRecord {
    #[serde(rename = "eventName", default, skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,
    pub s3: S3Entity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Entity {
    pub bucket: S3Bucket,
    pub object: S3Object,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Bucket {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Object {
    pub key: String,
}

impl S3Event {
    /// 建立只含一筆記錄的事件，key 會以通知的格式編碼
    pub fn for_object(bucket: &str, key: &str) -> Self {
        Self {
            records: vec![S3EventRecord {
                event_name: Some("ObjectCreated:Put".to_string()),
                s3: S3Entity {
                    bucket: S3Bucket {
                        name: bucket.to_string(),
                    },
                    object: S3Object {
                        key: encode_object_key(key),
                    },
                },
            }],
        }
    }
}

/// 從觸發事件取出第一筆記錄的 bucket 與 key。其餘記錄會被忽略
pub fn decode_object_created(payload: &Value) -> Result<ObjectLocator> {
    let envelope: EventEnvelope =
        serde_json::from_value(payload.clone()).map_err(|e| StatsError::MalformedEvent {
            message: format!("payload is not an S3 notification: {}", e),
        })?;

    let first = envelope
        .records
        .first()
        .ok_or_else(|| StatsError::MalformedEvent {
            message: "Records is empty or missing".to_string(),
        })?;

    if envelope.records.len() > 1 {
        tracing::debug!(
            "Event carries {} records, only the first one is processed",
            envelope.records.len()
        );
    }

    let first: S3EventRecord =
        serde_json::from_value(first.clone()).map_err(|e| StatsError::MalformedEvent {
            message: format!("Records[0] is not an S3 record: {}", e),
        })?;

    if first.s3.bucket.name.is_empty() {
        return Err(StatsError::MalformedEvent {
            message: "Records[0].s3.bucket.name is empty".to_string(),
        });
    }
    if first.s3.object.key.is_empty() {
        return Err(StatsError::MalformedEvent {
            message: "Records[0].s3.object.key is empty".to_string(),
        });
    }

    Ok(ObjectLocator::new(
        first.s3.bucket.name,
        decode_object_key(&first.s3.object.key),
    ))
}

/// 只檢查外層結構；第一筆之後的記錄不需符合 S3 格式
#[derive(Deserialize)]
struct EventEnvelope {
    #[serde(rename = "Records", default)]
    records: Vec<Value>,
}

/// S3 通知中的 key 是 form-urlencoded (空白為 '+')。
/// 原始 key 中的 '&' 與 '=' 一定會被編碼，所以若出現則視為未編碼
fn decode_object_key(raw: &str) -> String {
    if raw.contains('&') || raw.contains('=') {
        return raw.to_string();
    }
    url::form_urlencoded::parse(raw.as_bytes())
        .next()
        .map(|(key, _)| key.into_owned())
        .unwrap_or_else(|| raw.to_string())
}

fn encode_object_key(key: &str) -> String {
    url::form_urlencoded::byte_serialize(key.as_bytes())
        .collect::<String>()
        // 保留路徑分隔符號，與 S3 通知一致
        .replace("%2F", "/")
}
