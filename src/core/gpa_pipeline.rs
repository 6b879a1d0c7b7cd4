use crate::core::csv_average::CsvAverageReducer;
use crate::core::deadline::Deadline;
use crate::core::event::decode_object_created;
use crate::domain::ports::{Handler, ObjectStore};
use crate::utils::error::{Result, StatsError};
use async_trait::async_trait;
use serde_json::Value;
use tokio_util::io::SyncIoBridge;

/// avg-csv: 事件 -> 取得物件 -> 計算 GPA 平均
pub struct GpaPipeline<S: ObjectStore> {
    store: S,
}

impl<S: ObjectStore> GpaPipeline<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: ObjectStore> Handler for GpaPipeline<S> {
    type Input = Value;
    type Output = f64;

    fn name(&self) -> &'static str {
        "avg-csv"
    }

    async fn handle(&self, payload: Value, deadline: Deadline) -> Result<f64> {
        tracing::debug!("Triggered by event: {}", payload);

        let locator = decode_object_created(&payload)?;
        tracing::info!(
            "Processing starting with params: bucket name: {}, file name: {}",
            locator.bucket,
            locator.key
        );

        let body = deadline
            .guard("s3:GetObject", self.store.open_object(&locator))
            .await
            .inspect_err(|e| match e {
                StatsError::ObjectNotFound { .. } => tracing::error!(
                    "Can't get object {} from bucket {}. No such key exists.",
                    locator.key,
                    locator.bucket
                ),
                other => tracing::error!("Couldn't get object {}: {}", locator, other),
            })?;

        // csv 為同步 API，在 blocking 執行緒上邊讀邊算
        let reducer = CsvAverageReducer::new(locator.to_string());
        let bridge = SyncIoBridge::new(body);
        let reading = tokio::task::spawn_blocking(move || reducer.reduce(bridge));

        let average = deadline
            .guard("csv:reduce", async {
                reading
                    .await
                    .map_err(|e| StatsError::IoError(std::io::Error::other(e)))?
            })
            .await
            .inspect_err(|e| tracing::error!("Failed to average GPA in {}: {}", locator, e))?;

        tracing::info!("Average GPA for {}: {}", locator, average);
        Ok(average)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::event::S3Event;
    use crate::domain::model::ObjectLocator;
    use crate::domain::ports::ObjectBody;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MemoryStore {
        objects: HashMap<(String, String), Vec<u8>>,
        calls: AtomicUsize,
    }

    impl MemoryStore {
        fn with(bucket: &str, key: &str, body: &str) -> Self {
            let mut objects = HashMap::new();
            objects.insert((bucket.to_string(), key.to_string()), body.as_bytes().to_vec());
            Self {
                objects,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl ObjectStore for MemoryStore {
        async fn open_object(&self, locator: &ObjectLocator) -> Result<ObjectBody> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let data = self
                .objects
                .get(&(locator.bucket.clone(), locator.key.clone()))
                .cloned()
                .ok_or_else(|| StatsError::ObjectNotFound {
                    bucket: locator.bucket.clone(),
                    key: locator.key.clone(),
                })?;
            Ok(Box::pin(std::io::Cursor::new(data)))
        }
    }

    /// 內容分成多段送出，最後以連線中斷結束
    struct ChunkedStore {
        chunks: Vec<&'static [u8]>,
    }

    impl ObjectStore for ChunkedStore {
        async fn open_object(&self, _locator: &ObjectLocator) -> Result<ObjectBody> {
            let mut builder = tokio_test::io::Builder::new();
            for chunk in &self.chunks {
                builder.read(chunk);
            }
            builder.read_error(std::io::Error::other("connection reset"));
            Ok(Box::pin(builder.build()))
        }
    }

    fn event(bucket: &str, key: &str) -> Value {
        serde_json::to_value(S3Event::for_object(bucket, key)).unwrap()
    }

    #[tokio::test]
    async fn test_handle_computes_average() {
        let store = MemoryStore::with("grades", "gpa.csv", "name,GPA\na,3.0\nb,4.0\nc,2.0\n");
        let pipeline = GpaPipeline::new(store);

        let average = pipeline
            .handle(event("grades", "gpa.csv"), Deadline::none())
            .await
            .unwrap();

        assert_eq!(average, 3.0);
    }

    #[tokio::test]
    async fn test_missing_object_is_not_found() {
        let pipeline = GpaPipeline::new(MemoryStore::with("grades", "gpa.csv", "name,GPA\n"));

        let result = pipeline
            .handle(event("grades", "other.csv"), Deadline::none())
            .await;

        match result {
            Err(StatsError::ObjectNotFound { bucket, key }) => {
                assert_eq!(bucket, "grades");
                assert_eq!(key, "other.csv");
            }
            other => panic!("expected not found, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_event_skips_fetch() {
        let store = MemoryStore::with("grades", "gpa.csv", "name,GPA\na,3.0\n");
        let pipeline = GpaPipeline::new(store);

        let result = pipeline
            .handle(serde_json::json!({"Records": []}), Deadline::none())
            .await;

        assert!(matches!(result, Err(StatsError::MalformedEvent { .. })));
        assert_eq!(pipeline.store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_body_is_read_across_chunks() {
        let store = MemoryStore::with(
            "grades",
            "gpa.csv",
            &format!("name,GPA\n{}", "a,3.0\nb,4.0\n".repeat(10_000)),
        );
        let pipeline = GpaPipeline::new(store);

        let average = pipeline
            .handle(event("grades", "gpa.csv"), Deadline::none())
            .await
            .unwrap();

        assert_eq!(average, 3.5);
    }

    #[tokio::test]
    async fn test_interrupted_body_is_io_error() {
        let store = ChunkedStore {
            chunks: vec![b"name,GPA\na,3.", b"0\nb,4.0\n"],
        };
        let pipeline = GpaPipeline::new(store);

        match pipeline
            .handle(event("grades", "gpa.csv"), Deadline::none())
            .await
        {
            Err(StatsError::IoError(e)) => assert!(e.to_string().contains("connection reset")),
            other => panic!("expected I/O error, got {:?}", other),
        }
    }
}
