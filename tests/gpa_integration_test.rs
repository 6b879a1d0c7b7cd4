use anyhow::Result;
use stats_lambdas::core::{deadline::Deadline, event::S3Event};
use stats_lambdas::{GpaPipeline, LocalObjectStore, StatsEngine, StatsError};
use tempfile::TempDir;

fn write_object(dir: &TempDir, bucket: &str, key: &str, body: &str) -> Result<()> {
    let path = dir.path().join(bucket).join(key);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, body)?;
    Ok(())
}

fn notification(bucket: &str, key: &str) -> Result<serde_json::Value> {
    Ok(serde_json::to_value(S3Event::for_object(bucket, key))?)
}

/// 從事件到平均值的完整流程
#[tokio::test]
async fn test_average_from_notification() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_object(
        &temp_dir,
        "grades",
        "2024/fall term.csv",
        "name,GPA\nalice,3.0\nbob,4.0\ncarol,2.0\n",
    )?;

    let engine = StatsEngine::new(GpaPipeline::new(LocalObjectStore::new(temp_dir.path())));
    let average = engine
        .run(notification("grades", "2024/fall term.csv")?, Deadline::none())
        .await?;

    assert_eq!(average, 3.0);
    Ok(())
}

#[tokio::test]
async fn test_raw_notification_payload() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_object(&temp_dir, "grades", "gpa.csv", "student,GPA\nx,3.25\ny,3.75\n")?;

    let payload = serde_json::json!({
        "Records": [{
            "eventVersion": "2.1",
            "eventSource": "aws:s3",
            "awsRegion": "ap-southeast-2",
            "eventName": "ObjectCreated:Put",
            "s3": {
                "s3SchemaVersion": "1.0",
                "bucket": {"name": "grades", "arn": "arn:aws:s3:::grades"},
                "object": {"key": "gpa.csv", "size": 30, "eTag": "abc123"}
            }
        }]
    });

    let engine = StatsEngine::new(GpaPipeline::new(LocalObjectStore::new(temp_dir.path())));
    let average = engine.run(payload, Deadline::none()).await?;

    assert_eq!(average, 3.5);
    Ok(())
}

#[tokio::test]
async fn test_missing_object_is_reported_as_not_found() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let engine = StatsEngine::new(GpaPipeline::new(LocalObjectStore::new(temp_dir.path())));

    let result = engine
        .run(notification("grades", "missing.csv")?, Deadline::none())
        .await;

    match result {
        Err(StatsError::ObjectNotFound { bucket, key }) => {
            assert_eq!(bucket, "grades");
            assert_eq!(key, "missing.csv");
        }
        other => panic!("expected ObjectNotFound, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_invalid_rows_abort_the_invocation() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_object(&temp_dir, "grades", "bad.csv", "name,GPA\na,3.0\nb,abc\nc,4.0\n")?;
    write_object(&temp_dir, "grades", "header.csv", "name,GPA\n")?;
    write_object(&temp_dir, "grades", "schema.csv", "id,Name\n1,3.0\n")?;

    let engine = StatsEngine::new(GpaPipeline::new(LocalObjectStore::new(temp_dir.path())));

    let bad = engine
        .run(notification("grades", "bad.csv")?, Deadline::none())
        .await;
    assert!(matches!(bad, Err(StatsError::ParseError { ref value, .. }) if value == "abc"));

    let header_only = engine
        .run(notification("grades", "header.csv")?, Deadline::none())
        .await;
    assert!(matches!(header_only, Err(StatsError::EmptyDataset { .. })));

    let schema = engine
        .run(notification("grades", "schema.csv")?, Deadline::none())
        .await;
    assert!(matches!(schema, Err(StatsError::SchemaError { .. })));
    Ok(())
}

#[tokio::test]
async fn test_repeated_runs_are_identical() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_object(&temp_dir, "grades", "gpa.csv", "name,GPA\na,3.3\nb,2.7\nc,3.9\n")?;

    let engine = StatsEngine::new(GpaPipeline::new(LocalObjectStore::new(temp_dir.path())));
    let first = engine
        .run(notification("grades", "gpa.csv")?, Deadline::none())
        .await?;
    let second = engine
        .run(notification("grades", "gpa.csv")?, Deadline::none())
        .await?;

    assert_eq!(first.to_bits(), second.to_bits());
    Ok(())
}
