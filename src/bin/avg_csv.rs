#[cfg(feature = "lambda")]
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
#[cfg(feature = "lambda")]
use serde_json::Value;
#[cfg(feature = "lambda")]
use stats_lambdas::core::{deadline::Deadline, engine::StatsEngine, gpa_pipeline::GpaPipeline};
#[cfg(feature = "lambda")]
use stats_lambdas::utils::{logger, validation::Validate};
#[cfg(feature = "lambda")]
use stats_lambdas::{LambdaConfig, S3ObjectStore};
#[cfg(feature = "lambda")]
use std::time::{Duration, SystemTime};

#[cfg(feature = "lambda")]
async fn function_handler(
    event: LambdaEvent<Value>,
    engine: &StatsEngine<GpaPipeline<S3ObjectStore>>,
    margin: Duration,
) -> Result<f64, Error> {
    let (payload, context) = event.into_parts();
    tracing::info!("Invocation {} received", context.request_id);

    let deadline_at = SystemTime::UNIX_EPOCH + Duration::from_millis(context.deadline);
    let deadline = Deadline::at_system_time(deadline_at, margin);
    let average = engine.run(payload, deadline).await?;

    Ok(average)
}

#[cfg(feature = "lambda")]
#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_lambda_logger(env!("CARGO_BIN_NAME"));

    let config = LambdaConfig::from_env()?;
    config.validate()?;

    // 客戶端只在冷啟動時建立一次，之後每次呼叫共用
    let sdk_config = config.load_sdk_config().await;
    let store = S3ObjectStore::new(config.s3_client(&sdk_config));
    let engine = StatsEngine::new(GpaPipeline::new(store));
    let margin = config.deadline_margin;

    run(service_fn(|event| function_handler(event, &engine, margin))).await
}
