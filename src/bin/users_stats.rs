#[cfg(feature = "lambda")]
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
#[cfg(feature = "lambda")]
use serde_json::Value;
#[cfg(feature = "lambda")]
use stats_lambdas::core::{
    deadline::Deadline, engine::StatsEngine, salary_pipeline::SalaryPipeline,
};
#[cfg(feature = "lambda")]
use stats_lambdas::utils::{logger, validation::Validate};
#[cfg(feature = "lambda")]
use stats_lambdas::{DynamoUserTable, LambdaConfig, SalaryRange};
#[cfg(feature = "lambda")]
use std::time::{Duration, SystemTime};

#[cfg(feature = "lambda")]
async fn function_handler(
    event: LambdaEvent<Value>,
    engine: &StatsEngine<SalaryPipeline<DynamoUserTable>>,
    margin: Duration,
) -> Result<SalaryRange, Error> {
    // 輸入內容不影響結果
    let (_payload, context) = event.into_parts();
    tracing::info!("Invocation {} received", context.request_id);

    let deadline_at = SystemTime::UNIX_EPOCH + Duration::from_millis(context.deadline);
    let deadline = Deadline::at_system_time(deadline_at, margin);
    let range = engine.run((), deadline).await?;

    Ok(range)
}

#[cfg(feature = "lambda")]
#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_lambda_logger(env!("CARGO_BIN_NAME"));

    let config = LambdaConfig::from_env()?;
    config.validate()?;
    tracing::info!(
        "Reading {} with strategy {:?}",
        config.users_table,
        config.strategy
    );

    let sdk_config = config.load_sdk_config().await;
    let table = DynamoUserTable::new(config.dynamo_client(&sdk_config), &config);
    let engine = StatsEngine::new(SalaryPipeline::new(table));
    let margin = config.deadline_margin;

    run(service_fn(|event| function_handler(event, &engine, margin))).await
}
