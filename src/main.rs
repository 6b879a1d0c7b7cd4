use clap::Parser;
use serde_json::Value;
use stats_lambdas::config::toml_config::StatsConfig;
use stats_lambdas::config::Command;
use stats_lambdas::core::{deadline::Deadline, event::S3Event};
use stats_lambdas::utils::error::ErrorSeverity;
use stats_lambdas::utils::{logger, validation::Validate};
use stats_lambdas::{
    CliConfig, GpaPipeline, JsonUserTable, LocalObjectStore, SalaryPipeline, StatsEngine,
    StatsError,
};
use std::path::Path;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting stats CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = run(&config).await {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 建議: {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2, // 外部錯誤，可重試
            ErrorSeverity::High => 1,   // 輸入資料錯誤
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn run(config: &CliConfig) -> Result<(), StatsError> {
    config.validate()?;

    let file_config = match &config.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            let file_config = StatsConfig::from_file(path)?;
            file_config.validate()?;
            file_config
        }
        None => StatsConfig::default(),
    };

    match &config.command {
        Command::AvgGpa {
            file,
            event,
            base_dir,
        } => {
            let (store, payload) = match (file, event) {
                (Some(file), _) => (LocalObjectStore::new(""), event_for_file(file)?),
                (None, Some(event)) => {
                    let base_dir = base_dir
                        .clone()
                        .or_else(|| file_config.local.base_dir.clone())
                        .unwrap_or_else(|| ".".to_string());
                    let payload: Value = serde_json::from_slice(&tokio::fs::read(event).await?)?;
                    (LocalObjectStore::new(base_dir), payload)
                }
                (None, None) => {
                    return Err(StatsError::MissingConfigError {
                        field: "--file or --event".to_string(),
                    })
                }
            };

            let engine = StatsEngine::new(GpaPipeline::new(store));
            let average = engine.run(payload, Deadline::none()).await?;
            println!("{}", average);
        }
        Command::SalaryRange { users } => {
            let users = users
                .clone()
                .or_else(|| file_config.local.users_file.clone())
                .unwrap_or_else(|| "users.json".to_string());

            let engine = StatsEngine::new(SalaryPipeline::new(JsonUserTable::new(users)));
            let range = engine.run((), Deadline::none()).await?;
            println!("{}", serde_json::to_string(&range)?);
        }
    }

    Ok(())
}

/// 將本地檔案包裝成 S3 通知，父目錄當作 bucket
fn event_for_file(file: &str) -> Result<Value, StatsError> {
    let path = Path::new(file);
    let key = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| StatsError::InvalidConfigValueError {
            field: "file".to_string(),
            value: file.to_string(),
            reason: "Path does not name a file".to_string(),
        })?;
    let bucket = match path.parent().and_then(|p| p.to_str()) {
        Some("") | None => ".",
        Some(parent) => parent,
    };

    Ok(serde_json::to_value(S3Event::for_object(bucket, key))?)
}
