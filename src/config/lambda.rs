#[cfg(feature = "lambda")]
use crate::config::toml_config::StatsConfig;
#[cfg(feature = "lambda")]
use crate::config::{parse_strategy, DEFAULT_SALARY_INDEX, DEFAULT_USERS_TABLE};
#[cfg(feature = "lambda")]
use crate::core::record_decoder::{decode_users, Item};
#[cfg(feature = "lambda")]
use crate::core::{ObjectBody, ObjectLocator, ObjectStore, UserRecord, UserTable};
#[cfg(feature = "lambda")]
use crate::domain::model::RetrievalStrategy;
#[cfg(feature = "lambda")]
use crate::utils::error::{Result, StatsError};
#[cfg(feature = "lambda")]
use aws_config::retry::RetryConfig;
#[cfg(feature = "lambda")]
use aws_config::{BehaviorVersion, SdkConfig};
#[cfg(feature = "lambda")]
use aws_sdk_dynamodb::types::AttributeValue;
#[cfg(feature = "lambda")]
use aws_sdk_dynamodb::Client as DynamoClient;
#[cfg(feature = "lambda")]
use aws_sdk_s3::config::Region;
#[cfg(feature = "lambda")]
use aws_sdk_s3::error::DisplayErrorContext;
#[cfg(feature = "lambda")]
use aws_sdk_s3::operation::get_object::GetObjectError;
#[cfg(feature = "lambda")]
use aws_sdk_s3::Client as S3Client;
#[cfg(feature = "lambda")]
use std::env;
#[cfg(feature = "lambda")]
use std::time::Duration;

#[cfg(feature = "lambda")]
const DEFAULT_DEADLINE_MARGIN_MS: u64 = 200;

#[cfg(feature = "lambda")]
#[derive(Debug, Clone)]
pub struct LambdaConfig {
    pub users_table: String,
    pub salary_index: String,
    pub strategy: RetrievalStrategy,
    pub region: Option<String>,
    pub endpoint_url: Option<String>,
    pub deadline_margin: Duration,
}

#[cfg(feature = "lambda")]
impl LambdaConfig {
    /// 讀取環境變數；若設定 `STATS_CONFIG` 則先載入該 TOML 檔，環境變數優先
    pub fn from_env() -> Result<Self> {
        let file = match env::var("STATS_CONFIG") {
            Ok(path) => Some(StatsConfig::from_file(path)?),
            Err(_) => None,
        };
        Self::from_sources(file.unwrap_or_default(), |key| env::var(key).ok())
    }

    pub fn from_sources<F>(file: StatsConfig, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let users = file.users;
        let strategy = parse_strategy(
            lookup("SALARY_STRATEGY").or(users.strategy).as_deref(),
            lookup("SALARY_INDEX_PARTITION_KEY").or(users.partition_key),
            lookup("SALARY_INDEX_PARTITION_VALUE").or(users.partition_value),
        )?;

        let deadline_margin_ms = match lookup("DEADLINE_MARGIN_MS") {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|_| StatsError::InvalidConfigValueError {
                    field: "DEADLINE_MARGIN_MS".to_string(),
                    value: raw.clone(),
                    reason: "Value must be a whole number of milliseconds".to_string(),
                })?,
            None => file
                .aws
                .deadline_margin_ms
                .unwrap_or(DEFAULT_DEADLINE_MARGIN_MS),
        };

        Ok(Self {
            users_table: lookup("USERS_TABLE")
                .or(users.table)
                .unwrap_or_else(|| DEFAULT_USERS_TABLE.to_string()),
            salary_index: lookup("SALARY_INDEX")
                .or(users.index)
                .unwrap_or_else(|| DEFAULT_SALARY_INDEX.to_string()),
            strategy,
            region: lookup("AWS_REGION").or(file.aws.region),
            endpoint_url: lookup("AWS_ENDPOINT_URL").or(file.aws.endpoint_url),
            deadline_margin: Duration::from_millis(deadline_margin_ms),
        })
    }

    /// 建立共用的 SDK 設定。重試由呼叫端決定，因此關閉 SDK 內建重試
    pub async fn load_sdk_config(&self) -> SdkConfig {
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).retry_config(RetryConfig::disabled());
        if let Some(region) = &self.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(endpoint) = &self.endpoint_url {
            loader = loader.endpoint_url(endpoint.clone());
        }
        loader.load().await
    }

    pub fn s3_client(&self, sdk_config: &SdkConfig) -> S3Client {
        let config = aws_sdk_s3::config::Builder::from(sdk_config)
            // 自訂 endpoint (例如 localstack) 需要 path-style
            .force_path_style(self.endpoint_url.is_some())
            .build();
        S3Client::from_conf(config)
    }

    pub fn dynamo_client(&self, sdk_config: &SdkConfig) -> DynamoClient {
        DynamoClient::new(sdk_config)
    }
}

#[cfg(feature = "lambda")]
impl crate::utils::validation::Validate for LambdaConfig {
    fn validate(&self) -> Result<()> {
        use crate::utils::validation::*;

        validate_table_name("USERS_TABLE", &self.users_table)?;
        validate_table_name("SALARY_INDEX", &self.salary_index)?;

        if let Some(region) = &self.region {
            validate_aws_region("AWS_REGION", region)?;
        }
        if let Some(endpoint) = &self.endpoint_url {
            validate_url("AWS_ENDPOINT_URL", endpoint)?;
        }
        if let RetrievalStrategy::IndexedQuery {
            partition_key,
            partition_value,
        } = &self.strategy
        {
            validate_non_empty_string("SALARY_INDEX_PARTITION_KEY", partition_key)?;
            validate_non_empty_string("SALARY_INDEX_PARTITION_VALUE", partition_value)?;
        }

        tracing::info!("✅ Lambda configuration validation passed");
        Ok(())
    }
}

#[cfg(feature = "lambda")]
fn validate_aws_region(field_name: &str, region: &str) -> Result<()> {
    use crate::utils::validation::validate_non_empty_string;

    validate_non_empty_string(field_name, region)?;

    if !region
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(StatsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: region.to_string(),
            reason: "AWS region can only contain lowercase letters, numbers, and hyphens"
                .to_string(),
        });
    }

    Ok(())
}

#[cfg(feature = "lambda")]
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: S3Client,
}

#[cfg(feature = "lambda")]
impl S3ObjectStore {
    pub fn new(client: S3Client) -> Self {
        Self { client }
    }
}

#[cfg(feature = "lambda")]
impl ObjectStore for S3ObjectStore {
    async fn open_object(&self, locator: &ObjectLocator) -> Result<ObjectBody> {
        let resp = self
            .client
            .get_object()
            .bucket(&locator.bucket)
            .key(&locator.key)
            .send()
            .await
            .map_err(|err| {
                let message = DisplayErrorContext(&err).to_string();
                classify_get_object_error(err.into_service_error(), locator, message)
            })?;

        if let Some(length) = resp.content_length() {
            tracing::debug!("Streaming {} bytes from {}", length, locator);
        }

        // 讀取中斷會以 I/O 錯誤出現在 reducer
        Ok(Box::pin(resp.body.into_async_read()))
    }
}

/// NoSuchKey 必須與其他讀取失敗分開回報
#[cfg(feature = "lambda")]
fn classify_get_object_error(
    err: GetObjectError,
    locator: &ObjectLocator,
    message: String,
) -> StatsError {
    match err {
        GetObjectError::NoSuchKey(_) => StatsError::ObjectNotFound {
            bucket: locator.bucket.clone(),
            key: locator.key.clone(),
        },
        _ => StatsError::FetchError {
            bucket: locator.bucket.clone(),
            key: locator.key.clone(),
            message,
        },
    }
}

#[cfg(feature = "lambda")]
#[derive(Debug, Clone)]
pub struct DynamoUserTable {
    client: DynamoClient,
    table: String,
    index: String,
    strategy: RetrievalStrategy,
}

#[cfg(feature = "lambda")]
impl DynamoUserTable {
    pub fn new(client: DynamoClient, config: &LambdaConfig) -> Self {
        Self {
            client,
            table: config.users_table.clone(),
            index: config.salary_index.clone(),
            strategy: config.strategy.clone(),
        }
    }

    fn query_error(&self, err: impl std::error::Error) -> StatsError {
        StatsError::QueryError {
            table: self.table.clone(),
            message: DisplayErrorContext(err).to_string(),
        }
    }

    async fn scan_all(&self) -> Result<Vec<Item>> {
        let output = self
            .client
            .scan()
            .table_name(&self.table)
            .send()
            .await
            .map_err(|e| self.query_error(e))?;

        if output.last_evaluated_key().is_some() {
            tracing::warn!(
                "Scan of {} returned a partial page; records beyond the first page are not included",
                self.table
            );
        }

        Ok(output.items().to_vec())
    }

    /// 依 salary 索引排序取一筆。`ascending` 為 true 取最小值，false 取最大值
    async fn query_extreme(
        &self,
        partition_key: &str,
        partition_value: &str,
        ascending: bool,
    ) -> Result<Vec<Item>> {
        let output = self
            .client
            .query()
            .table_name(&self.table)
            .index_name(&self.index)
            .key_condition_expression("#pk = :pk")
            .expression_attribute_names("#pk", partition_key)
            .expression_attribute_values(":pk", AttributeValue::S(partition_value.to_string()))
            .scan_index_forward(ascending)
            .limit(1)
            .send()
            .await
            .map_err(|e| self.query_error(e))?;

        Ok(output.items().to_vec())
    }
}

#[cfg(feature = "lambda")]
impl UserTable for DynamoUserTable {
    async fn fetch_users(&self) -> Result<Vec<UserRecord>> {
        let items = match &self.strategy {
            RetrievalStrategy::FullScan => {
                tracing::debug!("Scanning table {}", self.table);
                self.scan_all().await?
            }
            RetrievalStrategy::IndexedQuery {
                partition_key,
                partition_value,
            } => {
                tracing::debug!(
                    "Querying {} on index {} where {} = {}",
                    self.table,
                    self.index,
                    partition_key,
                    partition_value
                );
                let mut items = self
                    .query_extreme(partition_key, partition_value, true)
                    .await?;
                items.extend(
                    self.query_extreme(partition_key, partition_value, false)
                        .await?,
                );
                items
            }
        };

        decode_users(&items)
    }

    fn name(&self) -> &str {
        &self.table
    }
}
