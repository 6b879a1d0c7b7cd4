use crate::config::parse_strategy;
use crate::domain::model::RetrievalStrategy;
use crate::utils::error::{Result, StatsError};
use crate::utils::validation::{validate_path, validate_table_name, validate_url, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatsConfig {
    #[serde(default)]
    pub local: LocalSection,
    #[serde(default)]
    pub users: UsersSection,
    #[serde(default)]
    pub aws: AwsSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocalSection {
    pub base_dir: Option<String>,
    pub users_file: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsersSection {
    pub table: Option<String>,
    pub index: Option<String>,
    pub strategy: Option<String>,
    pub partition_key: Option<String>,
    pub partition_value: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AwsSection {
    pub region: Option<String>,
    pub endpoint_url: Option<String>,
    /// 在 Lambda 截止時間前預留的毫秒數
    pub deadline_margin_ms: Option<u64>,
}

impl StatsConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(StatsError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| StatsError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${AWS_ENDPOINT_URL})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        let re = Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid");

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    pub fn users_strategy(&self) -> Result<RetrievalStrategy> {
        parse_strategy(
            self.users.strategy.as_deref(),
            self.users.partition_key.clone(),
            self.users.partition_value.clone(),
        )
    }
}

impl Validate for StatsConfig {
    fn validate(&self) -> Result<()> {
        if let Some(base_dir) = &self.local.base_dir {
            validate_path("local.base_dir", base_dir)?;
        }
        if let Some(users_file) = &self.local.users_file {
            validate_path("local.users_file", users_file)?;
        }
        if let Some(table) = &self.users.table {
            validate_table_name("users.table", table)?;
        }
        if let Some(index) = &self.users.index {
            validate_table_name("users.index", index)?;
        }
        if let Some(endpoint) = &self.aws.endpoint_url {
            validate_url("aws.endpoint_url", endpoint)?;
        }
        self.users_strategy()?;
        Ok(())
    }
}
