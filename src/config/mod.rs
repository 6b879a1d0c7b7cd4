pub mod cli;
pub mod lambda;
pub mod toml_config;

use crate::domain::model::RetrievalStrategy;
use crate::utils::error::{Result, StatsError};
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

pub const DEFAULT_USERS_TABLE: &str = "Users";
pub const DEFAULT_SALARY_INDEX: &str = "salary-index";

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "stats")]
#[command(about = "Compute GPA averages and salary ranges from local files")]
pub struct CliConfig {
    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Average the GPA column of a CSV file
    AvgGpa {
        /// CSV file to read directly
        #[arg(long, conflicts_with = "event")]
        file: Option<String>,

        /// S3 notification JSON; the object is looked up as <base-dir>/<bucket>/<key>
        #[arg(long)]
        event: Option<String>,

        #[arg(long)]
        base_dir: Option<String>,
    },
    /// Minimum and maximum salary of a JSON array of user records
    SalaryRange {
        #[arg(long)]
        users: Option<String>,
    },
}

#[cfg(feature = "cli")]
impl crate::utils::validation::Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        use crate::utils::validation::validate_path;

        if let Some(config) = &self.config {
            validate_path("config", config)?;
        }

        match &self.command {
            Command::AvgGpa {
                file,
                event,
                base_dir,
            } => {
                match (file, event) {
                    (Some(file), None) => validate_path("file", file)?,
                    (None, Some(event)) => validate_path("event", event)?,
                    _ => {
                        return Err(StatsError::MissingConfigError {
                            field: "--file or --event".to_string(),
                        })
                    }
                }
                if let Some(base_dir) = base_dir {
                    validate_path("base_dir", base_dir)?;
                }
            }
            Command::SalaryRange { users } => {
                if let Some(users) = users {
                    validate_path("users", users)?;
                }
            }
        }
        Ok(())
    }
}

/// 由設定值組出讀取策略。`index` 策略必須明確指定索引的分割鍵與值
pub fn parse_strategy(
    strategy: Option<&str>,
    partition_key: Option<String>,
    partition_value: Option<String>,
) -> Result<RetrievalStrategy> {
    match strategy.map(str::trim).unwrap_or("scan") {
        "scan" | "full_scan" => Ok(RetrievalStrategy::FullScan),
        "index" | "indexed_query" => {
            let partition_key = partition_key.filter(|k| !k.trim().is_empty()).ok_or_else(|| {
                StatsError::MissingConfigError {
                    field: "partition_key".to_string(),
                }
            })?;
            let partition_value = partition_value
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| StatsError::MissingConfigError {
                    field: "partition_value".to_string(),
                })?;
            Ok(RetrievalStrategy::IndexedQuery {
                partition_key,
                partition_value,
            })
        }
        other => Err(StatsError::InvalidConfigValueError {
            field: "strategy".to_string(),
            value: other.to_string(),
            reason: "Valid strategies: scan, index".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strategy_defaults_to_scan() {
        assert_eq!(parse_strategy(None, None, None).unwrap(), RetrievalStrategy::FullScan);
        assert_eq!(
            parse_strategy(Some("full_scan"), None, None).unwrap(),
            RetrievalStrategy::FullScan
        );
    }

    #[test]
    fn test_index_strategy_requires_partition() {
        assert!(matches!(
            parse_strategy(Some("index"), None, Some("user".to_string())),
            Err(StatsError::MissingConfigError { field }) if field == "partition_key"
        ));
        assert!(matches!(
            parse_strategy(Some("index"), Some("kind".to_string()), Some(" ".to_string())),
            Err(StatsError::MissingConfigError { field }) if field == "partition_value"
        ));

        let strategy =
            parse_strategy(Some("index"), Some("kind".to_string()), Some("user".to_string()))
                .unwrap();
        assert_eq!(
            strategy,
            RetrievalStrategy::IndexedQuery {
                partition_key: "kind".to_string(),
                partition_value: "user".to_string(),
            }
        );
    }

    #[test]
    fn test_unknown_strategy() {
        assert!(matches!(
            parse_strategy(Some("guess"), None, None),
            Err(StatsError::InvalidConfigValueError { .. })
        ));
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_cli_requires_an_input() {
        use crate::utils::validation::Validate;

        let config = CliConfig::try_parse_from(["stats", "avg-gpa"]).unwrap();
        assert!(matches!(
            config.validate(),
            Err(StatsError::MissingConfigError { .. })
        ));

        let config = CliConfig::try_parse_from(["stats", "avg-gpa", "--file", "gpa.csv"]).unwrap();
        assert!(config.validate().is_ok());

        assert!(CliConfig::try_parse_from([
            "stats", "avg-gpa", "--file", "a.csv", "--event", "e.json"
        ])
        .is_err());
    }
}
