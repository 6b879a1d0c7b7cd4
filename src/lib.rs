pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::cli::{JsonUserTable, LocalObjectStore};
#[cfg(feature = "cli")]
pub use config::CliConfig;

#[cfg(feature = "lambda")]
pub use config::lambda::{DynamoUserTable, LambdaConfig, S3ObjectStore};

pub use crate::core::{
    csv_average::{average_gpa, CsvAverageReducer},
    engine::StatsEngine,
    gpa_pipeline::GpaPipeline,
    min_max::{salary_range, MinMaxReducer},
    salary_pipeline::SalaryPipeline,
};
pub use domain::model::{ObjectLocator, RetrievalStrategy, SalaryRange, UserRecord};
pub use utils::error::{Result, StatsError};
