pub mod csv_average;
pub mod deadline;
pub mod engine;
pub mod event;
pub mod gpa_pipeline;
pub mod min_max;
pub mod record_decoder;
pub mod salary_pipeline;

pub use crate::domain::model::{ObjectLocator, SalaryRange, UserRecord};
pub use crate::domain::ports::{Handler, ObjectBody, ObjectStore, UserTable};
pub use crate::utils::error::Result;
