use crate::domain::model::{SalaryRange, UserRecord};
use crate::utils::error::{Result, StatsError};

/// 單次線性掃描求出最低與最高薪資。空集合回傳 `EmptyDataset`，不回傳哨兵值
#[derive(Debug, Clone)]
pub struct MinMaxReducer {
    source_name: String,
}

impl MinMaxReducer {
    pub fn new(source_name: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
        }
    }

    pub fn reduce<'a, I>(&self, records: I) -> Result<SalaryRange>
    where
        I: IntoIterator<Item = &'a UserRecord>,
    {
        let mut min_salary = f64::MAX;
        let mut max_salary = f64::MIN;
        let mut seen = 0usize;

        for record in records {
            if record.salary < min_salary {
                min_salary = record.salary;
            }
            if record.salary > max_salary {
                max_salary = record.salary;
            }
            seen += 1;
        }

        if seen == 0 {
            return Err(StatsError::EmptyDataset {
                source_name: self.source_name.clone(),
            });
        }

        tracing::debug!("Scanned {} user records from {}", seen, self.source_name);
        Ok(SalaryRange {
            min_salary,
            max_salary,
        })
    }
}

impl Default for MinMaxReducer {
    fn default() -> Self {
        Self::new("user records")
    }
}

pub fn salary_range<'a, I>(records: I) -> Result<SalaryRange>
where
    I: IntoIterator<Item = &'a UserRecord>,
{
    MinMaxReducer::default().reduce(records)
}
