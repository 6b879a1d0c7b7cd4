use crate::domain::model::{GpaRecord, RunningAverage};
use crate::utils::error::{Result, StatsError};
use std::io::Read;

pub const GPA_COLUMN: usize = 1;
pub const GPA_HEADER: &str = "GPA";

/// 計算 CSV 第二欄 (GPA) 的平均值。輸入串流由呼叫端負責關閉
#[derive(Debug, Clone)]
pub struct CsvAverageReducer {
    source_name: String,
}

impl CsvAverageReducer {
    pub fn new(source_name: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
        }
    }

    pub fn reduce<R: Read>(&self, reader: R) -> Result<f64> {
        let rows = GpaRows::open(reader)?;

        let mut average = RunningAverage::default();
        for record in rows {
            let record = record?;
            average.push(parse_gpa(&record)?);
        }

        tracing::debug!(
            "Accumulated {} GPA rows from {}",
            average.count,
            self.source_name
        );
        average.finish(&self.source_name)
    }
}

impl Default for CsvAverageReducer {
    fn default() -> Self {
        Self::new("csv input")
    }
}

pub fn average_gpa<R: Read>(reader: R) -> Result<f64> {
    CsvAverageReducer::default().reduce(reader)
}

/// 驗證標題列後逐列讀取資料，只能往前走一次
pub struct GpaRows<R: Read> {
    records: csv::ByteRecordsIntoIter<R>,
    row: usize,
}

impl<R: Read> GpaRows<R> {
    pub fn open(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let header = csv_reader.headers().map_err(|e| StatsError::SchemaError {
            message: format!("failed to read header: {}", e),
        })?;

        match header.get(GPA_COLUMN) {
            Some(GPA_HEADER) => {}
            Some(other) => {
                return Err(StatsError::SchemaError {
                    message: format!(
                        "CSV file must have {} as the second column, found {:?}",
                        GPA_HEADER, other
                    ),
                })
            }
            None => {
                return Err(StatsError::SchemaError {
                    message: format!(
                        "CSV file must have {} as the second column, header has {} column(s)",
                        GPA_HEADER,
                        header.len()
                    ),
                })
            }
        }

        Ok(Self {
            records: csv_reader.into_byte_records(),
            row: 0,
        })
    }
}

impl<R: Read> Iterator for GpaRows<R> {
    type Item = Result<GpaRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.records.next()?;
        self.row += 1;
        let row = self.row;

        Some(
            next.map(|cells| GpaRecord { row, cells })
                .map_err(|e| row_error(row, e)),
        )
    }
}

/// 串流中斷回報為 I/O 錯誤；其餘讀取錯誤附上在檔案中的位置
fn row_error(row: usize, e: csv::Error) -> StatsError {
    let value = match e.position() {
        Some(pos) => format!("<line {}, byte {}>", pos.line(), pos.byte()),
        None => "<unreadable>".to_string(),
    };
    let reason = format!("failed to read row: {}", e);

    match e.into_kind() {
        csv::ErrorKind::Io(io) => StatsError::IoError(io),
        _ => StatsError::ParseError { row, value, reason },
    }
}

fn parse_gpa(record: &GpaRecord) -> Result<f64> {
    let cell = record
        .cells
        .get(GPA_COLUMN)
        .ok_or_else(|| StatsError::ParseError {
            row: record.row,
            value: record
                .cells
                .iter()
                .map(String::from_utf8_lossy)
                .collect::<Vec<_>>()
                .join(","),
            reason: format!("expected at least 2 columns, found {}", record.cells.len()),
        })?;

    let raw = std::str::from_utf8(cell).map_err(|e| StatsError::ParseError {
        row: record.row,
        value: String::from_utf8_lossy(cell).into_owned(),
        reason: format!("GPA cell is not valid UTF-8: {}", e),
    })?;

    let value: f64 = raw.parse().map_err(|e| StatsError::ParseError {
        row: record.row,
        value: raw.to_string(),
        reason: format!("{}", e),
    })?;

    if !value.is_finite() {
        return Err(StatsError::ParseError {
            row: record.row,
            value: raw.to_string(),
            reason: "GPA must be a finite number".to_string(),
        });
    }

    Ok(value)
}
