use crate::core::{DailyRecord, PriceDataset};
use crate::error::{AnalysisError, Result};
use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::info;

/// Header of the price change column.
pub const CHANGE_COLUMN: &str = "daily change";
/// Header of the price level column.
pub const PRICE_COLUMN: &str = "Inflation Adjusted Price";

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Load a price table from a CSV file.
///
/// The first column holds the date, the change and price columns are found
/// by header name and any other column is ignored.
pub fn load_csv(path: impl AsRef<Path>) -> Result<PriceDataset> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| AnalysisError::Io(format!("{}: {}", path.display(), e)))?;
    let dataset = load_reader(file)?;
    info!(
        path = %path.display(),
        rows = dataset.len(),
        first = %dataset.first_date(),
        last = %dataset.last_date(),
        "loaded price table"
    );
    Ok(dataset)
}

/// Load a price table from any reader of CSV text.
pub fn load_reader<R: Read>(reader: R) -> Result<PriceDataset> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let change_index = column_index(&headers, CHANGE_COLUMN)?;
    let price_index = column_index(&headers, PRICE_COLUMN)?;

    let mut records = Vec::new();
    for result in rdr.records() {
        let row = result?;
        let line = row.position().map(|p| p.line()).unwrap_or(0);

        let date = parse_date(field(&row, 0, "date", line)?, line)?;
        let change = parse_number(field(&row, change_index, CHANGE_COLUMN, line)?, CHANGE_COLUMN, line)?;
        let price = parse_number(field(&row, price_index, PRICE_COLUMN, line)?, PRICE_COLUMN, line)?;

        records.push(DailyRecord::new(date, change, price));
    }

    PriceDataset::new(records)
}

fn column_index(headers: &StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| AnalysisError::MissingColumn(name.to_string()))
}

fn field<'a>(row: &'a StringRecord, index: usize, name: &str, line: u64) -> Result<&'a str> {
    match row.get(index) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(AnalysisError::InvalidRecord {
            line,
            message: format!("empty {name} cell"),
        }),
    }
}

fn parse_date(value: &str, line: u64) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(value, DATETIME_FORMAT).map(|dt| dt.date()))
        .map_err(|e| AnalysisError::InvalidRecord {
            line,
            message: format!("invalid date {value:?}: {e}"),
        })
}

fn parse_number(value: &str, name: &str, line: u64) -> Result<f64> {
    value.parse::<f64>().map_err(|e| AnalysisError::InvalidRecord {
        line,
        message: format!("invalid {name} {value:?}: {e}"),
    })
}
