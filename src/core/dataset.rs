//! Date-indexed daily price records.

use crate::error::{AnalysisError, Result};
use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::ops::Range;
use tracing::warn;

/// One row of the input table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyRecord {
    /// Calendar date, unique within a dataset.
    pub date: NaiveDate,
    /// Price change since the previous observation.
    pub daily_change: f64,
    /// Inflation adjusted price level.
    pub price: f64,
}

impl DailyRecord {
    pub fn new(date: NaiveDate, daily_change: f64, price: f64) -> Self {
        Self {
            date,
            daily_change,
            price,
        }
    }
}

/// An ordered, validated sequence of daily records.
///
/// Dates are strictly increasing and every value is finite. Once built the
/// dataset is never mutated; sub-windows are produced as new datasets.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceDataset {
    records: Vec<DailyRecord>,
}

/// Chronological partition of a dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainTestSplit {
    /// The oldest rows.
    pub train: PriceDataset,
    /// The most recent rows.
    pub test: PriceDataset,
}

impl PriceDataset {
    /// Validate and wrap records.
    pub fn new(records: Vec<DailyRecord>) -> Result<Self> {
        if records.is_empty() {
            return Err(AnalysisError::EmptyData);
        }

        for (index, record) in records.iter().enumerate() {
            if !record.daily_change.is_finite() || !record.price.is_finite() {
                return Err(AnalysisError::InvalidRecord {
                    line: index as u64 + 1,
                    message: format!("non-finite value on {}", record.date),
                });
            }
        }

        if let Some(index) = records.windows(2).position(|w| w[1].date <= w[0].date) {
            return Err(AnalysisError::NonMonotonicDates {
                index: index + 1,
                previous: records[index].date.to_string(),
                current: records[index + 1].date.to_string(),
            });
        }

        Ok(Self { records })
    }

    /// Build a daily dataset from a price path starting at `start`.
    ///
    /// The change of the first row is zero; every later row carries the
    /// difference to its predecessor.
    pub fn from_prices(start: NaiveDate, prices: &[f64]) -> Result<Self> {
        let records = prices
            .iter()
            .enumerate()
            .map(|(i, &price)| {
                let change = if i == 0 { 0.0 } else { price - prices[i - 1] };
                DailyRecord::new(start + Duration::days(i as i64), change, price)
            })
            .collect();
        Self::new(records)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[DailyRecord] {
        &self.records
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.records.iter().map(|r| r.date).collect()
    }

    /// The "daily change" column.
    pub fn changes(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.daily_change).collect()
    }

    /// The "Inflation Adjusted Price" column.
    pub fn prices(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.price).collect()
    }

    pub fn first_price(&self) -> f64 {
        self.records[0].price
    }

    pub fn last_price(&self) -> f64 {
        self.records[self.records.len() - 1].price
    }

    pub fn first_date(&self) -> NaiveDate {
        self.records[0].date
    }

    pub fn last_date(&self) -> NaiveDate {
        self.records[self.records.len() - 1].date
    }

    /// Copy out the rows in `range`.
    pub fn slice(&self, range: Range<usize>) -> Result<Self> {
        if range.start >= range.end || range.end > self.records.len() {
            return Err(AnalysisError::InvalidConfig(format!(
                "row range {}..{} is empty or exceeds {} rows",
                range.start,
                range.end,
                self.records.len()
            )));
        }
        Ok(Self {
            records: self.records[range].to_vec(),
        })
    }

    /// Partition by row count: the oldest `floor(len * fraction)` rows train,
    /// the rest test.
    pub fn split(&self, fraction: f64) -> Result<TrainTestSplit> {
        if !(fraction > 0.0 && fraction < 1.0) {
            return Err(AnalysisError::InvalidConfig(format!(
                "split fraction must lie in (0, 1), got {fraction}"
            )));
        }

        let n = self.records.len();
        let train_len = (n as f64 * fraction).floor() as usize;
        if train_len == 0 {
            return Err(AnalysisError::InvalidConfig(format!(
                "split fraction {fraction} leaves no training rows out of {n}"
            )));
        }
        if train_len == n {
            warn!(rows = n, fraction, "split leaves an empty test set");
        }

        Ok(TrainTestSplit {
            train: Self {
                records: self.records[..train_len].to_vec(),
            },
            test: Self {
                records: self.records[train_len..].to_vec(),
            },
        })
    }
}

impl TrainTestSplit {
    pub fn train_len(&self) -> usize {
        self.train.len()
    }

    pub fn test_len(&self) -> usize {
        self.test.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> PriceDataset {
        PriceDataset::from_prices(
            date(2020, 1, 1),
            &[100.0, 101.0, 99.0, 102.0, 103.0, 101.0, 104.0, 105.0, 103.0, 106.0],
        )
        .unwrap()
    }

    #[test]
    fn from_prices_builds_differences() {
        let ds = sample();
        assert_eq!(ds.len(), 10);
        assert_eq!(
            ds.changes(),
            vec![0.0, 1.0, -2.0, 3.0, 1.0, -2.0, 3.0, 1.0, -2.0, 3.0]
        );
        assert_eq!(ds.first_price(), 100.0);
        assert_eq!(ds.last_price(), 106.0);
        assert_eq!(ds.last_date(), date(2020, 1, 10));
    }

    #[test]
    fn empty_records_rejected() {
        assert_eq!(PriceDataset::new(vec![]), Err(AnalysisError::EmptyData));
    }

    #[test]
    fn duplicate_dates_rejected() {
        let records = vec![
            DailyRecord::new(date(2020, 1, 1), 0.0, 1.0),
            DailyRecord::new(date(2020, 1, 1), 0.5, 1.5),
        ];
        assert!(matches!(
            PriceDataset::new(records),
            Err(AnalysisError::NonMonotonicDates { index: 1, .. })
        ));
    }

    #[test]
    fn unsorted_dates_rejected() {
        let records = vec![
            DailyRecord::new(date(2020, 1, 1), 0.0, 1.0),
            DailyRecord::new(date(2020, 1, 3), 0.5, 1.5),
            DailyRecord::new(date(2020, 1, 2), 0.5, 2.0),
        ];
        let err = PriceDataset::new(records).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::NonMonotonicDates {
                index: 2,
                previous: "2020-01-03".into(),
                current: "2020-01-02".into(),
            }
        );
    }

    #[test]
    fn nan_values_rejected() {
        let records = vec![DailyRecord::new(date(2020, 1, 1), f64::NAN, 1.0)];
        assert!(matches!(
            PriceDataset::new(records),
            Err(AnalysisError::InvalidRecord { .. })
        ));
    }

    #[test]
    fn split_is_chronological() {
        let ds = sample();
        let split = ds.split(0.67).unwrap();

        assert_eq!(split.train_len(), 6);
        assert_eq!(split.test_len(), 4);
        assert_eq!(split.train.first_date(), date(2020, 1, 1));
        assert_eq!(split.test.first_date(), date(2020, 1, 7));
        assert!(split.train.last_date() < split.test.first_date());
    }

    #[test]
    fn split_rejects_out_of_range_fraction() {
        let ds = sample();
        assert!(ds.split(0.0).is_err());
        assert!(ds.split(1.0).is_err());
        assert!(ds.split(f64::NAN).is_err());
    }

    #[test]
    fn split_rejects_empty_train() {
        let ds = sample();
        assert!(matches!(
            ds.split(0.05),
            Err(AnalysisError::InvalidConfig(_))
        ));
    }

    #[test]
    fn slice_bounds_checked() {
        let ds = sample();
        assert_eq!(ds.slice(2..5).unwrap().len(), 3);
        assert!(ds.slice(5..5).is_err());
        assert!(ds.slice(8..11).is_err());
    }
}
