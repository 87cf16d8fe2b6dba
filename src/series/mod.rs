//! Gapless daily series construction
//!
//! Takes the merged, deduplicated transaction set and completes it into a
//! calendar with exactly one row per day. The current day is always excluded:
//! it is still accumulating transactions and training on a partial day would
//! bias every model low.

use crate::error::{FlowcastError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// A single day's net monetary flow
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub date: NaiveDate,
    pub amount: f64,
}

/// Gap-free, uniquely-dated daily sequence of (date, amount)
///
/// Spans `[min_date, today - 1]` inclusive, strictly ascending, with missing
/// days zero-filled. Immutable once built: fields are private and no mutating
/// accessors exist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySeries {
    records: Vec<TransactionRecord>,
}

impl DailySeries {
    /// Complete a sparse, unordered transaction set into a gapless daily
    /// series spanning `[min(date), today - 1]`.
    ///
    /// Rows dated on or after `today` are dropped (partial/future days).
    /// Duplicate dates keep the last value, matching the merger's
    /// overwrite policy. Applying `complete` to an already-complete series
    /// with the same `today` is a fixed point.
    pub fn complete(records: &[TransactionRecord], today: NaiveDate) -> Result<Self> {
        if records.is_empty() {
            return Err(FlowcastError::DataShape(
                "no historical transactions to complete".to_string(),
            ));
        }

        let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        let mut dropped = 0usize;
        for rec in records {
            if rec.date >= today {
                dropped += 1;
                continue;
            }
            by_date.insert(rec.date, rec.amount);
        }
        if dropped > 0 {
            debug!(dropped, %today, "dropped rows dated on or after today");
        }

        let first = match by_date.keys().next() {
            Some(&d) => d,
            None => {
                return Err(FlowcastError::DataShape(format!(
                    "all {} transactions are dated on or after {}",
                    records.len(),
                    today
                )))
            }
        };

        let mut out = Vec::new();
        let mut day = first;
        while day < today {
            let amount = by_date.get(&day).copied().unwrap_or(0.0);
            out.push(TransactionRecord { date: day, amount });
            day = day
                .succ_opt()
                .ok_or_else(|| FlowcastError::Computation("calendar overflow".to_string()))?;
        }

        Ok(Self { records: out })
    }

    /// Build a zero-filled calendar for `[start, end]` inclusive.
    ///
    /// Used for future forecast ranges; rejects an inverted range.
    pub fn span(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(FlowcastError::DataShape(format!(
                "empty date range: {} to {}",
                start, end
            )));
        }
        let mut out = Vec::new();
        let mut day = start;
        while day <= end {
            out.push(TransactionRecord { date: day, amount: 0.0 });
            day = day
                .succ_opt()
                .ok_or_else(|| FlowcastError::Computation("calendar overflow".to_string()))?;
        }
        Ok(Self { records: out })
    }

    /// Complete using the local wall clock for `today`.
    pub fn complete_through_yesterday(records: &[TransactionRecord]) -> Result<Self> {
        Self::complete(records, chrono::Local::now().date_naive())
    }

    pub fn records(&self) -> &[TransactionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.records.first().map(|r| r.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.records.last().map(|r| r.date)
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.records.iter().map(|r| r.date).collect()
    }

    pub fn amounts(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.amount).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_complete_fills_gaps_and_spans_to_yesterday() {
        let records = vec![
            TransactionRecord { date: d(2024, 3, 1), amount: 10.0 },
            TransactionRecord { date: d(2024, 3, 5), amount: -4.0 },
        ];
        let today = d(2024, 3, 10);
        let series = DailySeries::complete(&records, today).unwrap();

        // (yesterday - min_date).days + 1 = (9 - 1) + 1 = 9 rows
        assert_eq!(series.len(), 9);
        assert_eq!(series.first_date(), Some(d(2024, 3, 1)));
        assert_eq!(series.last_date(), Some(d(2024, 3, 9)));
        assert_eq!(series.records()[0].amount, 10.0);
        assert_eq!(series.records()[1].amount, 0.0);
        assert_eq!(series.records()[4].amount, -4.0);

        // strictly ascending, unique, no gaps
        for pair in series.records().windows(2) {
            assert_eq!(pair[0].date.succ_opt().unwrap(), pair[1].date);
        }
    }

    #[test]
    fn test_complete_is_idempotent() {
        let records = vec![
            TransactionRecord { date: d(2024, 3, 1), amount: 10.0 },
            TransactionRecord { date: d(2024, 3, 5), amount: -4.0 },
        ];
        let today = d(2024, 3, 10);
        let once = DailySeries::complete(&records, today).unwrap();
        let twice = DailySeries::complete(once.records(), today).unwrap();
        assert_eq!(once.records(), twice.records());
    }

    #[test]
    fn test_empty_input_rejected() {
        let err = DailySeries::complete(&[], d(2024, 3, 10)).unwrap_err();
        assert!(matches!(err, FlowcastError::DataShape(_)));
    }

    #[test]
    fn test_all_future_rejected() {
        let records = vec![TransactionRecord { date: d(2024, 3, 15), amount: 1.0 }];
        let err = DailySeries::complete(&records, d(2024, 3, 10)).unwrap_err();
        assert!(matches!(err, FlowcastError::DataShape(_)));
    }

    #[test]
    fn test_today_excluded() {
        let records = vec![
            TransactionRecord { date: d(2024, 3, 8), amount: 1.0 },
            TransactionRecord { date: d(2024, 3, 10), amount: 99.0 },
        ];
        let series = DailySeries::complete(&records, d(2024, 3, 10)).unwrap();
        assert_eq!(series.last_date(), Some(d(2024, 3, 9)));
    }

    #[test]
    fn test_single_date_produces_one_row() {
        let records = vec![TransactionRecord { date: d(2024, 3, 9), amount: 5.0 }];
        let series = DailySeries::complete(&records, d(2024, 3, 10)).unwrap();
        assert_eq!(series.len(), 1);
    }

    #[test]
    fn test_span_inclusive_and_rejects_inverted() {
        let cal = DailySeries::span(d(2024, 3, 1), d(2024, 3, 3)).unwrap();
        assert_eq!(cal.len(), 3);
        assert!(DailySeries::span(d(2024, 3, 3), d(2024, 3, 1)).is_err());
    }
}
