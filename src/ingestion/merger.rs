//! Source merging and deduplication

use crate::error::{FlowcastError, Result};
use crate::ingestion::AliasTable;
use crate::series::TransactionRecord;
use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::BTreeMap;
use tracing::debug;

/// Date formats accepted in source cells, tried in order.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y"];

/// Merge the primary (date, amount) source with an optional secondary
/// (date, withdrawal, deposit) source into one deduplicated record set.
///
/// The secondary's amount is `deposit - withdrawal`. Sources concatenate
/// primary-first, and a date present in both keeps the secondary's value:
/// the secondary represents a newer import. Within a single source, later
/// rows likewise overwrite earlier ones. The output is sorted by date but
/// not yet gap-free; see [`crate::series::DailySeries::complete`].
pub fn merge_sources(
    primary: &DataFrame,
    secondary: Option<&DataFrame>,
    aliases: &AliasTable,
) -> Result<Vec<TransactionRecord>> {
    let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();

    for (date, amount) in primary_rows(primary, aliases)? {
        by_date.insert(date, amount);
    }

    if let Some(df) = secondary {
        let mut overlaps = 0usize;
        for (date, amount) in secondary_rows(df, aliases)? {
            if by_date.insert(date, amount).is_some() {
                overlaps += 1;
            }
        }
        if overlaps > 0 {
            debug!(overlaps, "secondary source overwrote primary dates");
        }
    }

    Ok(by_date
        .into_iter()
        .map(|(date, amount)| TransactionRecord { date, amount })
        .collect())
}

fn primary_rows(df: &DataFrame, aliases: &AliasTable) -> Result<Vec<(NaiveDate, f64)>> {
    let headers = column_headers(df);
    let date_col = aliases.resolve("date", &headers)?;
    let amount_col = aliases.resolve("amount", &headers)?;

    let dates = date_column(df, &date_col)?;
    let amounts = numeric_column(df, &amount_col)?;
    Ok(dates.into_iter().zip(amounts).collect())
}

fn secondary_rows(df: &DataFrame, aliases: &AliasTable) -> Result<Vec<(NaiveDate, f64)>> {
    let headers = column_headers(df);
    let date_col = aliases.resolve("date", &headers)?;
    let withdrawal_col = aliases.resolve("withdrawal", &headers)?;
    let deposit_col = aliases.resolve("deposit", &headers)?;

    let dates = date_column(df, &date_col)?;
    let withdrawals = numeric_column(df, &withdrawal_col)?;
    let deposits = numeric_column(df, &deposit_col)?;

    Ok(dates
        .into_iter()
        .zip(withdrawals)
        .zip(deposits)
        .map(|((date, w), d)| (date, d - w))
        .collect())
}

fn column_headers(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|s| s.as_str().to_string())
        .collect()
}

fn date_column(df: &DataFrame, name: &str) -> Result<Vec<NaiveDate>> {
    let series = df.column(name)?.as_materialized_series();
    let chunked = series.str().map_err(|e| FlowcastError::Parse(e.to_string()))?;

    let mut out = Vec::with_capacity(df.height());
    for (idx, cell) in chunked.into_iter().enumerate() {
        let raw = cell.ok_or_else(|| {
            FlowcastError::Parse(format!("null date in column '{}' at row {}", name, idx))
        })?;
        out.push(parse_date(raw)?);
    }
    Ok(out)
}

fn numeric_column(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let series = df.column(name)?.as_materialized_series();
    let casted = series.cast(&DataType::Float64)?;
    let chunked = casted.f64().map_err(|e| FlowcastError::Parse(e.to_string()))?;
    // Null withdrawal/deposit cells mean "no movement", not missing data.
    Ok(chunked.into_iter().map(|v| v.unwrap_or(0.0)).collect())
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    let trimmed = raw.trim();
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Ok(date);
        }
    }
    Err(FlowcastError::Parse(format!("unparseable date '{}'", raw)))
}
