//! Future-date prediction
//!
//! Builds the forecast calendar, derives features aligned to the training
//! schema and queries the trained models for point predictions. Output goes
//! to the external sanitizer/writer as plain in-memory values.

use crate::error::{FlowcastError, Result};
use crate::features::FeatureSchema;
use crate::series::DailySeries;
use crate::training::ModelBank;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Predictions for one model across the whole forecast range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastColumn {
    pub model: String,
    pub values: Vec<f64>,
}

/// Aligned future dates with one prediction column per model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastTable {
    pub dates: Vec<NaiveDate>,
    pub columns: Vec<ForecastColumn>,
}

impl ForecastTable {
    pub fn column(&self, model: &str) -> Option<&ForecastColumn> {
        self.columns.iter().find(|c| c.model == model)
    }
}

/// Predict daily flow for `[today + 1, forecast_end]`.
///
/// Every regression model contributes one column, rounded to 2 decimal
/// places of currency precision. Baselines are excluded from extrapolation
/// unless `include_baselines` is set; even then the seasonal baseline is
/// only included when every future date aligns to a direct prior-period
/// observation, and is skipped with a warning otherwise.
pub fn predict_future(
    history: &DailySeries,
    schema: &FeatureSchema,
    bank: &ModelBank,
    today: NaiveDate,
    forecast_end: NaiveDate,
    include_baselines: bool,
) -> Result<ForecastTable> {
    let start = today
        .succ_opt()
        .ok_or_else(|| FlowcastError::Computation("calendar overflow".to_string()))?;
    if forecast_end < start {
        return Err(FlowcastError::DataShape("empty forecast range".to_string()));
    }

    let first_date = history
        .first_date()
        .ok_or_else(|| FlowcastError::DataShape("no historical data".to_string()))?;

    let calendar = DailySeries::span(start, forecast_end)?;
    let dates = calendar.dates();
    let positions: Vec<usize> = dates
        .iter()
        .map(|d| (*d - first_date).num_days() as usize)
        .collect();

    let x_future = schema.derive_matrix(&dates)?;
    if x_future.ncols() != schema.n_columns() {
        return Err(FlowcastError::SchemaAlignment(format!(
            "future matrix has {} columns, training schema has {}",
            x_future.ncols(),
            schema.n_columns()
        )));
    }

    let mut columns = Vec::new();
    for handle in bank.regression_handles() {
        let preds = handle.predict(&x_future, &positions)?;
        columns.push(ForecastColumn {
            model: handle.name.clone(),
            values: preds.iter().map(|&v| round_currency(v)).collect(),
        });
    }

    if include_baselines {
        for handle in bank.baseline_handles() {
            if let Some(seasonal) = handle.as_seasonal() {
                if !positions.iter().all(|&p| seasonal.is_aligned(p)) {
                    warn!(
                        model = %handle.name,
                        "excluded from extrapolation: forecast range extends past positional alignment"
                    );
                    continue;
                }
            }
            let preds = handle.predict(&x_future, &positions)?;
            columns.push(ForecastColumn {
                model: handle.name.clone(),
                values: preds.iter().map(|&v| round_currency(v)).collect(),
            });
        }
    }

    info!(
        from = %start,
        to = %forecast_end,
        days = dates.len(),
        models = columns.len(),
        "forecast generated"
    );
    Ok(ForecastTable { dates, columns })
}

fn round_currency(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
