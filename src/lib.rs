//! flowcast - daily cash-flow forecasting engine
//!
//! This crate turns historical dated transaction records into ranked daily
//! forecasts:
//! - Source merging with alias-tolerant column resolution
//! - Gapless daily calendar completion
//! - Calendar feature derivation against a fixed schema
//! - Leakage-free chronological train/test splitting
//! - Multi-model training (regressors plus naive baselines)
//! - Cross-model scoring and ranking
//! - Aligned future-date prediction
//!
//! # Modules
//!
//! - [`ingestion`] - Source merging and deduplication
//! - [`series`] - Gapless daily series construction
//! - [`features`] - Calendar features and the schema contract
//! - [`split`] - Chronological train/test split
//! - [`training`] - Model bank: regressors and baselines
//! - [`evaluation`] - Metrics, records and the ranked comparison table
//! - [`forecast`] - Future-date point predictions
//!
//! Reading inputs, sanitizing outputs and loading configuration are the
//! caller's concern; this crate only consumes and produces in-memory values.
//!
//! # Pipeline
//!
//! ```no_run
//! use flowcast::prelude::*;
//! use polars::prelude::*;
//!
//! fn run(primary: &DataFrame, today: chrono::NaiveDate) -> flowcast::Result<()> {
//!     let records = merge_sources(primary, None, &AliasTable::default())?;
//!     let series = DailySeries::complete(&records, today)?;
//!     let matrix = build_training_matrix(&series)?;
//!     let split = chronological_split(&matrix, &SplitConfig::default())?;
//!     let bank = ModelBank::train(&split, &ModelBankConfig::default())?;
//!     let evaluation = evaluate(&bank, &split)?;
//!     let end = today + chrono::Days::new(30);
//!     let table = predict_future(&series, &matrix.schema, &bank, today, end, false)?;
//!     println!("best model: {}", evaluation.comparison[0].model);
//!     println!("first prediction: {:?}", table.columns[0].values[0]);
//!     Ok(())
//! }
//! ```

pub mod error;

pub mod evaluation;
pub mod features;
pub mod forecast;
pub mod ingestion;
pub mod series;
pub mod split;
pub mod training;

pub use error::{FlowcastError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{FlowcastError, Result};

    pub use crate::ingestion::{merge_sources, AliasTable};

    pub use crate::series::{DailySeries, TransactionRecord};

    pub use crate::features::{build_training_matrix, FeatureMatrix, FeatureSchema};

    pub use crate::split::{chronological_split, SplitConfig, TrainTestSplit};

    pub use crate::training::{
        ModelBank, ModelBankConfig, ModelCategory, ModelHandle, SkippedModel,
    };

    pub use crate::evaluation::{
        evaluate, ComparisonRow, Evaluation, EvaluationRecord, RegressionMetrics, SplitLabel,
    };

    pub use crate::forecast::{predict_future, ForecastColumn, ForecastTable};
}
