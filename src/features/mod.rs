//! Calendar feature derivation
//!
//! Maps calendar dates to model features: one-hot day-of-week with one
//! reference category dropped, plus raw month and day-of-month. Dropping a
//! dummy avoids the linear dependency that would make the normal-equations
//! solve singular; it is applied uniformly to every model so all of them
//! share one schema. No scaling is applied.

use crate::error::{FlowcastError, Result};
use crate::series::DailySeries;
use chrono::{Datelike, NaiveDate, Weekday};
use ndarray::{Array1, Array2};
use tracing::warn;

/// Week in Monday-first order, the order dummy columns are emitted in.
const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Calendar-derived feature portion of a row, before encoding.
///
/// Stateless and deterministic: the same date always yields the same value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarFeatures {
    pub weekday: Weekday,
    pub month: u32,
    pub day_of_month: u32,
}

/// Derive the feature portion for one calendar date.
pub fn calendar_features(date: NaiveDate) -> CalendarFeatures {
    CalendarFeatures {
        weekday: date.weekday(),
        month: date.month(),
        day_of_month: date.day(),
    }
}

/// The fixed ordered column contract a feature matrix must satisfy.
///
/// Built once from the training dates; every future feature matrix is
/// reconciled against it: dummy categories absent on a future date are
/// zero-filled, weekday categories never observed in training are dropped
/// with a warning.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSchema {
    reference_day: Weekday,
    dummy_days: Vec<Weekday>,
    columns: Vec<String>,
}

impl FeatureSchema {
    /// Fix the schema from the weekday categories observed in training.
    ///
    /// The first observed weekday in Monday-first order becomes the dropped
    /// reference category; the remaining observed weekdays become dummy
    /// columns, followed by `month` and `day_of_month`.
    pub fn from_dates(dates: &[NaiveDate]) -> Result<Self> {
        if dates.is_empty() {
            return Err(FlowcastError::DataShape(
                "cannot build a feature schema from zero dates".to_string(),
            ));
        }

        let mut observed = [false; 7];
        for date in dates {
            observed[date.weekday().num_days_from_monday() as usize] = true;
        }

        let mut seen = WEEK
            .iter()
            .copied()
            .filter(|w| observed[w.num_days_from_monday() as usize]);
        let reference_day = seen.next().ok_or_else(|| {
            FlowcastError::Computation("no weekday observed".to_string())
        })?;
        let dummy_days: Vec<Weekday> = seen.collect();

        let mut columns: Vec<String> =
            dummy_days.iter().map(|w| format!("dow_{}", weekday_label(*w))).collect();
        columns.push("month".to_string());
        columns.push("day_of_month".to_string());

        Ok(Self { reference_day, dummy_days, columns })
    }

    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn reference_day(&self) -> Weekday {
        self.reference_day
    }

    /// Derive a feature matrix for `dates`, aligned to this schema.
    ///
    /// Output column count and order always match [`column_names`]; a
    /// weekday neither the reference nor a dummy column contributes to no
    /// column and is logged as dropped.
    ///
    /// [`column_names`]: Self::column_names
    pub fn derive_matrix(&self, dates: &[NaiveDate]) -> Result<Array2<f64>> {
        let n_cols = self.columns.len();
        let month_col = self.dummy_days.len();
        let day_col = month_col + 1;
        if day_col + 1 != n_cols {
            return Err(FlowcastError::SchemaAlignment(format!(
                "schema lists {} columns but encodes {}",
                n_cols,
                day_col + 1
            )));
        }

        let mut x = Array2::zeros((dates.len(), n_cols));
        for (i, &date) in dates.iter().enumerate() {
            let feats = calendar_features(date);
            if feats.weekday != self.reference_day {
                match self.dummy_days.iter().position(|&w| w == feats.weekday) {
                    Some(j) => x[[i, j]] = 1.0,
                    None => warn!(
                        weekday = weekday_label(feats.weekday),
                        %date,
                        "day-of-week category unseen in training, dropped"
                    ),
                }
            }
            x[[i, month_col]] = feats.month as f64;
            x[[i, day_col]] = feats.day_of_month as f64;
        }
        Ok(x)
    }
}

fn weekday_label(w: Weekday) -> &'static str {
    match w {
        Weekday::Mon => "mon",
        Weekday::Tue => "tue",
        Weekday::Wed => "wed",
        Weekday::Thu => "thu",
        Weekday::Fri => "fri",
        Weekday::Sat => "sat",
        Weekday::Sun => "sun",
    }
}

/// Date-ordered feature matrix with labels, the splitter's input.
#[derive(Debug, Clone)]
pub struct FeatureMatrix {
    pub dates: Vec<NaiveDate>,
    pub x: Array2<f64>,
    pub y: Array1<f64>,
    pub schema: FeatureSchema,
}

/// Build the training feature matrix from a completed daily series.
pub fn build_training_matrix(series: &DailySeries) -> Result<FeatureMatrix> {
    let dates = series.dates();
    let schema = FeatureSchema::from_dates(&dates)?;
    let x = schema.derive_matrix(&dates)?;
    let y = Array1::from_vec(series.amounts());
    Ok(FeatureMatrix { dates, x, y, schema })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::TransactionRecord;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_deriver_is_pure() {
        let a = calendar_features(d(2024, 3, 6));
        let b = calendar_features(d(2024, 3, 6));
        assert_eq!(a, b);
        assert_eq!(a.weekday, Weekday::Wed);
        assert_eq!(a.month, 3);
        assert_eq!(a.day_of_month, 6);
    }

    #[test]
    fn test_full_week_schema_drops_monday() {
        // 2024-03-04 is a Monday; 14 consecutive days observe all weekdays.
        let dates: Vec<NaiveDate> = (0..14).map(|i| d(2024, 3, 4 + i)).collect();
        let schema = FeatureSchema::from_dates(&dates).unwrap();
        assert_eq!(schema.reference_day(), Weekday::Mon);
        assert_eq!(
            schema.column_names(),
            &["dow_tue", "dow_wed", "dow_thu", "dow_fri", "dow_sat", "dow_sun", "month", "day_of_month"]
        );
    }

    #[test]
    fn test_matrix_columns_match_schema_for_any_range() {
        let train: Vec<NaiveDate> = (0..40).map(|i| d(2024, 1, 1) + chrono::Days::new(i)).collect();
        let schema = FeatureSchema::from_dates(&train).unwrap();

        let future: Vec<NaiveDate> = (0..13).map(|i| d(2024, 6, 1) + chrono::Days::new(i)).collect();
        let x = schema.derive_matrix(&future).unwrap();
        assert_eq!(x.ncols(), schema.n_columns());
        assert_eq!(x.nrows(), 13);
    }

    #[test]
    fn test_reference_day_encodes_as_all_zero_dummies() {
        let dates: Vec<NaiveDate> = (0..14).map(|i| d(2024, 3, 4 + i)).collect();
        let schema = FeatureSchema::from_dates(&dates).unwrap();
        // Row 0 is the Monday reference: all six dummies zero.
        let x = schema.derive_matrix(&dates).unwrap();
        for j in 0..6 {
            assert_eq!(x[[0, j]], 0.0);
        }
        // Row 1 (Tuesday) sets exactly the first dummy.
        assert_eq!(x[[1, 0]], 1.0);
        assert_eq!(x.row(1).iter().take(6).sum::<f64>(), 1.0);
    }

    #[test]
    fn test_unseen_category_dropped_not_error() {
        // Train only on Mondays and Tuesdays.
        let train = vec![d(2024, 3, 4), d(2024, 3, 5), d(2024, 3, 11), d(2024, 3, 12)];
        let schema = FeatureSchema::from_dates(&train).unwrap();
        assert_eq!(schema.column_names(), &["dow_tue", "month", "day_of_month"]);

        // A Wednesday has no column; it derives with zero dummies, no error.
        let x = schema.derive_matrix(&[d(2024, 3, 6)]).unwrap();
        assert_eq!(x[[0, 0]], 0.0);
        assert_eq!(x.ncols(), 3);
    }

    #[test]
    fn test_build_training_matrix_shapes() {
        let records = vec![
            TransactionRecord { date: d(2024, 3, 1), amount: 10.0 },
            TransactionRecord { date: d(2024, 3, 20), amount: 4.0 },
        ];
        let series = DailySeries::complete(&records, d(2024, 3, 21)).unwrap();
        let matrix = build_training_matrix(&series).unwrap();
        assert_eq!(matrix.x.nrows(), series.len());
        assert_eq!(matrix.y.len(), series.len());
        assert_eq!(matrix.x.ncols(), matrix.schema.n_columns());
    }
}
