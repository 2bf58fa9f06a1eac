//! Exploratory summaries and price regression over the dataset.
//!
//! These work on the same normalized [`Record`]s the QA pipeline indexes.
//! Cells that do not parse as numbers are skipped rather than treated as
//! errors; real exports are full of `n/a` and blanks.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::Serialize;
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;

use crate::document::Record;
use crate::error::{RagError, Result};

/// Count distinct values of `field`, most frequent first, ties by value.
pub fn value_counts(records: &[Record], field: &str) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in records.iter().filter_map(|r| r.get(field)) {
        *counts.entry(value).or_default() += 1;
    }
    let mut counts: Vec<(String, usize)> =
        counts.into_iter().map(|(value, count)| (value.to_string(), count)).collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts
}

/// The `n` most frequent values of `field`.
pub fn top_n(records: &[Record], field: &str, n: usize) -> Vec<(String, usize)> {
    let mut counts = value_counts(records, field);
    counts.truncate(n);
    counts
}

/// Descriptive statistics for one numeric column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NumericSummary {
    /// Number of numeric cells.
    pub count: usize,
    /// Arithmetic mean.
    pub mean: f64,
    /// Sample standard deviation (0 for a single value).
    pub std: f64,
    /// Smallest value.
    pub min: f64,
    /// Largest value.
    pub max: f64,
}

/// Summarize the numeric cells of `field`. `None` if there are none.
pub fn summarize(records: &[Record], field: &str) -> Option<NumericSummary> {
    let values: Vec<f64> = records.iter().filter_map(|r| r.numeric(field)).collect();
    if values.is_empty() {
        return None;
    }

    let count = values.len();
    let mean = mean(&values);
    let std = if count > 1 {
        (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64).sqrt()
    } else {
        0.0
    };
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    Some(NumericSummary { count, mean, std, min, max })
}

/// `(feature, target)` pairs from rows where both cells are numeric.
pub fn paired_values(records: &[Record], feature: &str, target: &str) -> Vec<(f64, f64)> {
    records.iter().filter_map(|r| Some((r.numeric(feature)?, r.numeric(target)?))).collect()
}

/// Pearson correlation of two numeric columns.
///
/// `None` with fewer than two complete rows or zero variance in either column.
pub fn correlation(records: &[Record], a: &str, b: &str) -> Option<f64> {
    let pairs = paired_values(records, a, b);
    if pairs.len() < 2 {
        return None;
    }
    let (xs, ys): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
    let (mx, my) = (mean(&xs), mean(&ys));

    let cov: f64 = xs.iter().zip(&ys).map(|(x, y)| (x - mx) * (y - my)).sum();
    let vx: f64 = xs.iter().map(|x| (x - mx).powi(2)).sum();
    let vy: f64 = ys.iter().map(|y| (y - my).powi(2)).sum();
    if vx == 0.0 || vy == 0.0 {
        return None;
    }
    Some(cov / (vx.sqrt() * vy.sqrt()))
}

/// Fields where most present cells parse as numbers, in name order.
pub fn numeric_columns(records: &[Record]) -> Vec<String> {
    let names: BTreeSet<&str> = records.iter().flat_map(|r| r.iter().map(|(k, _)| k)).collect();
    names
        .into_iter()
        .filter(|name| {
            let present = records.iter().filter(|r| r.get(name).is_some()).count();
            let numeric = records.iter().filter(|r| r.numeric(name).is_some()).count();
            numeric > 0 && numeric * 2 >= present
        })
        .map(str::to_string)
        .collect()
}

/// Pairwise Pearson correlations of several numeric columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    /// Column names; row and column order of `values`.
    pub columns: Vec<String>,
    /// `values[i][j]` correlates `columns[i]` with `columns[j]`. `None` where
    /// [`correlation`] is undefined.
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    /// Correlation of two named columns, if both are in the matrix.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.values[i][j]
    }
}

/// Correlate every pair of `columns`.
pub fn correlation_matrix(records: &[Record], columns: &[&str]) -> CorrelationMatrix {
    let values = columns
        .iter()
        .map(|a| columns.iter().map(|b| correlation(records, a, b)).collect())
        .collect();
    CorrelationMatrix { columns: columns.iter().map(|c| c.to_string()).collect(), values }
}

/// Equal-width binned counts of one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    /// Lower edge of the first bin.
    pub start: f64,
    /// Width of every bin.
    pub bin_width: f64,
    /// Values per bin. The last bin includes its upper edge.
    pub counts: Vec<usize>,
}

impl Histogram {
    /// The `counts.len() + 1` bin edges.
    pub fn edges(&self) -> Vec<f64> {
        (0..=self.counts.len()).map(|i| self.start + self.bin_width * i as f64).collect()
    }
}

/// Bin the numeric cells of `field` into `bins` equal-width bins spanning
/// the observed range. A constant column spans `value ± 0.5`.
///
/// `None` if the column has no numeric cells.
///
/// # Errors
///
/// Returns [`RagError::Configuration`] if `bins` is zero.
pub fn histogram(records: &[Record], field: &str, bins: usize) -> Result<Option<Histogram>> {
    if bins == 0 {
        return Err(RagError::Configuration("histogram needs at least one bin".to_string()));
    }
    let Some(summary) = summarize(records, field) else {
        return Ok(None);
    };

    let (start, end) = if summary.min == summary.max {
        (summary.min - 0.5, summary.max + 0.5)
    } else {
        (summary.min, summary.max)
    };
    let bin_width = (end - start) / bins as f64;

    let mut counts = vec![0; bins];
    for value in records.iter().filter_map(|r| r.numeric(field)) {
        let bin = (((value - start) / bin_width) as usize).min(bins - 1);
        counts[bin] += 1;
    }
    Ok(Some(Histogram { start, bin_width, counts }))
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Rows partitioned into training and test sets.
#[derive(Debug, Clone, PartialEq)]
pub struct Split<T> {
    /// Training rows.
    pub train: Vec<T>,
    /// Held-out rows.
    pub test: Vec<T>,
}

/// Shuffle `rows` with a seeded RNG and hold out `ceil(len * test_size)`.
///
/// The same seed always produces the same split.
///
/// # Errors
///
/// Returns [`RagError::Configuration`] if `test_size` is outside (0, 1) or
/// either side of the split would be empty.
pub fn train_test_split<T: Clone>(rows: &[T], test_size: f64, seed: u64) -> Result<Split<T>> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(RagError::Configuration(format!(
            "test_size must be between 0 and 1, got {test_size}"
        )));
    }

    let test_len = (rows.len() as f64 * test_size).ceil() as usize;
    if test_len == 0 || test_len >= rows.len() {
        return Err(RagError::Configuration(format!(
            "cannot split {} rows with test_size {test_size}",
            rows.len()
        )));
    }

    let mut shuffled = rows.to_vec();
    shuffled.shuffle(&mut StdRng::seed_from_u64(seed));
    let train = shuffled.split_off(test_len);
    Ok(Split { train, test: shuffled })
}

/// Error metrics of a fitted model on held-out data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegressionMetrics {
    /// Mean squared error.
    pub mse: f64,
    /// Mean absolute error.
    pub mae: f64,
    /// Coefficient of determination.
    pub r2: f64,
    /// Root mean squared error.
    pub rmse: f64,
}

impl RegressionMetrics {
    /// Score `predicted` against `actual`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Configuration`] if the slices are empty or differ
    /// in length.
    pub fn score(actual: &[f64], predicted: &[f64]) -> Result<Self> {
        if actual.is_empty() || actual.len() != predicted.len() {
            return Err(RagError::Configuration(format!(
                "cannot score {} predictions against {} values",
                predicted.len(),
                actual.len()
            )));
        }

        let n = actual.len() as f64;
        let residuals: Vec<f64> = actual.iter().zip(predicted).map(|(y, p)| y - p).collect();
        let mse = residuals.iter().map(|r| r * r).sum::<f64>() / n;
        let mae = residuals.iter().map(|r| r.abs()).sum::<f64>() / n;

        let my = mean(actual);
        let ss_tot: f64 = actual.iter().map(|y| (y - my).powi(2)).sum();
        let ss_res = mse * n;
        let r2 = if ss_tot == 0.0 {
            if ss_res == 0.0 { 1.0 } else { 0.0 }
        } else {
            1.0 - ss_res / ss_tot
        };

        Ok(Self { mse, mae, r2, rmse: mse.sqrt() })
    }
}

/// A `(features, target)` training row.
pub type FeatureRow = (Vec<f64>, f64);

/// Rows where every column in `features` and `target` is numeric.
pub fn feature_rows(records: &[Record], features: &[&str], target: &str) -> Vec<FeatureRow> {
    records
        .iter()
        .filter_map(|r| {
            let xs = features.iter().map(|f| r.numeric(f)).collect::<Option<Vec<f64>>>()?;
            Some((xs, r.numeric(target)?))
        })
        .collect()
}

/// Common width of `rows`, which must be non-empty with at least one feature.
fn feature_width(rows: &[FeatureRow], min_rows: usize) -> Result<usize> {
    if rows.len() < min_rows {
        return Err(RagError::Configuration(format!(
            "need at least {min_rows} rows to fit, got {}",
            rows.len()
        )));
    }
    let width = rows[0].0.len();
    if width == 0 {
        return Err(RagError::Configuration("at least one feature is required".to_string()));
    }
    if rows.iter().any(|(xs, _)| xs.len() != width) {
        return Err(RagError::Configuration("rows have differing feature counts".to_string()));
    }
    Ok(width)
}

/// A fitted model that predicts a target from feature rows.
pub trait Regressor {
    /// Number of features each row must carry.
    fn feature_count(&self) -> usize;

    /// Predict one target per row.
    fn predict_rows(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>>;

    /// Score the model on held-out rows.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Configuration`] if `rows` is empty or a row has the
    /// wrong number of features.
    fn evaluate(&self, rows: &[FeatureRow]) -> Result<RegressionMetrics> {
        if rows.is_empty() {
            return Err(RagError::Configuration("cannot evaluate on zero rows".to_string()));
        }
        if rows.iter().any(|(xs, _)| xs.len() != self.feature_count()) {
            return Err(RagError::Configuration(format!(
                "model expects {} features per row",
                self.feature_count()
            )));
        }
        let xs: Vec<Vec<f64>> = rows.iter().map(|(xs, _)| xs.clone()).collect();
        let actual: Vec<f64> = rows.iter().map(|(_, y)| *y).collect();
        RegressionMetrics::score(&actual, &self.predict_rows(&xs)?)
    }
}

/// Ordinary least-squares fit of `y = coefficients · x + intercept`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinearRegression {
    /// One coefficient per feature, in feature order.
    pub coefficients: Vec<f64>,
    /// Fitted intercept.
    pub intercept: f64,
}

impl LinearRegression {
    /// Fit on `(features, y)` rows by solving the centered normal equations.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Configuration`] with fewer than two rows, ragged
    /// rows, or when the features are constant or collinear.
    pub fn fit(rows: &[FeatureRow]) -> Result<Self> {
        let width = feature_width(rows, 2)?;
        let n = rows.len() as f64;

        let mx: Vec<f64> =
            (0..width).map(|j| rows.iter().map(|(xs, _)| xs[j]).sum::<f64>() / n).collect();
        let my = rows.iter().map(|(_, y)| y).sum::<f64>() / n;

        // Augmented system [Sxx | Sxy].
        let mut system = vec![vec![0.0; width + 1]; width];
        for (xs, y) in rows {
            for i in 0..width {
                let di = xs[i] - mx[i];
                for j in 0..width {
                    system[i][j] += di * (xs[j] - mx[j]);
                }
                system[i][width] += di * (y - my);
            }
        }

        let coefficients = solve(system).ok_or_else(|| {
            RagError::Configuration("features are constant or collinear".to_string())
        })?;
        let intercept = my - coefficients.iter().zip(&mx).map(|(b, m)| b * m).sum::<f64>();
        Ok(Self { coefficients, intercept })
    }

    /// Predict `y` for one feature row.
    pub fn predict(&self, xs: &[f64]) -> f64 {
        self.coefficients.iter().zip(xs).map(|(b, x)| b * x).sum::<f64>() + self.intercept
    }
}

impl Regressor for LinearRegression {
    fn feature_count(&self) -> usize {
        self.coefficients.len()
    }

    fn predict_rows(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>> {
        Ok(rows.iter().map(|xs| self.predict(xs)).collect())
    }
}

/// Gauss-Jordan elimination with partial pivoting on an augmented matrix.
///
/// `None` when the system is singular.
fn solve(mut m: Vec<Vec<f64>>) -> Option<Vec<f64>> {
    let n = m.len();
    let scale = (0..n).map(|i| m[i][i].abs()).fold(0.0, f64::max);
    if scale == 0.0 {
        return None;
    }

    for col in 0..n {
        let pivot = (col..n).max_by(|&a, &b| m[a][col].abs().total_cmp(&m[b][col].abs()))?;
        if m[pivot][col].abs() <= scale * 1e-12 {
            return None;
        }
        m.swap(col, pivot);

        let p = m[col][col];
        for v in &mut m[col][col..] {
            *v /= p;
        }
        for row in 0..n {
            if row != col {
                let factor = m[row][col];
                if factor != 0.0 {
                    for k in col..=n {
                        m[row][k] -= factor * m[col][k];
                    }
                }
            }
        }
    }
    Some(m.into_iter().map(|row| row[n]).collect())
}

type Forest = RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

/// Bootstrap-aggregated regression trees.
pub struct RandomForest {
    forest: Forest,
    feature_count: usize,
}

impl RandomForest {
    /// Trees grown when none is specified.
    pub const DEFAULT_TREES: u16 = 100;

    /// Grow `n_trees` trees on `rows`. The same seed grows the same forest.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Configuration`] with fewer than two rows, ragged
    /// rows, zero trees, or if the underlying fit fails.
    pub fn fit(rows: &[FeatureRow], n_trees: u16, seed: u64) -> Result<Self> {
        let feature_count = feature_width(rows, 2)?;
        if n_trees == 0 {
            return Err(RagError::Configuration("a forest needs at least one tree".to_string()));
        }

        let matrix: Vec<Vec<f64>> = rows.iter().map(|(xs, _)| xs.clone()).collect();
        let targets: Vec<f64> = rows.iter().map(|(_, y)| *y).collect();
        let parameters = RandomForestRegressorParameters::default()
            .with_n_trees(n_trees.into())
            .with_seed(seed);

        let forest = Forest::fit(&DenseMatrix::from_2d_vec(&matrix), &targets, parameters)
            .map_err(|e| RagError::Configuration(format!("random forest fit failed: {e}")))?;
        Ok(Self { forest, feature_count })
    }
}

impl fmt::Debug for RandomForest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RandomForest").field("feature_count", &self.feature_count).finish()
    }
}

impl Regressor for RandomForest {
    fn feature_count(&self) -> usize {
        self.feature_count
    }

    fn predict_rows(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        self.forest
            .predict(&DenseMatrix::from_2d_vec(&rows.to_vec()))
            .map_err(|e| RagError::Configuration(format!("random forest prediction failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fleet() -> Vec<Record> {
        vec![
            Record::vehicle("Tesla", "Model 3", "RWD", 500.0, 45000.0),
            Record::vehicle("Tesla", "Model Y", "AWD", 530.0, 52000.0),
            Record::vehicle("Kia", "EV6", "AWD", 480.0, 50000.0),
            Record::vehicle("BYD", "Dolphin", "FWD", 400.0, 33000.0),
            Record::new().with_field("make", "Fisker").with_field("range", "n/a"),
        ]
    }

    #[test]
    fn counts_sort_by_frequency_then_name() {
        let counts = value_counts(&fleet(), "drive_config");
        assert_eq!(
            counts,
            [("AWD".to_string(), 2), ("FWD".to_string(), 1), ("RWD".to_string(), 1)]
        );
        assert_eq!(top_n(&fleet(), "make", 1), [("Tesla".to_string(), 2)]);
    }

    #[test]
    fn summary_skips_non_numeric_cells() {
        let summary = summarize(&fleet(), "range").unwrap();
        assert_eq!(summary.count, 4);
        assert_eq!(summary.min, 400.0);
        assert_eq!(summary.max, 530.0);
        assert!((summary.mean - 477.5).abs() < 1e-9);
        assert!(summarize(&fleet(), "battery").is_none());
    }

    #[test]
    fn range_and_price_correlate_positively() {
        let r = correlation(&fleet(), "range", "price").unwrap();
        assert!(r > 0.9, "correlation was {r}");
    }

    #[test]
    fn numeric_columns_tolerate_missing_values() {
        assert_eq!(numeric_columns(&fleet()), ["price", "range"]);
    }

    #[test]
    fn correlation_matrix_is_symmetric_with_unit_diagonal() {
        let matrix = correlation_matrix(&fleet(), &["range", "price", "make"]);
        assert_eq!(matrix.columns, ["range", "price", "make"]);
        assert!((matrix.get("range", "range").unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(matrix.get("range", "price"), matrix.get("price", "range"));
        assert_eq!(matrix.get("range", "price"), correlation(&fleet(), "range", "price"));
        assert!(matrix.get("make", "price").is_none());
        assert!(matrix.get("range", "battery").is_none());
    }

    #[test]
    fn histogram_counts_every_value_once() {
        let hist = histogram(&fleet(), "range", 3).unwrap().unwrap();
        assert_eq!(hist.start, 400.0);
        assert!((hist.bin_width - 130.0 / 3.0).abs() < 1e-9);
        // 400 | 480 | 500, 530 with the maximum in the last bin.
        assert_eq!(hist.counts, [1, 1, 2]);
        assert_eq!(hist.edges().len(), 4);
        assert!((hist.edges()[3] - 530.0).abs() < 1e-9);
    }

    #[test]
    fn histogram_of_constant_column_is_centered() {
        let records = vec![Record::new().with_field("range", "300"); 4];
        let hist = histogram(&records, "range", 2).unwrap().unwrap();
        assert_eq!(hist.start, 299.5);
        assert_eq!(hist.counts, [0, 4]);

        assert!(histogram(&records, "price", 2).unwrap().is_none());
        assert!(histogram(&records, "range", 0).is_err());
    }

    fn plane(n: usize) -> Vec<FeatureRow> {
        (0..n)
            .map(|i| {
                let (a, b) = (i as f64, ((i * 7) % 11) as f64);
                (vec![a, b], 2.0 * a - b + 5.0)
            })
            .collect()
    }

    #[test]
    fn fit_recovers_exact_line() {
        let rows: Vec<FeatureRow> =
            (0..10).map(|x| (vec![x as f64], 3.0 * x as f64 + 2.0)).collect();
        let model = LinearRegression::fit(&rows).unwrap();
        assert!((model.coefficients[0] - 3.0).abs() < 1e-9);
        assert!((model.intercept - 2.0).abs() < 1e-9);

        let metrics = model.evaluate(&rows).unwrap();
        assert!(metrics.mse < 1e-12);
        assert!((metrics.r2 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn fit_recovers_exact_plane() {
        let model = LinearRegression::fit(&plane(20)).unwrap();
        assert!((model.coefficients[0] - 2.0).abs() < 1e-9);
        assert!((model.coefficients[1] + 1.0).abs() < 1e-9);
        assert!((model.intercept - 5.0).abs() < 1e-9);
        assert!((model.predict(&[3.0, 4.0]) - 7.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_fits_are_rejected() {
        assert!(LinearRegression::fit(&[(vec![1.0], 2.0)]).is_err());
        assert!(LinearRegression::fit(&[(vec![1.0], 2.0), (vec![1.0], 3.0)]).is_err());
        assert!(LinearRegression::fit(&[(vec![], 2.0), (vec![], 3.0)]).is_err());

        // Second feature is twice the first.
        let collinear: Vec<FeatureRow> =
            (0..5).map(|i| (vec![i as f64, 2.0 * i as f64], i as f64)).collect();
        assert!(LinearRegression::fit(&collinear).is_err());

        let ragged = [(vec![1.0, 2.0], 1.0), (vec![3.0], 2.0)];
        assert!(LinearRegression::fit(&ragged).is_err());
    }

    #[test]
    fn evaluate_rejects_mismatched_rows() {
        let model = LinearRegression::fit(&plane(10)).unwrap();
        assert!(model.evaluate(&[]).is_err());
        assert!(model.evaluate(&[(vec![1.0], 1.0)]).is_err());
    }

    #[test]
    fn feature_rows_need_every_column() {
        let rows = feature_rows(&fleet(), &["range"], "price");
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0], (vec![500.0], 45000.0));
        assert!(feature_rows(&fleet(), &["range", "battery"], "price").is_empty());
    }

    #[test]
    fn forest_is_seeded_and_fits_a_line() {
        let rows: Vec<FeatureRow> =
            (0..60).map(|x| (vec![x as f64], 3.0 * x as f64 + 2.0)).collect();
        let split = train_test_split(&rows, 0.2, 42).unwrap();

        let a = RandomForest::fit(&split.train, 20, 7).unwrap();
        let b = RandomForest::fit(&split.train, 20, 7).unwrap();
        let xs: Vec<Vec<f64>> = split.test.iter().map(|(xs, _)| xs.clone()).collect();
        assert_eq!(a.predict_rows(&xs).unwrap(), b.predict_rows(&xs).unwrap());
        assert_eq!(a.feature_count(), 1);

        let metrics = a.evaluate(&split.test).unwrap();
        assert!(metrics.r2 > 0.9, "r2 was {}", metrics.r2);
    }

    #[test]
    fn forest_rejects_bad_input() {
        assert!(RandomForest::fit(&plane(10), 0, 1).is_err());
        assert!(RandomForest::fit(&plane(1), 10, 1).is_err());

        let forest = RandomForest::fit(&plane(10), 5, 1).unwrap();
        assert!(forest.predict_rows(&[]).unwrap().is_empty());
        assert!(forest.evaluate(&[(vec![1.0], 1.0)]).is_err());
    }

    #[test]
    fn split_is_seeded_and_complete() {
        let rows: Vec<u32> = (0..10).collect();
        let a = train_test_split(&rows, 0.2, 42).unwrap();
        let b = train_test_split(&rows, 0.2, 42).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.test.len(), 2);
        assert_eq!(a.train.len(), 8);

        let mut all: Vec<u32> = a.train.iter().chain(&a.test).copied().collect();
        all.sort();
        assert_eq!(all, rows);
    }

    #[test]
    fn split_rejects_bad_sizes() {
        let rows = [1, 2, 3];
        assert!(train_test_split(&rows, 0.0, 1).is_err());
        assert!(train_test_split(&rows, 1.0, 1).is_err());
        assert!(train_test_split(&[1], 0.5, 1).is_err());
    }
}
