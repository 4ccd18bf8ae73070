//! Per-sample descriptive statistics
//!
//! Every function works on the runs of a vector's data that belong to each
//! sample. NaN values are skipped, and `count` agrees with the value
//! statistics on which values exist.

use std::ops::Range;

use crate::codec::{DataView, PrimitiveType};
use crate::model::{BioAssay, ScaleType, SingleCellExpressionDataVector};

use super::filter::{check_filter, passes};
use super::scale::{rescaler, unscaler};
use super::{CellFilter, StatsError};

/// Per-sample aggregate of a vector's values
///
/// `Min`, `Max`, `Median` and `Quantile` work on the stored values. The other
/// statistics first bring the values back to the linear scale; `Sum`
/// re-expresses the linear sum on the vector's scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Statistic {
    /// Smallest value
    Min,
    /// Largest value
    Max,
    /// 0.5 quantile
    Median,
    /// Linearly interpolated quantile, within `[0, 1]`
    Quantile(f64),
    /// Linear sum expressed on the vector's scale
    Sum,
    /// Linear sum
    SumUnscaled,
    /// Linear mean
    Mean,
    /// Linear sample variance (`n - 1` denominator)
    SampleVariance,
    /// Square root of the sample variance
    SampleStandardDeviation,
}

impl Statistic {
    /// Name used in error messages
    pub fn name(&self) -> &'static str {
        match self {
            Statistic::Min => "min",
            Statistic::Max => "max",
            Statistic::Median => "median",
            Statistic::Quantile(_) => "quantile",
            Statistic::Sum => "sum",
            Statistic::SumUnscaled => "sumUnscaled",
            Statistic::Mean => "mean",
            Statistic::SampleVariance => "sampleVariance",
            Statistic::SampleStandardDeviation => "sampleStandardDeviation",
        }
    }

    /// Evaluate over NaN-free values stored on `scale`
    ///
    /// Over no value, sums are 0 and every other statistic is NaN. The
    /// variance needs at least two values.
    pub fn evaluate(&self, values: Vec<f64>, scale: ScaleType) -> Result<f64, StatsError> {
        match *self {
            Statistic::Min => Ok(values.into_iter().reduce(f64::min).unwrap_or(f64::NAN)),
            Statistic::Max => Ok(values.into_iter().reduce(f64::max).unwrap_or(f64::NAN)),
            Statistic::Median => Ok(quantile_of(values, 0.5)),
            Statistic::Quantile(q) => {
                if !(0.0..=1.0).contains(&q) {
                    return Err(StatsError::InvalidQuantile(q));
                }
                Ok(quantile_of(values, q))
            }
            Statistic::SumUnscaled => {
                let unscale = unscaler(scale)?;
                Ok(values.into_iter().map(unscale).sum())
            }
            Statistic::Sum => {
                let rescale = rescaler(scale)?;
                Ok(rescale(Statistic::SumUnscaled.evaluate(values, scale)?))
            }
            Statistic::Mean => {
                let unscale = unscaler(scale)?;
                if values.is_empty() {
                    return Ok(f64::NAN);
                }
                let n = values.len() as f64;
                Ok(values.into_iter().map(unscale).sum::<f64>() / n)
            }
            Statistic::SampleVariance => {
                let unscale = unscaler(scale)?;
                let linear: Vec<f64> = values.into_iter().map(unscale).collect();
                Ok(sample_variance_of(&linear))
            }
            Statistic::SampleStandardDeviation => {
                Ok(Statistic::SampleVariance.evaluate(values, scale)?.sqrt())
            }
        }
    }
}

fn quantile_of(mut values: Vec<f64>, q: f64) -> f64 {
    let n = values.len();
    match n {
        0 => f64::NAN,
        1 => values[0],
        _ => {
            values.sort_by(|a, b| a.total_cmp(b));
            let pos = q * (n - 1) as f64;
            let lo = pos.floor() as usize;
            let frac = pos - lo as f64;
            if lo + 1 >= n {
                values[n - 1]
            } else {
                values[lo] * (1.0 - frac) + values[lo + 1] * frac
            }
        }
    }
}

fn sample_variance_of(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return f64::NAN;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    values.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / (n - 1) as f64
}

/// Range of every sample in the vector's data, found with the start/end trick
fn sample_ranges(vector: &SingleCellExpressionDataVector) -> Result<Vec<Range<usize>>, StatsError> {
    let samples = vector.dimension().number_of_samples();
    let mut ranges = Vec::with_capacity(samples);
    let mut end = 0;
    for i in 0..samples {
        let start = vector.sample_start(i, end)?;
        end = vector.sample_end(i, start)?;
        ranges.push(start..end);
    }
    Ok(ranges)
}

/// View over a vector whose values can be aggregated numerically
fn numeric_view<'v>(
    vector: &'v SingleCellExpressionDataVector,
    operation: &'static str,
) -> Result<DataView<'v>, StatsError> {
    match vector.representation() {
        PrimitiveType::Float | PrimitiveType::Double | PrimitiveType::Int | PrimitiveType::Long => {
            Ok(vector.data_view()?)
        }
        representation => Err(StatsError::UnsupportedRepresentation {
            representation,
            operation,
        }),
    }
}

/// Non-NaN values stored at `range`, restricted to the cells passing `filter`
fn selected_values(
    vector: &SingleCellExpressionDataVector,
    view: &DataView<'_>,
    range: Range<usize>,
    filter: Option<&CellFilter<'_>>,
) -> Vec<f64> {
    let indices = vector.data_indices();
    range
        .filter(|&k| passes(filter, indices[k]))
        .map(|k| view.get(k))
        .filter(|x| !x.is_nan())
        .collect()
}

fn count_range(
    vector: &SingleCellExpressionDataVector,
    view: Option<&DataView<'_>>,
    range: Range<usize>,
    filter: Option<&CellFilter<'_>>,
) -> usize {
    let indices = vector.data_indices();
    if filter.is_none() && view.is_none() {
        return range.len();
    }
    range
        .filter(|&k| passes(filter, indices[k]))
        .filter(|&k| view.map_or(true, |v| !v.get(k).is_nan()))
        .count()
}

/// View used for counting: only representations with a missing value are scanned
fn count_view(vector: &SingleCellExpressionDataVector) -> Result<Option<DataView<'_>>, StatsError> {
    if vector.representation().has_missing_value() {
        Ok(Some(vector.data_view()?))
    } else {
        Ok(None)
    }
}

/// Compute a statistic for every sample
pub fn compute(vector: &SingleCellExpressionDataVector, statistic: Statistic) -> Result<Vec<f64>, StatsError> {
    let view = numeric_view(vector, statistic.name())?;
    let scale = vector.quantitation_type().scale;
    sample_ranges(vector)?
        .into_iter()
        .map(|range| statistic.evaluate(selected_values(vector, &view, range, None), scale))
        .collect()
}

/// Compute a statistic for the sample at `sample_index`
pub fn compute_for_sample(
    vector: &SingleCellExpressionDataVector,
    sample_index: usize,
    statistic: Statistic,
) -> Result<f64, StatsError> {
    let view = numeric_view(vector, statistic.name())?;
    let range = vector.sample_range(sample_index)?;
    statistic.evaluate(
        selected_values(vector, &view, range, None),
        vector.quantitation_type().scale,
    )
}

/// Compute a statistic for `sample`, failing if the vector's dimension does not hold it
pub fn compute_for_assay(
    vector: &SingleCellExpressionDataVector,
    sample: &BioAssay,
    statistic: Statistic,
) -> Result<f64, StatsError> {
    let sample_index = vector.dimension().sample_index(sample)?;
    compute_for_sample(vector, sample_index, statistic)
}

/// Compute a statistic over the cells of one category in one sample
pub fn compute_for_cells(
    vector: &SingleCellExpressionDataVector,
    sample_index: usize,
    filter: &CellFilter<'_>,
    statistic: Statistic,
) -> Result<f64, StatsError> {
    filter.check(vector.dimension())?;
    let view = numeric_view(vector, statistic.name())?;
    let range = vector.sample_range(sample_index)?;
    statistic.evaluate(
        selected_values(vector, &view, range, Some(filter)),
        vector.quantitation_type().scale,
    )
}

/// Smallest value of each sample
pub fn min(vector: &SingleCellExpressionDataVector) -> Result<Vec<f64>, StatsError> {
    compute(vector, Statistic::Min)
}

/// Largest value of each sample
pub fn max(vector: &SingleCellExpressionDataVector) -> Result<Vec<f64>, StatsError> {
    compute(vector, Statistic::Max)
}

/// Median of each sample
pub fn median(vector: &SingleCellExpressionDataVector) -> Result<Vec<f64>, StatsError> {
    compute(vector, Statistic::Median)
}

/// Quantile `q` of each sample
pub fn quantile(vector: &SingleCellExpressionDataVector, q: f64) -> Result<Vec<f64>, StatsError> {
    compute(vector, Statistic::Quantile(q))
}

/// Sum of each sample, on the vector's scale
pub fn sum(vector: &SingleCellExpressionDataVector) -> Result<Vec<f64>, StatsError> {
    compute(vector, Statistic::Sum)
}

/// Linear sum of each sample
pub fn sum_unscaled(vector: &SingleCellExpressionDataVector) -> Result<Vec<f64>, StatsError> {
    compute(vector, Statistic::SumUnscaled)
}

/// Linear mean of each sample
pub fn mean(vector: &SingleCellExpressionDataVector) -> Result<Vec<f64>, StatsError> {
    compute(vector, Statistic::Mean)
}

/// Linear sample variance of each sample
pub fn sample_variance(vector: &SingleCellExpressionDataVector) -> Result<Vec<f64>, StatsError> {
    compute(vector, Statistic::SampleVariance)
}

/// Linear sample standard deviation of each sample
pub fn sample_standard_deviation(vector: &SingleCellExpressionDataVector) -> Result<Vec<f64>, StatsError> {
    compute(vector, Statistic::SampleStandardDeviation)
}

/// Number of present values in each sample
///
/// `FLOAT` and `DOUBLE` values are scanned and NaNs are not counted. Other
/// representations cannot encode a missing value, so every stored element
/// counts.
pub fn count(vector: &SingleCellExpressionDataVector) -> Result<Vec<usize>, StatsError> {
    let view = count_view(vector)?;
    Ok(sample_ranges(vector)?
        .into_iter()
        .map(|range| count_range(vector, view.as_ref(), range, None))
        .collect())
}

/// Number of present values in the sample at `sample_index`
pub fn count_for_sample(vector: &SingleCellExpressionDataVector, sample_index: usize) -> Result<usize, StatsError> {
    let view = count_view(vector)?;
    let range = vector.sample_range(sample_index)?;
    Ok(count_range(vector, view.as_ref(), range, None))
}

/// Number of present values in `sample`, failing if the vector's dimension does not hold it
pub fn count_for_assay(vector: &SingleCellExpressionDataVector, sample: &BioAssay) -> Result<usize, StatsError> {
    let sample_index = vector.dimension().sample_index(sample)?;
    count_for_sample(vector, sample_index)
}

/// Number of present values among the cells of one category in one sample
pub fn count_for_cells(
    vector: &SingleCellExpressionDataVector,
    sample_index: usize,
    filter: &CellFilter<'_>,
) -> Result<usize, StatsError> {
    filter.check(vector.dimension())?;
    let view = count_view(vector)?;
    let range = vector.sample_range(sample_index)?;
    Ok(count_range(vector, view.as_ref(), range, Some(filter)))
}

/// Number of stored elements in each sample, without inspecting the values
pub fn count_fast(vector: &SingleCellExpressionDataVector) -> Result<Vec<usize>, StatsError> {
    Ok(sample_ranges(vector)?.into_iter().map(|r| r.len()).collect())
}

/// Number of stored elements among the cells of one category in one sample
pub fn count_fast_for_cells(
    vector: &SingleCellExpressionDataVector,
    sample_index: usize,
    filter: &CellFilter<'_>,
) -> Result<usize, StatsError> {
    filter.check(vector.dimension())?;
    let range = vector.sample_range(sample_index)?;
    Ok(count_range(vector, None, range, Some(filter)))
}

/// Number of values strictly greater than `threshold` in each sample
pub fn count_above_threshold(
    vector: &SingleCellExpressionDataVector,
    threshold: f64,
) -> Result<Vec<usize>, StatsError> {
    let view = numeric_view(vector, "countAboveThreshold")?;
    Ok(sample_ranges(vector)?
        .into_iter()
        .map(|range| count_above(&view, range, threshold, vector.data_indices(), None))
        .collect())
}

/// Number of values strictly greater than `threshold` among the cells of one category in one sample
pub fn count_above_threshold_for_cells(
    vector: &SingleCellExpressionDataVector,
    sample_index: usize,
    filter: &CellFilter<'_>,
    threshold: f64,
) -> Result<usize, StatsError> {
    check_filter(Some(filter), vector.dimension())?;
    let view = numeric_view(vector, "countAboveThreshold")?;
    let range = vector.sample_range(sample_index)?;
    Ok(count_above(&view, range, threshold, vector.data_indices(), Some(filter)))
}

fn count_above(
    view: &DataView<'_>,
    range: Range<usize>,
    threshold: f64,
    indices: &[usize],
    filter: Option<&CellFilter<'_>>,
) -> usize {
    range
        .filter(|&k| passes(filter, indices[k]) && view.get(k) > threshold)
        .count()
}
