use crate::codec::PrimitiveType;
use crate::config::SparsityConfig;
use crate::model::{ScaleType, SingleCellExpressionDataVector};

use super::filter::{check_filter, passes};
use super::{CellFilter, StatsError};

/// Counts of expressed cells and design elements within a sample
///
/// A value is expressed when it is strictly greater than the threshold
/// expressed on the vector's scale. The threshold is transformed once per
/// scale at construction:
///
/// | Scale | Compared against |
/// |-------|------------------|
/// | `LINEAR` | `t` |
/// | `COUNT` | `round(t)` |
/// | `LOG1P` | `ln(1 + t)` |
/// | `LOG2` | `log2(t)` |
/// | `LN` | `ln(t)` |
/// | `LOG10` | `log10(t)` |
/// | `PERCENT`, `PERCENT1`, `LOGBASEUNKNOWN` | `0`, only when `t = 0` |
///
/// Every method taking several vectors requires them to share one dimension.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SparsityMetrics {
    threshold: f64,
    count_threshold: f64,
    log1p_threshold: f64,
    log2_threshold: f64,
    ln_threshold: f64,
    log10_threshold: f64,
}

impl Default for SparsityMetrics {
    fn default() -> Self {
        Self::with_threshold(0.0)
    }
}

impl SparsityMetrics {
    /// Create metrics for a non-negative, finite threshold
    pub fn new(threshold: f64) -> Result<Self, StatsError> {
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(StatsError::InvalidThreshold(threshold));
        }
        Ok(Self::with_threshold(threshold))
    }

    /// Create metrics from the `[sparsity]` configuration section
    pub fn from_config(config: &SparsityConfig) -> Result<Self, StatsError> {
        Self::new(config.threshold)
    }

    fn with_threshold(threshold: f64) -> Self {
        Self {
            threshold,
            count_threshold: threshold.round(),
            log1p_threshold: threshold.ln_1p(),
            log2_threshold: threshold.log2(),
            ln_threshold: threshold.ln(),
            log10_threshold: threshold.log10(),
        }
    }

    /// Threshold on the linear scale
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    fn scaled_threshold(&self, scale: ScaleType) -> Result<f64, StatsError> {
        match scale {
            ScaleType::Linear => Ok(self.threshold),
            ScaleType::Count => Ok(self.count_threshold),
            ScaleType::Log1p => Ok(self.log1p_threshold),
            ScaleType::Log2 => Ok(self.log2_threshold),
            ScaleType::Ln => Ok(self.ln_threshold),
            ScaleType::Log10 => Ok(self.log10_threshold),
            ScaleType::Percent | ScaleType::Percent1 | ScaleType::LogBaseUnknown => {
                if self.threshold == 0.0 {
                    Ok(0.0)
                } else {
                    Err(StatsError::UnsupportedThreshold {
                        scale,
                        threshold: self.threshold,
                    })
                }
            }
        }
    }

    /// Whether expression of `vector` can be decided with this threshold
    pub fn is_supported(&self, vector: &SingleCellExpressionDataVector) -> bool {
        let numeric = matches!(
            vector.representation(),
            PrimitiveType::Float
                | PrimitiveType::Double
                | PrimitiveType::Int
                | PrimitiveType::Long
                | PrimitiveType::Boolean
        );
        numeric && self.scaled_threshold(vector.quantitation_type().scale).is_ok()
    }

    /// Whether `value`, stored on `scale`, is expressed
    pub fn is_expressed(&self, value: f64, scale: ScaleType) -> Result<bool, StatsError> {
        Ok(value > self.scaled_threshold(scale)?)
    }

    /// Mark the cells of sample `sample_index` where `vector` is expressed
    ///
    /// `present` spans the whole cell universe. Cells already marked are not
    /// evaluated again.
    pub fn add_expressed_cells(
        &self,
        vector: &SingleCellExpressionDataVector,
        sample_index: usize,
        filter: Option<&CellFilter<'_>>,
        present: &mut [bool],
    ) -> Result<(), StatsError> {
        let number_of_cells = vector.dimension().number_of_cells();
        if present.len() != number_of_cells {
            return Err(StatsError::CellCountMismatch {
                expected: number_of_cells,
                actual: present.len(),
            });
        }
        check_filter(filter, vector.dimension())?;
        let threshold = self.vector_threshold(vector)?;
        let view = vector.data_view()?;
        let indices = vector.data_indices();
        for k in vector.sample_range(sample_index)? {
            let cell = indices[k];
            if present[cell] || !passes(filter, cell) {
                continue;
            }
            if view.get(k) > threshold {
                present[cell] = true;
            }
        }
        Ok(())
    }

    /// Number of distinct cells of a sample where at least one vector is expressed
    pub fn number_of_cells<'a, I>(
        &self,
        vectors: I,
        sample_index: usize,
        filter: Option<&CellFilter<'_>>,
    ) -> Result<usize, StatsError>
    where
        I: IntoIterator<Item = &'a SingleCellExpressionDataVector>,
    {
        let vectors = same_dimension(vectors)?;
        let Some(first) = vectors.first() else {
            return Ok(0);
        };
        let mut present = vec![false; first.dimension().number_of_cells()];
        for vector in &vectors {
            self.add_expressed_cells(vector, sample_index, filter, &mut present)?;
        }
        Ok(present.into_iter().filter(|&p| p).count())
    }

    /// Number of vectors expressed in at least one cell of a sample
    pub fn number_of_design_elements<'a, I>(
        &self,
        vectors: I,
        sample_index: usize,
        filter: Option<&CellFilter<'_>>,
    ) -> Result<usize, StatsError>
    where
        I: IntoIterator<Item = &'a SingleCellExpressionDataVector>,
    {
        let mut n = 0;
        for vector in same_dimension(vectors)? {
            check_filter(filter, vector.dimension())?;
            let threshold = self.vector_threshold(vector)?;
            let view = vector.data_view()?;
            let indices = vector.data_indices();
            let expressed = vector
                .sample_range(sample_index)?
                .any(|k| passes(filter, indices[k]) && view.get(k) > threshold);
            if expressed {
                n += 1;
            }
        }
        Ok(n)
    }

    /// Number of expressed (cell, vector) pairs in a sample
    pub fn number_of_cells_by_design_elements<'a, I>(
        &self,
        vectors: I,
        sample_index: usize,
        filter: Option<&CellFilter<'_>>,
    ) -> Result<usize, StatsError>
    where
        I: IntoIterator<Item = &'a SingleCellExpressionDataVector>,
    {
        let mut n = 0;
        for vector in same_dimension(vectors)? {
            check_filter(filter, vector.dimension())?;
            let threshold = self.vector_threshold(vector)?;
            let view = vector.data_view()?;
            let indices = vector.data_indices();
            n += vector
                .sample_range(sample_index)?
                .filter(|&k| passes(filter, indices[k]) && view.get(k) > threshold)
                .count();
        }
        Ok(n)
    }

    fn vector_threshold(&self, vector: &SingleCellExpressionDataVector) -> Result<f64, StatsError> {
        if vector.representation() == PrimitiveType::Char {
            return Err(StatsError::UnsupportedRepresentation {
                representation: PrimitiveType::Char,
                operation: "isExpressed",
            });
        }
        self.scaled_threshold(vector.quantitation_type().scale)
    }
}

fn same_dimension<'a, I>(vectors: I) -> Result<Vec<&'a SingleCellExpressionDataVector>, StatsError>
where
    I: IntoIterator<Item = &'a SingleCellExpressionDataVector>,
{
    let vectors: Vec<_> = vectors.into_iter().collect();
    if let Some(first) = vectors.first() {
        let id = first.dimension().id();
        if vectors.iter().any(|v| v.dimension().id() != id) {
            return Err(StatsError::MixedDimensions);
        }
    }
    Ok(vectors)
}
