//! # Pseudo-bulk aggregation by cell type
//!
//! Sums the values of each source sample's cells of one cell type into a
//! single pseudo-bulk value, for every vector:
//!
//! ```text
//! source sample  | T  B  T | B  T |        target (sample, cell type)
//! cell type                            -> s1/T = v0 + v2
//! vector         [v0 v1 v2 v3 v4]         s1/B = v1, s2/B = v3, s2/T = v4
//! ```
//!
//! Values are summed on the linear scale. The sums are then either
//! re-expressed on the vector's scale or converted to log2 counts per
//! million:
//!
//! ```text
//! log2cpm = log2(1e6 * nf * (sum + 0.5) / (library_size + 1))
//! ```
//!
//! where `library_size` is the total of a target over all vectors and `nf`
//! is a normalization factor, currently always 1. Cells are grouped by the
//! dimension's preferred cell type assignment.

mod error;

#[cfg(test)]
mod tests;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use log::{debug, info, warn};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::codec::{encode_doubles, PrimitiveType};
use crate::config::{AggregateConfig, Config};
use crate::model::{
    BioAssay, CellTypeAssignment, QuantitationType, ScaleType, SingleCellExpressionDataVector,
};
use crate::stats::scale::{rescaler, unscaler, Transform};
use crate::stats::{CellFilter, SparsityMetrics};

pub use error::AggregateError;

/// Number of vectors between two progress messages
const PROGRESS_INTERVAL: usize = 1000;

/// How values are summed, chosen from the vector's scale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationMethod {
    /// Linear values are summed as is
    Sum,
    /// Log values are exponentiated, summed and logged again
    LogSum,
    /// `log1p` values are brought back with `expm1`, summed and `log1p`-ed again
    Log1pSum,
}

impl AggregationMethod {
    /// Method for values stored on `scale`
    pub fn for_scale(scale: ScaleType) -> Result<Self, AggregateError> {
        match scale {
            ScaleType::Linear | ScaleType::Count => Ok(AggregationMethod::Sum),
            ScaleType::Log1p => Ok(AggregationMethod::Log1pSum),
            ScaleType::Ln | ScaleType::Log2 | ScaleType::Log10 | ScaleType::LogBaseUnknown => {
                Ok(AggregationMethod::LogSum)
            }
            ScaleType::Percent | ScaleType::Percent1 => Err(AggregateError::UnsupportedScale(scale)),
        }
    }
}

/// Whether aggregates on `scale` can be converted to log2cpm
pub fn can_log2cpm(scale: ScaleType) -> bool {
    matches!(
        scale,
        ScaleType::Linear
            | ScaleType::Count
            | ScaleType::Log2
            | ScaleType::Ln
            | ScaleType::Log10
            | ScaleType::Log1p
    )
}

/// Transforms between the stored scale and the linear scale, plus the scale of the result
///
/// Logs of unknown base are taken as natural logs.
fn transforms(scale: ScaleType) -> Result<(Transform, Transform, ScaleType), AggregateError> {
    if scale == ScaleType::LogBaseUnknown {
        return Ok((f64::exp, f64::ln, ScaleType::Ln));
    }
    Ok((unscaler(scale)?, rescaler(scale)?, scale))
}

/// One pseudo-bulk sample: the cells of `cell_type` in `source_sample`
#[derive(Debug, Clone)]
pub struct AggregateTarget {
    /// Assay of the aggregated sample
    pub assay: BioAssay,

    /// Sample of the single-cell dimension whose cells are aggregated
    pub source_sample: BioAssay,

    /// Position of the cell type in the preferred cell type assignment
    pub cell_type: i32,
}

impl AggregateTarget {
    /// Create a target
    pub fn new(assay: BioAssay, source_sample: BioAssay, cell_type: i32) -> Self {
        Self {
            assay,
            source_sample,
            cell_type,
        }
    }
}

/// Expression of the cells aggregated into one target
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TargetSparsity {
    /// Cells expressing at least one design element
    pub number_of_cells: usize,
    /// Design elements expressed in at least one cell
    pub number_of_design_elements: usize,
    /// Expressed (cell, design element) pairs
    pub number_of_cells_by_design_elements: usize,
}

/// Aggregated values of one design element, one per target
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedVector {
    /// Design element
    pub design_element: String,
    /// Value of each target
    pub values: Vec<f64>,
}

impl AggregatedVector {
    /// Values packed as `DOUBLE`
    pub fn data(&self) -> Vec<u8> {
        encode_doubles(&self.values)
    }
}

/// Result of an aggregation
#[derive(Debug, Clone)]
pub struct Aggregate {
    /// Quantitation of the aggregated values, always `DOUBLE`
    pub quantitation_type: Arc<QuantitationType>,

    /// Method used to sum the values
    pub method: AggregationMethod,

    /// Aggregated samples, in target order
    pub assays: Vec<BioAssay>,

    /// One aggregated vector per input vector
    pub vectors: Vec<AggregatedVector>,

    /// Library size of each target, when converted to log2cpm
    pub library_sizes: Option<Vec<f64>>,

    /// Sparsity of each target, when requested
    pub sparsity: Option<Vec<TargetSparsity>>,
}

/// Aggregates single-cell vectors into pseudo-bulk samples
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    config: AggregateConfig,
    metrics: SparsityMetrics,
}

impl Aggregator {
    /// Create an aggregator
    pub fn new(config: AggregateConfig, metrics: SparsityMetrics) -> Self {
        Self { config, metrics }
    }

    /// Create an aggregator from a configuration file's settings
    pub fn from_config(config: &Config) -> Result<Self, AggregateError> {
        Ok(Self::new(
            config.aggregate.clone(),
            SparsityMetrics::from_config(&config.sparsity)?,
        ))
    }

    /// Aggregate `vectors` into `targets`
    ///
    /// All vectors must share a dimension and a quantitation type.
    pub fn aggregate(
        &self,
        vectors: &[SingleCellExpressionDataVector],
        targets: &[AggregateTarget],
    ) -> Result<Aggregate, AggregateError> {
        let first = vectors.first().ok_or(AggregateError::NoVectors)?;
        let dimension = first.dimension();
        let qt = first.quantitation_type();
        for vector in vectors {
            if vector.dimension().id() != dimension.id() {
                return Err(AggregateError::MixedDimensions);
            }
            if vector.quantitation_type() != qt {
                return Err(AggregateError::MixedQuantitationTypes);
            }
        }
        match qt.representation {
            PrimitiveType::Float | PrimitiveType::Double | PrimitiveType::Int | PrimitiveType::Long => {}
            representation => return Err(AggregateError::UnsupportedRepresentation(representation)),
        }

        let method = AggregationMethod::for_scale(qt.scale)?;
        let (unscale, rescale, output_scale) = transforms(qt.scale)?;
        let cta = dimension
            .preferred_cell_type_assignment()
            .ok_or(AggregateError::NoCellTypeAssignment)?;

        let mut sources = Vec::with_capacity(targets.len());
        for target in targets {
            if !cta.as_characteristics().is_valid_category(target.cell_type) {
                return Err(AggregateError::InvalidCellType(target.cell_type));
            }
            sources.push((dimension.sample_index(&target.source_sample)?, target.cell_type));
        }

        let log2cpm = self.config.log2cpm && can_log2cpm(qt.scale);
        if self.config.log2cpm && !log2cpm {
            warn!("Data on the {:?} scale cannot be converted to log2cpm, aggregates are kept on their scale", qt.scale);
        }
        info!(
            "Aggregating {} vectors of {} into {} samples using {:?}",
            vectors.len(),
            qt,
            targets.len(),
            method
        );

        let sums = per_vector(vectors, |v| target_sums(v, cta, &sources, unscale))?;

        let library_sizes = if log2cpm {
            let mut library_sizes = vec![0.0; targets.len()];
            for row in &sums {
                for (size, value) in library_sizes.iter_mut().zip(row) {
                    *size += value;
                }
            }
            if self.config.adjust_library_sizes {
                adjust_library_sizes(&mut library_sizes, vectors, targets, &sources, unscale)?;
            }
            for (target, size) in targets.iter().zip(&library_sizes) {
                if *size == 0.0 {
                    warn!(
                        "Library size for {} is zero, its aggregates will be NaN",
                        target.assay
                    );
                }
            }
            Some(library_sizes)
        } else {
            None
        };

        let aggregated = vectors
            .iter()
            .zip(sums)
            .map(|(vector, row)| {
                let values = match &library_sizes {
                    Some(sizes) => row
                        .into_iter()
                        .zip(sizes)
                        .map(|(x, &size)| to_log2cpm(x, size, 1.0))
                        .collect(),
                    None => row.into_iter().map(rescale).collect(),
                };
                AggregatedVector {
                    design_element: vector.design_element().to_string(),
                    values,
                }
            })
            .collect();

        let sparsity = if self.config.compute_sparsity_metrics {
            self.target_sparsity(vectors, cta, &sources)?
        } else {
            None
        };

        let mut quantitation_type = QuantitationType::new(
            &format!(
                "{} aggregated by cell type{}",
                qt.name,
                if log2cpm { " (log2cpm)" } else { "" }
            ),
            PrimitiveType::Double,
            if log2cpm { ScaleType::Log2 } else { output_scale },
        );
        quantitation_type.description = Some(format!(
            "Expression data aggregated by cell type using {:?}.{}",
            method,
            if log2cpm {
                " The data was subsequently converted to log2cpm."
            } else {
                ""
            }
        ));

        Ok(Aggregate {
            quantitation_type: Arc::new(quantitation_type),
            method,
            assays: targets.iter().map(|t| t.assay.clone()).collect(),
            vectors: aggregated,
            library_sizes,
            sparsity,
        })
    }

    fn target_sparsity(
        &self,
        vectors: &[SingleCellExpressionDataVector],
        cta: &CellTypeAssignment,
        sources: &[(usize, i32)],
    ) -> Result<Option<Vec<TargetSparsity>>, AggregateError> {
        if !vectors.iter().all(|v| self.metrics.is_supported(v)) {
            warn!(
                "Threshold {} is not supported for these vectors, sparsity metrics are skipped",
                self.metrics.threshold()
            );
            return Ok(None);
        }
        let mut sparsity = Vec::with_capacity(sources.len());
        for &(source, cell_type) in sources {
            let filter = CellFilter::new(cta.as_characteristics(), cell_type)?;
            sparsity.push(TargetSparsity {
                number_of_cells: self.metrics.number_of_cells(vectors, source, Some(&filter))?,
                number_of_design_elements: self.metrics.number_of_design_elements(
                    vectors,
                    source,
                    Some(&filter),
                )?,
                number_of_cells_by_design_elements: self
                    .metrics
                    .number_of_cells_by_design_elements(vectors, source, Some(&filter))?,
            });
        }
        Ok(Some(sparsity))
    }
}

/// `log2(1e6 * nf * (x + 0.5) / (library_size + 1))`, NaN for an empty library
pub fn to_log2cpm(x: f64, library_size: f64, normalization_factor: f64) -> f64 {
    if library_size == 0.0 {
        return f64::NAN;
    }
    (1e6 * normalization_factor * (x + 0.5) / (library_size + 1.0)).log2()
}

/// Linear sum of each target's cells in one vector
fn target_sums(
    vector: &SingleCellExpressionDataVector,
    cta: &CellTypeAssignment,
    sources: &[(usize, i32)],
    unscale: Transform,
) -> Result<Vec<f64>, AggregateError> {
    let view = vector.data_view()?;
    let indices = vector.data_indices();
    let cell_types = cta.indices();
    sources
        .iter()
        .map(|&(source, cell_type)| {
            // targets are not ordered by source sample, so every search starts at 0
            let range = vector.sample_range(source)?;
            Ok(range
                .filter(|&k| cell_types[indices[k]] == cell_type)
                .map(|k| view.get(k))
                .filter(|x| !x.is_nan())
                .map(unscale)
                .sum())
        })
        .collect()
}

/// Scale library sizes by the sequencing depth of their source sample
///
/// Each source sample's observed library size is the linear total of all
/// its cells over all vectors.
fn adjust_library_sizes(
    library_sizes: &mut [f64],
    vectors: &[SingleCellExpressionDataVector],
    targets: &[AggregateTarget],
    sources: &[(usize, i32)],
    unscale: Transform,
) -> Result<(), AggregateError> {
    let dimension = vectors[0].dimension();
    let mut totals = vec![None; dimension.number_of_samples()];
    for ((target, &(source, _)), size) in targets.iter().zip(sources).zip(library_sizes.iter_mut()) {
        let reads = match target
            .source_sample
            .sequence_read_count
            .or(dimension.bio_assays()[source].sequence_read_count)
        {
            Some(reads) => reads,
            None => continue,
        };
        let total = match totals[source] {
            Some(total) => total,
            None => {
                let total = sample_total(vectors, source, unscale)?;
                totals[source] = Some(total);
                total
            }
        };
        if total == 0.0 {
            continue;
        }
        if (reads as f64) < total {
            return Err(AggregateError::LibrarySizeExceedsReads {
                sample: target.source_sample.to_string(),
                reads,
                library_size: total,
            });
        }
        debug!(
            "Scaling library size of {} by {} ({} reads for a library of {})",
            target.assay,
            reads as f64 / total,
            reads,
            total
        );
        *size *= reads as f64 / total;
    }
    Ok(())
}

fn sample_total(
    vectors: &[SingleCellExpressionDataVector],
    source: usize,
    unscale: Transform,
) -> Result<f64, AggregateError> {
    let mut total = 0.0;
    for vector in vectors {
        let view = vector.data_view()?;
        total += vector
            .sample_range(source)?
            .map(|k| view.get(k))
            .filter(|x| !x.is_nan())
            .map(unscale)
            .sum::<f64>();
    }
    Ok(total)
}

/// Apply `f` to every vector, in parallel with the `parallel` feature
fn per_vector<T, F>(vectors: &[SingleCellExpressionDataVector], f: F) -> Result<Vec<T>, AggregateError>
where
    T: Send,
    F: Fn(&SingleCellExpressionDataVector) -> Result<T, AggregateError> + Sync + Send,
{
    let total = vectors.len();
    let done = AtomicUsize::new(0);
    let step = |vector: &SingleCellExpressionDataVector| {
        let result = f(vector);
        let n = done.fetch_add(1, Ordering::Relaxed) + 1;
        if n % PROGRESS_INTERVAL == 0 {
            info!("Aggregated {n}/{total} vectors");
        }
        result
    };

    #[cfg(feature = "parallel")]
    let results = vectors.par_iter().map(step).collect();
    #[cfg(not(feature = "parallel"))]
    let results = vectors.iter().map(step).collect();
    results
}
