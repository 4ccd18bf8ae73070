//! # Slicing single-cell data by samples
//!
//! A [`Slicer`] restricts dimensions and vectors to an ordered subset of
//! their samples. The resulting dimension lays the requested samples out
//! contiguously, in the requested order, and every vector's data indices are
//! remapped into the new cell universe:
//!
//! ```text
//! new_index = old_index - old_offset[source position] + new_offset[target position]
//! ```
//!
//! Many vectors share one dimension, so the sliced dimension and the source
//! position of each requested sample are memoized per source
//! [`DimensionId`]. A slicer is bound to a single subset of samples; use one
//! slicer per subset.
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut slicer = Slicer::new(vec![sample2.clone(), sample1.clone()])?;
//! let sliced: Vec<_> = slicer.slice_all(&vectors)?;
//! ```

mod error;


use std::collections::HashMap;
use std::ops::Range;
use std::sync::Arc;

use log::debug;

use crate::model::{
    cumulative_offsets, BioAssay, CellLevelCharacteristics, CellTypeAssignment, DimensionId,
    SingleCellDimension, SingleCellExpressionDataVector,
};

pub use error::SliceError;

/// Auxiliary structures already sliced by the caller
///
/// When a field is set, it replaces the structure the slicer would otherwise
/// derive from the source dimension. Each is validated against the sliced
/// cell universe.
#[derive(Debug, Clone, Default)]
pub struct SliceOptions {
    /// Cell identifiers of the sliced dimension
    pub cell_ids: Option<Vec<String>>,

    /// Cell type assignments of the sliced dimension
    pub cell_type_assignments: Option<Vec<CellTypeAssignment>>,

    /// Cell-level characteristics of the sliced dimension
    pub cell_level_characteristics: Option<Vec<CellLevelCharacteristics>>,
}

/// Position of each requested sample in one source dimension
#[derive(Debug)]
struct SourcePositions {
    /// Source position of each target sample, in target order
    positions: Vec<usize>,
    /// Target indices ordered by ascending source position
    scan_order: Vec<usize>,
}

/// Slices dimensions and vectors to an ordered subset of samples
#[derive(Debug)]
pub struct Slicer {
    samples: Vec<BioAssay>,
    options: SliceOptions,
    dimensions: HashMap<DimensionId, Arc<SingleCellDimension>>,
    positions: HashMap<DimensionId, Arc<SourcePositions>>,
}

impl Slicer {
    /// Create a slicer for the given samples
    pub fn new(samples: Vec<BioAssay>) -> Result<Self, SliceError> {
        Self::with_options(samples, SliceOptions::default())
    }

    /// Create a slicer that reuses pre-sliced auxiliary structures
    pub fn with_options(samples: Vec<BioAssay>, options: SliceOptions) -> Result<Self, SliceError> {
        for (i, sample) in samples.iter().enumerate() {
            if samples[..i].contains(sample) {
                return Err(SliceError::DuplicateAssay(sample.to_string()));
            }
        }
        Ok(Self {
            samples,
            options,
            dimensions: HashMap::new(),
            positions: HashMap::new(),
        })
    }

    /// Requested samples, in output order
    pub fn samples(&self) -> &[BioAssay] {
        &self.samples
    }

    /// Slice a dimension
    ///
    /// Slicing the same source dimension twice returns the same shared
    /// result.
    pub fn slice_dimension(
        &mut self,
        dimension: &SingleCellDimension,
    ) -> Result<Arc<SingleCellDimension>, SliceError> {
        if let Some(sliced) = self.dimensions.get(&dimension.id()) {
            return Ok(Arc::clone(sliced));
        }

        let source = self.source_positions(dimension)?;
        let sizes = source
            .positions
            .iter()
            .map(|&p| dimension.number_of_cells_by_sample(p))
            .collect::<Result<Vec<_>, _>>()?;
        let (offsets, number_of_cells) = cumulative_offsets(&sizes);

        let mut builder = SingleCellDimension::builder(self.samples.clone(), offsets, number_of_cells);

        let cell_ids = match &self.options.cell_ids {
            Some(cell_ids) => Some(cell_ids.clone()),
            None => dimension
                .cell_ids()
                .map(|ids| slice_per_sample(ids, dimension, &source.positions, number_of_cells)),
        };
        if let Some(cell_ids) = cell_ids {
            builder = builder.cell_ids(cell_ids);
        }

        let ctas = match &self.options.cell_type_assignments {
            Some(ctas) => ctas.clone(),
            None => dimension
                .cell_type_assignments()
                .iter()
                .map(|cta| {
                    cta.with_indices(slice_per_sample(
                        cta.indices(),
                        dimension,
                        &source.positions,
                        number_of_cells,
                    ))
                })
                .collect(),
        };
        for cta in ctas {
            builder = builder.cell_type_assignment(cta);
        }

        let clcs = match &self.options.cell_level_characteristics {
            Some(clcs) => clcs.clone(),
            None => dimension
                .cell_level_characteristics()
                .iter()
                .map(|clc| {
                    clc.with_indices(slice_per_sample(
                        clc.indices(),
                        dimension,
                        &source.positions,
                        number_of_cells,
                    ))
                })
                .collect(),
        };
        for clc in clcs {
            builder = builder.cell_level_characteristics(clc);
        }

        let sliced = Arc::new(builder.build()?);
        debug!(
            "Sliced dimension {:?} ({} assays, {} cells) to {:?} ({} assays, {} cells)",
            dimension.id(),
            dimension.number_of_samples(),
            dimension.number_of_cells(),
            sliced.id(),
            sliced.number_of_samples(),
            sliced.number_of_cells()
        );
        self.dimensions.insert(dimension.id(), Arc::clone(&sliced));
        Ok(sliced)
    }

    /// Slice a vector
    pub fn slice(
        &mut self,
        vector: &SingleCellExpressionDataVector,
    ) -> Result<SingleCellExpressionDataVector, SliceError> {
        let width = vector.representation().fixed_width()?;
        let source_dimension = vector.dimension();
        let dimension = self.slice_dimension(source_dimension)?;
        let source = self.source_positions(source_dimension)?;

        let ranges = sample_ranges(vector, &source)?;
        let nnz: usize = ranges.iter().map(|r| r.len()).sum();

        let source_offsets = source_dimension.bio_assays_offset();
        let target_offsets = dimension.bio_assays_offset();
        let mut data = Vec::with_capacity(nnz * width);
        let mut data_indices = Vec::with_capacity(nnz);
        for (target, range) in ranges.into_iter().enumerate() {
            let old_offset = source_offsets[source.positions[target]];
            let new_offset = target_offsets[target];
            data.extend_from_slice(&vector.data()[range.start * width..range.end * width]);
            data_indices.extend(
                vector.data_indices()[range]
                    .iter()
                    .map(|&i| i - old_offset + new_offset),
            );
        }

        Ok(SingleCellExpressionDataVector::from_parts(
            vector.design_element().to_string(),
            dimension,
            Arc::clone(vector.quantitation_type()),
            data,
            data_indices,
        ))
    }

    /// Slice a collection of vectors
    pub fn slice_all<'a, I>(&mut self, vectors: I) -> Result<Vec<SingleCellExpressionDataVector>, SliceError>
    where
        I: IntoIterator<Item = &'a SingleCellExpressionDataVector>,
    {
        vectors.into_iter().map(|v| self.slice(v)).collect()
    }

    fn source_positions(
        &mut self,
        dimension: &SingleCellDimension,
    ) -> Result<Arc<SourcePositions>, SliceError> {
        if let Some(positions) = self.positions.get(&dimension.id()) {
            return Ok(Arc::clone(positions));
        }

        let mut positions = Vec::with_capacity(self.samples.len());
        let mut missing = Vec::new();
        for sample in &self.samples {
            match dimension.index_of(sample) {
                Some(p) => positions.push(p),
                None => missing.push(sample.to_string()),
            }
        }
        if !missing.is_empty() {
            return Err(SliceError::MissingAssays(missing.join(", ")));
        }

        let sorted = positions.windows(2).all(|w| w[0] < w[1]);
        let mut scan_order: Vec<usize> = (0..positions.len()).collect();
        if !sorted {
            debug!(
                "Requested assays are not in the order of dimension {:?}, scanning in source order",
                dimension.id()
            );
            scan_order.sort_by_key(|&t| positions[t]);
        }

        let source = Arc::new(SourcePositions {
            positions,
            scan_order,
        });
        self.positions.insert(dimension.id(), Arc::clone(&source));
        Ok(source)
    }
}

/// Slice a collection of vectors to the given samples with a one-off slicer
pub fn slice_vectors(
    vectors: &[SingleCellExpressionDataVector],
    samples: Vec<BioAssay>,
) -> Result<Vec<SingleCellExpressionDataVector>, SliceError> {
    Slicer::new(samples)?.slice_all(vectors)
}

/// Range of each target sample in the vector's data indices
///
/// Samples are scanned in ascending source order so that each search resumes
/// where the previous one ended.
fn sample_ranges(
    vector: &SingleCellExpressionDataVector,
    source: &SourcePositions,
) -> Result<Vec<Range<usize>>, SliceError> {
    let mut ranges = vec![0..0; source.positions.len()];
    let mut last_end = 0;
    for &target in &source.scan_order {
        let position = source.positions[target];
        let start = vector.sample_start(position, last_end)?;
        let end = vector.sample_end(position, start)?;
        ranges[target] = start..end;
        last_end = end;
    }
    Ok(ranges)
}

/// Concatenate each target sample's run of a per-cell array
fn slice_per_sample<T: Clone>(
    values: &[T],
    dimension: &SingleCellDimension,
    positions: &[usize],
    number_of_cells: usize,
) -> Vec<T> {
    let mut sliced = Vec::with_capacity(number_of_cells);
    for &p in positions {
        let start = dimension.bio_assays_offset()[p];
        let end = dimension
            .bio_assays_offset()
            .get(p + 1)
            .copied()
            .unwrap_or(dimension.number_of_cells());
        sliced.extend_from_slice(&values[start..end]);
    }
    sliced
}
