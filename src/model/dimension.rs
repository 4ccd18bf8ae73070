use std::ops::Range;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use super::{BioAssay, CellLevelCharacteristics, CellTypeAssignment, ModelError};

static NEXT_DIMENSION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique handle of a [`SingleCellDimension`]
///
/// Caches key on this handle rather than on object identity. Clones share
/// the handle of the dimension they were cloned from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DimensionId(u64);

impl DimensionId {
    fn next() -> Self {
        Self(NEXT_DIMENSION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Structural index of a single-cell experiment
///
/// For an ordered list of samples, the dimension records where each sample's
/// cells begin in the cell universe, the optional cell identifiers, and the
/// categorical annotations attached to the cells.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "SingleCellDimensionRecord")]
pub struct SingleCellDimension {
    #[serde(skip)]
    id: DimensionId,
    bio_assays: Vec<BioAssay>,
    bio_assays_offset: Vec<usize>,
    number_of_cells: usize,
    cell_ids: Option<Vec<String>>,
    cell_type_assignments: Vec<CellTypeAssignment>,
    cell_level_characteristics: Vec<CellLevelCharacteristics>,
}

#[derive(Deserialize)]
struct SingleCellDimensionRecord {
    bio_assays: Vec<BioAssay>,
    bio_assays_offset: Vec<usize>,
    number_of_cells: usize,
    #[serde(default)]
    cell_ids: Option<Vec<String>>,
    #[serde(default)]
    cell_type_assignments: Vec<CellTypeAssignment>,
    #[serde(default)]
    cell_level_characteristics: Vec<CellLevelCharacteristics>,
}

impl TryFrom<SingleCellDimensionRecord> for SingleCellDimension {
    type Error = ModelError;

    fn try_from(record: SingleCellDimensionRecord) -> Result<Self, Self::Error> {
        let mut builder = SingleCellDimension::builder(
            record.bio_assays,
            record.bio_assays_offset,
            record.number_of_cells,
        );
        builder.cell_ids = record.cell_ids;
        builder.cell_type_assignments = record.cell_type_assignments;
        builder.cell_level_characteristics = record.cell_level_characteristics;
        builder.build()
    }
}

impl SingleCellDimension {
    /// Start building a dimension from its assays and offsets
    pub fn builder(
        bio_assays: Vec<BioAssay>,
        bio_assays_offset: Vec<usize>,
        number_of_cells: usize,
    ) -> SingleCellDimensionBuilder {
        SingleCellDimensionBuilder {
            bio_assays,
            bio_assays_offset,
            number_of_cells,
            cell_ids: None,
            cell_type_assignments: Vec::new(),
            cell_level_characteristics: Vec::new(),
        }
    }

    /// Create a dimension without cell IDs or annotations
    pub fn new(
        bio_assays: Vec<BioAssay>,
        bio_assays_offset: Vec<usize>,
        number_of_cells: usize,
    ) -> Result<Self, ModelError> {
        Self::builder(bio_assays, bio_assays_offset, number_of_cells).build()
    }

    /// Create a contiguous dimension from per-sample cell counts
    pub fn from_sample_sizes(bio_assays: Vec<BioAssay>, sizes: &[usize]) -> Result<Self, ModelError> {
        let (offsets, number_of_cells) = cumulative_offsets(sizes);
        Self::new(bio_assays, offsets, number_of_cells)
    }

    /// Cache handle of this dimension
    pub fn id(&self) -> DimensionId {
        self.id
    }

    /// Ordered samples
    pub fn bio_assays(&self) -> &[BioAssay] {
        &self.bio_assays
    }

    /// Start of each sample in the cell universe
    pub fn bio_assays_offset(&self) -> &[usize] {
        &self.bio_assays_offset
    }

    /// Size of the cell universe
    pub fn number_of_cells(&self) -> usize {
        self.number_of_cells
    }

    /// Number of samples
    pub fn number_of_samples(&self) -> usize {
        self.bio_assays.len()
    }

    /// Cell identifiers, aligned with the cell universe
    pub fn cell_ids(&self) -> Option<&[String]> {
        self.cell_ids.as_deref()
    }

    /// Cell type assignments
    pub fn cell_type_assignments(&self) -> &[CellTypeAssignment] {
        &self.cell_type_assignments
    }

    /// Generic cell-level characteristics
    pub fn cell_level_characteristics(&self) -> &[CellLevelCharacteristics] {
        &self.cell_level_characteristics
    }

    /// The preferred cell type assignment, or the only one when there is a single assignment
    pub fn preferred_cell_type_assignment(&self) -> Option<&CellTypeAssignment> {
        self.cell_type_assignments
            .iter()
            .find(|cta| cta.preferred)
            .or(match self.cell_type_assignments.as_slice() {
                [only] => Some(only),
                _ => None,
            })
    }

    /// Number of cells of sample `sample_index`
    pub fn number_of_cells_by_sample(&self, sample_index: usize) -> Result<usize, ModelError> {
        self.check_sample_index(sample_index)?;
        let start = self.bio_assays_offset[sample_index];
        let end = match self.bio_assays_offset.get(sample_index + 1) {
            Some(&next) => next,
            None => self.number_of_cells,
        };
        Ok(end - start)
    }

    /// Range of sample `sample_index` in the cell universe
    pub fn sample_cell_range(&self, sample_index: usize) -> Result<Range<usize>, ModelError> {
        let count = self.number_of_cells_by_sample(sample_index)?;
        let start = self.bio_assays_offset[sample_index];
        Ok(start..start + count)
    }

    /// Cell identifiers of sample `sample_index`, if the dimension carries them
    pub fn cell_ids_by_sample(&self, sample_index: usize) -> Result<Option<&[String]>, ModelError> {
        let range = self.sample_cell_range(sample_index)?;
        Ok(self.cell_ids.as_deref().map(|ids| &ids[range]))
    }

    /// Position of `sample` in this dimension
    pub fn index_of(&self, sample: &BioAssay) -> Option<usize> {
        self.bio_assays.iter().position(|ba| ba == sample)
    }

    /// Position of `sample` in this dimension, failing if absent
    pub fn sample_index(&self, sample: &BioAssay) -> Result<usize, ModelError> {
        self.index_of(sample)
            .ok_or_else(|| ModelError::SampleNotFound(sample.to_string()))
    }

    pub(crate) fn check_sample_index(&self, sample_index: usize) -> Result<(), ModelError> {
        if sample_index >= self.bio_assays.len() {
            return Err(ModelError::SampleIndexOutOfRange {
                index: sample_index,
                len: self.bio_assays.len(),
            });
        }
        Ok(())
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize from JSON, validating the structure
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Builder for [`SingleCellDimension`]
#[derive(Debug, Clone)]
pub struct SingleCellDimensionBuilder {
    bio_assays: Vec<BioAssay>,
    bio_assays_offset: Vec<usize>,
    number_of_cells: usize,
    cell_ids: Option<Vec<String>>,
    cell_type_assignments: Vec<CellTypeAssignment>,
    cell_level_characteristics: Vec<CellLevelCharacteristics>,
}

impl SingleCellDimensionBuilder {
    /// Set the cell identifiers
    pub fn cell_ids(mut self, cell_ids: Vec<String>) -> Self {
        self.cell_ids = Some(cell_ids);
        self
    }

    /// Add a cell type assignment
    pub fn cell_type_assignment(mut self, cta: CellTypeAssignment) -> Self {
        self.cell_type_assignments.push(cta);
        self
    }

    /// Add generic cell-level characteristics
    pub fn cell_level_characteristics(mut self, clc: CellLevelCharacteristics) -> Self {
        self.cell_level_characteristics.push(clc);
        self
    }

    /// Validate and build the dimension
    pub fn build(self) -> Result<SingleCellDimension, ModelError> {
        if self.bio_assays_offset.len() != self.bio_assays.len() {
            return Err(ModelError::OffsetsLengthMismatch {
                offsets: self.bio_assays_offset.len(),
                assays: self.bio_assays.len(),
            });
        }

        let mut previous = 0;
        for (index, &value) in self.bio_assays_offset.iter().enumerate() {
            if value < previous {
                return Err(ModelError::DecreasingOffsets { index, value });
            }
            if value > self.number_of_cells {
                return Err(ModelError::OffsetOutOfBounds {
                    index,
                    value,
                    number_of_cells: self.number_of_cells,
                });
            }
            previous = value;
        }

        if let Some(cell_ids) = &self.cell_ids {
            if cell_ids.len() != self.number_of_cells {
                return Err(ModelError::CellIdsLengthMismatch {
                    expected: self.number_of_cells,
                    actual: cell_ids.len(),
                });
            }
        }

        let annotation_lengths = self
            .cell_type_assignments
            .iter()
            .map(|cta| cta.indices().len())
            .chain(
                self.cell_level_characteristics
                    .iter()
                    .map(|clc| clc.indices().len()),
            );
        for actual in annotation_lengths {
            if actual != self.number_of_cells {
                return Err(ModelError::IndicesLengthMismatch {
                    expected: self.number_of_cells,
                    actual,
                });
            }
        }

        Ok(SingleCellDimension {
            id: DimensionId::next(),
            bio_assays: self.bio_assays,
            bio_assays_offset: self.bio_assays_offset,
            number_of_cells: self.number_of_cells,
            cell_ids: self.cell_ids,
            cell_type_assignments: self.cell_type_assignments,
            cell_level_characteristics: self.cell_level_characteristics,
        })
    }
}

/// Running offsets for contiguous samples of the given sizes, plus their total
pub(crate) fn cumulative_offsets(sizes: &[usize]) -> (Vec<usize>, usize) {
    let mut offsets = Vec::with_capacity(sizes.len());
    let mut total = 0;
    for &size in sizes {
        offsets.push(total);
        total += size;
    }
    (offsets, total)
}
