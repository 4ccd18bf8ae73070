use std::ops::Range;
use std::sync::Arc;

use crate::codec::{decode_strings, CodecError, DataView, PrimitiveType};

use super::{ModelError, QuantitationType, SingleCellDimension};

/// One design element's sparse expression row
///
/// Only present values are stored: `data` holds them packed according to the
/// quantitation type's representation and `data_indices[k]` is the position in
/// the dimension's cell universe of the `k`-th value. Indices are strictly
/// increasing, so each sample's values form a contiguous run that is located
/// from the dimension's offsets.
#[derive(Debug, Clone)]
pub struct SingleCellExpressionDataVector {
    design_element: String,
    dimension: Arc<SingleCellDimension>,
    quantitation_type: Arc<QuantitationType>,
    data: Vec<u8>,
    data_indices: Vec<usize>,
}

impl SingleCellExpressionDataVector {
    /// Create a vector, validating its data against the dimension
    pub fn new(
        design_element: &str,
        dimension: Arc<SingleCellDimension>,
        quantitation_type: Arc<QuantitationType>,
        data: Vec<u8>,
        data_indices: Vec<usize>,
    ) -> Result<Self, ModelError> {
        let elements = match quantitation_type.representation.size_in_bytes() {
            Some(width) => {
                if data.len() % width != 0 {
                    return Err(CodecError::InvalidLength {
                        width,
                        actual: data.len(),
                    }
                    .into());
                }
                data.len() / width
            }
            None => decode_strings(&data)?.len(),
        };
        if elements != data_indices.len() {
            return Err(ModelError::DataLengthMismatch {
                expected: data_indices.len(),
                actual: elements,
            });
        }

        let number_of_cells = dimension.number_of_cells();
        for (position, &value) in data_indices.iter().enumerate() {
            if value >= number_of_cells {
                return Err(ModelError::DataIndexOutOfBounds {
                    position,
                    value,
                    number_of_cells,
                });
            }
            if position > 0 && value <= data_indices[position - 1] {
                return Err(ModelError::UnsortedDataIndices { position, value });
            }
        }

        Ok(Self::from_parts(
            design_element.to_string(),
            dimension,
            quantitation_type,
            data,
            data_indices,
        ))
    }

    /// Assemble a vector whose parts are already known to be consistent
    pub(crate) fn from_parts(
        design_element: String,
        dimension: Arc<SingleCellDimension>,
        quantitation_type: Arc<QuantitationType>,
        data: Vec<u8>,
        data_indices: Vec<usize>,
    ) -> Self {
        Self {
            design_element,
            dimension,
            quantitation_type,
            data,
            data_indices,
        }
    }

    /// Design element (gene or probe) of this row
    pub fn design_element(&self) -> &str {
        &self.design_element
    }

    /// Shared dimension
    pub fn dimension(&self) -> &Arc<SingleCellDimension> {
        &self.dimension
    }

    /// Shared quantitation type
    pub fn quantitation_type(&self) -> &Arc<QuantitationType> {
        &self.quantitation_type
    }

    /// Representation of the data buffer
    pub fn representation(&self) -> PrimitiveType {
        self.quantitation_type.representation
    }

    /// Raw data buffer
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Cell universe position of each stored value
    pub fn data_indices(&self) -> &[usize] {
        &self.data_indices
    }

    /// Number of stored values
    pub fn nnz(&self) -> usize {
        self.data_indices.len()
    }

    /// Typed view over the data buffer
    pub fn data_view(&self) -> Result<DataView<'_>, CodecError> {
        DataView::new(self.representation(), &self.data)
    }

    /// Decode the data of a `STRING` vector
    pub fn data_as_strings(&self) -> Result<Vec<String>, CodecError> {
        decode_strings(&self.data)
    }

    /// First position in `data_indices`, at or after `search_from`, that belongs to sample `sample_index` or a later one
    ///
    /// When iterating samples in ascending order, pass the previous sample's
    /// end as `search_from`; for random access, pass 0.
    pub fn sample_start(&self, sample_index: usize, search_from: usize) -> Result<usize, ModelError> {
        self.dimension.check_sample_index(sample_index)?;
        let offset = self.dimension.bio_assays_offset()[sample_index];
        Ok(self.search(offset, search_from))
    }

    /// First position in `data_indices`, at or after `start`, past the cells of sample `sample_index`
    pub fn sample_end(&self, sample_index: usize, start: usize) -> Result<usize, ModelError> {
        let cells = self.dimension.sample_cell_range(sample_index)?;
        Ok(self.search(cells.end, start))
    }

    /// Positions in `data_indices` holding the values of sample `sample_index`
    pub fn sample_range(&self, sample_index: usize) -> Result<Range<usize>, ModelError> {
        let start = self.sample_start(sample_index, 0)?;
        let end = self.sample_end(sample_index, start)?;
        Ok(start..end)
    }

    fn search(&self, cell: usize, from: usize) -> usize {
        let from = from.min(self.data_indices.len());
        from + self.data_indices[from..].partition_point(|&i| i < cell)
    }
}
