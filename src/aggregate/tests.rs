use std::sync::Arc;

use super::*;
use crate::codec::{encode_doubles, encode_strings};
use crate::model::{Characteristic, SingleCellDimension};

fn samples() -> Vec<BioAssay> {
    vec![BioAssay::new(1, "s1"), BioAssay::new(2, "s2")]
}

/// Two samples of 3 and 2 cells, typed T B T | B T
fn dimension(reads: Option<u64>) -> Arc<SingleCellDimension> {
    let mut assays = samples();
    assays[0].sequence_read_count = reads;
    let cta = CellTypeAssignment::new(
        vec![Characteristic::new("T cell"), Characteristic::new("B cell")],
        vec![0, 1, 0, 1, 0],
    )
    .unwrap();
    Arc::new(
        SingleCellDimension::builder(assays, vec![0, 3], 5)
            .cell_type_assignment(cta)
            .build()
            .unwrap(),
    )
}

fn vectors(dim: &Arc<SingleCellDimension>, scale: ScaleType, values: [&[f64]; 2]) -> Vec<SingleCellExpressionDataVector> {
    let qt = Arc::new(QuantitationType::new("counts", PrimitiveType::Double, scale));
    let indices = [vec![0, 1, 2, 3, 4], vec![0, 3]];
    ["g1", "g2"]
        .iter()
        .zip(values)
        .zip(indices)
        .map(|((name, values), indices)| {
            SingleCellExpressionDataVector::new(
                name,
                Arc::clone(dim),
                Arc::clone(&qt),
                encode_doubles(values),
                indices,
            )
            .unwrap()
        })
        .collect()
}

fn counts(dim: &Arc<SingleCellDimension>) -> Vec<SingleCellExpressionDataVector> {
    vectors(dim, ScaleType::Count, [&[1.0, 2.0, 3.0, 4.0, 5.0], &[2.0, 6.0]])
}

fn targets() -> Vec<AggregateTarget> {
    let s = samples();
    vec![
        AggregateTarget::new(BioAssay::new(11, "s1 T"), s[0].clone(), 0),
        AggregateTarget::new(BioAssay::new(12, "s1 B"), s[0].clone(), 1),
        AggregateTarget::new(BioAssay::new(22, "s2 B"), s[1].clone(), 1),
        AggregateTarget::new(BioAssay::new(21, "s2 T"), s[1].clone(), 0),
    ]
}

fn config(log2cpm: bool, adjust_library_sizes: bool) -> AggregateConfig {
    AggregateConfig {
        log2cpm,
        adjust_library_sizes,
        compute_sparsity_metrics: true,
    }
}

#[test]
fn test_method_for_scale() {
    assert_eq!(AggregationMethod::for_scale(ScaleType::Count).unwrap(), AggregationMethod::Sum);
    assert_eq!(AggregationMethod::for_scale(ScaleType::Log1p).unwrap(), AggregationMethod::Log1pSum);
    assert_eq!(
        AggregationMethod::for_scale(ScaleType::LogBaseUnknown).unwrap(),
        AggregationMethod::LogSum
    );
    assert!(matches!(
        AggregationMethod::for_scale(ScaleType::Percent),
        Err(AggregateError::UnsupportedScale(ScaleType::Percent))
    ));
}

#[test]
fn test_sum_by_cell_type() {
    let dim = dimension(None);
    let aggregator = Aggregator::new(config(false, false), SparsityMetrics::default());
    let result = aggregator.aggregate(&counts(&dim), &targets()).unwrap();

    assert_eq!(result.method, AggregationMethod::Sum);
    assert_eq!(result.vectors[0].values, vec![4.0, 2.0, 4.0, 5.0]);
    assert_eq!(result.vectors[1].values, vec![2.0, 0.0, 6.0, 0.0]);
    assert_eq!(result.vectors[1].design_element, "g2");
    assert_eq!(result.assays[2].name, "s2 B");
    assert!(result.library_sizes.is_none());
    assert_eq!(result.quantitation_type.representation, PrimitiveType::Double);
    assert_eq!(result.quantitation_type.scale, ScaleType::Count);
    assert_eq!(result.vectors[0].data(), encode_doubles(&[4.0, 2.0, 4.0, 5.0]));
}

#[test]
fn test_log2cpm() {
    let dim = dimension(None);
    let aggregator = Aggregator::new(config(true, false), SparsityMetrics::default());
    let result = aggregator.aggregate(&counts(&dim), &targets()).unwrap();

    assert_eq!(result.library_sizes, Some(vec![6.0, 2.0, 10.0, 5.0]));
    assert_eq!(result.quantitation_type.scale, ScaleType::Log2);
    assert!(result.quantitation_type.name.ends_with("(log2cpm)"));
    let expected = (1e6 * 4.5 / 7.0f64).log2();
    assert!((result.vectors[0].values[0] - expected).abs() < 1e-9);
    let expected = (1e6 * 0.5 / 3.0f64).log2();
    assert!((result.vectors[1].values[1] - expected).abs() < 1e-9);
}

#[test]
fn test_log2cpm_of_empty_library() {
    assert!(to_log2cpm(0.0, 0.0, 1.0).is_nan());
    assert_eq!(to_log2cpm(0.5, 999_999.0, 1.0), 0.0);
}

#[test]
fn test_log_scales() {
    let dim = dimension(None);
    let aggregator = Aggregator::new(config(false, false), SparsityMetrics::default());
    let log1p = vectors(&dim, ScaleType::Log1p, [&[1f64.ln_1p(), 0.0, 3f64.ln_1p(), 0.0, 0.0], &[0.0, 0.0]]);
    let result = aggregator.aggregate(&log1p, &targets()).unwrap();
    assert_eq!(result.method, AggregationMethod::Log1pSum);
    assert!((result.vectors[0].values[0] - 4f64.ln_1p()).abs() < 1e-9);
    assert_eq!(result.quantitation_type.scale, ScaleType::Log1p);

    // unknown bases are taken as natural logs and cannot be converted to log2cpm
    let aggregator = Aggregator::new(config(true, false), SparsityMetrics::default());
    let unknown = vectors(&dim, ScaleType::LogBaseUnknown, [&[0.0, 0.0, 0.0, 0.0, 0.0], &[0.0, 0.0]]);
    let result = aggregator.aggregate(&unknown, &targets()).unwrap();
    assert!(result.library_sizes.is_none());
    assert_eq!(result.quantitation_type.scale, ScaleType::Ln);
    assert!((result.vectors[0].values[0] - 2f64.ln()).abs() < 1e-9);
}

#[test]
fn test_library_size_adjustment() {
    let dim = dimension(Some(100));
    let aggregator = Aggregator::new(config(true, true), SparsityMetrics::default());
    let result = aggregator.aggregate(&counts(&dim), &targets()).unwrap();
    // sample s1 holds 8 counts for 100 reads
    assert_eq!(result.library_sizes, Some(vec![75.0, 25.0, 10.0, 5.0]));

    let dim = dimension(Some(5));
    let err = aggregator.aggregate(&counts(&dim), &targets()).unwrap_err();
    assert!(matches!(
        err,
        AggregateError::LibrarySizeExceedsReads { reads: 5, .. }
    ));
}

#[test]
fn test_sparsity_per_target() {
    let dim = dimension(None);
    let aggregator = Aggregator::default();
    let result = aggregator.aggregate(&counts(&dim), &targets()).unwrap();
    let sparsity = result.sparsity.unwrap();
    assert_eq!(
        sparsity[0],
        TargetSparsity {
            number_of_cells: 2,
            number_of_design_elements: 2,
            number_of_cells_by_design_elements: 3,
        }
    );
    assert_eq!(sparsity[1].number_of_cells, 1);
    assert_eq!(sparsity[2].number_of_design_elements, 2);
    assert_eq!(sparsity[3].number_of_cells_by_design_elements, 1);
}

#[test]
fn test_invalid_inputs() {
    let dim = dimension(None);
    let aggregator = Aggregator::default();
    assert!(matches!(
        aggregator.aggregate(&[], &targets()),
        Err(AggregateError::NoVectors)
    ));

    let mut bad = targets();
    bad[0].cell_type = 5;
    assert!(matches!(
        aggregator.aggregate(&counts(&dim), &bad),
        Err(AggregateError::InvalidCellType(5))
    ));

    let mut bad = targets();
    bad[0].source_sample = BioAssay::new(99, "other");
    assert!(matches!(
        aggregator.aggregate(&counts(&dim), &bad),
        Err(AggregateError::Model(_))
    ));

    let mut mixed = counts(&dim);
    mixed.extend(vectors(&dim, ScaleType::Linear, [&[1.0; 5], &[1.0, 1.0]]));
    assert!(matches!(
        aggregator.aggregate(&mixed, &targets()),
        Err(AggregateError::MixedQuantitationTypes)
    ));

    let mut mixed = counts(&dim);
    mixed.extend(counts(&dimension(None)));
    assert!(matches!(
        aggregator.aggregate(&mixed, &targets()),
        Err(AggregateError::MixedDimensions)
    ));

    let plain = Arc::new(SingleCellDimension::new(samples(), vec![0, 3], 5).unwrap());
    assert!(matches!(
        aggregator.aggregate(&counts(&plain), &targets()),
        Err(AggregateError::NoCellTypeAssignment)
    ));

    let labels = SingleCellExpressionDataVector::new(
        "g",
        Arc::clone(&dim),
        Arc::new(QuantitationType::new("labels", PrimitiveType::String, ScaleType::Linear)),
        encode_strings(&["a"]),
        vec![0],
    )
    .unwrap();
    assert!(matches!(
        aggregator.aggregate(&[labels], &targets()),
        Err(AggregateError::UnsupportedRepresentation(PrimitiveType::String))
    ));
}
