use std::sync::Arc;

use super::descriptive::*;
use super::*;
use crate::codec::{
    encode_booleans, encode_chars, encode_doubles, encode_ints, encode_strings, PrimitiveType,
};
use crate::model::{
    BioAssay, CellLevelCharacteristics, Characteristic, ModelError, QuantitationType, ScaleType,
    SingleCellDimension, SingleCellExpressionDataVector,
};

fn assays(n: usize) -> Vec<BioAssay> {
    (0..n)
        .map(|i| BioAssay::new(i as i64 + 1, &format!("sample{}", i + 1)))
        .collect()
}

fn qt(representation: PrimitiveType, scale: ScaleType) -> Arc<QuantitationType> {
    Arc::new(QuantitationType::new("test", representation, scale))
}

fn doubles(
    dim: &Arc<SingleCellDimension>,
    scale: ScaleType,
    values: &[f64],
    indices: Vec<usize>,
) -> SingleCellExpressionDataVector {
    SingleCellExpressionDataVector::new(
        "G",
        Arc::clone(dim),
        qt(PrimitiveType::Double, scale),
        encode_doubles(values),
        indices,
    )
    .unwrap()
}

/// Two samples of 3 and 2 cells, one NaN in the first sample
fn scenario() -> SingleCellExpressionDataVector {
    let dim = Arc::new(SingleCellDimension::new(assays(2), vec![0, 3], 5).unwrap());
    doubles(
        &dim,
        ScaleType::Linear,
        &[1.0, 2.0, f64::NAN, 4.0, 5.0],
        vec![0, 1, 2, 3, 4],
    )
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn test_end_to_end_count_and_mean() {
    let v = scenario();
    assert_eq!(count(&v).unwrap(), vec![2, 2]);
    assert_eq!(count_fast(&v).unwrap(), vec![3, 2]);
    assert_eq!(mean(&v).unwrap(), vec![1.5, 4.5]);
    assert_eq!(count_for_sample(&v, 1).unwrap(), 2);
    assert_eq!(compute_for_sample(&v, 0, Statistic::Mean).unwrap(), 1.5);
}

#[test]
fn test_order_statistics_skip_nan() {
    let v = scenario();
    assert_eq!(min(&v).unwrap(), vec![1.0, 4.0]);
    assert_eq!(max(&v).unwrap(), vec![2.0, 5.0]);
    assert_eq!(median(&v).unwrap(), vec![1.5, 4.5]);
    assert_eq!(quantile(&v, 1.0).unwrap(), vec![2.0, 5.0]);
    assert_eq!(quantile(&v, 0.0).unwrap(), vec![1.0, 4.0]);
    assert!(matches!(quantile(&v, 1.5), Err(StatsError::InvalidQuantile(_))));
}

#[test]
fn test_variance() {
    let v = scenario();
    assert_eq!(sample_variance(&v).unwrap(), vec![0.5, 0.5]);
    let sd = sample_standard_deviation(&v).unwrap();
    assert!(approx(sd[0], 0.5f64.sqrt()));

    let dim = Arc::new(SingleCellDimension::new(assays(1), vec![0], 3).unwrap());
    let single = doubles(&dim, ScaleType::Linear, &[3.0], vec![1]);
    assert!(sample_variance(&single).unwrap()[0].is_nan());
}

#[test]
fn test_sums_respect_scale() {
    let dim = Arc::new(SingleCellDimension::new(assays(1), vec![0], 3).unwrap());
    let v = doubles(&dim, ScaleType::Log2, &[1.0, 2.0], vec![0, 2]);
    assert_eq!(sum_unscaled(&v).unwrap(), vec![6.0]);
    assert!(approx(sum(&v).unwrap()[0], 6f64.log2()));
    assert_eq!(mean(&v).unwrap(), vec![3.0]);
    // order statistics stay on the stored scale
    assert_eq!(max(&v).unwrap(), vec![2.0]);

    let unknown = doubles(&dim, ScaleType::LogBaseUnknown, &[1.0], vec![0]);
    assert!(matches!(
        mean(&unknown),
        Err(StatsError::UnsupportedScale { .. })
    ));
    assert_eq!(min(&unknown).unwrap(), vec![1.0]);
}

#[test]
fn test_empty_sample() {
    let dim = Arc::new(SingleCellDimension::from_sample_sizes(assays(2), &[2, 2]).unwrap());
    let v = doubles(&dim, ScaleType::Linear, &[1.0], vec![3]);
    assert_eq!(count(&v).unwrap(), vec![0, 1]);
    assert_eq!(sum_unscaled(&v).unwrap(), vec![0.0, 1.0]);
    assert!(mean(&v).unwrap()[0].is_nan());
    assert!(median(&v).unwrap()[0].is_nan());
    assert!(min(&v).unwrap()[0].is_nan());
}

#[test]
fn test_count_without_missing_value() {
    let dim = Arc::new(SingleCellDimension::from_sample_sizes(assays(2), &[2, 3]).unwrap());
    let ints = SingleCellExpressionDataVector::new(
        "G",
        Arc::clone(&dim),
        qt(PrimitiveType::Int, ScaleType::Count),
        encode_ints(&[0, 3, 1, 0, 7]),
        vec![0, 1, 2, 3, 4],
    )
    .unwrap();
    assert_eq!(count(&ints).unwrap(), vec![2, 3]);
    assert_eq!(count_above_threshold(&ints, 0.0).unwrap(), vec![1, 2]);
    assert_eq!(count_above_threshold(&ints, 1.0).unwrap(), vec![1, 1]);

    // false and zero are stored values, not missing ones
    let booleans = SingleCellExpressionDataVector::new(
        "G",
        Arc::clone(&dim),
        qt(PrimitiveType::Boolean, ScaleType::Linear),
        encode_booleans(&[true, false, false, true, false]),
        vec![0, 1, 2, 3, 4],
    )
    .unwrap();
    assert_eq!(count(&booleans).unwrap(), vec![2, 3]);

    let chars = SingleCellExpressionDataVector::new(
        "G",
        Arc::clone(&dim),
        qt(PrimitiveType::Char, ScaleType::Linear),
        encode_chars(&[0, 97, 0, 98, 99]),
        vec![0, 1, 2, 3, 4],
    )
    .unwrap();
    assert_eq!(count(&chars).unwrap(), vec![2, 3]);
    for i in 0..2 {
        let cells = dim.number_of_cells_by_sample(i).unwrap();
        assert_eq!(count_for_sample(&booleans, i).unwrap(), cells);
        assert_eq!(count_for_sample(&chars, i).unwrap(), cells);
    }

    let strings = SingleCellExpressionDataVector::new(
        "G",
        dim,
        qt(PrimitiveType::String, ScaleType::Linear),
        encode_strings(&["a", "", "b"]),
        vec![0, 2, 4],
    )
    .unwrap();
    assert_eq!(count(&strings).unwrap(), vec![1, 2]);
    assert!(matches!(
        mean(&strings),
        Err(StatsError::UnsupportedRepresentation {
            representation: PrimitiveType::String,
            ..
        })
    ));
    assert!(matches!(
        count_above_threshold(&strings, 0.0),
        Err(StatsError::UnsupportedRepresentation { .. })
    ));
}

#[test]
fn test_sample_lookup_by_assay() {
    let v = scenario();
    let samples = assays(2);
    assert_eq!(compute_for_assay(&v, &samples[1], Statistic::Mean).unwrap(), 4.5);
    let err = compute_for_assay(&v, &BioAssay::new(99, "other"), Statistic::Mean).unwrap_err();
    assert!(matches!(err, StatsError::Model(ModelError::SampleNotFound(_))));
    assert_eq!(count_for_assay(&v, &samples[0]).unwrap(), 2);
    assert_eq!(count_for_assay(&v, &samples[1]).unwrap(), 2);
    assert!(matches!(
        count_for_assay(&v, &BioAssay::new(99, "other")),
        Err(StatsError::Model(ModelError::SampleNotFound(_)))
    ));
    assert!(matches!(
        compute_for_sample(&v, 2, Statistic::Mean),
        Err(StatsError::Model(ModelError::SampleIndexOutOfRange { .. }))
    ));
}

fn annotations() -> CellLevelCharacteristics {
    CellLevelCharacteristics::new(
        vec![Characteristic::new("treated"), Characteristic::new("control")],
        vec![0, 1, 0, 1, -1, 0],
    )
    .unwrap()
}

/// Two samples of 3 cells and two genes
fn sparse_pair() -> (SingleCellExpressionDataVector, SingleCellExpressionDataVector) {
    let dim = Arc::new(SingleCellDimension::from_sample_sizes(assays(2), &[3, 3]).unwrap());
    let v1 = doubles(&dim, ScaleType::Linear, &[0.5, 2.0, 3.0], vec![0, 1, 4]);
    let v2 = doubles(&dim, ScaleType::Linear, &[1.0, 0.0, 4.0], vec![1, 2, 5]);
    (v1, v2)
}

#[test]
fn test_statistics_for_cells() {
    let (v1, v2) = sparse_pair();
    let clc = annotations();
    let treated = CellFilter::new(&clc, 0).unwrap();
    let control = CellFilter::new(&clc, 1).unwrap();
    assert_eq!(compute_for_cells(&v1, 0, &treated, Statistic::Sum).unwrap(), 0.5);
    assert_eq!(compute_for_cells(&v1, 0, &control, Statistic::Sum).unwrap(), 2.0);
    assert_eq!(count_for_cells(&v2, 0, &treated).unwrap(), 1);
    assert_eq!(count_fast_for_cells(&v2, 1, &treated).unwrap(), 1);
    assert_eq!(count_above_threshold_for_cells(&v2, 0, &treated, 0.0).unwrap(), 0);

    let unknown = CellFilter::new(&clc, -1).unwrap();
    assert_eq!(compute_for_cells(&v1, 1, &unknown, Statistic::Max).unwrap(), 3.0);

    assert!(matches!(
        CellFilter::new(&clc, 2),
        Err(StatsError::InvalidCategory(2))
    ));
    let short = CellLevelCharacteristics::new(vec![Characteristic::new("x")], vec![0, 0]).unwrap();
    let filter = CellFilter::new(&short, 0).unwrap();
    assert!(matches!(
        count_for_cells(&v1, 0, &filter),
        Err(StatsError::CellCountMismatch { expected: 6, actual: 2 })
    ));
}

#[test]
fn test_threshold_transforms() {
    let metrics = SparsityMetrics::new(1.0).unwrap();
    assert!(metrics.is_expressed(0.7, ScaleType::Log1p).unwrap());
    assert!(!metrics.is_expressed(0.69, ScaleType::Log1p).unwrap());
    assert!(!metrics.is_expressed(0.0, ScaleType::Log2).unwrap());
    assert!(metrics.is_expressed(0.1, ScaleType::Log10).unwrap());

    let metrics = SparsityMetrics::new(0.6).unwrap();
    assert!(!metrics.is_expressed(1.0, ScaleType::Count).unwrap());
    assert!(metrics.is_expressed(2.0, ScaleType::Count).unwrap());
    assert!(metrics.is_expressed(0.7, ScaleType::Linear).unwrap());
    assert!(matches!(
        metrics.is_expressed(50.0, ScaleType::Percent),
        Err(StatsError::UnsupportedThreshold { .. })
    ));

    let zero = SparsityMetrics::default();
    assert!(zero.is_expressed(-3.0, ScaleType::Log2).unwrap());
    assert!(zero.is_expressed(0.1, ScaleType::Percent1).unwrap());
    assert!(!zero.is_expressed(f64::NAN, ScaleType::Linear).unwrap());

    assert!(matches!(
        SparsityMetrics::new(-1.0),
        Err(StatsError::InvalidThreshold(_))
    ));
    assert!(SparsityMetrics::new(f64::INFINITY).is_err());
}

#[test]
fn test_is_supported() {
    let dim = Arc::new(SingleCellDimension::new(assays(1), vec![0], 2).unwrap());
    let percent = doubles(&dim, ScaleType::Percent, &[10.0], vec![0]);
    assert!(SparsityMetrics::default().is_supported(&percent));
    assert!(!SparsityMetrics::new(1.0).unwrap().is_supported(&percent));

    let strings = SingleCellExpressionDataVector::new(
        "G",
        dim,
        qt(PrimitiveType::String, ScaleType::Linear),
        encode_strings(&["a"]),
        vec![0],
    )
    .unwrap();
    assert!(!SparsityMetrics::default().is_supported(&strings));
}

#[test]
fn test_sparsity_counts() {
    let (v1, v2) = sparse_pair();
    let vectors = [v1, v2];
    let metrics = SparsityMetrics::new(0.5).unwrap();

    assert_eq!(metrics.number_of_cells(&vectors, 0, None).unwrap(), 1);
    assert_eq!(metrics.number_of_design_elements(&vectors, 0, None).unwrap(), 2);
    assert_eq!(metrics.number_of_cells_by_design_elements(&vectors, 0, None).unwrap(), 2);
    assert_eq!(metrics.number_of_cells(&vectors, 1, None).unwrap(), 2);

    let zero = SparsityMetrics::default();
    assert_eq!(zero.number_of_cells(&vectors, 0, None).unwrap(), 2);
    assert_eq!(zero.number_of_cells_by_design_elements(&vectors, 0, None).unwrap(), 3);

    let clc = annotations();
    let treated = CellFilter::new(&clc, 0).unwrap();
    assert_eq!(metrics.number_of_cells(&vectors, 0, Some(&treated)).unwrap(), 0);
    assert_eq!(metrics.number_of_design_elements(&vectors, 0, Some(&treated)).unwrap(), 0);
    assert_eq!(metrics.number_of_cells(&vectors, 1, Some(&treated)).unwrap(), 1);
    assert_eq!(metrics.number_of_design_elements(&vectors, 1, Some(&treated)).unwrap(), 1);
    assert_eq!(
        metrics
            .number_of_cells_by_design_elements(&vectors, 1, Some(&treated))
            .unwrap(),
        1
    );

    let empty: [SingleCellExpressionDataVector; 0] = [];
    assert_eq!(metrics.number_of_cells(&empty, 0, None).unwrap(), 0);
}

#[test]
fn test_add_expressed_cells_skips_marked_cells() {
    let (v1, _) = sparse_pair();
    let mut present = vec![false; 6];
    present[2] = true;
    SparsityMetrics::default()
        .add_expressed_cells(&v1, 0, None, &mut present)
        .unwrap();
    assert_eq!(present, vec![true, true, true, false, false, false]);
}

#[test]
fn test_add_expressed_cells_rejects_wrong_length() {
    let v = scenario();
    let mut short = vec![false; 2];
    assert!(matches!(
        SparsityMetrics::default().add_expressed_cells(&v, 1, None, &mut short),
        Err(StatsError::CellCountMismatch {
            expected: 5,
            actual: 2
        })
    ));
    assert_eq!(short, vec![false, false]);

    let mut long = vec![false; 6];
    assert!(matches!(
        SparsityMetrics::default().add_expressed_cells(&v, 0, None, &mut long),
        Err(StatsError::CellCountMismatch {
            expected: 5,
            actual: 6
        })
    ));
}

#[test]
fn test_mixed_dimensions() {
    let (v1, _) = sparse_pair();
    let (other, _) = sparse_pair();
    assert!(matches!(
        SparsityMetrics::default().number_of_cells([&v1, &other], 0, None),
        Err(StatsError::MixedDimensions)
    ));
}
