use std::sync::Arc;

use super::*;
use crate::codec::{encode_doubles, encode_ints, encode_strings, PrimitiveType};

fn assays(n: usize) -> Vec<BioAssay> {
    (0..n)
        .map(|i| BioAssay::new(i as i64 + 1, &format!("sample{}", i + 1)))
        .collect()
}

fn two_sample_dimension() -> Arc<SingleCellDimension> {
    Arc::new(SingleCellDimension::new(assays(2), vec![0, 3], 5).unwrap())
}

#[test]
fn test_number_of_cells_by_sample() {
    let dim = SingleCellDimension::from_sample_sizes(assays(3), &[4, 0, 6]).unwrap();
    assert_eq!(dim.bio_assays_offset(), &[0, 4, 4]);
    assert_eq!(dim.number_of_cells(), 10);
    assert_eq!(dim.number_of_cells_by_sample(0).unwrap(), 4);
    assert_eq!(dim.number_of_cells_by_sample(1).unwrap(), 0);
    assert_eq!(dim.number_of_cells_by_sample(2).unwrap(), 6);
    assert!(matches!(
        dim.number_of_cells_by_sample(3),
        Err(ModelError::SampleIndexOutOfRange { index: 3, len: 3 })
    ));
}

#[test]
fn test_dimension_validation() {
    assert!(matches!(
        SingleCellDimension::new(assays(2), vec![0], 5),
        Err(ModelError::OffsetsLengthMismatch {
            offsets: 1,
            assays: 2
        })
    ));
    assert!(matches!(
        SingleCellDimension::new(assays(2), vec![3, 0], 5),
        Err(ModelError::DecreasingOffsets { index: 1, value: 0 })
    ));
    assert!(matches!(
        SingleCellDimension::new(assays(2), vec![0, 6], 5),
        Err(ModelError::OffsetOutOfBounds { .. })
    ));
    assert!(matches!(
        SingleCellDimension::builder(assays(1), vec![0], 2)
            .cell_ids(vec!["a".to_string()])
            .build(),
        Err(ModelError::CellIdsLengthMismatch {
            expected: 2,
            actual: 1
        })
    ));
    let cta = CellTypeAssignment::new(vec![Characteristic::new("neuron")], vec![0, 0, 0]).unwrap();
    assert!(matches!(
        SingleCellDimension::builder(assays(1), vec![0], 2)
            .cell_type_assignment(cta)
            .build(),
        Err(ModelError::IndicesLengthMismatch { .. })
    ));
}

#[test]
fn test_dimension_ids_are_unique() {
    let a = SingleCellDimension::new(assays(1), vec![0], 1).unwrap();
    let b = SingleCellDimension::new(assays(1), vec![0], 1).unwrap();
    assert_ne!(a.id(), b.id());
    assert_eq!(a.clone().id(), a.id());
}

#[test]
fn test_sample_lookup() {
    let dim = two_sample_dimension();
    let all = assays(3);
    assert_eq!(dim.index_of(&all[1]), Some(1));
    assert_eq!(dim.index_of(&all[2]), None);
    assert!(matches!(
        dim.sample_index(&all[2]),
        Err(ModelError::SampleNotFound(_))
    ));
}

#[test]
fn test_cell_ids_by_sample() {
    let ids: Vec<String> = ["a", "b", "c", "d", "e"].iter().map(|s| s.to_string()).collect();
    let dim = SingleCellDimension::builder(assays(2), vec![0, 3], 5)
        .cell_ids(ids)
        .build()
        .unwrap();
    assert_eq!(dim.cell_ids_by_sample(1).unwrap().unwrap(), &["d", "e"]);
}

#[test]
fn test_sample_start_end() {
    let dim = two_sample_dimension();
    let qt = Arc::new(QuantitationType::new("counts", PrimitiveType::Double, ScaleType::Count));
    // cell 1 has no value
    let vector = SingleCellExpressionDataVector::new(
        "GENE1",
        dim,
        qt,
        encode_doubles(&[1.0, 3.0, 4.0, 5.0]),
        vec![0, 2, 3, 4],
    )
    .unwrap();

    let start = vector.sample_start(0, 0).unwrap();
    let end = vector.sample_end(0, start).unwrap();
    assert_eq!((start, end), (0, 2));

    // start/end trick
    let start = vector.sample_start(1, end).unwrap();
    let end = vector.sample_end(1, start).unwrap();
    assert_eq!((start, end), (2, 4));

    assert_eq!(vector.sample_range(1).unwrap(), 2..4);
    assert!(vector.sample_start(2, 0).is_err());
}

#[test]
fn test_sample_without_values() {
    let dim = two_sample_dimension();
    let qt = Arc::new(QuantitationType::new("counts", PrimitiveType::Int, ScaleType::Count));
    let vector =
        SingleCellExpressionDataVector::new("GENE1", dim, qt, encode_ints(&[7, 8]), vec![3, 4])
            .unwrap();
    assert_eq!(vector.sample_range(0).unwrap(), 0..0);
    assert_eq!(vector.sample_range(1).unwrap(), 0..2);
}

#[test]
fn test_vector_validation() {
    let dim = two_sample_dimension();
    let qt = Arc::new(QuantitationType::new("counts", PrimitiveType::Double, ScaleType::Count));

    assert!(matches!(
        SingleCellExpressionDataVector::new(
            "G",
            dim.clone(),
            qt.clone(),
            encode_doubles(&[1.0]),
            vec![0, 1]
        ),
        Err(ModelError::DataLengthMismatch {
            expected: 2,
            actual: 1
        })
    ));
    assert!(matches!(
        SingleCellExpressionDataVector::new(
            "G",
            dim.clone(),
            qt.clone(),
            encode_doubles(&[1.0, 2.0]),
            vec![1, 1]
        ),
        Err(ModelError::UnsortedDataIndices {
            position: 1,
            value: 1
        })
    ));
    assert!(matches!(
        SingleCellExpressionDataVector::new("G", dim, qt, encode_doubles(&[1.0]), vec![5]),
        Err(ModelError::DataIndexOutOfBounds { value: 5, .. })
    ));
}

#[test]
fn test_string_vector() {
    let dim = two_sample_dimension();
    let qt = Arc::new(QuantitationType::new("labels", PrimitiveType::String, ScaleType::Linear));
    let vector = SingleCellExpressionDataVector::new(
        "G",
        dim,
        qt,
        encode_strings(&["a", ""]),
        vec![0, 4],
    )
    .unwrap();
    assert_eq!(vector.data_as_strings().unwrap(), vec!["a", ""]);
    assert!(vector.data_view().is_err());
}

#[test]
fn test_cell_level_characteristics() {
    let clc = CellLevelCharacteristics::new(
        vec![Characteristic::new("neuron"), Characteristic::new("astrocyte")],
        vec![0, 1, UNKNOWN_CHARACTERISTIC, 1],
    )
    .unwrap();
    assert_eq!(clc.number_of_cells(), 4);
    assert_eq!(clc.number_of_cells_with(1), 2);
    assert_eq!(clc.number_of_cells_with(UNKNOWN_CHARACTERISTIC), 1);
    assert_eq!(clc.characteristic_of(1).unwrap().value, "astrocyte");
    assert!(clc.characteristic_of(2).is_none());
    assert!(clc.is_valid_category(-1));
    assert!(!clc.is_valid_category(2));

    assert!(matches!(
        CellLevelCharacteristics::new(vec![Characteristic::new("neuron")], vec![0, 1]),
        Err(ModelError::InvalidCharacteristicIndex {
            cell: 1,
            value: 1,
            len: 1
        })
    ));
    assert!(CellLevelCharacteristics::new(vec![], vec![-2]).is_err());
}

#[test]
fn test_mask_roundtrip() {
    for bits in [
        vec![],
        vec![true, true, true],
        vec![false, false],
        vec![true, false, false, true],
    ] {
        assert_eq!(parse_mask(&create_mask(&bits)).unwrap(), bits);
    }
}

#[test]
fn test_invalid_masks() {
    let three = CellLevelCharacteristics::new(
        vec![
            Characteristic::new("true"),
            Characteristic::new("false"),
            Characteristic::new("maybe"),
        ],
        vec![0],
    )
    .unwrap();
    assert!(matches!(parse_mask(&three), Err(ModelError::InvalidMask(_))));

    let both_true = CellLevelCharacteristics::new(
        vec![Characteristic::new("true"), Characteristic::new("TRUE")],
        vec![0],
    )
    .unwrap();
    assert!(parse_mask(&both_true).is_err());

    let unassigned = CellLevelCharacteristics::new(
        vec![Characteristic::new("False"), Characteristic::new("True")],
        vec![1, UNKNOWN_CHARACTERISTIC],
    )
    .unwrap();
    assert!(parse_mask(&unassigned).is_err());

    // order of the categories does not matter
    let reversed = CellLevelCharacteristics::new(
        vec![Characteristic::new("False"), Characteristic::new("True")],
        vec![1, 0],
    )
    .unwrap();
    assert_eq!(parse_mask(&reversed).unwrap(), vec![true, false]);
}

#[test]
fn test_terms_match() {
    let ct = Characteristic::new("Astrocyte").with_value_uri("http://purl.obolibrary.org/obo/CL_0000127");
    assert!(ct.matches_term("astrocyte", None));
    assert!(ct.matches_term("whatever", Some("http://purl.obolibrary.org/obo/cl_0000127")));
    assert!(!ct.matches_term("astrocyte", Some("http://purl.obolibrary.org/obo/CL_0000540")));
}

#[test]
fn test_preferred_cell_type_assignment() {
    let mut preferred =
        CellTypeAssignment::new(vec![Characteristic::new("b")], vec![0, 0]).unwrap();
    preferred.preferred = true;
    let other = CellTypeAssignment::new(vec![Characteristic::new("a")], vec![0, 0]).unwrap();
    let dim = SingleCellDimension::builder(assays(1), vec![0], 2)
        .cell_type_assignment(other.clone())
        .cell_type_assignment(preferred)
        .build()
        .unwrap();
    assert_eq!(
        dim.preferred_cell_type_assignment().unwrap().cell_types()[0].value,
        "b"
    );

    let single = SingleCellDimension::builder(assays(1), vec![0], 2)
        .cell_type_assignment(other)
        .build()
        .unwrap();
    assert!(single.preferred_cell_type_assignment().is_some());
}

#[test]
fn test_dimension_json_roundtrip() {
    let cta = CellTypeAssignment::new(
        vec![Characteristic::new("neuron").with_id(10)],
        vec![0, -1, 0, 0, -1],
    )
    .unwrap();
    let dim = SingleCellDimension::builder(assays(2), vec![0, 3], 5)
        .cell_ids((0..5).map(|i| format!("cell{i}")).collect())
        .cell_type_assignment(cta)
        .build()
        .unwrap();

    let json = dim.to_json().unwrap();
    let restored = SingleCellDimension::from_json(&json).unwrap();

    assert_ne!(restored.id(), dim.id());
    assert_eq!(restored.bio_assays(), dim.bio_assays());
    assert_eq!(restored.bio_assays_offset(), dim.bio_assays_offset());
    assert_eq!(restored.cell_ids(), dim.cell_ids());
    assert_eq!(restored.cell_type_assignments(), dim.cell_type_assignments());
}

#[test]
fn test_invalid_json_is_rejected() {
    let json = r#"{"bio_assays":[{"id":1,"name":"s1"}],"bio_assays_offset":[0,1],"number_of_cells":2}"#;
    assert!(SingleCellDimension::from_json(json).is_err());
}
