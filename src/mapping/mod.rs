//! # Mapping cell-level characteristics to experimental factors
//!
//! Cell types (or any cell-level characteristics) are related to the levels
//! of a categorical [`ExperimentalFactor`] by one of several strategies:
//!
//! | Strategy | Matches a characteristic against |
//! |----------|----------------------------------|
//! | [`map_by_factor_value_characteristics`] | subjects of each factor value's statements |
//! | [`full_mapping`] | same, keeping every candidate |
//! | [`map_by_subsets`] | characteristics of the sample subset of each factor value |
//! | [`read_mapping`] | IDs listed in a mapping file |
//!
//! A characteristic with no match is left unmapped with a warning. A
//! characteristic with more than one match is an error, since picking one
//! would hide an inconsistency in the experimental design.
//!
//! Mappings are written back with [`write_mapping`] and rendered for display
//! with [`format_mapping`].

mod error;
mod factor;
mod io;


use std::collections::HashMap;

use log::warn;

use crate::model::Characteristic;

pub use error::MappingError;
pub use factor::{ExperimentalFactor, FactorType, FactorValue, SampleSubset, Statement};
pub use io::{format_mapping, read_mapping, read_mapping_from, write_mapping, write_mapping_to_file};

/// At most one factor value per characteristic
pub type CharacteristicMapping<'a> = HashMap<&'a Characteristic, &'a FactorValue>;

/// Every candidate factor value per characteristic
pub type FullMapping<'a> = HashMap<&'a Characteristic, Vec<&'a FactorValue>>;

fn check_categorical(factor: &ExperimentalFactor) -> Result<(), MappingError> {
    if factor.factor_type != FactorType::Categorical {
        return Err(MappingError::NonCategorical(factor.name.clone()));
    }
    Ok(())
}

/// Keep the single candidate of each characteristic
fn collapse<'a>(
    factor: &ExperimentalFactor,
    candidates: FullMapping<'a>,
) -> Result<CharacteristicMapping<'a>, MappingError> {
    let mut mapping = CharacteristicMapping::with_capacity(candidates.len());
    for (characteristic, fvs) in candidates {
        match fvs.as_slice() {
            [] => warn!(
                "{} does not match any factor value of {}, it will be left unmapped",
                characteristic, factor.name
            ),
            [fv] => {
                mapping.insert(characteristic, *fv);
            }
            _ => {
                return Err(MappingError::Ambiguous {
                    characteristic: characteristic.to_string(),
                    candidates: fvs
                        .iter()
                        .map(|fv| fv.to_string())
                        .collect::<Vec<_>>()
                        .join(", "),
                })
            }
        }
    }
    Ok(mapping)
}

/// Candidate factor values of each characteristic, matched on statement subjects
pub fn full_mapping<'a>(
    characteristics: &'a [Characteristic],
    factor: &'a ExperimentalFactor,
) -> Result<FullMapping<'a>, MappingError> {
    check_categorical(factor)?;
    Ok(characteristics
        .iter()
        .map(|c| {
            let fvs = factor.factor_values.iter().filter(|fv| fv.is_about(c)).collect();
            (c, fvs)
        })
        .collect())
}

/// Map each characteristic to the factor value whose statements are about it
pub fn map_by_factor_value_characteristics<'a>(
    characteristics: &'a [Characteristic],
    factor: &'a ExperimentalFactor,
) -> Result<CharacteristicMapping<'a>, MappingError> {
    collapse(factor, full_mapping(characteristics, factor)?)
}

/// Map each characteristic to the factor value whose sample subset carries it
///
/// `subsets` holds the subset of each factor value, keyed by factor value
/// ID. Factor values without a subset are never matched.
pub fn map_by_subsets<'a>(
    characteristics: &'a [Characteristic],
    factor: &'a ExperimentalFactor,
    subsets: &HashMap<i64, SampleSubset>,
) -> Result<CharacteristicMapping<'a>, MappingError> {
    check_categorical(factor)?;
    let candidates = characteristics
        .iter()
        .map(|c| {
            let fvs = factor
                .factor_values
                .iter()
                .filter(|fv| subsets.get(&fv.id).is_some_and(|subset| subset.has(c)))
                .collect();
            (c, fvs)
        })
        .collect();
    collapse(factor, candidates)
}
