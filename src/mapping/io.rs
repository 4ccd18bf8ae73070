use std::collections::HashSet;
use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::model::Characteristic;

use super::{check_categorical, CharacteristicMapping, ExperimentalFactor, MappingError};

const CELL_TYPE_ID: &str = "cell_type_id";
const FACTOR_VALUE_ID: &str = "factor_value_id";
const UNMAPPED: &str = "<unmapped>";

/// Read a mapping file
///
/// See [`read_mapping_from`] for the format.
pub fn read_mapping<'a, P: AsRef<Path>>(
    path: P,
    characteristics: &'a [Characteristic],
    factor: &'a ExperimentalFactor,
) -> Result<CharacteristicMapping<'a>, MappingError> {
    let file = File::open(path)?;
    read_mapping_from(BufReader::new(file), characteristics, factor)
}

/// Read a mapping from tab-delimited text
///
/// ```text
/// # comment
/// cell_type_id	factor_value_id
/// 12	4
/// ```
///
/// Lines starting with `#` are ignored. Each row binds the characteristic
/// with the given ID to the factor value with the given ID; both must exist
/// and a characteristic may appear only once.
pub fn read_mapping_from<'a, R: Read>(
    reader: R,
    characteristics: &'a [Characteristic],
    factor: &'a ExperimentalFactor,
) -> Result<CharacteristicMapping<'a>, MappingError> {
    check_categorical(factor)?;
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .comment(Some(b'#'))
        .has_headers(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?;
    if headers.len() != 2 || &headers[0] != CELL_TYPE_ID || &headers[1] != FACTOR_VALUE_ID {
        return Err(MappingError::InvalidHeader(
            headers.iter().collect::<Vec<_>>().join("\t"),
        ));
    }

    let mut mapping = CharacteristicMapping::new();
    for record in csv_reader.records() {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line());
        let parse = |field: &str| {
            field.trim().parse::<i64>().map_err(|_| MappingError::InvalidId {
                line,
                value: field.to_string(),
            })
        };
        let characteristic_id = parse(&record[0])?;
        let factor_value_id = parse(&record[1])?;

        let characteristic = characteristics
            .iter()
            .find(|c| c.id == Some(characteristic_id))
            .ok_or(MappingError::UnknownCharacteristic(characteristic_id))?;
        let factor_value = factor
            .factor_value(factor_value_id)
            .ok_or(MappingError::UnknownFactorValue(factor_value_id))?;
        if mapping.insert(characteristic, factor_value).is_some() {
            return Err(MappingError::DuplicateMapping(characteristic_id));
        }
    }
    Ok(mapping)
}

/// Write a mapping to a file
pub fn write_mapping_to_file<P: AsRef<Path>>(
    path: P,
    characteristics: &[Characteristic],
    factor: &ExperimentalFactor,
    mapping: &CharacteristicMapping<'_>,
) -> Result<(), MappingError> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_mapping(&mut writer, characteristics, factor, mapping)?;
    writer.flush()?;
    Ok(())
}

/// Write a mapping in the format read by [`read_mapping_from`]
///
/// Every mapped row is preceded by a comment naming the characteristic and
/// the factor value. Characteristics and factor values left unmapped are
/// listed at the end as comments.
pub fn write_mapping<W: Write>(
    mut writer: W,
    characteristics: &[Characteristic],
    factor: &ExperimentalFactor,
    mapping: &CharacteristicMapping<'_>,
) -> Result<(), MappingError> {
    let ids = characteristics
        .iter()
        .map(|c| c.id.ok_or_else(|| MappingError::MissingId(c.to_string())))
        .collect::<Result<Vec<_>, _>>()?;

    writeln!(writer, "# Mapping of characteristics to factor values of {}", factor.name)?;
    writeln!(writer, "{CELL_TYPE_ID}\t{FACTOR_VALUE_ID}")?;

    let mut unmapped = Vec::new();
    let mut used = HashSet::new();
    for (characteristic, id) in characteristics.iter().zip(ids) {
        match mapping.get(characteristic) {
            Some(fv) => {
                writeln!(writer, "# {characteristic} -> {fv}")?;
                writeln!(writer, "{id}\t{}", fv.id)?;
                used.insert(fv.id);
            }
            None => unmapped.push(id),
        }
    }
    for id in unmapped {
        writeln!(writer, "# {id}\t{UNMAPPED}")?;
    }
    for fv in &factor.factor_values {
        if !used.contains(&fv.id) {
            writeln!(writer, "# {UNMAPPED}\t{}", fv.id)?;
        }
    }
    Ok(())
}

/// Render a mapping as an aligned text report
///
/// ```text
/// astrocyte   -> astrocyte
/// neuron      -> <unmapped>
/// <unmapped>  -> microglia
/// ```
pub fn format_mapping(
    characteristics: &[Characteristic],
    factor: &ExperimentalFactor,
    mapping: &CharacteristicMapping<'_>,
) -> String {
    let mut rows: Vec<(String, String)> = characteristics
        .iter()
        .map(|c| {
            let target = mapping.get(c).map_or_else(|| UNMAPPED.to_string(), |fv| fv.to_string());
            (c.to_string(), target)
        })
        .collect();
    let used: HashSet<i64> = mapping.values().map(|fv| fv.id).collect();
    rows.extend(
        factor
            .factor_values
            .iter()
            .filter(|fv| !used.contains(&fv.id))
            .map(|fv| (UNMAPPED.to_string(), fv.to_string())),
    );

    let width = rows.iter().map(|(c, _)| c.chars().count()).max().unwrap_or(0);
    let mut out = String::new();
    for (source, target) in rows {
        let _ = writeln!(out, "{source:<width$} -> {target}");
    }
    out
}
