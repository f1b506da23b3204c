use crate::utils::{Error, Result};
use itertools::Itertools;
use std::{fs::File, io::Read, path::Path};

pub const SPECIMEN_COLUMN: &str = "Specimen ID";

pub fn load_specimens(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let specimens = specimens_from_reader(file, &path.display().to_string())?;
    log::info!("{} in specimen list", specimens.len());
    Ok(specimens)
}

/// Reads the `Specimen ID` column of a comma-separated manifest, keeping row order.
pub fn specimens_from_reader<R: Read>(reader: R, source_name: &str) -> Result<Vec<String>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| Error::parse(source_name, 1, e.to_string()))?
        .clone();
    let column = headers
        .iter()
        .position(|h| h == SPECIMEN_COLUMN)
        .ok_or_else(|| {
            Error::parse(
                source_name,
                1,
                format!(
                    "Missing '{}' column in header: {}",
                    SPECIMEN_COLUMN,
                    headers.iter().join(", ")
                ),
            )
        })?;

    let mut specimens = Vec::new();
    for (row_index, record) in csv_reader.records().enumerate() {
        let line_number = row_index + 2;
        let record = record.map_err(|e| {
            let line = e
                .position()
                .map_or(line_number, |pos| pos.line() as usize);
            Error::parse(source_name, line, e.to_string())
        })?;
        let line = record.position().map_or(line_number, |pos| pos.line() as usize);
        match record.get(column) {
            Some(id) if !id.is_empty() => specimens.push(id.to_string()),
            Some(_) => return Err(Error::parse(source_name, line, "Empty specimen ID")),
            None => {
                return Err(Error::parse(
                    source_name,
                    line,
                    format!("Row has no '{}' field", SPECIMEN_COLUMN),
                ))
            }
        }
    }
    Ok(specimens)
}
