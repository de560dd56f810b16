use std::io::Read;
use std::path::Path;
use crate::{claims::AlphaRecord, error::{PipelineError, Result}};
use tracing::debug;

/// Read every row of an alpha CSV export
pub fn load_alpha_records(path: &Path) -> Result<Vec<AlphaRecord>> {
    let file = std::fs::File::open(path).map_err(|e| PipelineError::io(path, e))?;
    let records = read_alpha_records(file)?;
    debug!("Read {} rows from {}", records.len(), path.display());
    Ok(records)
}

pub fn read_alpha_records<R: Read>(reader: R) -> Result<Vec<AlphaRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    reader
        .deserialize::<AlphaRecord>()
        .map(|row| row.map_err(PipelineError::from))
        .collect()
}
