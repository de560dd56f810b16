use std::io::Read;
use std::path::Path;
use crate::{claims::BetaRecord, error::{PipelineError, Result}};
use tracing::debug;

/// Read the beta JSON feed, an array with one object per claim
pub fn load_beta_records(path: &Path) -> Result<Vec<BetaRecord>> {
    let file = std::fs::File::open(path).map_err(|e| PipelineError::io(path, e))?;
    let records = read_beta_records(std::io::BufReader::new(file))?;
    debug!("Read {} records from {}", records.len(), path.display());
    Ok(records)
}

pub fn read_beta_records<R: Read>(reader: R) -> Result<Vec<BetaRecord>> {
    Ok(serde_json::from_reader(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_beta_records() {
        let data = r#"[
            {"id": "B987", "member": "P010", "code": "99213", "error_msg": "Incorrect provider type", "date": "2025-07-03T00:00:00", "status": "denied"},
            {"id": "B988", "member": null, "code": "99214", "error_msg": "Missing modifier", "date": "2025-07-09T00:00:00", "status": "denied"}
        ]"#;
        let records = read_beta_records(data.as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].error_msg.as_deref(), Some("Incorrect provider type"));
        assert_eq!(records[1].member, None);
    }

    #[test]
    fn test_non_array_feed_is_rejected() {
        let err = read_beta_records(r#"{"id": "B1"}"#.as_bytes()).unwrap_err();
        assert!(matches!(err, PipelineError::JsonError(_)));
    }
}
