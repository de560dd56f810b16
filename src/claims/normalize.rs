use chrono::NaiveDate;
use crate::{
    claims::types::{AlphaRecord, BetaRecord, SourceSystem, UnifiedClaimRecord},
    error::{PipelineError, Result},
};

pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// A raw record from one of the claim sources
///
/// Normalization is all-or-nothing: either every field of the unified record
/// is produced or an error is returned.
pub trait SourceRecord {
    const SOURCE: SourceSystem;

    fn normalize(&self) -> Result<UnifiedClaimRecord>;
}

impl SourceRecord for AlphaRecord {
    const SOURCE: SourceSystem = SourceSystem::Alpha;

    fn normalize(&self) -> Result<UnifiedClaimRecord> {
        Ok(UnifiedClaimRecord {
            claim_id: required(Self::SOURCE, "claim_id", self.claim_id.as_deref())?,
            patient_id: non_empty(self.patient_id.as_deref()),
            procedure_code: self.procedure_code.clone(),
            denial_reason: non_empty(self.denial_reason.as_deref()),
            status: required(Self::SOURCE, "status", self.status.as_deref())?.to_lowercase(),
            submitted_at: parse_iso_date("submitted_at", self.submitted_at.as_deref())?,
            source_system: Self::SOURCE,
        })
    }
}

impl SourceRecord for BetaRecord {
    const SOURCE: SourceSystem = SourceSystem::Beta;

    fn normalize(&self) -> Result<UnifiedClaimRecord> {
        // Beta timestamps carry a time part; only the calendar date matters
        let date = self
            .date
            .as_deref()
            .map(|d| d.split('T').next().unwrap_or(d));

        Ok(UnifiedClaimRecord {
            claim_id: required(Self::SOURCE, "id", self.id.as_deref())?,
            patient_id: non_empty(self.member.as_deref()),
            procedure_code: self.code.clone(),
            denial_reason: non_empty(self.error_msg.as_deref()),
            status: required(Self::SOURCE, "status", self.status.as_deref())?.to_lowercase(),
            submitted_at: parse_iso_date("date", date)?,
            source_system: Self::SOURCE,
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

fn required(source: SourceSystem, field: &'static str, value: Option<&str>) -> Result<String> {
    value.map(str::to_string).ok_or(PipelineError::MissingField {
        source_system: source.as_str(),
        field,
    })
}

/// Parse a strict `YYYY-MM-DD` calendar date
///
/// Unpadded fields, signs and surrounding whitespace are rejected rather than
/// rewritten, so the returned string is always identical to the input.
pub fn parse_iso_date(field: &'static str, value: Option<&str>) -> Result<String> {
    let raw = value.ok_or(PipelineError::DateParse { field, value: None })?;

    NaiveDate::parse_from_str(raw, ISO_DATE_FORMAT)
        .ok()
        .map(|date| date.format(ISO_DATE_FORMAT).to_string())
        .filter(|canonical| canonical == raw)
        .ok_or_else(|| PipelineError::DateParse {
            field,
            value: Some(raw.to_string()),
        })
}
