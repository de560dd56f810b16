use serde::{Deserialize, Deserializer, Serialize};

/// EMR system a claim was exported from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceSystem {
    /// Delimited-text export
    Alpha,
    /// JSON feed, one object per claim
    Beta,
}

impl SourceSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceSystem::Alpha => "alpha",
            SourceSystem::Beta => "beta",
        }
    }
}

impl std::fmt::Display for SourceSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A claim in the common schema shared by every source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnifiedClaimRecord {
    pub claim_id: String,
    pub patient_id: Option<String>,
    pub procedure_code: Option<String>,
    pub denial_reason: Option<String>,
    /// Always lower-case
    pub status: String,
    /// ISO calendar date (`YYYY-MM-DD`)
    pub submitted_at: String,
    pub source_system: SourceSystem,
}

/// Row of the alpha CSV export. Empty cells deserialize as `None`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AlphaRecord {
    pub claim_id: Option<String>,
    pub patient_id: Option<String>,
    pub procedure_code: Option<String>,
    pub denial_reason: Option<String>,
    pub status: Option<String>,
    pub submitted_at: Option<String>,
}

/// Object from the beta JSON feed. Scalars of any JSON type are accepted
/// and kept in their textual form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BetaRecord {
    #[serde(deserialize_with = "loose_string")]
    pub id: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub member: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub code: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub error_msg: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub status: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub date: Option<String>,
}

fn loose_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_beta_record_accepts_loose_scalars() {
        let record: BetaRecord = serde_json::from_str(
            r#"{"id": 2001, "member": null, "code": "99213", "status": "DENIED"}"#,
        )
        .unwrap();

        assert_eq!(record.id.as_deref(), Some("2001"));
        assert_eq!(record.member, None);
        assert_eq!(record.code.as_deref(), Some("99213"));
        assert_eq!(record.error_msg, None);
        assert_eq!(record.date, None);
    }

    #[test]
    fn test_source_system_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&SourceSystem::Alpha).unwrap(), "\"alpha\"");
        assert_eq!(SourceSystem::Beta.to_string(), "beta");
    }
}
