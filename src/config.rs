use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::resubmit::eligibility::DEFAULT_MIN_AGE_DAYS;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

const CONFIG_HEADER: &str = "\
# pipeline.on_normalization_error decides what happens to a source record
# with a missing or non-ISO date, or a missing status or claim id:
#   \"abort\" fails the whole run, \"skip\" drops the record and counts it.
# pipeline.reference_date defaults to today when omitted.

";

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub sources: SourcesConfig,
    pub pipeline: PipelineConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct SourcesConfig {
    pub alpha_path: PathBuf,
    pub beta_path: PathBuf,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            alpha_path: PathBuf::from("data/emr_alpha.csv"),
            beta_path: PathBuf::from("data/emr_beta.json"),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct PipelineConfig {
    /// Date claim ages are measured against. Today when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_date: Option<NaiveDate>,
    pub min_age_days: i64,
    pub on_normalization_error: NormalizationPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            reference_date: None,
            min_age_days: DEFAULT_MIN_AGE_DAYS,
            on_normalization_error: NormalizationPolicy::Abort,
        }
    }
}

/// What to do with a source record that cannot be normalized: a date that is
/// missing or not `YYYY-MM-DD`, or a missing status or claim id
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum NormalizationPolicy {
    /// Fail the whole run
    #[default]
    Abort,
    /// Log the record, count it and carry on
    Skip,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub candidates_file: String,
    pub rejected_file: String,
    pub summary_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            candidates_file: "resubmission_candidates.json".to_string(),
            rejected_file: "rejected_records.json".to_string(),
            summary_file: "pipeline_summary.json".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from `path` (optional) overlaid with `CLAIMS__*`
    /// environment variables, e.g. `CLAIMS__PIPELINE__MIN_AGE_DAYS=14`
    pub fn load(path: &str) -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("CLAIMS").separator("__"))
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.pipeline.min_age_days < 0 {
            anyhow::bail!(
                "pipeline.min_age_days must not be negative (got {})",
                self.pipeline.min_age_days
            );
        }
        for (key, name) in [
            ("output.candidates_file", &self.output.candidates_file),
            ("output.rejected_file", &self.output.rejected_file),
            ("output.summary_file", &self.output.summary_file),
        ] {
            if name.trim().is_empty() {
                anyhow::bail!("{} must not be empty", key);
            }
        }
        Ok(())
    }

    /// Reference date for age checks, falling back to the local calendar date
    pub fn reference_date(&self) -> NaiveDate {
        self.pipeline
            .reference_date
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(format!("{}{}", CONFIG_HEADER, toml::to_string_pretty(self)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = Config::load("does/not/exist").unwrap();

        assert_eq!(config.pipeline.min_age_days, 7);
        assert_eq!(config.pipeline.on_normalization_error, NormalizationPolicy::Abort);
        assert_eq!(config.sources.alpha_path, PathBuf::from("data/emr_alpha.csv"));
        assert_eq!(config.output.rejected_file, "rejected_records.json");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[pipeline]\nreference_date = \"2025-07-30\"\nmin_age_days = 14\non_normalization_error = \"skip\"\n\n[output]\ndir = \"out\""
        )
        .unwrap();

        let config = Config::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.pipeline.min_age_days, 14);
        assert_eq!(config.pipeline.on_normalization_error, NormalizationPolicy::Skip);
        assert_eq!(config.reference_date(), NaiveDate::from_ymd_opt(2025, 7, 30).unwrap());
        assert_eq!(config.output.dir, PathBuf::from("out"));
        assert_eq!(config.output.summary_file, "pipeline_summary.json");
    }

    #[test]
    fn test_negative_min_age_is_invalid() {
        let mut config = Config::default();
        config.pipeline.min_age_days = -1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_config_round_trips_through_toml() {
        let rendered = Config::default().to_toml().unwrap();
        assert!(rendered.contains("missing status or claim id"));
        let parsed: Config = toml::from_str(&rendered).unwrap();

        assert_eq!(parsed.pipeline.min_age_days, 7);
        assert_eq!(parsed.output.candidates_file, "resubmission_candidates.json");
    }
}
