use chrono::NaiveDate;
use serde::Serialize;
use crate::{
    claims::{normalize::ISO_DATE_FORMAT, UnifiedClaimRecord},
    error::{PipelineError, Result},
    resubmit::reasons::{self, ReasonCategory},
};
use tracing::debug;

pub const DEFAULT_MIN_AGE_DAYS: i64 = 7;

/// Outcome of classifying one claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub eligible: bool,
    pub reason: Option<String>,
    pub recommendation: Option<String>,
}

impl Verdict {
    fn excluded() -> Self {
        Self {
            eligible: false,
            reason: None,
            recommendation: None,
        }
    }

    fn excluded_because(reason: impl Into<String>) -> Self {
        Self {
            eligible: false,
            reason: Some(reason.into()),
            recommendation: None,
        }
    }

    fn resubmit(reason: Option<&str>, recommendation: impl Into<String>) -> Self {
        Self {
            eligible: true,
            reason: reason.map(str::to_string),
            recommendation: Some(recommendation.into()),
        }
    }
}

pub struct EligibilityChecker {
    min_age_days: i64,
}

impl Default for EligibilityChecker {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_AGE_DAYS)
    }
}

impl EligibilityChecker {
    pub fn new(min_age_days: i64) -> Self {
        Self { min_age_days }
    }

    /// Decide whether a claim should be resubmitted
    ///
    /// Rules, first match wins:
    /// 1. Only denied claims qualify
    /// 2. The claim must name a patient
    /// 3. The claim must be older than the minimum age (future dates count as too recent)
    /// 4. The denial reason decides: retryable and ambiguous or unknown reasons
    ///    are resubmitted, non-retryable ones are excluded
    ///
    /// Never fails: an evaluation error excludes the claim with an `error: ` reason.
    pub fn classify(&self, record: &UnifiedClaimRecord, today: NaiveDate) -> Verdict {
        match self.evaluate(record, today) {
            Ok(decision) => decision.verdict(record.denial_reason.as_deref()),
            Err(e) => {
                debug!("Claim {} could not be evaluated: {}", record.claim_id, e);
                Verdict::excluded_because(format!("error: {}", e))
            }
        }
    }

    /// Human-readable explanation of the verdict for a single claim
    pub fn explain(&self, record: &UnifiedClaimRecord, today: NaiveDate) -> String {
        match self.evaluate(record, today) {
            Ok(decision) => decision.describe(record, self.min_age_days),
            Err(e) => format!("Could not evaluate claim: {}", e),
        }
    }

    /// Run the gates in order and report the one that decided the claim
    fn evaluate(&self, record: &UnifiedClaimRecord, today: NaiveDate) -> Result<Decision> {
        if record.status != "denied" {
            debug!("Claim {} has status '{}'", record.claim_id, record.status);
            return Ok(Decision::NotDenied);
        }

        if record.patient_id.as_deref().map_or(true, str::is_empty) {
            debug!("Claim {} has no patient id", record.claim_id);
            return Ok(Decision::NoPatient);
        }

        let age = self.age_in_days(record, today)?;
        if age <= self.min_age_days {
            debug!("Claim {} is only {} days old", record.claim_id, age);
            return Ok(Decision::TooRecent(age));
        }

        Ok(Decision::Reason(reasons::categorize(record.denial_reason.as_deref())))
    }

    fn age_in_days(&self, record: &UnifiedClaimRecord, today: NaiveDate) -> Result<i64> {
        let submitted = NaiveDate::parse_from_str(&record.submitted_at, ISO_DATE_FORMAT)
            .map_err(|_| PipelineError::DateParse {
                field: "submitted_at",
                value: Some(record.submitted_at.clone()),
            })?;

        Ok((today - submitted).num_days())
    }
}

/// The gate that settled a claim
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decision {
    NotDenied,
    NoPatient,
    TooRecent(i64),
    Reason(ReasonCategory),
}

impl Decision {
    fn verdict(self, reason: Option<&str>) -> Verdict {
        match self {
            Decision::NotDenied | Decision::NoPatient | Decision::TooRecent(_) => Verdict::excluded(),
            Decision::Reason(ReasonCategory::Retryable) => {
                let reason_text = reason.unwrap_or_default();
                Verdict::resubmit(reason, format!("Review {} and resubmit", reason_text))
            }
            Decision::Reason(ReasonCategory::NonRetryable) => {
                Verdict::excluded_because(reason.unwrap_or_default())
            }
            Decision::Reason(ReasonCategory::Ambiguous(guidance)) => Verdict::resubmit(reason, guidance),
            Decision::Reason(ReasonCategory::Unrecognized) => {
                Verdict::resubmit(reason, reasons::suggest_changes(reason))
            }
        }
    }

    fn describe(self, record: &UnifiedClaimRecord, min_age_days: i64) -> String {
        let reason = record.denial_reason.as_deref().unwrap_or("<none>");
        match self {
            Decision::NotDenied => {
                format!("Claim status is '{}', only denied claims are resubmitted", record.status)
            }
            Decision::NoPatient => "Claim has no patient id".to_string(),
            Decision::TooRecent(age) => format!(
                "Claim was submitted {} days ago, needs to be older than {} days",
                age, min_age_days
            ),
            Decision::Reason(ReasonCategory::Retryable) => format!("Denial reason '{}' is retryable", reason),
            Decision::Reason(ReasonCategory::NonRetryable) => {
                format!("Denial reason '{}' cannot be fixed by resubmission", reason)
            }
            Decision::Reason(ReasonCategory::Ambiguous(_)) => {
                format!("Denial reason '{}' is ambiguous, resubmit with guidance", reason)
            }
            Decision::Reason(ReasonCategory::Unrecognized) => {
                format!("Denial reason '{}' is unrecognized, needs manual review", reason)
            }
        }
    }
}
