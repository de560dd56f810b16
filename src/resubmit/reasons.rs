/// Denial reasons the submitter can correct before resubmitting
pub const RETRYABLE: &[&str] = &["Missing modifier", "Incorrect NPI", "Prior auth required"];

/// Denial reasons that resubmission cannot fix
pub const NON_RETRYABLE: &[&str] = &["Authorization expired", "Incorrect provider type"];

/// Guidance for reasons that are neither clearly retryable nor final.
/// Keys are matched case-sensitively.
const AMBIGUOUS_GUIDANCE: &[(&str, &str)] = &[
    ("incorrect procedure", "Please review procedure code"),
    ("form incomplete", "Please complete missing form fields"),
    ("not billable", "Check billable status with insurer"),
];

pub const MISSING_REASON_GUIDANCE: &str = "Reason not provided";
pub const MANUAL_REVIEW_GUIDANCE: &str = "Ambiguous reason, manual review required";

/// How a denial reason is treated once the status, patient and age gates pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReasonCategory {
    Retryable,
    NonRetryable,
    Ambiguous(&'static str),
    Unrecognized,
}

pub fn categorize(reason: Option<&str>) -> ReasonCategory {
    match reason {
        Some(r) if RETRYABLE.contains(&r) => ReasonCategory::Retryable,
        Some(r) if NON_RETRYABLE.contains(&r) => ReasonCategory::NonRetryable,
        _ => match ambiguous_guidance(reason) {
            Some(guidance) => ReasonCategory::Ambiguous(guidance),
            None => ReasonCategory::Unrecognized,
        },
    }
}

fn ambiguous_guidance(reason: Option<&str>) -> Option<&'static str> {
    match reason {
        None => Some(MISSING_REASON_GUIDANCE),
        Some(r) => AMBIGUOUS_GUIDANCE
            .iter()
            .find(|(key, _)| *key == r)
            .map(|(_, guidance)| *guidance),
    }
}

/// Static stand-in for a free-text reason classifier. Unmapped reasons fall
/// back to manual review.
pub fn suggest_changes(reason: Option<&str>) -> &'static str {
    ambiguous_guidance(reason).unwrap_or(MANUAL_REVIEW_GUIDANCE)
}
