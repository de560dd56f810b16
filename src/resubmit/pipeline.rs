use std::collections::BTreeMap;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use crate::{
    claims::{AlphaRecord, BetaRecord, SourceRecord, SourceSystem, UnifiedClaimRecord},
    config::{Config, NormalizationPolicy, SourcesConfig},
    error::Result,
    resubmit::{
        eligibility::EligibilityChecker,
        observer::{RunObserver, TracingObserver},
    },
    sources,
};
use tracing::debug;

pub const UNKNOWN_REASON: &str = "Unknown reason";

/// A denied claim worth filing again
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResubmissionCandidate {
    pub claim_id: String,
    pub resubmission_reason: Option<String>,
    pub source_system: SourceSystem,
    pub recommended_changes: Option<String>,
}

/// Rejected claims are reported exactly as normalized
pub type RejectedRecord = UnifiedClaimRecord;

/// Counts for one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSummary {
    pub total_claims: usize,
    pub from_alpha: usize,
    pub from_beta: usize,
    pub eligible_for_resubmission: usize,
    pub excluded: usize,
    pub excluded_breakdown: BTreeMap<String, usize>,
    /// Source records dropped because they could not be normalized
    #[serde(default, skip_serializing_if = "is_zero")]
    pub skipped_records: usize,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

impl PipelineSummary {
    /// Share of claims eligible for resubmission, as a percentage
    pub fn eligibility_rate(&self) -> f64 {
        if self.total_claims == 0 {
            0.0
        } else {
            (self.eligible_for_resubmission as f64 / self.total_claims as f64) * 100.0
        }
    }

    /// Print a formatted summary to console
    pub fn print_summary(&self) {
        println!("\n=== Claim Resubmission Summary ===");
        println!("Total Claims:    {}", self.total_claims);
        println!("  From alpha:    {}", self.from_alpha);
        println!("  From beta:     {}", self.from_beta);
        println!("Eligible:        {} ✓ ({:.1}%)", self.eligible_for_resubmission, self.eligibility_rate());
        println!("Excluded:        {} ✗", self.excluded);
        for (reason, count) in &self.excluded_breakdown {
            println!("  {:<30} {}", reason, count);
        }
        if self.skipped_records > 0 {
            println!("Skipped (invalid): {}", self.skipped_records);
        }
        println!("==================================");
    }
}

/// Everything a run produces
#[derive(Debug, Clone, Default)]
pub struct PipelineRun {
    pub summary: PipelineSummary,
    pub candidates: Vec<ResubmissionCandidate>,
    pub rejected: Vec<RejectedRecord>,
}

pub struct ClaimPipeline {
    checker: EligibilityChecker,
    policy: NormalizationPolicy,
    observer: Box<dyn RunObserver>,
}

impl ClaimPipeline {
    pub fn new(checker: EligibilityChecker, policy: NormalizationPolicy) -> Self {
        Self {
            checker,
            policy,
            observer: Box::new(TracingObserver),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            EligibilityChecker::new(config.pipeline.min_age_days),
            config.pipeline.on_normalization_error,
        )
    }

    pub fn with_observer(mut self, observer: Box<dyn RunObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Load both sources from disk and process them
    ///
    /// Read and parse failures abort the run before any claim is classified.
    pub fn run(&self, inputs: &SourcesConfig, today: NaiveDate) -> Result<PipelineRun> {
        let alpha = sources::load_alpha_records(&inputs.alpha_path)?;
        let beta = sources::load_beta_records(&inputs.beta_path)?;
        self.run_records(&alpha, &beta, today)
    }

    /// Normalize, classify and partition already-loaded source records
    ///
    /// Alpha claims come first, then beta claims, each in source order.
    pub fn run_records(
        &self,
        alpha: &[AlphaRecord],
        beta: &[BetaRecord],
        today: NaiveDate,
    ) -> Result<PipelineRun> {
        self.observer.on_run_start(today);

        let (alpha_claims, alpha_skipped) = self.normalize_all(alpha)?;
        self.observer.on_source_loaded(SourceSystem::Alpha, alpha_claims.len());

        let (beta_claims, beta_skipped) = self.normalize_all(beta)?;
        self.observer.on_source_loaded(SourceSystem::Beta, beta_claims.len());

        let from_alpha = alpha_claims.len();
        let from_beta = beta_claims.len();

        let mut run = self.classify_all(alpha_claims.into_iter().chain(beta_claims), today);
        run.summary.from_alpha = from_alpha;
        run.summary.from_beta = from_beta;
        run.summary.skipped_records = alpha_skipped + beta_skipped;

        self.observer.on_run_complete(&run.summary);
        Ok(run)
    }

    fn normalize_all<R: SourceRecord>(&self, records: &[R]) -> Result<(Vec<UnifiedClaimRecord>, usize)> {
        let mut claims = Vec::with_capacity(records.len());
        let mut skipped = 0;

        for (index, record) in records.iter().enumerate() {
            match record.normalize() {
                Ok(claim) => claims.push(claim),
                Err(e) if self.policy == NormalizationPolicy::Skip && e.is_normalization() => {
                    self.observer.on_record_skipped(R::SOURCE, index, &e);
                    skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        Ok((claims, skipped))
    }

    fn classify_all(
        &self,
        claims: impl Iterator<Item = UnifiedClaimRecord>,
        today: NaiveDate,
    ) -> PipelineRun {
        let mut candidates = Vec::new();
        let mut rejected = Vec::new();
        let mut breakdown: BTreeMap<String, usize> = BTreeMap::new();

        for claim in claims {
            let verdict = self.checker.classify(&claim, today);

            if verdict.eligible {
                debug!("Claim {} is eligible for resubmission", claim.claim_id);
                candidates.push(ResubmissionCandidate {
                    claim_id: claim.claim_id,
                    resubmission_reason: verdict.reason,
                    source_system: claim.source_system,
                    recommended_changes: verdict.recommendation,
                });
            } else {
                let label = verdict
                    .reason
                    .filter(|r| !r.is_empty())
                    .unwrap_or_else(|| UNKNOWN_REASON.to_string());
                *breakdown.entry(label).or_insert(0) += 1;
                rejected.push(claim);
            }
        }

        PipelineRun {
            summary: PipelineSummary {
                total_claims: candidates.len() + rejected.len(),
                eligible_for_resubmission: candidates.len(),
                excluded: rejected.len(),
                excluded_breakdown: breakdown,
                ..Default::default()
            },
            candidates,
            rejected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::PipelineError, resubmit::observer::SilentObserver};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 30).unwrap()
    }

    fn pipeline(policy: NormalizationPolicy) -> ClaimPipeline {
        ClaimPipeline::new(EligibilityChecker::default(), policy).with_observer(Box::new(SilentObserver))
    }

    fn alpha(id: &str, patient: &str, reason: &str, status: &str, date: &str) -> AlphaRecord {
        let opt = |s: &str| (!s.is_empty()).then(|| s.to_string());
        AlphaRecord {
            claim_id: Some(id.to_string()),
            patient_id: opt(patient),
            procedure_code: Some("99213".to_string()),
            denial_reason: opt(reason),
            status: opt(status),
            submitted_at: opt(date),
        }
    }

    fn beta(id: &str, member: &str, reason: &str, status: &str, date: &str) -> BetaRecord {
        let opt = |s: &str| (!s.is_empty()).then(|| s.to_string());
        BetaRecord {
            id: Some(id.to_string()),
            member: opt(member),
            code: Some("99214".to_string()),
            error_msg: opt(reason),
            status: opt(status),
            date: opt(date),
        }
    }

    fn sample() -> (Vec<AlphaRecord>, Vec<BetaRecord>) {
        (
            vec![
                alpha("A1", "P1", "Missing modifier", "denied", "2025-07-20"),
                alpha("A2", "P2", "Authorization expired", "denied", "2025-06-30"),
                alpha("A3", "P3", "", "approved", "2025-04-21"),
                alpha("A4", "", "incorrect procedure", "denied", "2025-07-10"),
            ],
            vec![
                beta("B1", "P5", "", "DENIED", "2025-07-15T10:00:00"),
                beta("B2", "P6", "Duplicate claim", "denied", "2025-07-01T00:00:00"),
                beta("B3", "P7", "Authorization expired", "denied", "2025-07-01T00:00:00"),
            ],
        )
    }

    #[test]
    fn test_run_partitions_and_tallies() {
        let (a, b) = sample();
        let run = pipeline(NormalizationPolicy::Abort).run_records(&a, &b, today()).unwrap();
        let summary = &run.summary;

        assert_eq!(summary.total_claims, 7);
        assert_eq!(summary.from_alpha, 4);
        assert_eq!(summary.from_beta, 3);
        assert_eq!(summary.eligible_for_resubmission, 3);
        assert_eq!(summary.excluded, 4);
        assert_eq!(summary.excluded_breakdown.get("Authorization expired"), Some(&2));
        assert_eq!(summary.excluded_breakdown.get(UNKNOWN_REASON), Some(&2));
        assert_eq!(summary.skipped_records, 0);

        let ids: Vec<_> = run.candidates.iter().map(|c| c.claim_id.as_str()).collect();
        assert_eq!(ids, vec!["A1", "B1", "B2"]);

        let rejected: Vec<_> = run.rejected.iter().map(|r| r.claim_id.as_str()).collect();
        assert_eq!(rejected, vec!["A2", "A3", "A4", "B3"]);
    }

    #[test]
    fn test_counts_always_balance() {
        let (a, b) = sample();
        let run = pipeline(NormalizationPolicy::Abort).run_records(&a, &b, today()).unwrap();
        let s = &run.summary;

        assert_eq!(s.total_claims, s.from_alpha + s.from_beta);
        assert_eq!(s.total_claims, s.eligible_for_resubmission + s.excluded);
        assert_eq!(s.excluded, s.excluded_breakdown.values().sum::<usize>());
        assert_eq!(run.candidates.len() + run.rejected.len(), a.len() + b.len());
    }

    #[test]
    fn test_candidate_fields() {
        let (a, b) = sample();
        let run = pipeline(NormalizationPolicy::Abort).run_records(&a, &b, today()).unwrap();

        assert_eq!(
            run.candidates[0],
            ResubmissionCandidate {
                claim_id: "A1".to_string(),
                resubmission_reason: Some("Missing modifier".to_string()),
                source_system: SourceSystem::Alpha,
                recommended_changes: Some("Review Missing modifier and resubmit".to_string()),
            }
        );
        assert_eq!(run.candidates[1].resubmission_reason, None);
        assert_eq!(run.candidates[1].recommended_changes.as_deref(), Some("Reason not provided"));
        assert_eq!(run.candidates[1].source_system, SourceSystem::Beta);
    }

    #[test]
    fn test_rejected_records_are_unmodified() {
        let (a, b) = sample();
        let run = pipeline(NormalizationPolicy::Abort).run_records(&a, &b, today()).unwrap();

        assert_eq!(run.rejected[0], a[1].normalize().unwrap());
        assert_eq!(run.rejected[3], b[2].normalize().unwrap());
    }

    #[test]
    fn test_abort_policy_fails_whole_run() {
        let (mut a, b) = sample();
        a.push(alpha("A9", "P9", "Incorrect NPI", "denied", "not-a-date"));

        let err = pipeline(NormalizationPolicy::Abort).run_records(&a, &b, today()).unwrap_err();
        assert!(matches!(err, PipelineError::DateParse { .. }));
    }

    #[test]
    fn test_skip_policy_counts_invalid_records() {
        let (mut a, mut b) = sample();
        a.push(alpha("A9", "P9", "Incorrect NPI", "denied", "not-a-date"));
        b.push(beta("B9", "P9", "Incorrect NPI", "", "2025-07-01T00:00:00"));

        let run = pipeline(NormalizationPolicy::Skip).run_records(&a, &b, today()).unwrap();
        assert_eq!(run.summary.skipped_records, 2);
        assert_eq!(run.summary.from_alpha, 4);
        assert_eq!(run.summary.from_beta, 3);
        assert_eq!(run.summary.total_claims, 7);
    }

    #[test]
    fn test_empty_sources() {
        let run = pipeline(NormalizationPolicy::Abort).run_records(&[], &[], today()).unwrap();

        assert_eq!(run.summary, PipelineSummary::default());
        assert_eq!(run.summary.eligibility_rate(), 0.0);
    }

    #[test]
    fn test_summary_json_shape() {
        let (a, b) = sample();
        let run = pipeline(NormalizationPolicy::Abort).run_records(&a, &b, today()).unwrap();
        let json = serde_json::to_value(&run.summary).unwrap();

        assert_eq!(json["total_claims"], 7);
        assert_eq!(json["excluded_breakdown"]["Unknown reason"], 2);
        assert!(json.get("skipped_records").is_none());
    }

    struct RecordingObserver(Rc<RefCell<Vec<String>>>);

    impl RunObserver for RecordingObserver {
        fn on_run_start(&self, reference_date: NaiveDate) {
            self.0.borrow_mut().push(format!("start {}", reference_date));
        }

        fn on_source_loaded(&self, source: SourceSystem, count: usize) {
            self.0.borrow_mut().push(format!("{} {}", source, count));
        }

        fn on_run_complete(&self, summary: &PipelineSummary) {
            self.0.borrow_mut().push(format!("done {}", summary.total_claims));
        }
    }

    #[test]
    fn test_observer_hooks_fire_in_order() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let (a, b) = sample();

        ClaimPipeline::new(EligibilityChecker::default(), NormalizationPolicy::Abort)
            .with_observer(Box::new(RecordingObserver(events.clone())))
            .run_records(&a, &b, today())
            .unwrap();

        assert_eq!(
            *events.borrow(),
            vec!["start 2025-07-30", "alpha 4", "beta 3", "done 7"]
        );
    }
}
