use chrono::NaiveDate;
use crate::{
    claims::SourceSystem,
    error::PipelineError,
    resubmit::pipeline::PipelineSummary,
};
use tracing::{info, warn};

/// Hooks invoked at fixed points of a pipeline run
///
/// All methods default to no-ops so implementors only override what they need.
pub trait RunObserver {
    fn on_run_start(&self, _reference_date: NaiveDate) {}

    fn on_source_loaded(&self, _source: SourceSystem, _count: usize) {}

    fn on_record_skipped(&self, _source: SourceSystem, _index: usize, _error: &PipelineError) {}

    fn on_run_complete(&self, _summary: &PipelineSummary) {}
}

/// Reports run progress through `tracing`
pub struct TracingObserver;

impl RunObserver for TracingObserver {
    fn on_run_start(&self, reference_date: NaiveDate) {
        info!("Starting claim resubmission run (reference date {})", reference_date);
    }

    fn on_source_loaded(&self, source: SourceSystem, count: usize) {
        info!("Loaded {} claims from {}", count, source);
    }

    fn on_record_skipped(&self, source: SourceSystem, index: usize, error: &PipelineError) {
        warn!("Skipping {} record #{}: {}", source, index + 1, error);
    }

    fn on_run_complete(&self, summary: &PipelineSummary) {
        info!(
            "Run complete: {} claims, {} eligible, {} excluded",
            summary.total_claims, summary.eligible_for_resubmission, summary.excluded
        );
    }
}

/// Discards every event
pub struct SilentObserver;

impl RunObserver for SilentObserver {}
