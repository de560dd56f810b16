pub mod eligibility;
pub mod observer;
pub mod pipeline;
pub mod reasons;

pub use eligibility::{EligibilityChecker, Verdict};
pub use observer::{RunObserver, SilentObserver, TracingObserver};
pub use pipeline::{ClaimPipeline, PipelineRun, PipelineSummary, RejectedRecord, ResubmissionCandidate};
