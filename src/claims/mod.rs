pub mod types;
pub mod normalize;

pub use types::{AlphaRecord, BetaRecord, SourceSystem, UnifiedClaimRecord};
pub use normalize::SourceRecord;
