pub mod claims;
pub mod cli;
pub mod config;
pub mod error;
pub mod resubmit;
pub mod sources;
pub mod storage;
pub mod utils;

pub use error::{Result, PipelineError};
pub use config::Config;
