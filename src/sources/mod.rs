pub mod alpha;
pub mod beta;

pub use alpha::load_alpha_records;
pub use beta::load_beta_records;
