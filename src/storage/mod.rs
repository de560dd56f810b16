pub mod output;

pub use output::{OutputPaths, ResultWriter};
