mod runner;

pub use runner::{run_filter, RunStats};
