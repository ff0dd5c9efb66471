//! Pipeline phase workflows, independent of argument parsing

pub mod orchestration;

pub use orchestration::{run_compute, run_publish, write_compute_results, ComputeOutcome, PublishOutcome};
