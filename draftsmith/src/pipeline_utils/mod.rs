//! Reusable building blocks for pipeline stages:
//! - **batch**: bounded-concurrency execution in strict sequential batches
//! - **json**: structured-payload extraction from free-text provider output

pub mod batch;
pub mod json;

pub use batch::run_in_batches;
pub use json::{extract_json, parse_payload};
