//! Benchmark harness comparing stackshot's two capture variants.
//!
//! [`harness`] times captures at a fixed call depth, [`stats`] reduces the
//! samples, and [`report`] renders the findings as Markdown or JSON.

pub mod config;
pub mod error;
pub mod harness;
pub mod report;
pub mod stats;

pub use config::{BenchConfig, Format, Overrides};
pub use error::BenchError;
pub use harness::{Variant, VariantRun, run, run_variant};
pub use report::{BenchReport, VariantReport};
pub use stats::Summary;
