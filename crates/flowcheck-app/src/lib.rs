//! Use case orchestration for flowcheck.
//!
//! This crate provides the application layer: use cases that coordinate the sources, settings,
//! domain, and render layers. It only orchestrates; the heavy lifting lives in those crates.
//!
//! The CLI crate depends on this; it only handles argument parsing and I/O.

#![forbid(unsafe_code)]

mod analyze;
mod output;
mod resolve;

pub use analyze::{
    AnalysisInput, AnalysisOutput, analysis_exit_code, evaluate_cross_product, run_analysis,
};
pub use output::{write_report, write_results, write_text};
pub use resolve::{ResolveOutput, ResolveTarget, run_resolve};
