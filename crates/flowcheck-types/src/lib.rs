//! Stable DTOs and IDs used across the flowcheck workspace.
//!
//! This crate holds:
//! - the decision and protocol vocabulary shared by the engine and the outputs
//! - the per-tuple result row written to CSV
//! - the JSON run report envelope
//! - stable string IDs (schemas, reasons, column names)

#![forbid(unsafe_code)]

pub mod decision;
pub mod ids;
pub mod report;
pub mod row;

pub use decision::{Decision, Protocol};
pub use report::{AnalysisData, AnalysisReport, DecisionCounts, ToolMeta, SCHEMA_REPORT_V1};
pub use row::ResultRow;
