//! Rendering for run outputs (results CSV, Markdown summary).

#![forbid(unsafe_code)]

mod csv_out;
mod markdown;

pub use csv_out::{render_results_csv, write_results_csv};
pub use markdown::render_markdown;
