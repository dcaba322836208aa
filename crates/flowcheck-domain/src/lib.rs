//! Pure policy evaluation (no IO).
//!
//! Input: a policy set constructed elsewhere, plus one traffic tuple.
//! Output: a decision with the matched rule and a reason.

#![forbid(unsafe_code)]

pub mod audit;
pub mod catalog;
pub mod classify;
pub mod containment;
pub mod match_mode;
pub mod model;
pub mod policy;
pub mod resolve;

mod engine;

#[cfg(test)]
mod proptest;
#[cfg(test)]
mod test_support;

pub use engine::{evaluate, evaluate_policies};
