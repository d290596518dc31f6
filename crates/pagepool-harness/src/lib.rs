//! Conformance harness for the pagepool allocation subsystem.
//!
//! This crate provides:
//! - Executable checks for the allocation contract: size-class routing,
//!   accounting conservation, page-growth behavior, the general-heap
//!   fallback boundary, and diagnostic fill visibility
//! - A runner that executes the checks and aggregates outcomes
//! - Report generation: human-readable markdown + machine-readable JSON

#![forbid(unsafe_code)]

pub mod error;
pub mod report;
pub mod runner;
pub mod scenarios;
pub mod verify;

pub use error::HarnessError;
pub use report::ConformanceReport;
pub use runner::ScenarioRunner;
pub use verify::{CheckResult, CheckSummary};
