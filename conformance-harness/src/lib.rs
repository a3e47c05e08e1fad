//! Shared utilities for conformance test runners that reconcile observed
//! results against hand-maintained expectation tables.
//!
//! This crate is intentionally small and dependency-light so runner binaries
//! can share the table format and classification rules without copy/pasting.

mod expectations;
mod report;

pub use expectations::{
  AppliedExpectation, Classification, Expectation, ExpectationSet, ExpectationTable,
  ExpectedOutcome, Outcome, TableKind,
};
pub use report::{write_json_report, write_json_report_to_writer};
