use conformance_harness::{Classification, Outcome, TableKind};
use serde::{Deserialize, Serialize};

pub const REPORT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TestResult {
  pub id: String,
  pub outcome: Outcome,
  pub classification: Classification,
  /// Table that supplied the expectation, when one matched.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub expectation_table: Option<TableKind>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub reason: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub tracking_issue: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Summary {
  pub total: usize,
  pub passed: usize,
  pub failed: usize,
  pub expected_failures: usize,
  pub unexpected_passes: usize,
  pub unexpected_failures: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Report {
  pub schema_version: u32,
  pub summary: Summary,
  pub results: Vec<TestResult>,
}

pub fn summarize(results: &[TestResult]) -> Summary {
  let mut summary = Summary::default();
  for result in results {
    summary.total += 1;
    match result.outcome {
      Outcome::Pass => summary.passed += 1,
      Outcome::Fail => summary.failed += 1,
    }
    match result.classification {
      Classification::Pass => {}
      Classification::ExpectedFail => summary.expected_failures += 1,
      Classification::UnexpectedPass => summary.unexpected_passes += 1,
      Classification::UnexpectedFail => summary.unexpected_failures += 1,
    }
  }
  summary
}
