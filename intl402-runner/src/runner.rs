use crate::discover::DiscoveredTest;
use crate::engine::Engine;
use crate::report::{summarize, Summary, TestResult};
use anyhow::Result;
use conformance_harness::{Classification, ExpectationSet, Outcome};

/// Runs every discovered test through the engine, one at a time, waiting
/// for each to complete before starting the next. Announcement and verdict
/// lines are printed as each test resolves; the verdict line reflects only
/// the engine's exit code.
pub fn run_tests(
  tests: &[DiscoveredTest],
  engine: &dyn Engine,
  expectations: &ExpectationSet,
) -> Result<Vec<TestResult>> {
  let mut results = Vec::with_capacity(tests.len());
  for test in tests {
    println!("Testing: {}", test.id);
    let outcome = engine.run_test(&test.path)?;
    match outcome {
      Outcome::Pass => println!("PASS"),
      Outcome::Fail => println!("FAIL"),
    }

    let applied = expectations.lookup(&test.id);
    results.push(TestResult {
      id: test.id.clone(),
      outcome,
      classification: expectations.classify(&test.id, outcome),
      expectation_table: applied.table,
      reason: applied.reason,
      tracking_issue: applied.tracking_issue,
    });
  }
  Ok(results)
}

/// Prints the aggregate summary and the ids behind any unexpected results.
pub fn print_summary(results: &[TestResult]) -> Summary {
  let summary = summarize(results);
  println!();
  println!(
    "{} tests: {} passed, {} failed ({} expected)",
    summary.total, summary.passed, summary.failed, summary.expected_failures
  );

  print_unexpected(
    results,
    Classification::UnexpectedPass,
    "Unexpected passes (consider retiring the expectation):",
  );
  print_unexpected(results, Classification::UnexpectedFail, "Unexpected failures:");

  summary
}

fn print_unexpected(results: &[TestResult], classification: Classification, heading: &str) {
  let matching: Vec<&TestResult> = results
    .iter()
    .filter(|result| result.classification == classification)
    .collect();
  if matching.is_empty() {
    return;
  }

  eprintln!();
  eprintln!("{heading}");
  for result in matching {
    match &result.reason {
      Some(reason) => eprintln!("  {} ({reason})", result.id),
      None => eprintln!("  {}", result.id),
    }
  }
}
