use anyhow::{Context, Result};
use conformance_harness::Outcome;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Seam between the run loop and the external JS engine, so the loop can be
/// exercised without spawning real processes.
pub trait Engine {
  fn run_test(&self, test: &Path) -> Result<Outcome>;
}

/// Invokes the external engine binary once per test, synchronously, passing
/// the adapter script, the shared harness script, and the test file in that
/// order. The child inherits stdio; its exit code is the pass/fail signal.
#[derive(Debug, Clone)]
pub struct ExternalEngine {
  pub binary: PathBuf,
  pub adapter: PathBuf,
  pub harness: PathBuf,
}

impl Engine for ExternalEngine {
  fn run_test(&self, test: &Path) -> Result<Outcome> {
    let status = Command::new(&self.binary)
      .arg(&self.adapter)
      .arg(&self.harness)
      .arg(test)
      .status()
      .with_context(|| format!("spawn {}", self.binary.display()))?;

    Ok(if status.success() {
      Outcome::Pass
    } else {
      Outcome::Fail
    })
  }
}
