use anyhow::{Context, Result};
use clap::Parser;
use conformance_harness::{write_json_report, ExpectationSet, ExpectationTable};
use intl402_runner::discover::discover_tests;
use intl402_runner::engine::ExternalEngine;
use intl402_runner::report::{Report, REPORT_SCHEMA_VERSION};
use intl402_runner::runner::{print_summary, run_tests};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::process::ExitCode;

const KNOWN_FAILURES_TOML: &str = include_str!("../expectations/known-failures.toml");
const INCOMPATIBLE_TOML: &str = include_str!("../expectations/incompatible.toml");

/// Runs the intl402 conformance suite against an external JS engine and
/// reconciles each result with the known-failure tables.
#[derive(Parser, Debug)]
#[command(version)]
struct Cli {
  /// Path to the test-execution binary.
  engine: PathBuf,

  /// Directory the suite checkout lives under; test ids are paths relative
  /// to it.
  #[arg(long, value_name = "DIR", default_value = ".")]
  base_dir: PathBuf,

  /// Adapter script handed to the engine first.
  /// Defaults to `../adapter.js` relative to the base directory.
  #[arg(long, value_name = "PATH")]
  adapter: Option<PathBuf>,

  /// Harness script handed to the engine before each test.
  /// Defaults to `data/test/harness/sta.js` under the base directory.
  #[arg(long, value_name = "PATH")]
  harness: Option<PathBuf>,

  /// Known-failure manifest replacing the compiled-in table.
  #[arg(long, value_name = "PATH")]
  expectations: Option<PathBuf>,

  /// Incompatibility manifest replacing the compiled-in table.
  #[arg(long, value_name = "PATH")]
  incompatible: Option<PathBuf>,

  /// Write a JSON report of every result to this path.
  #[arg(long, value_name = "PATH")]
  report: Option<PathBuf>,
}

fn main() -> ExitCode {
  // A malformed invocation prints the usage text and exits cleanly, before
  // any engine process is spawned.
  let cli = match Cli::try_parse() {
    Ok(cli) => cli,
    Err(err) => {
      err.print().ok();
      return ExitCode::SUCCESS;
    }
  };

  match run(cli) {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      eprintln!("{err:#}");
      ExitCode::FAILURE
    }
  }
}

fn run(cli: Cli) -> Result<()> {
  let expectations = load_expectations(&cli)?;
  let tests = discover_tests(&cli.base_dir)?;

  let ids: BTreeSet<&str> = tests.iter().map(|t| t.id.as_str()).collect();
  for (table, id) in expectations.stale_entries(|id| ids.contains(id)) {
    eprintln!("warning: {table} entry `{id}` matches no discovered test");
  }

  let engine = ExternalEngine {
    binary: cli.engine,
    adapter: cli
      .adapter
      .unwrap_or_else(|| cli.base_dir.join("..").join("adapter.js")),
    harness: cli.harness.unwrap_or_else(|| {
      cli
        .base_dir
        .join("data")
        .join("test")
        .join("harness")
        .join("sta.js")
    }),
  };

  let results = run_tests(&tests, &engine, &expectations)?;
  let summary = print_summary(&results);

  if let Some(path) = &cli.report {
    let report = Report {
      schema_version: REPORT_SCHEMA_VERSION,
      summary,
      results,
    };
    write_json_report(path, &report)?;
  }

  Ok(())
}

fn load_expectations(cli: &Cli) -> Result<ExpectationSet> {
  let known_failures = match &cli.expectations {
    Some(path) => ExpectationTable::from_path(path)?,
    None => ExpectationTable::from_str(KNOWN_FAILURES_TOML)
      .context("parse compiled-in known-failure table")?,
  };
  let incompatible = match &cli.incompatible {
    Some(path) => ExpectationTable::from_path(path)?,
    None => ExpectationTable::from_str(INCOMPATIBLE_TOML)
      .context("parse compiled-in incompatibility table")?,
  };
  Ok(ExpectationSet::new(known_failures, incompatible))
}
