use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

/// Expected outcome for a single test, as authored in a manifest.
///
/// Absence of an entry implies [`ExpectedOutcome::Pass`].
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExpectedOutcome {
  #[default]
  Pass,
  Fail,
}

/// Observed outcome of one test execution.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
  Pass,
  Fail,
}

/// Reconciliation of an observed outcome against the expectation tables.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
  Pass,
  ExpectedFail,
  UnexpectedPass,
  UnexpectedFail,
}

/// One authored table entry, minus its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expectation {
  pub status: ExpectedOutcome,
  pub reason: Option<String>,
  pub tracking_issue: Option<String>,
}

/// Which of the two tables an expectation came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
  KnownFailures,
  Incompatible,
}

impl fmt::Display for TableKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let value = match self {
      TableKind::KnownFailures => "known failures",
      TableKind::Incompatible => "incompatible",
    };
    f.write_str(value)
  }
}

/// Result of looking a test id up across the tables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppliedExpectation {
  pub expected: ExpectedOutcome,
  /// Table the expectation came from; `None` means the default expectation.
  pub table: Option<TableKind>,
  pub reason: Option<String>,
  pub tracking_issue: Option<String>,
}

/// A single expectation table: exact test ids (relative file paths) mapped
/// to authored expectations.
///
/// Ids must be unique within a table; loading rejects duplicates instead of
/// letting a later entry silently shadow an earlier one.
#[derive(Debug, Clone, Default)]
pub struct ExpectationTable {
  entries: BTreeMap<String, Expectation>,
}

impl ExpectationTable {
  pub fn empty() -> Self {
    Self::default()
  }

  pub fn from_path(path: &Path) -> Result<Self> {
    let raw =
      fs::read_to_string(path).with_context(|| format!("read manifest {}", path.display()))?;
    Self::from_str(&raw).map_err(|err| anyhow!("{}: {err}", path.display()))
  }

  pub fn from_str(raw: &str) -> Result<Self> {
    let manifest = match toml::from_str::<RawManifest>(raw) {
      Ok(manifest) => manifest,
      Err(toml_err) => serde_json::from_str::<RawManifest>(raw).map_err(|json_err| {
        anyhow!("failed to parse manifest as TOML ({toml_err}) or JSON ({json_err})")
      })?,
    };

    let mut entries = BTreeMap::new();
    for entry in manifest.expectations {
      let status = entry
        .status
        .ok_or_else(|| anyhow!("manifest entry `{}` missing `status`", entry.id))?;
      let expectation = Expectation {
        status,
        reason: entry.reason,
        tracking_issue: entry.tracking_issue,
      };
      if entries.insert(entry.id.clone(), expectation).is_some() {
        bail!("duplicate expectation for `{}`", entry.id);
      }
    }

    Ok(Self { entries })
  }

  pub fn get(&self, id: &str) -> Option<&Expectation> {
    self.entries.get(id)
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Ids in sorted order.
  pub fn ids(&self) -> impl Iterator<Item = &str> {
    self.entries.keys().map(|id| id.as_str())
  }
}

/// The pair of tables a runner consults.
///
/// The tables are kept separate because they answer different questions:
/// known failures are bugs expected to be fixed, incompatible entries are
/// deliberate permanent deviations. Lookup consults them independently,
/// known failures first.
#[derive(Debug, Clone, Default)]
pub struct ExpectationSet {
  known_failures: ExpectationTable,
  incompatible: ExpectationTable,
}

impl ExpectationSet {
  pub fn new(known_failures: ExpectationTable, incompatible: ExpectationTable) -> Self {
    Self {
      known_failures,
      incompatible,
    }
  }

  pub fn empty() -> Self {
    Self::default()
  }

  pub fn lookup(&self, id: &str) -> AppliedExpectation {
    for (kind, table) in [
      (TableKind::KnownFailures, &self.known_failures),
      (TableKind::Incompatible, &self.incompatible),
    ] {
      if let Some(expectation) = table.get(id) {
        return AppliedExpectation {
          expected: expectation.status,
          table: Some(kind),
          reason: expectation.reason.clone(),
          tracking_issue: expectation.tracking_issue.clone(),
        };
      }
    }

    AppliedExpectation::default()
  }

  /// Reconciles an observed outcome against the tables.
  pub fn classify(&self, id: &str, actual: Outcome) -> Classification {
    match (self.lookup(id).expected, actual) {
      (ExpectedOutcome::Pass, Outcome::Pass) => Classification::Pass,
      (ExpectedOutcome::Pass, Outcome::Fail) => Classification::UnexpectedFail,
      (ExpectedOutcome::Fail, Outcome::Fail) => Classification::ExpectedFail,
      (ExpectedOutcome::Fail, Outcome::Pass) => Classification::UnexpectedPass,
    }
  }

  /// Entries whose id matches none of `known_ids`, in table order then id
  /// order. Stale entries usually mean the suite moved or a test was
  /// renamed.
  pub fn stale_entries<'a>(
    &'a self,
    mut known_ids: impl FnMut(&str) -> bool,
  ) -> Vec<(TableKind, &'a str)> {
    let mut stale = Vec::new();
    for (kind, table) in [
      (TableKind::KnownFailures, &self.known_failures),
      (TableKind::Incompatible, &self.incompatible),
    ] {
      for id in table.ids() {
        if !known_ids(id) {
          stale.push((kind, id));
        }
      }
    }
    stale
  }
}

#[derive(Debug, Deserialize)]
struct RawManifest {
  #[serde(default)]
  expectations: Vec<RawEntry>,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
  id: String,
  #[serde(alias = "expectation")]
  status: Option<ExpectedOutcome>,
  reason: Option<String>,
  tracking_issue: Option<String>,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn table(raw: &str) -> ExpectationTable {
    ExpectationTable::from_str(raw).expect("manifest parsed")
  }

  #[test]
  fn manifest_parses_entries_with_reason_and_tracking_issue() {
    let parsed = table(
      r#"
[[expectations]]
id = "data/test/suite/intl402/ch11/11.3/11.3.2_TRP.js"
status = "fail"
reason = "Rounding behavior differs in ICU."
tracking_issue = "http://bugs.icu-project.org/trac/ticket/9547"
      "#,
    );

    let entry = parsed
      .get("data/test/suite/intl402/ch11/11.3/11.3.2_TRP.js")
      .expect("entry present");
    assert_eq!(entry.status, ExpectedOutcome::Fail);
    assert_eq!(entry.reason.as_deref(), Some("Rounding behavior differs in ICU."));
    assert_eq!(
      entry.tracking_issue.as_deref(),
      Some("http://bugs.icu-project.org/trac/ticket/9547")
    );
  }

  #[test]
  fn manifest_rejects_duplicate_ids() {
    let err = ExpectationTable::from_str(
      r#"
[[expectations]]
id = "a.js"
status = "fail"

[[expectations]]
id = "a.js"
status = "pass"
      "#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("duplicate expectation for `a.js`"));
  }

  #[test]
  fn manifest_rejects_missing_status() {
    let err = ExpectationTable::from_str(
      r#"
[[expectations]]
id = "a.js"
reason = "no status given"
      "#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("missing `status`"));
  }

  #[test]
  fn empty_manifest_parses_to_empty_table() {
    let parsed = table("expectations = []\n");
    assert!(parsed.is_empty());
  }

  #[test]
  fn classification_truth_table() {
    let set = ExpectationSet::new(
      table(
        r#"
[[expectations]]
id = "data/test/suite/intl402/ch11/11.1/11.1.1_20_c.js"
status = "fail"
reason = "ISO and CLDR data mismatch."
        "#,
      ),
      ExpectationTable::empty(),
    );

    let known = "data/test/suite/intl402/ch11/11.1/11.1.1_20_c.js";
    assert_eq!(set.classify(known, Outcome::Fail), Classification::ExpectedFail);
    assert_eq!(set.classify(known, Outcome::Pass), Classification::UnexpectedPass);
    assert_eq!(set.classify("data/test/suite/intl402/ch09/other.js", Outcome::Pass), Classification::Pass);
    assert_eq!(
      set.classify("data/test/suite/intl402/ch09/other.js", Outcome::Fail),
      Classification::UnexpectedFail
    );
  }

  #[test]
  fn known_failures_take_priority_over_incompatible() {
    let set = ExpectationSet::new(
      table(
        r#"
[[expectations]]
id = "both.js"
status = "fail"
reason = "bug"
        "#,
      ),
      table(
        r#"
[[expectations]]
id = "both.js"
status = "pass"
reason = "deviation"
        "#,
      ),
    );

    let applied = set.lookup("both.js");
    assert_eq!(applied.table, Some(TableKind::KnownFailures));
    assert_eq!(applied.expected, ExpectedOutcome::Fail);
    assert_eq!(applied.reason.as_deref(), Some("bug"));
  }

  #[test]
  fn lookup_miss_defaults_to_pass_with_no_table() {
    let set = ExpectationSet::empty();
    let applied = set.lookup("anything.js");
    assert_eq!(applied.expected, ExpectedOutcome::Pass);
    assert_eq!(applied.table, None);
    assert_eq!(applied.reason, None);
  }

  #[test]
  fn stale_entries_report_table_and_id() {
    let set = ExpectationSet::new(
      table(
        r#"
[[expectations]]
id = "live.js"
status = "fail"

[[expectations]]
id = "gone.js"
status = "fail"
        "#,
      ),
      table(
        r#"
[[expectations]]
id = "also-gone.js"
status = "pass"
        "#,
      ),
    );

    let stale = set.stale_entries(|id| id == "live.js");
    assert_eq!(
      stale,
      vec![
        (TableKind::KnownFailures, "gone.js"),
        (TableKind::Incompatible, "also-gone.js"),
      ]
    );
  }
}
