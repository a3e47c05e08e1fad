use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Location of the intl402 suite within a test262 checkout, relative to the
/// base directory test ids are derived from.
const SUITE_SUBDIR: &str = "data/test/suite/intl402";

#[derive(Debug, Clone)]
pub struct DiscoveredTest {
  /// Path relative to the base directory, `/`-separated. Doubles as the
  /// expectation-table key.
  pub id: String,
  pub path: PathBuf,
}

/// Walks the intl402 suite under `base_dir` and gathers every `.js` test.
///
/// The returned list is sorted by id, so iteration order is stable across
/// repeated runs on an unchanged tree.
pub fn discover_tests(base_dir: &Path) -> Result<Vec<DiscoveredTest>> {
  let suite_dir = base_dir
    .join("data")
    .join("test")
    .join("suite")
    .join("intl402");
  if !suite_dir.is_dir() {
    bail!(
      "intl402 suite not found at {} (expected a test262 checkout under {SUITE_SUBDIR})",
      suite_dir.display()
    );
  }

  let mut out = Vec::new();
  for entry in WalkDir::new(&suite_dir).follow_links(false) {
    let entry = entry.with_context(|| format!("walk {}", suite_dir.display()))?;
    if !entry.file_type().is_file() {
      continue;
    }
    let path = entry.into_path();
    if path.extension().and_then(|ext| ext.to_str()) != Some("js") {
      continue;
    }

    let id = normalize_id(base_dir, &path)?;
    out.push(DiscoveredTest { id, path });
  }

  out.sort_by(|a, b| a.id.cmp(&b.id));
  Ok(out)
}

fn normalize_id(base: &Path, path: &Path) -> Result<String> {
  let rel = path
    .strip_prefix(base)
    .with_context(|| format!("path {} was not under {}", path.display(), base.display()))?;
  let mut id = String::new();
  for (i, component) in rel.components().enumerate() {
    if i > 0 {
      id.push('/');
    }
    id.push_str(
      component
        .as_os_str()
        .to_str()
        .context("non-utf8 path component in discovered test path")?,
    );
  }
  Ok(id)
}
