use anyhow::Context;
use serde::Serialize;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write a pretty JSON report to `path`, creating parent directories as
/// needed.
///
/// Deterministic output requires that `report` itself is deterministic:
/// sort result lists by a stable key and prefer `BTreeMap` over `HashMap`
/// for any serialized fields.
pub fn write_json_report<T: Serialize>(path: &Path, report: &T) -> anyhow::Result<()> {
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
  }

  let file = fs::File::create(path).with_context(|| format!("create {}", path.display()))?;
  let mut writer = BufWriter::new(file);
  write_json_report_to_writer(&mut writer, report)
    .with_context(|| format!("write report to {}", path.display()))?;
  writer.flush().ok();
  Ok(())
}

/// Write a pretty JSON report to `writer`, terminated with a newline.
pub fn write_json_report_to_writer<W: Write, T: Serialize>(
  writer: &mut W,
  report: &T,
) -> anyhow::Result<()> {
  serde_json::to_writer_pretty(&mut *writer, report).context("write JSON report")?;
  writeln!(&mut *writer).ok();
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn report_bytes_are_stable_and_newline_terminated() {
    #[derive(Debug, Serialize)]
    struct Report {
      schema_version: u32,
      ids: Vec<&'static str>,
    }

    let report = Report {
      schema_version: 1,
      ids: vec!["a", "b"],
    };

    let mut first = Vec::new();
    write_json_report_to_writer(&mut first, &report).unwrap();
    let mut second = Vec::new();
    write_json_report_to_writer(&mut second, &report).unwrap();

    assert_eq!(first, second);
    assert!(first.ends_with(b"\n"));

    let text = String::from_utf8(first).unwrap();
    let schema_idx = text.find("\"schema_version\"").unwrap();
    let ids_idx = text.find("\"ids\"").unwrap();
    assert!(schema_idx < ids_idx);
  }
}
