use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode};

/// Generates project files for the i18n extension library by driving the
/// external gyp generator with a fixed argument list.
#[derive(Parser, Debug)]
#[command(version)]
struct Cli {
  /// Project root the include paths and defines are derived from.
  #[arg(long, value_name = "DIR", default_value = ".")]
  root: PathBuf,

  /// Target gyp file to process, relative to the root.
  #[arg(long, value_name = "PATH", default_value = "build/all.gyp")]
  gyp_file: PathBuf,

  /// Generator executable to invoke.
  #[arg(long, value_name = "PATH", default_value = "gyp")]
  generator: PathBuf,
}

/// Fixed ordered argument list: depth marker, include files, defines, then
/// the target gyp file. The v8 and icu checkouts are expected to sit next
/// to and above the project root, respectively.
fn generator_args(root: &Path, gyp_file: &Path) -> Vec<String> {
  let sibling = root.join("..");
  let checkout_root = root.join("..").join("..");

  vec![
    format!("--depth={}", root.display()),
    format!("-I{}", root.join("build").join("common.gypi").display()),
    format!(
      "-I{}",
      sibling.join("v8").join("build").join("standalone.gypi").display()
    ),
    format!("-Dicu_path={}", checkout_root.join("icu").display()),
    format!("-Dv8_path={}", checkout_root.display()),
    "-Dv8_use_snapshot".to_string(),
    "-Dwerror=".to_string(),
    "-Dcomponent=static_library".to_string(),
    "-Dlibrary=static_library".to_string(),
    root.join(gyp_file).display().to_string(),
  ]
}

fn run(cli: &Cli) -> Result<i32> {
  println!("Generating project files from gyp rules...");

  let status = Command::new(&cli.generator)
    .args(generator_args(&cli.root, &cli.gyp_file))
    .status()
    .with_context(|| format!("spawn {}", cli.generator.display()))?;

  // A signal death carries no exit code; report it as a plain failure.
  Ok(status.code().unwrap_or(1))
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  match run(&cli) {
    Ok(0) => ExitCode::SUCCESS,
    Ok(code) => {
      eprintln!("error: gyp exited with status {code}");
      ExitCode::from(code.clamp(1, u8::MAX as i32) as u8)
    }
    Err(err) => {
      eprintln!("{err:#}");
      ExitCode::FAILURE
    }
  }
}
