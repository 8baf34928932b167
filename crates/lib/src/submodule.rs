//! Vendored submodule verification.
//!
//! The native build depends on checkouts under `third_party/`. Before
//! anything is compiled, each expected folder must exist and carry at least
//! one marker file proving it was actually checked out. The expected set
//! comes from the `.gitmodules` manifest, with a fixed fallback list when
//! no manifest is present.
//!
//! Recovery is deliberately asymmetric, matching long-standing behavior: a
//! tree where *every* folder is absent or empty gets exactly one recovery
//! checkout before re-checking, while a partially checked-out tree fails
//! immediately with no recovery attempt.

use std::path::{Path, PathBuf};
use std::time::Instant;

use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::config::BuildConfig;
use crate::consts::{GITMODULES_FILE, THIRD_PARTY_DIR};

/// Files whose presence proves a submodule folder is checked out.
const MARKER_FILES: &[&str] = &[
  "CMakeLists.txt",
  "Makefile",
  "setup.py",
  "LICENSE",
  "LICENSE.md",
  "LICENSE.txt",
];

/// Folders assumed when no `.gitmodules` manifest exists.
const FALLBACK_SUBMODULES: &[&str] = &["fmt", "cpuinfo", "sleef", "pybind11", "protobuf"];

/// Nested checkouts verified in addition to the manifest entries.
const NESTED_CHECKS: &[(&str, &[&str])] =
  &[("third_party/protobuf/third_party/googletest", &["CMakeLists.txt"])];

/// Errors from submodule verification.
#[derive(Debug, Error)]
pub enum SubmoduleError {
  /// A `path` entry in the manifest is malformed.
  #[error("malformed .gitmodules entry: {line:?}")]
  ManifestParse { line: String },

  /// Reading the manifest failed.
  #[error("failed to read .gitmodules: {0}")]
  ManifestRead(#[source] std::io::Error),

  /// A folder still lacks every marker file after any recovery attempt.
  #[error(
    "missing submodule checkout at {}: no marker file found (have you run `{tried}`?)",
    .path.display()
  )]
  Missing { path: PathBuf, tried: String },

  /// The recovery checkout command itself failed.
  #[error("submodule checkout failed with exit code {code:?}")]
  RecoveryFailed { code: Option<i32> },

  /// Spawning the recovery checkout failed.
  #[error("failed to launch submodule checkout: {0}")]
  RecoverySpawn(#[source] std::io::Error),
}

/// Options controlling verification.
#[derive(Debug, Clone)]
pub struct VerifyOptions {
  /// Skip verification entirely (system-provided libraries).
  pub skip: bool,

  /// Recovery command run once when every submodule folder is absent.
  pub recovery_command: Vec<String>,
}

impl Default for VerifyOptions {
  fn default() -> Self {
    Self {
      skip: false,
      recovery_command: ["git", "submodule", "update", "--init", "--recursive"]
        .iter()
        .map(ToString::to_string)
        .collect(),
    }
  }
}

impl VerifyOptions {
  /// Options derived from a resolved build configuration.
  pub fn from_config(config: &BuildConfig) -> Self {
    Self {
      skip: config.use_system_libs,
      ..Self::default()
    }
  }
}

/// Enumerate the expected submodule folders, resolved against the root.
///
/// An entry is any manifest line whose trimmed content starts with `path`;
/// the value is the text after the first `=`, trimmed. A `path` line with
/// no `=` or an empty value is a parse error.
pub fn submodule_folders(root: &Path) -> Result<Vec<PathBuf>, SubmoduleError> {
  let manifest = root.join(GITMODULES_FILE);
  if !manifest.exists() {
    return Ok(
      FALLBACK_SUBMODULES
        .iter()
        .map(|name| root.join(THIRD_PARTY_DIR).join(name))
        .collect(),
    );
  }

  let content = std::fs::read_to_string(&manifest).map_err(SubmoduleError::ManifestRead)?;
  let mut folders = Vec::new();
  for line in content.lines() {
    let trimmed = line.trim();
    if !trimmed.starts_with("path") {
      continue;
    }
    let Some((_, value)) = trimmed.split_once('=') else {
      return Err(SubmoduleError::ManifestParse {
        line: line.to_string(),
      });
    };
    let value = value.trim();
    if value.is_empty() {
      return Err(SubmoduleError::ManifestParse {
        line: line.to_string(),
      });
    }
    folders.push(root.join(value));
  }
  Ok(folders)
}

fn has_marker(folder: &Path, markers: &[&str]) -> bool {
  markers.iter().any(|marker| folder.join(marker).exists())
}

fn absent_or_empty(folder: &Path) -> bool {
  match std::fs::read_dir(folder) {
    Ok(mut entries) => entries.next().is_none(),
    Err(_) => true,
  }
}

async fn run_recovery(root: &Path, command: &[String]) -> Result<(), SubmoduleError> {
  let Some((program, args)) = command.split_first() else {
    return Err(SubmoduleError::RecoveryFailed { code: None });
  };

  info!(command = %command.join(" "), "attempting submodule checkout");
  let start = Instant::now();

  let status = Command::new(program)
    .args(args)
    .current_dir(root)
    .status()
    .await
    .map_err(SubmoduleError::RecoverySpawn)?;

  if !status.success() {
    warn!(code = ?status.code(), "submodule checkout failed");
    return Err(SubmoduleError::RecoveryFailed {
      code: status.code(),
    });
  }

  info!(elapsed = ?start.elapsed(), "submodule checkout finished");
  Ok(())
}

/// Verify every expected submodule checkout, per the options.
pub async fn verify_submodules(root: &Path, options: &VerifyOptions) -> Result<(), SubmoduleError> {
  if options.skip {
    debug!("using system libraries; skipping submodule verification");
    return Ok(());
  }

  let folders = submodule_folders(root)?;

  // One recovery attempt when the tree is wholly missing. A partially
  // checked-out tree gets none.
  if !folders.is_empty() && folders.iter().all(|folder| absent_or_empty(folder)) {
    run_recovery(root, &options.recovery_command).await?;
  }

  for folder in &folders {
    if !has_marker(folder, MARKER_FILES) {
      return Err(SubmoduleError::Missing {
        path: folder.clone(),
        tried: options.recovery_command.join(" "),
      });
    }
  }

  for (nested, markers) in NESTED_CHECKS {
    let folder = root.join(nested);
    if !has_marker(&folder, markers) {
      return Err(SubmoduleError::Missing {
        path: folder,
        tried: options.recovery_command.join(" "),
      });
    }
  }

  debug!(count = folders.len(), "submodule checkouts verified");
  Ok(())
}
