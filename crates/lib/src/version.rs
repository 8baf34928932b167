//! Derived package version.
//!
//! An explicit `EMBER_BUILD_VERSION` override wins; otherwise the trimmed
//! contents of `version.txt` at the repo root, suffixed with the short git
//! revision when one is available.

use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::consts::VERSION_FILE;

/// Version used when neither an override nor `version.txt` is available.
const FALLBACK_VERSION: &str = "0.0.0+unknown";

/// Resolve the package version string for a repo root.
pub fn resolve_version(root: &Path) -> String {
  if let Ok(version) = std::env::var("EMBER_BUILD_VERSION") {
    if !version.is_empty() {
      return version;
    }
  }

  let Some(base) = read_version_file(root) else {
    return FALLBACK_VERSION.to_string();
  };

  match git_short_sha(root) {
    Some(sha) => format!("{base}+git{sha}"),
    None => base,
  }
}

fn read_version_file(root: &Path) -> Option<String> {
  let raw = std::fs::read_to_string(root.join(VERSION_FILE)).ok()?;
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return None;
  }
  Some(trimmed.to_string())
}

fn git_short_sha(root: &Path) -> Option<String> {
  let output = Command::new("git")
    .args(["rev-parse", "--short", "HEAD"])
    .current_dir(root)
    .output()
    .ok()?;
  if !output.status.success() {
    debug!("git rev-parse failed; omitting revision suffix");
    return None;
  }

  let sha = String::from_utf8_lossy(&output.stdout).trim().to_string();
  if sha.is_empty() { None } else { Some(sha) }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;
  use tempfile::TempDir;

  #[test]
  #[serial]
  fn override_wins_over_version_file() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join(VERSION_FILE), "1.2.3\n").unwrap();

    temp_env::with_var("EMBER_BUILD_VERSION", Some("9.9.9"), || {
      assert_eq!(resolve_version(temp.path()), "9.9.9");
    });
  }

  #[test]
  #[serial]
  fn version_file_is_trimmed_and_used_as_base() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join(VERSION_FILE), "  2.0.0rc1\n").unwrap();

    temp_env::with_var("EMBER_BUILD_VERSION", None::<&str>, || {
      // The git suffix depends on the surrounding checkout; only the base
      // is stable here.
      assert!(resolve_version(temp.path()).starts_with("2.0.0rc1"));
    });
  }

  #[test]
  #[serial]
  fn missing_version_file_falls_back() {
    let temp = TempDir::new().unwrap();

    temp_env::with_var("EMBER_BUILD_VERSION", None::<&str>, || {
      assert_eq!(resolve_version(temp.path()), FALLBACK_VERSION);
    });
  }
}
