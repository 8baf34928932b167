//! Implementation of `kiln clean`.

use anyhow::{Context, Result};
use tracing::info;

use kiln_lib::consts::{BUILD_DIR, DIST_DIR};

/// Remove the build and dist trees.
///
/// Metadata-only: never touches mirroring, verification, or the native
/// build.
pub fn cmd_clean() -> Result<()> {
  let root = std::env::current_dir().context("failed to determine the repo root")?;

  for dir in [BUILD_DIR, DIST_DIR] {
    let path = root.join(dir);
    if path.exists() {
      std::fs::remove_dir_all(&path)
        .with_context(|| format!("failed to remove {}", path.display()))?;
      info!(path = %path.display(), "removed tree");
      println!("removed {}", path.display());
    }
  }
  Ok(())
}
