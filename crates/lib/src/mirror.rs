//! Generated-file mirroring.
//!
//! Symbolic links are unreliable on some supported platforms, so generated
//! and template sources are copied from their canonical locations into the
//! packaged codegen tree instead. The mapping set is fixed and evaluated
//! fresh on every build; re-running with unchanged sources yields a
//! byte-identical destination tree.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

/// A (destination, source) copy requirement, relative to the repo root.
#[derive(Debug, Clone, Copy)]
pub struct MirrorMapping {
  pub dest: &'static str,
  pub src: &'static str,
}

/// Sources mirrored into the packaged codegen tree on every build.
///
/// Order matters: the `autograd/templates` entry re-copies a subtree that
/// the `autograd` directory copy just produced, which is redundant but
/// harmless and keeps the two canonical locations independently listed.
pub const GENERATED_MIRRORS: &[MirrorMapping] = &[
  MirrorMapping {
    dest: "codegen/packaged/ops/op_schema.yaml",
    src: "native/src/ops/op_schema.yaml",
  },
  MirrorMapping {
    dest: "codegen/packaged/ops/tags.yaml",
    src: "native/src/ops/tags.yaml",
  },
  MirrorMapping {
    dest: "codegen/packaged/ops/templates",
    src: "native/src/ops/templates",
  },
  MirrorMapping {
    dest: "codegen/packaged/autograd",
    src: "tools/autograd",
  },
  MirrorMapping {
    dest: "codegen/packaged/autograd/templates",
    src: "tools/autograd/templates",
  },
];

/// Vendor kernel sources mirrored only for accelerator builds.
pub const VENDOR_KERNEL_MIRRORS: &[MirrorMapping] = &[MirrorMapping {
  dest: "codegen/packaged/cuda/kernels",
  src: "third_party/kernelgen/src/cuda",
}];

/// Errors from mirroring.
#[derive(Debug, Error)]
pub enum MirrorError {
  /// A required mapping's source is neither a file nor a directory.
  #[error("mirror source missing: {} (mirrored to {})", .src.display(), .dest.display())]
  SourceMissing { src: PathBuf, dest: PathBuf },

  /// A filesystem operation failed.
  #[error("io error at {}: {source}", .path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

fn io_at(path: &Path) -> impl FnOnce(std::io::Error) -> MirrorError {
  let path = path.to_path_buf();
  move |source| MirrorError::Io { path, source }
}

/// Mirror the always-required generated sources.
pub fn mirror_generated(root: &Path) -> Result<(), MirrorError> {
  for mapping in GENERATED_MIRRORS {
    mirror_one(root, mapping, true)?;
  }
  Ok(())
}

/// Mirror vendor kernel sources.
///
/// Same algorithm as the generated pass, except a missing source is skipped
/// instead of fatal when the accelerator is disabled.
pub fn mirror_vendor_kernels(root: &Path, accelerator_enabled: bool) -> Result<(), MirrorError> {
  for mapping in VENDOR_KERNEL_MIRRORS {
    mirror_one(root, mapping, accelerator_enabled)?;
  }
  Ok(())
}

/// Copy one mapping. Returns `false` when an exempt mapping was skipped.
fn mirror_one(root: &Path, mapping: &MirrorMapping, required: bool) -> Result<bool, MirrorError> {
  let src = root.join(mapping.src);
  let dest = root.join(mapping.dest);

  if src.is_file() {
    if let Some(parent) = dest.parent() {
      fs::create_dir_all(parent).map_err(io_at(parent))?;
    }
    fs::copy(&src, &dest).map_err(io_at(&dest))?;
    debug!(src = %src.display(), dest = %dest.display(), "mirrored file");
    return Ok(true);
  }

  if src.is_dir() {
    // copying over a stale tree would leave removed files behind
    if dest.exists() {
      fs::remove_dir_all(&dest).map_err(io_at(&dest))?;
    }
    copy_tree(&src, &dest)?;
    debug!(src = %src.display(), dest = %dest.display(), "mirrored directory");
    return Ok(true);
  }

  if required {
    return Err(MirrorError::SourceMissing { src, dest });
  }
  debug!(src = %src.display(), "optional mirror source absent; skipping");
  Ok(false)
}

/// Recursively copy a directory tree, creating destination directories.
pub(crate) fn copy_tree(src: &Path, dest: &Path) -> Result<(), MirrorError> {
  for entry in WalkDir::new(src) {
    let entry = entry.map_err(|e| MirrorError::Io {
      path: src.to_path_buf(),
      source: e.into(),
    })?;
    let Ok(relative) = entry.path().strip_prefix(src) else {
      continue;
    };
    let target = dest.join(relative);

    if entry.file_type().is_dir() {
      fs::create_dir_all(&target).map_err(io_at(&target))?;
    } else {
      if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(io_at(parent))?;
      }
      fs::copy(entry.path(), &target).map_err(io_at(&target))?;
    }
  }
  Ok(())
}
