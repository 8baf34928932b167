//! Build flow orchestration.
//!
//! Sequences one build invocation against an already-resolved
//! configuration:
//!
//! 1. Mirror generated sources into the packaged codegen tree
//! 2. Verify vendored submodule checkouts
//! 3. Configure the native build
//! 4. Stop here in config-only mode
//! 5. Compile the native core
//! 6. Mirror vendor kernel sources
//! 7. Stage the package
//!
//! Every phase failure is fatal; there is no partial-success state.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::config::BuildConfig;
use crate::mirror::{self, MirrorError};
use crate::native::{NativeBuildError, NativeBuilder, Packager};
use crate::submodule::{self, SubmoduleError, VerifyOptions};

/// How a build invocation finished.
#[derive(Debug, PartialEq, Eq)]
pub enum BuildOutcome {
  /// Config-only mode: configuration finished, compilation skipped.
  ConfigOnly,
  /// Full flow; the staged package lives at `dist_dir`.
  Complete { dist_dir: PathBuf },
}

/// Errors from the orchestrated build flow.
#[derive(Debug, Error)]
pub enum BuildFlowError {
  /// Generated-source or vendor-kernel mirroring failed.
  #[error(transparent)]
  Mirror(#[from] MirrorError),

  /// Submodule verification failed.
  #[error(transparent)]
  Submodule(#[from] SubmoduleError),

  /// The native toolchain or the packager failed.
  #[error(transparent)]
  Native(#[from] NativeBuildError),
}

/// Run one build invocation.
pub async fn run_build<N: NativeBuilder, P: Packager>(
  root: &Path,
  config: &BuildConfig,
  native: &N,
  packager: &P,
) -> Result<BuildOutcome, BuildFlowError> {
  mirror::mirror_generated(root)?;
  debug!("generated sources mirrored");

  submodule::verify_submodules(root, &VerifyOptions::from_config(config)).await?;

  native.configure(root, config).await?;

  if config.cmake_only {
    info!("config-only mode; stopping before the native build");
    return Ok(BuildOutcome::ConfigOnly);
  }

  native.build(root, config).await?;

  mirror::mirror_vendor_kernels(root, config.use_cuda)?;

  let dist_dir = packager.assemble(root, config)?;
  info!(dist = %dist_dir.display(), "build complete");
  Ok(BuildOutcome::Complete { dist_dir })
}
