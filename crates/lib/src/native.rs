//! External native-build collaborators.
//!
//! The CMake configure/build steps and package staging sit behind typed
//! interfaces so the orchestrator depends on a finite set of operations
//! rather than on ambient commands. [`CmakeBuild`] and [`DistPackager`] are
//! the real implementations; tests substitute recording mocks.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use serde::Serialize;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::BuildConfig;
use crate::consts::{BUILD_DIR, DIST_DIR, NATIVE_DIR};
use crate::mirror;

/// Errors from the native build and packaging collaborators.
#[derive(Debug, Error)]
pub enum NativeBuildError {
  /// An external command exited unsuccessfully.
  #[error("{phase} failed with exit code {code:?}")]
  CommandFailed {
    phase: &'static str,
    code: Option<i32>,
  },

  /// Spawning or filesystem work around the collaborator failed.
  #[error("{phase}: {source}")]
  Io {
    phase: &'static str,
    #[source]
    source: std::io::Error,
  },
}

/// Configure + compile interface of the native toolchain.
#[allow(async_fn_in_trait)]
pub trait NativeBuilder {
  /// Run the configure step (CMake generation).
  async fn configure(&self, root: &Path, config: &BuildConfig) -> Result<(), NativeBuildError>;

  /// Run the compile step against an already-configured build tree.
  async fn build(&self, root: &Path, config: &BuildConfig) -> Result<(), NativeBuildError>;
}

/// Package staging interface.
pub trait Packager {
  /// Stage built artifacts into a package layout; returns the staging dir.
  fn assemble(&self, root: &Path, config: &BuildConfig) -> Result<PathBuf, NativeBuildError>;
}

/// Drives CMake for the native core.
#[derive(Debug, Default)]
pub struct CmakeBuild;

impl CmakeBuild {
  fn configure_args(root: &Path, config: &BuildConfig) -> Vec<String> {
    fn onoff(value: bool) -> &'static str {
      if value { "ON" } else { "OFF" }
    }

    let mut args = vec![
      "-S".to_string(),
      root.join(NATIVE_DIR).display().to_string(),
      "-B".to_string(),
      root.join(BUILD_DIR).display().to_string(),
      format!("-DUSE_CUDA={}", onoff(config.use_cuda)),
      format!("-DUSE_CUDNN={}", onoff(config.use_cudnn)),
      format!("-DBUILD_TEST={}", onoff(config.build_tests)),
      format!("-DPACKAGE_VERSION={}", config.version),
    ];
    if config.link_prebuilt_core {
      args.push("-DLINK_PREBUILT_CORE=ON".to_string());
    }
    if let Some(compiler) = &config.compiler {
      args.push(format!("-DCMAKE_C_COMPILER={}", compiler.display()));
      args.push(format!("-DCMAKE_CXX_COMPILER={}", compiler.display()));
    }
    if !config.custom_debinfo.is_empty() {
      let list = config
        .custom_debinfo
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(";");
      args.push(format!("-DUSE_CUSTOM_DEBINFO={list}"));
    }
    args.extend(config.cmake_args.iter().cloned());
    args
  }
}

impl NativeBuilder for CmakeBuild {
  async fn configure(&self, root: &Path, config: &BuildConfig) -> Result<(), NativeBuildError> {
    const PHASE: &str = "cmake configure";

    let cache = root.join(BUILD_DIR).join("CMakeCache.txt");
    if config.rerun_cmake && cache.exists() {
      debug!(path = %cache.display(), "removing CMake cache for a fresh configure");
      std::fs::remove_file(&cache).map_err(|source| NativeBuildError::Io {
        phase: PHASE,
        source,
      })?;
    }

    let mut command = Command::new("cmake");
    command
      .args(Self::configure_args(root, config))
      .current_dir(root);
    info!(build_dir = %root.join(BUILD_DIR).display(), "configuring native build");
    run_command(PHASE, &mut command, config.verbose).await
  }

  async fn build(&self, root: &Path, config: &BuildConfig) -> Result<(), NativeBuildError> {
    let mut command = Command::new("cmake");
    command
      .arg("--build")
      .arg(root.join(BUILD_DIR))
      .current_dir(root);
    if let Some(jobs) = config.max_jobs {
      command.arg("--parallel").arg(jobs.to_string());
    }
    info!(jobs = ?config.max_jobs, "compiling native core");
    run_command("native build", &mut command, config.verbose).await
  }
}

async fn run_command(
  phase: &'static str,
  command: &mut Command,
  verbose: bool,
) -> Result<(), NativeBuildError> {
  if !verbose {
    command.stdout(Stdio::null());
  }

  let status = command.status().await.map_err(|source| NativeBuildError::Io {
    phase,
    source,
  })?;

  if !status.success() {
    return Err(NativeBuildError::CommandFailed {
      phase,
      code: status.code(),
    });
  }
  Ok(())
}

/// Package metadata written next to the staged artifacts.
#[derive(Debug, Serialize)]
struct PackageMetadata<'a> {
  name: &'a str,
  version: &'a str,
  use_cuda: bool,
  use_cudnn: bool,
  core_only: bool,
}

/// Stages built artifacts under `dist/` with a metadata file.
#[derive(Debug, Default)]
pub struct DistPackager;

impl Packager for DistPackager {
  fn assemble(&self, root: &Path, config: &BuildConfig) -> Result<PathBuf, NativeBuildError> {
    const PHASE: &str = "package assembly";
    let io = |source: std::io::Error| NativeBuildError::Io {
      phase: PHASE,
      source,
    };

    let dist = root
      .join(DIST_DIR)
      .join(format!("{}-{}", config.package_name, config.version));
    if dist.exists() {
      std::fs::remove_dir_all(&dist).map_err(io)?;
    }
    std::fs::create_dir_all(&dist).map_err(io)?;

    let lib_src = root.join(BUILD_DIR).join("lib");
    if lib_src.is_dir() {
      mirror::copy_tree(&lib_src, &dist.join("lib"))
        .map_err(|e| io(std::io::Error::other(e)))?;
    }

    let metadata = PackageMetadata {
      name: &config.package_name,
      version: &config.version,
      use_cuda: config.use_cuda,
      use_cudnn: config.use_cudnn,
      core_only: config.core_only,
    };
    let json = serde_json::to_string_pretty(&metadata).map_err(|e| io(std::io::Error::other(e)))?;
    std::fs::write(dist.join("metadata.json"), json).map_err(io)?;

    info!(dist = %dist.display(), "package staged");
    Ok(dist)
  }
}
