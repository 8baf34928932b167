//! Resolved build configuration types.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::envbool::EnvBoolError;

/// Errors from configuration resolution.
#[derive(Debug, Error)]
pub enum ConfigError {
  /// An environment toggle held an unrecognized boolean literal.
  #[error("{var}: {source}")]
  InvalidToggle {
    var: String,
    #[source]
    source: EnvBoolError,
  },

  /// Mutually exclusive build modes were both requested.
  #[error("BUILD_CORE_ONLY and BUILD_BINDINGS_ONLY are mutually exclusive")]
  ConflictingBuildMode,

  /// `MAX_JOBS` was set but is not a positive integer.
  #[error("invalid MAX_JOBS value: {value:?}")]
  InvalidJobCount { value: String },
}

/// CLI-side inputs merged into the environment-derived configuration.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
  /// `--cmake`: force a fresh CMake configure run.
  pub rerun_cmake: bool,

  /// `--cmake-only`: stop after the configure step.
  pub cmake_only: bool,

  /// `-q`/`--quiet`: suppress progress reporting.
  pub quiet: bool,

  /// Tokens after `--`, forwarded verbatim to CMake.
  pub cmake_args: Vec<String>,
}

/// Immutable build configuration, resolved once per invocation.
///
/// Two toggles are mutually exclusive: `core_only` (build the core-only
/// package, no bindings) and `bindings_only` (build the bindings against an
/// already-installed core). Construction fails if both are set.
#[derive(Debug, Clone, Serialize)]
pub struct BuildConfig {
  pub verbose: bool,
  pub rerun_cmake: bool,
  pub cmake_only: bool,
  pub build_tests: bool,
  pub use_cuda: bool,
  pub use_cudnn: bool,
  /// Trust system-provided libraries; skips submodule verification.
  pub use_system_libs: bool,
  pub core_only: bool,
  pub bindings_only: bool,
  /// C/C++ compiler override (`CC`).
  pub compiler: Option<PathBuf>,
  /// Maximum parallel compile jobs (`MAX_JOBS`).
  pub max_jobs: Option<usize>,
  /// Source files singled out for debug info (`USE_CUSTOM_DEBINFO`).
  pub custom_debinfo: Vec<PathBuf>,
  /// Extra arguments forwarded verbatim to CMake.
  pub cmake_args: Vec<String>,
  pub package_name: String,
  pub version: String,
  /// Link the bindings against a prebuilt core instead of rebuilding it.
  /// Derived from `bindings_only`; replaces the ambient env mutation the
  /// legacy flow used for the same purpose.
  pub link_prebuilt_core: bool,
}
