//! Environment + CLI resolution into a [`BuildConfig`].

use std::env;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::envbool::{env_flag, env_flag_or};
use crate::version::resolve_version;

use super::types::{BuildConfig, CliOverrides, ConfigError};

/// Default name of the full package.
const DEFAULT_PACKAGE_NAME: &str = "ember";

/// Default name of the core-only package.
const DEFAULT_CORE_PACKAGE_NAME: &str = "ember_core";

fn toggle(var: &str) -> Result<bool, ConfigError> {
  env_flag(var).map_err(|source| ConfigError::InvalidToggle {
    var: var.to_string(),
    source,
  })
}

fn toggle_or(var: &str, default: bool) -> Result<bool, ConfigError> {
  env_flag_or(var, default).map_err(|source| ConfigError::InvalidToggle {
    var: var.to_string(),
    source,
  })
}

fn env_string(var: &str, default: &str) -> String {
  match env::var(var) {
    Ok(value) if !value.is_empty() => value,
    _ => default.to_string(),
  }
}

impl BuildConfig {
  /// Resolve the full configuration for one build invocation.
  ///
  /// The mutual-exclusion check between the core-only and bindings-only
  /// modes runs before anything else so a conflicting invocation never gets
  /// to touch the filesystem.
  pub fn resolve(root: &Path, cli: &CliOverrides) -> Result<BuildConfig, ConfigError> {
    let core_only = toggle("BUILD_CORE_ONLY")?;
    let bindings_only = toggle("BUILD_BINDINGS_ONLY")?;
    if core_only && bindings_only {
      return Err(ConfigError::ConflictingBuildMode);
    }

    let max_jobs = match env::var("MAX_JOBS") {
      Ok(value) if !value.trim().is_empty() => match value.trim().parse::<usize>() {
        Ok(n) if n > 0 => Some(n),
        _ => return Err(ConfigError::InvalidJobCount { value }),
      },
      _ => None,
    };

    let compiler = env::var_os("CC")
      .filter(|value| !value.is_empty())
      .map(PathBuf::from);

    let custom_debinfo: Vec<PathBuf> = match env::var("USE_CUSTOM_DEBINFO") {
      Ok(list) => list
        .split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(PathBuf::from)
        .collect(),
      Err(_) => Vec::new(),
    };

    let package_name = if core_only {
      env_string("EMBER_CORE_PACKAGE_NAME", DEFAULT_CORE_PACKAGE_NAME)
    } else {
      env_string("EMBER_PACKAGE_NAME", DEFAULT_PACKAGE_NAME)
    };

    let config = BuildConfig {
      verbose: toggle_or("VERBOSE", true)? && !cli.quiet,
      rerun_cmake: cli.rerun_cmake || toggle("CMAKE_FRESH")?,
      cmake_only: cli.cmake_only || toggle("CMAKE_ONLY")?,
      build_tests: toggle_or("BUILD_TEST", true)?,
      use_cuda: toggle_or("USE_CUDA", true)?,
      use_cudnn: toggle_or("USE_CUDNN", true)?,
      use_system_libs: toggle("USE_SYSTEM_LIBS")?,
      core_only,
      bindings_only,
      compiler,
      max_jobs,
      custom_debinfo,
      cmake_args: cli.cmake_args.clone(),
      version: resolve_version(root),
      package_name,
      link_prebuilt_core: bindings_only,
    };

    debug!(
      package = %config.package_name,
      version = %config.version,
      use_cuda = config.use_cuda,
      "resolved build configuration"
    );
    Ok(config)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;
  use tempfile::TempDir;

  /// Variables the resolver reads; unset for a deterministic baseline.
  const RESOLVED_VARS: &[&str] = &[
    "BUILD_CORE_ONLY",
    "BUILD_BINDINGS_ONLY",
    "VERBOSE",
    "CMAKE_FRESH",
    "CMAKE_ONLY",
    "BUILD_TEST",
    "USE_CUDA",
    "USE_CUDNN",
    "USE_SYSTEM_LIBS",
    "CC",
    "MAX_JOBS",
    "USE_CUSTOM_DEBINFO",
    "EMBER_PACKAGE_NAME",
    "EMBER_CORE_PACKAGE_NAME",
    "EMBER_BUILD_VERSION",
  ];

  fn with_env<R>(overrides: &[(&str, &str)], f: impl FnOnce() -> R) -> R {
    let mut vars: Vec<(&str, Option<&str>)> =
      RESOLVED_VARS.iter().map(|var| (*var, None)).collect();
    for &(var, value) in overrides {
      if let Some(slot) = vars.iter_mut().find(|entry| entry.0 == var) {
        slot.1 = Some(value);
      }
    }
    temp_env::with_vars(vars, f)
  }

  fn resolve_in(temp: &TempDir, overrides: &[(&str, &str)], cli: &CliOverrides) -> Result<BuildConfig, ConfigError> {
    with_env(overrides, || BuildConfig::resolve(temp.path(), cli))
  }

  #[test]
  #[serial]
  fn defaults_with_clean_env() {
    let temp = TempDir::new().unwrap();
    let config = resolve_in(&temp, &[], &CliOverrides::default()).unwrap();

    assert!(config.verbose);
    assert!(config.use_cuda);
    assert!(config.use_cudnn);
    assert!(config.build_tests);
    assert!(!config.rerun_cmake);
    assert!(!config.cmake_only);
    assert!(!config.use_system_libs);
    assert!(!config.core_only);
    assert!(!config.bindings_only);
    assert!(!config.link_prebuilt_core);
    assert_eq!(config.package_name, "ember");
    assert_eq!(config.max_jobs, None);
    assert!(config.custom_debinfo.is_empty());
  }

  #[test]
  #[serial]
  fn conflicting_build_modes_fail() {
    let temp = TempDir::new().unwrap();
    let err = resolve_in(
      &temp,
      &[("BUILD_CORE_ONLY", "1"), ("BUILD_BINDINGS_ONLY", "ON")],
      &CliOverrides::default(),
    )
    .unwrap_err();

    assert!(matches!(err, ConfigError::ConflictingBuildMode));
  }

  #[test]
  #[serial]
  fn single_exclusive_mode_is_fine() {
    let temp = TempDir::new().unwrap();

    let core = resolve_in(&temp, &[("BUILD_CORE_ONLY", "1")], &CliOverrides::default()).unwrap();
    assert!(core.core_only);
    assert_eq!(core.package_name, "ember_core");

    let bindings =
      resolve_in(&temp, &[("BUILD_BINDINGS_ONLY", "1")], &CliOverrides::default()).unwrap();
    assert!(bindings.bindings_only);
    assert!(bindings.link_prebuilt_core);
    assert_eq!(bindings.package_name, "ember");
  }

  #[test]
  #[serial]
  fn env_disables_cuda() {
    let temp = TempDir::new().unwrap();
    let config = resolve_in(&temp, &[("USE_CUDA", "0")], &CliOverrides::default()).unwrap();
    assert!(!config.use_cuda);
    // USE_CUDNN is independent and keeps its default.
    assert!(config.use_cudnn);
  }

  #[test]
  #[serial]
  fn bad_toggle_literal_names_the_variable() {
    let temp = TempDir::new().unwrap();
    let err = resolve_in(&temp, &[("USE_CUDA", "fales")], &CliOverrides::default()).unwrap_err();
    assert!(err.to_string().contains("USE_CUDA"));
    assert!(err.to_string().contains("fales"));
  }

  #[test]
  #[serial]
  fn cli_flags_override_env() {
    let temp = TempDir::new().unwrap();
    let cli = CliOverrides {
      rerun_cmake: true,
      cmake_only: true,
      quiet: true,
      cmake_args: vec!["-DFOO=1".to_string()],
    };
    let config = resolve_in(&temp, &[], &cli).unwrap();

    assert!(config.rerun_cmake);
    assert!(config.cmake_only);
    assert!(!config.verbose, "quiet beats the VERBOSE default");
    assert_eq!(config.cmake_args, vec!["-DFOO=1".to_string()]);
  }

  #[test]
  #[serial]
  fn env_cmake_toggles_work_without_cli_flags() {
    let temp = TempDir::new().unwrap();
    let config = resolve_in(
      &temp,
      &[("CMAKE_FRESH", "yes"), ("CMAKE_ONLY", "true")],
      &CliOverrides::default(),
    )
    .unwrap();
    assert!(config.rerun_cmake);
    assert!(config.cmake_only);
  }

  #[test]
  #[serial]
  fn max_jobs_parses_or_fails() {
    let temp = TempDir::new().unwrap();

    let config = resolve_in(&temp, &[("MAX_JOBS", "8")], &CliOverrides::default()).unwrap();
    assert_eq!(config.max_jobs, Some(8));

    let err = resolve_in(&temp, &[("MAX_JOBS", "lots")], &CliOverrides::default()).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidJobCount { .. }));

    let err = resolve_in(&temp, &[("MAX_JOBS", "0")], &CliOverrides::default()).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidJobCount { .. }));
  }

  #[test]
  #[serial]
  fn custom_debinfo_splits_on_semicolons() {
    let temp = TempDir::new().unwrap();
    let config = resolve_in(
      &temp,
      &[("USE_CUSTOM_DEBINFO", "src/a.cpp; src/b.cpp;;")],
      &CliOverrides::default(),
    )
    .unwrap();
    assert_eq!(
      config.custom_debinfo,
      vec![PathBuf::from("src/a.cpp"), PathBuf::from("src/b.cpp")]
    );
  }

  #[test]
  #[serial]
  fn package_name_overrides_apply() {
    let temp = TempDir::new().unwrap();
    let config = resolve_in(
      &temp,
      &[("EMBER_PACKAGE_NAME", "ember-nightly")],
      &CliOverrides::default(),
    )
    .unwrap();
    assert_eq!(config.package_name, "ember-nightly");

    let config = resolve_in(
      &temp,
      &[("BUILD_CORE_ONLY", "1"), ("EMBER_CORE_PACKAGE_NAME", "ember-core-nightly")],
      &CliOverrides::default(),
    )
    .unwrap();
    assert_eq!(config.package_name, "ember-core-nightly");
  }
}
