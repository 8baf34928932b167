//! Implementation of `kiln config`.

use anyhow::{Context, Result};
use tracing::info;

use kiln_lib::config::{BuildConfig, CliOverrides};

/// Resolve and print the build configuration, then stop.
///
/// Never verifies submodules or invokes the native build; useful for
/// checking what a given environment would produce.
pub fn cmd_config(json: bool) -> Result<()> {
  let root = std::env::current_dir().context("failed to determine the repo root")?;
  let config = BuildConfig::resolve(&root, &CliOverrides::default())?;
  info!(
    package = %config.package_name,
    version = %config.version,
    "configuration resolved"
  );

  if json {
    println!("{}", serde_json::to_string_pretty(&config)?);
    return Ok(());
  }

  println!("package:         {}-{}", config.package_name, config.version);
  println!("use_cuda:        {}", config.use_cuda);
  println!("use_cudnn:       {}", config.use_cudnn);
  println!("build_tests:     {}", config.build_tests);
  println!("use_system_libs: {}", config.use_system_libs);
  println!("core_only:       {}", config.core_only);
  println!("bindings_only:   {}", config.bindings_only);
  if let Some(jobs) = config.max_jobs {
    println!("max_jobs:        {jobs}");
  }
  if let Some(compiler) = &config.compiler {
    println!("compiler:        {}", compiler.display());
  }
  Ok(())
}
