//! Implementation of `kiln build` (and the deprecated `rebuild` alias).

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use kiln_lib::config::{BuildConfig, CliOverrides};
use kiln_lib::native::{CmakeBuild, DistPackager};
use kiln_lib::orchestrate::{BuildOutcome, run_build};

use crate::output;

/// Arguments shared by `build` and `rebuild`.
#[derive(Debug, Args)]
pub struct BuildArgs {
  /// Force a fresh CMake configure run, ignoring the existing cache.
  #[arg(long)]
  pub cmake: bool,

  /// Stop once CMake has finished; leaves room to tweak build options.
  #[arg(long)]
  pub cmake_only: bool,

  /// Suppress progress reporting.
  #[arg(short, long)]
  pub quiet: bool,

  /// Extra arguments forwarded verbatim to CMake.
  #[arg(last = true)]
  pub cmake_args: Vec<String>,
}

/// Execute the build command.
///
/// Resolves the configuration once, then runs the orchestrated flow with
/// the real CMake and packaging collaborators.
pub fn cmd_build(args: &BuildArgs, deprecated_alias: bool) -> Result<()> {
  if deprecated_alias {
    output::warn("`kiln rebuild` is deprecated; use `kiln build`");
  }

  let root = std::env::current_dir().context("failed to determine the repo root")?;

  let overrides = CliOverrides {
    rerun_cmake: args.cmake,
    cmake_only: args.cmake_only,
    quiet: args.quiet,
    cmake_args: args.cmake_args.clone(),
  };
  let config = BuildConfig::resolve(&root, &overrides)?;
  info!(
    package = %config.package_name,
    version = %config.version,
    cmake_only = config.cmake_only,
    "starting build"
  );

  if config.verbose {
    println!("building {}-{}", config.package_name, config.version);
  }

  let started = Instant::now();
  let rt = tokio::runtime::Runtime::new().context("failed to create async runtime")?;
  let outcome = rt.block_on(run_build(&root, &config, &CmakeBuild, &DistPackager))?;

  info!(elapsed = %humantime::format_duration(whole_seconds(started.elapsed())), "build finished");
  for line in summary_lines(&outcome, &config, started.elapsed()) {
    println!("{line}");
  }

  Ok(())
}

/// Progress summary for a finished build. Empty when quiet.
fn summary_lines(outcome: &BuildOutcome, config: &BuildConfig, elapsed: Duration) -> Vec<String> {
  if !config.verbose {
    return Vec::new();
  }
  match outcome {
    BuildOutcome::ConfigOnly => {
      vec!["configuration finished; run `kiln build` to compile".to_owned()]
    }
    BuildOutcome::Complete { dist_dir } => vec![
      String::new(),
      format!("{} Build complete!", output::symbols::SUCCESS),
      format!("  Package: {}-{}", config.package_name, config.version),
      format!("  Staged at: {}", dist_dir.display()),
      format!("  Took: {}", humantime::format_duration(whole_seconds(elapsed))),
    ],
  }
}

fn whole_seconds(elapsed: Duration) -> Duration {
  Duration::from_secs(elapsed.as_secs())
}
