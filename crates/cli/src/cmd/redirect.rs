//! Legacy `develop`/`install` compatibility redirect.
//!
//! These commands predate the current packaging flow. They re-invoke pip
//! with the current environment and terminate with the child's exit code:
//! a terminal state of the CLI, not a build step.

use std::process::Command;

use anyhow::{Context, Result};

use crate::output;

/// Redirect to the package-manager install and exit with its code.
pub fn cmd_redirect(editable: bool) -> Result<()> {
  let (name, pip_args): (&str, &[&str]) = if editable {
    ("develop", &["install", "-e", ".", "-v", "--no-build-isolation"])
  } else {
    ("install", &["install", ".", "-v", "--no-build-isolation"])
  };

  output::warn(&format!(
    "redirecting `kiln {name}` to `pip {}`",
    pip_args.join(" ")
  ));

  let status = Command::new("pip")
    .args(pip_args)
    .status()
    .with_context(|| format!("failed to launch pip for `{name}`"))?;

  // Exit code 1 stands in when the child was killed by a signal.
  std::process::exit(status.code().unwrap_or(1));
}
