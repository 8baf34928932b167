//! kiln: build driver for the ember native library.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cmd;
mod output;

/// Build driver for the ember native library.
#[derive(Parser)]
#[command(name = "kiln")]
#[command(version, about, long_about = None)]
struct Cli {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Run the full build: mirror, verify, configure, compile, stage.
  Build(cmd::BuildArgs),

  /// Deprecated alias of `build`.
  Rebuild(cmd::BuildArgs),

  /// Redirect to `pip install -e .` (legacy compatibility).
  Develop,

  /// Redirect to `pip install .` (legacy compatibility).
  Install,

  /// Remove the build and dist trees.
  Clean,

  /// Resolve and print the build configuration without building.
  Config {
    /// Print as JSON instead of text.
    #[arg(long)]
    json: bool,
  },
}

fn main() -> Result<()> {
  // 32-bit Windows hosts are unsupported.
  if cfg!(windows) && cfg!(target_pointer_width = "32") {
    eprintln!("the 32-bit Windows runtime is not supported; switch to a 64-bit runtime");
    std::process::exit(-1);
  }

  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .without_time()
    .init();

  // Usage mistakes exit 1, matching every other parse failure; help and
  // version output still succeed.
  let cli = match Cli::try_parse() {
    Ok(cli) => cli,
    Err(err) => {
      let code = if err.use_stderr() { 1 } else { 0 };
      let _ = err.print();
      std::process::exit(code);
    }
  };

  match cli.command {
    Commands::Build(args) => cmd::cmd_build(&args, false),
    Commands::Rebuild(args) => cmd::cmd_build(&args, true),
    Commands::Develop => cmd::cmd_redirect(true),
    Commands::Install => cmd::cmd_redirect(false),
    Commands::Clean => cmd::cmd_clean(),
    Commands::Config { json } => cmd::cmd_config(json),
  }
}
