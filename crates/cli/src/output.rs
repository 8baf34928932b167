//! Terminal output helpers.

use owo_colors::{OwoColorize, Stream};

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const WARNING: &str = "⚠";
}

/// Print a warning line to stderr.
pub fn warn(message: &str) {
  eprintln!(
    "{} {message}",
    format!("{} warning:", symbols::WARNING).if_supports_color(Stream::Stderr, |text| text.yellow())
  );
}
