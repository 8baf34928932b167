//! Build configuration resolution.
//!
//! The configuration is resolved exactly once per invocation, from the
//! process environment plus the parsed CLI arguments, and handed by
//! reference to every downstream collaborator. Nothing else in the build
//! reads environment variables.

mod resolve;
mod types;

pub use types::*;
