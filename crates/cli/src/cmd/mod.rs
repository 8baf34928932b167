mod build;
mod clean;
mod config;
mod redirect;

pub use build::{BuildArgs, cmd_build};
pub use clean::cmd_clean;
pub use config::cmd_config;
pub use redirect::cmd_redirect;
