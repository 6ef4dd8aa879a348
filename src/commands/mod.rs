//! Command-line operations over an installed tree.

pub mod config;
mod gem_arg;
mod list;
mod paths;
mod require;
mod which;

pub use config::Config;
pub use gem_arg::GemArg;
pub use list::list;
pub use paths::{LOAD_PATH_ENV, ROOT_ENV, default_install_root};
pub use require::{RequireOptions, require};
pub use which::which;
