//! Command-line interface.
//!
//! - `args` - clap definitions
//! - `build` - collect inputs, compile, write artifacts

mod args;
pub mod build;

pub use args::Cli;
