//! Command-line interface definitions.

use clap::{ColorChoice, Parser};
use std::path::PathBuf;

/// Merge SVG files into sprites
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: sprite.toml)
    #[arg(short = 'C', long, default_value = "sprite.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Output directory (overrides `dest`)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Modes to build, comma separated (default: every configured mode, or css)
    #[arg(short, long = "mode", value_delimiter = ',')]
    pub modes: Vec<String>,

    /// Maximum number of shapes processed concurrently
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Print debug output
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// SVG files or directories to include
    #[arg(required = true, value_hint = clap::ValueHint::AnyPath)]
    pub inputs: Vec<PathBuf>,
}
