//! Sprite configuration management (`sprite.toml`).
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── error      # ConfigError
//! ├── mode       # [mode.<name>]
//! ├── shape      # [shape] and sub-sections
//! ├── source     # alignment / metadata side files
//! ├── svg        # [svg]
//! └── mod.rs     # SpriteConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section              | Purpose                                        |
//! |----------------------|------------------------------------------------|
//! | (top level)          | `dest`, `limit`                                |
//! | `[shape.id]`         | Id generation from file names                  |
//! | `[shape.dimension]`  | Maximum size and output precision              |
//! | `[shape.spacing]`    | Padding and box sizing                         |
//! | `[shape]`            | Cleaner chain, alignment and metadata sources  |
//! | `[svg]`              | Namespacing and sprite root attributes         |
//! | `[mode.<name>]`      | One sprite per table                           |

mod error;
pub mod mode;
pub mod shape;
pub mod source;
pub mod svg;

pub use error::ConfigError;
pub use mode::{Declaration, ModeConfig, ModeKind, OutputFile};
pub use shape::{
    BoxSizing, DimensionConfig, IdConfig, Padding, ShapeConfig, SpacingConfig, apply_template,
};
pub use source::{AlignmentRules, Meta, MetaTable, glob_match};
pub use svg::SvgConfig;

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::log;

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing `sprite.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpriteConfig {
    /// Directory the artifacts are written to (relative to the config file).
    pub dest: PathBuf,

    /// Maximum number of shapes processed concurrently.
    pub limit: usize,

    pub shape: ShapeConfig,

    pub svg: SvgConfig,

    /// Output modes, keyed by name.
    pub mode: BTreeMap<String, ModeConfig>,

    /// Directory containing the config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,
}

impl Default for SpriteConfig {
    fn default() -> Self {
        Self {
            dest: PathBuf::from("out"),
            limit: 4,
            shape: ShapeConfig::default(),
            svg: SvgConfig::default(),
            mode: BTreeMap::new(),
            root: PathBuf::new(),
        }
    }
}

impl SpriteConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    ///
    /// Relative paths (`dest`, `shape.align`, `shape.meta`) are resolved
    /// against the directory of the config file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (mut config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        config.root = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        config.validate()?;
        config.load_sources()?;
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring: {}", display_path, fields.join(", "));
    }

    /// Check the limits that later stages rely on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shape.validate()
    }

    /// Read the alignment and metadata side files.
    ///
    /// A missing file is an error; malformed content only degrades to
    /// defaults (see [`AlignmentRules::from_json`]).
    pub fn load_sources(&mut self) -> Result<(), ConfigError> {
        if let Some(align) = &self.shape.align {
            let content = self.read_source(align)?;
            self.shape.alignment = AlignmentRules::from_json(&content);
        }
        if let Some(meta) = &self.shape.meta {
            let content = self.read_source(meta)?;
            self.shape.metadata = MetaTable::from_json(&content);
        }
        Ok(())
    }

    fn read_source(&self, path: &Path) -> Result<String, ConfigError> {
        let path = self.resolve(path);
        fs::read_to_string(&path).map_err(|err| ConfigError::Io(path, err))
    }

    /// Resolve a path relative to the config file directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Output directory, resolved against the config file directory.
    pub fn dest_dir(&self) -> PathBuf {
        self.resolve(&self.dest)
    }

    /// Worker limit with `0` treated as `1`.
    pub fn effective_limit(&self) -> usize {
        self.limit.max(1)
    }
}

#[cfg(test)]
pub fn test_parse_config(extra: &str) -> SpriteConfig {
    let (parsed, ignored) = SpriteConfig::parse_with_ignored(extra).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}
