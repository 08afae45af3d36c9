//! `[mode.<name>]` section configuration.
//!
//! Every table under `[mode]` produces one sprite. The table name selects the
//! output kind unless `kind` is given explicitly, so several sprites of the
//! same kind can be built in one run.
//!
//! # Example
//!
//! ```toml
//! [mode.css]
//! layout = "packed"              # vertical | horizontal | diagonal | packed
//! prefix = ".svg-%s"             # CSS selector template
//! dimensions = "-dims"           # suffix of the dimension selectors ("" = none)
//! sprite = "svg/sprite.css.svg"  # sprite path, relative to `dest`
//! bust = true                    # hash the sprite contents into its file name
//! xml_declaration = true         # bool or a custom declaration
//! doctype_declaration = true     # bool or a custom DOCTYPE
//! stylesheet = "sprite.css"      # bool or path (css/view only)
//! example = true                 # bool or path of the example HTML
//! minify = false                 # minify the generated stylesheet
//!
//! [mode.icons]
//! kind = "symbol"
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::layout::Layout;

pub const DEFAULT_XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="utf-8"?>"#;
pub const DEFAULT_DOCTYPE: &str = r#"<!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 1.1//EN" "http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd">"#;

// ============================================================================
// Mode kind
// ============================================================================

/// Output kind of a sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeKind {
    /// Positioned shapes for CSS `background-position`.
    Css,
    /// Like `css`, plus `<view>` elements for fragment identifiers.
    View,
    /// Shapes inside `<defs>` for `<use>` references.
    Defs,
    /// One `<symbol>` per shape.
    Symbol,
    /// All shapes stacked, shown one at a time through `:target`.
    Stack,
}

impl ModeKind {
    pub const ALL: [Self; 5] = [Self::Css, Self::View, Self::Defs, Self::Symbol, Self::Stack];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Css => "css",
            Self::View => "view",
            Self::Defs => "defs",
            Self::Symbol => "symbol",
            Self::Stack => "stack",
        }
    }

    /// Whether the kind addresses shapes by position (and ships a stylesheet).
    pub fn is_positional(self) -> bool {
        matches!(self, Self::Css | Self::View)
    }
}

impl FromStr for ModeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown mode kind `{s}`"))
    }
}

impl fmt::Display for ModeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Bool-or-value options
// ============================================================================

/// XML declaration / DOCTYPE option: enabled, disabled or custom text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Declaration {
    Bool(bool),
    Custom(String),
}

impl Default for Declaration {
    fn default() -> Self {
        Self::Bool(true)
    }
}

impl Declaration {
    /// The declaration text to write, if any.
    pub fn resolve(&self, default: &str) -> Option<String> {
        match self {
            Self::Bool(true) => Some(default.to_string()),
            Self::Bool(false) => None,
            Self::Custom(text) if text.trim().is_empty() => None,
            Self::Custom(text) => Some(text.trim().to_string()),
        }
    }
}

/// Companion file option: enabled with a default path, disabled, or a path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutputFile {
    Bool(bool),
    Path(String),
}

impl OutputFile {
    pub fn resolve(&self, default: impl FnOnce() -> String) -> Option<String> {
        match self {
            Self::Bool(true) => Some(default()),
            Self::Bool(false) => None,
            Self::Path(path) if path.is_empty() => None,
            Self::Path(path) => Some(path.clone()),
        }
    }
}

// ============================================================================
// [mode.<name>]
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeConfig {
    /// Output kind; defaults to the table name.
    pub kind: Option<String>,

    pub layout: Layout,

    /// CSS selector template (`%s` = shape id).
    pub prefix: String,

    /// Suffix for dimension selectors; empty disables them.
    pub dimensions: String,

    /// Sprite path; defaults to `svg/sprite.<kind>.svg`.
    pub sprite: Option<String>,

    /// Cache busting; defaults to on for `css` and `view`.
    pub bust: Option<bool>,

    pub xml_declaration: Declaration,
    pub doctype_declaration: Declaration,

    /// Stylesheet for `css`/`view`; defaults to `sprite.css`.
    pub stylesheet: OutputFile,

    /// Example HTML document; `true` writes `sprite.<kind>.html`.
    pub example: OutputFile,

    pub minify: bool,
}

impl Default for ModeConfig {
    fn default() -> Self {
        Self {
            kind: None,
            layout: Layout::default(),
            prefix: ".svg-%s".to_string(),
            dimensions: "-dims".to_string(),
            sprite: None,
            bust: None,
            xml_declaration: Declaration::default(),
            doctype_declaration: Declaration::default(),
            stylesheet: OutputFile::Bool(true),
            example: OutputFile::Bool(false),
            minify: false,
        }
    }
}

impl ModeConfig {
    /// A default configuration for the given kind.
    pub fn of(kind: ModeKind) -> Self {
        Self {
            kind: Some(kind.as_str().to_string()),
            ..Self::default()
        }
    }

    /// Resolve the output kind from `kind` or the table name.
    pub fn resolve_kind(&self, name: &str) -> Result<ModeKind, String> {
        self.kind.as_deref().unwrap_or(name).parse()
    }

    pub fn sprite_path(&self, kind: ModeKind) -> String {
        self.sprite
            .clone()
            .filter(|path| !path.is_empty())
            .unwrap_or_else(|| format!("svg/sprite.{kind}.svg"))
    }

    pub fn busts(&self, kind: ModeKind) -> bool {
        self.bust.unwrap_or(kind.is_positional())
    }

    pub fn stylesheet_path(&self, kind: ModeKind) -> Option<String> {
        if !kind.is_positional() {
            return None;
        }
        self.stylesheet.resolve(|| "sprite.css".to_string())
    }

    pub fn example_path(&self, kind: ModeKind) -> Option<String> {
        self.example.resolve(|| format!("sprite.{kind}.html"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> ModeConfig {
        toml::from_str(toml).unwrap()
    }

    #[test]
    fn test_kind_from_name() {
        let config = ModeConfig::default();
        assert_eq!(config.resolve_kind("css"), Ok(ModeKind::Css));
        assert_eq!(config.resolve_kind("Symbol"), Ok(ModeKind::Symbol));
        assert!(config.resolve_kind("icons").is_err());

        let explicit = parse(r#"kind = "stack""#);
        assert_eq!(explicit.resolve_kind("icons"), Ok(ModeKind::Stack));
    }

    #[test]
    fn test_per_kind_defaults() {
        let config = ModeConfig::default();
        assert_eq!(config.sprite_path(ModeKind::Css), "svg/sprite.css.svg");
        assert!(config.busts(ModeKind::Css));
        assert!(config.busts(ModeKind::View));
        assert!(!config.busts(ModeKind::Symbol));
        assert_eq!(config.stylesheet_path(ModeKind::Css).as_deref(), Some("sprite.css"));
        assert_eq!(config.stylesheet_path(ModeKind::Defs), None);
        assert_eq!(config.example_path(ModeKind::Css), None);
    }

    #[test]
    fn test_declarations() {
        let config = parse(
            r#"
xml_declaration = false
doctype_declaration = "<!DOCTYPE svg>"
"#,
        );
        assert_eq!(config.xml_declaration.resolve(DEFAULT_XML_DECLARATION), None);
        assert_eq!(
            config.doctype_declaration.resolve(DEFAULT_DOCTYPE).as_deref(),
            Some("<!DOCTYPE svg>")
        );
        assert_eq!(
            Declaration::default().resolve(DEFAULT_XML_DECLARATION).as_deref(),
            Some(DEFAULT_XML_DECLARATION)
        );
    }

    #[test]
    fn test_output_files() {
        let config = parse(
            r#"
stylesheet = "css/icons.css"
example = true
bust = false
layout = "vertical"
"#,
        );
        assert_eq!(config.stylesheet_path(ModeKind::View).as_deref(), Some("css/icons.css"));
        assert_eq!(config.example_path(ModeKind::View).as_deref(), Some("sprite.view.html"));
        assert!(!config.busts(ModeKind::Css));
        assert_eq!(config.layout, Layout::Vertical);
    }
}
