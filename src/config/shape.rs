//! `[shape]` section configuration.
//!
//! Per-shape processing settings: id generation, maximum dimensions,
//! padding/box sizing, the cleaner chain and alignment/metadata sources.
//!
//! # Example
//!
//! ```toml
//! [shape]
//! transform = ["usvg"]    # cleaner chain (empty = keep documents as-is)
//! align = "align.json"    # alignment source, relative to the config file
//! meta = "meta.json"      # title/description source
//!
//! [shape.id]
//! separator = "--"        # replaces directory separators
//! pseudo = "~"            # separates the pseudo-state (`icon~hover`)
//! whitespace = "_"        # replaces whitespace runs
//! generator = "%s"        # id template, `%s` is the derived name
//!
//! [shape.dimension]
//! max_width = 2000
//! max_height = 2000
//! precision = 2
//!
//! [shape.spacing]
//! padding = [0, 10]       # number | [all] | [v, h] | [t, h, b] | [t, r, b, l] | { top = .. }
//! box = "padding"         # content | padding | icon
//! ```

use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::ConfigError;
use super::source::{AlignmentRules, MetaTable};

/// Upper bound for `shape.dimension.precision`.
const MAX_PRECISION: usize = 12;

// ============================================================================
// [shape]
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeConfig {
    pub id: IdConfig,
    pub dimension: DimensionConfig,
    pub spacing: SpacingConfig,

    /// Names of the cleaners applied to every shape, in order.
    pub transform: Vec<String>,

    /// Alignment source file (JSON).
    pub align: Option<PathBuf>,

    /// Metadata source file (JSON).
    pub meta: Option<PathBuf>,

    /// Alignment rules loaded from `align`.
    #[serde(skip)]
    pub alignment: AlignmentRules,

    /// Title/description table loaded from `meta`.
    #[serde(skip)]
    pub metadata: MetaTable,
}

impl Default for ShapeConfig {
    fn default() -> Self {
        Self {
            id: IdConfig::default(),
            dimension: DimensionConfig::default(),
            spacing: SpacingConfig::default(),
            transform: Vec::new(),
            align: None,
            meta: None,
            alignment: AlignmentRules::default(),
            metadata: MetaTable::default(),
        }
    }
}

impl ShapeConfig {
    /// Reject settings that would leave a shape without a positive size.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let dimension = &self.dimension;
        for (name, value) in [
            ("max_width", dimension.max_width),
            ("max_height", dimension.max_height),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Validation(format!(
                    "shape.dimension.{name} must be a positive number, got {value}"
                )));
            }
        }

        if dimension.precision > MAX_PRECISION {
            return Err(ConfigError::Validation(format!(
                "shape.dimension.precision must not exceed {MAX_PRECISION}"
            )));
        }

        let padding = &self.spacing.padding;
        if self.spacing.box_sizing.includes_padding()
            && (padding.horizontal() >= dimension.max_width
                || padding.vertical() >= dimension.max_height)
        {
            return Err(ConfigError::Validation(
                "shape.spacing.padding leaves no room inside the maximum dimensions".into(),
            ));
        }

        Ok(())
    }
}

// ============================================================================
// [shape.id]
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdConfig {
    pub separator: String,
    pub pseudo: String,
    pub whitespace: String,
    pub generator: String,
}

impl Default for IdConfig {
    fn default() -> Self {
        Self {
            separator: "--".to_string(),
            pseudo: "~".to_string(),
            whitespace: "_".to_string(),
            generator: "%s".to_string(),
        }
    }
}

impl IdConfig {
    /// Derive a shape id from its (relative) source path.
    ///
    /// `icons/arrow left.svg` -> `icons--arrow_left`
    pub fn generate(&self, name: &str) -> String {
        static WHITESPACE: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

        let joined = name
            .split(['/', '\\'])
            .filter(|part| !part.is_empty() && *part != ".")
            .collect::<Vec<_>>()
            .join(&self.separator);

        let stem = strip_svg_extension(&joined);
        let id = WHITESPACE.replace_all(stem, self.whitespace.as_str());
        apply_template(&self.generator, &id)
    }

    /// Split an id into its base and optional pseudo-state.
    ///
    /// `icon~hover` -> (`icon`, Some(`hover`))
    pub fn split_state<'a>(&self, id: &'a str) -> (&'a str, Option<&'a str>) {
        if self.pseudo.is_empty() {
            return (id, None);
        }
        match id.split_once(self.pseudo.as_str()) {
            Some((base, state)) if !state.is_empty() => (base, Some(state)),
            Some((base, _)) => (base, None),
            None => (id, None),
        }
    }
}

fn strip_svg_extension(name: &str) -> &str {
    let len = name.len();
    if len > 4 && name.is_char_boundary(len - 4) && name[len - 4..].eq_ignore_ascii_case(".svg") {
        &name[..len - 4]
    } else {
        name
    }
}

/// Substitute `%s` in a template; templates without `%s` act as a prefix.
pub fn apply_template(template: &str, value: &str) -> String {
    if template.contains("%s") {
        template.replace("%s", value)
    } else {
        format!("{template}{value}")
    }
}

// ============================================================================
// [shape.dimension]
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DimensionConfig {
    pub max_width: f64,
    pub max_height: f64,
    /// Decimal places used when writing coordinates and sizes.
    pub precision: usize,
}

impl Default for DimensionConfig {
    fn default() -> Self {
        Self {
            max_width: 2000.0,
            max_height: 2000.0,
            precision: 2,
        }
    }
}

// ============================================================================
// [shape.spacing]
// ============================================================================

/// How padding relates to the maximum dimensions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoxSizing {
    /// Padding is added outside the maximum box.
    #[default]
    Content,
    /// Padding is part of the maximum box.
    Padding,
    /// Like `padding`, and the shape is centered in an exact max-size box.
    Icon,
}

impl BoxSizing {
    /// Whether padding counts against the maximum dimensions.
    pub fn includes_padding(self) -> bool {
        !matches!(self, Self::Content)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpacingConfig {
    pub padding: Padding,
    #[serde(rename = "box")]
    pub box_sizing: BoxSizing,
}

/// Padding per side, in output pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "PaddingSpec")]
pub struct Padding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Padding {
    pub const fn uniform(value: f64) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    pub const fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// left + right
    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    /// top + bottom
    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }

    pub fn is_zero(&self) -> bool {
        self.top == 0.0 && self.right == 0.0 && self.bottom == 0.0 && self.left == 0.0
    }
}

/// Accepted padding notations (CSS shorthand order for lists).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum PaddingSpec {
    Uniform(f64),
    List(Vec<f64>),
    Sides {
        #[serde(default)]
        top: f64,
        #[serde(default)]
        right: f64,
        #[serde(default)]
        bottom: f64,
        #[serde(default)]
        left: f64,
    },
}

impl From<PaddingSpec> for Padding {
    fn from(spec: PaddingSpec) -> Self {
        let sanitize = |v: f64| if v.is_finite() { v.max(0.0) } else { 0.0 };
        let padding = match spec {
            PaddingSpec::Uniform(v) => Self::uniform(v),
            PaddingSpec::List(values) => match values.as_slice() {
                [] => Self::default(),
                [all] => Self::uniform(*all),
                [v, h] => Self::new(*v, *h, *v, *h),
                [t, h, b] => Self::new(*t, *h, *b, *h),
                [t, r, b, l, ..] => Self::new(*t, *r, *b, *l),
            },
            PaddingSpec::Sides {
                top,
                right,
                bottom,
                left,
            } => Self::new(top, right, bottom, left),
        };
        Self::new(
            sanitize(padding.top),
            sanitize(padding.right),
            sanitize(padding.bottom),
            sanitize(padding.left),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_spacing(toml: &str) -> SpacingConfig {
        toml::from_str(toml).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = ShapeConfig::default();
        assert_eq!(config.id.separator, "--");
        assert_eq!(config.id.pseudo, "~");
        assert_eq!(config.dimension.max_width, 2000.0);
        assert_eq!(config.spacing.box_sizing, BoxSizing::Content);
        assert!(config.spacing.padding.is_zero());
        assert!(config.transform.is_empty());
    }

    #[test]
    fn test_validate() {
        assert!(ShapeConfig::default().validate().is_ok());

        let mut config = ShapeConfig::default();
        config.dimension.max_width = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        let mut config = ShapeConfig::default();
        config.dimension.max_width = 10.0;
        config.spacing.padding = Padding::uniform(5.0);
        assert!(config.validate().is_ok());
        config.spacing.box_sizing = BoxSizing::Icon;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_padding_notations() {
        let cases = [
            ("padding = 5", Padding::uniform(5.0)),
            ("padding = [5]", Padding::uniform(5.0)),
            ("padding = [1, 2]", Padding::new(1.0, 2.0, 1.0, 2.0)),
            ("padding = [1, 2, 3]", Padding::new(1.0, 2.0, 3.0, 2.0)),
            ("padding = [1, 2, 3, 4]", Padding::new(1.0, 2.0, 3.0, 4.0)),
            ("padding = { left = 10 }", Padding::new(0.0, 0.0, 0.0, 10.0)),
            ("padding = -3", Padding::uniform(0.0)),
        ];
        for (input, expected) in cases {
            assert_eq!(parse_spacing(input).padding, expected, "failed for {input}");
        }
    }

    #[test]
    fn test_box_parsing() {
        assert_eq!(parse_spacing("box = \"icon\"").box_sizing, BoxSizing::Icon);
        assert!(BoxSizing::Padding.includes_padding());
        assert!(!BoxSizing::Content.includes_padding());
    }

    #[test]
    fn test_generate_id() {
        let id = IdConfig::default();
        assert_eq!(id.generate("icon.svg"), "icon");
        assert_eq!(id.generate("icons/arrow left.svg"), "icons--arrow_left");
        assert_eq!(id.generate("./a/B.SVG"), "a--B");
        assert_eq!(id.generate("no-extension"), "no-extension");

        let prefixed = IdConfig {
            generator: "icon-%s".into(),
            ..IdConfig::default()
        };
        assert_eq!(prefixed.generate("home.svg"), "icon-home");
    }

    #[test]
    fn test_split_state() {
        let id = IdConfig::default();
        assert_eq!(id.split_state("icon~hover"), ("icon", Some("hover")));
        assert_eq!(id.split_state("icon"), ("icon", None));
        assert_eq!(id.split_state("icon~"), ("icon", None));
    }

    #[test]
    fn test_apply_template() {
        assert_eq!(apply_template("left-%s", "icon"), "left-icon");
        assert_eq!(apply_template("%s", "icon"), "icon");
        assert_eq!(apply_template("x-", "icon"), "x-icon");
    }
}
