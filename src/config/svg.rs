//! `[svg]` section configuration.
//!
//! Settings for the composite document and for namespacing shape contents.
//!
//! # Example
//!
//! ```toml
//! [svg]
//! namespace_ids = true          # prefix ids so shapes cannot collide
//! namespace_id_prefix = ""      # extra prefix in front of the run namespace
//! namespace_classnames = true   # also prefix class names (and CSS selectors)
//! dimension_attributes = true   # width/height on the sprite root
//! root_attributes = { "aria-hidden" = "true" }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SvgConfig {
    /// Rewrite element ids (and every reference to them).
    pub namespace_ids: bool,

    /// Prefix placed before the per-shape namespace of rewritten ids.
    pub namespace_id_prefix: String,

    /// Rewrite class names and class selectors.
    pub namespace_classnames: bool,

    /// Write `width`/`height` on the sprite root element.
    pub dimension_attributes: bool,

    /// Additional attributes for the sprite root element.
    pub root_attributes: BTreeMap<String, String>,
}

impl Default for SvgConfig {
    fn default() -> Self {
        Self {
            namespace_ids: true,
            namespace_id_prefix: String::new(),
            namespace_classnames: true,
            dimension_attributes: true,
            root_attributes: BTreeMap::new(),
        }
    }
}

impl SvgConfig {
    /// Whether any namespacing pass is needed at all.
    pub fn namespaces(&self) -> bool {
        self.namespace_ids || self.namespace_classnames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SvgConfig::default();
        assert!(config.namespace_ids);
        assert!(config.namespace_classnames);
        assert!(config.dimension_attributes);
        assert!(config.root_attributes.is_empty());
    }

    #[test]
    fn test_root_attributes() {
        let config: SvgConfig = toml::from_str(
            r#"
namespace_classnames = false
root_attributes = { "aria-hidden" = "true", class = "sprite" }
"#,
        )
        .unwrap();
        assert!(!config.namespace_classnames);
        assert!(config.namespaces());
        assert_eq!(config.root_attributes["class"], "sprite");
        assert_eq!(config.root_attributes.len(), 2);
    }
}
