//! Id and class namespacing.
//!
//! Shapes written into one sprite share a single id space. Every shape gets a
//! run namespace token (fixed-width lowercase letters derived from its index)
//! and all of its ids become `prefix + token + id`; class names become
//! `token + class`. Fixed width keeps tokens prefix-free, so rewritten ids
//! cannot collide across shapes. Ids the composite document already uses
//! (shape roots, view fragments) are passed as `reserved`; a rewritten id that
//! would hit one of them gets a numeric suffix (`ag` -> `ag-1`), which keeps
//! the token prefix and therefore the cross-shape guarantee.
//!
//! Rewritten references:
//!
//! | Where                                   | Form                 |
//! |-----------------------------------------|----------------------|
//! | `id`                                    | value                |
//! | `href`, `xlink:href`                    | `#id` (not `data:`)  |
//! | `style`, `fill`, `stroke`, `filter`, …  | `url(#id)`           |
//! | `aria-labelledby`, `aria-describedby`   | token list           |
//! | `class`                                 | token list           |
//! | `<style>` text and CDATA                | selectors, `url()`   |

use rustc_hash::{FxHashMap, FxHashSet};

use super::stylesheet;
use crate::config::SvgConfig;
use crate::svg::{Element, Node};

/// Presentation attributes that may carry `url(#id)` references.
const URL_ATTRIBUTES: &[&str] = &[
    "style",
    "fill",
    "stroke",
    "filter",
    "clip-path",
    "mask",
    "marker-start",
    "marker-end",
    "marker-mid",
];

const HREF_ATTRIBUTES: &[&str] = &["href", "xlink:href"];

const IDREF_LIST_ATTRIBUTES: &[&str] = &["aria-labelledby", "aria-describedby"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceOptions {
    pub ids: bool,
    pub id_prefix: String,
    pub classnames: bool,
    /// Ids taken outside the shape's own content.
    pub reserved: FxHashSet<String>,
}

impl Default for NamespaceOptions {
    fn default() -> Self {
        Self {
            ids: true,
            id_prefix: String::new(),
            classnames: true,
            reserved: FxHashSet::default(),
        }
    }
}

impl From<&SvgConfig> for NamespaceOptions {
    fn from(config: &SvgConfig) -> Self {
        Self {
            ids: config.namespace_ids,
            id_prefix: config.namespace_id_prefix.clone(),
            classnames: config.namespace_classnames,
            reserved: FxHashSet::default(),
        }
    }
}

/// Namespace token of the shape at `index` out of `count` shapes.
///
/// `namespace_token(0, 3)` -> `a`, `namespace_token(27, 30)` -> `bb`
pub fn namespace_token(index: usize, count: usize) -> String {
    let mut width = 1;
    let mut capacity: usize = 26;
    while capacity < count {
        width += 1;
        capacity = capacity.saturating_mul(26);
    }

    let mut letters = vec![b'a'; width];
    let mut n = index;
    for slot in letters.iter_mut().rev() {
        *slot = b'a' + (n % 26) as u8;
        n /= 26;
    }
    letters.into_iter().map(char::from).collect()
}

/// Rewrite ids, classes and their references below `root`.
pub fn rewrite(root: &mut Element, token: &str, options: &NamespaceOptions) {
    let mut ids: FxHashMap<String, String> = FxHashMap::default();
    let mut classes: FxHashMap<String, String> = FxHashMap::default();
    let mut taken: FxHashSet<String> = FxHashSet::default();

    root.walk(&mut |elem| {
        if options.ids
            && let Some(id) = elem.attr("id")
            && !ids.contains_key(id)
        {
            let candidate = format!("{}{token}{id}", options.id_prefix);
            let namespaced = free_id(candidate, &options.reserved, &taken);
            taken.insert(namespaced.clone());
            ids.insert(id.to_string(), namespaced);
        }
        if options.classnames
            && let Some(class) = elem.attr("class")
        {
            for name in class.split_whitespace() {
                classes.insert(name.to_string(), format!("{token}{name}"));
            }
        }
    });

    if ids.is_empty() && classes.is_empty() {
        return;
    }

    root.walk_mut(&mut |elem| rewrite_element(elem, &ids, &classes));
}

/// `candidate`, or the first `candidate-N` that is neither reserved nor taken.
fn free_id(candidate: String, reserved: &FxHashSet<String>, taken: &FxHashSet<String>) -> String {
    let is_free = |id: &str| !reserved.contains(id) && !taken.contains(id);
    if is_free(candidate.as_str()) {
        return candidate;
    }
    let mut n = 1;
    loop {
        let id = format!("{candidate}-{n}");
        if is_free(id.as_str()) {
            return id;
        }
        n += 1;
    }
}

fn rewrite_element(
    elem: &mut Element,
    ids: &FxHashMap<String, String>,
    classes: &FxHashMap<String, String>,
) {
    for (key, value) in &mut elem.attrs {
        let key = key.as_str();
        let rewritten = if key == "id" {
            ids.get(value.as_str()).cloned()
        } else if HREF_ATTRIBUTES.contains(&key) {
            value
                .strip_prefix('#')
                .and_then(|fragment| ids.get(fragment))
                .map(|id| format!("#{id}"))
        } else if URL_ATTRIBUTES.contains(&key) {
            match stylesheet::replace_url_refs(value, ids) {
                std::borrow::Cow::Owned(owned) => Some(owned),
                std::borrow::Cow::Borrowed(_) => None,
            }
        } else if IDREF_LIST_ATTRIBUTES.contains(&key) {
            Some(map_tokens(value, ids))
        } else if key == "class" {
            Some(map_tokens(value, classes))
        } else {
            None
        };

        if let Some(rewritten) = rewritten {
            *value = rewritten;
        }
    }

    if elem.is("style") {
        for child in &mut elem.children {
            if let Node::Text(css) | Node::CData(css) = child {
                *css = stylesheet::rewrite(css, ids, classes);
            }
        }
    }
}

fn map_tokens(value: &str, table: &FxHashMap<String, String>) -> String {
    value
        .split_whitespace()
        .map(|token| table.get(token).map(String::as_str).unwrap_or(token))
        .collect::<Vec<_>>()
        .join(" ")
}
