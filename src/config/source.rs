//! Alignment and metadata source files.
//!
//! Both sources are JSON objects keyed by glob patterns that are matched
//! against shape ids. Key order is significant for alignment (the first
//! template of a shape becomes its canonical instance), which is why
//! `serde_json` is built with `preserve_order`.
//!
//! ```json
//! // align.json
//! { "*": { "%s": 0 }, "arrow-*": { "left-%s": 0, "right-%s": 1 } }
//!
//! // meta.json
//! { "home": "Home", "user": { "title": "User", "description": "Profile" } }
//! ```
//!
//! Malformed data never aborts a run: offending entries are dropped with a
//! warning and the shape falls back to its default.

use serde_json::Value;

use crate::log;
use crate::shape::Alignment;

// ============================================================================
// Alignment
// ============================================================================

/// Ordered `pattern -> [alignment]` rules.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AlignmentRules {
    rules: Vec<(String, Vec<Alignment>)>,
}

impl AlignmentRules {
    /// Parse an alignment source. Invalid content yields empty rules.
    pub fn from_json(source: &str) -> Self {
        let value: Value = match serde_json::from_str(source) {
            Ok(value) => value,
            Err(e) => {
                log!("warning"; "ignoring alignment source: {}", e);
                return Self::default();
            }
        };

        let Value::Object(patterns) = value else {
            log!("warning"; "ignoring alignment source: expected an object of patterns");
            return Self::default();
        };

        let mut rules = Vec::with_capacity(patterns.len());
        for (pattern, templates) in patterns {
            let Value::Object(templates) = templates else {
                log!("warning"; "ignoring alignment pattern `{}`: expected an object", pattern);
                continue;
            };

            let mut alignments = Vec::with_capacity(templates.len());
            for (template, fraction) in templates {
                match fraction.as_f64() {
                    Some(f) if (0.0..=1.0).contains(&f) => {
                        alignments.push(Alignment::new(template, f));
                    }
                    Some(f) if f.is_finite() => {
                        log!("warning"; "alignment `{}` of `{}` clamped to [0, 1]", f, pattern);
                        alignments.push(Alignment::new(template, f.clamp(0.0, 1.0)));
                    }
                    _ => {
                        log!("warning"; "ignoring alignment `{}` of `{}`: not a number", template, pattern);
                    }
                }
            }
            rules.push((pattern, alignments));
        }

        Self { rules }
    }

    pub fn push(&mut self, pattern: impl Into<String>, alignments: Vec<Alignment>) {
        self.rules.push((pattern.into(), alignments));
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Alignment entries for a shape id.
    ///
    /// Entries of all matching patterns are merged in file order; a template
    /// listed again overrides the earlier fraction. Without any match the
    /// shape gets the single identity entry.
    pub fn resolve(&self, id: &str) -> Vec<Alignment> {
        let mut merged: Vec<Alignment> = Vec::new();
        for (pattern, alignments) in &self.rules {
            if !glob_match(pattern, id) {
                continue;
            }
            for alignment in alignments {
                match merged.iter_mut().find(|a| a.template == alignment.template) {
                    Some(existing) => existing.fraction = alignment.fraction,
                    None => merged.push(alignment.clone()),
                }
            }
        }

        if merged.is_empty() {
            vec![Alignment::identity()]
        } else {
            merged
        }
    }
}

// ============================================================================
// Metadata
// ============================================================================

/// Accessibility metadata for one shape.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Meta {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl Meta {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none()
    }
}

/// Ordered `pattern -> meta` table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetaTable {
    entries: Vec<(String, Meta)>,
}

impl MetaTable {
    /// Parse a metadata source. Invalid content yields an empty table.
    pub fn from_json(source: &str) -> Self {
        let value: Value = match serde_json::from_str(source) {
            Ok(value) => value,
            Err(e) => {
                log!("warning"; "ignoring metadata source: {}", e);
                return Self::default();
            }
        };

        let Value::Object(patterns) = value else {
            log!("warning"; "ignoring metadata source: expected an object of patterns");
            return Self::default();
        };

        let mut entries = Vec::with_capacity(patterns.len());
        for (pattern, meta) in patterns {
            let meta = match meta {
                Value::String(title) => Meta {
                    title: Some(title),
                    description: None,
                },
                Value::Object(fields) => Meta {
                    title: non_empty(fields.get("title")),
                    description: non_empty(fields.get("description")),
                },
                _ => {
                    log!("warning"; "ignoring metadata of `{}`: expected a string or object", pattern);
                    continue;
                }
            };
            entries.push((pattern, meta));
        }

        Self { entries }
    }

    pub fn insert(&mut self, pattern: impl Into<String>, meta: Meta) {
        self.entries.push((pattern.into(), meta));
    }

    /// Metadata for a shape id; later matching patterns override earlier fields.
    pub fn resolve(&self, id: &str) -> Meta {
        let mut meta = Meta::default();
        for (pattern, entry) in &self.entries {
            if !glob_match(pattern, id) {
                continue;
            }
            if entry.title.is_some() {
                meta.title.clone_from(&entry.title);
            }
            if entry.description.is_some() {
                meta.description.clone_from(&entry.description);
            }
        }
        meta
    }
}

fn non_empty(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

// ============================================================================
// Glob
// ============================================================================

/// Match `text` against a pattern supporting `*` (any run) and `?` (any char).
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    let (mut p, mut t) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        match pattern.get(p) {
            Some('*') => {
                backtrack = Some((p, t));
                p += 1;
            }
            Some(&c) if c == '?' || c == text[t] => {
                p += 1;
                t += 1;
            }
            _ => match backtrack {
                Some((star, matched)) => {
                    p = star + 1;
                    t = matched + 1;
                    backtrack = Some((star, matched + 1));
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|&c| c == '*')
}
