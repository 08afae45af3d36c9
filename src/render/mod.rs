//! Companion file rendering.
//!
//! A [`TemplateRenderer`] turns the data model of a compiled mode into
//! stylesheets and example documents. [`BuiltinRenderer`] covers the
//! default outputs without an external template engine:
//!
//! | Artifact     | Modes       | Output                                        |
//! |--------------|-------------|-----------------------------------------------|
//! | `stylesheet` | css, view   | `background` rule per shape + dimension rules |
//! | `example`    | all         | HTML page showing every shape                 |

mod template;

use std::sync::LazyLock;

use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use quick_xml::escape::escape;
use regex::Regex;

use crate::config::ModeKind;
use crate::error::{Result, SpriteError};
use crate::mode::{ArtifactKind, ShapeData, TemplateData};
use crate::svg::format_number;
use template::{EXAMPLE_HTML, ExampleVars};

/// Renders companion files from a mode's data model.
pub trait TemplateRenderer: Send + Sync {
    fn render(&self, kind: ArtifactKind, data: &TemplateData) -> Result<String>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinRenderer;

impl TemplateRenderer for BuiltinRenderer {
    fn render(&self, kind: ArtifactKind, data: &TemplateData) -> Result<String> {
        match kind {
            ArtifactKind::Stylesheet if data.kind.is_positional() => Ok(stylesheet(data)),
            ArtifactKind::Example => Ok(example(data)),
            other => Err(SpriteError::Render {
                target: data.mode.clone(),
                reason: format!("no built-in {other} template for `{}` sprites", data.kind),
            }),
        }
    }
}

/// Minify CSS source code.
pub fn minify_css(source: &str) -> Option<String> {
    let stylesheet = StyleSheet::parse(source, ParserOptions::default()).ok()?;
    let result = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .ok()?;
    Some(result.code)
}

/// URL of `target` as seen from the file `from` (both relative to the output directory).
///
/// `relative_url("css/sprite.css", "svg/sprite.svg")` -> `../svg/sprite.svg`
pub fn relative_url(from: &str, target: &str) -> String {
    let from_dirs: Vec<&str> = from
        .split('/')
        .filter(|part| !part.is_empty() && *part != ".")
        .collect();
    let from_dirs = &from_dirs[..from_dirs.len().saturating_sub(1)];
    let target_parts: Vec<&str> = target
        .split('/')
        .filter(|part| !part.is_empty() && *part != ".")
        .collect();

    let common = from_dirs
        .iter()
        .zip(&target_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = vec![".."; from_dirs.len() - common];
    parts.extend(&target_parts[common..]);
    parts.join("/")
}

// ============================================================================
// Stylesheet
// ============================================================================

fn stylesheet(data: &TemplateData) -> String {
    let from = data.stylesheet.as_deref().unwrap_or_default();
    let url = relative_url(from, &data.sprite);
    let mut css = String::new();

    for shape in &data.shapes {
        let position = &shape.position.relative;
        css.push_str(&format!(
            "{} {{\n\tbackground: url(\"{url}\") {} {} no-repeat;\n}}\n\n",
            shape.selector.shape.join(",\n"),
            length(position.x, "%"),
            length(position.y, "%"),
        ));
        if !shape.selector.dimensions.is_empty() {
            css.push_str(&format!(
                "{} {{\n\twidth: {};\n\theight: {};\n}}\n\n",
                shape.selector.dimensions.join(",\n"),
                length(shape.width, "px"),
                length(shape.height, "px"),
            ));
        }
    }
    css
}

fn length(value: f64, unit: &str) -> String {
    match format_number(value, 6).as_str() {
        "0" => "0".to_string(),
        number => format!("{number}{unit}"),
    }
}

// ============================================================================
// Example document
// ============================================================================

fn example(data: &TemplateData) -> String {
    let from = data.example.as_deref().unwrap_or_default();
    let sprite = relative_url(from, &data.sprite);
    let stylesheet = data
        .stylesheet
        .as_deref()
        .map(|path| {
            format!(
                r#"<link rel="stylesheet" href="{}">"#,
                escape(relative_url(from, path).as_str())
            )
        })
        .unwrap_or_default();

    let shapes = data
        .shapes
        .iter()
        .map(|shape| example_item(data.kind, shape, &sprite))
        .collect::<Vec<_>>()
        .join("\n");

    EXAMPLE_HTML.render(&ExampleVars {
        title: escape(format!("{} sprite ({})", data.mode, data.kind).as_str()).into_owned(),
        stylesheet,
        shapes,
    })
}

fn example_item(kind: ModeKind, shape: &ShapeData, sprite: &str) -> String {
    let width = format_number(shape.width, 6);
    let height = format_number(shape.height, 6);
    let href = escape(format!("{sprite}#{}", shape.fragment).as_str()).into_owned();
    let label = escape(shape.title.as_deref().unwrap_or(shape.id.as_str())).into_owned();

    let preview = match kind {
        ModeKind::Css => {
            let classes: Vec<&str> = shape
                .selector
                .shape
                .iter()
                .chain(&shape.selector.dimensions)
                .filter_map(|selector| class_name(selector))
                .collect();
            format!(r#"<i class="{}"></i>"#, escape(classes.join(" ").as_str()))
        }
        ModeKind::View | ModeKind::Stack => format!(
            r#"<img src="{href}" width="{width}" height="{height}" alt="{label}">"#
        ),
        ModeKind::Defs | ModeKind::Symbol => format!(
            r#"<svg width="{width}" height="{height}" role="img" aria-label="{label}"><use href="{href}"/></svg>"#
        ),
    };

    format!(
        "<li>{preview}<code>{}</code></li>",
        escape(shape.id.as_str())
    )
}

/// Class name of a plain class selector (`.svg-icon` -> `svg-icon`).
fn class_name(selector: &str) -> Option<&str> {
    static CLASS: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^\.(-?[_a-zA-Z][_a-zA-Z0-9-]*)$").expect("valid regex"));
    CLASS
        .captures(selector)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
