//! Template-ready data model of one compiled mode.
//!
//! Serialized with `serde`, so external template engines can consume it as
//! JSON. Paths are relative to the output directory; renderers turn them into
//! URLs relative to the file they write.

use serde::Serialize;

use crate::config::{ModeConfig, ModeKind, apply_template};
use crate::layout::Arrangement;
use crate::shape::Shape;
use crate::svg::format_number;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateData {
    /// Mode table name.
    pub mode: String,
    pub kind: ModeKind,
    /// Sprite path (cache-busted when enabled).
    pub sprite: String,
    pub width: f64,
    pub height: f64,
    pub stylesheet: Option<String>,
    pub example: Option<String>,
    pub shapes: Vec<ShapeData>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShapeData {
    pub name: String,
    pub id: String,
    pub base: String,
    pub state: Option<String>,
    pub master: Option<String>,
    /// Fragment identifier addressing the shape inside the sprite.
    pub fragment: String,
    pub width: f64,
    pub height: f64,
    pub position: Position,
    pub selector: Selectors,
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Position {
    /// Negated offset in pixels (`background-position` in px).
    pub absolute: Point,
    /// Offset in percent of the free space (`background-position` in %).
    pub relative: Point,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Selectors {
    pub shape: Vec<String>,
    pub dimensions: Vec<String>,
}

/// Id of the `<view>` addressing a shape in `view` sprites.
pub fn view_fragment(id: &str) -> String {
    format!("{id}-view")
}

impl Position {
    /// Position of a `width × height` shape at `(x, y)` on a `canvas_w × canvas_h` canvas.
    pub fn of(x: f64, y: f64, width: f64, height: f64, canvas_w: f64, canvas_h: f64) -> Self {
        let relative = |offset: f64, free: f64| {
            if free > 0.0 {
                offset / free * 100.0
            } else {
                0.0
            }
        };
        Self {
            absolute: Point {
                x: if x == 0.0 { 0.0 } else { -x },
                y: if y == 0.0 { 0.0 } else { -y },
            },
            relative: Point {
                x: relative(x, canvas_w - width),
                y: relative(y, canvas_h - height),
            },
        }
    }
}

impl Selectors {
    /// Selectors of a shape.
    ///
    /// Stateful shapes (`icon~hover`) get the pseudo-class selector and a
    /// plain one (`.svg-icon:hover`, `.svg-icon-hover`).
    pub fn of(shape: &Shape, mode: &ModeConfig) -> Self {
        let base = apply_template(&mode.prefix, shape.base());
        let (shape_selectors, slug) = match shape.state() {
            Some(state) => {
                let slug = format!("{}-{state}", shape.base());
                (
                    vec![
                        format!("{base}:{state}"),
                        apply_template(&mode.prefix, &slug),
                    ],
                    slug,
                )
            }
            None => (vec![base], shape.base().to_string()),
        };

        let dimensions = if mode.dimensions.is_empty() {
            Vec::new()
        } else {
            vec![format!(
                "{}{}",
                apply_template(&mode.prefix, &slug),
                mode.dimensions
            )]
        };

        Self {
            shape: shape_selectors,
            dimensions,
        }
    }
}

impl ShapeData {
    pub fn build(
        shape: &Shape,
        kind: ModeKind,
        mode: &ModeConfig,
        offset: (f64, f64),
        canvas: (f64, f64),
    ) -> Self {
        let fragment = match kind {
            ModeKind::View => view_fragment(shape.id()),
            _ => shape.id().to_string(),
        };
        let precision = shape.precision();
        let round = |value: f64| {
            format_number(value, precision)
                .parse::<f64>()
                .unwrap_or(value)
        };
        let position = Position::of(
            offset.0,
            offset.1,
            shape.width(),
            shape.height(),
            canvas.0,
            canvas.1,
        );
        let meta = shape.meta();

        Self {
            name: shape.name().to_string(),
            id: shape.id().to_string(),
            base: shape.base().to_string(),
            state: shape.state().map(str::to_string),
            master: shape.master().map(str::to_string),
            fragment,
            width: round(shape.width()),
            height: round(shape.height()),
            position: Position {
                absolute: Point {
                    x: round(position.absolute.x),
                    y: round(position.absolute.y),
                },
                relative: Point {
                    x: round(position.relative.x),
                    y: round(position.relative.y),
                },
            },
            selector: Selectors::of(shape, mode),
            title: meta.title.clone(),
            description: meta.description.clone(),
        }
    }
}

impl TemplateData {
    /// Data model for the shapes placed by `arrangement`.
    pub fn build(
        name: &str,
        kind: ModeKind,
        mode: &ModeConfig,
        shapes: &[Shape],
        arrangement: &Arrangement,
    ) -> Self {
        let canvas = (arrangement.width, arrangement.height);
        let shapes = arrangement
            .placements
            .iter()
            .map(|placement| {
                ShapeData::build(
                    &shapes[placement.index],
                    kind,
                    mode,
                    (placement.x, placement.y),
                    canvas,
                )
            })
            .collect();

        Self {
            mode: name.to_string(),
            kind,
            sprite: mode.sprite_path(kind),
            width: arrangement.width,
            height: arrangement.height,
            stylesheet: mode.stylesheet_path(kind),
            example: mode.example_path(kind),
            shapes,
        }
    }
}
