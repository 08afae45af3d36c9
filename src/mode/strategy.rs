//! Per-kind layout and embedding rules.

use crate::config::{ModeConfig, ModeKind};
use crate::error::{Result, SpriteError};
use crate::layout::{self, Arrangement, Placement};
use crate::shape::Shape;
use crate::svg::{Element, format_number};

use super::data::view_fragment;

/// How one kind of sprite selects, positions and embeds its shapes.
pub trait LayoutStrategy {
    /// Whether `shape` takes part in the sprite.
    fn includes(&self, shape: &Shape, mode: &ModeConfig) -> bool;

    /// Positions of the included shapes.
    fn layout(&self, shapes: &[Shape], mode: &ModeConfig) -> Result<Arrangement>;

    /// Append the element(s) representing `shape` to `parent`.
    ///
    /// Copies share their master's content and only contribute a `<view>`
    /// in `view` sprites.
    fn embed(&self, shape: &Shape, placement: &Placement, parent: &mut Element) -> Result<()>;
}

impl LayoutStrategy for ModeKind {
    fn includes(&self, shape: &Shape, mode: &ModeConfig) -> bool {
        shape.is_master() || (self.is_positional() && mode.layout.is_displaceable())
    }

    fn layout(&self, shapes: &[Shape], mode: &ModeConfig) -> Result<Arrangement> {
        if self.is_positional() {
            return layout::arrange(mode.layout, shapes);
        }
        // Shapes are addressed by fragment only
        let placements = shapes
            .iter()
            .enumerate()
            .filter(|(_, shape)| shape.is_master())
            .map(|(index, _)| Placement {
                index,
                x: 0.0,
                y: 0.0,
            })
            .collect();
        Ok(Arrangement {
            width: 0.0,
            height: 0.0,
            placements,
        })
    }

    fn embed(&self, shape: &Shape, placement: &Placement, parent: &mut Element) -> Result<()> {
        if !shape.is_master() {
            if *self == Self::View {
                parent.push(view(shape, placement).into());
            }
            return Ok(());
        }

        match self {
            Self::Css | Self::View => {
                let precision = shape.precision();
                let mut svg = nested(shape, "svg")?;
                svg.set_attr("x", format_number(placement.x, precision));
                svg.set_attr("y", format_number(placement.y, precision));
                parent.push(svg.into());

                if *self == Self::View {
                    parent.push(view(shape, placement).into());
                }
            }
            Self::Defs | Self::Stack => parent.push(nested(shape, "svg")?.into()),
            Self::Symbol => {
                let mut symbol = nested(shape, "symbol")?;
                symbol.remove_attr("width");
                symbol.remove_attr("height");
                parent.push(symbol.into());
            }
        }
        Ok(())
    }
}

/// `<view>` framing the shape at its placement.
fn view(shape: &Shape, placement: &Placement) -> Element {
    let precision = shape.precision();
    let view_box = format!(
        "{} {} {} {}",
        format_number(placement.x, precision),
        format_number(placement.y, precision),
        format_number(shape.width(), precision),
        format_number(shape.height(), precision),
    );
    Element::new("view")
        .with_attr("id", view_fragment(shape.id()))
        .with_attr("viewBox", view_box)
}

/// Root element of the shape's document, renamed and stripped of document-level attributes.
fn nested(shape: &Shape, name: &str) -> Result<Element> {
    let document = shape
        .document()
        .ok_or_else(|| SpriteError::not_permitted(shape.name(), "shape is not ready"))?;

    let mut elem = document.root.clone();
    elem.name = name.to_string();
    elem.attrs.retain(|(key, _)| {
        !matches!(key.as_str(), "xmlns" | "version" | "baseProfile" | "x" | "y" | "id")
            && !key.starts_with("xmlns:")
    });
    elem.attrs.insert(0, ("id".to_string(), shape.id().to_string()));
    Ok(elem)
}
