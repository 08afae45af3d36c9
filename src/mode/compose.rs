//! Composite sprite document.
//!
//! ```text
//! <?xml ...?>                        xml_declaration
//! <!DOCTYPE svg ...>                 doctype_declaration
//! <svg xmlns xmlns:*                 hoisted from the shapes
//!      [root_attributes]
//!      width height viewBox>         css / view only
//!   <style>                          stack only
//!   <defs>                           defs only
//!   shapes...
//! </svg>
//! ```

use crate::config::mode::{DEFAULT_DOCTYPE, DEFAULT_XML_DECLARATION};
use crate::config::{ModeConfig, ModeKind, SvgConfig};
use crate::error::Result;
use crate::layout::Arrangement;
use crate::shape::Shape;
use crate::svg::{Element, Node, SVG_NAMESPACE, XLINK_NAMESPACE, format_number};

use super::strategy::LayoutStrategy;

/// Shows one stacked shape at a time, selected by the fragment identifier.
const STACK_STYLE: &str = ":root>svg{display:none}:root>svg:target{display:inline}";

/// Serialize the sprite of `kind` for the arranged shapes.
pub fn sprite(
    kind: ModeKind,
    mode: &ModeConfig,
    svg: &SvgConfig,
    shapes: &[Shape],
    arrangement: &Arrangement,
) -> Result<String> {
    let embedded: Vec<(&Shape, _)> = arrangement
        .placements
        .iter()
        .map(|placement| (&shapes[placement.index], placement))
        .collect();

    let masters = embedded
        .iter()
        .map(|(shape, _)| *shape)
        .filter(|shape| shape.is_master());
    let mut root = root_element(kind, svg, arrangement, masters);

    if kind == ModeKind::Stack {
        let mut style = Element::new("style");
        style.push(Node::Text(STACK_STYLE.to_string()));
        root.push(style.into());
    }

    if kind == ModeKind::Defs {
        let mut defs = Element::new("defs");
        for (shape, placement) in &embedded {
            kind.embed(shape, placement, &mut defs)?;
        }
        root.push(defs.into());
    } else {
        for (shape, placement) in &embedded {
            kind.embed(shape, placement, &mut root)?;
        }
    }

    let mut out = String::with_capacity(4096);
    if let Some(declaration) = mode.xml_declaration.resolve(DEFAULT_XML_DECLARATION) {
        out.push_str(&declaration);
        out.push('\n');
    }
    if let Some(doctype) = mode.doctype_declaration.resolve(DEFAULT_DOCTYPE) {
        out.push_str(&doctype);
        out.push('\n');
    }
    root.write_to(&mut out);
    Ok(out)
}

fn root_element<'a>(
    kind: ModeKind,
    svg: &SvgConfig,
    arrangement: &Arrangement,
    shapes: impl Iterator<Item = &'a Shape>,
) -> Element {
    let mut root = Element::new("svg").with_attr("xmlns", SVG_NAMESPACE);

    let mut uses_xlink = false;
    for shape in shapes {
        let Some(document) = shape.document() else {
            continue;
        };
        for (key, value) in &document.root.attrs {
            if key.starts_with("xmlns:") && !root.has_attr(key) {
                root.set_attr(key, value.as_str());
            }
        }
        document.root.walk(&mut |elem| {
            uses_xlink |= elem.attrs.iter().any(|(key, _)| key.starts_with("xlink:"));
        });
    }
    if uses_xlink && !root.has_attr("xmlns:xlink") {
        root.set_attr("xmlns:xlink", XLINK_NAMESPACE);
    }

    for (key, value) in &svg.root_attributes {
        root.set_attr(key, value.as_str());
    }

    if kind.is_positional() {
        let width = format_number(arrangement.width, 6);
        let height = format_number(arrangement.height, 6);
        if svg.dimension_attributes {
            root.set_attr("width", width.as_str());
            root.set_attr("height", height.as_str());
        }
        root.set_attr("viewBox", format!("0 0 {width} {height}"));
    }
    root
}
