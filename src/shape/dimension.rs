//! Dimension resolution and scaling.
//!
//! Size sources, in order of preference:
//!
//! 1. numeric `width` and `height` attributes (unit-less or `px`)
//! 2. one of them plus the `viewBox` aspect ratio
//! 3. the `viewBox` size
//! 4. the dimension renderer (bounding box of the rendered content, which
//!    also becomes the viewBox so content away from the origin stays visible)
//!
//! Shapes larger than the maximum box are scaled down uniformly. In `padding`
//! and `icon` box sizing the padding counts against the maximum; `icon`
//! additionally distributes the remaining space into the padding so every
//! shape ends up exactly `max_width × max_height`.

use super::Geometry;
use crate::config::ShapeConfig;
use crate::error::{Result, SpriteError};
use crate::svg::{Document, Element, ViewBox, format_number, parse_length};
use crate::transform::DimensionRenderer;

/// Resolve, scale and write back the size of a document's root element.
pub fn resize(
    name: &str,
    document: &mut Document,
    renderer: &dyn DimensionRenderer,
    config: &ShapeConfig,
) -> Result<Geometry> {
    let declared = document
        .root
        .attr("viewBox")
        .and_then(ViewBox::parse)
        .filter(|vb| positive(vb.width) && positive(vb.height));
    let ((mut width, mut height), measured) = intrinsic(name, document, declared, renderer)?;

    let view_box = declared
        .or(measured)
        .unwrap_or(ViewBox::new(0.0, 0.0, width, height));

    let spacing = &config.spacing;
    let mut padding = spacing.padding;
    let (pad_x, pad_y) = if spacing.box_sizing.includes_padding() {
        (padding.horizontal(), padding.vertical())
    } else {
        (0.0, 0.0)
    };

    let max_width = config.dimension.max_width;
    let max_height = config.dimension.max_height;

    let mut scale = 1.0;
    if width + pad_x > max_width || height + pad_y > max_height {
        scale = ((max_width - pad_x) / width).min((max_height - pad_y) / height);
        width *= scale;
        height *= scale;
    }

    if !positive(scale) || !positive(width) || !positive(height) {
        return Err(SpriteError::dimensions(
            name,
            format!("no room inside {max_width}x{max_height} (scale {scale})"),
        ));
    }

    if spacing.box_sizing == crate::config::BoxSizing::Icon {
        let slack_x = (max_width - pad_x - width).max(0.0) / 2.0;
        let slack_y = (max_height - pad_y - height).max(0.0) / 2.0;
        padding.left += slack_x;
        padding.right += slack_x;
        padding.top += slack_y;
        padding.bottom += slack_y;
    }

    let precision = config.dimension.precision;
    write_size(&mut document.root, width, height, precision);
    if declared.is_none() {
        document.root.set_attr("viewBox", view_box.format(precision.max(6)));
    }

    Ok(Geometry {
        width,
        height,
        view_box: Some(view_box),
        scale,
        padding,
    })
}

fn positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Unscaled size of the document, plus the measured content bounds when the
/// renderer had to be asked.
fn intrinsic(
    name: &str,
    document: &Document,
    view_box: Option<ViewBox>,
    renderer: &dyn DimensionRenderer,
) -> Result<((f64, f64), Option<ViewBox>)> {
    let length = |attr: &str| {
        document
            .root
            .attr(attr)
            .and_then(parse_length)
            .filter(|v| positive(*v))
    };

    let (size, measured) = match (length("width"), length("height"), view_box) {
        (Some(width), Some(height), _) => ((width, height), None),
        (Some(width), None, Some(vb)) => ((width, width * vb.height / vb.width), None),
        (None, Some(height), Some(vb)) => ((height * vb.width / vb.height, height), None),
        (None, None, Some(vb)) => ((vb.width, vb.height), None),
        _ => {
            let bounds = renderer
                .bounds(document.to_standalone().as_bytes())
                .map_err(|e| SpriteError::dimensions(name, e.to_string()))?;
            ((bounds.width, bounds.height), Some(bounds))
        }
    };

    if positive(size.0) && positive(size.1) {
        Ok((size, measured))
    } else {
        Err(SpriteError::dimensions(
            name,
            format!("resolved size {}x{} is not positive", size.0, size.1),
        ))
    }
}

fn write_size(root: &mut Element, width: f64, height: f64, precision: usize) {
    root.set_attr("width", format_number(width, precision));
    root.set_attr("height", format_number(height, precision));
}
