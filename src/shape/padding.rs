//! Padding.
//!
//! Padding is expressed in output pixels but applied in user units: each side
//! moves the viewBox edge outward by `padding × (viewBox size / size)`, so the
//! visual padding does not depend on how much the shape was scaled.

use super::Geometry;
use crate::svg::{Document, ViewBox, format_number};

/// Grow the viewBox and outer size of `document` by `geometry.padding`.
pub fn apply(document: &mut Document, geometry: &mut Geometry, precision: usize) {
    let padding = geometry.padding;
    if padding.is_zero() {
        return;
    }

    let view_box = geometry
        .view_box
        .unwrap_or(ViewBox::new(0.0, 0.0, geometry.width, geometry.height));
    let ratio_x = view_box.width / geometry.width;
    let ratio_y = view_box.height / geometry.height;

    let padded = ViewBox::new(
        view_box.x - padding.left * ratio_x,
        view_box.y - padding.top * ratio_y,
        view_box.width + padding.horizontal() * ratio_x,
        view_box.height + padding.vertical() * ratio_y,
    );

    geometry.width += padding.horizontal();
    geometry.height += padding.vertical();
    geometry.view_box = Some(padded);

    let root = &mut document.root;
    root.set_attr("width", format_number(geometry.width, precision));
    root.set_attr("height", format_number(geometry.height, precision));
    root.set_attr("viewBox", padded.format(precision.max(6)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Padding;

    fn geometry(width: f64, height: f64, view_box: ViewBox, padding: Padding) -> Geometry {
        Geometry {
            width,
            height,
            view_box: Some(view_box),
            scale: 1.0,
            padding,
        }
    }

    #[test]
    fn test_zero_padding_is_noop() {
        let mut document = Document::parse(r#"<svg width="10" height="10"/>"#).unwrap();
        let mut g = geometry(10.0, 10.0, ViewBox::new(0.0, 0.0, 10.0, 10.0), Padding::default());
        apply(&mut document, &mut g, 2);
        assert_eq!(document.serialize(), r#"<svg width="10" height="10"/>"#);
        assert_eq!(g.width, 10.0);
    }

    #[test]
    fn test_padding_grows_viewbox() {
        let mut document = Document::parse(r#"<svg width="10" height="10"/>"#).unwrap();
        let mut g = geometry(10.0, 10.0, ViewBox::new(0.0, 0.0, 10.0, 10.0), Padding::uniform(2.0));
        apply(&mut document, &mut g, 2);
        assert_eq!((g.width, g.height), (14.0, 14.0));
        assert_eq!(document.root.attr("viewBox"), Some("-2 -2 14 14"));
        assert_eq!(document.root.attr("width"), Some("14"));
    }

    #[test]
    fn test_padding_is_scale_invariant() {
        // 100 user units drawn at 50px: 5px of padding is 10 user units
        let mut document = Document::parse(r#"<svg width="50" height="50"/>"#).unwrap();
        let mut g = geometry(
            50.0,
            50.0,
            ViewBox::new(0.0, 0.0, 100.0, 100.0),
            Padding::new(5.0, 0.0, 0.0, 5.0),
        );
        apply(&mut document, &mut g, 2);
        assert_eq!(g.view_box, Some(ViewBox::new(-10.0, -10.0, 110.0, 110.0)));
        assert_eq!((g.width, g.height), (55.0, 55.0));
    }
}
